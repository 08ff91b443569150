use clap::Parser;
use fylum::cli::{self, Cli};
use fylum::output::OutputFormatter;

fn main() {
    let cli = Cli::parse();

    if let Err(message) = cli::run(cli) {
        OutputFormatter::error(&message);
        std::process::exit(1);
    }
}
