use clap::Parser;
use rps_predictor::cli::{self, Cli};
use rps_predictor::init_logging;

fn main() {
    if let Err(e) = init_logging() {
        eprintln!("failed to initialize logging: {e}");
    }
    let cli = Cli::parse();
    let code = cli::run(cli);
    std::process::exit(code);
}
