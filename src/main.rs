use clap::Parser;
use tracing::{error, Level};

mod runner;

use runner::RunnerConfig;

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt().with_max_level(level).init();
}

fn main() {
    let config = RunnerConfig::parse();
    init_logging(config.verbose);

    if let Err(e) = runner::run(&config) {
        error!("Detection failed: {:#}", e);
        std::process::exit(1);
    }
}
