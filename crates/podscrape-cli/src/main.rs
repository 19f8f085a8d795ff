use podscrape_core::logging;

mod cli;

use crate::cli::Cli;

#[tokio::main]
async fn main() {
    // Log to the state file when possible, stderr otherwise.
    if let Err(err) = logging::init_logging() {
        eprintln!("podscrape: file logging unavailable ({:#}), using stderr", err);
        logging::init_logging_stderr();
    }

    if let Err(err) = Cli::run_from_args().await {
        eprintln!("podscrape error: {:#}", err);
        std::process::exit(1);
    }
}
