use prwatch_core::config::Environment;
use prwatch_core::logging;

mod cli;

use crate::cli::CliCommand;

#[tokio::main]
async fn main() {
    let env = Environment::detect();
    // Initialize logging as early as possible; stderr if the log file is unusable.
    if let Err(e) = logging::init_logging(env) {
        logging::init_logging_stderr();
        tracing::warn!("log file unavailable, logging to stderr: {:#}", e);
    }

    match CliCommand::run_from_args(env).await {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("prwatch error: {:#}", err);
            std::process::exit(1);
        }
    }
}
