//! Binary entry point.

use std::process;

use crosspack::cli;

#[tokio::main]
async fn main() {
    env_logger::init();

    match cli::run().await {
        Ok(code) => process::exit(code),
        Err(err) => {
            cli::ConsoleReporter::new(false).error(&format!("Fatal error: {err}"));
            process::exit(1);
        }
    }
}
