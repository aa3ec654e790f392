use std::env;
use std::process::ExitCode;

use cert_mailer::app::{run_with, RunStatus};
use cert_mailer::config::loader::config_path;
use log::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }

    env_logger::init();
    info!("Starting cert-mailer...");

    match run_with(&config_path()).await {
        Ok(status) => {
            if let RunStatus::Completed(summary) = &status {
                println!("{}", summary);
            }
            if status.success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
