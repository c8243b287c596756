//! Main application entry point.

use clap::Parser;
use plotgrip_app::{App, AppConfig, Cli};
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Starting Plotgrip");

    let config: AppConfig = Cli::parse().into();
    match App::run(&config) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{}", err);
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}
