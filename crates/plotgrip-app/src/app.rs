//! Application shell: configuration and the session runner entry point.

use crate::error::{AppError, AppResult};
use crate::session::{Script, Session, SessionReport};
use crate::shortcuts::ShortcutRegistry;
use clap::Parser;
use std::path::{Path, PathBuf};

/// Command line arguments.
#[derive(Parser, Debug)]
#[command(name = "plotgrip", about = "Replay scripted sessions of interactive plot markers")]
pub struct Cli {
    /// Print the crosshair key bindings
    #[arg(long)]
    pub keys: bool,

    /// Do not list the objects left at the end of the session
    #[arg(long)]
    pub quiet: bool,

    /// Session script (JSON)
    pub script: Option<PathBuf>,
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub title: String,
    /// Session script to replay.
    pub script: Option<PathBuf>,
    /// Print the cursor key bindings before running.
    pub print_keys: bool,
    /// Print the descriptions of the remaining objects.
    pub list_objects: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Plotgrip".to_string(),
            script: None,
            print_keys: false,
            list_objects: true,
        }
    }
}

impl From<Cli> for AppConfig {
    fn from(cli: Cli) -> Self {
        Self {
            script: cli.script,
            print_keys: cli.keys,
            list_objects: !cli.quiet,
            ..Self::default()
        }
    }
}

/// The session runner.
pub struct App;

impl App {
    /// Replay the configured script and print a report.
    pub fn run(config: &AppConfig) -> AppResult<Option<SessionReport>> {
        if config.print_keys {
            ShortcutRegistry::print_all();
        }
        let Some(path) = &config.script else {
            if config.print_keys {
                return Ok(None);
            }
            return Err(AppError::Usage(
                "plotgrip [--keys] [--quiet] <script.json>".to_string(),
            ));
        };
        let mut report = Self::replay(path)?;
        if !config.list_objects {
            report.objects.clear();
        }
        println!("=== {} ===", config.title);
        print!("{}", report);
        Ok(Some(report))
    }

    /// Replay a script file.
    pub fn replay(path: &Path) -> AppResult<SessionReport> {
        log::info!("Replaying {}", path.display());
        let script = Script::from_file(path)?;
        let mut session = Session::new(&script);
        session.run(&script.steps)?;
        if session.is_stopped() {
            log::info!("Session stopped by a blocking object");
        }
        session.report()
    }
}
