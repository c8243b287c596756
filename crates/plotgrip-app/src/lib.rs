//! Plotgrip Application
//!
//! Headless runner replaying scripted sessions of interactive markers
//! against recording canvases, plus the reference marker kinds.

mod app;
mod error;
pub mod kinds;
pub mod session;
mod shortcuts;

pub use app::{App, AppConfig, Cli};
pub use error::{AppError, AppResult};
pub use kinds::{ClickLog, Crosshair, ObjectSpec, Segment, CROSSHAIR, SEGMENT};
pub use session::{Script, Session, SessionReport, Step};
pub use shortcuts::{Shortcut, ShortcutRegistry};
