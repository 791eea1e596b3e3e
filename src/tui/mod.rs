//! TUI module: Terminal User Interface using Ratatui.
//!
//! Two screens:
//! - the risk assessment form
//! - the result view with the risk gauge and report download

mod app;
mod styles;
mod ui;

pub use app::{App, Screen};
pub use styles::MedicalTheme;
