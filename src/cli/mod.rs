//! CLI output formatting and interaction
//!
//! Provides human-readable terminal display for query answers, JSON
//! reports, and the async prompt used by the interactive menu.

pub mod display;
pub mod prompt;
pub mod report;

pub use display::render_menu;
pub use display::render_session_header;
pub use prompt::Prompt;
pub use report::{Answer, OutputFormat};
