//! Character source with location tracking and bounded unget

pub mod reader;

pub use reader::{Reader, WINDOW_LINES};
