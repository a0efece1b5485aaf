//! Terminal presentation.
//!
//! - [`render`]: formatter segments to styled [`ratatui`] lines.
//! - [`reply`]: prints an assistant reply while it streams.
//! - [`terminal`]: writes lines to the terminal and keeps the streaming reply
//!   redrawn in place.
//! - [`sink`]: clipboard and notification surface.
//! - [`theme`]: color/style policy.

pub mod render;
pub mod reply;
pub mod sink;
pub mod terminal;
pub mod theme;
