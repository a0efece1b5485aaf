//! Setting handlers for different configuration patterns.

pub mod boolean;
pub mod text;
pub mod typed;

pub use boolean::*;
pub use text::*;
pub use typed::*;
