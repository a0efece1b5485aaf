pub mod auth;
pub mod clipboard;
pub mod image;
pub mod logging;
pub mod masked_input;
pub mod net;
pub mod syntax;
pub mod url;
