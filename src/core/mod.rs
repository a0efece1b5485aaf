pub mod assembler;
pub mod chat_stream;
pub mod config;
pub mod cost;
pub mod credentials;
pub mod error;
pub mod formatter;
pub mod math;
pub mod message;
pub mod models;
pub mod session;
pub mod stream_state;
