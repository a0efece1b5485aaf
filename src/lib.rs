//! palaver is a line-oriented terminal chat client for the OpenAI Responses
//! API.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the conversation, the single in-flight reply stream and its
//!   lifecycle, the incremental message formatter, configuration, credentials
//!   and cost accounting.
//! - [`ui`] turns formatted segments into styled terminal output and keeps the
//!   streaming reply repainted in place.
//! - [`commands`] implements slash-command parsing and execution used by the
//!   chat loop.
//! - [`api`] defines the Responses API request and event payloads.
//! - [`utils`] holds small helpers: URLs, auth headers, clipboard, images,
//!   connectivity, logging.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`].

pub mod api;
pub mod cli;
pub mod commands;
pub mod core;
pub mod ui;
pub mod utils;
