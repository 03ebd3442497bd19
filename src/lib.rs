//! LlamaBot is a terminal chat client for a single streaming chat endpoint.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the conversation, the generation session and its
//!   cancellation, response decoding and framing, the HTTP transport, and
//!   configuration.
//! - [`ui`] renders the terminal interface, including markdown and numbered
//!   code blocks, and runs the interactive event loop.
//! - [`cli`] parses arguments and dispatches to the chat view, the one-shot
//!   `say` command, or the config subcommands.
//! - [`utils`] holds clipboard access and logging setup.
//!
//! The binary (`src/main.rs`) routes through [`crate::cli::main`].

pub mod cli;
pub mod core;
pub mod ui;
pub mod utils;
