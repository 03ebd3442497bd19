//! Terminal UI layer for interactive chat sessions.
//!
//! - [`chat_loop`]: terminal setup and the loop that feeds key presses and
//!   stream output into [`crate::core::app::App`].
//! - [`renderer`] and [`wrap`]: frame layout and transcript wrapping.
//! - [`markdown`]: message rendering strategies and code-block extraction.
//! - [`keys`] and [`theme`]: key bindings and styles.

pub mod chat_loop;
pub mod keys;
pub mod markdown;
pub mod renderer;
pub mod theme;
pub mod wrap;
