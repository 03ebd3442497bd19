//! Full-screen chat: terminal setup, the event loop, and teardown.

mod event_loop;
mod lifecycle;

pub use event_loop::run_chat;
