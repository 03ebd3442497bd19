pub mod app;
pub mod chat_stream;
pub mod config;
pub mod conversation;
pub mod decoder;
pub mod framing;
pub mod message;
pub mod session;
pub mod transport;
