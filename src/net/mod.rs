//! Network transport
//!
//! TCP server and the JSON wire contract shared with the front end.
//! Protocol: JSON over newline-delimited messages.

pub mod messages;
pub mod server;

pub use messages::{ClientMessage, ServerMessage};
pub use server::GameServer;
