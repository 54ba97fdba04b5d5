//! Chatroom core: room directory, access control and the message log.
//!
//! Every operation takes the caller's verified email explicitly; nothing here
//! authenticates or keeps session state.

pub mod access;
pub mod directory;
pub mod error;
pub mod message_log;

pub use access::AccessGate;
pub use directory::{Directory, Room};
pub use error::ChatError;
pub use message_log::MessageLog;
