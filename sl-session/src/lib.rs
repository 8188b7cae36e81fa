//! The session façade: a small, high-level API over one
//! [`wire_circuit::Circuit`] that a viewer application drives instead of
//! touching packets, schemas or the handshake directly.
//!
//! Login itself is out of scope here: [`LoginClient`] is the boundary a
//! real XML-RPC (or newer LLSD/CAPS) implementation plugs into.
//! This crate only needs whatever a successful login hands back.

mod login;
mod session;
mod types;

pub use login::{LoginClient, LoginToken};
pub use session::Session;
pub use types::{ChatMessage, ChatSourceType, ChatType, ImDialog, InstantMessage};
