//! Packet framing and the circuit state machine.
//!
//! [`Circuit`] is the heart of the crate: it owns the UDP socket, drives the
//! handshake, and keeps reliability bookkeeping under a single mutex. One
//! blocking receive thread per circuit drives timers; producer threads
//! call in to send.

mod circuit;
mod packet;

pub use circuit::{Circuit, HandshakeState};
pub use packet::{Packet, FLAG_ACK, FLAG_RELIABLE, FLAG_RESENT, FLAG_ZEROCODE};
