//! Error taxonomy for the circuit stack.
//!
//! Codec-level failures (`TruncatedField`, `FieldTooLarge`, ...) are
//! non-fatal by policy: callers log them with a hex dump of the offending
//! datagram and drop it. Only `HandshakeTimeout` and a persistent `Io`
//! failure close a circuit.

use std::io;

#[derive(Debug, thiserror::Error)]
pub enum WireError {
	#[error("login refused: {0}")]
	LoginRefused(String),

	#[error("handshake did not reach Landed within the timeout")]
	HandshakeTimeout,

	#[error("reliable packet 0x{sequence:08x} ({name}) was never acked")]
	ReliableTimeout { sequence: u32, name: String },

	#[error("field truncated: expected more bytes than the buffer contained")]
	TruncatedField,

	#[error("field too large for its declared length prefix")]
	FieldTooLarge,

	#[error("variable-count block exceeded 255 entries")]
	VariableBlockCountOverflow,

	#[error("zero-coded body ended on a lone 0x00 escape byte")]
	ZerocodeTruncated,

	#[error("unknown message (frequency {frequency}, id {id})")]
	UnknownMessage { frequency: u8, id: u32 },

	#[error("circuit is closed")]
	CircuitClosed,

	#[error("I/O error: {0}")]
	Io(#[from] io::Error),
}

pub type Result<T = ()> = std::result::Result<T, WireError>;
