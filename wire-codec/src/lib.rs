//! Message (de)serialization and zero-coding.
//!
//! [`Message`] is a dynamic block/field dictionary rather than a typed
//! struct per message: the schema registry is the
//! single source of truth for layout, so adding a message never touches
//! this crate.

mod message;
mod serialize;
mod zerocode;

pub use message::{Block, Message, Value};
pub use serialize::{deserialize, serialize};
pub use zerocode::{zerocode_decode, zerocode_encode};
