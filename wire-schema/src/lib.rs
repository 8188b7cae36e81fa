//! Message schema registry: a declarative definition of
//! each known message, plus a process-wide lookup table populated once at
//! startup.

mod catalogue;
mod header;
mod registry;
mod types;

pub use header::{decode_header, encode_header, HEADER_LEN};
pub use registry::registry;
pub use types::{Block, Cardinality, Field, FieldType, Frequency, Schema};
