//! Primitive wire codec.
//!
//! Encoding of a typed value to bytes, and the inverse, driven by the
//! declared type. Integers, floats, vectors, quaternions and colours use
//! little-endian on the wire; packet-header fields are the one
//! exception and use big-endian, which is why [`Reader`] and [`Writer`]
//! expose both endiannesses rather than picking one.

mod cursor;
mod region;
mod uuid;
mod vector;

pub use cursor::{Reader, Writer};
pub use region::RegionHandle;
pub use uuid::Uuid;
pub use vector::{Color, Quaternion, Vector3, Vector3D, Vector4};
