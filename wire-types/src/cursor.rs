use std::net::Ipv4Addr;

use wire_utils::error::{Result, WireError};

use crate::uuid::Uuid;
use crate::vector::{Color, Quaternion, Vector3, Vector3D, Vector4};

/// A cursor over a byte slice that reads primitive wire values, advancing
/// its own position. Every read that would run past the end of the slice
/// fails with [`WireError::TruncatedField`] rather than panicking, since
/// inbound bytes are attacker-controlled.
pub struct Reader<'a> {
	buf: &'a [u8],
	pos: usize,
}

impl<'a> Reader<'a> {
	pub fn new(buf: &'a [u8]) -> Self {
		Self { buf, pos: 0 }
	}

	/// Bytes not yet consumed.
	pub fn remaining(&self) -> usize {
		self.buf.len() - self.pos
	}

	pub fn position(&self) -> usize {
		self.pos
	}

	pub fn is_empty(&self) -> bool {
		self.remaining() == 0
	}

	fn take(&mut self, n: usize) -> Result<&'a [u8]> {
		if self.remaining() < n {
			return Err(WireError::TruncatedField);
		}

		let (slice, _) = self.buf[self.pos..].split_at(n);
		self.pos += n;
		Ok(slice)
	}

	/// Bytes from the tail of the buffer, shrinking it (used for trailing
	/// ACK lists and MACs appended after the body).
	pub fn take_back(&mut self, n: usize) -> Result<&'a [u8]> {
		if self.remaining() < n {
			return Err(WireError::TruncatedField);
		}

		let split_at = self.buf.len() - n;
		let slice = &self.buf[split_at..];
		self.buf = &self.buf[..split_at];
		Ok(slice)
	}

	pub fn rest(&mut self) -> &'a [u8] {
		let slice = &self.buf[self.pos..];
		self.pos = self.buf.len();
		slice
	}

	pub fn u8(&mut self) -> Result<u8> {
		Ok(self.take(1)?[0])
	}

	pub fn i8(&mut self) -> Result<i8> {
		Ok(self.u8()? as i8)
	}

	pub fn u16_le(&mut self) -> Result<u16> {
		Ok(u16::from_le_bytes(self.take(2)?.try_into().unwrap()))
	}

	pub fn u16_be(&mut self) -> Result<u16> {
		Ok(u16::from_be_bytes(self.take(2)?.try_into().unwrap()))
	}

	pub fn i16_le(&mut self) -> Result<i16> {
		Ok(self.u16_le()? as i16)
	}

	pub fn u32_le(&mut self) -> Result<u32> {
		Ok(u32::from_le_bytes(self.take(4)?.try_into().unwrap()))
	}

	pub fn u32_be(&mut self) -> Result<u32> {
		Ok(u32::from_be_bytes(self.take(4)?.try_into().unwrap()))
	}

	pub fn i32_le(&mut self) -> Result<i32> {
		Ok(self.u32_le()? as i32)
	}

	pub fn u64_le(&mut self) -> Result<u64> {
		Ok(u64::from_le_bytes(self.take(8)?.try_into().unwrap()))
	}

	pub fn i64_le(&mut self) -> Result<i64> {
		Ok(self.u64_le()? as i64)
	}

	pub fn f32_le(&mut self) -> Result<f32> {
		Ok(f32::from_le_bytes(self.take(4)?.try_into().unwrap()))
	}

	pub fn f64_le(&mut self) -> Result<f64> {
		Ok(f64::from_le_bytes(self.take(8)?.try_into().unwrap()))
	}

	/// A fixed-length byte blob; its length comes from the schema, not the wire.
	pub fn fixed_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
		self.take(len)
	}

	/// A length-prefixed variable byte blob. `prefix_width`
	/// must be 1 or 2, matching the schema's declared field width.
	pub fn variable_bytes(&mut self, prefix_width: u8) -> Result<&'a [u8]> {
		let len = match prefix_width {
			1 => self.u8()? as usize,
			2 => self.u16_le()? as usize,
			_ => unreachable!("schema length-prefix width must be 1 or 2"),
		};
		self.take(len)
	}

	pub fn uuid(&mut self) -> Result<Uuid> {
		Ok(Uuid(self.take(16)?.try_into().unwrap()))
	}

	pub fn ipv4(&mut self) -> Result<Ipv4Addr> {
		let bytes: [u8; 4] = self.take(4)?.try_into().unwrap();
		Ok(Ipv4Addr::from(bytes))
	}

	/// A 2-byte port, little-endian in the message body (note
	/// this is distinct from the network-order ports carried inside
	/// captured sim-endpoint fields).
	pub fn port_le(&mut self) -> Result<u16> {
		self.u16_le()
	}

	pub fn vector3(&mut self) -> Result<Vector3> {
		Ok(Vector3 { x: self.f32_le()?, y: self.f32_le()?, z: self.f32_le()? })
	}

	pub fn vector3d(&mut self) -> Result<Vector3D> {
		Ok(Vector3D { x: self.f64_le()?, y: self.f64_le()?, z: self.f64_le()? })
	}

	pub fn vector4(&mut self) -> Result<Vector4> {
		Ok(Vector4 { x: self.f32_le()?, y: self.f32_le()?, z: self.f32_le()?, w: self.f32_le()? })
	}

	pub fn quaternion(&mut self) -> Result<Quaternion> {
		Ok(Quaternion { x: self.f32_le()?, y: self.f32_le()?, z: self.f32_le()?, w: self.f32_le()? })
	}

	pub fn color(&mut self) -> Result<Color> {
		Ok(Color { r: self.u8()?, g: self.u8()?, b: self.u8()?, a: self.u8()? })
	}
}

/// The mirror of [`Reader`]: an append-only byte writer for building an
/// outbound message body or packet.
#[derive(Default)]
pub struct Writer {
	buf: Vec<u8>,
}

impl Writer {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_capacity(cap: usize) -> Self {
		Self { buf: Vec::with_capacity(cap) }
	}

	pub fn position(&self) -> usize {
		self.buf.len()
	}

	pub fn into_bytes(self) -> Vec<u8> {
		self.buf
	}

	pub fn as_slice(&self) -> &[u8] {
		&self.buf
	}

	pub fn put_u8(&mut self, v: u8) {
		self.buf.push(v);
	}

	pub fn put_i8(&mut self, v: i8) {
		self.put_u8(v as u8);
	}

	pub fn put_u16_le(&mut self, v: u16) {
		self.buf.extend_from_slice(&v.to_le_bytes());
	}

	pub fn put_u16_be(&mut self, v: u16) {
		self.buf.extend_from_slice(&v.to_be_bytes());
	}

	pub fn put_i16_le(&mut self, v: i16) {
		self.put_u16_le(v as u16);
	}

	pub fn put_u32_le(&mut self, v: u32) {
		self.buf.extend_from_slice(&v.to_le_bytes());
	}

	pub fn put_u32_be(&mut self, v: u32) {
		self.buf.extend_from_slice(&v.to_be_bytes());
	}

	pub fn put_i32_le(&mut self, v: i32) {
		self.put_u32_le(v as u32);
	}

	pub fn put_u64_le(&mut self, v: u64) {
		self.buf.extend_from_slice(&v.to_le_bytes());
	}

	pub fn put_i64_le(&mut self, v: i64) {
		self.put_u64_le(v as u64);
	}

	pub fn put_f32_le(&mut self, v: f32) {
		self.buf.extend_from_slice(&v.to_le_bytes());
	}

	pub fn put_f64_le(&mut self, v: f64) {
		self.buf.extend_from_slice(&v.to_le_bytes());
	}

	/// A fixed-length blob: raw bytes, no length prefix.
	pub fn put_fixed_bytes(&mut self, bytes: &[u8]) {
		self.buf.extend_from_slice(bytes);
	}

	/// A length-prefixed variable blob. Fails with `FieldTooLarge` if
	/// `bytes.len()` does not fit in `prefix_width` bytes.
	pub fn put_variable_bytes(&mut self, bytes: &[u8], prefix_width: u8) -> Result {
		match prefix_width {
			1 => {
				let len: u8 = bytes.len().try_into().map_err(|_| WireError::FieldTooLarge)?;
				self.put_u8(len);
			}
			2 => {
				let len: u16 = bytes.len().try_into().map_err(|_| WireError::FieldTooLarge)?;
				self.put_u16_le(len);
			}
			_ => unreachable!("schema length-prefix width must be 1 or 2"),
		}

		self.put_fixed_bytes(bytes);
		Ok(())
	}

	pub fn put_uuid(&mut self, uuid: &Uuid) {
		self.put_fixed_bytes(&uuid.0);
	}

	pub fn put_ipv4(&mut self, addr: Ipv4Addr) {
		self.put_fixed_bytes(&addr.octets());
	}

	pub fn put_port_le(&mut self, port: u16) {
		self.put_u16_le(port);
	}

	pub fn put_vector3(&mut self, v: Vector3) {
		self.put_f32_le(v.x);
		self.put_f32_le(v.y);
		self.put_f32_le(v.z);
	}

	pub fn put_vector3d(&mut self, v: Vector3D) {
		self.put_f64_le(v.x);
		self.put_f64_le(v.y);
		self.put_f64_le(v.z);
	}

	pub fn put_vector4(&mut self, v: Vector4) {
		self.put_f32_le(v.x);
		self.put_f32_le(v.y);
		self.put_f32_le(v.z);
		self.put_f32_le(v.w);
	}

	pub fn put_quaternion(&mut self, q: Quaternion) {
		self.put_f32_le(q.x);
		self.put_f32_le(q.y);
		self.put_f32_le(q.z);
		self.put_f32_le(q.w);
	}

	pub fn put_color(&mut self, c: Color) {
		self.put_u8(c.r);
		self.put_u8(c.g);
		self.put_u8(c.b);
		self.put_u8(c.a);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn round_trips_integers() {
		let mut w = Writer::new();
		w.put_u32_be(0xA0);
		w.put_u16_le(7);
		w.put_i32_le(-5);

		let bytes = w.into_bytes();
		let mut r = Reader::new(&bytes);

		assert_eq!(r.u32_be().unwrap(), 0xA0);
		assert_eq!(r.u16_le().unwrap(), 7);
		assert_eq!(r.i32_le().unwrap(), -5);
		assert!(r.is_empty());
	}

	#[test]
	fn variable_blob_round_trips_at_255() {
		let data = vec![0x42u8; 255];
		let mut w = Writer::new();
		w.put_variable_bytes(&data, 1).unwrap();

		let bytes = w.into_bytes();
		let mut r = Reader::new(&bytes);
		assert_eq!(r.variable_bytes(1).unwrap(), &data[..]);
	}

	#[test]
	fn variable_blob_256_is_too_large_for_one_byte_prefix() {
		let data = vec![0u8; 256];
		let mut w = Writer::new();
		assert!(w.put_variable_bytes(&data, 1).is_err());
	}

	#[test]
	fn truncated_read_fails() {
		let bytes = [0u8; 2];
		let mut r = Reader::new(&bytes);
		assert!(r.u32_le().is_err());
	}

	#[test]
	fn take_back_shrinks_from_the_tail() {
		let bytes = [1, 2, 3, 4, 5];
		let mut r = Reader::new(&bytes);
		assert_eq!(r.take_back(2).unwrap(), &[4, 5]);
		assert_eq!(r.rest(), &[1, 2, 3]);
	}

	proptest::proptest! {
		#[test]
		fn round_trips_any_u32_both_endiannesses(be in proptest::prelude::any::<u32>(), le in proptest::prelude::any::<u32>()) {
			let mut w = Writer::new();
			w.put_u32_be(be);
			w.put_u32_le(le);

			let bytes = w.into_bytes();
			let mut r = Reader::new(&bytes);
			proptest::prop_assert_eq!(r.u32_be().unwrap(), be);
			proptest::prop_assert_eq!(r.u32_le().unwrap(), le);
		}
	}
}
