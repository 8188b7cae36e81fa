//! Packet framing: a 1-byte flags field, a big-endian sequence
//! number, an "extra bytes" region nobody actually uses but that every
//! client must still parse past, a possibly zero-coded body, and an
//! optional trailing list of piggybacked ACKs.

use wire_types::{Reader, Writer};
use wire_utils::error::Result;

pub const FLAG_ZEROCODE: u8 = 0x80;
pub const FLAG_RELIABLE: u8 = 0x40;
pub const FLAG_RESENT: u8 = 0x20;
pub const FLAG_ACK: u8 = 0x10;

/// One framed UDP datagram. `body` is the message bytes after any
/// zero-coding has already been undone on decode (or, on encode, before
/// it's applied). `Packet` itself doesn't zero-code; that's the caller's
/// job, since only the caller knows whether compression was worth it.
#[derive(Debug, Clone)]
pub struct Packet {
	pub flags: u8,
	pub sequence: u32,
	pub extra: Vec<u8>,
	pub body: Vec<u8>,
	pub acks: Vec<u32>,
}

impl Packet {
	pub fn is_reliable(&self) -> bool {
		self.flags & FLAG_RELIABLE != 0
	}

	pub fn is_zerocoded(&self) -> bool {
		self.flags & FLAG_ZEROCODE != 0
	}

	pub fn is_resent(&self) -> bool {
		self.flags & FLAG_RESENT != 0
	}

	/// Encode to the bytes that go straight onto the wire. `body` is
	/// written as-is: if the caller zero-coded it, `flags` must already
	/// carry [`FLAG_ZEROCODE`].
	pub fn encode(&self) -> Vec<u8> {
		let mut flags = self.flags;
		if !self.acks.is_empty() {
			flags |= FLAG_ACK;
		}

		let mut w = Writer::with_capacity(self.body.len() + 16);
		w.put_u8(flags);
		w.put_u32_be(self.sequence);
		w.put_u8(self.extra.len() as u8);
		w.put_fixed_bytes(&self.extra);
		w.put_fixed_bytes(&self.body);

		if !self.acks.is_empty() {
			for ack in &self.acks {
				w.put_u32_be(*ack);
			}
			w.put_u8(self.acks.len() as u8);
		}

		w.into_bytes()
	}

	/// Decode a raw datagram. The trailing ACK list, if any, is peeled off
	/// the tail first (it's outside the zero-coded region), leaving
	/// `body` as whatever bytes remain between the header and the acks.
	pub fn decode(datagram: &[u8]) -> Result<Packet> {
		let mut r = Reader::new(datagram);

		let flags = r.u8()?;
		let sequence = r.u32_be()?;
		let extra_len = r.u8()? as usize;
		let extra = r.fixed_bytes(extra_len)?.to_vec();

		let acks = if flags & FLAG_ACK != 0 {
			let count = r.take_back(1)?[0] as usize;
			let ack_bytes = r.take_back(count * 4)?;
			ack_bytes.chunks_exact(4).map(|c| u32::from_be_bytes(c.try_into().unwrap())).collect()
		} else {
			Vec::new()
		};

		let body = r.rest().to_vec();

		Ok(Packet { flags, sequence, extra, body, acks })
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn round_trips_a_plain_reliable_packet() {
		let packet =
			Packet { flags: FLAG_RELIABLE, sequence: 42, extra: Vec::new(), body: vec![1, 2, 3, 4], acks: Vec::new() };

		let bytes = packet.encode();
		let decoded = Packet::decode(&bytes).unwrap();

		assert_eq!(decoded.sequence, 42);
		assert_eq!(decoded.body, vec![1, 2, 3, 4]);
		assert!(decoded.is_reliable());
		assert!(decoded.acks.is_empty());
	}

	#[test]
	fn round_trips_piggybacked_acks() {
		let packet =
			Packet { flags: FLAG_RELIABLE, sequence: 7, extra: Vec::new(), body: vec![0xAA], acks: vec![1, 2, 3] };

		let bytes = packet.encode();
		let decoded = Packet::decode(&bytes).unwrap();

		assert_eq!(decoded.body, vec![0xAA]);
		assert_eq!(decoded.acks, vec![1, 2, 3]);
		assert_eq!(decoded.flags & FLAG_ACK, FLAG_ACK);
	}

	#[test]
	fn extra_bytes_region_is_skipped_but_preserved() {
		let packet = Packet { flags: 0, sequence: 1, extra: vec![0xDE, 0xAD], body: vec![9], acks: Vec::new() };
		let decoded = Packet::decode(&packet.encode()).unwrap();
		assert_eq!(decoded.extra, vec![0xDE, 0xAD]);
		assert_eq!(decoded.body, vec![9]);
	}

	proptest::proptest! {
		#[test]
		fn round_trips_any_flags_sequence_body_and_acks(
			flags in proptest::prelude::any::<u8>(),
			sequence in proptest::prelude::any::<u32>(),
			body in proptest::collection::vec(proptest::prelude::any::<u8>(), 0..256),
			acks in proptest::collection::vec(proptest::prelude::any::<u32>(), 0..8),
		) {
			let packet = Packet { flags, sequence, extra: Vec::new(), body: body.clone(), acks: acks.clone() };
			let decoded = Packet::decode(&packet.encode()).unwrap();

			proptest::prop_assert_eq!(decoded.sequence, sequence);
			proptest::prop_assert_eq!(decoded.body, body);
			proptest::prop_assert_eq!(decoded.acks, acks);
		}
	}
}
