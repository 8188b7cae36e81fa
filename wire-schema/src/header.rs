//! The message-ID encoding at the start of a packet body.
//! This is a peculiarity of the protocol: the same four bytes encode a
//! different ID range depending on frequency class, and the frequency
//! itself has to be inferred from the bit pattern on decode.

use wire_utils::error::{Result, WireError};

use crate::types::Frequency;

/// The message ID is always 4 bytes, regardless of frequency class.
pub const HEADER_LEN: usize = 4;

/// Encode a schema's `(frequency, id)` into the 4-byte wire prefix.
pub fn encode_header(frequency: Frequency, id: u32) -> [u8; 4] {
	let v: u32 = match frequency {
		Frequency::Low => id & 0xFF,
		Frequency::Medium => 0x0000_FF00 | (id & 0xFF),
		Frequency::High => 0xFFFF_0000 | (id & 0xFFFF),
		Frequency::Fixed => 0xFFFF_FF00 | (id & 0xFF),
	};

	v.to_be_bytes()
}

/// Decode the 4-byte wire prefix into `(frequency, id)`, matching the
/// order of specificity (Fixed's pattern is a superset of
/// High's, which is a superset of Medium's).
pub fn decode_header(bytes: &[u8]) -> Result<(Frequency, u32)> {
	if bytes.len() < HEADER_LEN {
		return Err(WireError::TruncatedField);
	}

	let v = u32::from_be_bytes(bytes[..HEADER_LEN].try_into().unwrap());

	if v >> 8 == 0x00FF_FFFF {
		Ok((Frequency::Fixed, v & 0xFF))
	} else if v >> 16 == 0xFFFF {
		Ok((Frequency::High, v & 0xFFFF))
	} else if v >> 8 == 0x0000_FF {
		Ok((Frequency::Medium, v & 0xFF))
	} else if v >> 8 == 0 {
		Ok((Frequency::Low, v & 0xFF))
	} else {
		Err(WireError::UnknownMessage { frequency: 0xFF, id: v })
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn round_trips_each_frequency() {
		for (freq, id) in [(Frequency::Low, 1), (Frequency::Medium, 80), (Frequency::High, 148), (Frequency::Fixed, 251)] {
			let bytes = encode_header(freq, id);
			assert_eq!(decode_header(&bytes).unwrap(), (freq, id));
		}
	}

	#[test]
	fn start_ping_check_matches_s1() {
		// Low freq, id 1: `00 00 00 01`
		assert_eq!(encode_header(Frequency::Low, 1), [0x00, 0x00, 0x00, 0x01]);
	}

	#[test]
	fn packet_ack_matches_fixed_hex_id() {
		assert_eq!(encode_header(Frequency::Fixed, 0xFB), [0xFF, 0xFF, 0xFF, 0xFB]);
	}
}
