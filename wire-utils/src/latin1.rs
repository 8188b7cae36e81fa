//! Latin-1 (ISO-8859-1) helpers for the wire's variable-length string
//! fields, plus a hex-dump helper for logging malformed
//! datagrams.

use crate::error::{Result, WireError};

/// Encode a string to Latin-1 bytes. Fails if any character is outside the
/// Latin-1 range (U+0000..=U+00FF); the wire has no escape for anything else.
pub fn encode(s: &str) -> Result<Vec<u8>> {
	s.chars()
		.map(|c| u32::try_from(c).ok().filter(|&v| v <= 0xFF).map(|v| v as u8))
		.collect::<Option<Vec<u8>>>()
		.ok_or(WireError::FieldTooLarge)
}

/// Decode Latin-1 bytes to a string. Every byte value maps directly to the
/// codepoint of the same value, so this never fails.
pub fn decode(bytes: &[u8]) -> String {
	bytes.iter().map(|&b| b as char).collect()
}

/// Encode a chat-style string with its protocol-mandated trailing NUL.
pub fn encode_nul_terminated(s: &str) -> Result<Vec<u8>> {
	let mut bytes = encode(s)?;
	bytes.push(0);
	Ok(bytes)
}

/// Decode a NUL-terminated Latin-1 string, stopping at (and discarding) the
/// first NUL byte if one is present.
pub fn decode_nul_terminated(bytes: &[u8]) -> String {
	let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
	decode(&bytes[..end])
}

/// Render a byte slice as a classic hex dump, for logging malformed or
/// unknown datagrams: 16 bytes per line, offset prefix, hex
/// columns, then the printable ASCII rendering.
pub fn hexdump(bytes: &[u8]) -> String {
	use std::fmt::Write;

	let mut out = String::new();

	for (row, chunk) in bytes.chunks(16).enumerate() {
		let _ = write!(out, "{:06x}  ", row * 16);

		for i in 0..16 {
			match chunk.get(i) {
				Some(b) => {
					let _ = write!(out, "{b:02x} ");
				}
				None => out.push_str("   "),
			}
			if i == 7 {
				out.push(' ');
			}
		}

		out.push(' ');

		for &b in chunk {
			out.push(if b.is_ascii_graphic() || b == b' ' { b as char } else { '.' });
		}

		out.push('\n');
	}

	out
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn latin1_round_trips_ascii() {
		let encoded = encode("hello").unwrap();
		assert_eq!(decode(&encoded), "hello");
	}

	#[test]
	fn latin1_encodes_cafe() {
		// "café" -> c a f é(0xE9)
		let encoded = encode_nul_terminated("café").unwrap();
		assert_eq!(encoded, vec![0x63, 0x61, 0x66, 0xE9, 0x00]);
	}

	#[test]
	fn latin1_rejects_non_latin1() {
		assert!(encode("café \u{1F600}").is_err());
	}

	#[test]
	fn nul_terminated_round_trip() {
		let encoded = encode_nul_terminated("hi").unwrap();
		assert_eq!(decode_nul_terminated(&encoded), "hi");
	}

	#[test]
	fn hexdump_formats_rows() {
		let dump = hexdump(&[0u8; 20]);
		assert_eq!(dump.lines().count(), 2);
		assert!(dump.lines().next().unwrap().starts_with("000000"));
	}
}
