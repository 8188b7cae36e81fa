//! Zero-coding run-length codec: runs of `0x00` are replaced
//! with a `00 <count>` escape, `count` capped at 255 so a run longer than
//! that splits into multiple escapes.

use wire_utils::error::{Result, WireError};

fn run_length_encode(bytes: &[u8]) -> Vec<u8> {
	let mut out = Vec::with_capacity(bytes.len());
	let mut i = 0;

	while i < bytes.len() {
		if bytes[i] == 0 {
			let mut run: u8 = 0;
			while i < bytes.len() && bytes[i] == 0 && run < 255 {
				run += 1;
				i += 1;
			}
			out.push(0);
			out.push(run);
		} else {
			out.push(bytes[i]);
			i += 1;
		}
	}

	out
}

/// Zero-code `bytes`, returning the encoded form and whether compression
/// actually helped. Sparse, frequently-interrupted zero runs can make the
/// escaped form *larger* than the input (every isolated `0x00` costs two
/// bytes), so callers should only set the packet's Z flag when this
/// returns `true` and otherwise send `bytes` unmodified.
pub fn zerocode_encode(bytes: &[u8]) -> (Vec<u8>, bool) {
	let encoded = run_length_encode(bytes);
	if encoded.len() < bytes.len() {
		(encoded, true)
	} else {
		(bytes.to_vec(), false)
	}
}

/// Reverse a zero-coded body. Bytes with no `0x00` in them pass through
/// unchanged (the codec is a no-op on already-zero-free input, which also
/// makes it idempotent to call on plain, never-encoded bodies).
pub fn zerocode_decode(bytes: &[u8]) -> Result<Vec<u8>> {
	let mut out = Vec::with_capacity(bytes.len());
	let mut i = 0;

	while i < bytes.len() {
		if bytes[i] == 0 {
			i += 1;
			let run = *bytes.get(i).ok_or(WireError::ZerocodeTruncated)?;
			out.resize(out.len() + run as usize, 0);
			i += 1;
		} else {
			out.push(bytes[i]);
			i += 1;
		}
	}

	Ok(out)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn all_zero_1024_matches_the_documented_encoding() {
		let input = vec![0u8; 1024];
		let (encoded, used) = zerocode_encode(&input);
		assert!(used);
		assert_eq!(encoded, vec![0x00, 0xFF, 0x00, 0xFF, 0x00, 0xFF, 0x00, 0xFF, 0x00, 0x04]);
		assert_eq!(zerocode_decode(&encoded).unwrap(), input);
	}

	#[test]
	fn single_zero_byte_is_two_bytes_and_not_worth_using() {
		let (encoded, used) = zerocode_encode(&[0x00]);
		assert_eq!(encoded, vec![0x00, 0x01]);
		assert!(!used);
	}

	#[test]
	fn zero_free_input_is_unchanged_by_decode() {
		let input = b"hello world";
		assert_eq!(zerocode_decode(input).unwrap(), input);
	}

	#[test]
	fn trailing_lone_escape_byte_is_truncated() {
		assert!(matches!(zerocode_decode(&[0x41, 0x00]), Err(WireError::ZerocodeTruncated)));
	}

	#[test]
	fn round_trips_arbitrary_mixed_content() {
		let input = [1, 0, 0, 0, 5, 0, 9, 9, 0, 0, 0, 0, 0, 2];
		let (encoded, _) = zerocode_encode(&input);
		assert_eq!(zerocode_decode(&encoded).unwrap(), input);
	}

	proptest::proptest! {
		#[test]
		fn round_trips_any_byte_sequence(bytes in proptest::collection::vec(proptest::prelude::any::<u8>(), 0..2048)) {
			let (encoded, _) = zerocode_encode(&bytes);
			proptest::prop_assert_eq!(zerocode_decode(&encoded).unwrap(), bytes);
		}
	}
}
