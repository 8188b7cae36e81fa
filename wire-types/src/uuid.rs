use std::fmt;

/// A 16-byte UUID in canonical big-endian form.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Uuid(pub [u8; 16]);

impl Uuid {
	pub const NIL: Self = Self([0; 16]);

	pub fn from_bytes(bytes: [u8; 16]) -> Self {
		Self(bytes)
	}

	pub fn as_bytes(&self) -> &[u8; 16] {
		&self.0
	}
}

impl fmt::Display for Uuid {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let b = &self.0;
		write!(
			f,
			"{:02x}{:02x}{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}",
			b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7], b[8], b[9], b[10], b[11], b[12], b[13], b[14], b[15]
		)
	}
}

impl fmt::Debug for Uuid {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Uuid({self})")
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn formats_canonically() {
		let uuid = Uuid::from_bytes([0xAA; 16]);
		assert_eq!(uuid.to_string(), "aaaaaaaa-aaaa-aaaa-aaaa-aaaaaaaaaaaa");
	}
}
