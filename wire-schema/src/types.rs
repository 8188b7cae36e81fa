/// The protocol-level bucketing of message IDs that controls on-wire ID
/// encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Frequency {
	Low = 0,
	Medium = 1,
	High = 2,
	Fixed = 3,
}

/// The declared wire type of a single field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
	U8,
	I8,
	U16,
	I16,
	U32,
	I32,
	U64,
	I64,
	F32,
	F64,
	Vector3,
	Vector3D,
	Vector4,
	Quaternion,
	Color,
	Uuid,
	Ip4Addr,
	/// A little-endian port field carried inside a message body.
	Port,
	/// Fixed-length blob; the length comes from the schema, not the wire.
	FixedBytes(usize),
	/// Length-prefixed variable blob. `prefix_width` is 1 or 2 bytes,
	/// little-endian (note: trust the schema
	/// declaration rather than any byte inside the decoded object).
	VariableBytes { prefix_width: u8 },
}

/// How many times a block repeats within a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
	Single,
	FixedCount(u8),
	Variable,
}

/// One field of a block: a name paired with its wire type.
#[derive(Debug, Clone, Copy)]
pub struct Field {
	pub name: &'static str,
	pub ty: FieldType,
}

/// An ordered group of fields that appears `cardinality`-many times.
#[derive(Debug, Clone, Copy)]
pub struct Block {
	pub name: &'static str,
	pub cardinality: Cardinality,
	pub fields: &'static [Field],
}

/// A full message definition.
#[derive(Debug, Clone, Copy)]
pub struct Schema {
	pub name: &'static str,
	/// For Low/Medium: 1..255. For High: 1..65535. For Fixed: the low byte
	/// of the wire ID (the full wire encoding is `0xFFFFFF00 | id`, see
	/// `header::encode_header`).
	pub id: u32,
	pub frequency: Frequency,
	pub trusted: bool,
	pub zero_coded: bool,
	pub blocks: &'static [Block],
}
