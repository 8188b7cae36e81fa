use std::net::Ipv4Addr;

use wire_schema::Schema;
use wire_types::{Color, Quaternion, Uuid, Vector3, Vector3D, Vector4};

/// A single decoded field value. The variant always matches the
/// `FieldType` the schema declared for that field; `serialize`/`deserialize`
/// are the only code that need to know both sides of that contract.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
	U8(u8),
	I8(i8),
	U16(u16),
	I16(i16),
	U32(u32),
	I32(i32),
	U64(u64),
	I64(i64),
	F32(f32),
	F64(f64),
	Vector3(Vector3),
	Vector3D(Vector3D),
	Vector4(Vector4),
	Quaternion(Quaternion),
	Color(Color),
	Uuid(Uuid),
	Ip4Addr(Ipv4Addr),
	Port(u16),
	Bytes(Vec<u8>),
}

impl Value {
	pub fn as_u8(&self) -> Option<u8> {
		match self {
			Value::U8(v) => Some(*v),
			_ => None,
		}
	}

	pub fn as_u32(&self) -> Option<u32> {
		match self {
			Value::U32(v) => Some(*v),
			_ => None,
		}
	}

	pub fn as_u64(&self) -> Option<u64> {
		match self {
			Value::U64(v) => Some(*v),
			_ => None,
		}
	}

	pub fn as_uuid(&self) -> Option<Uuid> {
		match self {
			Value::Uuid(v) => Some(*v),
			_ => None,
		}
	}

	pub fn as_bytes(&self) -> Option<&[u8]> {
		match self {
			Value::Bytes(v) => Some(v),
			_ => None,
		}
	}
}

/// One instance of a schema block: the field values in declaration order.
#[derive(Debug, Clone, Default)]
pub struct Block {
	pub fields: Vec<Value>,
}

impl Block {
	/// Look up a field's value by name, per the schema's field list. O(n)
	/// in the block's field count, which is always small.
	pub fn field(&self, schema_block: &wire_schema::Block, name: &str) -> Option<&Value> {
		schema_block.fields.iter().position(|f| f.name == name).and_then(|i| self.fields.get(i))
	}
}

/// A decoded message: the schema it was decoded against plus one
/// `Vec<Block>` per schema block (length 1 for `Single`, `n` for
/// `FixedCount(n)`, and however many the wire declared for `Variable`).
#[derive(Debug, Clone)]
pub struct Message {
	pub schema: &'static Schema,
	pub blocks: Vec<Vec<Block>>,
}

impl Message {
	pub fn new(schema: &'static Schema) -> Self {
		Self { schema, blocks: vec![Vec::new(); schema.blocks.len()] }
	}

	/// The block instances for the schema block named `name`, or an empty
	/// slice if the name isn't in this message's schema.
	pub fn block(&self, name: &str) -> &[Block] {
		match self.schema.blocks.iter().position(|b| b.name == name) {
			Some(i) => &self.blocks[i],
			None => &[],
		}
	}
}
