//! Walks a [`Schema`] in declaration order to decode or encode a
//! [`Message`]'s bytes. Block order and field order both come
//! from the schema; nothing here reads a type tag off the wire.

use wire_schema::{Block as SchemaBlock, Cardinality, FieldType, Schema};
use wire_types::{Reader, Writer};
use wire_utils::error::{Result, WireError};

use crate::message::{Block, Message, Value};

fn read_field(r: &mut Reader, ty: FieldType) -> Result<Value> {
	Ok(match ty {
		FieldType::U8 => Value::U8(r.u8()?),
		FieldType::I8 => Value::I8(r.i8()?),
		FieldType::U16 => Value::U16(r.u16_le()?),
		FieldType::I16 => Value::I16(r.i16_le()?),
		FieldType::U32 => Value::U32(r.u32_le()?),
		FieldType::I32 => Value::I32(r.i32_le()?),
		FieldType::U64 => Value::U64(r.u64_le()?),
		FieldType::I64 => Value::I64(r.i64_le()?),
		FieldType::F32 => Value::F32(r.f32_le()?),
		FieldType::F64 => Value::F64(r.f64_le()?),
		FieldType::Vector3 => Value::Vector3(r.vector3()?),
		FieldType::Vector3D => Value::Vector3D(r.vector3d()?),
		FieldType::Vector4 => Value::Vector4(r.vector4()?),
		FieldType::Quaternion => Value::Quaternion(r.quaternion()?),
		FieldType::Color => Value::Color(r.color()?),
		FieldType::Uuid => Value::Uuid(r.uuid()?),
		FieldType::Ip4Addr => Value::Ip4Addr(r.ipv4()?),
		FieldType::Port => Value::Port(r.port_le()?),
		FieldType::FixedBytes(len) => Value::Bytes(r.fixed_bytes(len)?.to_vec()),
		FieldType::VariableBytes { prefix_width } => Value::Bytes(r.variable_bytes(prefix_width)?.to_vec()),
	})
}

fn write_field(w: &mut Writer, ty: FieldType, value: &Value) -> Result {
	match (ty, value) {
		(FieldType::U8, Value::U8(v)) => w.put_u8(*v),
		(FieldType::I8, Value::I8(v)) => w.put_i8(*v),
		(FieldType::U16, Value::U16(v)) => w.put_u16_le(*v),
		(FieldType::I16, Value::I16(v)) => w.put_i16_le(*v),
		(FieldType::U32, Value::U32(v)) => w.put_u32_le(*v),
		(FieldType::I32, Value::I32(v)) => w.put_i32_le(*v),
		(FieldType::U64, Value::U64(v)) => w.put_u64_le(*v),
		(FieldType::I64, Value::I64(v)) => w.put_i64_le(*v),
		(FieldType::F32, Value::F32(v)) => w.put_f32_le(*v),
		(FieldType::F64, Value::F64(v)) => w.put_f64_le(*v),
		(FieldType::Vector3, Value::Vector3(v)) => w.put_vector3(*v),
		(FieldType::Vector3D, Value::Vector3D(v)) => w.put_vector3d(*v),
		(FieldType::Vector4, Value::Vector4(v)) => w.put_vector4(*v),
		(FieldType::Quaternion, Value::Quaternion(v)) => w.put_quaternion(*v),
		(FieldType::Color, Value::Color(v)) => w.put_color(*v),
		(FieldType::Uuid, Value::Uuid(v)) => w.put_uuid(v),
		(FieldType::Ip4Addr, Value::Ip4Addr(v)) => w.put_ipv4(*v),
		(FieldType::Port, Value::Port(v)) => w.put_port_le(*v),
		(FieldType::FixedBytes(len), Value::Bytes(v)) => {
			if v.len() != len {
				return Err(WireError::FieldTooLarge);
			}
			w.put_fixed_bytes(v);
		}
		(FieldType::VariableBytes { prefix_width }, Value::Bytes(v)) => w.put_variable_bytes(v, prefix_width)?,
		_ => return Err(WireError::FieldTooLarge),
	}

	Ok(())
}

fn read_block_instance(r: &mut Reader, schema_block: &SchemaBlock) -> Result<Block> {
	let mut fields = Vec::with_capacity(schema_block.fields.len());
	for field in schema_block.fields {
		fields.push(read_field(r, field.ty)?);
	}
	Ok(Block { fields })
}

fn write_block_instance(w: &mut Writer, schema_block: &SchemaBlock, block: &Block) -> Result {
	for (field, value) in schema_block.fields.iter().zip(block.fields.iter()) {
		write_field(w, field.ty, value)?;
	}
	Ok(())
}

/// Decode `bytes` (the message body, already zero-decoded) against `schema`.
pub fn deserialize(schema: &'static Schema, bytes: &[u8]) -> Result<Message> {
	let mut r = Reader::new(bytes);
	let mut message = Message::new(schema);

	for (i, schema_block) in schema.blocks.iter().enumerate() {
		let count = match schema_block.cardinality {
			Cardinality::Single => 1,
			Cardinality::FixedCount(n) => n as usize,
			Cardinality::Variable => r.u8()? as usize,
		};

		let mut instances = Vec::with_capacity(count);
		for _ in 0..count {
			instances.push(read_block_instance(&mut r, schema_block)?);
		}
		message.blocks[i] = instances;
	}

	Ok(message)
}

/// Encode `message` into a body (not yet zero-coded) per its own schema.
pub fn serialize(message: &Message) -> Result<Vec<u8>> {
	let mut w = Writer::new();

	for (schema_block, instances) in message.schema.blocks.iter().zip(message.blocks.iter()) {
		match schema_block.cardinality {
			Cardinality::Single => {
				if instances.len() != 1 {
					return Err(WireError::VariableBlockCountOverflow);
				}
			}
			Cardinality::FixedCount(n) => {
				if instances.len() != n as usize {
					return Err(WireError::VariableBlockCountOverflow);
				}
			}
			Cardinality::Variable => {
				let count: u8 = instances.len().try_into().map_err(|_| WireError::VariableBlockCountOverflow)?;
				w.put_u8(count);
			}
		}

		for instance in instances {
			write_block_instance(&mut w, schema_block, instance)?;
		}
	}

	Ok(w.into_bytes())
}

#[cfg(test)]
mod tests {
	use wire_schema::registry;

	use super::*;

	#[test]
	fn start_ping_check_round_trips_s1_bytes() {
		let schema = registry().by_name("StartPingCheck").unwrap();
		let body = [0x07u8, 0x00, 0x00, 0x00, 0x00];

		let message = deserialize(schema, &body).unwrap();
		assert_eq!(message.block("PingCheck")[0].fields[0], Value::U8(7));
		assert_eq!(message.block("PingCheck")[0].fields[1], Value::U32(0));

		assert_eq!(serialize(&message).unwrap(), body);
	}

	#[test]
	fn variable_block_count_round_trips() {
		let schema = registry().by_name("PacketAck").unwrap();
		let mut message = Message::new(schema);
		message.blocks[0] = vec![Block { fields: vec![Value::U32(1)] }, Block { fields: vec![Value::U32(2)] }];

		let bytes = serialize(&message).unwrap();
		assert_eq!(bytes[0], 2);

		let decoded = deserialize(schema, &bytes).unwrap();
		assert_eq!(decoded.block("Packets").len(), 2);
	}

	proptest::proptest! {
		#[test]
		fn packet_ack_round_trips_any_id_list(ids in proptest::collection::vec(proptest::prelude::any::<u32>(), 0..255)) {
			let schema = registry().by_name("PacketAck").unwrap();
			let mut message = Message::new(schema);
			message.blocks[0] = ids.iter().map(|id| Block { fields: vec![Value::U32(*id)] }).collect();

			let bytes = serialize(&message).unwrap();
			let decoded = deserialize(schema, &bytes).unwrap();

			let decoded_ids: Vec<u32> = decoded.block("Packets").iter().map(|b| b.fields[0].as_u32().unwrap()).collect();
			proptest::prop_assert_eq!(decoded_ids, ids);
		}
	}
}
