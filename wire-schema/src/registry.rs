//! Process-wide schema lookup, populated once from the static catalogue.
//! Collisions in either index are a programmer error in the catalogue
//! itself, not a runtime condition, so registration panics rather than
//! returning a `Result`.

use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::catalogue::CATALOGUE;
use crate::types::{Frequency, Schema};

pub struct Registry {
	by_name: HashMap<&'static str, &'static Schema>,
	by_wire: HashMap<(Frequency, u32), &'static Schema>,
}

impl Registry {
	fn build(schemas: &'static [Schema]) -> Self {
		let mut by_name = HashMap::with_capacity(schemas.len());
		let mut by_wire = HashMap::with_capacity(schemas.len());

		for schema in schemas {
			if by_name.insert(schema.name, schema).is_some() {
				panic!("duplicate schema name in catalogue: {}", schema.name);
			}

			let key = (schema.frequency, schema.id);
			if by_wire.insert(key, schema).is_some() {
				panic!("duplicate wire id in catalogue: {:?} {}", schema.frequency, schema.id);
			}
		}

		Self { by_name, by_wire }
	}

	pub fn by_name(&self, name: &str) -> Option<&'static Schema> {
		self.by_name.get(name).copied()
	}

	pub fn by_wire_id(&self, frequency: Frequency, id: u32) -> Option<&'static Schema> {
		self.by_wire.get(&(frequency, id)).copied()
	}
}

lazy_static! {
	static ref REGISTRY: Registry = Registry::build(&CATALOGUE);
}

/// The process-wide message registry.
pub fn registry() -> &'static Registry {
	&REGISTRY
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn looks_up_a_known_message_both_ways() {
		let by_name = registry().by_name("ChatFromViewer").unwrap();
		let by_wire = registry().by_wire_id(by_name.frequency, by_name.id).unwrap();
		assert_eq!(by_name.name, by_wire.name);
	}

	#[test]
	fn catalogue_has_no_duplicate_names_or_wire_ids() {
		// Registry::build already panics on collisions; calling registry()
		// at all is the assertion.
		assert!(registry().by_name("PacketAck").is_some());
	}
}
