//! Static schema definitions for the core message catalogue. Field
//! layouts follow the two worked wire examples (`StartPingCheck`'s body,
//! chat's Latin-1 string) and are otherwise the minimal plausible layout
//! for each message's stated purpose; nothing here reaches past what
//! those messages are documented to carry.

use crate::types::{Block, Cardinality, Field, FieldType, Frequency, Schema};

const fn f(name: &'static str, ty: FieldType) -> Field {
	Field { name, ty }
}

pub static CATALOGUE: [Schema; 17] = [
	Schema {
		name: "StartPingCheck",
		id: 1,
		frequency: Frequency::Low,
		trusted: false,
		zero_coded: false,
		blocks: &[Block {
			name: "PingCheck",
			cardinality: Cardinality::Single,
			fields: &[f("PingID", FieldType::U8), f("OldestUnacked", FieldType::U32)],
		}],
	},
	Schema {
		name: "CompletePingCheck",
		id: 2,
		frequency: Frequency::Low,
		trusted: false,
		zero_coded: false,
		blocks: &[Block { name: "PingCheck", cardinality: Cardinality::Single, fields: &[f("PingID", FieldType::U8)] }],
	},
	Schema {
		name: "AgentUpdate",
		id: 4,
		frequency: Frequency::Low,
		trusted: true,
		zero_coded: true,
		blocks: &[Block {
			name: "AgentData",
			cardinality: Cardinality::Single,
			fields: &[
				f("AgentID", FieldType::Uuid),
				f("SessionID", FieldType::Uuid),
				f("BodyRotation", FieldType::Quaternion),
				f("HeadRotation", FieldType::Quaternion),
				f("State", FieldType::U8),
				f("CameraCenter", FieldType::Vector3),
				f("CameraAtAxis", FieldType::Vector3),
				f("CameraLeftAxis", FieldType::Vector3),
				f("CameraUpAxis", FieldType::Vector3),
				f("Far", FieldType::F32),
				f("ControlFlags", FieldType::U32),
				f("Flags", FieldType::U8),
			],
		}],
	},
	Schema {
		name: "UseCircuitCode",
		id: 3,
		frequency: Frequency::Fixed,
		trusted: true,
		zero_coded: false,
		blocks: &[Block {
			name: "CircuitCode",
			cardinality: Cardinality::Single,
			fields: &[f("Code", FieldType::U32), f("SessionID", FieldType::Uuid), f("ID", FieldType::Uuid)],
		}],
	},
	Schema {
		name: "ChatFromViewer",
		id: 80,
		frequency: Frequency::High,
		trusted: true,
		zero_coded: true,
		blocks: &[
			Block {
				name: "AgentData",
				cardinality: Cardinality::Single,
				fields: &[f("AgentID", FieldType::Uuid), f("SessionID", FieldType::Uuid)],
			},
			Block {
				name: "ChatData",
				cardinality: Cardinality::Single,
				fields: &[
					f("Message", FieldType::VariableBytes { prefix_width: 2 }),
					f("Type", FieldType::U8),
					f("Channel", FieldType::I32),
				],
			},
		],
	},
	Schema {
		name: "AgentThrottle",
		id: 81,
		frequency: Frequency::High,
		trusted: true,
		zero_coded: true,
		blocks: &[
			Block {
				name: "AgentData",
				cardinality: Cardinality::Single,
				fields: &[f("AgentID", FieldType::Uuid), f("SessionID", FieldType::Uuid)],
			},
			Block {
				name: "Throttle",
				cardinality: Cardinality::Single,
				fields: &[f("GenCounter", FieldType::U32), f("Throttles", FieldType::VariableBytes { prefix_width: 1 })],
			},
		],
	},
	Schema {
		name: "AgentFOV",
		id: 82,
		frequency: Frequency::High,
		trusted: true,
		zero_coded: false,
		blocks: &[
			Block {
				name: "AgentData",
				cardinality: Cardinality::Single,
				fields: &[f("AgentID", FieldType::Uuid), f("SessionID", FieldType::Uuid)],
			},
			Block {
				name: "FOVBlock",
				cardinality: Cardinality::Single,
				fields: &[f("GenCounter", FieldType::U32), f("VerticalAngle", FieldType::F32)],
			},
		],
	},
	Schema {
		name: "AgentHeightWidth",
		id: 83,
		frequency: Frequency::High,
		trusted: true,
		zero_coded: false,
		blocks: &[
			Block {
				name: "AgentData",
				cardinality: Cardinality::Single,
				fields: &[f("AgentID", FieldType::Uuid), f("SessionID", FieldType::Uuid), f("CircuitCode", FieldType::U32)],
			},
			Block {
				name: "HeightWidthBlock",
				cardinality: Cardinality::Single,
				fields: &[f("GenCounter", FieldType::U32), f("Height", FieldType::U16), f("Width", FieldType::U16)],
			},
		],
	},
	Schema {
		name: "ChatFromSimulator",
		id: 139,
		frequency: Frequency::High,
		trusted: false,
		zero_coded: false,
		blocks: &[Block {
			name: "ChatData",
			cardinality: Cardinality::Single,
			fields: &[
				f("FromName", FieldType::VariableBytes { prefix_width: 1 }),
				f("SourceID", FieldType::Uuid),
				f("OwnerID", FieldType::Uuid),
				f("SourceType", FieldType::U8),
				f("ChatType", FieldType::U8),
				f("Audible", FieldType::U8),
				f("Position", FieldType::Vector3),
				f("Message", FieldType::VariableBytes { prefix_width: 2 }),
			],
		}],
	},
	Schema {
		name: "RegionHandshake",
		id: 148,
		frequency: Frequency::High,
		trusted: false,
		zero_coded: true,
		blocks: &[
			Block {
				name: "RegionInfo",
				cardinality: Cardinality::Single,
				fields: &[
					f("RegionFlags", FieldType::U32),
					f("SimAccess", FieldType::U8),
					f("SimName", FieldType::VariableBytes { prefix_width: 1 }),
					f("SimOwner", FieldType::Uuid),
					f("WaterHeight", FieldType::F32),
					f("RegionHandle", FieldType::U64),
					f("CacheID", FieldType::Uuid),
				],
			},
			Block { name: "RegionInfo2", cardinality: Cardinality::Single, fields: &[f("RegionID", FieldType::Uuid)] },
		],
	},
	Schema {
		name: "RegionHandshakeReply",
		id: 149,
		frequency: Frequency::High,
		trusted: true,
		zero_coded: true,
		blocks: &[
			Block {
				name: "AgentData",
				cardinality: Cardinality::Single,
				fields: &[f("AgentID", FieldType::Uuid), f("SessionID", FieldType::Uuid)],
			},
			Block { name: "RegionInfo", cardinality: Cardinality::Single, fields: &[f("Flags", FieldType::U32)] },
		],
	},
	Schema {
		name: "ImprovedInstantMessage",
		id: 254,
		frequency: Frequency::High,
		trusted: true,
		zero_coded: true,
		blocks: &[
			Block {
				name: "AgentData",
				cardinality: Cardinality::Single,
				fields: &[f("AgentID", FieldType::Uuid), f("SessionID", FieldType::Uuid)],
			},
			Block {
				name: "MessageBlock",
				cardinality: Cardinality::Single,
				fields: &[
					f("FromGroup", FieldType::U8),
					f("ToAgentID", FieldType::Uuid),
					f("ParentEstateID", FieldType::U32),
					f("RegionID", FieldType::Uuid),
					f("Position", FieldType::Vector3),
					f("Offline", FieldType::U8),
					f("Dialog", FieldType::U8),
					f("ID", FieldType::Uuid),
					f("Timestamp", FieldType::U32),
					f("FromAgentName", FieldType::VariableBytes { prefix_width: 1 }),
					f("Message", FieldType::VariableBytes { prefix_width: 2 }),
					f("BinaryBucket", FieldType::VariableBytes { prefix_width: 2 }),
				],
			},
		],
	},
	Schema {
		name: "TeleportFinish",
		id: 69,
		frequency: Frequency::High,
		trusted: false,
		zero_coded: false,
		blocks: &[Block {
			name: "Info",
			cardinality: Cardinality::Single,
			fields: &[
				f("AgentID", FieldType::Uuid),
				f("LocationID", FieldType::U32),
				f("SimIP", FieldType::Ip4Addr),
				f("SimPort", FieldType::Port),
				f("RegionHandle", FieldType::U64),
				f("SeedCapability", FieldType::VariableBytes { prefix_width: 2 }),
				f("SimAccess", FieldType::U8),
				f("TeleportFlags", FieldType::U32),
			],
		}],
	},
	Schema {
		name: "CompleteAgentMovement",
		id: 249,
		frequency: Frequency::Fixed,
		trusted: true,
		zero_coded: false,
		blocks: &[Block {
			name: "AgentData",
			cardinality: Cardinality::Single,
			fields: &[f("AgentID", FieldType::Uuid), f("SessionID", FieldType::Uuid), f("CircuitCode", FieldType::U32)],
		}],
	},
	Schema {
		name: "LogoutRequest",
		id: 252,
		frequency: Frequency::Fixed,
		trusted: true,
		zero_coded: false,
		blocks: &[Block {
			name: "AgentData",
			cardinality: Cardinality::Single,
			fields: &[f("AgentID", FieldType::Uuid), f("SessionID", FieldType::Uuid)],
		}],
	},
	Schema {
		name: "PacketAck",
		id: 0xFB,
		frequency: Frequency::Fixed,
		trusted: false,
		zero_coded: false,
		blocks: &[Block { name: "Packets", cardinality: Cardinality::Variable, fields: &[f("ID", FieldType::U32)] }],
	},
	Schema {
		name: "CloseCircuit",
		id: 0xFD,
		frequency: Frequency::Fixed,
		trusted: false,
		zero_coded: false,
		blocks: &[],
	},
];

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn start_ping_check_layout_matches_s1() {
		let schema = CATALOGUE.iter().find(|s| s.name == "StartPingCheck").unwrap();
		assert_eq!(schema.blocks[0].fields[0].name, "PingID");
		assert_eq!(schema.blocks[0].fields[1].name, "OldestUnacked");
	}

	#[test]
	fn close_circuit_carries_no_body() {
		let schema = CATALOGUE.iter().find(|s| s.name == "CloseCircuit").unwrap();
		assert!(schema.blocks.is_empty());
	}

	#[test]
	fn frequency_classes_match_the_documented_wire_table() {
		let expected: &[(&str, Frequency, u32, bool)] = &[
			("StartPingCheck", Frequency::Low, 1, false),
			("CompletePingCheck", Frequency::Low, 2, false),
			("AgentUpdate", Frequency::Low, 4, true),
			("UseCircuitCode", Frequency::Fixed, 3, false),
			("ChatFromViewer", Frequency::High, 80, true),
			("AgentThrottle", Frequency::High, 81, true),
			("AgentFOV", Frequency::High, 82, false),
			("AgentHeightWidth", Frequency::High, 83, false),
			("ChatFromSimulator", Frequency::High, 139, false),
			("RegionHandshake", Frequency::High, 148, true),
			("RegionHandshakeReply", Frequency::High, 149, true),
			("ImprovedInstantMessage", Frequency::High, 254, true),
			("TeleportFinish", Frequency::High, 69, false),
			("CompleteAgentMovement", Frequency::Fixed, 249, false),
			("LogoutRequest", Frequency::Fixed, 252, false),
			("PacketAck", Frequency::Fixed, 0xFB, false),
			("CloseCircuit", Frequency::Fixed, 0xFD, false),
		];

		for (name, frequency, id, zero_coded) in expected {
			let schema = CATALOGUE.iter().find(|s| s.name == *name).unwrap_or_else(|| panic!("{name} missing from catalogue"));
			assert_eq!(schema.frequency, *frequency, "{name} frequency");
			assert_eq!(schema.id, *id, "{name} id");
			assert_eq!(schema.zero_coded, *zero_coded, "{name} zero_coded");
		}
	}
}
