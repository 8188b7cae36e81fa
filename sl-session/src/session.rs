use std::net::{IpAddr, SocketAddr};
use std::sync::mpsc::{self, Receiver};
use std::sync::Mutex;
use std::time::Duration;

use log::info;
use wire_codec::{Block, Message, Value};
use wire_schema::registry;
use wire_types::Uuid;
use wire_utils::error::{Result, WireError};
use wire_utils::latin1;
use wire_circuit::Circuit;

use crate::login::{LoginClient, LoginToken};
use crate::types::{ChatMessage, ChatSourceType, ChatType, ImDialog, InstantMessage};

/// Message names a [`Session`] forwards to its own [`recv_timeout`](Session::recv_timeout)
/// inbox. Anything else dispatched on the circuit (pings, acks, the
/// handshake) stays internal to [`Circuit`].
const FORWARDED_MESSAGES: [&str; 4] = ["ChatFromSimulator", "ImprovedInstantMessage", "TeleportFinish", "RegionHandshake"];

/// Subscribe to every name in [`FORWARDED_MESSAGES`] on `circuit`, forwarding
/// each arrival into a fresh channel. Re-run on every new `Circuit` (e.g.
/// after a teleport), since subscriptions don't carry over between circuits.
fn subscribe_inbox(circuit: &Circuit) -> Receiver<Message> {
	let (tx, rx) = mpsc::channel();
	for name in FORWARDED_MESSAGES {
		let tx = Mutex::new(tx.clone());
		circuit.subscribe(name, move |message: &Message| {
			let _ = tx.lock().unwrap().send(message.clone());
		});
	}
	rx
}

/// A logged-in, circuit-connected session. This is the API a
/// viewer application is expected to drive; everything below it (packets,
/// schemas, the handshake) stays internal.
pub struct Session {
	circuit: Circuit,
	local_addr: SocketAddr,
	agent_id: Uuid,
	session_id: Uuid,
	inbox: Receiver<Message>,
}

impl Session {
	/// Log in through `login`, then open and complete the handshake on the
	/// circuit the login token names.
	pub fn connect(login: &dyn LoginClient, first_name: &str, last_name: &str, password: &str, start_location: &str) -> Result<Session> {
		let token = login.login(first_name, last_name, password, start_location)?;
		Self::from_token(token)
	}

	fn from_token(token: LoginToken) -> Result<Session> {
		if token.login != "true" {
			return Err(WireError::LoginRefused(token.message));
		}

		let local_addr = SocketAddr::new(IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED), 0);
		let peer = SocketAddr::new(IpAddr::V4(token.sim_ip), token.sim_port);

		info!("connecting circuit to {peer} (region {},{})", token.region_x, token.region_y);

		let circuit = Circuit::connect(local_addr, peer, token.circuit_code, token.agent_id, token.session_id)?;
		let inbox = subscribe_inbox(&circuit);

		Ok(Session { circuit, local_addr, agent_id: token.agent_id, session_id: token.session_id, inbox })
	}

	/// Send local chat on `channel` (0 is the public channel everyone hears).
	pub fn send_chat(&self, message: &str, channel: i32, chat_type: ChatType) -> Result<()> {
		let schema = registry().by_name("ChatFromViewer").expect("ChatFromViewer is in the catalogue");
		let mut msg = Message::new(schema);
		msg.blocks[0] = vec![Block { fields: vec![Value::Uuid(self.agent_id), Value::Uuid(self.session_id)] }];
		msg.blocks[1] = vec![Block {
			fields: vec![Value::Bytes(latin1::encode_nul_terminated(message)?), Value::U8(chat_type as u8), Value::I32(channel)],
		}];

		self.circuit.send_reliable(&msg)?;
		Ok(())
	}

	/// Send an instant message to another agent.
	pub fn send_im(&self, to_agent: Uuid, message: &str, dialog: ImDialog) -> Result<()> {
		let schema = registry().by_name("ImprovedInstantMessage").expect("ImprovedInstantMessage is in the catalogue");
		let mut msg = Message::new(schema);
		msg.blocks[0] = vec![Block { fields: vec![Value::Uuid(self.agent_id), Value::Uuid(self.session_id)] }];
		msg.blocks[1] = vec![Block {
			fields: vec![
				Value::U8(0),
				Value::Uuid(to_agent),
				Value::U32(0),
				Value::Uuid(Uuid::NIL),
				Value::Vector3(wire_types::Vector3::default()),
				Value::U8(0),
				Value::U8(dialog as u8),
				Value::Uuid(Uuid::NIL),
				Value::U32(0),
				Value::Bytes(Vec::new()),
				Value::Bytes(latin1::encode_nul_terminated(message)?),
				Value::Bytes(Vec::new()),
			],
		}];

		self.circuit.send_reliable(&msg)?;
		Ok(())
	}

	/// Teleport by re-logging in at a new start location, rather than
	/// reconstructing `TeleportLocationRequest`'s undocumented layout: this
	/// drives the one teleport entry point that is pinned down end to end,
	/// login's `uri:<Region>&X&Y&Z` start-location string. The existing
	/// circuit is torn down and replaced with one to the destination sim.
	pub fn teleport(&mut self, login: &dyn LoginClient, first_name: &str, last_name: &str, password: &str, region: &str, x: f32, y: f32, z: f32) -> Result<()> {
		let start_location = format!("uri:{region}&{x}&{y}&{z}");
		let token = login.login(first_name, last_name, password, &start_location)?;
		if token.login != "true" {
			return Err(WireError::LoginRefused(token.message));
		}

		let peer = SocketAddr::new(IpAddr::V4(token.sim_ip), token.sim_port);
		info!("teleporting to {region} ({peer})");

		let circuit = Circuit::connect(self.local_addr, peer, token.circuit_code, token.agent_id, token.session_id)?;
		self.inbox = subscribe_inbox(&circuit);
		self.circuit = circuit;
		self.agent_id = token.agent_id;
		self.session_id = token.session_id;

		Ok(())
	}

	/// The next inbound application message (chat, IM, region handshake,
	/// teleport finish, ...), if one arrives within `timeout`. Backed by
	/// [`Circuit::subscribe`]; callers needing independent delivery of the
	/// same message name can subscribe on the circuit directly instead.
	pub fn recv_timeout(&self, timeout: Duration) -> Option<Message> {
		self.inbox.recv_timeout(timeout).ok()
	}

	/// Register a callback invoked whenever a message named `message_name`
	/// arrives, independent of and in addition to `recv_timeout`'s own
	/// inbox. See [`Circuit::subscribe`] for the non-blocking requirement on
	/// `callback`.
	pub fn subscribe<F>(&self, message_name: &'static str, callback: F)
	where
		F: Fn(&Message) + Send + Sync + 'static,
	{
		self.circuit.subscribe(message_name, callback);
	}

	/// Send `LogoutRequest` and wait for the sim to close the circuit.
	pub fn logout(self) -> Result<()> {
		self.circuit.logout()
	}

	/// Decode a `ChatFromSimulator` message's `ChatData` block.
	pub fn decode_chat(message: &Message) -> ChatMessage {
		let block = &message.block("ChatData")[0];
		ChatMessage {
			from_name: block.fields[0].as_bytes().map(latin1::decode_nul_terminated).unwrap_or_default(),
			source_id: block.fields[1].as_uuid().unwrap_or(Uuid::NIL),
			owner_id: block.fields[2].as_uuid().unwrap_or(Uuid::NIL),
			source_type: block.fields[3].as_u8().and_then(ChatSourceType::from_u8),
			chat_type: block.fields[4].as_u8().and_then(ChatType::from_u8),
			message: block.fields[7].as_bytes().map(latin1::decode_nul_terminated).unwrap_or_default(),
		}
	}

	/// Decode an `ImprovedInstantMessage`'s `MessageBlock`.
	pub fn decode_im(message: &Message) -> InstantMessage {
		let block = &message.block("MessageBlock")[0];
		InstantMessage {
			from_agent_name: block.fields[9].as_bytes().map(latin1::decode_nul_terminated).unwrap_or_default(),
			dialog: block.fields[6].as_u8().and_then(ImDialog::from_u8),
			message: block.fields[10].as_bytes().map(latin1::decode_nul_terminated).unwrap_or_default(),
		}
	}
}
