//! The circuit state machine and its concurrency model:
//! a single blocking receive thread drives the handshake, retransmits, ACK
//! flushing and keepalives off one 1-second read timeout; producer threads
//! only ever touch the circuit through [`Circuit::send_reliable`] /
//! [`Circuit::send_unreliable`], which take the same mutex the receive
//! thread uses. No I/O happens while the mutex is held.

use std::collections::HashMap;
use std::net::{SocketAddr, UdpSocket};
use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, trace, warn};
use wire_codec::{deserialize, serialize, zerocode_decode, zerocode_encode, Block, Message, Value};
use wire_schema::{decode_header, encode_header, registry};
use wire_types::Uuid;
use wire_utils::error::{Result, WireError};
use wire_utils::latin1;

use crate::packet::{Packet, FLAG_RELIABLE, FLAG_RESENT, FLAG_ZEROCODE};

const RETRANSMIT_INTERVAL: Duration = Duration::from_secs(1);
const MAX_RETRANSMIT_ATTEMPTS: u32 = 6;
const MAX_RETRANSMIT_SPAN: Duration = Duration::from_secs(10);
const ACK_FLUSH_INTERVAL: Duration = Duration::from_secs(1);
const KEEPALIVE_INTERVAL: Duration = Duration::from_millis(500);
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(45);
const LOGOUT_GRACE: Duration = Duration::from_secs(2);
const SOCKET_READ_TIMEOUT: Duration = Duration::from_secs(1);
const IO_FAILURE_CLOSE_THRESHOLD: Duration = Duration::from_secs(5);

/// Where a circuit is in its connection lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeState {
	Connecting,
	MovementSent,
	Landed,
	LoggingOut,
	Closed,
}

/// A callback registered against a message name via [`Circuit::subscribe`].
/// Runs inline on the receive thread and must not block.
type Subscribers = HashMap<&'static str, Vec<Arc<dyn Fn(&Message) + Send + Sync>>>;

struct Unacked {
	bytes: Vec<u8>,
	name: &'static str,
	sent_at: Instant,
	first_sent_at: Instant,
	attempts: u32,
}

struct Shared {
	next_sequence: u32,
	unacked: HashMap<u32, Unacked>,
	pending_acks: Vec<u32>,
	seen_inbound: HashMap<u32, Instant>,
	last_ack_flush: Instant,
	last_keepalive: Instant,
	agent_id: Uuid,
	session_id: Uuid,
	circuit_code: u32,
	use_circuit_code_seq: Option<u32>,
	current_region_name: Option<String>,
}

impl Shared {
	fn next_sequence(&mut self) -> u32 {
		let seq = self.next_sequence;
		self.next_sequence = self.next_sequence.wrapping_add(1);
		seq
	}
}

type HandshakeCell = (Mutex<HandshakeState>, Condvar);

fn set_state(handshake: &HandshakeCell, state: HandshakeState) {
	let (lock, cvar) = handshake;
	*lock.lock().unwrap() = state;
	cvar.notify_all();
}

/// Build and send one message, handling sequencing, the reliable flag, any
/// zero-coding the schema calls for, and ACK piggybacking. Shared between
/// the public send methods and the receive thread's own internal replies
/// (ping, ack flush, handshake advancement) so both paths go through the
/// same bookkeeping.
fn send_message(
	socket: &UdpSocket,
	shared: &Arc<Mutex<Shared>>,
	handshake: &Arc<HandshakeCell>,
	message: &Message,
	reliable: bool,
) -> Result<u32> {
	if *handshake.0.lock().unwrap() == HandshakeState::Closed {
		return Err(WireError::CircuitClosed);
	}

	let header = encode_header(message.schema.frequency, message.schema.id);
	let mut body = header.to_vec();
	body.extend(serialize(message)?);

	let (body, zerocoded) = if message.schema.zero_coded { zerocode_encode(&body) } else { (body, false) };

	let mut guard = shared.lock().unwrap();
	let sequence = guard.next_sequence();

	let mut flags = 0u8;
	if reliable {
		flags |= FLAG_RELIABLE;
	}
	if zerocoded {
		flags |= FLAG_ZEROCODE;
	}

	let acks = std::mem::take(&mut guard.pending_acks);
	guard.last_ack_flush = Instant::now();

	let packet = Packet { flags, sequence, extra: Vec::new(), body, acks };
	let bytes = packet.encode();

	if reliable {
		let now = Instant::now();
		guard
			.unacked
			.insert(sequence, Unacked { bytes: bytes.clone(), name: message.schema.name, sent_at: now, first_sent_at: now, attempts: 1 });
	}

	drop(guard);
	socket.send(&bytes)?;
	trace!("sent {} (seq {sequence}, reliable={reliable})", message.schema.name);

	Ok(sequence)
}

fn notify_subscribers(subscribers: &Arc<Mutex<Subscribers>>, message: &Message) {
	let callbacks = subscribers.lock().unwrap().get(message.schema.name).cloned().unwrap_or_default();
	for callback in &callbacks {
		callback(message);
	}
}

/// A live UDP circuit to one simulator.
pub struct Circuit {
	socket: Arc<UdpSocket>,
	shared: Arc<Mutex<Shared>>,
	handshake: Arc<HandshakeCell>,
	subscribers: Arc<Mutex<Subscribers>>,
	stop: Arc<Mutex<bool>>,
	worker: Option<thread::JoinHandle<()>>,
}

impl Circuit {
	/// Open a circuit and drive it through the handshake to `Landed`,
	/// blocking the calling thread until that happens or
	/// [`HANDSHAKE_TIMEOUT`] elapses.
	pub fn connect(local_addr: SocketAddr, peer: SocketAddr, circuit_code: u32, agent_id: Uuid, session_id: Uuid) -> Result<Circuit> {
		let socket = UdpSocket::bind(local_addr)?;
		socket.connect(peer)?;
		socket.set_read_timeout(Some(SOCKET_READ_TIMEOUT))?;
		let socket = Arc::new(socket);

		let now = Instant::now();
		let shared = Arc::new(Mutex::new(Shared {
			next_sequence: 1,
			unacked: HashMap::new(),
			pending_acks: Vec::new(),
			seen_inbound: HashMap::new(),
			last_ack_flush: now,
			last_keepalive: now,
			agent_id,
			session_id,
			circuit_code,
			use_circuit_code_seq: None,
			current_region_name: None,
		}));

		let handshake = Arc::new((Mutex::new(HandshakeState::Connecting), Condvar::new()));
		let subscribers: Arc<Mutex<Subscribers>> = Arc::new(Mutex::new(HashMap::new()));
		let stop = Arc::new(Mutex::new(false));

		let worker = {
			let socket = socket.clone();
			let shared = shared.clone();
			let handshake = handshake.clone();
			let subscribers = subscribers.clone();
			let stop = stop.clone();
			thread::spawn(move || receive_loop(socket, peer, shared, handshake, subscribers, stop))
		};

		let circuit = Circuit { socket, shared, handshake, subscribers, stop, worker: Some(worker) };
		circuit.send_use_circuit_code()?;
		circuit.await_state(HandshakeState::Landed, HANDSHAKE_TIMEOUT)?;

		Ok(circuit)
	}

	fn send_use_circuit_code(&self) -> Result<()> {
		let schema = registry().by_name("UseCircuitCode").expect("UseCircuitCode is in the catalogue");
		let (agent_id, session_id, circuit_code) = {
			let guard = self.shared.lock().unwrap();
			(guard.agent_id, guard.session_id, guard.circuit_code)
		};

		let mut message = Message::new(schema);
		message.blocks[0] =
			vec![Block { fields: vec![Value::U32(circuit_code), Value::Uuid(session_id), Value::Uuid(agent_id)] }];

		let sequence = send_message(&self.socket, &self.shared, &self.handshake, &message, true)?;
		self.shared.lock().unwrap().use_circuit_code_seq = Some(sequence);
		Ok(())
	}

	fn await_state(&self, target: HandshakeState, timeout: Duration) -> Result<()> {
		let (lock, cvar) = &*self.handshake;
		let deadline = Instant::now() + timeout;
		let mut state = lock.lock().unwrap();

		while *state != target && *state != HandshakeState::Closed {
			let remaining = deadline.saturating_duration_since(Instant::now());
			if remaining.is_zero() {
				return Err(WireError::HandshakeTimeout);
			}

			let (guard, result) = cvar.wait_timeout(state, remaining).unwrap();
			state = guard;
			if result.timed_out() && *state != target {
				return Err(WireError::HandshakeTimeout);
			}
		}

		if *state == HandshakeState::Closed && target != HandshakeState::Closed {
			return Err(WireError::HandshakeTimeout);
		}

		Ok(())
	}

	/// Register a callback invoked inline on the receive thread whenever a
	/// message named `message_name` is dispatched, in addition to any
	/// handling the circuit itself gives that message (ping replies, ACK
	/// bookkeeping, the handshake). Multiple subscribers may register for
	/// the same name; each runs, in registration order, every time such a
	/// message arrives. Callbacks must not block: do any slow work by
	/// enqueuing onto a channel of the caller's own.
	pub fn subscribe<F>(&self, message_name: &'static str, callback: F)
	where
		F: Fn(&Message) + Send + Sync + 'static,
	{
		self.subscribers.lock().unwrap().entry(message_name).or_default().push(Arc::new(callback));
	}

	pub fn state(&self) -> HandshakeState {
		*self.handshake.0.lock().unwrap()
	}

	/// The region name from the most recently received `RegionHandshake`,
	/// if the circuit has completed at least one handshake.
	pub fn current_region_name(&self) -> Option<String> {
		self.shared.lock().unwrap().current_region_name.clone()
	}

	/// Send a message that demands delivery confirmation; it is retransmitted
	/// every second, up to [`MAX_RETRANSMIT_ATTEMPTS`] times or
	/// [`MAX_RETRANSMIT_SPAN`], whichever comes first.
	pub fn send_reliable(&self, message: &Message) -> Result<u32> {
		send_message(&self.socket, &self.shared, &self.handshake, message, true)
	}

	pub fn send_unreliable(&self, message: &Message) -> Result<u32> {
		send_message(&self.socket, &self.shared, &self.handshake, message, false)
	}

	/// Begin the logout handshake: send `LogoutRequest` reliably and wait up
	/// to two seconds for an ack or `CloseCircuit` before tearing down the
	/// worker thread.
	pub fn logout(mut self) -> Result<()> {
		let schema = registry().by_name("LogoutRequest").expect("LogoutRequest is in the catalogue");
		let (agent_id, session_id) = {
			let guard = self.shared.lock().unwrap();
			(guard.agent_id, guard.session_id)
		};

		let mut message = Message::new(schema);
		message.blocks[0] = vec![Block { fields: vec![Value::Uuid(agent_id), Value::Uuid(session_id)] }];

		set_state(&self.handshake, HandshakeState::LoggingOut);
		self.send_reliable(&message)?;
		let _ = self.await_state(HandshakeState::Closed, LOGOUT_GRACE);

		self.shutdown();
		Ok(())
	}

	fn shutdown(&mut self) {
		*self.stop.lock().unwrap() = true;
		if let Some(worker) = self.worker.take() {
			let _ = worker.join();
		}
	}
}

impl Drop for Circuit {
	fn drop(&mut self) {
		self.shutdown();
	}
}

fn receive_loop(
	socket: Arc<UdpSocket>,
	peer: SocketAddr,
	shared: Arc<Mutex<Shared>>,
	handshake: Arc<HandshakeCell>,
	subscribers: Arc<Mutex<Subscribers>>,
	stop: Arc<Mutex<bool>>,
) {
	let mut buf = [0u8; 4096];
	let mut io_failure_since: Option<Instant> = None;

	loop {
		if *stop.lock().unwrap() {
			return;
		}
		if *handshake.0.lock().unwrap() == HandshakeState::Closed {
			return;
		}

		match socket.recv(&mut buf) {
			Ok(n) => {
				io_failure_since = None;
				if let Err(err) = handle_datagram(&buf[..n], &socket, &shared, &handshake, &subscribers) {
					warn!("dropping malformed datagram from {peer}: {err} ({})", latin1::hexdump(&buf[..n.min(64)]));
				}
			}
			Err(err) if matches!(err.kind(), std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut) => {}
			Err(err) => {
				warn!("socket error on circuit to {peer}: {err}");
				let since = *io_failure_since.get_or_insert(Instant::now());
				if Instant::now().duration_since(since) >= IO_FAILURE_CLOSE_THRESHOLD {
					warn!("closing circuit to {peer} after persistent I/O failure");
					set_state(&handshake, HandshakeState::Closed);
					return;
				}
			}
		}

		if let Err(err) = run_timers(&socket, &shared, &handshake) {
			warn!("timer tick failed for circuit to {peer}: {err}");
		}
	}
}

/// Remove `acked` sequences from the unacked table, and if the still-pending
/// `UseCircuitCode` was among them, advance Connecting -> MovementSent by
/// sending `CompleteAgentMovement`.
fn handle_acks(acked: &[u32], socket: &UdpSocket, shared: &Arc<Mutex<Shared>>, handshake: &Arc<HandshakeCell>) -> Result<()> {
	let mut use_circuit_code_acked = false;

	{
		let mut guard = shared.lock().unwrap();
		for id in acked {
			guard.unacked.remove(id);
			if guard.use_circuit_code_seq == Some(*id) {
				use_circuit_code_acked = true;
				guard.use_circuit_code_seq = None;
			}
		}
	}

	if use_circuit_code_acked && *handshake.0.lock().unwrap() == HandshakeState::Connecting {
		send_complete_agent_movement(socket, shared, handshake)?;
		set_state(handshake, HandshakeState::MovementSent);
	}

	Ok(())
}

fn send_complete_agent_movement(socket: &UdpSocket, shared: &Arc<Mutex<Shared>>, handshake: &Arc<HandshakeCell>) -> Result<()> {
	let schema = registry().by_name("CompleteAgentMovement").expect("CompleteAgentMovement is in the catalogue");
	let (agent_id, session_id, circuit_code) = {
		let guard = shared.lock().unwrap();
		(guard.agent_id, guard.session_id, guard.circuit_code)
	};

	let mut message = Message::new(schema);
	message.blocks[0] =
		vec![Block { fields: vec![Value::Uuid(agent_id), Value::Uuid(session_id), Value::U32(circuit_code)] }];

	send_message(socket, shared, handshake, &message, true)?;
	Ok(())
}

fn handle_datagram(
	datagram: &[u8],
	socket: &UdpSocket,
	shared: &Arc<Mutex<Shared>>,
	handshake: &Arc<HandshakeCell>,
	subscribers: &Arc<Mutex<Subscribers>>,
) -> Result<()> {
	let packet = Packet::decode(datagram)?;
	handle_acks(&packet.acks, socket, shared, handshake)?;

	let body = if packet.is_zerocoded() { zerocode_decode(&packet.body)? } else { packet.body };

	if packet.is_reliable() {
		let mut guard = shared.lock().unwrap();
		let first_time = guard.seen_inbound.insert(packet.sequence, Instant::now()).is_none();
		guard.pending_acks.push(packet.sequence);
		if !first_time && packet.is_resent() {
			debug!("re-acked duplicate resend of seq {}", packet.sequence);
			return Ok(());
		}
	}

	let (frequency, id) = decode_header(&body)?;
	let schema = registry().by_wire_id(frequency, id).ok_or(WireError::UnknownMessage { frequency: frequency as u8, id })?;
	let message = deserialize(schema, &body[wire_schema::HEADER_LEN..])?;

	dispatch(message, socket, shared, handshake, subscribers)
}

fn dispatch(
	message: Message,
	socket: &UdpSocket,
	shared: &Arc<Mutex<Shared>>,
	handshake: &Arc<HandshakeCell>,
	subscribers: &Arc<Mutex<Subscribers>>,
) -> Result<()> {
	match message.schema.name {
		"StartPingCheck" => {
			let ping_id = message.block("PingCheck")[0].fields[0].as_u8().unwrap_or(0);
			reply_ping(socket, shared, handshake, ping_id)?;
		}
		"PacketAck" => {
			let acked: Vec<u32> = message.block("Packets").iter().filter_map(|b| b.fields[0].as_u32()).collect();
			handle_acks(&acked, socket, shared, handshake)?;
		}
		"RegionHandshake" => {
			record_region_name(&message, shared);
			let state = *handshake.0.lock().unwrap();
			if matches!(state, HandshakeState::Connecting | HandshakeState::MovementSent) {
				transition_on_region_handshake(socket, shared, handshake)?;
			}
		}
		"CloseCircuit" => {
			set_state(handshake, HandshakeState::Closed);
		}
		_ => {}
	}

	notify_subscribers(subscribers, &message);
	Ok(())
}

/// Record `RegionHandshake`'s `SimName` field as the circuit's current
/// region name, so it survives past the inbound message being dispatched.
fn record_region_name(message: &Message, shared: &Arc<Mutex<Shared>>) {
	if let Some(block) = message.block("RegionInfo").first() {
		if let Some(name) = block.fields.get(2).and_then(Value::as_bytes) {
			shared.lock().unwrap().current_region_name = Some(latin1::decode_nul_terminated(name));
		}
	}
}

fn reply_ping(socket: &UdpSocket, shared: &Arc<Mutex<Shared>>, handshake: &Arc<HandshakeCell>, ping_id: u8) -> Result<()> {
	let schema = registry().by_name("CompletePingCheck").expect("CompletePingCheck is in the catalogue");
	let mut message = Message::new(schema);
	message.blocks[0] = vec![Block { fields: vec![Value::U8(ping_id)] }];

	send_message(socket, shared, handshake, &message, false)?;
	Ok(())
}

/// Advance to `Landed`: this is reached either from `MovementSent` in the
/// ordinary case, or directly from `Connecting` if `RegionHandshake` arrives
/// before `UseCircuitCode`'s ack does (the protocol gives no ordering
/// promise across sequences). Either way the still-pending `UseCircuitCode`
/// is treated as acked, since the region accepting the handshake implies it
/// was received.
fn transition_on_region_handshake(socket: &UdpSocket, shared: &Arc<Mutex<Shared>>, handshake: &Arc<HandshakeCell>) -> Result<()> {
	{
		let mut guard = shared.lock().unwrap();
		if let Some(sequence) = guard.use_circuit_code_seq.take() {
			guard.unacked.remove(&sequence);
		}
	}

	let (agent_id, session_id) = {
		let guard = shared.lock().unwrap();
		(guard.agent_id, guard.session_id)
	};

	let schema = registry().by_name("RegionHandshakeReply").expect("RegionHandshakeReply is in the catalogue");
	let mut message = Message::new(schema);
	message.blocks[0] = vec![Block { fields: vec![Value::Uuid(agent_id), Value::Uuid(session_id)] }];
	message.blocks[1] = vec![Block { fields: vec![Value::U32(0)] }];

	send_message(socket, shared, handshake, &message, true)?;
	send_agent_throttle(socket, shared, handshake)?;
	send_agent_fov(socket, shared, handshake)?;
	send_agent_height_width(socket, shared, handshake)?;
	set_state(handshake, HandshakeState::Landed);
	Ok(())
}

/// Bits-per-second throttle for each of the seven bandwidth categories
/// (resend, land, wind, cloud, task, texture, asset), sent once per circuit
/// right after the region accepts the handshake.
const AGENT_THROTTLE_DEFAULTS: [f32; 7] = [150_000.0, 170_000.0, 34_000.0, 34_000.0, 446_000.0, 446_000.0, 220_000.0];

fn send_agent_throttle(socket: &UdpSocket, shared: &Arc<Mutex<Shared>>, handshake: &Arc<HandshakeCell>) -> Result<()> {
	let (agent_id, session_id) = {
		let guard = shared.lock().unwrap();
		(guard.agent_id, guard.session_id)
	};

	let mut throttles = Vec::with_capacity(AGENT_THROTTLE_DEFAULTS.len() * 4);
	for bps in AGENT_THROTTLE_DEFAULTS {
		throttles.extend_from_slice(&bps.to_le_bytes());
	}

	let schema = registry().by_name("AgentThrottle").expect("AgentThrottle is in the catalogue");
	let mut message = Message::new(schema);
	message.blocks[0] = vec![Block { fields: vec![Value::Uuid(agent_id), Value::Uuid(session_id)] }];
	message.blocks[1] = vec![Block { fields: vec![Value::U32(0), Value::Bytes(throttles)] }];

	send_message(socket, shared, handshake, &message, true)?;
	Ok(())
}

fn send_agent_fov(socket: &UdpSocket, shared: &Arc<Mutex<Shared>>, handshake: &Arc<HandshakeCell>) -> Result<()> {
	let (agent_id, session_id) = {
		let guard = shared.lock().unwrap();
		(guard.agent_id, guard.session_id)
	};

	let schema = registry().by_name("AgentFOV").expect("AgentFOV is in the catalogue");
	let mut message = Message::new(schema);
	message.blocks[0] = vec![Block { fields: vec![Value::Uuid(agent_id), Value::Uuid(session_id)] }];
	message.blocks[1] = vec![Block { fields: vec![Value::U32(0), Value::F32(std::f32::consts::FRAC_PI_4)] }];

	send_message(socket, shared, handshake, &message, true)?;
	Ok(())
}

fn send_agent_height_width(socket: &UdpSocket, shared: &Arc<Mutex<Shared>>, handshake: &Arc<HandshakeCell>) -> Result<()> {
	let (agent_id, session_id, circuit_code) = {
		let guard = shared.lock().unwrap();
		(guard.agent_id, guard.session_id, guard.circuit_code)
	};

	let schema = registry().by_name("AgentHeightWidth").expect("AgentHeightWidth is in the catalogue");
	let mut message = Message::new(schema);
	message.blocks[0] = vec![Block { fields: vec![Value::Uuid(agent_id), Value::Uuid(session_id), Value::U32(circuit_code)] }];
	message.blocks[1] = vec![Block { fields: vec![Value::U32(0), Value::U16(768), Value::U16(1024)] }];

	send_message(socket, shared, handshake, &message, true)?;
	Ok(())
}

fn run_timers(socket: &UdpSocket, shared: &Arc<Mutex<Shared>>, handshake: &Arc<HandshakeCell>) -> Result<()> {
	if *handshake.0.lock().unwrap() == HandshakeState::Closed {
		return Ok(());
	}

	let now = Instant::now();
	let mut should_flush_acks = false;
	let mut should_send_keepalive = false;

	{
		let mut guard = shared.lock().unwrap();

		let mut to_retransmit = Vec::new();
		let mut to_drop = Vec::new();

		for (sequence, entry) in guard.unacked.iter() {
			if now.duration_since(entry.sent_at) >= RETRANSMIT_INTERVAL {
				if entry.attempts >= MAX_RETRANSMIT_ATTEMPTS || now.duration_since(entry.first_sent_at) >= MAX_RETRANSMIT_SPAN {
					to_drop.push((*sequence, entry.name.to_string()));
				} else {
					to_retransmit.push(*sequence);
				}
			}
		}

		for sequence in &to_retransmit {
			if let Some(entry) = guard.unacked.get_mut(sequence) {
				entry.sent_at = now;
				entry.attempts += 1;
				let bytes = entry.bytes.clone();
				resend(socket, &bytes, *sequence);
			}
		}

		for (sequence, name) in to_drop {
			guard.unacked.remove(&sequence);
			warn!("{}", WireError::ReliableTimeout { sequence, name });
		}

		if now.duration_since(guard.last_ack_flush) >= ACK_FLUSH_INTERVAL && !guard.pending_acks.is_empty() {
			should_flush_acks = true;
		}

		let state = *handshake.0.lock().unwrap();
		let should_poke = matches!(state, HandshakeState::Connecting | HandshakeState::MovementSent | HandshakeState::Landed);
		if should_poke && now.duration_since(guard.last_keepalive) >= KEEPALIVE_INTERVAL {
			guard.last_keepalive = now;
			should_send_keepalive = true;
		}
	}

	if should_flush_acks {
		flush_acks(socket, shared, handshake)?;
	}
	if should_send_keepalive {
		send_keepalive(socket, shared, handshake)?;
	}

	Ok(())
}

fn resend(socket: &UdpSocket, bytes: &[u8], sequence: u32) {
	let mut resent = bytes.to_vec();
	resent[0] |= FLAG_RESENT;
	if socket.send(&resent).is_err() {
		trace!("failed to retransmit seq {sequence}");
	}
}

/// Send any pending inbound acks as a standalone `PacketAck` message. Only
/// reached when nothing else was outbound in time to piggyback them.
fn flush_acks(socket: &UdpSocket, shared: &Arc<Mutex<Shared>>, handshake: &Arc<HandshakeCell>) -> Result<()> {
	let pending = std::mem::take(&mut shared.lock().unwrap().pending_acks);
	if pending.is_empty() {
		return Ok(());
	}

	let schema = registry().by_name("PacketAck").expect("PacketAck is in the catalogue");
	let mut message = Message::new(schema);
	message.blocks[0] = pending.into_iter().map(|id| Block { fields: vec![Value::U32(id)] }).collect();

	send_message(socket, shared, handshake, &message, false)?;
	Ok(())
}

/// Send the `AgentUpdate` "poke", both as the pre-`Landed` nudge that helps
/// advance the handshake and as the post-`Landed` keep-alive.
fn send_keepalive(socket: &UdpSocket, shared: &Arc<Mutex<Shared>>, handshake: &Arc<HandshakeCell>) -> Result<()> {
	let (agent_id, session_id) = {
		let guard = shared.lock().unwrap();
		(guard.agent_id, guard.session_id)
	};

	let schema = registry().by_name("AgentUpdate").expect("AgentUpdate is in the catalogue");
	let mut message = Message::new(schema);
	message.blocks[0] = vec![Block {
		fields: vec![
			Value::Uuid(agent_id),
			Value::Uuid(session_id),
			Value::Quaternion(wire_types::Quaternion::default()),
			Value::Quaternion(wire_types::Quaternion::default()),
			Value::U8(0),
			Value::Vector3(wire_types::Vector3::default()),
			Value::Vector3(wire_types::Vector3::default()),
			Value::Vector3(wire_types::Vector3::default()),
			Value::Vector3(wire_types::Vector3::default()),
			Value::F32(64.0),
			Value::U32(0),
			Value::U8(0),
		],
	}];

	send_message(socket, shared, handshake, &message, false)?;
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn unacked_entry_gives_up_after_max_attempts() {
		let now = Instant::now();
		let entry = Unacked { bytes: vec![], name: "Test", sent_at: now, first_sent_at: now, attempts: MAX_RETRANSMIT_ATTEMPTS };
		assert!(entry.attempts >= MAX_RETRANSMIT_ATTEMPTS);
	}

	fn test_shared() -> Shared {
		let now = Instant::now();
		Shared {
			next_sequence: 1,
			unacked: HashMap::new(),
			pending_acks: Vec::new(),
			seen_inbound: HashMap::new(),
			last_ack_flush: now,
			last_keepalive: now,
			agent_id: Uuid::NIL,
			session_id: Uuid::NIL,
			circuit_code: 0,
			use_circuit_code_seq: None,
			current_region_name: None,
		}
	}

	#[test]
	fn record_region_name_extracts_sim_name_from_region_info() {
		let schema = registry().by_name("RegionHandshake").expect("RegionHandshake is in the catalogue");
		let mut message = Message::new(schema);
		message.blocks[0] = vec![Block {
			fields: vec![
				Value::U32(0),
				Value::U8(0),
				Value::Bytes(latin1::encode_nul_terminated("Ahern").unwrap()),
				Value::Uuid(Uuid::NIL),
				Value::F32(20.0),
				Value::U64(0),
				Value::Uuid(Uuid::NIL),
			],
		}];
		message.blocks[1] = vec![Block { fields: vec![Value::Uuid(Uuid::NIL)] }];

		let shared = Arc::new(Mutex::new(test_shared()));
		record_region_name(&message, &shared);
		assert_eq!(shared.lock().unwrap().current_region_name.as_deref(), Some("Ahern"));
	}

	#[test]
	fn notify_subscribers_invokes_every_registered_callback() {
		let schema = registry().by_name("CloseCircuit").expect("CloseCircuit is in the catalogue");
		let message = Message::new(schema);
		let subscribers: Arc<Mutex<Subscribers>> = Arc::new(Mutex::new(HashMap::new()));
		let calls = Arc::new(Mutex::new(0));

		for _ in 0..2 {
			let calls = calls.clone();
			subscribers.lock().unwrap().entry("CloseCircuit").or_default().push(Arc::new(move |_: &Message| {
				*calls.lock().unwrap() += 1;
			}));
		}

		notify_subscribers(&subscribers, &message);
		assert_eq!(*calls.lock().unwrap(), 2);
	}
}
