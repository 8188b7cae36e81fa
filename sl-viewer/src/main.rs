//! A minimal command-line chat client over the circuit stack, demonstrating
//! the [`sl_session::Session`] façade end to end.
//!
//! Login is out of scope for this crate, so `sl-viewer` takes the circuit
//! parameters a real login would have produced directly on the command
//! line, via [`DirectLoginClient`].

use std::io::BufRead;
use std::net::Ipv4Addr;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use clap::Parser;
use log::{info, warn, LevelFilter};
use sl_session::{LoginClient, LoginToken, Session};
use wire_codec::Message;
use wire_types::Uuid;
use wire_utils::error::{Result, WireError};

/// Connect directly to a simulator circuit, bypassing the login server.
#[derive(Parser, Debug)]
#[command(name = "sl-viewer")]
#[command(about = "A command-line chat client for a Second Life-style UDP circuit")]
#[command(version)]
struct Args {
	/// Simulator IPv4 address
	#[arg(long)]
	sim_ip: Ipv4Addr,

	/// Simulator UDP port
	#[arg(long, default_value_t = 13_000)]
	sim_port: u16,

	/// Circuit code issued by the login server
	#[arg(long)]
	circuit_code: u32,

	/// Agent UUID issued by the login server
	#[arg(long)]
	agent_id: String,

	/// Session UUID issued by the login server
	#[arg(long)]
	session_id: String,

	/// Region grid X coordinate, for logging only
	#[arg(long, default_value_t = 0)]
	region_x: u32,

	/// Region grid Y coordinate, for logging only
	#[arg(long, default_value_t = 0)]
	region_y: u32,

	/// Chat channel to speak on
	#[arg(long, default_value_t = 0)]
	channel: i32,

	/// Log level (trace, debug, info, warn, error)
	#[arg(long, default_value = "info")]
	log_level: String,
}

/// A [`LoginClient`] that skips the login server entirely and returns a
/// token built from CLI flags. Stands in for whatever real login
/// implementation a full viewer would plug in here.
struct DirectLoginClient {
	agent_id: Uuid,
	session_id: Uuid,
	circuit_code: u32,
	sim_ip: Ipv4Addr,
	sim_port: u16,
	region_x: u32,
	region_y: u32,
}

impl LoginClient for DirectLoginClient {
	fn login(&self, _first_name: &str, _last_name: &str, _password: &str, _start_location: &str) -> Result<LoginToken> {
		Ok(LoginToken {
			login: "true".into(),
			message: "connecting directly, no login server contacted".into(),
			agent_id: self.agent_id,
			session_id: self.session_id,
			circuit_code: self.circuit_code,
			sim_ip: self.sim_ip,
			sim_port: self.sim_port,
			region_x: self.region_x,
			region_y: self.region_y,
			seed_capability: String::new(),
		})
	}
}

fn parse_uuid(s: &str) -> Result<Uuid> {
	let hex: String = s.chars().filter(|c| *c != '-').collect();
	if hex.len() != 32 {
		return Err(WireError::FieldTooLarge);
	}

	let mut bytes = [0u8; 16];
	for (i, byte) in bytes.iter_mut().enumerate() {
		*byte = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).map_err(|_| WireError::FieldTooLarge)?;
	}

	Ok(Uuid(bytes))
}

fn main() -> Result<()> {
	let args = Args::parse();
	wire_utils::logging::init_with_level(args.log_level.parse::<LevelFilter>().unwrap_or(LevelFilter::Info));

	let agent_id = parse_uuid(&args.agent_id)?;
	let session_id = parse_uuid(&args.session_id)?;

	let login = DirectLoginClient {
		agent_id,
		session_id,
		circuit_code: args.circuit_code,
		sim_ip: args.sim_ip,
		sim_port: args.sim_port,
		region_x: args.region_x,
		region_y: args.region_y,
	};

	info!("opening circuit to {}:{}", args.sim_ip, args.sim_port);
	let session = Session::connect(&login, "", "", "", "")?;
	info!("circuit established, type to chat (Ctrl-D to log out)");

	session.subscribe("ChatFromSimulator", |message: &Message| {
		let chat = Session::decode_chat(message);
		let source = chat.source_type.map(|s| format!("{s:?}")).unwrap_or_else(|| "unknown".into());
		match chat.chat_type {
			Some(sl_session::ChatType::Shout) => println!("{from} shouts ({source}): {text}", from = chat.from_name, text = chat.message),
			_ => println!("{}: {}", chat.from_name, chat.message),
		}
	});

	let (lines_tx, lines_rx) = mpsc::channel::<String>();
	thread::spawn(move || {
		let stdin = std::io::stdin();
		for line in stdin.lock().lines().map_while(std::result::Result::ok) {
			if lines_tx.send(line).is_err() {
				break;
			}
		}
	});

	loop {
		match lines_rx.recv_timeout(Duration::from_millis(200)) {
			Ok(line) => {
				if let Err(err) = session.send_chat(&line, args.channel, sl_session::ChatType::Normal) {
					warn!("failed to send chat: {err}");
				}
			}
			Err(mpsc::RecvTimeoutError::Disconnected) => break,
			Err(mpsc::RecvTimeoutError::Timeout) => {}
		}
	}

	info!("logging out");
	session.logout()
}
