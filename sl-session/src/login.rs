use std::net::Ipv4Addr;

use wire_types::Uuid;
use wire_utils::error::Result;

/// Everything a successful login hands back. The login transaction
/// itself (an XML-RPC, or on current grids an LLSD/CAPS, call to a login
/// server) is out of scope: a real `LoginClient` talks to that server
/// however it likes and just needs to produce one of these.
#[derive(Debug, Clone)]
pub struct LoginToken {
	pub login: String,
	pub message: String,
	pub agent_id: Uuid,
	pub session_id: Uuid,
	pub circuit_code: u32,
	pub sim_ip: Ipv4Addr,
	pub sim_port: u16,
	pub region_x: u32,
	pub region_y: u32,
	/// The capability URL used for inventory/asset fetches over HTTP,
	/// entirely outside the UDP circuit. Opaque here: nothing in this
	/// crate calls it.
	pub seed_capability: String,
}

/// The external collaborator a viewer plugs in to perform the out-of-scope
/// login handshake. [`Session::connect`](crate::Session::connect) only
/// needs the [`LoginToken`] it produces.
pub trait LoginClient {
	fn login(&self, first_name: &str, last_name: &str, password: &str, start_location: &str) -> Result<LoginToken>;
}
