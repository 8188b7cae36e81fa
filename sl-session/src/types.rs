/// How a chat message should be rendered/heard (`ChatFromSimulator`
/// and `ChatFromViewer` `Type` field).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ChatType {
	Whisper = 0,
	Normal = 1,
	Shout = 2,
	/// Used internally by `StopTyping`-style signals; carries no text.
	Start = 4,
	Stop = 5,
	DebugChannel = 6,
	OwnerSay = 8,
}

impl ChatType {
	pub fn from_u8(v: u8) -> Option<Self> {
		match v {
			0 => Some(Self::Whisper),
			1 => Some(Self::Normal),
			2 => Some(Self::Shout),
			4 => Some(Self::Start),
			5 => Some(Self::Stop),
			6 => Some(Self::DebugChannel),
			8 => Some(Self::OwnerSay),
			_ => None,
		}
	}
}

/// Who originated a `ChatFromSimulator` message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ChatSourceType {
	System = 0,
	Agent = 1,
	Object = 2,
}

impl ChatSourceType {
	pub fn from_u8(v: u8) -> Option<Self> {
		match v {
			0 => Some(Self::System),
			1 => Some(Self::Agent),
			2 => Some(Self::Object),
			_ => None,
		}
	}
}

/// The purpose of an `ImprovedInstantMessage`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ImDialog {
	MessageFromAgent = 0,
	MessageBox = 1,
	GroupInvitation = 4,
	InventoryOffered = 5,
	GroupNotice = 17,
	FriendshipOffered = 38,
	FriendshipAccepted = 39,
	FriendshipDeclined = 40,
	GotoUrl = 25,
}

impl ImDialog {
	pub fn from_u8(v: u8) -> Option<Self> {
		match v {
			0 => Some(Self::MessageFromAgent),
			1 => Some(Self::MessageBox),
			4 => Some(Self::GroupInvitation),
			5 => Some(Self::InventoryOffered),
			17 => Some(Self::GroupNotice),
			25 => Some(Self::GotoUrl),
			38 => Some(Self::FriendshipOffered),
			39 => Some(Self::FriendshipAccepted),
			40 => Some(Self::FriendshipDeclined),
			_ => None,
		}
	}
}

/// A decoded `ChatFromSimulator`. `source_type`/`chat_type` are `None` when
/// the sim sends a value outside the documented enumeration rather than
/// rejecting the message outright.
#[derive(Debug, Clone)]
pub struct ChatMessage {
	pub from_name: String,
	pub source_id: wire_types::Uuid,
	pub owner_id: wire_types::Uuid,
	pub source_type: Option<ChatSourceType>,
	pub chat_type: Option<ChatType>,
	pub message: String,
}

/// A decoded `ImprovedInstantMessage`.
#[derive(Debug, Clone)]
pub struct InstantMessage {
	pub from_agent_name: String,
	pub dialog: Option<ImDialog>,
	pub message: String,
}
