//! Canonical message types for bridge communication.
//!
//! This module defines the single source of truth for the events flowing
//! between the chat room (QQ group) and the remote ChatBridge network.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A group text message received from the chat room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundChatEvent {
    /// Sender's platform user id.
    pub user_id: i64,
    /// Group the message was posted in.
    pub group_id: i64,
    /// Group-specific alias (may be empty).
    pub card: String,
    /// Platform nickname.
    pub nickname: String,
    /// Raw message text, still HTML-escaped and carrying CQ codes.
    pub raw_text: String,
    /// Whether the message was sent anonymously.
    pub anonymous: bool,
}

impl InboundChatEvent {
    /// Name shown to the other side: the group alias, or the nickname when
    /// no alias is set.
    pub fn display_name(&self) -> &str {
        if self.card.is_empty() {
            &self.nickname
        } else {
            &self.card
        }
    }
}

/// A chat broadcast received from the remote network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteChatEvent {
    /// Name of the bus client (server) that produced the message.
    pub client: String,
    /// Player who wrote the message (empty for server notices).
    pub author: String,
    /// Message text.
    pub message: String,
}

impl RemoteChatEvent {
    /// Render as `<author> message`, or just the message for notices.
    pub fn formatted(&self) -> String {
        if self.author.is_empty() {
            self.message.clone()
        } else {
            format!("<{}> {}", self.author, self.message)
        }
    }
}

/// Kind of server command forwarded from the chat room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandKind {
    /// Raw game (console) command.
    Vanilla,
    /// Server framework command.
    #[serde(rename = "MCDR")]
    Framework,
}

/// Metadata attached to a command so its answer can be routed back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandMeta {
    /// Set when the command was issued from the chat room.
    #[serde(rename = "IsQQ", default)]
    pub from_chatroom: bool,
    #[serde(rename = "Type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<CommandKind>,
}

impl CommandMeta {
    /// Metadata for a command issued from the chat room.
    pub fn chatroom(kind: CommandKind) -> Self {
        Self {
            from_chatroom: true,
            kind: Some(kind),
        }
    }
}

/// Outbound request to the remote network.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteRequest {
    /// Chat broadcast on behalf of a chat-room user.
    Chat { text: String, sender: String },
    /// Command executed by a specific bus client.
    Command {
        client: String,
        command: String,
        meta: Option<CommandMeta>,
    },
}

/// Answer to a previously sent command, as delivered by the bus client.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteCommandResponse {
    /// The command string this answers.
    pub command: String,
    /// Metadata echoed back from the request.
    #[serde(default)]
    pub params: Option<CommandMeta>,
    /// Command-specific result payload.
    #[serde(default)]
    pub result: Value,
    /// False for the outgoing echo of a request that has not been answered.
    #[serde(default)]
    pub responded: bool,
}

impl RemoteCommandResponse {
    /// Whether the command was issued from the chat room.
    pub fn from_chatroom(&self) -> bool {
        self.params.map(|p| p.from_chatroom).unwrap_or(false)
    }
}

/// Statistics query answer payload.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StatsQueryResult {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub stats_name: String,
    #[serde(default)]
    pub data: Vec<String>,
    #[serde(default)]
    pub total: i64,
    #[serde(default)]
    pub error_code: i32,
}

/// Online player query answer payload.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OnlineQueryResult {
    #[serde(default)]
    pub data: Vec<String>,
}

/// Generic command acknowledgement payload.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CommandAck {
    #[serde(default)]
    pub success: bool,
}

/// Typed result of a remote command, classified by the command it answers.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteCommandResult {
    Stats(StatsQueryResult),
    Online(OnlineQueryResult),
    GenericAck(CommandAck),
}
