use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A chat message as the server broadcasts it.
///
/// Only `conversationId` is needed for routing; everything else the server
/// attaches is kept in `extra` so consumers can read fields this crate does
/// not model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub conversation_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_id: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Which of the three message events produced a [`MessageEvent`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageEventKind {
    New,
    Edited,
    Deleted,
}

/// Payload delivered to `on_message` subscribers
#[derive(Debug, Clone, PartialEq)]
pub struct MessageEvent {
    pub kind: MessageEventKind,
    pub message: ChatMessage,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReadReceipt {
    pub conversation_id: String,
    #[serde(default)]
    pub message_ids: Vec<String>,
    pub read_by: String,
}

/// Typing indicator. The server sends `{conversationId, userId}` under two
/// event names; the client folds the event name into `is_typing`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TypingIndicator {
    pub conversation_id: String,
    pub user_id: String,
    #[serde(default)]
    pub is_typing: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MentorshipEnded {
    pub mentorship_id: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MentorshipStarted {
    pub mentorship_id: String,
    pub status: String,
    pub conversation_id: String,
}

/// Mentorship status change scoped to one conversation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConversationMentorshipStatus {
    pub conversation_id: String,
    pub mentorship_id: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<String>,
}

/// Presence change, normalized from `user:online`, `user:offline` and
/// `user:status`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserStatus {
    pub user_id: String,
    #[serde(default)]
    pub is_online: bool,
}

/// Delivered to `on_connect` subscribers once the namespace accepted us
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectInfo {
    /// Socket id assigned by the server for this namespace
    pub sid: Option<String>,
}

/// Why a connection went away
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisconnectReason {
    /// `disconnect()` was called
    ClientDisconnect,
    /// The server sent a DISCONNECT packet for our namespace
    ServerDisconnect,
    /// The transport was closed
    TransportClose,
    /// The transport failed while sending
    TransportError,
    /// No ping from the server within `pingInterval + pingTimeout`
    PingTimeout,
}

impl DisconnectReason {
    /// Reason string as socket.io clients report it
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ClientDisconnect => "io client disconnect",
            Self::ServerDisconnect => "io server disconnect",
            Self::TransportClose => "transport close",
            Self::TransportError => "transport error",
            Self::PingTimeout => "ping timeout",
        }
    }
}

impl std::fmt::Display for DisconnectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handshake data sent with the namespace CONNECT packet
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuthPayload {
    pub token: String,
    pub user_id: String,
}

/// `{ conversationId }`, shared by join/leave and the typing commands
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConversationRef {
    pub conversation_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SendMessagePayload {
    pub conversation_id: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_message_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EditMessagePayload {
    pub conversation_id: String,
    pub message_id: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeleteMessagePayload {
    pub conversation_id: String,
    pub message_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReadMessagesPayload {
    pub conversation_id: String,
    pub message_ids: Vec<String>,
}
