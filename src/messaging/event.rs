use crate::types::constants::{inbound_events, outbound_events};
use crate::types::message::{
    ConversationRef, DeleteMessagePayload, EditMessagePayload, ReadMessagesPayload,
    SendMessagePayload,
};
use crate::types::{
    ChatMessage, ConversationMentorshipStatus, MentorshipEnded, MentorshipStarted, MessageEvent,
    MessageEventKind, ReadReceipt, Result, TypingIndicator, UserStatus,
};
use serde::Deserialize;
use serde_json::Value;

/// Typed server events, decoded once at the transport boundary
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    /// `message:new`, `message:edited`, `message:deleted`
    Message(MessageEvent),
    /// `messages:read`
    Read(ReadReceipt),
    /// `typing:start`, `typing:stop`
    Typing(TypingIndicator),
    /// `mentorship:started`
    MentorshipStarted(MentorshipStarted),
    /// `mentorship:ended`
    MentorshipEnded(MentorshipEnded),
    /// `conversation:mentorship`
    ConversationMentorship(ConversationMentorshipStatus),
    /// `user:online`, `user:offline`, `user:status`
    UserStatus(UserStatus),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PresencePing {
    user_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TypingPing {
    conversation_id: String,
    user_id: String,
}

impl InboundEvent {
    /// Decodes an event by name. Returns `Ok(None)` for names this client
    /// does not handle.
    pub fn decode(name: &str, payload: Value) -> Result<Option<Self>> {
        let event = match name {
            inbound_events::MESSAGE_NEW => Self::message(MessageEventKind::New, payload)?,
            inbound_events::MESSAGE_EDITED => Self::message(MessageEventKind::Edited, payload)?,
            inbound_events::MESSAGE_DELETED => Self::message(MessageEventKind::Deleted, payload)?,
            inbound_events::MESSAGES_READ => Self::Read(serde_json::from_value(payload)?),
            inbound_events::TYPING_START => Self::typing(true, payload)?,
            inbound_events::TYPING_STOP => Self::typing(false, payload)?,
            inbound_events::MENTORSHIP_STARTED => {
                Self::MentorshipStarted(serde_json::from_value(payload)?)
            }
            inbound_events::MENTORSHIP_ENDED => {
                Self::MentorshipEnded(serde_json::from_value(payload)?)
            }
            inbound_events::CONVERSATION_MENTORSHIP => {
                Self::ConversationMentorship(serde_json::from_value(payload)?)
            }
            inbound_events::USER_ONLINE => Self::presence(true, payload)?,
            inbound_events::USER_OFFLINE => Self::presence(false, payload)?,
            inbound_events::USER_STATUS => Self::UserStatus(serde_json::from_value(payload)?),
            _ => return Ok(None),
        };
        Ok(Some(event))
    }

    fn message(kind: MessageEventKind, payload: Value) -> Result<Self> {
        let message: ChatMessage = serde_json::from_value(payload)?;
        Ok(Self::Message(MessageEvent { kind, message }))
    }

    fn typing(is_typing: bool, payload: Value) -> Result<Self> {
        let ping: TypingPing = serde_json::from_value(payload)?;
        Ok(Self::Typing(TypingIndicator {
            conversation_id: ping.conversation_id,
            user_id: ping.user_id,
            is_typing,
        }))
    }

    fn presence(is_online: bool, payload: Value) -> Result<Self> {
        let ping: PresencePing = serde_json::from_value(payload)?;
        Ok(Self::UserStatus(UserStatus {
            user_id: ping.user_id,
            is_online,
        }))
    }
}

/// Commands the client sends to the server
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundCommand {
    JoinConversation {
        conversation_id: String,
    },
    LeaveConversation {
        conversation_id: String,
    },
    SendMessage {
        conversation_id: String,
        content: String,
        parent_message_id: Option<String>,
    },
    EditMessage {
        conversation_id: String,
        message_id: String,
        content: String,
    },
    DeleteMessage {
        conversation_id: String,
        message_id: String,
    },
    /// Encoded as `typing:start` or `typing:stop`, never as a flag
    Typing {
        conversation_id: String,
        is_typing: bool,
    },
    MarkAsRead {
        conversation_id: String,
        message_ids: Vec<String>,
    },
}

impl OutboundCommand {
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::JoinConversation { .. } => outbound_events::CONVERSATION_JOIN,
            Self::LeaveConversation { .. } => outbound_events::CONVERSATION_LEAVE,
            Self::SendMessage { .. } => outbound_events::MESSAGE_SEND,
            Self::EditMessage { .. } => outbound_events::MESSAGE_EDIT,
            Self::DeleteMessage { .. } => outbound_events::MESSAGE_DELETE,
            Self::Typing {
                is_typing: true, ..
            } => outbound_events::TYPING_START,
            Self::Typing {
                is_typing: false, ..
            } => outbound_events::TYPING_STOP,
            Self::MarkAsRead { .. } => outbound_events::MESSAGES_READ,
        }
    }

    pub fn payload(&self) -> Result<Value> {
        let value = match self {
            Self::JoinConversation { conversation_id }
            | Self::LeaveConversation { conversation_id }
            | Self::Typing {
                conversation_id, ..
            } => serde_json::to_value(ConversationRef {
                conversation_id: conversation_id.clone(),
            })?,
            Self::SendMessage {
                conversation_id,
                content,
                parent_message_id,
            } => serde_json::to_value(SendMessagePayload {
                conversation_id: conversation_id.clone(),
                content: content.clone(),
                parent_message_id: parent_message_id.clone(),
            })?,
            Self::EditMessage {
                conversation_id,
                message_id,
                content,
            } => serde_json::to_value(EditMessagePayload {
                conversation_id: conversation_id.clone(),
                message_id: message_id.clone(),
                content: content.clone(),
            })?,
            Self::DeleteMessage {
                conversation_id,
                message_id,
            } => serde_json::to_value(DeleteMessagePayload {
                conversation_id: conversation_id.clone(),
                message_id: message_id.clone(),
            })?,
            Self::MarkAsRead {
                conversation_id,
                message_ids,
            } => serde_json::to_value(ReadMessagesPayload {
                conversation_id: conversation_id.clone(),
                message_ids: message_ids.clone(),
            })?,
        };
        Ok(value)
    }
}

impl std::fmt::Display for OutboundCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.event_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_typing_flag_selects_event_name() {
        let start = OutboundCommand::Typing {
            conversation_id: "conv1".to_string(),
            is_typing: true,
        };
        let stop = OutboundCommand::Typing {
            conversation_id: "conv1".to_string(),
            is_typing: false,
        };

        assert_eq!(start.event_name(), "typing:start");
        assert_eq!(stop.event_name(), "typing:stop");
        assert_eq!(start.payload().unwrap(), json!({"conversationId": "conv1"}));
        assert_eq!(stop.payload().unwrap(), json!({"conversationId": "conv1"}));
    }

    #[test]
    fn test_outbound_payload_shapes() {
        let send = OutboundCommand::SendMessage {
            conversation_id: "c".to_string(),
            content: "hi".to_string(),
            parent_message_id: Some("p".to_string()),
        };
        assert_eq!(send.event_name(), "message:send");
        assert_eq!(
            send.payload().unwrap(),
            json!({"conversationId": "c", "content": "hi", "parentMessageId": "p"})
        );

        let read = OutboundCommand::MarkAsRead {
            conversation_id: "c".to_string(),
            message_ids: vec!["m1".to_string(), "m2".to_string()],
        };
        assert_eq!(read.event_name(), "messages:read");
        assert_eq!(
            read.payload().unwrap(),
            json!({"conversationId": "c", "messageIds": ["m1", "m2"]})
        );

        let edit = OutboundCommand::EditMessage {
            conversation_id: "c".to_string(),
            message_id: "m".to_string(),
            content: "fixed".to_string(),
        };
        assert_eq!(edit.event_name(), "message:edit");
        assert_eq!(
            edit.payload().unwrap(),
            json!({"conversationId": "c", "messageId": "m", "content": "fixed"})
        );
    }

    #[test]
    fn test_decode_typing_adds_flag() {
        let event = InboundEvent::decode(
            "typing:stop",
            json!({"conversationId": "conv1", "userId": "u2"}),
        )
        .unwrap()
        .unwrap();

        assert_eq!(
            event,
            InboundEvent::Typing(TypingIndicator {
                conversation_id: "conv1".to_string(),
                user_id: "u2".to_string(),
                is_typing: false,
            })
        );
    }

    #[test]
    fn test_decode_presence_normalizes_online_offline() {
        let online = InboundEvent::decode("user:online", json!({"userId": "u1"}))
            .unwrap()
            .unwrap();
        let offline = InboundEvent::decode("user:offline", json!({"userId": "u1"}))
            .unwrap()
            .unwrap();

        assert_eq!(
            online,
            InboundEvent::UserStatus(UserStatus {
                user_id: "u1".to_string(),
                is_online: true
            })
        );
        assert_eq!(
            offline,
            InboundEvent::UserStatus(UserStatus {
                user_id: "u1".to_string(),
                is_online: false
            })
        );
    }

    #[test]
    fn test_decode_message_kinds() {
        let payload = json!({"id": "m1", "conversationId": "conv1", "content": "x"});
        let Some(InboundEvent::Message(event)) =
            InboundEvent::decode("message:edited", payload).unwrap()
        else {
            panic!("expected message event");
        };
        assert_eq!(event.kind, MessageEventKind::Edited);
        assert_eq!(event.message.conversation_id, "conv1");
    }

    #[test]
    fn test_decode_unknown_and_malformed() {
        assert_eq!(
            InboundEvent::decode("roadmap:updated", json!({})).unwrap(),
            None
        );
        assert!(InboundEvent::decode("message:new", json!({"content": "no id"})).is_err());
    }

    #[test]
    fn test_decode_mentorship_ended_optional_fields() {
        let event = InboundEvent::decode(
            "mentorship:ended",
            json!({"mentorshipId": "ms1", "status": "completed"}),
        )
        .unwrap()
        .unwrap();

        let InboundEvent::MentorshipEnded(ended) = event else {
            panic!("expected mentorship ended");
        };
        assert_eq!(ended.mentorship_id, "ms1");
        assert_eq!(ended.end_reason, None);
    }
}
