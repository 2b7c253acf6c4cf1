pub mod constants;
pub mod error;
pub mod message;

pub use constants::*;
pub use error::{RealtimeError, Result};
pub use message::{
    AuthPayload, ChatMessage, ConnectInfo, ConversationMentorshipStatus, DisconnectReason,
    MentorshipEnded, MentorshipStarted, MessageEvent, MessageEventKind, ReadReceipt,
    TypingIndicator, UserStatus,
};
