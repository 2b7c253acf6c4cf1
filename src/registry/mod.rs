// Registry module - callback lists per event category
mod callbacks;
mod subscription;

pub use callbacks::{Callback, CallbackList, ScopedRegistry};
pub use subscription::{Subscription, SubscriptionKey};

use crate::types::{
    ConnectInfo, ConversationMentorshipStatus, DisconnectReason, MentorshipEnded,
    MentorshipStarted, MessageEvent, ReadReceipt, TypingIndicator, UserStatus,
};

/// Every callback registry owned by one client instance.
///
/// The registries outlive individual connections: `disconnect()` leaves them
/// untouched so subscribers keep receiving events after the next `connect()`.
pub struct Registries {
    pub messages: ScopedRegistry<MessageEvent>,
    pub typing: ScopedRegistry<TypingIndicator>,
    pub reads: ScopedRegistry<ReadReceipt>,
    pub conversation_mentorship: ScopedRegistry<ConversationMentorshipStatus>,
    pub mentorship_started: CallbackList<MentorshipStarted>,
    pub mentorship_ended: CallbackList<MentorshipEnded>,
    pub connect: CallbackList<ConnectInfo>,
    pub disconnect: CallbackList<DisconnectReason>,
    pub user_status: CallbackList<UserStatus>,
}

impl Registries {
    pub fn new() -> Self {
        Self {
            messages: ScopedRegistry::new("message"),
            typing: ScopedRegistry::new("typing"),
            reads: ScopedRegistry::new("read"),
            conversation_mentorship: ScopedRegistry::new("conversation_mentorship"),
            mentorship_started: CallbackList::new("mentorship_started"),
            mentorship_ended: CallbackList::new("mentorship_ended"),
            connect: CallbackList::new("connect"),
            disconnect: CallbackList::new("disconnect"),
            user_status: CallbackList::new("user_status"),
        }
    }
}

impl Default for Registries {
    fn default() -> Self {
        Self::new()
    }
}
