/// Outbound command names (client -> server)
pub mod outbound_events {
    pub const CONVERSATION_JOIN: &str = "conversation:join";
    pub const CONVERSATION_LEAVE: &str = "conversation:leave";
    pub const MESSAGE_SEND: &str = "message:send";
    pub const MESSAGE_EDIT: &str = "message:edit";
    pub const MESSAGE_DELETE: &str = "message:delete";
    pub const TYPING_START: &str = "typing:start";
    pub const TYPING_STOP: &str = "typing:stop";
    pub const MESSAGES_READ: &str = "messages:read";
}

/// Inbound event names (server -> client)
pub mod inbound_events {
    pub const MESSAGE_NEW: &str = "message:new";
    pub const MESSAGE_EDITED: &str = "message:edited";
    pub const MESSAGE_DELETED: &str = "message:deleted";
    pub const MESSAGES_READ: &str = "messages:read";
    pub const TYPING_START: &str = "typing:start";
    pub const TYPING_STOP: &str = "typing:stop";
    pub const MENTORSHIP_ENDED: &str = "mentorship:ended";
    pub const MENTORSHIP_STARTED: &str = "mentorship:started";
    pub const CONVERSATION_MENTORSHIP: &str = "conversation:mentorship";
    pub const USER_ONLINE: &str = "user:online";
    pub const USER_OFFLINE: &str = "user:offline";
    pub const USER_STATUS: &str = "user:status";
}

/// Subscription key matching every conversation
pub const WILDCARD_KEY: &str = "*";

/// Namespace the chat server listens on
pub const DEFAULT_NAMESPACE: &str = "/chat";

/// HTTP path of the Socket.IO endpoint
pub const DEFAULT_PATH: &str = "/socket.io/";

/// Engine.IO protocol revision
pub const ENGINE_IO_VERSION: &str = "4";

/// Default handshake timeout (milliseconds)
pub const DEFAULT_TIMEOUT: u64 = 20_000;

/// Default number of reconnection attempts after a failure
pub const RECONNECTION_ATTEMPTS: u32 = 5;

/// Default fixed delay between reconnection attempts (milliseconds)
pub const RECONNECTION_DELAY: u64 = 1_000;

/// Outbound command buffer size
pub const COMMAND_BUFFER_SIZE: usize = 100;

/// Engine.IO polling payload record separator
pub const RECORD_SEPARATOR: char = '\u{1e}';
