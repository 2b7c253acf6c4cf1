//! # Mentorship Realtime Rust
//!
//! A Rust client for the mentorship platform's realtime server (Socket.IO v4
//! over WebSocket, with HTTP long-polling as fallback).
//!
//! One [`RealtimeClient`] owns one connection. Chat messages, typing
//! indicators, read receipts, presence and mentorship lifecycle events are
//! delivered to callbacks registered per conversation (or for every
//! conversation with `"*"`), and outbound commands are emitted while the
//! connection is up.
//!
//! ## Example
//!
//! ```no_run
//! use mentorship_realtime_rs::{RealtimeClient, RealtimeClientOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = RealtimeClient::new(
//!         "https://api.example.com",
//!         RealtimeClientOptions::default(),
//!     )?;
//!
//!     let _typing = client.on_typing("conv-1", |typing| {
//!         println!("{} typing: {}", typing.user_id, typing.is_typing);
//!     });
//!
//!     client.connect("jwt-token", "user-1");
//!     client.send_typing("conv-1", true);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod infrastructure;
pub mod messaging;
pub mod protocol;
pub mod registry;
pub mod transport;
pub mod types;

pub use client::{ConnectionState, RealtimeClient, RealtimeClientBuilder, RealtimeClientOptions};
pub use messaging::{InboundEvent, OutboundCommand};
pub use registry::{Subscription, SubscriptionKey};
pub use transport::TransportKind;
pub use types::{
    ChatMessage, ConnectInfo, ConversationMentorshipStatus, DisconnectReason, MentorshipEnded,
    MentorshipStarted, MessageEvent, MessageEventKind, ReadReceipt, RealtimeError,
    TypingIndicator, UserStatus,
};
