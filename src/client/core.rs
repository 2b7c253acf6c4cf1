use super::connection::ConnectionState;
use super::session::Session;
use super::{ConnectionManager, RealtimeClientBuilder, RealtimeClientOptions};
use crate::messaging::OutboundCommand;
use crate::registry::{Registries, Subscription, SubscriptionKey};
use crate::types::{
    AuthPayload, ConnectInfo, ConversationMentorshipStatus, DisconnectReason, MentorshipEnded,
    MentorshipStarted, MessageEvent, ReadReceipt, RealtimeError, Result, TypingIndicator,
    UserStatus,
};
use std::sync::Arc;
use tokio::runtime::Handle;
use url::Url;

/// The main entry point for the mentorship platform's realtime server.
///
/// `RealtimeClient` owns at most one Socket.IO connection, routes inbound
/// events to the callbacks registered through the `on_*` methods and emits
/// outbound commands while connected. Clones share the same connection and
/// registries.
///
/// None of the operations block or return errors: failures are logged, and
/// commands issued while disconnected are dropped.
///
/// # Example
///
/// ```no_run
/// use mentorship_realtime_rs::{RealtimeClient, RealtimeClientOptions};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let client = RealtimeClient::new("https://api.example.com", RealtimeClientOptions::default())?;
///
/// let _messages = client.on_message("*", |event| {
///     println!("{:?} in {}", event.kind, event.message.conversation_id);
/// });
///
/// client.connect("jwt-token", "user-1");
/// client.join_conversation("conv-1");
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct RealtimeClient {
    pub(crate) endpoint: Url,
    pub(crate) options: RealtimeClientOptions,
    pub(crate) connection: Arc<ConnectionManager>,
    pub(crate) registries: Arc<Registries>,
}

impl RealtimeClient {
    /// Creates a new RealtimeClient instance.
    ///
    /// This validates the configuration but does not connect. Call
    /// [`connect()`](Self::connect) from within a tokio runtime to open the
    /// connection.
    ///
    /// # Errors
    ///
    /// Returns [`RealtimeError::UrlParse`] if the endpoint cannot be parsed and
    /// [`RealtimeError::Config`] if the endpoint scheme or the options are
    /// unusable.
    pub fn new(endpoint: impl AsRef<str>, options: RealtimeClientOptions) -> Result<Self> {
        RealtimeClientBuilder::new(endpoint, options).map(|builder| builder.build())
    }

    /// Opens the connection, authenticating with `{ token, userId }`.
    ///
    /// Returns immediately. If a connection is already open or being
    /// established this is a no-op, so at most one underlying connection
    /// exists per client. Handshake failures are logged and retried
    /// according to the reconnection options; subscribers only observe the
    /// outcome through [`on_connect`](Self::on_connect) and
    /// [`on_disconnect`](Self::on_disconnect).
    ///
    /// Must be called from within a tokio runtime; otherwise the call is
    /// logged and ignored.
    pub fn connect(&self, token: impl Into<String>, user_id: impl Into<String>) {
        let runtime = match Handle::try_current() {
            Ok(runtime) => runtime,
            Err(_) => {
                tracing::error!("Cannot connect: {}", RealtimeError::NoRuntime);
                return;
            }
        };

        let auth = AuthPayload {
            token: token.into(),
            user_id: user_id.into(),
        };
        let endpoint = self.endpoint.clone();
        let options = self.options.clone();
        let connection = Arc::clone(&self.connection);
        let registries = Arc::clone(&self.registries);

        let started = self.connection.start(
            &runtime,
            self.options.command_buffer,
            move |generation, commands| {
                Session::new(
                    generation,
                    endpoint,
                    options,
                    auth,
                    connection,
                    registries,
                    commands,
                )
                .run()
            },
        );

        if !started {
            tracing::debug!("Connection already active, ignoring connect()");
        }
    }

    /// Closes the connection and stops reconnecting.
    ///
    /// Idempotent. Registered callbacks are kept and resume receiving events
    /// after the next [`connect()`](Self::connect); joined conversations are
    /// forgotten.
    pub fn disconnect(&self) {
        let Some((active, previous)) = self.connection.take() else {
            return;
        };

        tracing::info!("Disconnecting from realtime server");
        active.close(previous);

        if previous == ConnectionState::Connected {
            self.registries
                .disconnect
                .emit(&DisconnectReason::ClientDisconnect);
        }
    }

    /// Whether the namespace handshake has completed and the link is up
    pub fn is_connected(&self) -> bool {
        self.connection.is_connected()
    }

    /// Current connection state, including the internal connecting phase
    pub fn connection_state(&self) -> ConnectionState {
        self.connection.state()
    }

    pub fn join_conversation(&self, conversation_id: impl Into<String>) {
        self.emit(OutboundCommand::JoinConversation {
            conversation_id: conversation_id.into(),
        });
    }

    pub fn leave_conversation(&self, conversation_id: impl Into<String>) {
        self.emit(OutboundCommand::LeaveConversation {
            conversation_id: conversation_id.into(),
        });
    }

    /// Sends a message, optionally as a reply to `parent_message_id`
    pub fn send_message(
        &self,
        conversation_id: impl Into<String>,
        content: impl Into<String>,
        parent_message_id: Option<String>,
    ) {
        self.emit(OutboundCommand::SendMessage {
            conversation_id: conversation_id.into(),
            content: content.into(),
            parent_message_id,
        });
    }

    pub fn edit_message(
        &self,
        conversation_id: impl Into<String>,
        message_id: impl Into<String>,
        content: impl Into<String>,
    ) {
        self.emit(OutboundCommand::EditMessage {
            conversation_id: conversation_id.into(),
            message_id: message_id.into(),
            content: content.into(),
        });
    }

    pub fn delete_message(&self, conversation_id: impl Into<String>, message_id: impl Into<String>) {
        self.emit(OutboundCommand::DeleteMessage {
            conversation_id: conversation_id.into(),
            message_id: message_id.into(),
        });
    }

    /// Emits `typing:start` when `is_typing` is set, `typing:stop` otherwise
    pub fn send_typing(&self, conversation_id: impl Into<String>, is_typing: bool) {
        self.emit(OutboundCommand::Typing {
            conversation_id: conversation_id.into(),
            is_typing,
        });
    }

    pub fn mark_as_read(&self, conversation_id: impl Into<String>, message_ids: Vec<String>) {
        self.emit(OutboundCommand::MarkAsRead {
            conversation_id: conversation_id.into(),
            message_ids,
        });
    }

    fn emit(&self, command: OutboundCommand) {
        match self.connection.send(command) {
            Ok(()) => {}
            Err(RealtimeError::NotConnected) => {
                tracing::debug!("Not connected, dropping outbound command");
            }
            Err(e) => tracing::warn!("Dropping outbound command: {}", e),
        }
    }

    /// Subscribes to new, edited and deleted messages of one conversation,
    /// or of every conversation with `"*"`.
    ///
    /// Callbacks for the exact conversation run before wildcard ones. The
    /// returned [`Subscription`] removes the callback when dropped.
    pub fn on_message<F>(&self, key: impl Into<SubscriptionKey>, callback: F) -> Subscription
    where
        F: Fn(&MessageEvent) + Send + Sync + 'static,
    {
        self.registries.messages.subscribe(key.into(), Arc::new(callback))
    }

    pub fn on_typing<F>(&self, key: impl Into<SubscriptionKey>, callback: F) -> Subscription
    where
        F: Fn(&TypingIndicator) + Send + Sync + 'static,
    {
        self.registries.typing.subscribe(key.into(), Arc::new(callback))
    }

    pub fn on_read<F>(&self, key: impl Into<SubscriptionKey>, callback: F) -> Subscription
    where
        F: Fn(&ReadReceipt) + Send + Sync + 'static,
    {
        self.registries.reads.subscribe(key.into(), Arc::new(callback))
    }

    /// Subscribes to mentorship status changes scoped to a conversation
    pub fn on_conversation_mentorship<F>(
        &self,
        key: impl Into<SubscriptionKey>,
        callback: F,
    ) -> Subscription
    where
        F: Fn(&ConversationMentorshipStatus) + Send + Sync + 'static,
    {
        self.registries
            .conversation_mentorship
            .subscribe(key.into(), Arc::new(callback))
    }

    pub fn on_mentorship_started<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&MentorshipStarted) + Send + Sync + 'static,
    {
        self.registries.mentorship_started.subscribe(Arc::new(callback))
    }

    pub fn on_mentorship_ended<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&MentorshipEnded) + Send + Sync + 'static,
    {
        self.registries.mentorship_ended.subscribe(Arc::new(callback))
    }

    /// Fires after every successful namespace handshake, including
    /// automatic reconnects
    pub fn on_connect<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&ConnectInfo) + Send + Sync + 'static,
    {
        self.registries.connect.subscribe(Arc::new(callback))
    }

    pub fn on_disconnect<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&DisconnectReason) + Send + Sync + 'static,
    {
        self.registries.disconnect.subscribe(Arc::new(callback))
    }

    /// Presence changes; `user:online` and `user:offline` arrive here
    /// normalized to `is_online`
    pub fn on_user_status<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&UserStatus) + Send + Sync + 'static,
    {
        self.registries.user_status.subscribe(Arc::new(callback))
    }
}

impl std::fmt::Debug for RealtimeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("namespace", &self.options.namespace)
            .field("state", &self.connection.state())
            .finish()
    }
}
