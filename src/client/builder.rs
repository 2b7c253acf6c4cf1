use super::{ConnectionManager, RealtimeClient};
use crate::registry::Registries;
use crate::transport::TransportKind;
use crate::types::{
    COMMAND_BUFFER_SIZE, DEFAULT_NAMESPACE, DEFAULT_PATH, DEFAULT_TIMEOUT, RECONNECTION_ATTEMPTS,
    RECONNECTION_DELAY, RealtimeError, Result,
};
use std::sync::Arc;
use url::Url;

#[derive(Debug, Clone)]
pub struct RealtimeClientOptions {
    /// Socket.IO namespace joined after the transport opens
    pub namespace: String,
    /// Engine.IO endpoint path
    pub path: String,
    /// Transports to try, in order
    pub transports: Vec<TransportKind>,
    pub reconnection: bool,
    /// Retries after the first failed attempt
    pub reconnection_attempts: u32,
    /// Fixed delay between attempts, in milliseconds
    pub reconnection_delay: u64,
    /// Handshake timeout, in milliseconds
    pub timeout: u64,
    /// Capacity of the queue between client calls and the session driver
    pub command_buffer: usize,
}

impl Default for RealtimeClientOptions {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            path: DEFAULT_PATH.to_string(),
            transports: vec![TransportKind::WebSocket, TransportKind::Polling],
            reconnection: true,
            reconnection_attempts: RECONNECTION_ATTEMPTS,
            reconnection_delay: RECONNECTION_DELAY,
            timeout: DEFAULT_TIMEOUT,
            command_buffer: COMMAND_BUFFER_SIZE,
        }
    }
}

/// Builder for RealtimeClient that validates the configuration
pub struct RealtimeClientBuilder {
    endpoint: Url,
    options: RealtimeClientOptions,
}

impl RealtimeClientBuilder {
    /// Create a new builder
    pub fn new(endpoint: impl AsRef<str>, options: RealtimeClientOptions) -> Result<Self> {
        let endpoint = Url::parse(endpoint.as_ref())?;

        if !matches!(endpoint.scheme(), "http" | "https" | "ws" | "wss") {
            return Err(RealtimeError::Config(format!(
                "unsupported endpoint scheme '{}'",
                endpoint.scheme()
            )));
        }
        if !options.namespace.starts_with('/') {
            return Err(RealtimeError::Config(format!(
                "namespace '{}' must start with '/'",
                options.namespace
            )));
        }
        if options.transports.is_empty() {
            return Err(RealtimeError::Config(
                "at least one transport is required".to_string(),
            ));
        }
        if options.command_buffer == 0 {
            return Err(RealtimeError::Config(
                "command buffer must not be empty".to_string(),
            ));
        }

        Ok(Self { endpoint, options })
    }

    /// Build the client. Nothing is spawned until `connect()`.
    pub fn build(self) -> RealtimeClient {
        RealtimeClient {
            endpoint: self.endpoint,
            options: self.options,
            connection: Arc::new(ConnectionManager::new()),
            registries: Arc::new(Registries::new()),
        }
    }
}
