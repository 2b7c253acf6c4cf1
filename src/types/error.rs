use thiserror::Error;

/// Errors that can occur inside the realtime client.
///
/// Public client operations never hand these back to callers; they are
/// logged where they happen. Lower layers (codec, transports, builder) return
/// them through [`Result`].
#[derive(Error, Debug)]
pub enum RealtimeError {
    /// WebSocket protocol error (connection failed, invalid frame, etc.)
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// HTTP error on the long-polling transport
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing error (malformed endpoint URL)
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Malformed Engine.IO or Socket.IO packet
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The server refused the namespace connection (CONNECT_ERROR)
    #[error("Connect error: {0}")]
    ConnectError(String),

    /// General connection error with descriptive message
    #[error("Connection error: {0}")]
    Connection(String),

    /// Invalid client configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Handshake did not complete in time
    #[error("Timeout error")]
    Timeout,

    /// Attempted operation while not connected to the server
    #[error("Not connected")]
    NotConnected,

    /// `connect` was called outside a tokio runtime
    #[error("No tokio runtime available")]
    NoRuntime,
}

/// Convenience type alias for `Result<T, RealtimeError>`.
pub type Result<T> = std::result::Result<T, RealtimeError>;
