// Module declarations
mod builder;
mod connection;
mod core;
mod session;

// Public API exports
pub use builder::{RealtimeClientBuilder, RealtimeClientOptions};
pub use connection::{ConnectionManager, ConnectionState};
pub use self::core::RealtimeClient;
