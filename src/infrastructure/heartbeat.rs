use std::time::Duration;
use tokio::time::Instant;

/// Tracks the Engine.IO v4 heartbeat.
///
/// The server pings every `pingInterval`; the client answers with a pong.
/// If nothing arrives from the server for `pingInterval + pingTimeout`, the
/// connection is considered dead.
pub struct HeartbeatMonitor {
    deadline: Duration,
    last_seen: Instant,
}

impl HeartbeatMonitor {
    pub fn new(deadline: Duration) -> Self {
        Self {
            deadline,
            last_seen: Instant::now(),
        }
    }

    /// Any packet from the server proves the connection is alive
    pub fn record_activity(&mut self) {
        self.last_seen = Instant::now();
    }

    /// Instant after which the connection counts as timed out
    pub fn expires_at(&self) -> Instant {
        self.last_seen + self.deadline
    }
}
