// Transport module - Engine.IO transports (WebSocket, HTTP long-polling)
mod polling;
mod websocket;

use crate::infrastructure::TaskManager;
use crate::protocol::{EnginePacket, OpenInfo};
use crate::types::{ENGINE_IO_VERSION, RealtimeError, Result};
use std::time::Duration;
use tokio::sync::mpsc;
use url::Url;

/// Engine.IO transport, in order of preference when listed in the options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    WebSocket,
    Polling,
}

impl TransportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WebSocket => "websocket",
            Self::Polling => "polling",
        }
    }
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An open Engine.IO session on some transport.
///
/// Packets written to `outbound` are sent in order; `inbound` yields server
/// packets and returns `None` once the transport is gone. Dropping the link
/// stops its background tasks.
pub struct EngineLink {
    pub kind: TransportKind,
    pub open: OpenInfo,
    pub outbound: mpsc::Sender<EnginePacket>,
    pub inbound: mpsc::Receiver<EnginePacket>,
    tasks: TaskManager,
}

impl EngineLink {
    /// Queues a packet for the transport writer
    pub async fn send(&self, packet: EnginePacket) -> Result<()> {
        self.outbound
            .send(packet)
            .await
            .map_err(|_| RealtimeError::Connection(format!("{} transport closed", self.kind)))
    }

    /// Whether the transport reader has stopped
    pub fn is_closed(&self) -> bool {
        self.tasks.is_finished()
    }
}

/// Opens the first transport in `preference` that completes the Engine.IO
/// handshake. Each transport gets its own `timeout`.
pub async fn open_preferred(
    endpoint: &Url,
    path: &str,
    preference: &[TransportKind],
    buffer: usize,
    timeout: Duration,
) -> Result<EngineLink> {
    let mut last_error = RealtimeError::Config("no transports configured".to_string());

    for kind in preference {
        let url = engine_url(endpoint, path, *kind)?;
        tracing::debug!("Opening {} transport: {}", kind, url);

        let opening = async {
            match kind {
                TransportKind::WebSocket => websocket::open(url, buffer).await,
                TransportKind::Polling => polling::open(url, buffer).await,
            }
        };
        let opened = tokio::time::timeout(timeout, opening)
            .await
            .unwrap_or(Err(RealtimeError::Timeout));

        match opened {
            Ok(link) => {
                tracing::info!("Opened {} transport (sid={})", kind, link.open.sid);
                return Ok(link);
            }
            Err(e) => {
                tracing::warn!("{} transport failed: {}", kind, e);
                last_error = e;
            }
        }
    }

    Err(last_error)
}

/// Builds the Engine.IO URL for `kind` from the configured endpoint
pub fn engine_url(endpoint: &Url, path: &str, kind: TransportKind) -> Result<Url> {
    let mut url = endpoint.clone();

    let secure = matches!(endpoint.scheme(), "https" | "wss");
    let scheme = match (kind, secure) {
        (TransportKind::WebSocket, false) => "ws",
        (TransportKind::WebSocket, true) => "wss",
        (TransportKind::Polling, false) => "http",
        (TransportKind::Polling, true) => "https",
    };
    url.set_scheme(scheme).map_err(|_| {
        RealtimeError::Config(format!("cannot use scheme '{}' for {}", scheme, endpoint))
    })?;

    url.set_path(path);
    url.set_query(None);
    url.set_fragment(None);
    url.query_pairs_mut()
        .append_pair("EIO", ENGINE_IO_VERSION)
        .append_pair("transport", kind.as_str());

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_url_maps_schemes() {
        let endpoint = Url::parse("https://api.example.com").unwrap();

        let ws = engine_url(&endpoint, "/socket.io/", TransportKind::WebSocket).unwrap();
        assert_eq!(
            ws.as_str(),
            "wss://api.example.com/socket.io/?EIO=4&transport=websocket"
        );

        let polling = engine_url(&endpoint, "/socket.io/", TransportKind::Polling).unwrap();
        assert_eq!(
            polling.as_str(),
            "https://api.example.com/socket.io/?EIO=4&transport=polling"
        );
    }

    #[test]
    fn test_engine_url_keeps_port_and_drops_query() {
        let endpoint = Url::parse("ws://localhost:4000/ignored?x=1").unwrap();

        let polling = engine_url(&endpoint, "/socket.io/", TransportKind::Polling).unwrap();
        assert_eq!(
            polling.as_str(),
            "http://localhost:4000/socket.io/?EIO=4&transport=polling"
        );
    }

    #[tokio::test]
    async fn test_open_preferred_reports_last_failure() {
        // Nothing listens on port 9 (discard) in the test environment
        let endpoint = Url::parse("http://127.0.0.1:9").unwrap();
        let result = open_preferred(
            &endpoint,
            "/socket.io/",
            &[TransportKind::WebSocket, TransportKind::Polling],
            8,
            Duration::from_secs(5),
        )
        .await;

        assert!(matches!(result, Err(RealtimeError::Http(_))));
    }

    #[tokio::test]
    async fn test_hanging_transport_falls_through_to_next() {
        // Accepts connections and never answers
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = Url::parse(&format!("http://{}", listener.local_addr().unwrap())).unwrap();
        let accepted = tokio::spawn(async move {
            let mut held = Vec::new();
            while held.len() < 2 {
                let (stream, _) = listener.accept().await.unwrap();
                held.push(stream);
            }
            held.len()
        });

        let result = open_preferred(
            &endpoint,
            "/socket.io/",
            &[TransportKind::WebSocket, TransportKind::Polling],
            8,
            Duration::from_millis(200),
        )
        .await;

        assert!(matches!(result, Err(RealtimeError::Timeout)));
        let accepted = tokio::time::timeout(Duration::from_secs(2), accepted)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(accepted, 2);
    }

    #[tokio::test]
    async fn test_open_preferred_without_transports() {
        let endpoint = Url::parse("http://127.0.0.1:9").unwrap();
        let result =
            open_preferred(&endpoint, "/socket.io/", &[], 8, Duration::from_secs(1)).await;
        assert!(matches!(result, Err(RealtimeError::Config(_))));
    }
}
