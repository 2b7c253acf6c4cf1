use super::{EngineLink, TransportKind};
use crate::infrastructure::TaskManager;
use crate::protocol::{EnginePacket, OpenInfo};
use crate::types::{RealtimeError, Result};
use futures::sink::SinkExt;
use futures::stream::StreamExt;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use url::Url;

/// Opens a WebSocket and waits for the Engine.IO `open` packet
pub(super) async fn open(url: Url, buffer: usize) -> Result<EngineLink> {
    let (ws_stream, _response) = tokio_tungstenite::connect_async(url.as_str()).await?;
    let (mut write_half, mut read_half) = ws_stream.split();

    let open: OpenInfo = loop {
        match read_half.next().await {
            Some(Ok(Message::Text(text))) => match EnginePacket::decode(text.as_str())? {
                EnginePacket::Open(info) => break info,
                other => {
                    tracing::warn!("Ignoring {:?} received before handshake", other);
                }
            },
            Some(Ok(Message::Close(_))) | None => {
                return Err(RealtimeError::Connection(
                    "websocket closed before handshake".to_string(),
                ));
            }
            Some(Ok(_)) => continue,
            Some(Err(e)) => return Err(e.into()),
        }
    };

    let (inbound_tx, inbound_rx) = mpsc::channel::<EnginePacket>(buffer);
    let (outbound_tx, mut outbound_rx) = mpsc::channel::<EnginePacket>(buffer);
    let mut tasks = TaskManager::new();

    tasks.spawn(async move {
        tracing::debug!("Starting websocket read task");
        while let Some(msg_result) = read_half.next().await {
            match msg_result {
                Ok(Message::Text(text)) => match EnginePacket::decode(text.as_str()) {
                    Ok(packet) => {
                        if inbound_tx.send(packet).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse engine packet: {} - Raw: {}", e, text);
                    }
                },
                Ok(Message::Close(frame)) => {
                    if let Some(close_frame) = frame {
                        tracing::info!(
                            "Server closed websocket: code={:?}, reason='{}'",
                            close_frame.code,
                            close_frame.reason
                        );
                    } else {
                        tracing::info!("Server closed websocket without close frame");
                    }
                    break;
                }
                Ok(Message::Binary(data)) => {
                    tracing::warn!(
                        "Received unexpected binary message ({} bytes)",
                        data.len()
                    );
                }
                Ok(Message::Ping(_)) | Ok(Message::Pong(_)) | Ok(Message::Frame(_)) => {}
                Err(e) => {
                    tracing::error!("WebSocket read error: {}", e);
                    break;
                }
            }
        }
        tracing::debug!("Websocket read task finished");
    });

    // The writer is not tracked: it drains whatever was queued and closes
    // the socket once the link (and with it the last sender) is dropped.
    tokio::spawn(async move {
        while let Some(packet) = outbound_rx.recv().await {
            let encoded = match packet.encode() {
                Ok(encoded) => encoded,
                Err(e) => {
                    tracing::error!("Failed to encode engine packet: {}", e);
                    continue;
                }
            };

            if let Err(e) = write_half.send(Message::Text(encoded.into())).await {
                tracing::error!("WebSocket write error: {}", e);
                break;
            }

            if packet == EnginePacket::Close {
                break;
            }
        }
        if let Err(e) = write_half.close().await {
            tracing::debug!("WebSocket close failed: {}", e);
        }
    });

    Ok(EngineLink {
        kind: TransportKind::WebSocket,
        open,
        outbound: outbound_tx,
        inbound: inbound_rx,
        tasks,
    })
}
