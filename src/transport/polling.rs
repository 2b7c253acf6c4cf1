use super::{EngineLink, TransportKind};
use crate::infrastructure::TaskManager;
use crate::protocol::{EnginePacket, decode_payload, encode_payload};
use crate::types::{RealtimeError, Result};
use tokio::sync::mpsc;
use url::Url;

/// HTTP long-polling fallback: one GET for the handshake, then a reader
/// issuing GETs back to back and a writer POSTing batched packets
pub(super) async fn open(url: Url, buffer: usize) -> Result<EngineLink> {
    let http = reqwest::Client::new();

    let body = poll_once(&http, &url).await?;

    let mut packets = decode_payload(&body).into_iter();
    let open = match packets.next() {
        Some(Ok(EnginePacket::Open(info))) => info,
        Some(Err(e)) => return Err(e),
        _ => {
            return Err(RealtimeError::Protocol(
                "polling handshake did not start with an open packet".to_string(),
            ));
        }
    };
    let leftover: Vec<EnginePacket> = packets.filter_map(|p| p.ok()).collect();

    let mut session_url = url;
    session_url.query_pairs_mut().append_pair("sid", &open.sid);

    let (inbound_tx, inbound_rx) = mpsc::channel::<EnginePacket>(buffer);
    let (outbound_tx, mut outbound_rx) = mpsc::channel::<EnginePacket>(buffer);
    let mut tasks = TaskManager::new();

    let reader_http = http.clone();
    let reader_url = session_url.clone();
    tasks.spawn(async move {
        tracing::debug!("Starting polling read task");
        for packet in leftover {
            if inbound_tx.send(packet).await.is_err() {
                return;
            }
        }

        loop {
            let body = match poll_once(&reader_http, &reader_url).await {
                Ok(body) => body,
                Err(e) => {
                    tracing::error!("Polling read error: {}", e);
                    break;
                }
            };

            for packet in decode_payload(&body) {
                match packet {
                    Ok(EnginePacket::Close) => {
                        tracing::info!("Server closed polling session");
                        return;
                    }
                    Ok(packet) => {
                        if inbound_tx.send(packet).await.is_err() {
                            return;
                        }
                    }
                    Err(e) => tracing::warn!("Failed to parse engine packet: {}", e),
                }
            }
        }
        tracing::debug!("Polling read task finished");
    });

    // Untracked like the websocket writer: flushes the queue, then exits
    // when the link is dropped.
    tokio::spawn(async move {
        while let Some(first) = outbound_rx.recv().await {
            let mut batch = vec![first];
            while let Ok(next) = outbound_rx.try_recv() {
                batch.push(next);
            }
            let closing = batch.contains(&EnginePacket::Close);

            let body = match encode_payload(&batch) {
                Ok(body) => body,
                Err(e) => {
                    tracing::error!("Failed to encode polling payload: {}", e);
                    continue;
                }
            };

            let sent = http
                .post(session_url.clone())
                .header(reqwest::header::CONTENT_TYPE, "text/plain;charset=UTF-8")
                .body(body)
                .send()
                .await
                .and_then(|response| response.error_for_status());

            if let Err(e) = sent {
                tracing::error!("Polling write error: {}", e);
                break;
            }
            if closing {
                break;
            }
        }
    });

    Ok(EngineLink {
        kind: TransportKind::Polling,
        open,
        outbound: outbound_tx,
        inbound: inbound_rx,
        tasks,
    })
}

async fn poll_once(http: &reqwest::Client, url: &Url) -> Result<String> {
    let body = http
        .get(url.clone())
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    Ok(body)
}
