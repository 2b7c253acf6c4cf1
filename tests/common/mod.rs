//! In-process Socket.IO server speaking just enough Engine.IO v4 over
//! WebSocket to drive the client in tests.

#![allow(dead_code)]

pub mod polling;

use futures::{SinkExt, StreamExt};
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{Mutex, broadcast, mpsc};
use tokio_tungstenite::tungstenite::Message;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    /// Acknowledge every namespace CONNECT
    Accept,
    /// Answer every namespace CONNECT with CONNECT_ERROR
    Reject,
}

#[derive(Debug, Clone)]
enum Push {
    Frame(String),
    Drop,
}

pub struct MockServer {
    port: u16,
    connections: Arc<AtomicUsize>,
    frames: Mutex<mpsc::UnboundedReceiver<String>>,
    pushes: broadcast::Sender<Push>,
}

impl MockServer {
    pub async fn start(behavior: Behavior) -> Self {
        Self::start_with_heartbeat(behavior, 25_000, 20_000).await
    }

    /// Advertises the given heartbeat in the open packet. The mock never
    /// pings, so a short heartbeat makes the client time the link out.
    pub async fn start_with_heartbeat(
        behavior: Behavior,
        ping_interval: u64,
        ping_timeout: u64,
    ) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let connections = Arc::new(AtomicUsize::new(0));
        let (frames_tx, frames_rx) = mpsc::unbounded_channel();
        let (pushes, _) = broadcast::channel(64);

        let counter = Arc::clone(&connections);
        let pushes_for_accept = pushes.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let index = counter.fetch_add(1, Ordering::SeqCst) + 1;
                tokio::spawn(serve(
                    stream,
                    index,
                    behavior,
                    (ping_interval, ping_timeout),
                    frames_tx.clone(),
                    pushes_for_accept.subscribe(),
                ));
            }
        });

        Self {
            port,
            connections,
            frames: Mutex::new(frames_rx),
            pushes,
        }
    }

    pub fn url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    /// TCP connections accepted so far
    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    /// Sends a raw Engine.IO frame to every live connection
    pub fn push(&self, frame: impl Into<String>) {
        let _ = self.pushes.send(Push::Frame(frame.into()));
    }

    /// Sends an EVENT on the `/chat` namespace
    pub fn push_event(&self, name: &str, payload: Value) {
        let data = serde_json::json!([name, payload]);
        self.push(format!("42/chat,{}", data));
    }

    /// Drops every live connection without a close handshake
    pub fn drop_connections(&self) {
        let _ = self.pushes.send(Push::Drop);
    }

    /// Next frame the client sent, in arrival order
    pub async fn next_frame(&self) -> String {
        let mut frames = self.frames.lock().await;
        tokio::time::timeout(Duration::from_secs(5), frames.recv())
            .await
            .expect("timed out waiting for a client frame")
            .expect("mock server stopped")
    }

    /// Skips frames until one matches
    pub async fn next_frame_matching(&self, predicate: impl Fn(&str) -> bool) -> String {
        loop {
            let frame = self.next_frame().await;
            if predicate(&frame) {
                return frame;
            }
        }
    }

    /// Next `/chat` EVENT the client emitted, as `(name, payload)`
    pub async fn next_event(&self) -> (String, Value) {
        let frame = self
            .next_frame_matching(|frame| frame.starts_with("42/chat,"))
            .await;
        let data: Value = serde_json::from_str(&frame["42/chat,".len()..]).unwrap();
        let name = data[0].as_str().unwrap().to_string();
        (name, data[1].clone())
    }
}

async fn serve(
    stream: TcpStream,
    index: usize,
    behavior: Behavior,
    (ping_interval, ping_timeout): (u64, u64),
    frames: mpsc::UnboundedSender<String>,
    mut pushes: broadcast::Receiver<Push>,
) {
    let Ok(ws) = tokio_tungstenite::accept_async(stream).await else {
        return;
    };
    let (mut write, mut read) = ws.split();

    let open = format!(
        r#"0{{"sid":"eio-{}","upgrades":[],"pingInterval":{},"pingTimeout":{},"maxPayload":1000000}}"#,
        index, ping_interval, ping_timeout
    );
    if write.send(Message::Text(open.into())).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            msg = read.next() => {
                let text = match msg {
                    Some(Ok(Message::Text(text))) => text.as_str().to_owned(),
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => return,
                    Some(Ok(_)) => continue,
                };

                let reply = if text.starts_with("40/chat") {
                    Some(match behavior {
                        Behavior::Accept => format!(r#"40/chat,{{"sid":"sock-{}"}}"#, index),
                        Behavior::Reject => r#"44/chat,{"message":"unauthorized"}"#.to_string(),
                    })
                } else {
                    None
                };

                let _ = frames.send(text);
                if let Some(reply) = reply
                    && write.send(Message::Text(reply.into())).await.is_err()
                {
                    return;
                }
            }
            push = pushes.recv() => match push {
                Ok(Push::Frame(frame)) => {
                    if write.send(Message::Text(frame.into())).await.is_err() {
                        return;
                    }
                }
                Ok(Push::Drop) | Err(broadcast::error::RecvError::Closed) => return,
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
            },
        }
    }
}

/// Polls `condition` until it holds, panicking after a few seconds
pub async fn eventually(condition: impl Fn() -> bool) {
    for _ in 0..500 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not met in time");
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
