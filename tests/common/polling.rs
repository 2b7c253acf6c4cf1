//! Engine.IO long-polling server on axum. One session at a time: a GET
//! without `sid` is a new handshake, later GETs drain the outbox and POSTs
//! are recorded packet by packet.

use axum::Router;
use axum::extract::{Query, State};
use axum::routing::get;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Notify;

const SEPARATOR: char = '\u{1e}';

#[derive(Default)]
struct PollingState {
    handshakes: AtomicUsize,
    outbox: Mutex<VecDeque<String>>,
    ready: Notify,
    posted: Mutex<Vec<String>>,
    post_bodies: Mutex<Vec<String>>,
}

impl PollingState {
    fn queue(&self, packet: String) {
        self.outbox.lock().unwrap().push_back(packet);
        self.ready.notify_one();
    }
}

pub struct PollingServer {
    port: u16,
    state: Arc<PollingState>,
}

impl PollingServer {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let state = Arc::new(PollingState::default());

        let app = Router::new()
            .route("/socket.io/", get(poll).post(post))
            .with_state(Arc::clone(&state));
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { port, state }
    }

    pub fn url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    /// GETs that opened a new Engine.IO session
    pub fn handshakes(&self) -> usize {
        self.state.handshakes.load(Ordering::SeqCst)
    }

    /// Every packet the client POSTed, split out of its payloads
    pub fn posted(&self) -> Vec<String> {
        self.state.posted.lock().unwrap().clone()
    }

    /// Raw POST bodies, one per request
    pub fn post_bodies(&self) -> Vec<String> {
        self.state.post_bodies.lock().unwrap().clone()
    }

    pub fn push_event(&self, name: &str, payload: Value) {
        let data = serde_json::json!([name, payload]);
        self.state.queue(format!("42/chat,{}", data));
    }

    /// Ends the Engine.IO session with a close packet on the next poll
    pub fn close(&self) {
        self.state.queue("1".to_string());
    }
}

async fn poll(
    State(state): State<Arc<PollingState>>,
    Query(query): Query<HashMap<String, String>>,
) -> String {
    if !query.contains_key("sid") {
        let index = state.handshakes.fetch_add(1, Ordering::SeqCst) + 1;
        // A ping rides along with the open packet
        return format!(
            r#"0{{"sid":"poll-{}","upgrades":[],"pingInterval":25000,"pingTimeout":20000,"maxPayload":1000000}}{}2"#,
            index, SEPARATOR
        );
    }

    loop {
        let ready = state.ready.notified();
        {
            let mut outbox = state.outbox.lock().unwrap();
            if !outbox.is_empty() {
                let packets: Vec<String> = outbox.drain(..).collect();
                return packets.join(&SEPARATOR.to_string());
            }
        }
        if tokio::time::timeout(Duration::from_secs(1), ready).await.is_err() {
            return "6".to_string();
        }
    }
}

async fn post(
    State(state): State<Arc<PollingState>>,
    Query(query): Query<HashMap<String, String>>,
    body: String,
) -> &'static str {
    let sid = query.get("sid").cloned().unwrap_or_default();
    state.post_bodies.lock().unwrap().push(body.clone());

    for packet in body.split(SEPARATOR) {
        state.posted.lock().unwrap().push(packet.to_string());
        if packet.starts_with("40/chat") {
            state.queue(format!(r#"40/chat,{{"sid":"sock-{}"}}"#, sid));
        }
    }
    "ok"
}
