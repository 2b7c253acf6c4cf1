use std::time::Duration;
use mentorship_realtime_rs::{RealtimeClient, RealtimeClientOptions};

/// Joins a conversation, types for a moment, sends a message and marks it read
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let url = std::env::var("REALTIME_URL").unwrap_or_else(|_| "http://localhost:4000".to_string());
    let token = std::env::var("REALTIME_TOKEN").expect("REALTIME_TOKEN must be set in .env");
    let user_id = std::env::var("REALTIME_USER_ID").expect("REALTIME_USER_ID must be set in .env");
    let conversation =
        std::env::var("REALTIME_CONVERSATION").expect("REALTIME_CONVERSATION must be set in .env");

    let client = RealtimeClient::new(&url, RealtimeClientOptions::default())?;

    let (sent_tx, mut sent_rx) = tokio::sync::mpsc::unbounded_channel();
    let _messages = client.on_message(conversation.as_str(), move |event| {
        let _ = sent_tx.send(event.message.clone());
    });

    client.connect(token, user_id);

    // Commands are dropped until the handshake completes
    for _ in 0..50 {
        if client.is_connected() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    if !client.is_connected() {
        return Err("Could not connect to the realtime server".into());
    }
    println!("✅ Connected\n");

    client.join_conversation(conversation.as_str());

    println!("✏️  Typing...");
    client.send_typing(conversation.as_str(), true);
    tokio::time::sleep(Duration::from_secs(2)).await;
    client.send_typing(conversation.as_str(), false);

    client.send_message(conversation.as_str(), "Hello from Rust 🦀", None);
    println!("📤 Message sent, waiting for the echo...");

    match tokio::time::timeout(Duration::from_secs(5), sent_rx.recv()).await {
        Ok(Some(message)) => {
            println!("📥 Received: {}", message.content);
            if let Some(id) = message.id {
                client.mark_as_read(conversation.as_str(), vec![id]);
            }
        }
        _ => println!("⚠️  No message echoed back within 5 seconds"),
    }

    tokio::time::sleep(Duration::from_millis(500)).await;
    client.leave_conversation(conversation.as_str());
    client.disconnect();
    println!("👋 Disconnected");
    Ok(())
}
