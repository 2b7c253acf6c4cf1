use mentorship_realtime_rs::{RealtimeClient, RealtimeClientOptions};

/// Listens to every conversation the server routes to us and prints events
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing; RUST_LOG=mentorship_realtime_rs=debug shows every inbound event
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let url = std::env::var("REALTIME_URL").unwrap_or_else(|_| "http://localhost:4000".to_string());
    let token = std::env::var("REALTIME_TOKEN").expect("REALTIME_TOKEN must be set in .env");
    let user_id = std::env::var("REALTIME_USER_ID").expect("REALTIME_USER_ID must be set in .env");
    let conversation = std::env::var("REALTIME_CONVERSATION").ok();

    println!("📡 Connecting to: {}\n", url);
    let client = RealtimeClient::new(&url, RealtimeClientOptions::default())?;

    let _connected = client.on_connect({
        let client = client.clone();
        let conversation = conversation.clone();
        move |info| {
            println!("✅ Connected (sid={:?})", info.sid);
            if let Some(id) = &conversation {
                client.join_conversation(id.clone());
            }
        }
    });
    let _disconnected = client.on_disconnect(|reason| println!("⚠️  Disconnected: {}", reason));

    let _messages = client.on_message("*", |event| {
        println!(
            "💬 [{}] {:?}: {}",
            event.message.conversation_id, event.kind, event.message.content
        );
    });
    let _typing = client.on_typing("*", |typing| {
        let verb = if typing.is_typing { "is typing" } else { "stopped typing" };
        println!("✏️  [{}] {} {}", typing.conversation_id, typing.user_id, verb);
    });
    let _reads = client.on_read("*", |receipt| {
        println!(
            "👀 [{}] {} read {} message(s)",
            receipt.conversation_id,
            receipt.read_by,
            receipt.message_ids.len()
        );
    });
    let _presence = client.on_user_status(|status| {
        let state = if status.is_online { "online" } else { "offline" };
        println!("🟢 {} is {}", status.user_id, state);
    });
    let _started = client.on_mentorship_started(|started| {
        println!("🎓 Mentorship {} started ({})", started.mentorship_id, started.status);
    });
    let _ended = client.on_mentorship_ended(|ended| {
        println!("🏁 Mentorship {} ended ({})", ended.mentorship_id, ended.status);
    });

    client.connect(token, user_id);

    // Keep listening until interrupted
    tokio::signal::ctrl_c().await?;

    println!("Disconnecting...");
    client.disconnect();
    Ok(())
}
