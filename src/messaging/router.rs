use super::InboundEvent;
use crate::registry::Registries;
use serde_json::Value;
use std::sync::Arc;

/// Routes decoded server events to the registered callbacks
#[derive(Clone)]
pub struct MessageRouter {
    registries: Arc<Registries>,
}

impl MessageRouter {
    pub fn new(registries: Arc<Registries>) -> Self {
        Self { registries }
    }

    /// Entry point for every inbound Socket.IO event
    pub fn route_raw(&self, name: &str, args: &[Value]) {
        let payload = args.first().cloned().unwrap_or(Value::Null);

        // Catch-all diagnostic log
        tracing::debug!(
            "Received event: name={}, payload={}",
            name,
            serde_json::to_string(&payload).unwrap_or_default()
        );

        match InboundEvent::decode(name, payload) {
            Ok(Some(event)) => self.route(event),
            Ok(None) => tracing::debug!("No handler for event '{}'", name),
            Err(e) => tracing::warn!("Failed to decode event '{}': {}", name, e),
        }
    }

    /// Dispatches a typed event to the matching registry
    pub fn route(&self, event: InboundEvent) {
        let registries = &self.registries;
        match event {
            InboundEvent::Message(event) => {
                registries
                    .messages
                    .dispatch(&event.message.conversation_id, &event);
            }
            InboundEvent::Read(receipt) => {
                registries
                    .reads
                    .dispatch(&receipt.conversation_id, &receipt);
            }
            InboundEvent::Typing(typing) => {
                registries
                    .typing
                    .dispatch(&typing.conversation_id, &typing);
            }
            InboundEvent::ConversationMentorship(status) => {
                registries
                    .conversation_mentorship
                    .dispatch(&status.conversation_id, &status);
            }
            InboundEvent::MentorshipStarted(started) => {
                registries.mentorship_started.emit(&started);
            }
            InboundEvent::MentorshipEnded(ended) => {
                registries.mentorship_ended.emit(&ended);
            }
            InboundEvent::UserStatus(status) => {
                registries.user_status.emit(&status);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MessageEvent, TypingIndicator, UserStatus};
    use serde_json::json;
    use std::sync::Mutex;

    fn router() -> (MessageRouter, Arc<Registries>) {
        let registries = Arc::new(Registries::new());
        (MessageRouter::new(Arc::clone(&registries)), registries)
    }

    #[test]
    fn test_message_scenario_exact_and_wildcard() {
        let (router, registries) = router();
        let seen_a: Arc<Mutex<Vec<MessageEvent>>> = Arc::default();
        let seen_b: Arc<Mutex<Vec<MessageEvent>>> = Arc::default();

        let log_a = Arc::clone(&seen_a);
        let _a = registries.messages.subscribe(
            "conv1".into(),
            Arc::new(move |e: &MessageEvent| log_a.lock().unwrap().push(e.clone())),
        );
        let log_b = Arc::clone(&seen_b);
        let _b = registries.messages.subscribe(
            "*".into(),
            Arc::new(move |e: &MessageEvent| log_b.lock().unwrap().push(e.clone())),
        );

        router.route_raw(
            "message:new",
            &[json!({"id": "m1", "conversationId": "conv1", "content": "hi"})],
        );
        assert_eq!(seen_a.lock().unwrap().len(), 1);
        assert_eq!(seen_b.lock().unwrap().len(), 1);
        assert_eq!(seen_a.lock().unwrap()[0].message.content, "hi");

        router.route_raw(
            "message:new",
            &[json!({"id": "m2", "conversationId": "conv2", "content": "yo"})],
        );
        assert_eq!(seen_a.lock().unwrap().len(), 1);
        assert_eq!(seen_b.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_typing_routes_by_conversation() {
        let (router, registries) = router();
        let seen: Arc<Mutex<Vec<TypingIndicator>>> = Arc::default();

        let log = Arc::clone(&seen);
        let _sub = registries.typing.subscribe(
            "conv1".into(),
            Arc::new(move |t: &TypingIndicator| log.lock().unwrap().push(t.clone())),
        );

        router.route_raw(
            "typing:start",
            &[json!({"conversationId": "conv1", "userId": "u2"})],
        );
        router.route_raw(
            "typing:start",
            &[json!({"conversationId": "conv9", "userId": "u2"})],
        );

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].is_typing);
    }

    #[test]
    fn test_global_events_ignore_conversation() {
        let (router, registries) = router();
        let seen: Arc<Mutex<Vec<UserStatus>>> = Arc::default();

        let log = Arc::clone(&seen);
        let _sub = registries.user_status.subscribe(Arc::new(move |s: &UserStatus| {
            log.lock().unwrap().push(s.clone())
        }));

        router.route_raw("user:online", &[json!({"userId": "u1"})]);
        router.route_raw("user:status", &[json!({"userId": "u2", "isOnline": false})]);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen[0].is_online);
        assert!(!seen[1].is_online);
    }

    #[test]
    fn test_malformed_and_unknown_events_are_dropped() {
        let (router, registries) = router();
        let count = Arc::new(Mutex::new(0));

        let counter = Arc::clone(&count);
        let _sub = registries.messages.subscribe(
            "*".into(),
            Arc::new(move |_: &MessageEvent| *counter.lock().unwrap() += 1),
        );

        router.route_raw("message:new", &[json!("not an object")]);
        router.route_raw("message:new", &[]);
        router.route_raw("notification:new", &[json!({"conversationId": "c"})]);

        assert_eq!(*count.lock().unwrap(), 0);
    }
}
