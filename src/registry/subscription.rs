use crate::types::WILDCARD_KEY;

/// Scope of a per-conversation subscription
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SubscriptionKey {
    /// Events for one conversation
    Conversation(String),
    /// Events for every conversation (`"*"`)
    All,
}

impl SubscriptionKey {
    pub fn parse(key: &str) -> Self {
        if key == WILDCARD_KEY {
            Self::All
        } else {
            Self::Conversation(key.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Conversation(id) => id,
            Self::All => WILDCARD_KEY,
        }
    }
}

impl From<&str> for SubscriptionKey {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl From<String> for SubscriptionKey {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<&String> for SubscriptionKey {
    fn from(s: &String) -> Self {
        Self::parse(s)
    }
}

impl std::fmt::Display for SubscriptionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

type Remover = Box<dyn FnOnce() + Send + Sync + 'static>;

/// Handle to one registered callback.
///
/// Dropping the handle removes the callback, so it must be held for as long
/// as the subscriber wants events. Call [`detach`](Self::detach) to keep the
/// callback registered for the lifetime of the client instead.
#[must_use = "dropping a Subscription unsubscribes the callback immediately"]
pub struct Subscription {
    remover: Option<Remover>,
}

impl Subscription {
    pub(crate) fn new(remover: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            remover: Some(Box::new(remover)),
        }
    }

    /// Removes exactly the callback this handle was returned for
    pub fn unsubscribe(mut self) {
        self.remove();
    }

    /// Leaves the callback registered and gives up the ability to remove it
    pub fn detach(mut self) {
        self.remover = None;
    }

    fn remove(&mut self) {
        if let Some(remover) = self.remover.take() {
            remover();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.remove();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.remover.is_some())
            .finish()
    }
}
