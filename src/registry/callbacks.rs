use super::subscription::{Subscription, SubscriptionKey};
use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

pub type Callback<T> = Arc<dyn Fn(&T) + Send + Sync + 'static>;

struct Entry<T> {
    id: u64,
    callback: Callback<T>,
}

fn lock<V>(mutex: &Mutex<V>) -> MutexGuard<'_, V> {
    // A poisoned lock only means a callback panicked while we held it; the
    // lists themselves are always left consistent.
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Runs every callback in order. A panicking subscriber is logged and the
/// remaining subscribers still receive the event.
fn invoke_all<T>(label: &str, callbacks: &[Callback<T>], payload: &T) {
    for callback in callbacks {
        if catch_unwind(AssertUnwindSafe(|| callback(payload))).is_err() {
            tracing::error!("Subscriber for '{}' panicked, continuing delivery", label);
        }
    }
}

/// Callbacks keyed by conversation id, with a wildcard bucket
pub struct ScopedRegistry<T> {
    label: &'static str,
    buckets: Arc<Mutex<HashMap<SubscriptionKey, Vec<Entry<T>>>>>,
    next_id: AtomicU64,
}

impl<T: 'static> ScopedRegistry<T> {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            buckets: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicU64::new(0),
        }
    }

    /// Appends `callback` to the bucket for `key`
    pub fn subscribe(&self, key: SubscriptionKey, callback: Callback<T>) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        lock(&self.buckets)
            .entry(key.clone())
            .or_default()
            .push(Entry { id, callback });

        tracing::debug!("Registered {} callback #{} for key {}", self.label, id, key);

        let buckets: Weak<Mutex<HashMap<SubscriptionKey, Vec<Entry<T>>>>> =
            Arc::downgrade(&self.buckets);
        Subscription::new(move || {
            let Some(buckets) = buckets.upgrade() else {
                return;
            };
            let removed = {
                let mut buckets = lock(&buckets);
                let Some(entries) = buckets.get_mut(&key) else {
                    return;
                };
                let removed = entries
                    .iter()
                    .position(|entry| entry.id == id)
                    .map(|pos| entries.remove(pos));
                if entries.is_empty() {
                    buckets.remove(&key);
                }
                removed
            };
            // The callback may own other subscriptions on this registry, so
            // it is dropped only after the lock is released.
            drop(removed);
        })
    }

    /// Invokes the callbacks registered for `conversation_id`, then the
    /// wildcard callbacks
    pub fn dispatch(&self, conversation_id: &str, payload: &T) {
        let (exact, wildcard) = {
            let buckets = lock(&self.buckets);
            let exact_key = SubscriptionKey::Conversation(conversation_id.to_string());
            (
                Self::snapshot(buckets.get(&exact_key)),
                Self::snapshot(buckets.get(&SubscriptionKey::All)),
            )
        };

        tracing::debug!(
            "Dispatching {} for conversation {} to {} exact + {} wildcard subscribers",
            self.label,
            conversation_id,
            exact.len(),
            wildcard.len()
        );

        invoke_all(self.label, &exact, payload);
        invoke_all(self.label, &wildcard, payload);
    }

    /// Number of callbacks registered under `key`
    pub fn len(&self, key: &SubscriptionKey) -> usize {
        lock(&self.buckets).get(key).map_or(0, Vec::len)
    }

    fn snapshot(entries: Option<&Vec<Entry<T>>>) -> Vec<Callback<T>> {
        entries
            .map(|entries| entries.iter().map(|e| Arc::clone(&e.callback)).collect())
            .unwrap_or_default()
    }
}

/// Unscoped callbacks; every callback sees every event
pub struct CallbackList<T> {
    label: &'static str,
    entries: Arc<Mutex<Vec<Entry<T>>>>,
    next_id: AtomicU64,
}

impl<T: 'static> CallbackList<T> {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            entries: Arc::new(Mutex::new(Vec::new())),
            next_id: AtomicU64::new(0),
        }
    }

    pub fn subscribe(&self, callback: Callback<T>) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        lock(&self.entries).push(Entry { id, callback });

        let entries: Weak<Mutex<Vec<Entry<T>>>> = Arc::downgrade(&self.entries);
        Subscription::new(move || {
            let Some(entries) = entries.upgrade() else {
                return;
            };
            let removed = {
                let mut entries = lock(&entries);
                entries
                    .iter()
                    .position(|entry| entry.id == id)
                    .map(|pos| entries.remove(pos))
            };
            drop(removed);
        })
    }

    pub fn emit(&self, payload: &T) {
        let callbacks: Vec<Callback<T>> = lock(&self.entries)
            .iter()
            .map(|e| Arc::clone(&e.callback))
            .collect();

        tracing::debug!(
            "Emitting {} to {} subscribers",
            self.label,
            callbacks.len()
        );
        invoke_all(self.label, &callbacks, payload);
    }

    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
