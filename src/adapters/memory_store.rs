//! In-memory state store.
//!
//! Implements [`StateStore`] over a map of slices, each a map of fields
//! to JSON values.  Used by the host binary (seeded from the config
//! file) and by tests.

use std::collections::{BTreeMap, HashMap};

use serde_json::Value;

use crate::app::ports::{StateStore, SubscriptionKey};

#[derive(Debug, Default)]
pub struct MemoryStore {
    slices: HashMap<String, BTreeMap<String, Value>>,
    subscriptions: HashMap<SubscriptionKey, Vec<String>>,
    next_key: u32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set one field.  Returns `true` when a subscriber should be
    /// notified about `slice`.
    pub fn set(&mut self, slice: &str, field: &str, value: Value) -> bool {
        self.slices
            .entry(slice.to_owned())
            .or_default()
            .insert(field.to_owned(), value);
        self.is_watched(slice)
    }

    /// Whether any live subscription covers `slice`.
    pub fn is_watched(&self, slice: &str) -> bool {
        self.subscriptions
            .values()
            .any(|slices| slices.iter().any(|s| s == slice))
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }
}

impl StateStore for MemoryStore {
    fn subscribe(&mut self, slices: &[&str]) -> SubscriptionKey {
        self.next_key += 1;
        let key = SubscriptionKey(self.next_key);
        self.subscriptions
            .insert(key, slices.iter().map(|s| (*s).to_owned()).collect());
        key
    }

    fn unsubscribe(&mut self, key: SubscriptionKey) {
        self.subscriptions.remove(&key);
    }

    fn get(&self, slice: &str, field: &str) -> Option<Value> {
        self.slices.get(slice)?.get(field).cloned()
    }
}
