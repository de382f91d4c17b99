use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use super::expiry::ExpiryQueue;

/// A stored value and the instant it stops being visible. `None` means the
/// entry never expires.
#[derive(Debug, Clone)]
pub struct Entry {
    pub value: String,
    pub expires_at: Option<Instant>,
}

impl Entry {
    pub fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// Shared expiring key-value map. Clones are handles to the same map and all
/// synchronization is internal, so connection threads never lock anything
/// themselves. Expired entries are dropped lazily on read; a background
/// worker additionally sweeps each TTL'd key at its deadline.
#[derive(Debug, Clone)]
pub struct Store {
    entries: Arc<Mutex<HashMap<String, Entry>>>,
    expiry: ExpiryQueue,
}

impl Store {
    pub fn new() -> Self {
        let entries = Arc::new(Mutex::new(HashMap::new()));
        let expiry = ExpiryQueue::start(Arc::clone(&entries));
        Self { entries, expiry }
    }

    /// Inserts or overwrites an entry. Overwriting replaces both value and
    /// expiration, so a set without TTL clears any prior expiration.
    pub fn set(&self, key: String, value: String, ttl: Option<Duration>) {
        log::debug!("Setting key '{}' (ttl: {:?})", key, ttl);
        let expires_at = ttl.map(|ttl| Instant::now() + ttl);
        self.entries
            .lock()
            .insert(key.clone(), Entry { value, expires_at });
        if let Some(deadline) = expires_at {
            self.expiry.schedule(key, deadline);
        }
    }

    /// Returns the live value; an entry past its deadline is removed and
    /// reported absent even if the sweep has not reached it yet.
    pub fn get(&self, key: &str) -> Option<String> {
        let mut entries = self.entries.lock();
        let entry = entries.get(key)?;
        if entry.is_expired(Instant::now()) {
            log::debug!("Key '{}' has expired", key);
            entries.remove(key);
            return None;
        }
        Some(entry.value.clone())
    }

    /// Merges external pairs in with no expiration, overwriting same-name
    /// keys. Used for snapshot bootstrap.
    pub fn load_all(&self, pairs: HashMap<String, String>) {
        log::debug!("Merging {} external entries into the store", pairs.len());
        let mut entries = self.entries.lock();
        for (key, value) in pairs {
            entries.insert(
                key,
                Entry {
                    value,
                    expires_at: None,
                },
            );
        }
    }

    /// All currently non-expired keys, pruning whatever the scan finds dead.
    pub fn keys(&self) -> Vec<String> {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        entries.retain(|_, entry| !entry.is_expired(now));
        entries.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}
