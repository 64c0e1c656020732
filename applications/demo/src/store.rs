//! Short-lived storage for authorization flows awaiting their callback.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tidal_client::PkceAuthorization;
use tokio::sync::Mutex;
use tracing::debug;

/// Holds pending PKCE flows keyed by their anti-CSRF state value.
///
/// Entries expire after a fixed time-to-live, so an abandoned login cannot
/// be completed later with a replayed state. The store is owned by the
/// callback server; nothing else can reach the verifiers.
pub struct PendingAuthStore {
    ttl: Duration,
    entries: Mutex<HashMap<String, PendingEntry>>,
}

struct PendingEntry {
    pkce: PkceAuthorization,
    inserted_at: Instant,
}

impl PendingAuthStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Register a flow under its state value.
    pub async fn insert(&self, state: String, pkce: PkceAuthorization) {
        let mut entries = self.entries.lock().await;
        sweep(&mut entries, self.ttl);
        entries.insert(
            state,
            PendingEntry {
                pkce,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Remove and return the flow for a state, if it exists and has not
    /// expired. Each state is redeemable once.
    pub async fn take(&self, state: &str) -> Option<PkceAuthorization> {
        let mut entries = self.entries.lock().await;
        sweep(&mut entries, self.ttl);
        entries.remove(state).map(|entry| entry.pkce)
    }
}

fn sweep(entries: &mut HashMap<String, PendingEntry>, ttl: Duration) {
    let before = entries.len();
    entries.retain(|_, entry| entry.inserted_at.elapsed() < ttl);
    let expired = before - entries.len();
    if expired > 0 {
        debug!(expired, "Dropped expired authorization flows");
    }
}
