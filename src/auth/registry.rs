/// Server-side refresh-token registry
///
/// The only mutable shared state in the auth design: a mapping from the
/// opaque identifier embedded in a refresh token to the claims that
/// should be reissued when it is redeemed. Entries are single-use;
/// redemption is an atomic remove-and-return, so of two concurrent
/// redeemers at most one can observe the entry. Not persisted — a
/// process restart invalidates all outstanding refresh tokens.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

/// Claims reissued when a refresh token is redeemed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionClaims {
    pub user_id: Uuid,
    pub phone: String,
}

struct Entry {
    claims: SessionClaims,
    expires_at: DateTime<Utc>,
}

/// In-memory registry guarded by a mutex. The lock is never held across
/// an await point; every operation is a short synchronous map access.
pub struct RefreshRegistry {
    entries: Mutex<HashMap<Uuid, Entry>>,
}

impl RefreshRegistry {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, Entry>> {
        // A panic while holding the lock leaves the map intact; keep
        // serving rather than wedging every future refresh.
        match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Register the claims to reissue for a freshly minted refresh token.
    pub fn insert(&self, id: Uuid, claims: SessionClaims, ttl_seconds: i64) {
        let expires_at = Utc::now() + Duration::seconds(ttl_seconds);
        self.lock().insert(id, Entry { claims, expires_at });
    }

    /// Redeem an identifier: remove the entry and return its claims.
    ///
    /// Exactly-once: the remove happens under the lock, so a second
    /// caller with the same identifier gets `None`. An entry past its
    /// expiry is dropped and reported absent.
    pub fn take(&self, id: &Uuid) -> Option<SessionClaims> {
        let entry = self.lock().remove(id)?;
        if entry.expires_at < Utc::now() {
            tracing::debug!(registry_id = %id, "Refresh entry expired before redemption");
            return None;
        }
        Some(entry.claims)
    }

    /// Evict expired entries that were never redeemed. Returns the
    /// number of entries removed.
    pub fn sweep_expired(&self) -> usize {
        let now = Utc::now();
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at >= now);
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl Default for RefreshRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims() -> SessionClaims {
        SessionClaims {
            user_id: Uuid::new_v4(),
            phone: "555-0100".to_string(),
        }
    }

    #[test]
    fn take_returns_registered_claims_once() {
        let registry = RefreshRegistry::new();
        let id = Uuid::new_v4();
        let session = claims();

        registry.insert(id, session.clone(), 3600);

        assert_eq!(registry.take(&id), Some(session));
        // Second redemption of the same identifier must fail.
        assert_eq!(registry.take(&id), None);
    }

    #[test]
    fn unknown_identifier_yields_none() {
        let registry = RefreshRegistry::new();
        assert_eq!(registry.take(&Uuid::new_v4()), None);
    }

    #[test]
    fn expired_entry_is_not_redeemable() {
        let registry = RefreshRegistry::new();
        let id = Uuid::new_v4();

        registry.insert(id, claims(), -1);

        assert_eq!(registry.take(&id), None);
        assert!(registry.is_empty());
    }

    #[test]
    fn sweep_removes_only_expired_entries() {
        let registry = RefreshRegistry::new();
        let live = Uuid::new_v4();
        registry.insert(live, claims(), 3600);
        registry.insert(Uuid::new_v4(), claims(), -1);
        registry.insert(Uuid::new_v4(), claims(), -1);

        assert_eq!(registry.sweep_expired(), 2);
        assert_eq!(registry.len(), 1);
        assert!(registry.take(&live).is_some());
    }

    #[test]
    fn concurrent_redeemers_observe_the_entry_at_most_once() {
        use std::sync::Arc;

        let registry = Arc::new(RefreshRegistry::new());
        let id = Uuid::new_v4();
        registry.insert(id, claims(), 3600);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || registry.take(&id).is_some())
            })
            .collect();

        let wins = handles
            .into_iter()
            .map(|h| h.join().unwrap_or(false))
            .filter(|won| *won)
            .count();
        assert_eq!(wins, 1);
    }
}
