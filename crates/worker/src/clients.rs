//! Open client registry.
//!
//! A client is an open page of the app. Activation claims every open
//! client at once so interception applies immediately, without a reload;
//! clients that open after the claim are controlled from the start.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Client ID counter.
static NEXT_CLIENT_ID: AtomicU64 = AtomicU64::new(1);

/// Identifier for one open client page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientId(u64);

impl ClientId {
    fn next() -> Self {
        Self(NEXT_CLIENT_ID.fetch_add(1, Ordering::SeqCst))
    }

    /// Get raw value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Registry of open clients and their controlled status.
#[derive(Debug, Default)]
pub struct ClientRegistry {
    clients: RwLock<HashMap<ClientId, bool>>,
    claimed: AtomicBool,
}

impl ClientRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self { clients: RwLock::new(HashMap::new()), claimed: AtomicBool::new(false) }
    }

    /// Register an open client.
    ///
    /// Before the claim, a new client is uncontrolled: its requests pass
    /// through untouched. After the claim, new clients start controlled.
    pub fn register(&self) -> ClientId {
        let id = ClientId::next();
        let controlled = self.claimed.load(Ordering::SeqCst);
        self.clients
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(id, controlled);
        id
    }

    /// Claim every open client at once.
    pub fn claim(&self) {
        self.claimed.store(true, Ordering::SeqCst);
        let mut clients = self.clients.write().unwrap_or_else(|e| e.into_inner());
        for controlled in clients.values_mut() {
            *controlled = true;
        }
    }

    /// Check whether a client is controlled. Unknown clients are not.
    pub fn is_controlled(&self, id: ClientId) -> bool {
        self.clients
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&id)
            .copied()
            .unwrap_or(false)
    }

    /// Number of controlled clients.
    pub fn controlled_count(&self) -> usize {
        self.clients
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .filter(|controlled| **controlled)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_before_claim_uncontrolled() {
        let registry = ClientRegistry::new();
        let id = registry.register();
        assert!(!registry.is_controlled(id));
        assert_eq!(registry.controlled_count(), 0);
    }

    #[test]
    fn test_claim_controls_all_open_clients() {
        let registry = ClientRegistry::new();
        let first = registry.register();
        let second = registry.register();

        registry.claim();

        assert!(registry.is_controlled(first));
        assert!(registry.is_controlled(second));
        assert_eq!(registry.controlled_count(), 2);
    }

    #[test]
    fn test_register_after_claim_controlled() {
        let registry = ClientRegistry::new();
        registry.claim();
        let id = registry.register();
        assert!(registry.is_controlled(id));
    }

    #[test]
    fn test_unknown_client_not_controlled() {
        let registry = ClientRegistry::new();
        let other = ClientRegistry::new();
        let id = other.register();
        assert!(!registry.is_controlled(id));
    }

    #[test]
    fn test_client_ids_unique() {
        let registry = ClientRegistry::new();
        let first = registry.register();
        let second = registry.register();
        assert_ne!(first, second);
    }
}
