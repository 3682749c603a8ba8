//! Per-session leases.
//!
//! Serializes "accept message → classify stage → dispatch respondents →
//! detect consensus" for one negotiation while leaving other negotiations
//! free to run concurrently.

use accord_domain::NegotiationId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Registry of one async mutex per negotiation
#[derive(Default)]
pub struct SessionLeases {
    locks: Mutex<HashMap<NegotiationId, Arc<AsyncMutex<()>>>>,
}

/// Held for the duration of one message-processing pass; released on drop
pub struct SessionLease {
    _guard: OwnedMutexGuard<()>,
}

impl SessionLeases {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for and take the lease of `negotiation_id`.
    pub async fn acquire(&self, negotiation_id: &NegotiationId) -> SessionLease {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            // Entries nobody holds or waits on can go
            locks.retain(|id, lock| id == negotiation_id || Arc::strong_count(lock) > 1);
            Arc::clone(locks.entry(negotiation_id.clone()).or_default())
        };
        SessionLease {
            _guard: lock.lock_owned().await,
        }
    }

    /// Number of tracked sessions
    pub fn tracked(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
