//! Durable home of the most recent reconciled snapshot.

use async_trait::async_trait;
use std::sync::{Arc, RwLock};
use tracing::debug;

use crate::error::StoreError;
use crate::model::Snapshot;

#[async_trait]
pub trait StateStore: Send + Sync {
    /// The last recorded snapshot, or an empty one before the first write.
    async fn prior_state(&self) -> Result<Arc<Snapshot>, StoreError>;

    /// Replaces the stored snapshot as a single step.
    async fn record_state(&self, state: Snapshot) -> Result<(), StoreError>;
}

/// Process-local store. Readers share the current snapshot behind an `Arc`;
/// a write swaps the pointer, so nobody observes a half-written state.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<Arc<Snapshot>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StateStore for MemoryStore {
    async fn prior_state(&self) -> Result<Arc<Snapshot>, StoreError> {
        let state = self.state.read().map_err(|_| StoreError::Poisoned)?;
        Ok(Arc::clone(&state))
    }

    async fn record_state(&self, state: Snapshot) -> Result<(), StoreError> {
        debug!(trips = state.len(), "Persisting state in memory");
        let next = Arc::new(state);
        let mut guard = self.state.write().map_err(|_| StoreError::Poisoned)?;
        *guard = next;
        Ok(())
    }
}
