//! One polling tick: read prior state, observe, reconcile, persist.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::ProcessError;
use crate::model::Segment;
use crate::reconcile::reconcile;
use crate::store::StateStore;
use crate::system::StateOracle;

/// Source of "now" for the disappearance window.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

#[derive(Debug, Default)]
pub struct StateUpdateResults {
    pub completed_segments: Vec<Segment>,
}

/// Drives reconciliation between an oracle and a store.
///
/// Ticks must not overlap against the same store; callers run them one after
/// another (the watch loop does).
pub struct StateProcessor<O, S> {
    oracle: O,
    store: S,
    clock: Clock,
}

impl<O: StateOracle, S: StateStore> StateProcessor<O, S> {
    pub fn new(oracle: O, store: S) -> Self {
        Self {
            oracle,
            store,
            clock: Arc::new(Utc::now),
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Runs one tick. On error nothing is recorded, so the next tick retries
    /// from the last good state.
    #[tracing::instrument(skip(self))]
    pub async fn process_updates(&self) -> Result<StateUpdateResults, ProcessError> {
        debug!("Processing updates");
        let prior = self.store.prior_state().await?;
        let current = self.oracle.current_state().await?;
        let now = (self.clock)();

        let result = reconcile(&prior, &current, now);
        info!(
            prior_trips = prior.len(),
            observed_trips = current.len(),
            retained_trips = result.snapshot.len(),
            completed = result.completed.len(),
            "Reconciled"
        );

        self.store.record_state(result.snapshot).await?;

        Ok(StateUpdateResults {
            completed_segments: result.completed,
        })
    }
}
