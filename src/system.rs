//! Combines every configured feed into one system-wide snapshot.

use async_trait::async_trait;
use futures::future::try_join_all;
use tracing::{debug, warn};

use crate::error::SourceError;
use crate::feed::FeedSource;
use crate::model::{FeedStatus, Snapshot};

/// Supplies the current observed state of the whole system.
#[async_trait]
pub trait StateOracle: Send + Sync {
    async fn current_state(&self) -> Result<Snapshot, SourceError>;
}

/// All subway divisions polled together.
pub struct TransitSystem {
    feeds: Vec<Box<dyn FeedSource>>,
}

impl TransitSystem {
    pub fn new(feeds: Vec<Box<dyn FeedSource>>) -> Self {
        Self { feeds }
    }

    /// Fetches every feed concurrently. The first failure aborts the whole
    /// call; no partial result is returned.
    pub async fn fetch_all(&self) -> Result<Vec<FeedStatus>, SourceError> {
        try_join_all(self.feeds.iter().map(|feed| async move {
            feed.fetch().await.map_err(|error| SourceError {
                feed: feed.name().to_string(),
                error,
            })
        }))
        .await
    }
}

#[async_trait]
impl StateOracle for TransitSystem {
    #[tracing::instrument(skip(self), fields(feeds = self.feeds.len()))]
    async fn current_state(&self) -> Result<Snapshot, SourceError> {
        let statuses = self.fetch_all().await?;

        let mut snapshot = Snapshot::new();
        let mut unassigned = 0usize;
        for status in statuses {
            for trip in status.trips {
                // trips still waiting at a terminal have no physical train yet
                if !trip.is_assigned {
                    unassigned += 1;
                    continue;
                }
                if snapshot.contains(&trip.trip_id) {
                    warn!(trip_id = %trip.trip_id, "Trip reported by more than one feed, keeping first");
                    continue;
                }
                snapshot.insert(trip);
            }
        }

        debug!(trips = snapshot.len(), unassigned, "System state assembled");
        Ok(snapshot)
    }
}
