//! A single upstream feed endpoint.

use async_trait::async_trait;
use reqwest::Url;
use tracing::debug;

use crate::error::FetchError;
use crate::fetch::{HttpClient, fetch_bytes};
use crate::model::FeedStatus;
use crate::parser::{decode_status, parse_feed};

/// One source of trip updates, fetched and decoded in a single call.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Short name used in logs and errors.
    fn name(&self) -> &str;

    async fn fetch(&self) -> Result<FeedStatus, FetchError>;
}

/// A live GTFS-RT endpoint polled over HTTP.
pub struct LiveFeed<C> {
    name: String,
    endpoint: Url,
    client: C,
}

impl<C: HttpClient> LiveFeed<C> {
    pub fn new(name: impl Into<String>, endpoint: Url, client: C) -> Self {
        Self {
            name: name.into(),
            endpoint,
            client,
        }
    }
}

#[async_trait]
impl<C: HttpClient> FeedSource for LiveFeed<C> {
    fn name(&self) -> &str {
        &self.name
    }

    #[tracing::instrument(skip(self), fields(feed = %self.name))]
    async fn fetch(&self) -> Result<FeedStatus, FetchError> {
        let bytes = fetch_bytes(&self.client, &self.endpoint).await?;
        let message = parse_feed(&bytes)?;
        debug!(entity_count = message.entity.len(), "Feed parsed successfully");
        Ok(decode_status(&message)?)
    }
}
