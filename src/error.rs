use thiserror::Error;

/// The payload could not be turned into the canonical model.
///
/// Required fields are guaranteed by the upstream schema, so a missing one
/// means the feed changed shape underneath us.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Protobuf decode error: {0}")]
    Protobuf(#[from] prost::DecodeError),
    #[error("Required field `{0}` missing")]
    MissingField(&'static str),
    #[error("Timestamp {0} out of range")]
    TimestampOutOfRange(i64),
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Feed returned HTTP {0}")]
    Status(reqwest::StatusCode),
    #[error("Invalid auth header: {0}")]
    InvalidHeader(String),
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// A configured feed failed while building the system snapshot.
#[derive(Debug, Error)]
#[error("Feed `{feed}` failed: {error}")]
pub struct SourceError {
    pub feed: String,
    pub error: FetchError,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("State lock poisoned")]
    Poisoned,
}

/// Anything that aborts a single tick. State is never advanced when one occurs.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
