mod basic;
mod client;
pub mod auth;

pub use basic::BasicClient;
pub use client::HttpClient;

use bytes::Bytes;
use reqwest::Url;
use tracing::debug;

use crate::error::FetchError;

/// Issues a GET for `url` and returns the raw body.
///
/// Any non-success status is an error; the body of a failed request is not
/// inspected.
pub async fn fetch_bytes<C: HttpClient>(client: &C, url: &Url) -> Result<Bytes, FetchError> {
    let req = reqwest::Request::new(reqwest::Method::GET, url.clone());

    let resp = client.execute(req).await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(FetchError::Status(status));
    }

    let body = resp.bytes().await?;
    debug!(bytes = body.len(), "Feed bytes received");
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct Canned {
        status: u16,
        body: &'static [u8],
    }

    #[async_trait]
    impl HttpClient for Canned {
        async fn execute(&self, _req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
            let resp = http::Response::builder()
                .status(self.status)
                .body(self.body.to_vec())
                .unwrap();
            Ok(resp.into())
        }
    }

    fn url() -> Url {
        "https://example.com/nyct%2Fgtfs-g".parse().unwrap()
    }

    #[tokio::test]
    async fn test_fetch_bytes_returns_body() {
        let client = Canned {
            status: 200,
            body: b"\x0a\x00",
        };
        let body = fetch_bytes(&client, &url()).await.unwrap();
        assert_eq!(body.as_ref(), b"\x0a\x00");
    }

    #[tokio::test]
    async fn test_fetch_bytes_rejects_error_status() {
        let client = Canned {
            status: 503,
            body: b"maintenance",
        };
        let err = fetch_bytes(&client, &url()).await.unwrap_err();
        assert!(matches!(err, FetchError::Status(s) if s.as_u16() == 503));
    }
}
