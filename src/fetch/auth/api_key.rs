use crate::error::FetchError;
use crate::fetch::client::HttpClient;
use async_trait::async_trait;
use reqwest::header::{HeaderName, HeaderValue};

/// An [`HttpClient`] wrapper that injects an API key as an HTTP header.
///
/// The header name and value are validated when the wrapper is built, so a
/// malformed key is reported at startup instead of on every request.
pub struct ApiKey<C> {
    inner: C,
    header_name: HeaderName,
    key: HeaderValue,
}

impl<C> ApiKey<C> {
    pub fn new(inner: C, header_name: &str, key: &str) -> Result<Self, FetchError> {
        let header_name = HeaderName::from_bytes(header_name.as_bytes())
            .map_err(|e| FetchError::InvalidHeader(format!("{header_name}: {e}")))?;
        let mut key = HeaderValue::from_str(key)
            .map_err(|e| FetchError::InvalidHeader(format!("{header_name} value: {e}")))?;
        key.set_sensitive(true);
        Ok(Self {
            inner,
            header_name,
            key,
        })
    }

    /// The `x-api-key` header expected by the MTA developer API.
    pub fn mta(inner: C, key: &str) -> Result<Self, FetchError> {
        Self::new(inner, "x-api-key", key)
    }
}

#[async_trait]
impl<C: HttpClient> HttpClient for ApiKey<C> {
    async fn execute(&self, mut req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        req.headers_mut()
            .insert(self.header_name.clone(), self.key.clone());
        self.inner.execute(req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records the headers of every request and answers 200 with an empty body.
    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<reqwest::header::HeaderMap>>,
    }

    #[async_trait]
    impl HttpClient for Recorder {
        async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
            self.seen.lock().unwrap().push(req.headers().clone());
            Ok(http::Response::new(Vec::<u8>::new()).into())
        }
    }

    #[tokio::test]
    async fn test_mta_key_is_sent_as_header() {
        let client = ApiKey::mta(Recorder::default(), "secret").unwrap();
        let req = reqwest::Request::new(
            reqwest::Method::GET,
            "https://example.com/feed".parse().unwrap(),
        );

        client.execute(req).await.unwrap();

        let seen = client.inner.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].get("x-api-key").unwrap(), "secret");
        assert!(seen[0].get("x-api-key").unwrap().is_sensitive());
    }

    #[test]
    fn test_invalid_key_is_rejected_up_front() {
        let result = ApiKey::mta(Recorder::default(), "bad\nkey");
        assert!(matches!(result, Err(FetchError::InvalidHeader(_))));
    }

    #[test]
    fn test_invalid_header_name_is_rejected() {
        let result = ApiKey::new(Recorder::default(), "not a header", "k");
        assert!(matches!(result, Err(FetchError::InvalidHeader(_))));
    }
}
