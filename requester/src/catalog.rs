use crate::error::RequesterError;
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use tracing::{info, instrument};

/// Read-only client for the remote city catalog.
#[derive(Clone)]
pub struct CatalogRequester {
    http: reqwest::Client,
    url: String,
}

#[async_trait]
pub trait CatalogRequesterExt {
    /// Returns the raw catalog payload. Shape validation is left to the
    /// caller, which decides what a usable entry is.
    async fn fetch_cities(&self) -> Result<serde_json::Value, RequesterError>;
}

impl CatalogRequester {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), url)
    }

    pub fn with_client(http: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }
}

#[async_trait]
impl CatalogRequesterExt for CatalogRequester {
    #[instrument(skip_all)]
    async fn fetch_cities(&self) -> Result<serde_json::Value, RequesterError> {
        let response = self
            .http
            .get(&self.url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RequesterError::status(status.as_u16(), body));
        }

        let bytes = response.bytes().await?;
        info!(n_bytes = bytes.len(), url = %self.url, "fetched city catalog");
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_fetch_cities_sends_accept_header() {
        let mock_srv = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/City/"))
            .and(header("accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": 1, "name": "Bogotá" },
                { "id": 2, "name": "Medellín" }
            ])))
            .expect(1)
            .mount(&mock_srv)
            .await;

        let requester = CatalogRequester::new(format!("{}/api/v1/City/", mock_srv.uri()));
        let payload = requester.fetch_cities().await.unwrap();

        assert_eq!(payload.as_array().map(Vec::len), Some(2));
        assert_eq!(payload[1]["name"], "Medellín");
    }

    #[tokio::test]
    async fn test_fetch_cities_non_success() {
        let mock_srv = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("catalog offline"))
            .mount(&mock_srv)
            .await;

        let requester = CatalogRequester::new(mock_srv.uri());
        let err = requester.fetch_cities().await.unwrap_err();

        assert!(matches!(err, RequesterError::Status { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_fetch_cities_invalid_json() {
        let mock_srv = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&mock_srv)
            .await;

        let requester = CatalogRequester::new(mock_srv.uri());
        let err = requester.fetch_cities().await.unwrap_err();

        assert!(matches!(err, RequesterError::Json(_)));
    }
}
