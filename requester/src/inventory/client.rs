use crate::error::RequesterError;
use crate::inventory::io::{PaginatedResponse, Property, PropertyId, PropertyPayload};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

/// Do not wrap `InventoryRequester` in a [`Rc`] or [`Arc`]
/// because [`reqwest::Client`] uses an [`Arc`] internally.
#[derive(Clone)]
pub struct InventoryRequester {
    http: reqwest::Client,
    base_url: String,
}

#[async_trait]
pub trait InventoryRequesterExt {
    /// `query` is an already serialized query string, without the leading `?`.
    async fn fetch_properties(
        &self,
        query: &str,
    ) -> Result<PaginatedResponse<Property>, RequesterError>;

    async fn fetch_property(&self, id: PropertyId) -> Result<Property, RequesterError>;

    async fn create_property(&self, payload: &PropertyPayload)
    -> Result<Property, RequesterError>;

    async fn update_property(
        &self,
        id: PropertyId,
        payload: &PropertyPayload,
    ) -> Result<Property, RequesterError>;

    async fn delete_property(&self, id: PropertyId) -> Result<(), RequesterError>;
}

impl InventoryRequester {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> Result<Url, RequesterError> {
        Ok(Url::parse(&format!("{}{path}", self.base_url))?)
    }

    async fn execute(&self, request: RequestBuilder) -> Result<Response, RequesterError> {
        let response = request
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RequesterError::status(status.as_u16(), body));
        }
        Ok(response)
    }

    /// `None` for `204 No Content`, the parsed body otherwise.
    async fn parse_body<T: DeserializeOwned>(
        response: Response,
    ) -> Result<Option<T>, RequesterError> {
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        let bytes = response.bytes().await?;
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    async fn request_body<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, RequesterError> {
        let response = self.execute(request).await?;
        Self::parse_body(response)
            .await?
            .ok_or(RequesterError::EmptyBody)
    }
}

#[async_trait]
impl InventoryRequesterExt for InventoryRequester {
    #[instrument(skip(self))]
    async fn fetch_properties(
        &self,
        query: &str,
    ) -> Result<PaginatedResponse<Property>, RequesterError> {
        let path = if query.is_empty() {
            "/api/properties".to_string()
        } else {
            format!("/api/properties?{query}")
        };
        let response: PaginatedResponse<Property> =
            self.request_body(self.http.get(self.url(&path)?)).await?;
        debug!(page = ?response, "fetched properties");
        Ok(response)
    }

    #[instrument(skip(self))]
    async fn fetch_property(&self, id: PropertyId) -> Result<Property, RequesterError> {
        let url = self.url(&format!("/api/properties/{id}"))?;
        self.request_body(self.http.get(url)).await
    }

    #[instrument(skip_all)]
    async fn create_property(
        &self,
        payload: &PropertyPayload,
    ) -> Result<Property, RequesterError> {
        let url = self.url("/api/properties")?;
        self.request_body(self.http.post(url).body(serde_json::to_vec(payload)?))
            .await
    }

    #[instrument(skip(self, payload))]
    async fn update_property(
        &self,
        id: PropertyId,
        payload: &PropertyPayload,
    ) -> Result<Property, RequesterError> {
        let url = self.url(&format!("/api/properties/{id}"))?;
        self.request_body(self.http.put(url).body(serde_json::to_vec(payload)?))
            .await
    }

    #[instrument(skip(self))]
    async fn delete_property(&self, id: PropertyId) -> Result<(), RequesterError> {
        let url = self.url(&format!("/api/properties/{id}"))?;
        self.execute(self.http.delete(url)).await?;
        Ok(())
    }
}
