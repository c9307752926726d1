//! Typed client for the items REST backend.
//!
//! Covers the item CRUD endpoints plus the aggregate stats and health
//! endpoints. Failures are reduced to a small error enum; callers render
//! them as a single generic error line.

use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::types::{Health, Item, ItemCreate, Stats};

/// Result type for REST API operations
pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("server returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("response parsing failed: {0}")]
    Parse(String),
}

pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap();

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// GET /items
    pub async fn list_items(&self) -> ApiResult<Vec<Item>> {
        self.get_json("/items").await
    }

    /// GET /items/{id}
    pub async fn get_item(&self, id: i64) -> ApiResult<Item> {
        self.get_json(&format!("/items/{}", id)).await
    }

    /// POST /items
    pub async fn create_item(&self, item: &ItemCreate) -> ApiResult<Item> {
        let response = self
            .client
            .post(format!("{}/items", self.base_url))
            .json(item)
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        Self::decode(response).await
    }

    /// PUT /items/{id}
    pub async fn update_item(&self, id: i64, item: &ItemCreate) -> ApiResult<Item> {
        let response = self
            .client
            .put(format!("{}/items/{}", self.base_url, id))
            .json(item)
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        Self::decode(response).await
    }

    /// DELETE /items/{id}
    ///
    /// The backend echoes the deleted item in the body; nothing here needs it.
    pub async fn delete_item(&self, id: i64) -> ApiResult<()> {
        let response = self
            .client
            .delete(format!("{}/items/{}", self.base_url, id))
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ApiError::Status(response.status()));
        }
        Ok(())
    }

    /// GET /stats
    pub async fn stats(&self) -> ApiResult<Stats> {
        self.get_json("/stats").await
    }

    /// GET /health
    pub async fn health(&self) -> ApiResult<Health> {
        self.get_json("/health").await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> ApiResult<T> {
        if !response.status().is_success() {
            return Err(ApiError::Status(response.status()));
        }

        response
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))
    }
}
