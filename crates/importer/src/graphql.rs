//! GraphQL transport
//!
//! A single POST endpoint carries every query and mutation. This layer knows
//! nothing about the catalog; it sends a document with variables and hands
//! back the `{data, errors}` envelope for the gateways to interpret. No
//! automatic retries: a failed call surfaces as-is.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const API_KEY_HEADER: &str = "X-API-KEY";

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {status}: {body}")]
    Status { status: StatusCode, body: String },
}

/// The standard GraphQL response envelope. `errors` is kept raw so failures
/// can carry the server's payload verbatim.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct GraphQlResponse<T> {
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Option<serde_json::Value>,
}

#[derive(Serialize)]
struct Request<'a, V: Serialize + ?Sized> {
    query: &'a str,
    variables: &'a V,
}

/// Client for the platform's GraphQL API.
#[derive(Debug, Clone)]
pub struct GraphQlClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GraphQlClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Execute one GraphQL document. Non-2xx responses and network failures
    /// are transport errors; a 2xx with an `errors` payload is returned
    /// as-is for the caller to classify.
    pub async fn execute<V, T>(
        &self,
        query: &str,
        variables: &V,
    ) -> Result<GraphQlResponse<T>, TransportError>
    where
        V: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .http
            .post(&self.base_url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&Request { query, variables })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status { status, body });
        }

        Ok(response.json().await?)
    }
}
