//! Typed wrapper over the REST endpoints.

use std::collections::BTreeMap;

use ori_core::models::{MediaItem, UserProfile};
use ori_core::stats::LibraryStats;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response, with the server's message when it sent one.
    #[error("{status}: {message}")]
    Api {
        status: u16,
        message: String,
        errors: Option<BTreeMap<String, String>>,
    },
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Http(err) => err.status().map(|s| s.as_u16()),
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
    errors: Option<BTreeMap<String, String>>,
}

/// Filters and ordering for [`ApiClient::list`].
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favorite: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
}

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    token: String,
}

impl ApiClient {
    /// `base_url` without a trailing slash, e.g. `http://localhost:5000`.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .bearer_auth(&self.token)
    }

    async fn parse<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let body = response.json::<ErrorBody>().await.ok();
        let (message, errors) = match body {
            Some(body) => (body.message.or(body.error), body.errors),
            None => (None, None),
        };
        let message = message.unwrap_or_else(|| format!("request failed with status {}", status.as_u16()));
        warn!(status = status.as_u16(), %message, "api request failed");

        Err(ClientError::Api {
            status: status.as_u16(),
            message,
            errors,
        })
    }

    pub async fn list(&self, query: &ListQuery) -> Result<Vec<MediaItem>, ClientError> {
        let response = self.request(Method::GET, "/api/media/me").query(query).send().await?;
        Self::parse(response).await
    }

    pub async fn stats(&self, query: &ListQuery) -> Result<LibraryStats, ClientError> {
        let response = self.request(Method::GET, "/api/media/me/stats").query(query).send().await?;
        Self::parse(response).await
    }

    pub async fn create(&self, fields: &Value) -> Result<MediaItem, ClientError> {
        let response = self.request(Method::POST, "/api/media").json(fields).send().await?;
        Self::parse(response).await
    }

    pub async fn update(&self, id: Uuid, fields: &Value) -> Result<MediaItem, ClientError> {
        let response = self
            .request(Method::PUT, &format!("/api/media/{id}"))
            .json(fields)
            .send()
            .await?;
        Self::parse(response).await
    }

    pub async fn set_favorite(&self, id: Uuid, favorite: bool) -> Result<MediaItem, ClientError> {
        let response = self
            .request(Method::PUT, &format!("/api/media/{id}/favorite"))
            .json(&json!({ "favorite": favorite }))
            .send()
            .await?;
        Self::parse(response).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ClientError> {
        let response = self.request(Method::DELETE, &format!("/api/media/{id}")).send().await?;
        Self::parse::<Value>(response).await.map(|_| ())
    }

    pub async fn sync_user(&self) -> Result<UserProfile, ClientError> {
        let response = self.request(Method::POST, "/api/users/sync").send().await?;
        Self::parse(response).await
    }

    pub async fn me(&self) -> Result<UserProfile, ClientError> {
        let response = self.request(Method::GET, "/api/users/me").send().await?;
        Self::parse(response).await
    }
}
