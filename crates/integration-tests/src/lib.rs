//! Shared fixtures for the end-to-end tests: a fully wired router, real
//! bearer tokens and a small request helper.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::Duration;
use ori_api::{build_router, AppState};
use ori_auth_jwt::JwtIdentityProvider;
use ori_core::models::Identity;
use ori_core::services::{MediaService, UserService};
use ori_core::traits::{MediaRepo, UserRepo};
use ori_db_memory::{MemoryMediaRepo, MemoryUserRepo};
use ori_db_sqlite::SqliteStore;
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "integration-test-secret";

pub struct TestApp {
    pub router: Router,
    jwt: Arc<JwtIdentityProvider>,
}

impl TestApp {
    pub fn with_stores(media: Arc<dyn MediaRepo>, users: Arc<dyn UserRepo>) -> Self {
        let jwt = Arc::new(JwtIdentityProvider::new(
            &SecretString::from(TEST_SECRET),
            None,
            None,
        ));
        let state = AppState {
            media: MediaService::new(media),
            users: UserService::new(users),
            identity: jwt.clone(),
        };
        Self {
            router: build_router(state, &[]),
            jwt,
        }
    }

    pub fn memory() -> Self {
        Self::with_stores(Arc::new(MemoryMediaRepo::new()), Arc::new(MemoryUserRepo::new()))
    }

    pub async fn sqlite() -> Self {
        let store = SqliteStore::new("sqlite::memory:")
            .await
            .expect("in-memory sqlite store");
        Self::with_stores(Arc::new(store.clone()), Arc::new(store))
    }

    pub fn token(&self, uid: &str) -> String {
        let identity = Identity {
            uid: uid.into(),
            email: Some(format!("{}@example.com", uid.to_lowercase())),
            name: Some(uid.into()),
        };
        self.jwt.issue(&identity, Duration::hours(1)).expect("token")
    }

    /// Sends one request through the router and returns status plus JSON
    /// body (`Null` when the body is empty).
    pub async fn send(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        let response = self.router.clone().oneshot(request).await.expect("router is infallible");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json body")
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, Some(token), None).await
    }

    /// Creates an item and returns its id, asserting a 201.
    pub async fn create(&self, token: &str, body: Value) -> String {
        let (status, json) = self.post("/api/media", token, body).await;
        assert_eq!(status, StatusCode::CREATED, "create failed: {json}");
        json["id"].as_str().expect("id").to_string()
    }
}

pub fn titles(list: &Value) -> Vec<&str> {
    list.as_array()
        .expect("array")
        .iter()
        .map(|item| item["title"].as_str().unwrap_or_default())
        .collect()
}
