//! Store outages surface as a bare 500 without leaking the cause.

use std::sync::Arc;

use axum::http::StatusCode;
use integration_tests::TestApp;
use ori_core::traits::{MockMediaRepo, MockUserRepo};
use serde_json::json;

fn failing_app() -> TestApp {
    let mut media = MockMediaRepo::new();
    media
        .expect_insert()
        .returning(|_| Err(anyhow::anyhow!("disk full at /var/lib/oriana")));
    media
        .expect_list_by_owner()
        .returning(|_, _| Err(anyhow::anyhow!("connection reset")));

    let mut users = MockUserRepo::new();
    users.expect_find().returning(|_| Err(anyhow::anyhow!("connection reset")));

    TestApp::with_stores(Arc::new(media), Arc::new(users))
}

#[tokio::test]
async fn store_errors_become_internal_server_errors() {
    let app = failing_app();
    let u1 = app.token("U1");

    let (status, body) = app.post("/api/media", &u1, json!({ "title": "Dune", "mediaType": "book" })).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "message": "Internal server error" }));

    let (status, body) = app.get("/api/media/me", &u1).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!body.to_string().contains("connection reset"));

    let (status, _) = app.get("/api/users/me", &u1).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}
