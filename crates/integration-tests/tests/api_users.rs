use axum::http::{Method, StatusCode};
use integration_tests::TestApp;

#[tokio::test]
async fn sync_creates_the_profile_once() {
    let app = TestApp::memory();
    let u1 = app.token("U1");

    let (status, _) = app.get("/api/users/me", &u1).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, first) = app.send(Method::POST, "/api/users/sync", Some(&u1), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["uid"], "U1");
    assert_eq!(first["email"], "u1@example.com");

    let (_, second) = app.send(Method::POST, "/api/users/sync", Some(&u1), None).await;
    assert_eq!(second["createdAt"], first["createdAt"]);

    let (status, me) = app.get("/api/users/me", &u1).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me, first);
}

#[tokio::test]
async fn profiles_are_per_identity() {
    let app = TestApp::memory();
    let u1 = app.token("U1");
    let u2 = app.token("U2");

    app.send(Method::POST, "/api/users/sync", Some(&u1), None).await;

    let (status, _) = app.get("/api/users/me", &u2).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn sync_requires_a_token() {
    let app = TestApp::memory();
    let (status, _) = app.send(Method::POST, "/api/users/sync", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
