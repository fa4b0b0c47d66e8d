//! The HTTP flows again, this time persisted through SQLite.

use axum::http::{Method, StatusCode};
use integration_tests::{titles, TestApp};
use serde_json::json;

#[tokio::test]
async fn full_lifecycle_on_sqlite() {
    let app = TestApp::sqlite().await;
    let u1 = app.token("U1");
    let u2 = app.token("U2");

    let id = app
        .create(
            &u1,
            json!({
                "title": "Elden Ring",
                "mediaType": "game",
                "platforms": ["PC", "PS5"],
                "hoursPlayed": 120.5,
                "externalIds": { "igdb": "119133" },
                "dateConsumed": "2024-03-01"
            }),
        )
        .await;
    app.create(&u2, json!({ "title": "Dune", "mediaType": "book" })).await;

    let (_, list) = app.get("/api/media/me", &u1).await;
    assert_eq!(titles(&list), ["Elden Ring"]);
    assert_eq!(list[0]["platforms"], json!(["PC", "PS5"]));
    assert_eq!(list[0]["hoursPlayed"], 120.5);
    assert_eq!(list[0]["externalIds"]["igdb"], "119133");

    let (status, _) = app.put(&format!("/api/media/{id}"), &u2, json!({ "title": "mine" })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, updated) = app
        .put(&format!("/api/media/{id}"), &u1, json!({ "status": "completed", "hoursPlayed": 140 }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "completed");

    let (_, list) = app.get("/api/media/me?status=completed&mediaType=game", &u1).await;
    assert_eq!(titles(&list), ["Elden Ring"]);
    assert_eq!(list[0]["hoursPlayed"], json!(140));

    let (_, toggled) = app.put(&format!("/api/media/{id}/favorite"), &u1, json!({ "favorite": true })).await;
    assert_eq!(toggled["favorite"], true);
    let (_, list) = app.get("/api/media/me?favorite=true", &u1).await;
    assert_eq!(titles(&list), ["Elden Ring"]);

    let (status, _) = app.delete(&format!("/api/media/{id}"), &u1).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.delete(&format!("/api/media/{id}"), &u1).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn user_sync_on_sqlite() {
    let app = TestApp::sqlite().await;
    let u1 = app.token("U1");

    let (_, first) = app.send(Method::POST, "/api/users/sync", Some(&u1), None).await;
    let (_, again) = app.send(Method::POST, "/api/users/sync", Some(&u1), None).await;
    assert_eq!(first, again);

    let (status, me) = app.get("/api/users/me", &u1).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["displayName"], "U1");
}
