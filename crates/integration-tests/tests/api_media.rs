use axum::http::{Method, StatusCode};
use integration_tests::{titles, TestApp};
use serde_json::json;

#[tokio::test]
async fn foreign_update_is_forbidden_and_leaves_item_untouched() {
    let app = TestApp::memory();
    let u1 = app.token("U1");
    let u2 = app.token("U2");

    let (status, created) = app
        .post("/api/media", &u1, json!({ "title": "Dune", "mediaType": "book", "authors": ["Frank Herbert"] }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["owner"], "U1");
    assert_eq!(created["favorite"], false);
    assert_eq!(created["dateLogged"], created["createdAt"]);
    let id = created["id"].as_str().unwrap();

    let (status, body) = app.put(&format!("/api/media/{id}"), &u2, json!({ "title": "Stolen" })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["message"].as_str().unwrap().contains("not authorized"));

    let (status, _) = app
        .put(&format!("/api/media/{id}"), &u2, json!({ "title": "Hacked", "rating": 9 }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, list) = app.get("/api/media/me", &u1).await;
    assert_eq!(titles(&list), ["Dune"]);
    assert_eq!(list[0]["authors"], json!(["Frank Herbert"]));
}

#[tokio::test]
async fn invalid_body_on_missing_item_is_not_found() {
    let app = TestApp::memory();
    let u1 = app.token("U1");
    let missing = uuid::Uuid::now_v7();

    let (status, _) = app.put(&format!("/api/media/{missing}"), &u1, json!({ "rating": 9 })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .put(&format!("/api/media/{missing}/favorite"), &u1, json!({ "favorite": "yes" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn created_item_echoes_allow_listed_fields_exactly() {
    let app = TestApp::memory();
    let u1 = app.token("U1");
    let input = json!({
        "title": "Hades",
        "mediaType": "game",
        "rating": 4,
        "hoursPlayed": 61,
        "platforms": ["PC", "Switch"],
        "gamePublisher": "Supergiant",
        "tags": ["roguelike"],
        "externalIds": { "igdb": "113112" },
        "status": "completed",
        "dateConsumed": "2024-03-01T00:00:00Z"
    });

    let (status, created) = app.post("/api/media", &u1, input.clone()).await;
    assert_eq!(status, StatusCode::CREATED);
    for (key, value) in input.as_object().unwrap() {
        assert_eq!(&created[key], value, "field {key}");
    }

    let (_, list) = app.get("/api/media/me", &u1).await;
    for (key, value) in input.as_object().unwrap() {
        assert_eq!(&list[0][key], value, "listed field {key}");
    }
}

#[tokio::test]
async fn category_fields_are_sortable() {
    let app = TestApp::memory();
    let u1 = app.token("U1");
    app.create(&u1, json!({ "title": "short", "mediaType": "game", "hoursPlayed": 2 })).await;
    app.create(&u1, json!({ "title": "long", "mediaType": "game", "hoursPlayed": 200 })).await;
    app.create(&u1, json!({ "title": "film", "mediaType": "movie" })).await;

    let (_, list) = app.get("/api/media/me?sortBy=-hoursPlayed", &u1).await;
    assert_eq!(titles(&list), ["long", "short", "film"]);
}

#[tokio::test]
async fn missing_or_bad_token_is_unauthorized() {
    let app = TestApp::memory();

    let (status, body) = app.send(Method::GET, "/api/media/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["message"].as_str().unwrap().contains("No token provided"));

    let (status, _) = app.get("/api/media/me", "not-a-jwt").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // auth runs before validation
    let (status, _) = app.send(Method::POST, "/api/media", None, Some(json!({}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn health_needs_no_token() {
    let app = TestApp::memory();
    let (status, body) = app.send(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn list_is_scoped_to_caller_and_filtered() {
    let app = TestApp::memory();
    let u1 = app.token("U1");
    let u2 = app.token("U2");

    app.create(&u1, json!({ "title": "Dune", "mediaType": "book", "favorite": true })).await;
    app.create(&u1, json!({ "title": "Alien", "mediaType": "movie", "status": "completed" })).await;
    app.create(&u2, json!({ "title": "Hades", "mediaType": "game" })).await;

    let (_, list) = app.get("/api/media/me?sortBy=title", &u1).await;
    assert_eq!(titles(&list), ["Alien", "Dune"]);

    let (_, list) = app.get("/api/media/me?mediaType=book", &u1).await;
    assert_eq!(titles(&list), ["Dune"]);

    let (_, list) = app.get("/api/media/me?favorite=true", &u1).await;
    assert_eq!(titles(&list), ["Dune"]);

    let (_, list) = app.get("/api/media/me?status=completed", &u1).await;
    assert_eq!(titles(&list), ["Alien"]);

    // unknown filter values are ignored
    let (status, list) = app.get("/api/media/me?mediaType=podcast&sortBy=title", &u1).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&list), ["Alien", "Dune"]);

    let (_, list) = app.get("/api/media/me", &u2).await;
    assert_eq!(titles(&list), ["Hades"]);
}

#[tokio::test]
async fn default_order_is_most_recently_consumed_first() {
    let app = TestApp::memory();
    let u1 = app.token("U1");

    app.create(&u1, json!({ "title": "old", "mediaType": "movie", "dateConsumed": "2023-05-01" })).await;
    app.create(&u1, json!({ "title": "undated", "mediaType": "movie" })).await;
    app.create(&u1, json!({ "title": "new", "mediaType": "movie", "dateConsumed": "2024-05-01T20:00:00Z" })).await;

    let (_, list) = app.get("/api/media/me", &u1).await;
    assert_eq!(titles(&list), ["new", "old", "undated"]);

    let (_, list) = app.get("/api/media/me?sortBy=-title", &u1).await;
    assert_eq!(titles(&list), ["undated", "old", "new"]);
}

#[tokio::test]
async fn delete_then_delete_again_is_not_found() {
    let app = TestApp::memory();
    let u1 = app.token("U1");
    let u2 = app.token("U2");
    let id = app.create(&u1, json!({ "title": "Dune", "mediaType": "book" })).await;

    let (status, _) = app.delete(&format!("/api/media/{id}"), &u2).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.delete(&format!("/api/media/{id}"), &u1).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Media item deleted successfully");

    let (status, _) = app.delete(&format!("/api/media/{id}"), &u1).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, list) = app.get("/api/media/me", &u1).await;
    assert_eq!(titles(&list), Vec::<&str>::new());
}

#[tokio::test]
async fn unknown_and_malformed_ids_are_not_found() {
    let app = TestApp::memory();
    let u1 = app.token("U1");

    let missing = uuid::Uuid::now_v7();
    let (status, _) = app.put(&format!("/api/media/{missing}"), &u1, json!({ "title": "x" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.put("/api/media/not-an-id/favorite", &u1, json!({ "favorite": true })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn favorite_toggle_touches_only_favorite() {
    let app = TestApp::memory();
    let u1 = app.token("U1");
    let (_, created) = app
        .post("/api/media", &u1, json!({ "title": "Dune", "mediaType": "book", "rating": 4.5, "notes": "spice" }))
        .await;
    let id = created["id"].as_str().unwrap();

    let (status, toggled) = app
        .put(&format!("/api/media/{id}/favorite"), &u1, json!({ "favorite": true, "title": "ignored" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(toggled["favorite"], true);
    assert_eq!(toggled["title"], "Dune");
    assert_eq!(toggled["rating"], 4.5);
    assert_eq!(toggled["notes"], "spice");
    assert_eq!(toggled["createdAt"], created["createdAt"]);

    let (status, body) = app.put(&format!("/api/media/{id}/favorite"), &u1, json!({ "favorite": "yes" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["favorite"].is_string());

    let u2 = app.token("U2");
    let (status, _) = app.put(&format!("/api/media/{id}/favorite"), &u2, json!({ "favorite": false })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn media_type_and_owner_cannot_change() {
    let app = TestApp::memory();
    let u1 = app.token("U1");
    let id = app.create(&u1, json!({ "title": "Dune", "mediaType": "book", "owner": "U9" })).await;

    let (status, updated) = app
        .put(
            &format!("/api/media/{id}"),
            &u1,
            json!({ "mediaType": "game", "owner": "U2", "id": "x", "title": "Dune Messiah", "pageCount": 256 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{updated}");
    assert_eq!(updated["mediaType"], "book");
    assert_eq!(updated["owner"], "U1");
    assert_eq!(updated["id"], id.as_str());
    assert_eq!(updated["title"], "Dune Messiah");
    assert_eq!(updated["pageCount"], 256);
}

#[tokio::test]
async fn update_can_clear_optional_fields() {
    let app = TestApp::memory();
    let u1 = app.token("U1");
    let id = app
        .create(&u1, json!({ "title": "Alien", "mediaType": "movie", "director": "Ridley Scott", "rating": 5 }))
        .await;

    let (status, updated) = app
        .put(&format!("/api/media/{id}"), &u1, json!({ "director": null, "rating": null }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(updated.get("director").map_or(true, |v| v.is_null()));
    assert!(updated.get("rating").map_or(true, |v| v.is_null()));

    let (status, body) = app.put(&format!("/api/media/{id}"), &u1, json!({ "title": "  " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("title"));
}

#[tokio::test]
async fn validation_failures_name_every_field() {
    let app = TestApp::memory();
    let u1 = app.token("U1");

    let (status, body) = app
        .post(
            "/api/media",
            &u1,
            json!({ "title": "Dune", "mediaType": "book", "rating": 7, "pageCount": -1, "tags": "scifi" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let errors = body["errors"].as_object().unwrap();
    assert!(errors.contains_key("rating"));
    assert!(errors.contains_key("pageCount"));
    assert!(errors.contains_key("tags"));

    let (status, body) = app.post("/api/media", &u1, json!({ "mediaType": "book" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("title"));

    let (status, body) = app.post("/api/media", &u1, json!({ "title": "X", "mediaType": "podcast" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("podcast"));

    let (status, body) = app
        .post("/api/media", &u1, json!({ "title": "X", "mediaType": "movie", "authors": ["a"] }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["authors"].is_string());

    let (_, list) = app.get("/api/media/me", &u1).await;
    assert_eq!(titles(&list), Vec::<&str>::new());
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let app = TestApp::memory();
    let u1 = app.token("U1");

    let request = axum::http::Request::builder()
        .method(Method::POST)
        .uri("/api/media")
        .header("authorization", format!("Bearer {u1}"))
        .header("content-type", "application/json")
        .body(axum::body::Body::from("{ not json"))
        .unwrap();
    let response = tower::ServiceExt::oneshot(app.router.clone(), request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn stats_cover_only_the_callers_items() {
    let app = TestApp::memory();
    let u1 = app.token("U1");
    let u2 = app.token("U2");
    let this_year = chrono::Utc::now().format("%Y-01-01").to_string();

    app.create(&u1, json!({ "title": "Dune", "mediaType": "book", "favorite": true, "dateConsumed": this_year })).await;
    app.create(&u1, json!({ "title": "Alien", "mediaType": "movie", "dateConsumed": "1999-06-01" })).await;
    app.create(&u2, json!({ "title": "Hades", "mediaType": "game" })).await;

    let (status, stats) = app.get("/api/media/me/stats", &u1).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["total"], 2);
    assert_eq!(stats["thisYear"], 1);
    assert_eq!(stats["favorites"], 1);
    assert_eq!(stats["byType"]["book"], 1);
    assert_eq!(stats["byType"]["game"], 0);

    let (_, stats) = app.get("/api/media/me/stats?mediaType=movie", &u1).await;
    assert_eq!(stats["total"], 1);
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    let app = TestApp::memory();
    let request = axum::http::Request::builder()
        .uri("/health")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = tower::ServiceExt::oneshot(app.router.clone(), request).await.unwrap();
    assert!(response.headers().contains_key("x-request-id"));
}
