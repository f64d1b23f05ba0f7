//! Content catalogue endpoints.

mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use serde_json::json;

async fn create(app: &TestApp, kind: &str, title: &str) -> String {
    let (status, body) = app
        .admin_post(
            "/api/v1/admin/content",
            Some(json!({
                "kind": kind,
                "title": title,
                "author": "Pastor John",
                "mediaUrl": "https://cdn.example.com/media/1.mp3"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "unexpected body: {}", body);
    body["data"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_counters_increment_by_one() {
    let app = TestApp::new();
    let id = create(&app, "audio_message", "Morning Devotion").await;

    let (status, body) = app.get(&format!("/api/v1/content/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["views"], 1);

    app.get(&format!("/api/v1/content/{}", id)).await;
    let (_, body) = app
        .request(Method::POST, &format!("/api/v1/content/{}/play", id), None, None)
        .await;
    assert_eq!(body["data"]["views"], 2);
    assert_eq!(body["data"]["plays"], 1);

    let (_, body) = app
        .request(
            Method::POST,
            &format!("/api/v1/content/{}/download", id),
            None,
            None,
        )
        .await;
    assert_eq!(body["data"]["downloads"], 1);
    assert_eq!(body["data"]["plays"], 1);
}

#[tokio::test]
async fn test_list_filters_by_kind() {
    let app = TestApp::new();
    create(&app, "sermon", "Faith and Works").await;
    create(&app, "sermon", "Grace Abounding").await;
    create(&app, "testimony", "Healed and Whole").await;

    let (status, body) = app.get("/api/v1/content?kind=sermon").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 2);
    // Newest first.
    assert_eq!(body["data"]["items"][0]["title"], "Grace Abounding");

    let (_, body) = app.get("/api/v1/content?page=2&perPage=2").await;
    assert_eq!(body["data"]["total"], 3);
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 1);

    let (status, _) = app.get("/api/v1/content?kind=podcast").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_validates_and_requires_admin() {
    let app = TestApp::new();

    let (status, _) = app
        .request(
            Method::POST,
            "/api/v1/admin/content",
            Some(json!({ "kind": "sermon", "title": "Faith" })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app
        .admin_post(
            "/api/v1/admin/content",
            Some(json!({ "kind": "sermon", "title": "F", "mediaUrl": "nope" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_delete_content() {
    let app = TestApp::new();
    let id = create(&app, "media", "Choir Highlights").await;

    let (status, _) = app
        .admin_delete(&format!("/api/v1/admin/content/{}", id))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = app.get(&format!("/api/v1/content/{}", id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Content item not found");

    let (status, _) = app
        .admin_delete(&format!("/api/v1/admin/content/{}", id))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
