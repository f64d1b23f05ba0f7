//! Public registration endpoints, end to end.

mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use common::{participant, volunteer, TestApp};
use domain::services::{MockNotifier, NotificationTemplate};
use serde_json::json;
use tower::ServiceExt;

#[tokio::test]
async fn test_participant_registration_is_confirmed() {
    let app = TestApp::new();

    let data = app.register(participant("ada@x.com")).await;
    assert_eq!(data["isConfirmed"], true);
    assert_eq!(data["type"], "participant");
    assert_eq!(data["name"], "Ada Lovelace");
    assert_eq!(data["emailSent"], true);
    assert!(data["registrationCode"].as_str().unwrap().starts_with("PAR-"));

    let sent = app.notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].template, NotificationTemplate::ParticipantConfirmation);
}

#[tokio::test]
async fn test_duplicate_email_conflicts() {
    let app = TestApp::new();
    app.register(participant("ada@x.com")).await;

    let (status, body) = app
        .post("/api/v1/registrations", participant("ada@x.com"))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body, json!({ "error": "Email already registered" }));
}

#[tokio::test]
async fn test_volunteer_with_three_departments_is_rejected() {
    let app = TestApp::new();

    let (status, body) = app
        .post(
            "/api/v1/registrations",
            volunteer("grace@x.com", json!(["media", "protocol", "welfare"])),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation failed");
    let details: Vec<&str> = body["details"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|d| d.as_str())
        .collect();
    assert!(details.iter().any(|d| d.contains("at most 2 departments")));
}

#[tokio::test]
async fn test_leader_with_other_ministry_needs_custom_ministry() {
    let app = TestApp::new();
    let mut payload = participant("lead@x.com");
    payload["isLeader"] = json!("yes");
    payload["ministry"] = json!("other");

    let (status, body) = app.post("/api/v1/registrations", payload).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"]
        .as_array()
        .unwrap()
        .iter()
        .any(|d| d.as_str().unwrap().contains("customMinistry")));
    assert!(app.notifier.sent().is_empty());
}

#[tokio::test]
async fn test_volunteer_registration() {
    let app = TestApp::new();

    let data = app
        .register(volunteer("grace@x.com", json!(["media", "protocol"])))
        .await;
    assert!(data["registrationCode"].as_str().unwrap().starts_with("VOL-"));
    assert_eq!(
        app.notifier.sent()[0].template,
        NotificationTemplate::VolunteerConfirmation
    );
}

#[tokio::test]
async fn test_malformed_json_is_a_validation_error() {
    let app = TestApp::new();

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/registrations")
                .header("content-type", "application/json")
                .body(Body::from("{\"type\": \"participant\", "))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = common::parse_body(response).await;
    assert_eq!(body["error"], "Validation failed");
    assert!(body["details"].is_array());
}

#[tokio::test]
async fn test_notifier_failure_still_registers() {
    let app = TestApp::with(common::test_config(), MockNotifier::failing());

    let data = app.register(participant("ada@x.com")).await;
    assert_eq!(data["emailSent"], false);

    let code = data["registrationCode"].as_str().unwrap();
    let (status, body) = app.get(&format!("/api/v1/registrations/{}", code)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["registrationCode"], code);
}

#[tokio::test]
async fn test_status_lookup_by_code() {
    let app = TestApp::new();
    let data = app.register(participant("ada@x.com")).await;
    let code = data["registrationCode"].as_str().unwrap();

    let (status, body) = app.get(&format!("/api/v1/registrations/{}", code)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["checkInStatus"], false);
    assert_eq!(body["data"]["name"], "Ada Lovelace");
    // The public view does not expose contact details.
    assert!(body["data"].get("email").is_none());

    let (status, body) = app.get("/api/v1/registrations/PAR-000000-ZZZZ").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Registration not found");
}

#[tokio::test]
async fn test_submissions_are_rate_limited() {
    let mut config = common::test_config();
    config.security.rate_limit_per_minute = 1;
    let app = TestApp::with(config, MockNotifier::new());

    app.register(participant("first@x.com")).await;
    let (status, body) = app
        .post("/api/v1/registrations", participant("second@x.com"))
        .await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert!(body["error"].is_string());

    // Reads are not limited.
    let (status, _) = app.get("/api/health/live").await;
    assert_eq!(status, StatusCode::OK);
}

async fn submit_from(app: &TestApp, forwarded_for: &str, email: &str) -> StatusCode {
    app.router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/registrations")
                .header("content-type", "application/json")
                .header("x-forwarded-for", forwarded_for)
                .body(Body::from(participant(email).to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
        .status()
}

#[tokio::test]
async fn test_rotating_forwarded_for_does_not_reset_limit() {
    let mut config = common::test_config();
    config.security.rate_limit_per_minute = 1;
    let app = TestApp::with(config, MockNotifier::new());

    assert_eq!(
        submit_from(&app, "203.0.113.1", "one@x.com").await,
        StatusCode::CREATED
    );
    assert_eq!(
        submit_from(&app, "203.0.113.2", "two@x.com").await,
        StatusCode::TOO_MANY_REQUESTS
    );
}

#[tokio::test]
async fn test_trusted_forwarded_for_separates_clients() {
    let mut config = common::test_config();
    config.security.rate_limit_per_minute = 1;
    config.security.trust_proxy_headers = true;
    let app = TestApp::with(config, MockNotifier::new());

    assert_eq!(
        submit_from(&app, "203.0.113.1", "one@x.com").await,
        StatusCode::CREATED
    );
    assert_eq!(
        submit_from(&app, "203.0.113.2", "two@x.com").await,
        StatusCode::CREATED
    );
    assert_eq!(
        submit_from(&app, "203.0.113.1", "three@x.com").await,
        StatusCode::TOO_MANY_REQUESTS
    );
}

#[tokio::test]
async fn test_responses_carry_request_id_and_security_headers() {
    let app = TestApp::new();
    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .header("X-Request-ID", "trace-me")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-request-id"], "trace-me");
    assert_eq!(response.headers()["x-content-type-options"], "nosniff");
}
