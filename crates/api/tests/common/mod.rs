//! Shared helpers for the HTTP integration tests.
//!
//! Tests run the real router on the in-memory backend with a recording
//! notifier, so no database or mail provider is needed.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use domain::services::MockNotifier;
use event_registration_api::{
    app::{create_app, Backends},
    config::{
        Config, DatabaseConfig, EmailConfig, LimitsConfig, LoggingConfig, SecurityConfig,
        ServerConfig, StorageBackend, StorageConfig,
    },
};
use serde_json::{json, Value};
use tower::ServiceExt;

pub const ADMIN_KEY: &str = "test-admin-key";

pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            request_timeout_secs: 30,
            max_body_size: 1_048_576,
        },
        storage: StorageConfig {
            backend: StorageBackend::Memory,
        },
        database: DatabaseConfig::default(),
        logging: LoggingConfig {
            level: "warn".to_string(),
            format: "pretty".to_string(),
        },
        security: SecurityConfig {
            cors_origins: vec![],
            rate_limit_per_minute: 0,
            rate_limit_max_clients: 1_000,
            trust_proxy_headers: false,
            admin_api_key: ADMIN_KEY.to_string(),
            hsts_enabled: false,
        },
        limits: LimitsConfig {
            max_bulk_ids: 50,
            ..Default::default()
        },
        email: EmailConfig::default(),
    }
}

pub struct TestApp {
    pub router: Router,
    pub notifier: Arc<MockNotifier>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with(test_config(), MockNotifier::new())
    }

    pub fn with(config: Config, notifier: MockNotifier) -> Self {
        let notifier = Arc::new(notifier);
        let router = create_app(config, Backends::in_memory(notifier.clone()));
        Self { router, notifier }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        admin_key: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(key) = admin_key {
            builder = builder.header("X-Admin-Key", key);
        }
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        (status, parse_body(response).await)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(body), None).await
    }

    pub async fn admin_get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None, Some(ADMIN_KEY)).await
    }

    pub async fn admin_post(&self, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        self.request(Method::POST, uri, body, Some(ADMIN_KEY)).await
    }

    pub async fn admin_delete(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, None, Some(ADMIN_KEY))
            .await
    }

    /// Registers a payload and returns the `data` object of the 201 response.
    pub async fn register(&self, payload: Value) -> Value {
        let (status, body) = self.post("/api/v1/registrations", payload).await;
        assert_eq!(status, StatusCode::CREATED, "unexpected body: {}", body);
        body["data"].clone()
    }
}

/// Parses a response body as JSON; empty bodies become `Value::Null`.
pub async fn parse_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).unwrap_or_else(|_| json!(String::from_utf8_lossy(&bytes)))
}

pub fn participant(email: &str) -> Value {
    json!({
        "type": "participant",
        "firstName": "Ada",
        "lastName": "Lovelace",
        "email": email,
        "phone": "+1-555-0100",
        "address": "1 Analytical Engine Way",
        "gender": "female",
        "maritalStatus": "single",
        "isLeader": "no"
    })
}

pub fn volunteer(email: &str, departments: Value) -> Value {
    json!({
        "type": "volunteer",
        "firstName": "Grace",
        "lastName": "Hopper",
        "email": email,
        "phone": "08031234567",
        "address": "Navy Yard",
        "gender": "female",
        "maritalStatus": "married",
        "isLeader": "no",
        "departments": departments
    })
}
