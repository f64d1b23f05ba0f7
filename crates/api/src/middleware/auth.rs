//! Admin authentication middleware.
//!
//! Admin routes require the `X-Admin-Key` header to match
//! `security.admin_api_key`. Keys are compared by SHA-256 digest.

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use shared::crypto::keys_match;

use crate::app::AppState;

pub const ADMIN_KEY_HEADER: &str = "X-Admin-Key";

/// Middleware for admin-only routes.
///
/// Missing key: 401. Present but wrong: 403.
pub async fn require_admin(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let presented = req
        .headers()
        .get(ADMIN_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|k| !k.is_empty());

    let Some(presented) = presented else {
        return unauthorized_response("Missing admin key");
    };

    if !keys_match(presented, &state.config.security.admin_api_key) {
        tracing::warn!(path = %req.uri().path(), "Rejected admin request with invalid key");
        return forbidden_response("Invalid admin key");
    }

    next.run(req).await
}

fn unauthorized_response(message: &str) -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "error": message }))).into_response()
}

fn forbidden_response(message: &str) -> Response {
    (StatusCode::FORBIDDEN, Json(json!({ "error": message }))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_response() {
        let response = unauthorized_response("Missing admin key");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_forbidden_response() {
        let response = forbidden_response("Invalid admin key");
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
