use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use domain::repositories::{ContentStore, RegistrantStore};
use domain::services::{Notifier, RegistrationService};
use persistence::{InMemoryContentStore, InMemoryRegistrantStore};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{
    metrics_handler, metrics_middleware, rate_limit_middleware, require_admin,
    security_headers_middleware, trace_id, RateLimiterState,
};
use crate::routes::{admin, content, health, registrations};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub registrations: RegistrationService,
    pub content: Arc<dyn ContentStore>,
    /// Present only with the PostgreSQL backend; used for pool metrics.
    pub pool: Option<PgPool>,
    pub rate_limiter: Option<Arc<RateLimiterState>>,
}

/// Storage and delivery handles the router is built on.
pub struct Backends {
    pub registrants: Arc<dyn RegistrantStore>,
    pub content: Arc<dyn ContentStore>,
    pub notifier: Arc<dyn Notifier>,
    pub pool: Option<PgPool>,
}

impl Backends {
    pub fn postgres(pool: PgPool, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            registrants: Arc::new(persistence::RegistrantRepository::new(pool.clone())),
            content: Arc::new(persistence::ContentRepository::new(pool.clone())),
            notifier,
            pool: Some(pool),
        }
    }

    pub fn in_memory(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            registrants: Arc::new(InMemoryRegistrantStore::new()),
            content: Arc::new(InMemoryContentStore::new()),
            notifier,
            pool: None,
        }
    }
}

pub fn create_app(config: Config, backends: Backends) -> Router {
    let config = Arc::new(config);

    let registrations = RegistrationService::new(
        backends.registrants,
        backends.notifier,
        config.limits.max_bulk_ids,
    );

    let state = AppState {
        config: config.clone(),
        registrations,
        content: backends.content,
        pool: backends.pool,
        rate_limiter: RateLimiterState::new(
            config.security.rate_limit_per_minute,
            config.security.rate_limit_max_clients,
        )
        .map(|limiter| Arc::new(limiter.trust_proxy_headers(config.security.trust_proxy_headers))),
    };

    let cors = if config.security.cors_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Only the submission route is rate limited.
    let submission_routes = Router::new()
        .route("/api/v1/registrations", post(registrations::register))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ));

    let public_routes = Router::new()
        .route(
            "/api/v1/registrations/:code",
            get(registrations::get_by_code),
        )
        .route("/api/v1/content", get(content::list_content))
        .route("/api/v1/content/:id", get(content::get_content))
        .route("/api/v1/content/:id/play", post(content::record_play))
        .route("/api/v1/content/:id/download", post(content::record_download))
        .route("/api/health", get(health::health_check))
        .route("/api/health/live", get(health::live))
        .route("/api/health/ready", get(health::ready))
        .route("/metrics", get(metrics_handler));

    let admin_routes = Router::new()
        .route("/api/v1/admin/registrants", get(admin::list_registrants))
        .route(
            "/api/v1/admin/registrants/bulk",
            post(admin::bulk_registrants),
        )
        .route(
            "/api/v1/admin/registrants/lookup",
            get(admin::lookup_registrant),
        )
        .route("/api/v1/admin/registrants/:id", get(admin::get_registrant))
        .route(
            "/api/v1/admin/registrants/:id/confirm",
            post(admin::confirm_registrant),
        )
        .route(
            "/api/v1/admin/registrants/:id/check-in",
            post(admin::check_in_registrant),
        )
        .route("/api/v1/admin/check-in", post(admin::check_in_by_code))
        .route("/api/v1/admin/content", post(admin::create_content))
        .route(
            "/api/v1/admin/content/:id",
            axum::routing::delete(admin::delete_content),
        )
        .route("/api/v1/admin/stats", get(admin::dashboard_stats))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    Router::new()
        .merge(submission_routes)
        .merge(public_routes)
        .merge(admin_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(DefaultBodyLimit::max(config.server.max_body_size))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            security_headers_middleware,
        ))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state)
}
