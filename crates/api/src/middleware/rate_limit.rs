//! Rate limiting middleware for public submissions.
//!
//! A keyed governor limiter holds one bucket per client address. The
//! address is the TCP peer unless `trust_proxy_headers` is set, in which
//! case `X-Forwarded-For` (first hop) and then `X-Real-IP` are used.
//! Requests with no usable address share one bucket.
//!
//! The number of tracked clients is capped. Once the cap is reached, idle
//! buckets are pruned and clients that still do not fit share the
//! overflow bucket.

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{header, HeaderMap, HeaderValue, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{
    clock::{Clock, DefaultClock},
    DefaultKeyedRateLimiter, Quota, RateLimiter,
};
use std::{net::SocketAddr, num::NonZeroU32};

use crate::app::AppState;
use crate::error::ApiError;

const SHARED_BUCKET: &str = "shared";
const OVERFLOW_BUCKET: &str = "overflow";

pub struct RateLimiterState {
    limiter: DefaultKeyedRateLimiter<String>,
    clock: DefaultClock,
    max_clients: usize,
    trust_proxy_headers: bool,
}

impl RateLimiterState {
    /// Returns `None` when the limit is zero (rate limiting disabled).
    pub fn new(rate_limit_per_minute: u32, max_clients: usize) -> Option<Self> {
        let per_minute = NonZeroU32::new(rate_limit_per_minute)?;
        Some(Self {
            limiter: RateLimiter::keyed(Quota::per_minute(per_minute)),
            clock: DefaultClock::default(),
            max_clients: max_clients.max(1),
            trust_proxy_headers: false,
        })
    }

    pub fn trust_proxy_headers(mut self, trust: bool) -> Self {
        self.trust_proxy_headers = trust;
        self
    }

    /// Picks the bucket for a client, pruning idle buckets when full.
    fn bucket_for(&self, client: &str) -> String {
        if self.limiter.len() < self.max_clients {
            return client.to_string();
        }

        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
        if self.limiter.len() < self.max_clients {
            client.to_string()
        } else {
            tracing::debug!(client = %client, "Rate limiter full, using overflow bucket");
            OVERFLOW_BUCKET.to_string()
        }
    }

    /// `Err` carries the suggested retry delay in whole seconds (at least 1).
    pub fn check(&self, client: &str) -> Result<(), u64> {
        let bucket = self.bucket_for(client);
        self.limiter.check_key(&bucket).map_err(|not_until| {
            not_until
                .wait_time_from(self.clock.now())
                .as_secs()
                .max(1)
        })
    }

    pub fn tracked_clients(&self) -> usize {
        self.limiter.len()
    }

    /// Client key for a request: the peer address, or the forwarding
    /// headers when they are trusted.
    pub fn client_key(&self, headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
        let forwarded = self
            .trust_proxy_headers
            .then(|| forwarded_client(headers))
            .flatten();

        forwarded
            .or_else(|| peer.map(|addr| addr.ip().to_string()))
            .unwrap_or_else(|| SHARED_BUCKET.to_string())
    }
}

impl std::fmt::Debug for RateLimiterState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiterState")
            .field("tracked_clients", &self.tracked_clients())
            .field("max_clients", &self.max_clients)
            .field("trust_proxy_headers", &self.trust_proxy_headers)
            .finish()
    }
}

fn forwarded_client(headers: &HeaderMap) -> Option<String> {
    let header_value = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    header_value("x-forwarded-for")
        .or_else(|| header_value("x-real-ip"))
        .map(str::to_string)
}

pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(limiter) = state.rate_limiter.as_ref() {
        let peer = req
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|info| info.0);
        let client = limiter.client_key(req.headers(), peer);
        if let Err(retry_after) = limiter.check(&client) {
            tracing::warn!(client = %client, retry_after, "Rate limit exceeded");
            return rate_limited_response(retry_after);
        }
    }

    next.run(req).await
}

fn rate_limited_response(retry_after: u64) -> Response {
    let mut response = ApiError::RateLimited.into_response();
    response
        .headers_mut()
        .insert(header::RETRY_AFTER, HeaderValue::from(retry_after));
    response
}
