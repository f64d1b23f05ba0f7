//! Database metrics.

use metrics::{gauge, histogram};
use sqlx::PgPool;
use std::time::Instant;

/// Records the duration of one store query, labelled by name and outcome.
pub fn record_query_duration(query_name: &str, ok: bool, duration_secs: f64) {
    histogram!(
        "database_query_duration_seconds",
        "query" => query_name.to_string(),
        "outcome" => if ok { "ok" } else { "error" }
    )
    .record(duration_secs);
}

/// Publishes connection pool gauges. Called from the readiness probe.
pub fn record_pool_metrics(pool: &PgPool) {
    let size = pool.size() as usize;
    let idle = pool.num_idle();

    gauge!("database_connections_active").set(size.saturating_sub(idle) as f64);
    gauge!("database_connections_idle").set(idle as f64);
    gauge!("database_connections_total").set(size as f64);
}

/// Times a query from construction until [`QueryTimer::record`].
///
/// ```ignore
/// let timer = QueryTimer::new("find_registrant_by_code");
/// let result = sqlx::query_as::<_, RegistrantEntity>(...).fetch_optional(&pool).await;
/// timer.record(result.is_ok());
/// ```
pub struct QueryTimer {
    query_name: String,
    start: Instant,
}

impl QueryTimer {
    pub fn new(query_name: impl Into<String>) -> Self {
        Self {
            query_name: query_name.into(),
            start: Instant::now(),
        }
    }

    pub fn record(self, ok: bool) {
        record_query_duration(&self.query_name, ok, self.start.elapsed().as_secs_f64());
    }
}
