//! Admin API routes.
//!
//! Mounted behind `require_admin`; every handler here assumes a valid
//! `X-Admin-Key`.

use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use domain::models::content::{ContentItem, CreateContentRequest};
use domain::models::registrant::{CheckInOutcome, Department, Registrant, RegistrantKind};
use domain::models::stats::DashboardStats;
use domain::repositories::RegistrantQuery;
use domain::services::BulkAction;
use serde::{Deserialize, Serialize};
use shared::pagination::Page;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::{page_request, DataResponse};
use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{AppJson, AppPath, AppQuery};
use crate::middleware::metrics::record_check_ins;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrantListQuery {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub search: Option<String>,
    pub confirmed: Option<bool>,
    pub checked_in: Option<bool>,
    pub department: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

fn parse_optional<T>(value: Option<&str>) -> Result<Option<T>, ApiError>
where
    T: std::str::FromStr<Err = String>,
{
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| v.parse::<T>().map_err(ApiError::BadRequest))
        .transpose()
}

impl RegistrantListQuery {
    fn into_store_query(self, state: &AppState) -> Result<RegistrantQuery, ApiError> {
        Ok(RegistrantQuery {
            kind: parse_optional::<RegistrantKind>(self.kind.as_deref())?,
            department: parse_optional::<Department>(self.department.as_deref())?,
            search: self.search,
            confirmed: self.confirmed,
            checked_in: self.checked_in,
            page: page_request(&state.config.limits, self.page, self.per_page),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct LookupQuery {
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInResponse {
    pub success: bool,
    pub message: &'static str,
    pub already_checked_in: bool,
    pub check_in_time: Option<DateTime<Utc>>,
    pub registrant: Registrant,
}

impl From<CheckInOutcome> for CheckInResponse {
    fn from(outcome: CheckInOutcome) -> Self {
        let message = outcome.message();
        let already_checked_in = outcome.was_already_checked_in();
        let registrant = outcome.into_registrant();
        Self {
            success: true,
            message,
            already_checked_in,
            check_in_time: registrant.check_in_time,
            registrant,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInByCodeRequest {
    pub registration_code: String,
}

#[derive(Debug, Deserialize)]
pub struct BulkRequest {
    pub action: BulkAction,
    pub ids: Vec<Uuid>,
    #[serde(rename = "type", default)]
    pub kind: Option<RegistrantKind>,
}

/// Response for admin operations that affect multiple records.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkResponse {
    pub success: bool,
    pub affected_count: u64,
    pub message: String,
}

/// GET /api/v1/admin/registrants
pub async fn list_registrants(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<RegistrantListQuery>,
) -> Result<Json<DataResponse<Page<Registrant>>>, ApiError> {
    let query = query.into_store_query(&state)?;
    let page = state.registrations.list(&query).await?;
    Ok(Json(DataResponse::new(page)))
}

/// GET /api/v1/admin/registrants/lookup?email=
pub async fn lookup_registrant(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<LookupQuery>,
) -> Result<Json<DataResponse<Registrant>>, ApiError> {
    let registrant = state.registrations.find_by_email(&query.email).await?;
    Ok(Json(DataResponse::new(registrant)))
}

/// GET /api/v1/admin/registrants/:id
pub async fn get_registrant(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<DataResponse<Registrant>>, ApiError> {
    let registrant = state.registrations.find_by_id(id).await?;
    Ok(Json(DataResponse::new(registrant)))
}

/// POST /api/v1/admin/registrants/:id/confirm
pub async fn confirm_registrant(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<DataResponse<Registrant>>, ApiError> {
    let registrant = state.registrations.confirm(id).await?;
    Ok(Json(DataResponse::new(registrant)))
}

/// POST /api/v1/admin/registrants/:id/check-in
pub async fn check_in_registrant(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<CheckInResponse>, ApiError> {
    let outcome = state.registrations.check_in_by_id(id).await?;
    Ok(Json(checked_in(outcome)))
}

/// POST /api/v1/admin/check-in
///
/// Checking in twice returns 200 with "Already checked in" and the original time.
pub async fn check_in_by_code(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CheckInByCodeRequest>,
) -> Result<Json<CheckInResponse>, ApiError> {
    let outcome = state
        .registrations
        .check_in_by_code(&payload.registration_code)
        .await?;
    Ok(Json(checked_in(outcome)))
}

fn checked_in(outcome: CheckInOutcome) -> CheckInResponse {
    if !outcome.was_already_checked_in() {
        record_check_ins(1);
    }
    outcome.into()
}

/// POST /api/v1/admin/registrants/bulk
pub async fn bulk_registrants(
    State(state): State<AppState>,
    AppJson(payload): AppJson<BulkRequest>,
) -> Result<Json<BulkResponse>, ApiError> {
    let affected = state
        .registrations
        .bulk(payload.action, payload.kind, &payload.ids)
        .await?;

    if payload.action == BulkAction::CheckIn {
        record_check_ins(affected);
    }

    Ok(Json(BulkResponse {
        success: true,
        affected_count: affected,
        message: format!("{} registrant(s) {}", affected, payload.action.past_tense()),
    }))
}

/// POST /api/v1/admin/content
pub async fn create_content(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateContentRequest>,
) -> Result<(StatusCode, Json<DataResponse<ContentItem>>), ApiError> {
    payload.validate()?;

    let item = state.content.create(payload).await?;
    info!(content_id = %item.id, kind = %item.kind, "Content item created");
    Ok((StatusCode::CREATED, Json(DataResponse::new(item))))
}

/// DELETE /api/v1/admin/content/:id
pub async fn delete_content(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    if !state.content.delete(id).await? {
        return Err(ApiError::NotFound("Content item not found".to_string()));
    }
    info!(content_id = %id, "Content item deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/admin/stats
///
/// Registrant and content aggregates are computed concurrently.
pub async fn dashboard_stats(
    State(state): State<AppState>,
) -> Result<Json<DataResponse<DashboardStats>>, ApiError> {
    let (registrations, content) = tokio::try_join!(
        state.registrations.store().stats(),
        state.content.stats()
    )?;

    Ok(Json(DataResponse::new(DashboardStats {
        registrations,
        content,
        generated_at: Utc::now(),
    })))
}
