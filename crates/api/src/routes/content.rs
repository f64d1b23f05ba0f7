//! Public content catalogue endpoints.

use axum::{extract::State, Json};
use domain::models::content::{ContentCounter, ContentItem, ContentKind};
use serde::Deserialize;
use shared::pagination::Page;
use uuid::Uuid;

use super::{page_request, DataResponse};
use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{AppPath, AppQuery};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentListQuery {
    pub kind: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

pub(crate) fn parse_kind(kind: Option<&str>) -> Result<Option<ContentKind>, ApiError> {
    kind.map(str::trim)
        .filter(|k| !k.is_empty())
        .map(|k| k.parse::<ContentKind>().map_err(ApiError::BadRequest))
        .transpose()
}

/// GET /api/v1/content
pub async fn list_content(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ContentListQuery>,
) -> Result<Json<DataResponse<Page<ContentItem>>>, ApiError> {
    let kind = parse_kind(query.kind.as_deref())?;
    let page = page_request(&state.config.limits, query.page, query.per_page);

    let items = state.content.list(kind, page).await?;
    Ok(Json(DataResponse::new(items)))
}

/// GET /api/v1/content/:id. Counts as a view.
pub async fn get_content(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<DataResponse<ContentItem>>, ApiError> {
    bump(&state, id, ContentCounter::Views).await
}

/// POST /api/v1/content/:id/play
pub async fn record_play(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<DataResponse<ContentItem>>, ApiError> {
    bump(&state, id, ContentCounter::Plays).await
}

/// POST /api/v1/content/:id/download
pub async fn record_download(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<DataResponse<ContentItem>>, ApiError> {
    bump(&state, id, ContentCounter::Downloads).await
}

async fn bump(
    state: &AppState,
    id: Uuid,
    counter: ContentCounter,
) -> Result<Json<DataResponse<ContentItem>>, ApiError> {
    let item = state
        .content
        .increment(id, counter)
        .await?
        .ok_or_else(|| ApiError::NotFound("Content item not found".to_string()))?;
    Ok(Json(DataResponse::new(item)))
}
