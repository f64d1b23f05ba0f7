//! Public registration endpoints.

use axum::{extract::State, http::StatusCode, Json};
use domain::models::registrant::{RegistrationRequest, RegistrationResponse, RegistrationStatus};

use super::DataResponse;
use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{AppJson, AppPath};
use crate::middleware::metrics::record_registration;

/// Submit a registration.
///
/// POST /api/v1/registrations
///
/// A failed confirmation email does not fail the request; it shows up as
/// `emailSent: false`.
pub async fn register(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegistrationRequest>,
) -> Result<(StatusCode, Json<DataResponse<RegistrationResponse>>), ApiError> {
    let registered = state.registrations.register(payload).await?;
    record_registration(registered.registrant.kind);

    let response = RegistrationResponse::new(&registered.registrant, registered.email_sent);
    Ok((StatusCode::CREATED, Json(DataResponse::new(response))))
}

/// Look up a registration by its code.
///
/// GET /api/v1/registrations/:code
pub async fn get_by_code(
    State(state): State<AppState>,
    AppPath(code): AppPath<String>,
) -> Result<Json<DataResponse<RegistrationStatus>>, ApiError> {
    let registrant = state.registrations.find_by_code(&code).await?;
    Ok(Json(DataResponse::new(registrant.into())))
}
