//! HTTP route handlers.

pub mod admin;
pub mod content;
pub mod health;
pub mod registrations;

use serde::Serialize;
use shared::pagination::PageRequest;

use crate::config::LimitsConfig;

/// `{ "success": true, "data": ... }` wrapper for successful responses.
#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

pub(crate) fn page_request(
    limits: &LimitsConfig,
    page: Option<u32>,
    per_page: Option<u32>,
) -> PageRequest {
    PageRequest::new(
        page,
        per_page,
        limits.default_page_size,
        limits.max_page_size,
    )
}
