//! Storage interfaces.
//!
//! The api crate depends on these traits only; `persistence` provides the
//! PostgreSQL and in-memory implementations. Uniqueness of `email` and
//! `registration_code` is the store's job: callers attempt the write and
//! react to `StoreError::DuplicateEmail` / `StoreError::DuplicateCode`.

use chrono::{DateTime, Utc};
use shared::pagination::{Page, PageRequest};
use thiserror::Error;
use uuid::Uuid;

use crate::models::content::{ContentCounter, ContentItem, ContentKind, CreateContentRequest};
use crate::models::registrant::{Department, NewRegistrant, Registrant, RegistrantKind};
use crate::models::stats::{ContentStats, RegistrationStats};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Email already registered")]
    DuplicateEmail,

    #[error("Registration code already in use")]
    DuplicateCode,

    #[error("Storage error: {0}")]
    Backend(String),
}

/// Filters for listing registrants. `None` means "any".
#[derive(Debug, Clone, Default)]
pub struct RegistrantQuery {
    pub kind: Option<RegistrantKind>,
    /// Case-insensitive match against name, email, phone and registration code.
    pub search: Option<String>,
    pub confirmed: Option<bool>,
    pub checked_in: Option<bool>,
    pub department: Option<Department>,
    pub page: PageRequest,
}

impl RegistrantQuery {
    /// Whether a registrant passes every filter except pagination.
    pub fn matches(&self, r: &Registrant) -> bool {
        if self.kind.is_some_and(|k| k != r.kind) {
            return false;
        }
        if self.confirmed.is_some_and(|c| c != r.is_confirmed) {
            return false;
        }
        if self.checked_in.is_some_and(|c| c != r.check_in_status) {
            return false;
        }
        if let Some(dept) = self.department {
            if !r.departments.contains(&dept) {
                return false;
            }
        }
        if let Some(term) = self.search_term() {
            let haystacks = [
                &r.first_name,
                &r.last_name,
                &r.email,
                &r.phone,
                &r.registration_code,
            ];
            if !haystacks.iter().any(|h| h.to_lowercase().contains(&term)) {
                return false;
            }
        }
        true
    }

    /// Lower-cased, trimmed search term, if any.
    pub fn search_term(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }
}

/// Set-based mutation applied by admin bulk actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrantPatch {
    Confirm,
    /// Sets `check_in_status` and stamps `check_in_time` on rows not yet checked in.
    CheckIn { at: DateTime<Utc> },
}

/// Persistence for participants and volunteers, keyed by a single `kind` discriminant.
#[async_trait::async_trait]
pub trait RegistrantStore: Send + Sync {
    /// Inserts a new, auto-confirmed registrant.
    async fn insert(
        &self,
        registrant: NewRegistrant,
        registration_code: &str,
    ) -> Result<Registrant, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Registrant>, StoreError>;

    async fn find_by_code(&self, code: &str) -> Result<Option<Registrant>, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Registrant>, StoreError>;

    /// Newest first.
    async fn list(&self, query: &RegistrantQuery) -> Result<Page<Registrant>, StoreError>;

    /// Checks a registrant in if not already checked in.
    ///
    /// Returns the updated row, or `None` when nothing changed (unknown id or
    /// already checked in).
    async fn check_in(&self, id: Uuid, at: DateTime<Utc>) -> Result<Option<Registrant>, StoreError>;

    /// Confirms a registrant. Returns the row, or `None` for an unknown id.
    async fn confirm(&self, id: Uuid) -> Result<Option<Registrant>, StoreError>;

    /// Applies `patch` to every listed id (optionally restricted to one kind).
    /// Returns the number of rows changed.
    async fn update_many(
        &self,
        kind: Option<RegistrantKind>,
        ids: &[Uuid],
        patch: RegistrantPatch,
    ) -> Result<u64, StoreError>;

    /// Deletes every listed id (optionally restricted to one kind).
    async fn delete_many(&self, kind: Option<RegistrantKind>, ids: &[Uuid])
        -> Result<u64, StoreError>;

    async fn stats(&self) -> Result<RegistrationStats, StoreError>;

    /// Cheap liveness probe for health checks.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Persistence for sermons, media, audio messages and testimonies.
#[async_trait::async_trait]
pub trait ContentStore: Send + Sync {
    async fn create(&self, request: CreateContentRequest) -> Result<ContentItem, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ContentItem>, StoreError>;

    /// Newest first.
    async fn list(
        &self,
        kind: Option<ContentKind>,
        page: PageRequest,
    ) -> Result<Page<ContentItem>, StoreError>;

    /// Atomically adds one to a counter and returns the updated item.
    async fn increment(
        &self,
        id: Uuid,
        counter: ContentCounter,
    ) -> Result<Option<ContentItem>, StoreError>;

    /// Returns `true` if an item was deleted.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;

    async fn stats(&self) -> Result<ContentStats, StoreError>;
}
