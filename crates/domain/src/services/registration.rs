//! Registration workflow: validate, mint a code, store, notify.
//!
//! Uniqueness is decided by the store on insert. There is no existence
//! pre-check, so two racing submissions with the same email resolve to one
//! success and one `DuplicateEmail`.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use shared::pagination::Page;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::registrant::{
    CheckInOutcome, Registrant, RegistrantKind, RegistrationRequest,
};
use crate::repositories::{RegistrantPatch, RegistrantQuery, RegistrantStore, StoreError};
use crate::services::notification::{NotificationTemplate, NotificationVars, Notifier};
use crate::services::registration_validator::{
    generate_registration_code, validate, RegistrationErrors,
};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Validation failed: {0}")]
    Invalid(RegistrationErrors),

    #[error("Email already registered")]
    DuplicateEmail,

    #[error("Registration code conflict, please try again")]
    DuplicateCode,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail => ServiceError::DuplicateEmail,
            StoreError::DuplicateCode => ServiceError::DuplicateCode,
            other => ServiceError::Store(other),
        }
    }
}

impl From<RegistrationErrors> for ServiceError {
    fn from(errors: RegistrationErrors) -> Self {
        ServiceError::Invalid(errors)
    }
}

/// Admin bulk operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkAction {
    Confirm,
    #[serde(alias = "checkIn", alias = "check-in")]
    CheckIn,
    Delete,
}

impl BulkAction {
    pub fn past_tense(&self) -> &'static str {
        match self {
            BulkAction::Confirm => "confirmed",
            BulkAction::CheckIn => "checked in",
            BulkAction::Delete => "deleted",
        }
    }
}

/// Outcome of a successful registration.
#[derive(Debug, Clone)]
pub struct Registered {
    pub registrant: Registrant,
    /// `false` when the confirmation message could not be delivered.
    pub email_sent: bool,
}

#[derive(Clone)]
pub struct RegistrationService {
    store: Arc<dyn RegistrantStore>,
    notifier: Arc<dyn Notifier>,
    max_bulk_ids: usize,
}

impl RegistrationService {
    pub fn new(
        store: Arc<dyn RegistrantStore>,
        notifier: Arc<dyn Notifier>,
        max_bulk_ids: usize,
    ) -> Self {
        Self {
            store,
            notifier,
            max_bulk_ids,
        }
    }

    pub fn store(&self) -> &Arc<dyn RegistrantStore> {
        &self.store
    }

    pub async fn register(&self, payload: RegistrationRequest) -> Result<Registered, ServiceError> {
        let kind = payload.kind.clone().unwrap_or_default();
        let new = validate(&payload, &kind)?;
        let code = generate_registration_code(new.kind);

        let registrant = self.store.insert(new, &code).await.map_err(|e| {
            if e == StoreError::DuplicateCode {
                warn!(registration_code = %code, "Registration code collision");
            }
            ServiceError::from(e)
        })?;

        info!(
            registrant_id = %registrant.id,
            kind = %registrant.kind,
            registration_code = %registrant.registration_code,
            "Registrant created"
        );

        let email_sent = self.notify_registered(&registrant).await;
        Ok(Registered {
            registrant,
            email_sent,
        })
    }

    async fn notify_registered(&self, registrant: &Registrant) -> bool {
        let template = match registrant.kind {
            RegistrantKind::Participant => NotificationTemplate::ParticipantConfirmation,
            RegistrantKind::Volunteer => NotificationTemplate::VolunteerConfirmation,
        };

        match self
            .notifier
            .send(&registrant.email, template, &confirmation_vars(registrant))
            .await
        {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    registrant_id = %registrant.id,
                    error = %e,
                    "Failed to send registration confirmation"
                );
                false
            }
        }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Registrant, ServiceError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound("Registrant"))
    }

    pub async fn find_by_code(&self, code: &str) -> Result<Registrant, ServiceError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(ServiceError::BadRequest(
                "Registration code is required".to_string(),
            ));
        }
        self.store
            .find_by_code(code)
            .await?
            .ok_or(ServiceError::NotFound("Registration"))
    }

    /// Admin lookup. Emails are stored lower-cased, so the match is case-insensitive.
    pub async fn find_by_email(&self, email: &str) -> Result<Registrant, ServiceError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(ServiceError::BadRequest("Email is required".to_string()));
        }
        self.store
            .find_by_email(email)
            .await?
            .ok_or(ServiceError::NotFound("Registrant"))
    }

    pub async fn list(&self, query: &RegistrantQuery) -> Result<Page<Registrant>, ServiceError> {
        Ok(self.store.list(query).await?)
    }

    /// Checks a registrant in. A repeat check-in is reported, not rejected,
    /// and keeps the original `check_in_time`.
    pub async fn check_in_by_id(&self, id: Uuid) -> Result<CheckInOutcome, ServiceError> {
        if let Some(updated) = self.store.check_in(id, Utc::now()).await? {
            info!(registrant_id = %id, "Registrant checked in");
            return Ok(CheckInOutcome::CheckedIn(updated));
        }

        // Nothing changed: either the id is unknown or the row was already checked in.
        match self.store.find_by_id(id).await? {
            Some(existing) if existing.check_in_status => {
                Ok(CheckInOutcome::AlreadyCheckedIn(existing))
            }
            Some(_) => Err(ServiceError::Store(StoreError::Backend(
                "check-in was not applied".to_string(),
            ))),
            None => Err(ServiceError::NotFound("Registrant")),
        }
    }

    pub async fn check_in_by_code(&self, code: &str) -> Result<CheckInOutcome, ServiceError> {
        let registrant = self.find_by_code(code).await?;
        if registrant.check_in_status {
            return Ok(CheckInOutcome::AlreadyCheckedIn(registrant));
        }
        self.check_in_by_id(registrant.id).await
    }

    /// Idempotent administrative confirmation.
    pub async fn confirm(&self, id: Uuid) -> Result<Registrant, ServiceError> {
        let registrant = self
            .store
            .confirm(id)
            .await?
            .ok_or(ServiceError::NotFound("Registrant"))?;
        info!(registrant_id = %id, "Registrant confirmed");
        Ok(registrant)
    }

    /// Applies one action to many registrants as a single store call.
    /// Returns the number of registrants affected.
    pub async fn bulk(
        &self,
        action: BulkAction,
        kind: Option<RegistrantKind>,
        ids: &[Uuid],
    ) -> Result<u64, ServiceError> {
        let ids: Vec<Uuid> = ids
            .iter()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        if ids.is_empty() {
            return Err(ServiceError::BadRequest(
                "At least one id is required".to_string(),
            ));
        }
        if ids.len() > self.max_bulk_ids {
            return Err(ServiceError::BadRequest(format!(
                "Too many ids: at most {} per request",
                self.max_bulk_ids
            )));
        }

        let affected = match action {
            BulkAction::Confirm => {
                self.store
                    .update_many(kind, &ids, RegistrantPatch::Confirm)
                    .await?
            }
            BulkAction::CheckIn => {
                self.store
                    .update_many(kind, &ids, RegistrantPatch::CheckIn { at: Utc::now() })
                    .await?
            }
            BulkAction::Delete => self.store.delete_many(kind, &ids).await?,
        };

        info!(
            action = action.past_tense(),
            requested = ids.len(),
            affected,
            "Bulk registrant action applied"
        );
        Ok(affected)
    }
}

/// Variables for the confirmation templates.
pub fn confirmation_vars(registrant: &Registrant) -> NotificationVars {
    let mut vars = NotificationVars::new();
    vars.insert("firstName".to_string(), registrant.first_name.clone());
    vars.insert("name".to_string(), registrant.full_name());
    vars.insert(
        "registrationCode".to_string(),
        registrant.registration_code.clone(),
    );
    vars.insert("type".to_string(), registrant.kind.to_string());
    if !registrant.departments.is_empty() {
        let departments: Vec<&str> = registrant.departments.iter().map(|d| d.as_str()).collect();
        vars.insert("departments".to_string(), departments.join(", "));
    }
    vars
}
