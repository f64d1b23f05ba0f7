//! PostgreSQL implementations of the domain store traits.

pub mod content;
pub mod registrant;

pub use content::ContentRepository;
pub use registrant::RegistrantRepository;

use domain::repositories::StoreError;

const UNIQUE_VIOLATION: &str = "23505";

/// Maps a sqlx error onto the store taxonomy. Unique violations on the
/// registrant email/code constraints become conflicts.
pub(crate) fn store_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
            match db_err.constraint() {
                Some("registrants_email_key") => return StoreError::DuplicateEmail,
                Some("registrants_registration_code_key") => return StoreError::DuplicateCode,
                _ => {}
            }
        }
    }
    tracing::error!(error = %err, "Database error");
    StoreError::Backend(err.to_string())
}

/// Wraps a search term for ILIKE, escaping wildcard characters.
pub(crate) fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}
