//! Registration payload validation and registration code generation.
//!
//! Validation is pure: it never touches the store. All field problems are
//! collected in the order the checks run so a form can show them together.

use chrono::Utc;
use serde_json::Value;
use shared::validation::{char_len_within, is_valid_email, is_valid_phone, non_blank};
use std::fmt;
use thiserror::Error;

use crate::models::registrant::{
    Department, Gender, LeaderStatus, MaritalStatus, NewRegistrant, RegistrantKind,
    RegistrationRequest,
};

pub const NAME_MIN_LEN: usize = 2;
pub const NAME_MAX_LEN: usize = 50;
pub const ADDRESS_MAX_LEN: usize = 500;
pub const MAX_DEPARTMENTS: usize = 2;

/// Ministry value that requires a free-text `customMinistry`.
pub const OTHER_MINISTRY: &str = "other";

const BASE36_UPPER: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Form fields, named as they appear on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    FirstName,
    LastName,
    Email,
    Phone,
    Address,
    Gender,
    MaritalStatus,
    IsLeader,
}

impl Field {
    pub const REQUIRED: [Field; 8] = [
        Field::FirstName,
        Field::LastName,
        Field::Email,
        Field::Phone,
        Field::Address,
        Field::Gender,
        Field::MaritalStatus,
        Field::IsLeader,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::FirstName => "firstName",
            Field::LastName => "lastName",
            Field::Email => "email",
            Field::Phone => "phone",
            Field::Address => "address",
            Field::Gender => "gender",
            Field::MaritalStatus => "maritalStatus",
            Field::IsLeader => "isLeader",
        }
    }

    fn value<'a>(&self, payload: &'a RegistrationRequest) -> Option<&'a str> {
        let raw = match self {
            Field::FirstName => &payload.first_name,
            Field::LastName => &payload.last_name,
            Field::Email => &payload.email,
            Field::Phone => &payload.phone,
            Field::Address => &payload.address,
            Field::Gender => &payload.gender,
            Field::MaritalStatus => &payload.marital_status,
            Field::IsLeader => &payload.is_leader,
        };
        non_blank(raw.as_deref())
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single failed check. `Display` is the client-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationIssue {
    #[error("Invalid registration type. Must be 'participant' or 'volunteer'")]
    InvalidKind,

    #[error("{0} is required")]
    MissingField(Field),

    #[error("Please provide a valid email address")]
    InvalidEmail,

    #[error("Please provide a valid phone number (10-20 digits, spaces, +, -, parentheses)")]
    InvalidPhone,

    #[error("{field} must be between {min} and {max} characters")]
    InvalidLength {
        field: Field,
        min: usize,
        max: usize,
    },

    #[error("{field} must be one of: {allowed}")]
    InvalidChoice {
        field: Field,
        allowed: &'static str,
    },

    #[error("ministry is required for leaders")]
    MissingMinistry,

    #[error("customMinistry is required when ministry is 'other'")]
    MissingCustomMinistry,

    #[error("Please select at least one department")]
    MissingDepartments,

    #[error("Too many departments selected: at most 2 departments are allowed")]
    TooManyDepartments,

    #[error("Invalid department: {0}")]
    InvalidDepartment(String),
}

/// Ordered, non-empty list of validation issues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationErrors(Vec<ValidationIssue>);

impl RegistrationErrors {
    pub fn issues(&self) -> &[ValidationIssue] {
        &self.0
    }

    pub fn messages(&self) -> Vec<String> {
        self.0.iter().map(|i| i.to_string()).collect()
    }

    pub fn contains(&self, issue: &ValidationIssue) -> bool {
        self.0.contains(issue)
    }
}

impl fmt::Display for RegistrationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.messages().join("; "))
    }
}

impl std::error::Error for RegistrationErrors {}

/// Validates and normalizes a registration payload for the given kind.
pub fn validate(
    payload: &RegistrationRequest,
    kind: &str,
) -> Result<NewRegistrant, RegistrationErrors> {
    let kind: RegistrantKind = kind
        .parse()
        .map_err(|_| RegistrationErrors(vec![ValidationIssue::InvalidKind]))?;

    let mut issues = Vec::new();

    for field in Field::REQUIRED {
        if field.value(payload).is_none() {
            issues.push(ValidationIssue::MissingField(field));
        }
    }

    let email = Field::Email.value(payload).map(str::to_lowercase);
    if let Some(email) = &email {
        if !is_valid_email(email) {
            issues.push(ValidationIssue::InvalidEmail);
        }
    }

    let phone = Field::Phone.value(payload);
    if let Some(phone) = phone {
        if !is_valid_phone(phone) {
            issues.push(ValidationIssue::InvalidPhone);
        }
    }

    let first_name = checked_len(&mut issues, payload, Field::FirstName, NAME_MIN_LEN, NAME_MAX_LEN);
    let last_name = checked_len(&mut issues, payload, Field::LastName, NAME_MIN_LEN, NAME_MAX_LEN);
    let address = checked_len(&mut issues, payload, Field::Address, 1, ADDRESS_MAX_LEN);

    let gender: Option<Gender> = choice(&mut issues, payload, Field::Gender, "male, female");
    let marital_status: Option<MaritalStatus> = choice(
        &mut issues,
        payload,
        Field::MaritalStatus,
        "single, engaged, married",
    );
    let is_leader: Option<LeaderStatus> = choice(&mut issues, payload, Field::IsLeader, "yes, no");

    let (ministry, custom_ministry) = match is_leader {
        Some(LeaderStatus::Yes) => leader_fields(&mut issues, payload),
        _ => (None, None),
    };

    let departments = match kind {
        RegistrantKind::Volunteer => departments(&mut issues, payload.departments.as_ref()),
        RegistrantKind::Participant => Vec::new(),
    };

    match (
        first_name,
        last_name,
        email,
        phone,
        address,
        gender,
        marital_status,
        is_leader,
    ) {
        (
            Some(first_name),
            Some(last_name),
            Some(email),
            Some(phone),
            Some(address),
            Some(gender),
            Some(marital_status),
            Some(is_leader),
        ) if issues.is_empty() => Ok(NewRegistrant {
            kind,
            first_name,
            last_name,
            email,
            phone: phone.to_string(),
            address,
            gender,
            marital_status,
            is_leader,
            ministry,
            custom_ministry,
            departments,
        }),
        _ => Err(RegistrationErrors(issues)),
    }
}

/// Mints a code of the form `PAR-123456-X7KQ` / `VOL-123456-X7KQ`.
///
/// The middle part is the last six digits of the current epoch milliseconds.
/// Uniqueness is enforced by the store, not here.
pub fn generate_registration_code(kind: RegistrantKind) -> String {
    generate_registration_code_at(kind, Utc::now().timestamp_millis())
}

fn generate_registration_code_at(kind: RegistrantKind, epoch_millis: i64) -> String {
    use rand::Rng;
    let mut rng = rand::thread_rng();

    let suffix: String = (0..4)
        .map(|_| BASE36_UPPER[rng.gen_range(0..BASE36_UPPER.len())] as char)
        .collect();

    format!(
        "{}-{:06}-{}",
        kind.code_prefix(),
        epoch_millis.rem_euclid(1_000_000),
        suffix
    )
}

fn checked_len(
    issues: &mut Vec<ValidationIssue>,
    payload: &RegistrationRequest,
    field: Field,
    min: usize,
    max: usize,
) -> Option<String> {
    let value = field.value(payload)?;
    if char_len_within(value, min, max) {
        Some(value.to_string())
    } else {
        issues.push(ValidationIssue::InvalidLength { field, min, max });
        None
    }
}

fn choice<T: std::str::FromStr>(
    issues: &mut Vec<ValidationIssue>,
    payload: &RegistrationRequest,
    field: Field,
    allowed: &'static str,
) -> Option<T> {
    let value = field.value(payload)?;
    match value.parse::<T>() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            issues.push(ValidationIssue::InvalidChoice { field, allowed });
            None
        }
    }
}

fn leader_fields(
    issues: &mut Vec<ValidationIssue>,
    payload: &RegistrationRequest,
) -> (Option<String>, Option<String>) {
    let Some(ministry) = non_blank(payload.ministry.as_deref()) else {
        issues.push(ValidationIssue::MissingMinistry);
        return (None, None);
    };

    if !ministry.eq_ignore_ascii_case(OTHER_MINISTRY) {
        return (Some(ministry.to_string()), None);
    }

    match non_blank(payload.custom_ministry.as_deref()) {
        Some(custom) => (Some(OTHER_MINISTRY.to_string()), Some(custom.to_string())),
        None => {
            issues.push(ValidationIssue::MissingCustomMinistry);
            (Some(OTHER_MINISTRY.to_string()), None)
        }
    }
}

fn departments(issues: &mut Vec<ValidationIssue>, raw: Option<&Value>) -> Vec<Department> {
    let entries = match raw {
        Some(Value::Array(entries)) if !entries.is_empty() => entries,
        _ => {
            issues.push(ValidationIssue::MissingDepartments);
            return Vec::new();
        }
    };

    if entries.len() > MAX_DEPARTMENTS {
        issues.push(ValidationIssue::TooManyDepartments);
    }

    let mut selected = Vec::with_capacity(entries.len());
    for entry in entries {
        let parsed = entry.as_str().and_then(|s| s.parse::<Department>().ok());
        match parsed {
            Some(dept) if !selected.contains(&dept) => selected.push(dept),
            Some(_) => {}
            None => {
                let shown = entry
                    .as_str()
                    .map(str::to_string)
                    .unwrap_or_else(|| entry.to_string());
                issues.push(ValidationIssue::InvalidDepartment(shown));
            }
        }
    }
    selected
}
