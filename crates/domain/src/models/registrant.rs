//! Registrant domain model (participants and volunteers).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Discriminant for the two kinds of registrant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrantKind {
    Participant,
    Volunteer,
}

impl RegistrantKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistrantKind::Participant => "participant",
            RegistrantKind::Volunteer => "volunteer",
        }
    }

    /// Prefix used when minting registration codes.
    pub fn code_prefix(&self) -> &'static str {
        match self {
            RegistrantKind::Participant => "PAR",
            RegistrantKind::Volunteer => "VOL",
        }
    }
}

impl fmt::Display for RegistrantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegistrantKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "participant" => Ok(RegistrantKind::Participant),
            "volunteer" => Ok(RegistrantKind::Volunteer),
            other => Err(format!("Unknown registrant type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            other => Err(format!("Unknown gender: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaritalStatus {
    Single,
    Engaged,
    Married,
}

impl MaritalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MaritalStatus::Single => "single",
            MaritalStatus::Engaged => "engaged",
            MaritalStatus::Married => "married",
        }
    }
}

impl FromStr for MaritalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "single" => Ok(MaritalStatus::Single),
            "engaged" => Ok(MaritalStatus::Engaged),
            "married" => Ok(MaritalStatus::Married),
            other => Err(format!("Unknown marital status: {}", other)),
        }
    }
}

/// Whether the registrant heads a ministry (`yes`/`no` on the wire).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeaderStatus {
    Yes,
    No,
}

impl LeaderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeaderStatus::Yes => "yes",
            LeaderStatus::No => "no",
        }
    }

    pub fn is_leader(&self) -> bool {
        matches!(self, LeaderStatus::Yes)
    }
}

impl FromStr for LeaderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "yes" => Ok(LeaderStatus::Yes),
            "no" => Ok(LeaderStatus::No),
            other => Err(format!("Unknown leader status: {}", other)),
        }
    }
}

/// Volunteer departments (closed vocabulary).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Department {
    Media,
    Protocol,
    Logistics,
    Welfare,
    Technical,
    Security,
    Registration,
    Prayer,
    Creative,
    Medical,
}

impl Department {
    pub const ALL: [Department; 10] = [
        Department::Media,
        Department::Protocol,
        Department::Logistics,
        Department::Welfare,
        Department::Technical,
        Department::Security,
        Department::Registration,
        Department::Prayer,
        Department::Creative,
        Department::Medical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Department::Media => "media",
            Department::Protocol => "protocol",
            Department::Logistics => "logistics",
            Department::Welfare => "welfare",
            Department::Technical => "technical",
            Department::Security => "security",
            Department::Registration => "registration",
            Department::Prayer => "prayer",
            Department::Creative => "creative",
            Department::Medical => "medical",
        }
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Department {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        Department::ALL
            .iter()
            .copied()
            .find(|d| d.as_str() == needle)
            .ok_or_else(|| format!("Unknown department: {}", s))
    }
}

/// Raw registration submission as received from the form.
///
/// Every field is optional here; the validator decides what is missing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub gender: Option<String>,
    pub marital_status: Option<String>,
    pub is_leader: Option<String>,
    pub ministry: Option<String>,
    pub custom_ministry: Option<String>,
    /// Kept untyped so a non-array value reports as missing departments.
    pub departments: Option<serde_json::Value>,
}

/// A validated, normalized registrant ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRegistrant {
    pub kind: RegistrantKind,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub gender: Gender,
    pub marital_status: MaritalStatus,
    pub is_leader: LeaderStatus,
    pub ministry: Option<String>,
    pub custom_ministry: Option<String>,
    pub departments: Vec<Department>,
}

/// A stored registrant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registrant {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: RegistrantKind,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub gender: Gender,
    pub marital_status: MaritalStatus,
    pub is_leader: LeaderStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ministry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_ministry: Option<String>,
    pub departments: Vec<Department>,
    pub registration_code: String,
    pub is_confirmed: bool,
    pub check_in_status: bool,
    pub check_in_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Result of a check-in attempt. Both variants are successes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckInOutcome {
    CheckedIn(Registrant),
    AlreadyCheckedIn(Registrant),
}

impl CheckInOutcome {
    pub fn registrant(&self) -> &Registrant {
        match self {
            CheckInOutcome::CheckedIn(r) | CheckInOutcome::AlreadyCheckedIn(r) => r,
        }
    }

    pub fn into_registrant(self) -> Registrant {
        match self {
            CheckInOutcome::CheckedIn(r) | CheckInOutcome::AlreadyCheckedIn(r) => r,
        }
    }

    pub fn was_already_checked_in(&self) -> bool {
        matches!(self, CheckInOutcome::AlreadyCheckedIn(_))
    }

    pub fn message(&self) -> &'static str {
        match self {
            CheckInOutcome::CheckedIn(_) => "Checked in successfully",
            CheckInOutcome::AlreadyCheckedIn(_) => "Already checked in",
        }
    }
}

impl Registrant {
    /// Creates the stored form of a new registrant. Auto-confirmed.
    pub fn from_new(new: NewRegistrant, registration_code: String, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: new.kind,
            first_name: new.first_name,
            last_name: new.last_name,
            email: new.email,
            phone: new.phone,
            address: new.address,
            gender: new.gender,
            marital_status: new.marital_status,
            is_leader: new.is_leader,
            ministry: new.ministry,
            custom_ministry: new.custom_ministry,
            departments: new.departments,
            registration_code,
            is_confirmed: true,
            check_in_status: false,
            check_in_time: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Marks the registrant as checked in.
    ///
    /// A second call leaves `check_in_time` untouched.
    pub fn check_in(mut self, now: DateTime<Utc>) -> CheckInOutcome {
        if self.check_in_status {
            return CheckInOutcome::AlreadyCheckedIn(self);
        }
        self.check_in_status = true;
        self.check_in_time = Some(now);
        self.updated_at = now;
        CheckInOutcome::CheckedIn(self)
    }

    /// Marks the registrant as confirmed. Returns `true` if this changed anything.
    pub fn confirm(&mut self, now: DateTime<Utc>) -> bool {
        if self.is_confirmed {
            return false;
        }
        self.is_confirmed = true;
        self.updated_at = now;
        true
    }
}

/// Response payload for a successful registration.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(rename = "type")]
    pub kind: RegistrantKind,
    pub registration_code: String,
    pub is_confirmed: bool,
    pub email_sent: bool,
}

impl RegistrationResponse {
    pub fn new(registrant: &Registrant, email_sent: bool) -> Self {
        Self {
            id: registrant.id,
            name: registrant.full_name(),
            email: registrant.email.clone(),
            kind: registrant.kind,
            registration_code: registrant.registration_code.clone(),
            is_confirmed: registrant.is_confirmed,
            email_sent,
        }
    }
}

/// Public view of a registration, looked up by code.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationStatus {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: RegistrantKind,
    pub registration_code: String,
    pub is_confirmed: bool,
    pub check_in_status: bool,
    pub check_in_time: Option<DateTime<Utc>>,
    pub departments: Vec<Department>,
}

impl From<Registrant> for RegistrationStatus {
    fn from(r: Registrant) -> Self {
        Self {
            name: r.full_name(),
            kind: r.kind,
            registration_code: r.registration_code,
            is_confirmed: r.is_confirmed,
            check_in_status: r.check_in_status,
            check_in_time: r.check_in_time,
            departments: r.departments,
        }
    }
}
