//! Domain models for the event registration backend.

pub mod content;
pub mod registrant;
pub mod stats;

pub use content::{ContentCounter, ContentItem, ContentKind, CreateContentRequest};
pub use registrant::{
    CheckInOutcome, Department, Gender, LeaderStatus, MaritalStatus, NewRegistrant, Registrant,
    RegistrantKind, RegistrationRequest, RegistrationResponse, RegistrationStatus,
};
pub use stats::{ContentStats, DashboardStats, RegistrationStats};
