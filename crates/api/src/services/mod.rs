//! Outbound integrations.

pub mod email;

pub use email::{EmailMessage, EmailService};
