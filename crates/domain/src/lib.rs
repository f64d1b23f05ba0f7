//! Domain layer for the event registration backend.
//!
//! This crate contains:
//! - Domain models (Registrant, ContentItem, statistics)
//! - The registration validator and registration workflow
//! - Storage and notifier interfaces implemented by outer crates

pub mod models;
pub mod repositories;
pub mod services;
