//! Persistence layer for the event registration backend.
//!
//! This crate contains:
//! - Database connection management and migrations
//! - Entity definitions (database row mappings)
//! - PostgreSQL implementations of the domain store traits
//! - An in-memory backend for development and tests

pub mod db;
pub mod entities;
pub mod memory;
pub mod metrics;
pub mod repositories;

pub use memory::{InMemoryContentStore, InMemoryRegistrantStore};
pub use repositories::{ContentRepository, RegistrantRepository};
