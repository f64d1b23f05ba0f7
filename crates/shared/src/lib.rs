//! Shared utilities and common types for the event registration backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Field-level validation helpers (email, phone, lengths)
//! - Key hashing and comparison for the admin API
//! - Offset pagination types

pub mod crypto;
pub mod pagination;
pub mod validation;
