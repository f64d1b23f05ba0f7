//! HTTP service for event registration: public sign-up and status lookup,
//! a content catalogue, and admin check-in and dashboard endpoints.

pub mod app;
pub mod config;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod routes;
pub mod services;
