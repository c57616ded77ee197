//! service-core: Shared infrastructure for the signup-gate functions.
pub mod config;
pub mod error;
pub mod observability;
