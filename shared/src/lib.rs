//! Shared types and models for the cafe point-of-sale backend
//!
//! This crate contains the domain model shared between the HTTP layer,
//! the business-logic services, and the test suites.

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
