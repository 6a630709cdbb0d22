//! # API Shared
//!
//! Shared wire types for the vault APIs.
//!
//! Contains:
//! - Request/response bodies (`dto` module) with OpenAPI schemas
//! - Shared services like `HealthService`
//!
//! Used by `api-rest` and the CLI so both speak the same JSON shapes.

pub mod dto;
pub mod health;

pub use dto::*;
pub use health::HealthService;
