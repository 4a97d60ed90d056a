//! Request dispatcher for the employee core.
//!
//! # Responsibility
//! - Expose the employee use-cases to transport adapters as plain
//!   request/response values.
//! - Own environment configuration for binaries.

pub mod api;
pub mod config;

pub use api::{dispatch, ApiRequest, ApiResponse, EmployeeApi, Method};
pub use config::{ApiConfig, ConfigError};
