//! Core domain logic for employee management.
//! This crate is the single source of truth for aggregate invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::audit::Audit;
pub use model::employee::{Address, AddressId, Employee, EmployeeId};
pub use model::input::{NewAddress, NewEmployee, PartialAddress, PartialEmployee};
pub use repo::employee_repo::{
    DeletePolicy, EmployeeRepository, RepoError, RepoResult, SqliteEmployeeRepository,
};
pub use service::employee_service::{EmployeeService, ErrorKind, ServiceError, ServiceResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
