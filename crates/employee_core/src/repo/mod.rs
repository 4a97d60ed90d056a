//! Storage Port abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the persistence contract consumed by the reconciler.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Default reads never return soft-deleted rows.
//! - Deleting an employee removes its address in the same transaction.
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.

pub mod employee_repo;
