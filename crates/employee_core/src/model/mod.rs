//! Employee aggregate domain model.
//!
//! # Responsibility
//! - Define the stored shapes of `Employee` and its owned `Address`.
//! - Define caller-facing input shapes, including the presence-aware
//!   partial update representation.
//!
//! # Invariants
//! - Identifiers are assigned by the store and never reused.
//! - Every entity carries its own `Audit` block by composition.
//! - An employee owns zero or one address.

pub mod audit;
pub mod employee;
pub mod input;
