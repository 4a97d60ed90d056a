//! Stored employee aggregate.
//!
//! # Invariants
//! - `Employee::address`, when present, belongs to that employee only:
//!   `address.employee_id == employee.id` for every value read from storage.
//! - An address is written during updates only when `is_writable()` holds.

use super::audit::Audit;
use serde::{Deserialize, Serialize};

/// Store-assigned employee identifier.
pub type EmployeeId = i64;

/// Store-assigned address identifier.
pub type AddressId = i64;

/// Aggregate root: an employee together with its optional address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    pub position: String,
    /// Non-negative by convention only; not enforced.
    pub salary: f64,
    pub address: Option<Address>,
    #[serde(flatten)]
    pub audit: Audit,
}

/// Address owned by exactly one employee.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// `None` until the address has been persisted.
    pub id: Option<AddressId>,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub employee_id: EmployeeId,
    #[serde(flatten)]
    pub audit: Audit,
}

impl Address {
    /// Creates an empty, not yet persisted address linked to `employee_id`.
    pub fn unsaved(employee_id: EmployeeId) -> Self {
        Self {
            employee_id,
            ..Self::default()
        }
    }

    /// Returns whether this address may be written by an update.
    ///
    /// Both `street` and `city` must be non-empty. Updating only `zip` or
    /// `state` therefore leaves the stored address untouched.
    pub fn is_writable(&self) -> bool {
        !self.street.is_empty() && !self.city.is_empty()
    }
}
