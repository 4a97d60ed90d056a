//! Timestamp and soft-delete bookkeeping shared by stored entities.

use serde::{Deserialize, Serialize};

/// Lifecycle timestamps embedded by every persisted entity.
///
/// All values are Unix epoch milliseconds assigned by the store.
///
/// # Invariants
/// - `created_at` is written once and never changed by updates.
/// - `updated_at` never moves backwards.
/// - `deleted_at` is `Some` only for soft-deleted (tombstoned) rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Audit {
    pub created_at: i64,
    pub updated_at: i64,
    pub deleted_at: Option<i64>,
}

impl Audit {
    /// Returns whether the row is visible to default reads.
    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }
}
