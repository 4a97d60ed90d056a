//! Employee repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide the aggregate-level CRUD surface over `employees`/`addresses`.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - `created_at` columns are only written by `INSERT`.
//! - Every write moves `updated_at` to `max(previous + 1, now)`.
//! - Every multi-statement write runs inside a single transaction.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::audit::Audit;
use crate::model::employee::{Address, AddressId, Employee, EmployeeId};
use crate::model::input::NewEmployee;
use rusqlite::{params, Connection, Row};
use thiserror::Error;

const NOW_MS_SQL: &str = "CAST(unixepoch('subsec') * 1000 AS INTEGER)";

const EMPLOYEE_SELECT_SQL: &str = "SELECT
    e.id,
    e.name,
    e.position,
    e.salary,
    e.created_at,
    e.updated_at,
    e.deleted_at
FROM employees e
WHERE e.deleted_at IS NULL";

const AGGREGATE_SELECT_SQL: &str = "SELECT
    e.id,
    e.name,
    e.position,
    e.salary,
    e.created_at,
    e.updated_at,
    e.deleted_at,
    a.id AS address_id,
    a.street AS address_street,
    a.city AS address_city,
    a.state AS address_state,
    a.zip AS address_zip,
    a.created_at AS address_created_at,
    a.updated_at AS address_updated_at,
    a.deleted_at AS address_deleted_at
FROM employees e
LEFT JOIN addresses a
    ON a.employee_id = e.id
   AND a.deleted_at IS NULL
WHERE e.deleted_at IS NULL";

pub type RepoResult<T> = Result<T, RepoError>;

/// Storage Port error for employee persistence and query operations.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("employee not found: {0}")]
    NotFound(EmployeeId),
    #[error("connection schema version {actual_version} does not match expected {expected_version}")]
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    #[error("connection has foreign key enforcement disabled")]
    ForeignKeysDisabled,
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// How `delete_employee` removes rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeletePolicy {
    /// Stamp `deleted_at` on the employee and its address.
    #[default]
    Soft,
    /// Remove the employee row; `ON DELETE CASCADE` removes the address.
    Hard,
}

/// Storage Port for the employee aggregate.
///
/// Each call is one unit of work; implementations decide pooling and
/// transaction boundaries within a call.
pub trait EmployeeRepository {
    /// Inserts an employee and, when not blank, its address.
    fn insert_employee(&self, employee: &NewEmployee) -> RepoResult<EmployeeId>;
    /// Loads one live employee, optionally with its live address.
    fn find_employee(&self, id: EmployeeId, include_address: bool)
        -> RepoResult<Option<Employee>>;
    /// Loads every live employee in store order.
    fn list_employees(&self, include_address: bool) -> RepoResult<Vec<Employee>>;
    /// Rewrites the scalar employee columns, leaving `created_at` untouched.
    fn save_employee(&self, employee: &Employee) -> RepoResult<()>;
    /// Upserts an address row by primary key and returns its id.
    fn save_address(&self, address: &Address) -> RepoResult<AddressId>;
    /// Removes a live employee together with its address.
    fn delete_employee(&self, id: EmployeeId) -> RepoResult<()>;
}

/// SQLite-backed employee repository.
pub struct SqliteEmployeeRepository<'conn> {
    conn: &'conn Connection,
    delete_policy: DeletePolicy,
}

impl<'conn> SqliteEmployeeRepository<'conn> {
    /// Constructs a repository from a migrated connection with foreign keys on.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self {
            conn,
            delete_policy: DeletePolicy::default(),
        })
    }

    /// Selects how deletes are carried out.
    pub fn with_delete_policy(mut self, delete_policy: DeletePolicy) -> Self {
        self.delete_policy = delete_policy;
        self
    }

    pub fn delete_policy(&self) -> DeletePolicy {
        self.delete_policy
    }
}

impl EmployeeRepository for SqliteEmployeeRepository<'_> {
    fn insert_employee(&self, employee: &NewEmployee) -> RepoResult<EmployeeId> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO employees (name, position, salary) VALUES (?1, ?2, ?3);",
            params![
                employee.name.as_str(),
                employee.position.as_str(),
                employee.salary
            ],
        )?;
        let id = tx.last_insert_rowid();

        let address = &employee.address;
        if !address.is_blank() {
            tx.execute(
                "INSERT INTO addresses (street, city, state, zip, employee_id)
                 VALUES (?1, ?2, ?3, ?4, ?5);",
                params![
                    address.street.as_str(),
                    address.city.as_str(),
                    address.state.as_str(),
                    address.zip.as_str(),
                    id
                ],
            )?;
        }

        tx.commit()?;
        Ok(id)
    }

    fn find_employee(
        &self,
        id: EmployeeId,
        include_address: bool,
    ) -> RepoResult<Option<Employee>> {
        let base = if include_address {
            AGGREGATE_SELECT_SQL
        } else {
            EMPLOYEE_SELECT_SQL
        };
        let mut stmt = self.conn.prepare(&format!("{base} AND e.id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_employee_row(row, include_address)?));
        }

        Ok(None)
    }

    fn list_employees(&self, include_address: bool) -> RepoResult<Vec<Employee>> {
        let base = if include_address {
            AGGREGATE_SELECT_SQL
        } else {
            EMPLOYEE_SELECT_SQL
        };
        let mut stmt = self.conn.prepare(&format!("{base} ORDER BY e.id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut employees = Vec::new();
        while let Some(row) = rows.next()? {
            employees.push(parse_employee_row(row, include_address)?);
        }

        Ok(employees)
    }

    fn save_employee(&self, employee: &Employee) -> RepoResult<()> {
        let changed = self.conn.execute(
            &format!(
                "UPDATE employees
                 SET
                    name = ?1,
                    position = ?2,
                    salary = ?3,
                    updated_at = MAX(updated_at + 1, {NOW_MS_SQL})
                 WHERE id = ?4
                   AND deleted_at IS NULL;"
            ),
            params![
                employee.name.as_str(),
                employee.position.as_str(),
                employee.salary,
                employee.id
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(employee.id));
        }

        Ok(())
    }

    fn save_address(&self, address: &Address) -> RepoResult<AddressId> {
        self.conn.execute(
            &format!(
                "INSERT INTO addresses (id, street, city, state, zip, employee_id, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, {NOW_MS_SQL})
                 ON CONFLICT (id) DO UPDATE SET
                    street = excluded.street,
                    city = excluded.city,
                    state = excluded.state,
                    zip = excluded.zip,
                    employee_id = excluded.employee_id,
                    updated_at = MAX(addresses.updated_at + 1, excluded.updated_at);"
            ),
            params![
                address.id,
                address.street.as_str(),
                address.city.as_str(),
                address.state.as_str(),
                address.zip.as_str(),
                address.employee_id
            ],
        )?;

        Ok(address.id.unwrap_or_else(|| self.conn.last_insert_rowid()))
    }

    fn delete_employee(&self, id: EmployeeId) -> RepoResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        let changed = match self.delete_policy {
            DeletePolicy::Soft => {
                let changed = tx.execute(
                    &format!(
                        "UPDATE employees
                         SET
                            deleted_at = {NOW_MS_SQL},
                            updated_at = MAX(updated_at + 1, {NOW_MS_SQL})
                         WHERE id = ?1
                           AND deleted_at IS NULL;"
                    ),
                    [id],
                )?;
                tx.execute(
                    &format!(
                        "UPDATE addresses
                         SET
                            deleted_at = {NOW_MS_SQL},
                            updated_at = MAX(updated_at + 1, {NOW_MS_SQL})
                         WHERE employee_id = ?1
                           AND deleted_at IS NULL;"
                    ),
                    [id],
                )?;
                changed
            }
            DeletePolicy::Hard => tx.execute(
                "DELETE FROM employees WHERE id = ?1 AND deleted_at IS NULL;",
                [id],
            )?,
        };

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        tx.commit()?;
        Ok(())
    }
}

fn parse_employee_row(row: &Row<'_>, include_address: bool) -> RepoResult<Employee> {
    let id: EmployeeId = row.get("id")?;
    let address = if include_address {
        parse_address_columns(row, id)?
    } else {
        None
    };

    Ok(Employee {
        id,
        name: row.get("name")?,
        position: row.get("position")?,
        salary: row.get("salary")?,
        address,
        audit: Audit {
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
            deleted_at: row.get("deleted_at")?,
        },
    })
}

fn parse_address_columns(row: &Row<'_>, employee_id: EmployeeId) -> RepoResult<Option<Address>> {
    let Some(address_id) = row.get::<_, Option<AddressId>>("address_id")? else {
        return Ok(None);
    };

    let address = Address {
        id: Some(address_id),
        street: row.get("address_street")?,
        city: row.get("address_city")?,
        state: row.get("address_state")?,
        zip: row.get("address_zip")?,
        employee_id,
        audit: Audit {
            created_at: row.get("address_created_at")?,
            updated_at: row.get("address_updated_at")?,
            deleted_at: row.get("address_deleted_at")?,
        },
    };

    Ok(Some(address))
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let foreign_keys: i64 = conn.query_row("PRAGMA foreign_keys;", [], |row| row.get(0))?;
    if foreign_keys != 1 {
        return Err(RepoError::ForeignKeysDisabled);
    }

    Ok(())
}
