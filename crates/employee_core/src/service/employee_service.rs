//! Employee aggregate reconciler.
//!
//! # Responsibility
//! - Create, read, partially update and delete employee aggregates.
//! - Keep the address linked to its owner and gated on update.
//! - Classify repository failures into `ErrorKind`s.
//!
//! # Invariants
//! - The service holds no state besides its repository.
//! - Every successful write is followed by a read-back, so callers always
//!   receive persisted values.
//! - Update writes the employee and the address as two separate repository
//!   calls. An address failure after the employee write is reported as a
//!   single failure; the employee write is not rolled back.

use crate::model::employee::{Employee, EmployeeId};
use crate::model::input::{NewEmployee, PartialEmployee};
use crate::repo::employee_repo::{EmployeeRepository, RepoError};
use log::{debug, error, info, warn};
use std::time::Instant;
use thiserror::Error;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Failure classification handed to the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Input could not be decoded into the expected shape.
    Validation,
    /// Identifier does not resolve to a live employee.
    NotFound,
    /// Storage failure or inconsistent state.
    Internal,
}

/// Reconciler error.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid input: {0}")]
    Validation(String),
    #[error("employee not found: {0}")]
    NotFound(EmployeeId),
    #[error("{context}: {source}")]
    Storage {
        context: &'static str,
        #[source]
        source: RepoError,
    },
    #[error("inconsistent employee state: {0}")]
    InconsistentState(&'static str),
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Storage { .. } | Self::InconsistentState(_) => ErrorKind::Internal,
        }
    }

    /// Caller-safe summary of a storage failure, without driver details.
    pub fn context(&self) -> Option<&'static str> {
        match self {
            Self::Storage { context, .. } => Some(*context),
            _ => None,
        }
    }

    fn storage(context: &'static str) -> impl FnOnce(RepoError) -> Self {
        move |err| match err {
            RepoError::NotFound(id) => Self::NotFound(id),
            source => Self::Storage { context, source },
        }
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(value: serde_json::Error) -> Self {
        Self::Validation(value.to_string())
    }
}

/// Use-case service over an injected employee repository.
pub struct EmployeeService<R: EmployeeRepository> {
    repo: R,
}

impl<R: EmployeeRepository> EmployeeService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Persists a new employee and returns it as stored.
    pub fn create_employee(&self, input: &NewEmployee) -> ServiceResult<Employee> {
        let started_at = Instant::now();
        let id = self
            .repo
            .insert_employee(input)
            .map_err(ServiceError::storage("Failed to create employee"))
            .inspect_err(|err| log_failure("employee_create", None, err))?;

        let employee = self.read_back(id, "created employee not found in read-back")?;
        info!(
            "event=employee_create module=service status=ok employee_id={id} has_address={} duration_ms={}",
            employee.address.is_some(),
            started_at.elapsed().as_millis()
        );
        Ok(employee)
    }

    /// Gets one live employee with its address.
    pub fn get_employee(&self, id: EmployeeId) -> ServiceResult<Employee> {
        self.load(id)
            .inspect_err(|err| log_failure("employee_get", Some(id), err))
    }

    /// Lists every live employee with its address.
    pub fn list_employees(&self) -> ServiceResult<Vec<Employee>> {
        let employees = self
            .repo
            .list_employees(true)
            .map_err(ServiceError::storage("Failed to retrieve employees"))
            .inspect_err(|err| log_failure("employee_list", None, err))?;
        debug!(
            "event=employee_list module=service status=ok count={}",
            employees.len()
        );
        Ok(employees)
    }

    /// Applies a partial update and returns the persisted aggregate.
    ///
    /// # Contract
    /// - Fields absent from `patch` keep their stored values.
    /// - `created_at` is never written.
    /// - The address is written only when street and city are both
    ///   non-empty after the merge; otherwise the stored address stays as is.
    pub fn update_employee(
        &self,
        id: EmployeeId,
        patch: &PartialEmployee,
    ) -> ServiceResult<Employee> {
        self.reconcile(id, patch)
            .inspect_err(|err| log_failure("employee_update", Some(id), err))
    }

    /// Decodes `body` as a partial update and applies it.
    ///
    /// Undecodable input fails with `ErrorKind::Validation` before storage is
    /// touched.
    pub fn update_employee_json(&self, id: EmployeeId, body: &str) -> ServiceResult<Employee> {
        let patch = PartialEmployee::from_json(body)?;
        self.update_employee(id, &patch)
    }

    /// Deletes an employee and its address.
    pub fn delete_employee(&self, id: EmployeeId) -> ServiceResult<()> {
        self.repo
            .delete_employee(id)
            .map_err(ServiceError::storage("Failed to delete employee"))
            .inspect_err(|err| log_failure("employee_delete", Some(id), err))?;
        info!("event=employee_delete module=service status=ok employee_id={id}");
        Ok(())
    }

    fn reconcile(&self, id: EmployeeId, patch: &PartialEmployee) -> ServiceResult<Employee> {
        let started_at = Instant::now();
        let mut employee = self.load(id)?;
        patch.merge_into(&mut employee);

        self.repo
            .save_employee(&employee)
            .map_err(ServiceError::storage("Failed to update employee"))?;

        let mut address_written = false;
        if let Some(address) = employee.address.as_mut().filter(|address| address.is_writable()) {
            address.employee_id = id;
            self.repo
                .save_address(address)
                .map_err(ServiceError::storage("Failed to update address"))?;
            address_written = true;
        } else if patch.address.is_some() {
            debug!("event=address_gate module=service status=skipped employee_id={id}");
        }

        let employee = self.read_back(id, "updated employee not found in read-back")?;
        info!(
            "event=employee_update module=service status=ok employee_id={id} address_written={address_written} duration_ms={}",
            started_at.elapsed().as_millis()
        );
        Ok(employee)
    }

    fn load(&self, id: EmployeeId) -> ServiceResult<Employee> {
        self.repo
            .find_employee(id, true)
            .map_err(ServiceError::storage("Failed to retrieve employee"))?
            .ok_or(ServiceError::NotFound(id))
    }

    fn read_back(&self, id: EmployeeId, missing: &'static str) -> ServiceResult<Employee> {
        self.repo
            .find_employee(id, true)
            .map_err(ServiceError::storage("Failed to read back employee"))?
            .ok_or(ServiceError::InconsistentState(missing))
    }
}

fn log_failure(event: &str, id: Option<EmployeeId>, err: &ServiceError) {
    let employee_id = id.map_or_else(|| "-".to_string(), |id| id.to_string());
    match err.kind() {
        ErrorKind::Internal => error!(
            "event={event} module=service status=error employee_id={employee_id} error={err}"
        ),
        kind => warn!(
            "event={event} module=service status=rejected employee_id={employee_id} kind={kind:?}"
        ),
    }
}
