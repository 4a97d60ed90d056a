//! Transport-agnostic request dispatcher.
//!
//! # Responsibility
//! - Route `(method, path, body)` requests onto the employee reconciler.
//! - Decode JSON request bodies and encode JSON response envelopes.
//! - Map error kinds to HTTP-style status codes.
//!
//! # Invariants
//! - Dispatch never panics; every failure becomes an error envelope.
//! - Each `EmployeeApi::handle` call opens its own connection, so no state is
//!   shared between requests.
//! - Storage driver messages never reach response bodies.

use crate::config::ApiConfig;
use employee_core::db::open_db;
use employee_core::{
    Employee, EmployeeId, EmployeeRepository, EmployeeService, ErrorKind, NewEmployee,
    PartialEmployee, ServiceError, SqliteEmployeeRepository,
};
use log::{error, info};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::time::Instant;

static COLLECTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/employees/?$").expect("valid collection regex"));
static ITEM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/employees/([^/]+)/?$").expect("valid item regex"));

pub const STATUS_OK: u16 = 200;
pub const STATUS_BAD_REQUEST: u16 = 400;
pub const STATUS_NOT_FOUND: u16 = 404;
pub const STATUS_METHOD_NOT_ALLOWED: u16 = 405;
pub const STATUS_INTERNAL_ERROR: u16 = 500;

/// Request verbs understood by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl FromStr for Method {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "DELETE" => Ok(Self::Delete),
            other => Err(format!("unsupported method `{other}`")),
        }
    }
}

impl Display for Method {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        };
        f.write_str(label)
    }
}

/// Decoded transport request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<String>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>, body: Option<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body,
        }
    }
}

/// Status code plus JSON payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    fn ok(body: impl Serialize) -> Self {
        match serde_json::to_value(body) {
            Ok(body) => Self {
                status: STATUS_OK,
                body,
            },
            Err(err) => {
                error!("event=api_encode module=api status=error error={err}");
                Self::error(STATUS_INTERNAL_ERROR, "Failed to encode response")
            }
        }
    }

    fn error(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            body: serde_json::json!({ "error": message.into() }),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == STATUS_OK
    }
}

#[derive(Serialize)]
struct EmployeeEnvelope<'a> {
    message: &'static str,
    employee: &'a Employee,
}

#[derive(Serialize)]
struct MessageEnvelope {
    message: &'static str,
}

#[derive(Debug, PartialEq, Eq)]
enum Route<'a> {
    Collection,
    Item(&'a str),
}

/// Dispatcher bound to one configured database.
pub struct EmployeeApi {
    config: ApiConfig,
}

impl EmployeeApi {
    pub fn new(config: ApiConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Opens a request-scoped connection and dispatches `request` on it.
    pub fn handle(&self, request: &ApiRequest) -> ApiResponse {
        let conn = match open_db(&self.config.db_path) {
            Ok(conn) => conn,
            Err(err) => {
                error!("event=api_request module=api status=error error_code=db_open_failed error={err}");
                return ApiResponse::error(STATUS_INTERNAL_ERROR, "Failed to open database");
            }
        };
        let repo = match SqliteEmployeeRepository::try_new(&conn) {
            Ok(repo) => repo.with_delete_policy(self.config.delete_policy),
            Err(err) => {
                error!("event=api_request module=api status=error error_code=repo_init_failed error={err}");
                return ApiResponse::error(STATUS_INTERNAL_ERROR, "Failed to open database");
            }
        };

        dispatch(&EmployeeService::new(repo), request)
    }
}

/// Routes one request onto `service`.
pub fn dispatch<R: EmployeeRepository>(
    service: &EmployeeService<R>,
    request: &ApiRequest,
) -> ApiResponse {
    let started_at = Instant::now();
    let response = route_request(service, request);
    info!(
        "event=api_request module=api method={} status={} duration_ms={}",
        request.method,
        response.status,
        started_at.elapsed().as_millis()
    );
    response
}

fn route_request<R: EmployeeRepository>(
    service: &EmployeeService<R>,
    request: &ApiRequest,
) -> ApiResponse {
    let Some(route) = parse_route(&request.path) else {
        return ApiResponse::error(STATUS_NOT_FOUND, "Route not found");
    };
    let body = request.body.as_deref().unwrap_or("");

    match (request.method, route) {
        (Method::Post, Route::Collection) => create_employee(service, body),
        (Method::Get, Route::Collection) => match service.list_employees() {
            Ok(employees) => ApiResponse::ok(&employees),
            Err(err) => error_response(&err, "Failed to retrieve employees"),
        },
        (method, Route::Item(raw_id)) => {
            let id = match parse_id(raw_id) {
                Ok(id) => id,
                Err(response) => return response,
            };
            match method {
                Method::Get => match service.get_employee(id) {
                    Ok(employee) => ApiResponse::ok(&employee),
                    Err(err) => error_response(&err, "Failed to retrieve employee"),
                },
                Method::Put => update_employee(service, id, body),
                Method::Delete => match service.delete_employee(id) {
                    Ok(()) => ApiResponse::ok(MessageEnvelope {
                        message: "Employee deleted successfully",
                    }),
                    Err(err) => error_response(&err, "Failed to delete employee"),
                },
                Method::Post => method_not_allowed(method),
            }
        }
        (method, Route::Collection) => method_not_allowed(method),
    }
}

fn create_employee<R: EmployeeRepository>(
    service: &EmployeeService<R>,
    body: &str,
) -> ApiResponse {
    let input = match NewEmployee::from_json(body) {
        Ok(input) => input,
        Err(err) => return error_response(&ServiceError::from(err), ""),
    };
    match service.create_employee(&input) {
        Ok(employee) => ApiResponse::ok(EmployeeEnvelope {
            message: "Employee created successfully",
            employee: &employee,
        }),
        Err(err) => error_response(&err, "Failed to create employee"),
    }
}

fn update_employee<R: EmployeeRepository>(
    service: &EmployeeService<R>,
    id: EmployeeId,
    body: &str,
) -> ApiResponse {
    let patch = match PartialEmployee::from_json(body) {
        Ok(patch) => patch,
        Err(err) => return error_response(&ServiceError::from(err), ""),
    };
    match service.update_employee(id, &patch) {
        Ok(employee) => ApiResponse::ok(EmployeeEnvelope {
            message: "Employee updated successfully",
            employee: &employee,
        }),
        Err(err) => error_response(&err, "Failed to update employee"),
    }
}

fn parse_route(path: &str) -> Option<Route<'_>> {
    let path = path.split('?').next().unwrap_or(path);
    if COLLECTION_RE.is_match(path) {
        return Some(Route::Collection);
    }
    ITEM_RE
        .captures(path)
        .and_then(|caps| caps.get(1))
        .map(|id| Route::Item(id.as_str()))
}

fn parse_id(raw: &str) -> Result<EmployeeId, ApiResponse> {
    raw.parse::<EmployeeId>().map_err(|_| {
        ApiResponse::error(STATUS_BAD_REQUEST, format!("invalid employee id `{raw}`"))
    })
}

fn method_not_allowed(method: Method) -> ApiResponse {
    ApiResponse::error(
        STATUS_METHOD_NOT_ALLOWED,
        format!("method {method} not allowed"),
    )
}

fn error_response(err: &ServiceError, internal_message: &'static str) -> ApiResponse {
    match err.kind() {
        ErrorKind::Validation => ApiResponse::error(STATUS_BAD_REQUEST, err.to_string()),
        ErrorKind::NotFound => ApiResponse::error(STATUS_NOT_FOUND, "Employee not found"),
        ErrorKind::Internal => ApiResponse::error(
            STATUS_INTERNAL_ERROR,
            err.context().unwrap_or(internal_message),
        ),
    }
}
