//! Line-oriented driver for the employee dispatcher.
//!
//! # Responsibility
//! - Load configuration from the environment and start logging.
//! - Read one request per stdin line as `METHOD PATH [JSON BODY]` and print
//!   `STATUS JSON` per line.
//!
//! Exits with status 1 when configuration or logging setup fails, or when
//! any request did not succeed.

use employee_api::{ApiConfig, ApiRequest, EmployeeApi, Method};
use employee_core::init_logging;
use log::info;
use serde_json::json;
use std::io::{self, BufRead, Write};
use std::process::ExitCode;

fn main() -> ExitCode {
    let config = match ApiConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("configuration error: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Some(log_dir) = config.log_dir.as_deref() {
        if let Err(err) = init_logging(&config.log_level, &log_dir.to_string_lossy()) {
            eprintln!("logging error: {err}");
            return ExitCode::FAILURE;
        }
    }

    let api = EmployeeApi::new(config);
    info!("{}", startup_line(&api));
    match run(&api, io::stdin().lock(), io::stdout().lock()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("i/o error: {err}");
            ExitCode::FAILURE
        }
    }
}

/// Dispatches every non-empty input line; returns whether all succeeded.
fn run(api: &EmployeeApi, input: impl BufRead, mut output: impl Write) -> io::Result<bool> {
    let mut all_ok = true;
    for line in input.lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        match parse_line(trimmed) {
            Ok(request) => {
                let response = api.handle(&request);
                all_ok &= response.is_success();
                writeln!(output, "{} {}", response.status, response.body)?;
            }
            Err(message) => {
                all_ok = false;
                writeln!(output, "400 {}", json!({ "error": message }))?;
            }
        }
    }
    output.flush()?;
    Ok(all_ok)
}

fn startup_line(api: &EmployeeApi) -> String {
    let config = api.config();
    format!(
        "event=cli_start module=cli status=ok core_version={} db_path={} delete_policy={:?}",
        employee_core::core_version(),
        config.db_path.display(),
        config.delete_policy
    )
}

fn parse_line(line: &str) -> Result<ApiRequest, String> {
    let mut parts = line.splitn(3, char::is_whitespace);
    let method = parts
        .next()
        .ok_or_else(|| "missing method".to_string())?
        .parse::<Method>()?;
    let path = parts
        .next()
        .map(str::trim)
        .filter(|path| !path.is_empty())
        .ok_or_else(|| "missing path".to_string())?;
    let body = parts
        .next()
        .map(str::trim)
        .filter(|body| !body.is_empty())
        .map(str::to_string);

    Ok(ApiRequest::new(method, path, body))
}
