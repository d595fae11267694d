//! Wait command implementation.
//!
//! Polls the result endpoint until the run reaches a terminal status,
//! rendering a live spinner line on stderr. Exit codes form the
//! scripting contract: 0 when the run completed and passed its targets,
//! 2 when it completed but did not pass, 1 when it never completed.

use super::client_from_env;
use crate::api::LoadForgeApi;
use crate::cli::WaitArgs;
use crate::error::{LfError, Result};
use crate::model::RunResult;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::fmt::Write as _;
use std::time::Duration;
use tracing::debug;

/// First terminal status code; anything >= this stops the poll loop.
const STATUS_COMPLETED: i64 = 3;

/// Machine-readable summary printed once the run is terminal.
#[derive(Debug, Serialize)]
struct RunSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    updated_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    run_status: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cancelled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    test_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    requests: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    failures: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_median: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_avg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reqs_per_second: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fails_per_second: Option<f64>,
}

impl RunSummary {
    fn from_result(result: &RunResult) -> Self {
        Self {
            id: result.id,
            created_at: result.created_at.clone(),
            updated_at: result.updated_at.clone(),
            run_status: result.status_code(),
            cancelled: result.cancelled,
            duration: result.duration,
            test_id: result.test_id,
            requests: result.requests,
            failures: result.failures,
            response_median: result.response_median,
            response_avg: result.response_avg,
            response_min: result.response_min,
            response_max: result.response_max,
            reqs_per_second: result.reqs_per_second,
            fails_per_second: result.fails_per_second,
        }
    }
}

/// Execute the wait command.
///
/// # Errors
///
/// Returns `RunNotPassed` (exit 2) for a completed run that missed its
/// targets, `RunFailed` (exit 1) for launch failures and cancellations,
/// or a transport error from polling.
pub fn execute(args: &WaitArgs) -> Result<()> {
    let api = client_from_env()?;
    if args.id.trim().is_empty() {
        return Err(LfError::validation("id", "result id is required"));
    }
    let interval = Duration::from_secs(args.interval.max(1));

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.enable_steady_tick(Duration::from_millis(120));

    loop {
        let result = api.get_result(&args.id)?;
        debug!(id = %args.id, status = ?result.status_code(), "polled result");
        spinner.set_message(status_line(&result));

        let Some(status) = result.status_code().filter(|s| *s >= STATUS_COMPLETED) else {
            std::thread::sleep(interval);
            continue;
        };

        spinner.finish_and_clear();
        let summary = RunSummary::from_result(&result);

        if status == STATUS_COMPLETED {
            if result.run_passed.unwrap_or(false) {
                println!("Run completed successfully");
                println!("{}", serde_json::to_string(&summary)?);
                return Ok(());
            }
            println!("{}", serde_json::to_string(&summary)?);
            return Err(LfError::RunNotPassed);
        }

        eprintln!("Run failed to execute");
        if let Some(explanation) = failure_explanation(status) {
            eprintln!("{explanation}");
        }
        println!("{}", serde_json::to_string(&summary)?);
        return Err(LfError::RunFailed { status });
    }
}

/// Human label for a run status code.
fn status_text(status: Option<i64>) -> String {
    match status {
        Some(0) => "Queued".to_string(),
        Some(1) => "Provisioning".to_string(),
        Some(2) => "Running".to_string(),
        Some(3) => "Completed".to_string(),
        Some(4) => "Failed to launch".to_string(),
        Some(5) => "Cancelled".to_string(),
        Some(6) => "Provider limited".to_string(),
        Some(7) => "Workers failed to launch".to_string(),
        Some(other) => format!("Status {other}"),
        None => "Unknown".to_string(),
    }
}

const fn failure_explanation(status: i64) -> Option<&'static str> {
    match status {
        4 => Some("The run failed to launch"),
        5 => Some("The run was cancelled"),
        6 => Some("The run was limited by your cloud provider"),
        7 => Some("The run failed to launch its cloud workers"),
        _ => None,
    }
}

/// Rolling status line shown while polling.
fn status_line(result: &RunResult) -> String {
    let mut line = status_text(result.status_code());
    if let Some(requests) = result.requests {
        let _ = write!(line, "  reqs={requests}");
    }
    if let Some(failures) = result.failures {
        let _ = write!(line, "  fails={failures}");
    }
    if let Some(rps) = result.reqs_per_second {
        let _ = write!(line, "  rps={rps}");
    }
    if let Some(fps) = result.fails_per_second {
        let _ = write!(line, "  fps={fps}");
    }
    if let Some(avg) = result.response_avg {
        let _ = write!(line, "  avg={avg}ms");
    }
    if let Some(median) = result.response_median {
        let _ = write!(line, "  p50={median}ms");
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_text() {
        assert_eq!(status_text(Some(2)), "Running");
        assert_eq!(status_text(Some(7)), "Workers failed to launch");
        assert_eq!(status_text(Some(42)), "Status 42");
        assert_eq!(status_text(None), "Unknown");
    }

    #[test]
    fn test_status_line_includes_metrics() {
        let result = RunResult {
            run_status: Some(2),
            requests: Some(120.0),
            reqs_per_second: Some(4.5),
            ..RunResult::default()
        };
        let line = status_line(&result);
        assert!(line.starts_with("Running"));
        assert!(line.contains("reqs=120"));
        assert!(line.contains("rps=4.5"));
    }

    #[test]
    fn test_summary_drops_absent_fields() {
        let summary = RunSummary::from_result(&RunResult {
            run_status: Some(3),
            requests: Some(9.0),
            ..RunResult::default()
        });
        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"run_status\":3"));
        assert!(json.contains("\"requests\":9"));
        assert!(!json.contains("response_avg"));
    }
}
