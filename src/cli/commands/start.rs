//! Start command implementation.
//!
//! Starts a run for the load test whose name equals the given slug and
//! prints the run id to stdout, so scripts can pipe it into `wait`.

use super::client_from_env;
use crate::api::LoadForgeApi;
use crate::cli::StartArgs;
use crate::error::{LfError, Result};
use crate::sync::filter_load;
use serde_json::Value;
use tracing::debug;

/// Allowed run duration range in minutes.
const MIN_DURATION: u32 = 2;
const MAX_DURATION: u32 = 720;

/// Execute the start command.
///
/// # Errors
///
/// Returns an error when no load test carries the slug or the run cannot
/// be started.
pub fn execute(args: &StartArgs) -> Result<()> {
    let api = client_from_env()?;
    let duration = args.duration.clamp(MIN_DURATION, MAX_DURATION);

    let (load_tests, _) = filter_load(api.list_tests()?);
    let test = load_tests
        .into_iter()
        .find(|t| t.match_name() == Some(args.slug.as_str()))
        .ok_or_else(|| LfError::TestNotFound {
            slug: args.slug.clone(),
        })?;

    let response = api.start_run(test.id, duration)?;
    debug!(response = %response, "start run response");

    let run_id = extract_run_id(&response).ok_or_else(|| LfError::Protocol {
        endpoint: "/run".to_string(),
    })?;
    println!("{run_id}");
    Ok(())
}

/// Pull the run id out of the start response, tolerating the field
/// spellings different deployments use.
fn extract_run_id(response: &Value) -> Option<String> {
    let id = response
        .get("run_id")
        .or_else(|| response.get("result_id"))
        .or_else(|| response.get("run").and_then(|run| run.get("id")))
        .or_else(|| response.get("id"))?;
    match id {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_run_id_spellings() {
        assert_eq!(extract_run_id(&json!({"run_id": 12})), Some("12".into()));
        assert_eq!(
            extract_run_id(&json!({"result_id": "ab3"})),
            Some("ab3".into())
        );
        assert_eq!(
            extract_run_id(&json!({"run": {"id": 4}})),
            Some("4".into())
        );
        assert_eq!(extract_run_id(&json!({"id": 9})), Some("9".into()));
        assert_eq!(extract_run_id(&json!({"ok": true})), None);
    }

    #[test]
    fn test_extract_run_id_prefers_run_id() {
        let response = json!({"run_id": 1, "id": 2});
        assert_eq!(extract_run_id(&response), Some("1".into()));
    }
}
