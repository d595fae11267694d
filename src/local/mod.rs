//! Local test tree handling for `lf-cli`.
//!
//! This module handles:
//! - Loading: directory tree -> `LocalTest` collection (push input)
//! - Writing: test folders for `pull` and `create` scaffolding
//! - Slug sanitization for freshly minted names
//!
//! The tree layout is one folder per test holding `locustfile.py` and
//! `config.json`; the folder slug is the test's unique name.

use crate::error::{LfError, Result};
use crate::model::{LocalTest, TestConfig};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Script file name inside a test folder.
pub const SCRIPT_FILE: &str = "locustfile.py";

/// Configuration document name inside a test folder.
pub const CONFIG_FILE: &str = "config.json";

/// Longest slug produced by [`sanitize_slug`].
const MAX_SLUG_LEN: usize = 64;

/// Locustfile written into freshly scaffolded test folders.
pub const DEFAULT_LOCUSTFILE: &str = r#"from locust import HttpUser, task, between

class QuickstartUser(HttpUser):
    # Wait between 7 and 15 seconds per request per user
    wait_time = between(7, 15)

    # Timeout waiting for a reply in 10 seconds
    network_timeout = 10.0

    # Timeout waiting to connect in 5 seconds
    connection_timeout = 5.0

    @task(1)
    def index_page(self):
        # Request / on your Host
        self.client.get("/")
"#;

/// Load all test definitions under `root`.
///
/// One `LocalTest` per immediate subdirectory containing both the script
/// file and the configuration document; folders missing either are
/// silently skipped. The folder name is taken verbatim as the test name.
/// Results are sorted by name so plans are deterministic across runs.
///
/// # Errors
///
/// Fails when `root` cannot be read or a present `config.json` does not
/// parse (the error names the offending path).
pub fn load_local_tests(root: &Path) -> Result<Vec<LocalTest>> {
    let mut tests = Vec::new();
    for entry in fs::read_dir(root)? {
        let entry = entry?;
        let folder = entry.path();
        if !folder.is_dir() {
            continue;
        }
        let script_path = folder.join(SCRIPT_FILE);
        let config_path = folder.join(CONFIG_FILE);
        if !script_path.is_file() || !config_path.is_file() {
            debug!(folder = %folder.display(), "skipping folder without script + config");
            continue;
        }

        let raw = fs::read_to_string(&config_path)?;
        let config: TestConfig =
            serde_json::from_str(&raw).map_err(|e| LfError::ConfigParse {
                path: config_path.clone(),
                reason: e.to_string(),
            })?;

        let name = entry.file_name().to_string_lossy().into_owned();
        let locustfile = fs::read_to_string(&script_path)?;

        tests.push(LocalTest {
            name,
            config_path,
            config,
            locustfile,
        });
    }
    tests.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(tests)
}

/// Normalize a freshly minted name into a folder slug.
///
/// Runs of characters outside `[A-Za-z0-9_-]` collapse to a single `_`;
/// the result is truncated to 64 characters. Applied only when a name is
/// minted (pull, create scaffolding), never to existing folders on push.
#[must_use]
pub fn sanitize_slug(name: &str) -> String {
    let mut slug = String::new();
    let mut last_was_sep = false;
    for ch in name.trim().chars() {
        if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
            slug.push(ch);
            last_was_sep = false;
        } else if !last_was_sep {
            slug.push('_');
            last_was_sep = true;
        }
        if slug.len() >= MAX_SLUG_LEN {
            break;
        }
    }
    slug.truncate(MAX_SLUG_LEN);
    slug
}

/// Write one test folder (script + pretty-printed config document).
///
/// Creates the folder if needed and overwrites both files; the local tree
/// is the canonical serialization format, so pull round-trips through
/// this writer.
pub fn write_test_folder(folder: &Path, locustfile: &str, config: &TestConfig) -> Result<()> {
    fs::create_dir_all(folder)?;
    fs::write(folder.join(SCRIPT_FILE), locustfile)?;
    let mut body = serde_json::to_string_pretty(config)?;
    body.push('\n');
    fs::write(folder.join(CONFIG_FILE), body)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;

    fn write_folder(root: &Path, name: &str, script: Option<&str>, config: Option<&str>) {
        let dir = root.join(name);
        fs::create_dir_all(&dir).unwrap();
        if let Some(script) = script {
            fs::write(dir.join(SCRIPT_FILE), script).unwrap();
        }
        if let Some(config) = config {
            fs::write(dir.join(CONFIG_FILE), config).unwrap();
        }
    }

    #[test]
    fn test_load_skips_incomplete_folders() {
        let tmp = tempfile::tempdir().unwrap();
        write_folder(tmp.path(), "complete", Some("print()"), Some("{}"));
        write_folder(tmp.path(), "no-config", Some("print()"), None);
        write_folder(tmp.path(), "no-script", None, Some("{}"));
        fs::write(tmp.path().join("stray.txt"), "not a folder").unwrap();

        let tests = load_local_tests(tmp.path()).unwrap();
        assert_eq!(tests.len(), 1);
        assert_eq!(tests[0].name, "complete");
        assert_eq!(tests[0].locustfile, "print()");
    }

    #[test]
    fn test_load_parses_config_fields() {
        let tmp = tempfile::tempdir().unwrap();
        let config = json!({
            "users": 50,
            "rate": "5",
            "host": "https://example.com:443",
            "region": "us-east",
            "apdex_target": 0.9,
            "unknown_key": true,
        });
        write_folder(
            tmp.path(),
            "checkout",
            Some("pass"),
            Some(&config.to_string()),
        );

        let tests = load_local_tests(tmp.path()).unwrap();
        let config = &tests[0].config;
        assert_eq!(config.users, Some(json!(50)));
        assert_eq!(config.rate, Some(json!("5")));
        assert_eq!(config.host_str(), Some("https://example.com:443"));
        assert_eq!(config.region_str(), Some("us-east"));
    }

    #[test]
    fn test_load_fails_on_bad_config_naming_path() {
        let tmp = tempfile::tempdir().unwrap();
        write_folder(tmp.path(), "broken", Some("pass"), Some("{not json"));

        let err = load_local_tests(tmp.path()).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Invalid JSON"), "got: {message}");
        assert!(message.contains("broken"), "got: {message}");
    }

    #[test]
    fn test_load_sorted_by_name() {
        let tmp = tempfile::tempdir().unwrap();
        write_folder(tmp.path(), "zeta", Some("pass"), Some("{}"));
        write_folder(tmp.path(), "alpha", Some("pass"), Some("{}"));

        let tests = load_local_tests(tmp.path()).unwrap();
        let names: Vec<_> = tests.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["alpha", "zeta"]);
    }

    #[test]
    fn test_sanitize_slug() {
        assert_eq!(sanitize_slug("  My Test!  "), "My_Test_");
        assert_eq!(sanitize_slug("checkout-flow_v2"), "checkout-flow_v2");
        assert_eq!(sanitize_slug("a//b"), "a_b");
        assert_eq!(sanitize_slug(&"x".repeat(100)).len(), 64);
    }

    #[test]
    fn test_write_test_folder_round_trips() {
        let tmp = tempfile::tempdir().unwrap();
        let folder = tmp.path().join("smoke");
        let config = TestConfig {
            users: Some(json!(10)),
            host: Some("https://example.com:443".to_string()),
            ..TestConfig::default()
        };
        write_test_folder(&folder, "pass\n", &config).unwrap();

        let tests = load_local_tests(tmp.path()).unwrap();
        assert_eq!(tests.len(), 1);
        assert_eq!(tests[0].config.users, Some(json!(10)));
        // None fields are omitted from the document entirely.
        let raw = fs::read_to_string(folder.join(CONFIG_FILE)).unwrap();
        assert!(!raw.contains("apdex_target"));
        assert!(raw.ends_with('\n'));
    }
}
