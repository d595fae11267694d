//! Pull command implementation.
//!
//! Writes the remote inventory into the local tree layout, making the
//! tree the canonical serialization format for round-tripping tests.
//! Host references are reverse-mapped to `protocol://host:port` strings
//! best-effort; a failed host fetch just omits them.

use super::client_from_env;
use crate::api::LoadForgeApi;
use crate::cli::PullArgs;
use crate::error::Result;
use crate::local::{CONFIG_FILE, SCRIPT_FILE, sanitize_slug, write_test_folder};
use crate::model::TestConfig;
use crate::sync::filter_load;
use std::collections::HashMap;
use std::fs;
use tracing::{debug, warn};

/// Execute the pull command.
///
/// # Errors
///
/// Returns an error when the inventory fetch fails or a folder cannot be
/// written.
pub fn execute(args: &PullArgs) -> Result<()> {
    let api = client_from_env()?;
    fs::create_dir_all(&args.out)?;

    let tests = api.list_tests()?;
    if tests.is_empty() {
        println!("No tests found.");
        return Ok(());
    }
    let (load_tests, skipped) = filter_load(tests);

    // host_id -> "protocol://host:port"; supplementary, so a fetch
    // failure degrades to omitting host strings.
    let hosts_index: HashMap<i64, String> = match api.list_hosts() {
        Ok(hosts) => hosts
            .iter()
            .filter_map(|h| Some((h.id, h.host_string()?)))
            .collect(),
        Err(err) => {
            warn!(error = %err, "host list unavailable, omitting host strings");
            HashMap::new()
        }
    };

    let mut written = 0usize;
    for test in load_tests {
        let name = test
            .match_name()
            .map_or_else(|| format!("test_{}", test.id), sanitize_slug);
        let folder = args.out.join(&name);

        let config = TestConfig {
            users: test.users.clone(),
            rate: test.rate.clone(),
            servers: test.servers.clone(),
            host: test.host_id.and_then(|id| hosts_index.get(&id).cloned()),
            region: None,
            apdex_target: test.apdex_target.clone(),
            p95_target: test.p95_target.clone(),
            error_perc_target: test.error_perc_target.clone(),
            region_servers: test.region_servers.clone(),
        };
        write_test_folder(&folder, test.locustfile.as_deref().unwrap_or(""), &config)?;
        debug!(folder = %folder.display(), id = test.id, "wrote test folder");
        println!("Saved {name}/{SCRIPT_FILE} and {CONFIG_FILE}");
        written += 1;
    }

    if skipped > 0 {
        println!(
            "Done. Wrote {written} test folder(s) to {} (skipped {skipped} non-load test(s))",
            args.out.display()
        );
    } else {
        println!("Done. Wrote {written} test folder(s) to {}", args.out.display());
    }
    Ok(())
}
