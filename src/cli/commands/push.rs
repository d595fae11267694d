//! Push command implementation.
//!
//! Loads the local test tree, reconciles it against the remote inventory,
//! and applies the plan under the opt-in flags. The plan counts are
//! printed before any mutation; a failed item marks the run failed but
//! does not stop the remaining items.

use super::client_from_env;
use crate::cli::PushArgs;
use crate::error::{LfError, Result};
use crate::local::load_local_tests;
use crate::sync::engine::{self, PushOptions};
use tracing::debug;

/// Execute the push command.
///
/// # Errors
///
/// Returns an error when the local tree cannot be loaded, the remote
/// inventory fetch fails, or any planned item failed to apply.
pub fn execute(args: &PushArgs) -> Result<()> {
    let api = client_from_env()?;
    let local = load_local_tests(&args.dir)?;
    debug!(count = local.len(), dir = %args.dir.display(), "loaded local tests");

    let options = PushOptions {
        dry_run: args.dry_run,
        allow_create: args.allow_create,
        allow_delete: args.allow_delete,
        try_extended: !args.no_extended,
    };

    let report = engine::push(&api, local, options)?;
    if report.success() {
        Ok(())
    } else {
        Err(LfError::PushIncomplete {
            failed: report.failed,
        })
    }
}
