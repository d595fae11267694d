//! Plan execution for `push`.
//!
//! Applies a [`ReconcilePlan`] in a fixed phase order: updates, then
//! creates, then deletes. Updates are idempotent and safest to retry
//! first; creates see the freshest host cache; deletes are the most
//! destructive and run last so an earlier failure never causes
//! unintended data loss. Item failures are reported and counted but do
//! not abort the run; the aggregate report drives the exit status.

use crate::api::LoadForgeApi;
use crate::error::{LfError, Result};
use crate::model::{JsonMap, LocalTest, RemoteTest};
use crate::sync::hosts::HostCache;
use crate::sync::payload::{PayloadTier, build_payload};
use crate::sync::{ReconcilePlan, filter_load, reconcile};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

/// Flags controlling one push run. Creating and deleting remote tests
/// are opt-in; everything defaults to the safe side.
#[derive(Debug, Clone, Copy)]
pub struct PushOptions {
    /// Report the plan and mutate nothing.
    pub dry_run: bool,
    /// Allow creating tests that do not exist remotely.
    pub allow_create: bool,
    /// Allow deleting remote tests not present locally.
    pub allow_delete: bool,
    /// Send the extended quality-target fields, falling back on 400.
    pub try_extended: bool,
}

impl Default for PushOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            allow_create: false,
            allow_delete: false,
            try_extended: true,
        }
    }
}

/// Aggregate outcome of one push run.
#[derive(Debug, Default, Serialize)]
pub struct PushReport {
    pub planned_updates: usize,
    pub planned_creates: usize,
    pub planned_deletes: usize,
    pub updated: usize,
    /// Items that succeeded only after dropping the extended fields.
    pub degraded: usize,
    pub created: usize,
    pub deleted: usize,
    pub skipped_creates: usize,
    pub skipped_deletes: usize,
    pub failed: usize,
}

impl PushReport {
    /// Whether every planned, non-skipped item applied cleanly or
    /// degraded; the CLI exits non-zero otherwise.
    #[must_use]
    pub const fn success(&self) -> bool {
        self.failed == 0
    }
}

/// How a single item landed.
enum Applied {
    Full,
    Degraded,
}

/// Reconcile the local tree against the remote inventory and apply the
/// resulting plan.
///
/// # Errors
///
/// Fails fast only on protocol-level problems (the initial inventory
/// fetch); per-item failures are absorbed into the report.
pub fn push(api: &dyn LoadForgeApi, local: Vec<LocalTest>, options: PushOptions) -> Result<PushReport> {
    let remote_all = api.list_tests()?;
    let (remote, skipped_non_load) = filter_load(remote_all);
    if skipped_non_load > 0 {
        debug!(skipped_non_load, "ignoring non-load remote tests");
    }

    let plan = reconcile(local, remote);
    let mut report = PushReport {
        planned_updates: plan.updates.len(),
        planned_creates: plan.creates.len(),
        planned_deletes: plan.deletes.len(),
        ..PushReport::default()
    };
    println!(
        "Plan: update={}, create={}, delete={}",
        report.planned_updates, report.planned_creates, report.planned_deletes
    );

    if options.dry_run {
        println!("(dry-run) No changes will be applied.");
        return Ok(report);
    }

    let mut hosts = HostCache::preload(api);
    apply_plan(api, &mut hosts, plan, options, &mut report);
    Ok(report)
}

fn apply_plan(
    api: &dyn LoadForgeApi,
    hosts: &mut HostCache,
    plan: ReconcilePlan,
    options: PushOptions,
    report: &mut PushReport,
) {
    for (local, remote) in plan.updates {
        match update_one(api, hosts, &local, &remote, options) {
            Ok(Applied::Full) => {
                report.updated += 1;
                println!("Updated test '{}' (id={})", local.name, remote.id);
            }
            Ok(Applied::Degraded) => {
                report.updated += 1;
                report.degraded += 1;
                eprintln!(
                    "Updated test '{}' (id={}) with base fields only (extended fields not accepted).",
                    local.name, remote.id
                );
            }
            Err(err) => {
                report.failed += 1;
                eprintln!("[ERROR] update failed for '{}': {err}", local.name);
            }
        }
    }

    for local in plan.creates {
        if !options.allow_create {
            report.skipped_creates += 1;
            eprintln!(
                "Skipping create for '{}' (use --allow-create to enable).",
                local.name
            );
            continue;
        }
        match create_one(api, hosts, &local, options) {
            Ok(Applied::Full) => {
                report.created += 1;
                println!("Created test '{}'", local.name);
            }
            Ok(Applied::Degraded) => {
                report.created += 1;
                report.degraded += 1;
                eprintln!(
                    "Created test '{}' with base fields only (extended fields not accepted).",
                    local.name
                );
            }
            Err(err) => {
                report.failed += 1;
                eprintln!("[ERROR] create failed for '{}': {err}", local.name);
            }
        }
    }

    if plan.deletes.is_empty() {
        return;
    }
    if !options.allow_delete {
        report.skipped_deletes = plan.deletes.len();
        eprintln!(
            "Skipping deletion of {} test(s) (use --allow-delete to enable).",
            plan.deletes.len()
        );
        return;
    }
    for remote in plan.deletes {
        let name = remote.match_name().unwrap_or("<unnamed>").to_string();
        match api.delete_test(remote.id) {
            Ok(_) => {
                report.deleted += 1;
                println!("Deleted test '{name}' (id={})", remote.id);
            }
            Err(err) => {
                report.failed += 1;
                eprintln!("[ERROR] delete failed for '{name}': {err}");
            }
        }
    }
}

/// Initial tier for a run's first attempt.
const fn initial_tier(options: PushOptions) -> PayloadTier {
    if options.try_extended {
        PayloadTier::Full
    } else {
        PayloadTier::Base
    }
}

fn update_one(
    api: &dyn LoadForgeApi,
    hosts: &mut HostCache,
    local: &LocalTest,
    remote: &RemoteTest,
    options: PushOptions,
) -> Result<Applied> {
    let tier = initial_tier(options);
    let mut payload = build_payload(local, tier, Some(remote), true);

    // Host from the local config wins; otherwise preserve the remote's
    // existing reference rather than clearing it.
    if let Some(host_str) = local.config.host_str() {
        let host_id = hosts.resolve(api, host_str)?;
        payload.insert("host_id".to_string(), Value::from(host_id));
    } else if let Some(host_id) = remote.host_id {
        payload.insert("host_id".to_string(), Value::from(host_id));
    }

    debug_payload("update", &local.name, &payload);
    match api.update_test(remote.id, &payload) {
        Ok(_) => Ok(Applied::Full),
        Err(err) => match tier.fallback_for(err.api_status()) {
            Some(retry_tier) => {
                warn!(test = %local.name, "extended fields rejected, retrying with base payload");
                // Name is immutable on update; the retry drops it.
                let retry = build_payload(local, retry_tier, Some(remote), false);
                debug_payload("update retry", &local.name, &retry);
                api.update_test(remote.id, &retry)?;
                Ok(Applied::Degraded)
            }
            None => Err(err),
        },
    }
}

fn create_one(
    api: &dyn LoadForgeApi,
    hosts: &mut HostCache,
    local: &LocalTest,
    options: PushOptions,
) -> Result<Applied> {
    // Pre-flight: creation requires a region, checked before any network
    // call for this item.
    if local.config.region_str().is_none() {
        return Err(LfError::MissingRegion {
            path: local.config_path.clone(),
        });
    }

    let tier = initial_tier(options);
    let mut payload = build_payload(local, tier, None, true);
    if let Some(host_str) = local.config.host_str() {
        let host_id = hosts.resolve(api, host_str)?;
        payload.insert("host_id".to_string(), Value::from(host_id));
    }

    debug_payload("create", &local.name, &payload);
    match api.create_test(&payload) {
        Ok(_) => Ok(Applied::Full),
        Err(err) => match tier.fallback_for(err.api_status()) {
            Some(retry_tier) => {
                warn!(test = %local.name, "extended fields rejected, retrying with base payload");
                // Unlike update, name is required on create.
                let retry = build_payload(local, retry_tier, None, true);
                debug_payload("create retry", &local.name, &retry);
                api.create_test(&retry)?;
                Ok(Applied::Degraded)
            }
            None => Err(err),
        },
    }
}

fn debug_payload(action: &str, name: &str, payload: &JsonMap) {
    debug!(
        test = name,
        payload = %serde_json::Value::Object(payload.clone()),
        "{action} payload"
    );
}
