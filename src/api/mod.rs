//! Abstract LoadForge API capability.
//!
//! The sync engine depends only on this trait; transport, auth, and
//! serialization live in the [`http`] implementation. Keeping the seam
//! here lets the reconciliation logic run against an in-memory double in
//! unit tests.

mod http;

pub use http::HttpApi;

use crate::error::Result;
use crate::model::{HostCreated, HostSpec, JsonMap, RemoteHost, RemoteTest, RunResult};
use serde_json::Value;

/// Client capability consumed by the sync engine and commands.
///
/// Every call is a blocking round-trip; mutating calls may reject with
/// [`crate::LfError::Api`] carrying the HTTP status, which the payload
/// fallback logic inspects.
pub trait LoadForgeApi {
    /// Fetch all test entities. A non-array response is a protocol error.
    fn list_tests(&self) -> Result<Vec<RemoteTest>>;

    /// Create a test from the given payload.
    fn create_test(&self, payload: &JsonMap) -> Result<Value>;

    /// Overwrite an existing test.
    fn update_test(&self, id: i64, payload: &JsonMap) -> Result<Value>;

    /// Delete a test by id.
    fn delete_test(&self, id: i64) -> Result<Value>;

    /// Fetch all host entities. A non-array response is a protocol error.
    fn list_hosts(&self) -> Result<Vec<RemoteHost>>;

    /// Create a host entity for the given spec.
    fn create_host(&self, spec: &HostSpec) -> Result<HostCreated>;

    /// Start a run for a test; the response carries the run id.
    fn start_run(&self, test_id: i64, duration: u32) -> Result<Value>;

    /// Fetch a run/result record.
    fn get_result(&self, result_id: &str) -> Result<RunResult>;
}
