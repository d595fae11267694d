//! Per-run host resolution cache.
//!
//! Tests reference hosts by a `protocol://host:port` string locally but by
//! id remotely. The cache is an explicit value owned by one push run; it
//! never persists across runs, and within a run each distinct host is
//! created at most once even when several tests reference it.

use crate::api::LoadForgeApi;
use crate::error::{LfError, Result};
use crate::model::{HostSpec, RemoteHost};
use tracing::{debug, warn};

/// In-memory view of the remote host inventory for one push run.
#[derive(Debug, Default)]
pub struct HostCache {
    hosts: Vec<RemoteHost>,
}

impl HostCache {
    #[must_use]
    pub const fn new(hosts: Vec<RemoteHost>) -> Self {
        Self { hosts }
    }

    /// Seed the cache from the remote inventory. A fetch failure is
    /// non-fatal at this point; resolution falls back to creating hosts
    /// individually later.
    #[must_use]
    pub fn preload(api: &dyn LoadForgeApi) -> Self {
        match api.list_hosts() {
            Ok(hosts) => Self::new(hosts),
            Err(err) => {
                warn!(error = %err, "host list unavailable, continuing with empty cache");
                Self::default()
            }
        }
    }

    /// Resolve a host specification string to a remote host id.
    ///
    /// An exact (protocol, url, port) cache hit returns the known id;
    /// otherwise the host is created remotely and the cache refreshed
    /// best-effort. A refresh failure keeps the created id valid; the
    /// created entry is recorded locally either way so a later resolve
    /// of the same spec cannot create a duplicate.
    ///
    /// # Errors
    ///
    /// Fails on a malformed spec string, a rejected create call, or a
    /// create response without an id.
    pub fn resolve(&mut self, api: &dyn LoadForgeApi, host_str: &str) -> Result<i64> {
        let spec = HostSpec::parse(host_str)?;
        if let Some(found) = self.hosts.iter().find(|h| spec.matches(h)) {
            debug!(host = %spec, id = found.id, "host cache hit");
            return Ok(found.id);
        }

        let created = api.create_host(&spec)?;
        let id = created.resolved_id().ok_or_else(|| LfError::Protocol {
            endpoint: "/hosts".to_string(),
        })?;
        debug!(host = %spec, id, "created host");

        if let Ok(hosts) = api.list_hosts() {
            self.hosts = hosts;
        } else {
            warn!("host cache refresh failed, keeping local view");
        }
        // Record the created entry whenever the refreshed view does not
        // carry it yet, so a later resolve of the same spec cannot create
        // a duplicate within this run.
        if !self.hosts.iter().any(|h| spec.matches(h)) {
            self.hosts.push(RemoteHost {
                id,
                protocol: Some(spec.protocol.as_str().to_string()),
                url: Some(spec.host.clone()),
                port: Some(spec.port.into()),
            });
        }
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::testing::{MockApi, MockCall};
    use serde_json::json;

    fn existing_host(id: i64) -> RemoteHost {
        RemoteHost {
            id,
            protocol: Some("https".to_string()),
            url: Some("example.com".to_string()),
            port: Some(json!(443)),
        }
    }

    #[test]
    fn test_cache_hit_returns_existing_id() {
        let api = MockApi::default();
        let mut cache = HostCache::new(vec![existing_host(11)]);
        let id = cache.resolve(&api, "https://example.com:443").unwrap();
        assert_eq!(id, 11);
        assert!(api.calls().is_empty());
    }

    #[test]
    fn test_miss_creates_then_dedups() {
        let api = MockApi::default();
        let mut cache = HostCache::new(vec![]);

        let first = cache.resolve(&api, "https://example.com:443").unwrap();
        let second = cache.resolve(&api, "https://example.com").unwrap();
        assert_eq!(first, second);

        let creates = api
            .calls()
            .iter()
            .filter(|c| matches!(c, MockCall::CreateHost(_)))
            .count();
        assert_eq!(creates, 1);
    }

    #[test]
    fn test_dedup_survives_refresh_failure() {
        let api = MockApi::default();
        api.fail_list_hosts.set(true);
        let mut cache = HostCache::new(vec![]);

        let first = cache.resolve(&api, "http://example.com:8080").unwrap();
        let second = cache.resolve(&api, "http://example.com:8080").unwrap();
        assert_eq!(first, second);

        let creates = api
            .calls()
            .iter()
            .filter(|c| matches!(c, MockCall::CreateHost(_)))
            .count();
        assert_eq!(creates, 1);
    }

    #[test]
    fn test_malformed_spec_is_error_without_network() {
        let api = MockApi::default();
        let mut cache = HostCache::new(vec![]);
        assert!(cache.resolve(&api, "not a url").is_err());
        assert!(api.calls().is_empty());
    }
}
