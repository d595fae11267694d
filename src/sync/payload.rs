//! Two-tier API payload construction.
//!
//! Some LoadForge deployments reject the extended quality-target fields
//! with a 400. The executor first sends the full payload, then retries
//! once with the base tier when the rejection classifies as
//! unsupported-field. The tier transition is a pure function of the
//! rejection status so it is testable without any transport.

use crate::model::{JsonMap, LocalTest, RemoteTest, coerce_numeric};
use serde_json::Value;

/// Which field set to send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadTier {
    /// Base fields plus the extended quality targets.
    Full,
    /// Base fields only; used after an unsupported-field rejection.
    Base,
}

impl PayloadTier {
    /// Whether this tier carries the extended quality-target fields.
    #[must_use]
    pub const fn includes_extended(self) -> bool {
        matches!(self, Self::Full)
    }

    /// Tier to retry with after a rejection, if any.
    ///
    /// Only a bad-request rejection of the full tier downgrades; every
    /// other class propagates unmodified, and the base tier never
    /// retries.
    #[must_use]
    pub const fn fallback_for(self, status: Option<u16>) -> Option<Self> {
        match (self, status) {
            (Self::Full, Some(400)) => Some(Self::Base),
            _ => None,
        }
    }
}

/// Build the API payload for one local test.
///
/// Numeric fields are coerced leniently and omitted entirely when empty
/// or non-numeric, so a sloppy local value never clears a remote one.
/// `region` falls back to the matched remote entity, preserving the last
/// known region across partial local configs. `host_id` is attached by
/// the caller after host resolution, never here.
#[must_use]
pub fn build_payload(
    local: &LocalTest,
    tier: PayloadTier,
    remote: Option<&RemoteTest>,
    include_name: bool,
) -> JsonMap {
    let config = &local.config;
    let mut payload = JsonMap::new();

    if include_name {
        payload.insert("name".to_string(), Value::String(local.name.clone()));
    }

    for (key, value) in [
        ("rate", &config.rate),
        ("servers", &config.servers),
        ("users", &config.users),
    ] {
        if let Some(number) = coerce_numeric(value.as_ref()) {
            payload.insert(key.to_string(), number);
        }
    }

    let region = config
        .region_str()
        .or_else(|| remote.and_then(RemoteTest::region_str));
    if let Some(region) = region {
        payload.insert("region".to_string(), Value::String(region.to_string()));
    }

    payload.insert(
        "locustfile".to_string(),
        Value::String(local.locustfile.clone()),
    );

    if tier.includes_extended() {
        for (key, value) in [
            ("apdex_target", &config.apdex_target),
            ("p95_target", &config.p95_target),
            ("error_perc_target", &config.error_perc_target),
        ] {
            if let Some(number) = coerce_numeric(value.as_ref()) {
                payload.insert(key.to_string(), number);
            }
        }
        // Structured sub-record, passed through without coercion.
        if let Some(region_servers) = &config.region_servers {
            payload.insert("region_servers".to_string(), region_servers.clone());
        }
    }

    payload
}

/// Keys only the full tier may carry.
pub const EXTENDED_KEYS: [&str; 4] = [
    "apdex_target",
    "p95_target",
    "error_perc_target",
    "region_servers",
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LocalTest, RemoteTest, TestConfig};
    use serde_json::json;
    use std::path::PathBuf;

    fn local_with(config: TestConfig) -> LocalTest {
        LocalTest {
            name: "checkout".to_string(),
            config_path: PathBuf::from("tests/checkout/config.json"),
            config,
            locustfile: "from locust import HttpUser\n".to_string(),
        }
    }

    #[test]
    fn test_numeric_omission() {
        let local = local_with(TestConfig {
            users: Some(json!("")),
            rate: Some(json!(7)),
            ..TestConfig::default()
        });
        let payload = build_payload(&local, PayloadTier::Base, None, true);
        assert_eq!(payload.get("rate"), Some(&json!(7)));
        assert!(!payload.contains_key("users"));
        assert!(!payload.contains_key("servers"));
    }

    #[test]
    fn test_region_falls_back_to_remote() {
        let local = local_with(TestConfig::default());
        let remote = RemoteTest {
            id: 1,
            region: Some("us-east".to_string()),
            ..RemoteTest::default()
        };
        let payload = build_payload(&local, PayloadTier::Base, Some(&remote), true);
        assert_eq!(payload.get("region"), Some(&json!("us-east")));

        // Local region wins over the remote one.
        let local = local_with(TestConfig {
            region: Some("eu-west".to_string()),
            ..TestConfig::default()
        });
        let payload = build_payload(&local, PayloadTier::Base, Some(&remote), true);
        assert_eq!(payload.get("region"), Some(&json!("eu-west")));
    }

    #[test]
    fn test_region_omitted_when_unknown() {
        let local = local_with(TestConfig::default());
        let payload = build_payload(&local, PayloadTier::Base, None, true);
        assert!(!payload.contains_key("region"));
    }

    #[test]
    fn test_name_inclusion_toggle() {
        let local = local_with(TestConfig::default());
        let with_name = build_payload(&local, PayloadTier::Base, None, true);
        assert_eq!(with_name.get("name"), Some(&json!("checkout")));
        let without = build_payload(&local, PayloadTier::Base, None, false);
        assert!(!without.contains_key("name"));
    }

    #[test]
    fn test_locustfile_always_verbatim() {
        let local = local_with(TestConfig::default());
        let payload = build_payload(&local, PayloadTier::Base, None, false);
        assert_eq!(
            payload.get("locustfile"),
            Some(&json!("from locust import HttpUser\n"))
        );
    }

    #[test]
    fn test_extended_tier_fields() {
        let region_servers = json!({"us-east": 2, "eu-west": "3"});
        let local = local_with(TestConfig {
            apdex_target: Some(json!("0.9")),
            p95_target: Some(json!(800)),
            error_perc_target: Some(json!("bogus")),
            region_servers: Some(region_servers.clone()),
            ..TestConfig::default()
        });

        let full = build_payload(&local, PayloadTier::Full, None, true);
        assert_eq!(full.get("apdex_target"), Some(&json!(0.9)));
        assert_eq!(full.get("p95_target"), Some(&json!(800)));
        // Invalid numerics are omitted, not nulled.
        assert!(!full.contains_key("error_perc_target"));
        // region_servers passes through uncoerced.
        assert_eq!(full.get("region_servers"), Some(&region_servers));

        let base = build_payload(&local, PayloadTier::Base, None, true);
        for key in EXTENDED_KEYS {
            assert!(!base.contains_key(key), "base tier leaked {key}");
        }
    }

    #[test]
    fn test_fallback_transition() {
        assert_eq!(
            PayloadTier::Full.fallback_for(Some(400)),
            Some(PayloadTier::Base)
        );
        assert_eq!(PayloadTier::Full.fallback_for(Some(422)), None);
        assert_eq!(PayloadTier::Full.fallback_for(Some(500)), None);
        assert_eq!(PayloadTier::Full.fallback_for(None), None);
        assert_eq!(PayloadTier::Base.fallback_for(Some(400)), None);
    }
}
