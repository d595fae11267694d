//! Core data types for `lf-cli`.
//!
//! This module defines the types exchanged between the local tree and the
//! LoadForge API:
//! - `LocalTest` / `TestConfig` - one local test folder
//! - `RemoteTest` - a test record from the remote inventory
//! - `RemoteHost` / `HostSpec` - host entities and their local spelling
//! - `RunResult` - a run/result record polled by `wait`
//!
//! Remote records are deserialized leniently: numeric fields may arrive as
//! JSON numbers or numeric strings, and anything else is treated as absent
//! rather than zero so a sloppy value never clears a remote field.

use crate::error::{LfError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use url::Url;

/// JSON object payload sent to the API.
pub type JsonMap = serde_json::Map<String, Value>;

/// One local test folder, loaded fresh from disk each run.
///
/// The folder slug is the test's unique name across both stores; a renamed
/// folder is indistinguishable from a delete-and-create pair.
#[derive(Debug, Clone)]
pub struct LocalTest {
    /// Folder slug, used verbatim as the matching key.
    pub name: String,
    /// Path of the folder's `config.json`, for error reporting.
    pub config_path: PathBuf,
    /// Parsed configuration document.
    pub config: TestConfig,
    /// Script content, passed through unmodified.
    pub locustfile: String,
}

/// Recognized fields of a test folder's `config.json`.
///
/// Unknown keys are ignored. The numeric fields stay as raw JSON values
/// until payload construction so empty strings and other junk can be
/// omitted instead of coerced to zero.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TestConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub users: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub servers: Option<Value>,
    /// Host specification string, `protocol://host:port`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    // Extended quality-target fields; some deployments reject these.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apdex_target: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p95_target: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_perc_target: Option<Value>,
    /// Per-region server counts; a structured sub-record, never coerced.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region_servers: Option<Value>,
}

impl TestConfig {
    /// Host string with whitespace-only values treated as absent.
    #[must_use]
    pub fn host_str(&self) -> Option<&str> {
        self.host.as_deref().map(str::trim).filter(|h| !h.is_empty())
    }

    /// Region with whitespace-only values treated as absent.
    #[must_use]
    pub fn region_str(&self) -> Option<&str> {
        self.region
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
    }
}

/// A test record from the remote inventory.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RemoteTest {
    pub id: i64,
    pub name: Option<String>,
    /// Entity kind discriminator; only `"load"` participates in sync.
    pub test_type: Option<String>,
    pub host_id: Option<i64>,
    pub region: Option<String>,
    pub users: Option<Value>,
    pub rate: Option<Value>,
    pub servers: Option<Value>,
    pub locustfile: Option<String>,
    pub apdex_target: Option<Value>,
    pub p95_target: Option<Value>,
    pub error_perc_target: Option<Value>,
    pub region_servers: Option<Value>,
}

impl RemoteTest {
    /// Whether this entity is a load test. An absent kind counts as load.
    #[must_use]
    pub fn is_load(&self) -> bool {
        self.test_type.as_deref().is_none_or(|kind| kind == "load")
    }

    /// Matching key: the non-empty name, if any. Unnamed entities cannot
    /// be matched and never pair with a local test.
    #[must_use]
    pub fn match_name(&self) -> Option<&str> {
        self.name.as_deref().filter(|n| !n.is_empty())
    }

    /// Region with empty values treated as absent.
    #[must_use]
    pub fn region_str(&self) -> Option<&str> {
        self.region
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
    }
}

/// A host record from the remote inventory.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RemoteHost {
    pub id: i64,
    pub protocol: Option<String>,
    pub url: Option<String>,
    /// Tolerates string ports; some responses quote numbers.
    pub port: Option<Value>,
}

impl RemoteHost {
    #[must_use]
    pub fn port_number(&self) -> Option<u16> {
        let n = coerce_numeric(self.port.as_ref())?;
        let n = n.as_f64()?;
        if n.fract() == 0.0 && (1.0..=f64::from(u16::MAX)).contains(&n) {
            Some(n as u16)
        } else {
            None
        }
    }

    /// Render as `protocol://host:port` when all three parts are present.
    #[must_use]
    pub fn host_string(&self) -> Option<String> {
        let protocol = self.protocol.as_deref().map(str::trim).filter(|p| !p.is_empty())?;
        let url = self.url.as_deref().map(str::trim).filter(|u| !u.is_empty())?;
        let port = self.port_number()?;
        Some(format!("{protocol}://{url}:{port}"))
    }
}

/// Response body of a create-host call. Some deployments answer with
/// `id`, others with `host_id`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HostCreated {
    pub id: Option<i64>,
    pub host_id: Option<i64>,
}

impl HostCreated {
    #[must_use]
    pub const fn resolved_id(&self) -> Option<i64> {
        match (self.id, self.host_id) {
            (Some(id), _) | (None, Some(id)) => Some(id),
            (None, None) => None,
        }
    }
}

/// Scheme of a host specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Http,
    Https,
}

impl Protocol {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }

    /// Port implied by the scheme when the spec omits one.
    #[must_use]
    pub const fn default_port(self) -> u16 {
        match self {
            Self::Http => 80,
            Self::Https => 443,
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = LfError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "http" => Ok(Self::Http),
            "https" => Ok(Self::Https),
            other => Err(LfError::InvalidHost {
                value: other.to_string(),
            }),
        }
    }
}

/// A parsed `protocol://host[:port]` triple. The tuple is the uniqueness
/// key for matching remote host entities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostSpec {
    pub protocol: Protocol,
    pub host: String,
    pub port: u16,
}

impl HostSpec {
    /// Parse a host specification string. The port defaults to 443 for
    /// https and 80 for http. Malformed input is a validation error,
    /// never silently defaulted.
    pub fn parse(input: &str) -> Result<Self> {
        let invalid = || LfError::InvalidHost {
            value: input.to_string(),
        };
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(invalid());
        }
        let parsed = Url::parse(trimmed).map_err(|_| invalid())?;
        let protocol = parsed.scheme().parse::<Protocol>().map_err(|_| invalid())?;
        let host = parsed.host_str().ok_or_else(invalid)?.to_string();
        let port = parsed.port().unwrap_or_else(|| protocol.default_port());
        Ok(Self {
            protocol,
            host,
            port,
        })
    }

    /// Exact (protocol, url, port) match against a remote host entity.
    #[must_use]
    pub fn matches(&self, remote: &RemoteHost) -> bool {
        remote.protocol.as_deref() == Some(self.protocol.as_str())
            && remote.url.as_deref() == Some(self.host.as_str())
            && remote.port_number() == Some(self.port)
    }
}

impl fmt::Display for HostSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}:{}", self.protocol, self.host, self.port)
    }
}

/// A run/result record returned by the result endpoint. Older deployments
/// spell the status field differently; `status_code` coalesces them.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RunResult {
    pub id: Option<i64>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub run_status: Option<i64>,
    pub status: Option<i64>,
    pub state: Option<i64>,
    pub cancelled: Option<bool>,
    pub duration: Option<i64>,
    pub test_id: Option<i64>,
    pub requests: Option<f64>,
    pub failures: Option<f64>,
    pub response_median: Option<f64>,
    pub response_avg: Option<f64>,
    pub response_min: Option<f64>,
    pub response_max: Option<f64>,
    pub reqs_per_second: Option<f64>,
    pub fails_per_second: Option<f64>,
    pub run_passed: Option<bool>,
}

impl RunResult {
    #[must_use]
    pub const fn status_code(&self) -> Option<i64> {
        match (self.run_status, self.status, self.state) {
            (Some(s), _, _) | (None, Some(s), _) => Some(s),
            (None, None, s) => s,
        }
    }
}

/// Coerce a raw config value into a JSON number.
///
/// Accepts JSON numbers and numeric strings; integer spellings stay
/// integers. Empty strings, nulls, and non-numeric values yield `None`
/// so the caller omits the field instead of sending zero.
#[must_use]
pub fn coerce_numeric(value: Option<&Value>) -> Option<Value> {
    match value? {
        Value::Number(n) => Some(Value::Number(n.clone())),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            if let Ok(i) = s.parse::<i64>() {
                return Some(Value::from(i));
            }
            s.parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .map(Value::from)
        }
        _ => None,
    }
}
