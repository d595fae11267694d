//! Error types and handling for `lf-cli`.
//!
//! # Design
//!
//! - Uses `thiserror` for derive-based error types
//! - Supports `anyhow` integration for wrapped one-off errors
//! - Carries the HTTP status on API rejections so the payload fallback
//!   logic can classify them without touching the transport layer
//! - Exit codes: 1 for every failure except a completed-but-not-passed
//!   run, which exits 2 (scripting contract of the `wait` command)

use std::path::PathBuf;
use thiserror::Error;

/// Primary error type for `lf-cli` operations.
#[derive(Error, Debug)]
pub enum LfError {
    // === Environment / configuration ===
    /// API key missing from the environment and `.env`.
    #[error("Missing API_KEY in environment (.env)")]
    MissingApiKey,

    /// A test folder's configuration document failed to parse.
    #[error("Invalid JSON in {}: {reason}", path.display())]
    ConfigParse { path: PathBuf, reason: String },

    // === Validation errors ===
    /// Field validation failed.
    #[error("Validation failed: {field}: {reason}")]
    Validation { field: String, reason: String },

    /// A host specification string did not parse as `protocol://host:port`.
    #[error("Invalid host '{value}': expected protocol://host:port")]
    InvalidHost { value: String },

    /// Creating a test remotely requires a region in the local config.
    #[error("Create requires 'region' in {}", path.display())]
    MissingRegion { path: PathBuf },

    /// No remote load test carries the requested name.
    #[error("No load test found with name '{slug}'")]
    TestNotFound { slug: String },

    // === Remote contract errors ===
    /// The service returned a body that violates the API contract
    /// (e.g. a non-array list response). Nothing downstream can be
    /// trusted after this.
    #[error("Unexpected response format from LoadForge {endpoint}")]
    Protocol { endpoint: String },

    /// The service rejected a request. `status` drives the extended-field
    /// fallback classification (400 => retry with base payload).
    #[error("LoadForge API error at {endpoint} (HTTP {status}): {message}")]
    Api {
        status: u16,
        endpoint: String,
        message: String,
    },

    /// One or more plan items failed to apply during a push run.
    #[error("Push finished with {failed} failed item(s)")]
    PushIncomplete { failed: usize },

    // === Run outcomes (wait command) ===
    /// The run completed but missed its quality targets.
    #[error(
        "Run did not pass. This is based on your apdex score, error percentage target and p95 target"
    )]
    RunNotPassed,

    /// The run never completed (launch failure, cancellation, provider limit).
    #[error("Run failed to execute (status {status})")]
    RunFailed { status: i64 },

    // === Transport / I/O ===
    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// File system I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Wrapped anyhow error for one-off failures.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LfError {
    /// Create a validation error for a specific field.
    #[must_use]
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// HTTP status of a rejected request, if this error carries one.
    #[must_use]
    pub fn api_status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Human-friendly suggestion for fixing this error.
    #[must_use]
    pub const fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::MissingApiKey => Some("Set API_KEY in .env or the environment"),
            Self::InvalidHost { .. } => Some("Use the form https://example.com:443"),
            Self::MissingRegion { .. } => Some("Add a \"region\" field to the test's config.json"),
            _ => None,
        }
    }

    /// Process exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::RunNotPassed => 2,
            _ => 1,
        }
    }
}

/// Result type using `LfError`.
pub type Result<T> = std::result::Result<T, LfError>;
