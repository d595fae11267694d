//! `lf-cli`: sync local load-test folders with the LoadForge API.
//!
//! The local directory tree is the canonical serialization format: one
//! folder per test, holding `locustfile.py` (the script, opaque to this
//! tool) and `config.json` (structured configuration). `push` reconciles
//! that tree against the remote inventory by unique test name; `pull`
//! writes the remote inventory back into the same layout.

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod local;
pub mod logging;
pub mod model;
pub mod sync;

pub use error::{LfError, Result};
