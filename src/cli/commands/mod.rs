//! Subcommand implementations.

pub mod create;
pub mod pull;
pub mod push;
pub mod start;
pub mod wait;

use crate::api::HttpApi;
use crate::config::Settings;
use crate::error::Result;

/// Build the API client from the environment; shared by every command.
fn client_from_env() -> Result<HttpApi> {
    let settings = Settings::from_env()?;
    HttpApi::new(&settings)
}
