//! Create command implementation.
//!
//! One-shot scaffolding wizard: writes a new `tests/<slug>/` folder with
//! a starter locustfile and a config document. Values missing from the
//! flags are prompted for; the host can be picked from the remote host
//! list or entered manually.

use super::client_from_env;
use crate::api::LoadForgeApi;
use crate::cli::CreateArgs;
use crate::error::{LfError, Result};
use crate::local::{DEFAULT_LOCUSTFILE, sanitize_slug, write_test_folder};
use crate::model::{HostSpec, TestConfig};
use serde_json::json;
use std::io::{self, BufRead, Write};
use tracing::debug;

/// Execute the create command.
///
/// # Errors
///
/// Returns an error on an empty name, a non-numeric user count, a host
/// that does not parse as `protocol://host:port`, or a write failure.
pub fn execute(args: &CreateArgs) -> Result<()> {
    let api = client_from_env()?;

    let name = match &args.name {
        Some(name) => name.clone(),
        None => prompt("Test name (slug): ")?,
    };
    let name = name.trim().to_string();
    if name.is_empty() {
        return Err(LfError::validation("name", "name is required"));
    }
    let slug = sanitize_slug(&name);

    let users_input = match &args.users {
        Some(users) if !users.trim().is_empty() => users.clone(),
        _ => prompt("Users (number): ")?,
    };
    let users: u64 = users_input
        .trim()
        .parse()
        .map_err(|_| LfError::validation("users", "must be a number"))?;

    let host_input = match &args.host {
        Some(host) => host.clone(),
        None => match select_host_interactively(&api) {
            Ok(host) => host,
            Err(err) => {
                debug!(error = %err, "interactive host selection failed, prompting manually");
                prompt("Host (protocol://url:port): ")?
            }
        },
    };
    let spec = HostSpec::parse(&host_input)?;

    let folder = args.out.join(&slug);
    let config = TestConfig {
        users: Some(json!(users)),
        rate: Some(json!(1)),
        servers: Some(json!(1)),
        host: Some(spec.to_string()),
        ..TestConfig::default()
    };
    write_test_folder(&folder, DEFAULT_LOCUSTFILE, &config)?;
    println!("Created {}", folder.display());
    Ok(())
}

/// Offer the remote host list for selection, with a create-new-host path.
fn select_host_interactively(api: &dyn LoadForgeApi) -> Result<String> {
    let hosts = api.list_hosts()?;
    let items: Vec<(usize, i64, String)> = hosts
        .iter()
        .enumerate()
        .filter_map(|(idx, h)| Some((idx + 1, h.id, h.host_string()?)))
        .collect();

    println!("Select a host:");
    for (index, _, host) in &items {
        println!("{index}) {host}");
    }
    let create_choice = items.len() + 1;
    println!("{create_choice}) Create new host");

    let choice: usize = prompt("Enter choice number: ")?
        .trim()
        .parse()
        .map_err(|_| LfError::validation("choice", "must be a number"))?;

    if choice == create_choice {
        let protocol = {
            let input = prompt("Protocol (http/https): ")?;
            let trimmed = input.trim().to_string();
            if trimmed.is_empty() {
                "https".to_string()
            } else {
                trimmed
            }
        };
        let url = prompt("Hostname (e.g., example.com): ")?.trim().to_string();
        let port_input = prompt("Port (e.g., 443): ")?.trim().to_string();
        let host_str = if port_input.is_empty() {
            format!("{protocol}://{url}")
        } else {
            format!("{protocol}://{url}:{port_input}")
        };
        let spec = HostSpec::parse(&host_str)?;
        let created = api.create_host(&spec)?;
        debug!(id = ?created.resolved_id(), "created host interactively");
        return Ok(spec.to_string());
    }

    items
        .iter()
        .find(|(index, ..)| *index == choice)
        .map(|(_, _, host)| host.clone())
        .ok_or_else(|| LfError::validation("choice", "invalid selection"))
}

/// Ask one question on stdout and read one line from stdin.
fn prompt(question: &str) -> Result<String> {
    print!("{question}");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(answer.trim_end_matches(['\r', '\n']).to_string())
}
