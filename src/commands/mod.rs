//! CLI command handlers.
//!
//! Each submodule owns one subcommand: it wires the HTTP client and the
//! registry together, runs the operation, and prints the result. Shared
//! construction and output helpers live here.

use anyhow::Result;
use reqwest::Client;

use crate::http::HttpClient;
use crate::registry::NuGetRegistry;

mod count;
mod resolve;

pub use count::count;
pub use resolve::resolve;

/// Build the HTTP client every registry request goes through.
fn build_http_client() -> Result<HttpClient> {
    let client = Client::builder().user_agent("nuscout-cli").build()?;
    Ok(HttpClient::new(client))
}

/// Connect to the registry behind a service index URL.
async fn connect_registry(service_index: &str) -> Result<NuGetRegistry> {
    let http_client = build_http_client()?;
    NuGetRegistry::connect(http_client, service_index).await
}

/// Shortens `text` to at most `max_chars` characters, ending in `...`
/// when something was cut.
fn truncate(text: &str, max_chars: usize) -> String {
    const SUFFIX: &str = "...";

    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let keep = max_chars.saturating_sub(SUFFIX.len());
    let mut shortened: String = text.chars().take(keep).collect();
    shortened.push_str(SUFFIX);
    shortened
}
