use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{blocking::Client, redirect::Policy};
use serde_json::Value;

const USER_AGENT: &str = concat!("admcentroid/", env!("CARGO_PKG_VERSION"));

/// Blocking client with a whole-request timeout.
fn client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .redirect(Policy::limited(10))
        .timeout(timeout)
        .build()
        .context("build HTTP client")
}

/// GET `url` and buffer the full response body in memory.
pub(crate) fn fetch_bytes(url: &str, timeout: Duration) -> Result<Vec<u8>> {
    let resp = client(timeout)?
        .get(url)
        .send()
        .with_context(|| format!("GET {url}"))?
        .error_for_status()
        .with_context(|| format!("GET {url} returned error status"))?;

    let body = resp.bytes().with_context(|| format!("read body of {url}"))?;
    Ok(body.to_vec())
}

/// GET `url` and parse the body as JSON.
pub(crate) fn fetch_json(url: &str, timeout: Duration) -> Result<Value> {
    let bytes = fetch_bytes(url, timeout)?;
    serde_json::from_slice(&bytes).with_context(|| format!("parse JSON from {url}"))
}
