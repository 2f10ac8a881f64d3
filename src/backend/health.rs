//! Service liveness probe.

use anyhow::{Result, bail};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::config::ServerCfg;

/// Body returned by the health endpoint.
#[derive(Debug, Deserialize)]
struct HealthResp {
    status: String,
}

/// Succeeds when the service answers `{"status": "ok"}`.
pub async fn check(http: &Client, server: &ServerCfg) -> Result<()> {
    let url = format!("{}/api/health", server.origin());
    let resp = http
        .get(url)
        .timeout(Duration::from_secs(5))
        .send()
        .await?
        .error_for_status()?
        .json::<HealthResp>()
        .await?;
    if resp.status != "ok" {
        bail!("service reported status {:?}", resp.status);
    }
    Ok(())
}
