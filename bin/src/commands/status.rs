//! Status command implementation.
//!
//! This module handles checking that the credentials work and the API answers.

use crate::display::CredentialArgs;
use anyhow::{Context, Result, bail};
use ercot_lib::prelude::*;

/// Authenticate and probe the API.
pub(crate) async fn status(credentials: CredentialArgs) -> Result<()> {
    let credentials = credentials.resolve()?;
    let username = credentials.username().to_string();
    let mut client = ReportClient::connect(credentials)
        .await
        .context("Failed to authenticate")?;

    println!("Authenticated as {username}");
    if let Some(token) = client.tokens().token() {
        println!("Token valid until: {}", token.expires_at().format("%Y-%m-%d %H:%M:%S UTC"));
    }

    let status = client
        .connection_status()
        .await
        .context("Failed to reach the API")?;
    let probe = &client.fetcher().config().probe_url;
    if status != 200 {
        bail!("Connection: FAILED (HTTP {status}, {probe})");
    }
    println!("Connection: OK (HTTP {status}, {probe})");

    Ok(())
}
