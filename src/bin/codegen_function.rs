//! Runs one on-demand invocation: reads a `{ "httpMethod", "body" }` event
//! from stdin and writes a `{ "statusCode", "headers", "body" }` response to
//! stdout.

use std::env;

use anyhow::Context;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use carbon_codegen_service::{function, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_tracing();

    let mut raw = String::new();
    tokio::io::stdin()
        .read_to_string(&mut raw)
        .await
        .context("failed to read event from stdin")?;

    let response = function::handle_raw_event(&raw, |key| env::var(key).ok()).await;

    let mut stdout = tokio::io::stdout();
    stdout
        .write_all(serde_json::to_string(&response)?.as_bytes())
        .await?;
    stdout.write_all(b"\n").await?;
    stdout.flush().await?;
    Ok(())
}
