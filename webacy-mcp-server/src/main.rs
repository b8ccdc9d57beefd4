use anyhow::Context;
use clap::Parser;
use webacy_mcp_server::{logging, run, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::parse();
    logging::init(config.debug);

    let validated = config
        .validate()
        .inspect_err(|e| tracing::error!("invalid configuration: {}", e))
        .context("invalid configuration")?;

    run(validated)
        .await
        .inspect_err(|e| tracing::error!("server failed: {}", e))
        .context("server failed")?;

    Ok(())
}
