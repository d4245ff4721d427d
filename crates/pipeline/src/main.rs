//! Ultrasonic Ranging Pipeline - Main Entry Point

use anyhow::Context;
use pipeline::{init_logging, load_config, run, DEFAULT_CONFIG_PATH};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = load_config(&path).with_context(|| format!("loading config from {}", path))?;

    init_logging(&config.logging)?;

    info!("=== Ultrasonic Ranging Pipeline v{} ===", env!("CARGO_PKG_VERSION"));
    info!("Configuration: {}", path);

    run(config).await?;

    Ok(())
}
