//! Show the effective configuration.

use anyhow::{Context, Result};
use ether_core::EtherConfig;

pub fn cmd_config(config: &EtherConfig) -> Result<()> {
    let path = EtherConfig::write_default_if_missing().context("failed to write default config")?;

    println!("═══════════════════════════════════════");
    println!("  Ether Configuration");
    println!("═══════════════════════════════════════");
    println!("  File           : {}", path.display());
    println!("  Host           : {}", config.network.host);
    println!("  Port           : {}", config.network.port);
    println!("  Probe timeout  : {}s", config.network.probe_timeout_secs);
    println!("  Accept poll    : {}ms", config.network.accept_poll_millis);
    println!("  Chunk size     : {} bytes", config.transfer.chunk_size());
    println!("  Destination    : {}", config.transfer.destination_dir().display());
    Ok(())
}
