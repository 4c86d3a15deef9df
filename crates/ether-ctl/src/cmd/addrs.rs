//! Local address listing.

use anyhow::{Context, Result};
use ether_transfer::list_local_addresses;

pub async fn cmd_addrs(include_loopback: bool, port: u16) -> Result<()> {
    let addrs = tokio::task::spawn_blocking(move || list_local_addresses(include_loopback))
        .await
        .context("address lookup task failed")?;

    if addrs.is_empty() {
        println!("No IPv4 addresses found.");
        return Ok(());
    }

    println!("═══════════════════════════════════════");
    println!("  Local Addresses");
    println!("═══════════════════════════════════════");
    for addr in &addrs {
        println!("  {addr}:{port}");
    }
    Ok(())
}
