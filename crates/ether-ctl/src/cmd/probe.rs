//! Reachability check.

use anyhow::Result;
use ether_core::EtherConfig;
use ether_transfer::check_connection;

pub async fn cmd_probe(config: &EtherConfig) -> Result<bool> {
    let net = &config.network;
    println!("Checking connection to {}:{}...", net.host, net.port);
    let result = check_connection(&net.host, net.port, net.probe_timeout()).await;
    println!("{}", result.message);
    Ok(result.reachable)
}
