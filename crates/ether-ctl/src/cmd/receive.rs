//! Wait for one sender and store its file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use ether_core::EtherConfig;
use ether_transfer::{FileReceiver, ReceiveOutcome};

use crate::console::{cancel_on_ctrl_c, console_hooks, file_digest};

pub async fn cmd_receive(config: &EtherConfig, destination: Option<&str>) -> Result<()> {
    let destination = destination
        .map(PathBuf::from)
        .unwrap_or_else(|| config.transfer.destination_dir());
    let (hooks, printer) = console_hooks();

    let outcome = {
        let receiver = FileReceiver::new(&destination)
            .accept_poll(config.network.accept_poll())
            .hooks(hooks)
            .cancel_token(cancel_on_ctrl_c());
        receiver.receive(config.network.port).await
    };
    printer.await.ok();

    match outcome.with_context(|| format!("failed to receive into {}", destination.display()))? {
        ReceiveOutcome::Received(path) => {
            let bytes = std::fs::metadata(&path).map(|m| m.len()).unwrap_or_default();
            println!("File received:");
            println!("  Path   : {}", path.display());
            println!("  Bytes  : {bytes}");
            println!("  BLAKE3 : {}", file_digest(&path).await?);
        }
        ReceiveOutcome::Cancelled => println!("Receive cancelled."),
    }
    Ok(())
}
