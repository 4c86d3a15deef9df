//! Send one file to a waiting receiver.

use std::path::Path;

use anyhow::{Context, Result};
use ether_core::EtherConfig;
use ether_transfer::{FileSender, SendOutcome};

use crate::console::{cancel_on_ctrl_c, console_hooks, file_digest};

pub async fn cmd_send(config: &EtherConfig, path: &str) -> Result<()> {
    let path = Path::new(path);
    let (hooks, printer) = console_hooks();

    let outcome = {
        let sender = FileSender::new(config.network.host.clone(), config.network.port)
            .chunk_size(config.transfer.chunk_size())
            .hooks(hooks)
            .cancel_token(cancel_on_ctrl_c());
        sender.send(path).await
    };
    printer.await.ok();

    match outcome.with_context(|| format!("failed to send {}", path.display()))? {
        SendOutcome::Completed { bytes } => {
            println!("File sent:");
            println!("  Path   : {}", path.display());
            println!("  Bytes  : {bytes}");
            println!("  BLAKE3 : {}", file_digest(path).await?);
        }
        SendOutcome::Cancelled => println!("Send cancelled."),
    }
    Ok(())
}
