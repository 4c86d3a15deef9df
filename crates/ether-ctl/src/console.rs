//! Console front-end for session hooks.
//!
//! Hooks fire on the transfer task. They only enqueue events; a separate
//! printer task owns the terminal and drains the queue in order.

use std::future::Future;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use ether_transfer::{CancelToken, ProgressEvent, TransferHooks};

#[derive(Debug)]
enum ConsoleEvent {
    Progress(ProgressEvent),
    Status(String),
}

/// Hooks that forward to a printer task. The task ends once the hooks
/// (and every session holding them) are dropped.
pub fn console_hooks() -> (TransferHooks, JoinHandle<()>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let progress_tx = tx.clone();

    let hooks = TransferHooks::new()
        .on_progress(move |event| {
            let _ = progress_tx.send(ConsoleEvent::Progress(event));
        })
        .on_status(move |status| {
            let _ = tx.send(ConsoleEvent::Status(status.to_string()));
        });

    (hooks, tokio::spawn(print_events(rx)))
}

async fn print_events(mut rx: mpsc::UnboundedReceiver<ConsoleEvent>) {
    let mut last_percent = None;
    let mut mid_line = false;

    while let Some(event) = rx.recv().await {
        match event {
            ConsoleEvent::Progress(p) => {
                let percent = p.percent().floor() as u32;
                if last_percent == Some(percent) {
                    continue;
                }
                last_percent = Some(percent);
                eprint!("\r  {:>3}%  {} / {} bytes", percent, p.bytes_moved, p.total_bytes);
                if p.is_complete() {
                    eprintln!();
                    mid_line = false;
                } else {
                    let _ = std::io::stderr().flush();
                    mid_line = true;
                }
            }
            ConsoleEvent::Status(message) => {
                if mid_line {
                    eprintln!();
                    mid_line = false;
                }
                eprintln!("{message}");
            }
        }
    }
    if mid_line {
        eprintln!();
    }
}

/// Exit status after a forced abort (128 + SIGINT).
const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Token that trips on Ctrl-C. A second Ctrl-C exits the process, since a
/// session only sees the token between chunks and accept polls.
pub fn cancel_on_ctrl_c() -> CancelToken {
    let token = CancelToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        let ctrl_c = || async { tokio::signal::ctrl_c().await.is_ok() };
        if wait_for_abort(&trigger, ctrl_c).await {
            tracing::warn!("second interrupt received, aborting");
            std::process::exit(INTERRUPTED_EXIT_CODE);
        }
    });
    token
}

/// Cancel `token` on the first interrupt. Returns true once a second one
/// arrives, false if the interrupt source fails.
async fn wait_for_abort<F, Fut>(token: &CancelToken, mut interrupt: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    if !interrupt().await {
        return false;
    }
    tracing::info!("interrupt received, cancelling");
    eprintln!("cancelling... press Ctrl-C again to abort");
    token.cancel();
    interrupt().await
}

/// BLAKE3 digest of a file, hex encoded, for comparing both ends.
pub async fn file_digest(path: &Path) -> Result<String> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || -> Result<String> {
        let file = std::fs::File::open(&path)
            .with_context(|| format!("failed to open {}", path.display()))?;
        let mut hasher = blake3::Hasher::new();
        hasher
            .update_reader(file)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Ok(hex::encode(hasher.finalize().as_bytes()))
    })
    .await
    .context("digest task failed")?
}
