//! Progress and status hooks supplied by the presentation layer.
//!
//! Hooks run synchronously on the session's task, in wire order. A front-end
//! that owns state on another thread should forward them (a channel works)
//! rather than touch that state directly.

use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::error::TransferError;

/// Cumulative bytes moved in one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEvent {
    pub bytes_moved: u64,
    pub total_bytes: u64,
}

impl ProgressEvent {
    pub fn new(bytes_moved: u64, total_bytes: u64) -> Self {
        Self {
            bytes_moved,
            total_bytes,
        }
    }

    /// Completion in percent. An empty file is 100% done.
    pub fn percent(&self) -> f64 {
        if self.total_bytes == 0 {
            100.0
        } else {
            self.bytes_moved as f64 * 100.0 / self.total_bytes as f64
        }
    }

    pub fn is_complete(&self) -> bool {
        self.bytes_moved >= self.total_bytes
    }
}

/// Protocol milestones reported through [`TransferHooks::on_status`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferStatus {
    Connecting { addr: String },
    WaitingForSender { port: u16 },
    Connected { peer: SocketAddr },
    Transferring,
    Completed,
    Received(PathBuf),
    Cancelled,
    Failed(String),
}

impl fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connecting { addr } => write!(f, "connecting to receiver {addr}..."),
            Self::WaitingForSender { port } => write!(f, "waiting for sender on port {port}..."),
            Self::Connected { peer } => write!(f, "connected to sender {peer}, receiving file..."),
            Self::Transferring => f.write_str("transferring file..."),
            Self::Completed => f.write_str("transfer completed"),
            Self::Received(path) => write!(f, "file received: {}", path.display()),
            Self::Cancelled => f.write_str("transfer cancelled"),
            Self::Failed(reason) => write!(f, "transfer failed: {reason}"),
        }
    }
}

type ProgressFn = Box<dyn Fn(ProgressEvent) + Send + Sync>;
type StatusFn = Box<dyn Fn(&TransferStatus) + Send + Sync>;

/// Optional callbacks invoked by a sender or receiver session.
#[derive(Default)]
pub struct TransferHooks {
    progress: Option<ProgressFn>,
    status: Option<StatusFn>,
}

impl TransferHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_progress<F>(mut self, f: F) -> Self
    where
        F: Fn(ProgressEvent) + Send + Sync + 'static,
    {
        self.progress = Some(Box::new(f));
        self
    }

    pub fn on_status<F>(mut self, f: F) -> Self
    where
        F: Fn(&TransferStatus) + Send + Sync + 'static,
    {
        self.status = Some(Box::new(f));
        self
    }

    pub(crate) fn progress(&self, bytes_moved: u64, total_bytes: u64) {
        if let Some(f) = &self.progress {
            f(ProgressEvent::new(bytes_moved, total_bytes));
        }
    }

    pub(crate) fn status(&self, status: TransferStatus) {
        tracing::debug!(status = %status, "status");
        if let Some(f) = &self.status {
            f(&status);
        }
    }

    /// Report a terminal error and hand it back for propagation.
    pub(crate) fn failed(&self, err: TransferError) -> TransferError {
        tracing::warn!(error = %err, "transfer failed");
        self.status(TransferStatus::Failed(err.to_string()));
        err
    }
}

impl fmt::Debug for TransferHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransferHooks")
            .field("progress", &self.progress.is_some())
            .field("status", &self.status.is_some())
            .finish()
    }
}
