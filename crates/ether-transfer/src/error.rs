//! Transfer errors.
//!
//! Cancellation is not an error: it is reported through the `Cancelled`
//! variant of each role's outcome type.

use std::io;
use std::path::PathBuf;

use ether_core::WireError;

#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("source file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Peer closed early or violated framing.
    #[error("connection error: {0}")]
    Connection(String),

    /// Dial, accept, read or write failed on the socket.
    #[error("connection error: {context}: {source}")]
    ConnectionIo {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    MalformedHeader(#[from] WireError),

    /// Local filesystem failure reading the source or writing the destination.
    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("refusing unusable filename {0:?}")]
    InvalidFilename(String),
}

impl TransferError {
    pub(crate) fn connection(context: impl Into<String>) -> impl FnOnce(io::Error) -> Self {
        let context = context.into();
        move |source| Self::ConnectionIo { context, source }
    }

    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }

    /// True for failures of the network leg rather than the local disk.
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::ConnectionIo { .. })
    }
}
