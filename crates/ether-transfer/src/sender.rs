//! Sender role — dial a receiver and stream one file to it.

use std::io;
use std::path::Path;

use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use ether_core::wire::{TransferHeader, DEFAULT_CHUNK_SIZE};

use crate::cancel::CancelToken;
use crate::error::TransferError;
use crate::hooks::{TransferHooks, TransferStatus};

/// How a send session ended, when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Completed { bytes: u64 },
    Cancelled,
}

pub struct FileSender {
    host: String,
    port: u16,
    chunk_size: usize,
    hooks: TransferHooks,
    cancel: CancelToken,
}

impl FileSender {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            chunk_size: DEFAULT_CHUNK_SIZE,
            hooks: TransferHooks::default(),
            cancel: CancelToken::default(),
        }
    }

    /// Bytes read from the source per chunk. Also the progress granularity.
    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn hooks(mut self, hooks: TransferHooks) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Send `path` to the configured receiver.
    ///
    /// Fails with [`TransferError::FileNotFound`] before any socket is opened
    /// if the source is missing. No retry is attempted on any failure.
    pub async fn send(&self, path: impl AsRef<Path>) -> Result<SendOutcome, TransferError> {
        self.run(path.as_ref()).await.map_err(|e| self.hooks.failed(e))
    }

    async fn run(&self, path: &Path) -> Result<SendOutcome, TransferError> {
        let (mut file, file_size) = open_source(path).await?;
        let filename = base_name(path)?;
        let name_length = u32::try_from(filename.len())
            .map_err(|_| TransferError::InvalidFilename(filename.clone()))?;
        let header = TransferHeader::new(name_length, file_size);

        let addr = format!("{}:{}", self.host, self.port);
        self.hooks.status(TransferStatus::Connecting { addr: addr.clone() });
        let mut stream = TcpStream::connect((self.host.as_str(), self.port))
            .await
            .map_err(TransferError::connection(format!("failed to connect to {addr}")))?;
        tracing::info!(%addr, filename = %filename, file_size, "connected to receiver");

        stream
            .write_all(&header.to_bytes())
            .await
            .map_err(TransferError::connection("failed to send header"))?;
        stream
            .write_all(filename.as_bytes())
            .await
            .map_err(TransferError::connection("failed to send filename"))?;

        self.hooks.status(TransferStatus::Transferring);

        let mut buf = vec![0u8; self.chunk_size];
        let mut sent: u64 = 0;
        while sent < file_size {
            if self.cancel.is_cancelled() {
                tracing::info!(sent, file_size, "send cancelled");
                self.hooks.status(TransferStatus::Cancelled);
                return Ok(SendOutcome::Cancelled);
            }

            let want = (file_size - sent).min(buf.len() as u64) as usize;
            let n = read_chunk(&mut file, &mut buf[..want])
                .await
                .map_err(TransferError::io(path))?;
            if n == 0 {
                return Err(TransferError::Io {
                    path: path.to_path_buf(),
                    source: io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        format!("source shrank to {sent} of {file_size} bytes during send"),
                    ),
                });
            }

            stream
                .write_all(&buf[..n])
                .await
                .map_err(TransferError::connection("failed to send chunk"))?;
            sent += n as u64;
            tracing::trace!(sent, file_size, "chunk sent");
            self.hooks.progress(sent, file_size);
        }

        stream
            .shutdown()
            .await
            .map_err(TransferError::connection("failed to close connection"))?;

        self.hooks.progress(file_size, file_size);
        self.hooks.status(TransferStatus::Completed);
        tracing::info!(filename = %filename, bytes = file_size, "file sent");
        Ok(SendOutcome::Completed { bytes: file_size })
    }
}

/// Send `path` to `host:port` with default chunking.
pub async fn send_file(
    host: &str,
    port: u16,
    path: impl AsRef<Path>,
    hooks: TransferHooks,
    cancel: CancelToken,
) -> Result<SendOutcome, TransferError> {
    FileSender::new(host, port)
        .hooks(hooks)
        .cancel_token(cancel)
        .send(path)
        .await
}

/// Open the source and take its size from the open handle.
async fn open_source(path: &Path) -> Result<(File, u64), TransferError> {
    let file = match File::open(path).await {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(TransferError::FileNotFound(path.to_path_buf()))
        }
        Err(e) => return Err(TransferError::io(path)(e)),
    };
    let meta = file.metadata().await.map_err(TransferError::io(path))?;
    if !meta.is_file() {
        return Err(TransferError::Io {
            path: path.to_path_buf(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "not a regular file"),
        });
    }
    Ok((file, meta.len()))
}

/// Base name of `path` as sent on the wire. Directories are never sent.
fn base_name(path: &Path) -> Result<String, TransferError> {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| TransferError::InvalidFilename(path.display().to_string()))
}

/// Fill `buf` from `reader` unless EOF comes first. Returns bytes read.
async fn read_chunk<R: AsyncRead + Unpin>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}
