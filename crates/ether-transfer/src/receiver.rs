//! Receiver role — accept one sender and store the file it streams.
//!
//! Session states:
//!
//! ```text
//! Listening → Accepting → HeaderReceived → FilenameReceived → Streaming
//!                                                     ↘ Completed | Cancelled | Failed
//! ```
//!
//! Exactly one inbound connection is serviced per session. The listener is
//! dropped as soon as it yields a connection, and on every other exit path.

use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use socket2::{Domain, Protocol, Socket, Type};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use ether_core::wire::{
    TransferHeader, WireError, ACCEPT_POLL_MILLIS, DEFAULT_CHUNK_SIZE, HEADER_LEN, MAX_NAME_LEN,
};

use crate::cancel::CancelToken;
use crate::error::TransferError;
use crate::hooks::{TransferHooks, TransferStatus};

/// How a receive session ended, when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReceiveOutcome {
    Received(PathBuf),
    Cancelled,
}

pub struct FileReceiver {
    destination: PathBuf,
    accept_poll: Duration,
    hooks: TransferHooks,
    cancel: CancelToken,
}

impl FileReceiver {
    pub fn new(destination: impl Into<PathBuf>) -> Self {
        Self {
            destination: destination.into(),
            accept_poll: Duration::from_millis(ACCEPT_POLL_MILLIS),
            hooks: TransferHooks::default(),
            cancel: CancelToken::default(),
        }
    }

    /// Upper bound on how long a waiting receiver takes to notice cancellation.
    pub fn accept_poll(mut self, interval: Duration) -> Self {
        self.accept_poll = interval.max(Duration::from_millis(1));
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

    /// Create the destination directory and start listening on `port` on all
    /// interfaces. Port 0 lets the OS choose; see [`ReceiveSession::local_addr`].
    pub async fn listen(self, port: u16) -> Result<ReceiveSession, TransferError> {
        if let Err(e) = tokio::fs::create_dir_all(&self.destination).await {
            return Err(self.hooks.failed(TransferError::io(&self.destination)(e)));
        }

        let listener = match bind_listener(port) {
            Ok(l) => l,
            Err(e) => {
                let err = TransferError::connection(format!("failed to listen on port {port}"))(e);
                return Err(self.hooks.failed(err));
            }
        };
        let local_addr = match listener.local_addr() {
            Ok(a) => a,
            Err(e) => {
                let err = TransferError::connection("failed to read listener address")(e);
                return Err(self.hooks.failed(err));
            }
        };

        tracing::info!(
            addr = %local_addr,
            destination = %self.destination.display(),
            "receiver listening"
        );
        self.hooks.status(TransferStatus::WaitingForSender {
            port: local_addr.port(),
        });

        Ok(ReceiveSession {
            receiver: self,
            listener,
            local_addr,
        })
    }

    /// Listen on `port` and receive one file.
    pub async fn receive(self, port: u16) -> Result<ReceiveOutcome, TransferError> {
        self.listen(port).await?.run().await
    }

    async fn serve(&self, listener: TcpListener) -> Result<ReceiveOutcome, TransferError> {
        let Some((stream, peer)) = self.accept_one(listener).await? else {
            tracing::info!("listening cancelled before a sender connected");
            self.hooks.status(TransferStatus::Cancelled);
            return Ok(ReceiveOutcome::Cancelled);
        };

        tracing::info!(%peer, "sender connected");
        self.hooks.status(TransferStatus::Connected { peer });
        self.stream_file(stream).await
    }

    /// Poll `accept` so cancellation is observed between attempts.
    /// Consumes the listener: no second connection is ever accepted.
    async fn accept_one(
        &self,
        listener: TcpListener,
    ) -> Result<Option<(TcpStream, SocketAddr)>, TransferError> {
        loop {
            if self.cancel.is_cancelled() {
                return Ok(None);
            }
            match tokio::time::timeout(self.accept_poll, listener.accept()).await {
                Ok(Ok(conn)) => return Ok(Some(conn)),
                Ok(Err(e)) => return Err(TransferError::connection("accept failed")(e)),
                Err(_) => tracing::trace!("accept poll elapsed"),
            }
        }
    }

    async fn stream_file(&self, mut stream: TcpStream) -> Result<ReceiveOutcome, TransferError> {
        let mut header_buf = [0u8; HEADER_LEN];
        read_exact_or(&mut stream, &mut header_buf, "incomplete header").await?;
        let header = TransferHeader::parse(&header_buf)?;
        let (name_length, file_size) = (header.name_length(), header.file_size());
        if name_length > MAX_NAME_LEN {
            return Err(WireError::NameTooLong(name_length).into());
        }
        tracing::debug!(name_length, file_size, "header received");

        let mut name_buf = vec![0u8; name_length as usize];
        read_exact_or(
            &mut stream,
            &mut name_buf,
            "connection closed before filename was fully received",
        )
        .await?;
        let raw_name = String::from_utf8_lossy(&name_buf);
        let filename = sanitize_filename(&raw_name)?;
        let target = self.destination.join(filename);
        tracing::info!(path = %target.display(), file_size, "receiving file");

        let mut file = File::create(&target).await.map_err(TransferError::io(&target))?;
        let mut buf = vec![0u8; DEFAULT_CHUNK_SIZE];
        let mut received: u64 = 0;

        while received < file_size && !self.cancel.is_cancelled() {
            let want = (file_size - received).min(buf.len() as u64) as usize;
            let n = stream
                .read(&mut buf[..want])
                .await
                .map_err(TransferError::connection("failed to read payload"))?;
            if n == 0 {
                return Err(TransferError::Connection(
                    "connection closed before file transfer finished".to_string(),
                ));
            }
            file.write_all(&buf[..n]).await.map_err(TransferError::io(&target))?;
            received += n as u64;
            tracing::trace!(received, file_size, "chunk received");
            self.hooks.progress(received, file_size);
        }

        if received < file_size {
            drop(file);
            remove_partial(&target).await;
            tracing::info!(received, file_size, "receive cancelled, partial file removed");
            self.hooks.status(TransferStatus::Cancelled);
            return Ok(ReceiveOutcome::Cancelled);
        }

        file.flush().await.map_err(TransferError::io(&target))?;
        drop(file);

        self.hooks.progress(file_size, file_size);
        tracing::info!(path = %target.display(), bytes = file_size, "file received");
        self.hooks.status(TransferStatus::Received(target.clone()));
        Ok(ReceiveOutcome::Received(target))
    }
}

/// A bound receiver waiting to accept its one sender.
pub struct ReceiveSession {
    receiver: FileReceiver,
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl ReceiveSession {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Accept one sender and store its file.
    pub async fn run(self) -> Result<ReceiveOutcome, TransferError> {
        let Self {
            receiver, listener, ..
        } = self;
        receiver
            .serve(listener)
            .await
            .map_err(|e| receiver.hooks.failed(e))
    }
}

/// Receive one file on `port` into `destination` with default polling.
pub async fn receive_file(
    port: u16,
    destination: impl Into<PathBuf>,
    hooks: TransferHooks,
    cancel: CancelToken,
) -> Result<ReceiveOutcome, TransferError> {
    FileReceiver::new(destination)
        .hooks(hooks)
        .cancel_token(cancel)
        .receive(port)
        .await
}

/// Bind a TCP listener on all IPv4 interfaces with SO_REUSEADDR and a
/// backlog of one.
fn bind_listener(port: u16) -> io::Result<TcpListener> {
    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
    let socket = Socket::new(Domain::IPV4, Type::STREAM, Some(Protocol::TCP))?;
    socket.set_reuse_address(true)?;
    socket.bind(&addr.into())?;
    socket.listen(1)?;
    socket.set_nonblocking(true)?;
    TcpListener::from_std(socket.into())
}

/// `read_exact`, mapping an early close to a connection error naming `what`.
async fn read_exact_or(
    stream: &mut TcpStream,
    buf: &mut [u8],
    what: &str,
) -> Result<(), TransferError> {
    match stream.read_exact(buf).await {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
            Err(TransferError::Connection(what.to_string()))
        }
        Err(e) => Err(TransferError::connection(what)(e)),
    }
}

/// Reduce a received filename to a bare name that stays inside the
/// destination directory.
///
/// Only the last component survives either separator style. Names that are
/// empty, `.`, `..` or contain NUL are refused.
pub fn sanitize_filename(raw: &str) -> Result<&str, TransferError> {
    let name = raw.rsplit(['/', '\\']).next().unwrap_or_default();
    if name.is_empty() || name == "." || name == ".." || name.contains('\0') {
        return Err(TransferError::InvalidFilename(raw.to_string()));
    }
    if name.len() != raw.len() {
        tracing::warn!(received = raw, stored = name, "stripped directories from filename");
    }
    Ok(name)
}

/// Best-effort removal of a partial download.
async fn remove_partial(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(path = %path.display(), error = %e, "failed to remove partial file"),
    }
}
