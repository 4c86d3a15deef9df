//! Reachability probe — can we open a TCP connection to the receiver?

use std::time::Duration;

use tokio::net::TcpStream;

/// Outcome of [`check_connection`]. Never an error: failures are described
/// in `message`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reachability {
    pub reachable: bool,
    pub message: String,
}

/// Attempt a bounded-time TCP connect to `host:port`.
///
/// On success the connection is closed immediately without sending data.
/// The timeout covers name resolution as well as the handshake.
pub async fn check_connection(host: &str, port: u16, timeout: Duration) -> Reachability {
    match tokio::time::timeout(timeout, TcpStream::connect((host, port))).await {
        Ok(Ok(stream)) => {
            drop(stream);
            tracing::debug!(host, port, "probe connected");
            Reachability {
                reachable: true,
                message: format!("Successfully connected to {host}:{port}."),
            }
        }
        Ok(Err(e)) => {
            tracing::debug!(host, port, error = %e, "probe failed");
            Reachability {
                reachable: false,
                message: format!("Connection failed: {e}"),
            }
        }
        Err(_) => {
            tracing::debug!(host, port, timeout_ms = timeout.as_millis() as u64, "probe timed out");
            Reachability {
                reachable: false,
                message: format!("Connection failed: timed out after {}ms", timeout.as_millis()),
            }
        }
    }
}
