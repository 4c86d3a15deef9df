//! Ether integration test harness.
//!
//! Every test runs a real sender and receiver against each other over
//! loopback TCP. Receivers bind port 0, so tests can run in parallel.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use tokio::task::JoinHandle;

use ether_transfer::{
    CancelToken, FileReceiver, ProgressEvent, ReceiveOutcome, TransferError, TransferHooks,
    TransferStatus,
};

mod framing;
mod transfer;

// ── Harness ───────────────────────────────────────────────────────────────────

/// Upper bound for any single session in these tests.
pub const SESSION_TIMEOUT: Duration = Duration::from_secs(20);

/// Records every hook invocation of one session.
#[derive(Clone, Default)]
pub struct Recorder {
    progress: Arc<Mutex<Vec<ProgressEvent>>>,
    statuses: Arc<Mutex<Vec<TransferStatus>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hooks(&self) -> TransferHooks {
        let progress = self.progress.clone();
        let statuses = self.statuses.clone();
        TransferHooks::new()
            .on_progress(move |e| progress.lock().unwrap().push(e))
            .on_status(move |s| statuses.lock().unwrap().push(s.clone()))
    }

    pub fn record_progress(&self, event: ProgressEvent) {
        self.progress.lock().unwrap().push(event);
    }

    pub fn progress(&self) -> Vec<ProgressEvent> {
        self.progress.lock().unwrap().clone()
    }

    pub fn statuses(&self) -> Vec<TransferStatus> {
        self.statuses.lock().unwrap().clone()
    }
}

/// Deterministic, non-repeating test payload.
pub fn payload(len: usize) -> Vec<u8> {
    let mut state: u32 = 0x9e37_79b9 ^ len as u32;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            state as u8
        })
        .collect()
}

/// Bind a receiver on an ephemeral port and run it in the background.
pub async fn spawn_receiver(
    destination: &Path,
    hooks: TransferHooks,
    cancel: CancelToken,
) -> Result<(u16, JoinHandle<Result<ReceiveOutcome, TransferError>>)> {
    let session = FileReceiver::new(destination)
        .accept_poll(Duration::from_millis(50))
        .hooks(hooks)
        .cancel_token(cancel)
        .listen(0)
        .await?;
    let port = session.local_addr().port();
    Ok((port, tokio::spawn(session.run())))
}

/// Await a spawned session, failing the test if it hangs.
pub async fn join<T>(handle: JoinHandle<T>) -> T {
    tokio::time::timeout(SESSION_TIMEOUT, handle)
        .await
        .expect("session did not finish in time")
        .expect("session task panicked")
}

/// Progress must never go backwards and must end at the total.
pub fn assert_progress_complete(events: &[ProgressEvent], total: u64) {
    assert!(!events.is_empty(), "no progress reported");
    for pair in events.windows(2) {
        assert!(
            pair[0].bytes_moved <= pair[1].bytes_moved,
            "progress went backwards: {:?} -> {:?}",
            pair[0],
            pair[1]
        );
    }
    assert!(events.iter().all(|e| e.total_bytes == total));
    assert_eq!(events.last().copied(), Some(ProgressEvent::new(total, total)));
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[test]
fn payload_is_deterministic() {
    assert_eq!(payload(1000), payload(1000));
    assert_ne!(payload(1000)[..16], payload(999)[..16]);
}
