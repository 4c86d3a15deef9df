use crate::*;

use ether_core::wire::{encode, HEADER_LEN};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

/// Write one hand-built frame, then close the connection.
async fn send_frame(port: u16, name: &[u8], declared_size: u64, body: &[u8]) -> Result<()> {
    let mut conn = TcpStream::connect(("127.0.0.1", port)).await?;
    let header = encode(name.len() as u32, declared_size);
    assert_eq!(header.len(), HEADER_LEN);
    conn.write_all(&header).await?;
    conn.write_all(name).await?;
    conn.write_all(body).await?;
    conn.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn hand_built_frame_is_stored() {
    let dst_dir = tempfile::tempdir().unwrap();
    let log = Recorder::new();
    let (port, receiver) = spawn_receiver(dst_dir.path(), log.hooks(), CancelToken::new())
        .await
        .unwrap();

    let body = payload(5000);
    send_frame(port, "daten-ü.bin".as_bytes(), body.len() as u64, &body)
        .await
        .unwrap();

    let stored = match join(receiver).await.unwrap() {
        ReceiveOutcome::Received(path) => path,
        other => panic!("expected a stored file, got {other:?}"),
    };
    assert_eq!(stored, dst_dir.path().join("daten-ü.bin"));
    assert_eq!(std::fs::read(&stored).unwrap(), body);
    assert_progress_complete(&log.progress(), body.len() as u64);
}

#[tokio::test]
async fn directory_components_in_name_are_dropped() {
    let dst_dir = tempfile::tempdir().unwrap();
    let (port, receiver) = spawn_receiver(dst_dir.path(), TransferHooks::new(), CancelToken::new())
        .await
        .unwrap();

    send_frame(port, b"../../escape.txt", 3, b"abc").await.unwrap();

    let stored = match join(receiver).await.unwrap() {
        ReceiveOutcome::Received(path) => path,
        other => panic!("expected a stored file, got {other:?}"),
    };
    assert_eq!(stored, dst_dir.path().join("escape.txt"));
    assert_eq!(std::fs::read(&stored).unwrap(), b"abc");
}

#[tokio::test]
async fn short_body_fails_and_keeps_partial_file() {
    let dst_dir = tempfile::tempdir().unwrap();
    let log = Recorder::new();
    let (port, receiver) = spawn_receiver(dst_dir.path(), log.hooks(), CancelToken::new())
        .await
        .unwrap();

    send_frame(port, b"short.bin", 100, &[1u8; 40]).await.unwrap();

    let err = join(receiver).await.unwrap_err();
    assert!(
        matches!(&err, TransferError::Connection(m) if m == "connection closed before file transfer finished"),
        "{err}"
    );
    // Only cancellation removes a partial file.
    assert!(dst_dir.path().join("short.bin").exists());
    assert!(matches!(log.statuses().last(), Some(TransferStatus::Failed(_))));
}
