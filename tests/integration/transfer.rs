use crate::*;

use ether_transfer::{FileSender, SendOutcome};

async fn round_trip(len: usize, chunk_size: usize) -> Result<()> {
    let src_dir = tempfile::tempdir()?;
    let dst_dir = tempfile::tempdir()?;
    let source = src_dir.path().join(format!("sample-{len}.bin"));
    let data = payload(len);
    std::fs::write(&source, &data)?;

    let receiver_log = Recorder::new();
    let (port, receiver) =
        spawn_receiver(dst_dir.path(), receiver_log.hooks(), CancelToken::new()).await?;

    let sender_log = Recorder::new();
    let outcome = FileSender::new("127.0.0.1", port)
        .chunk_size(chunk_size)
        .hooks(sender_log.hooks())
        .send(&source)
        .await?;
    assert_eq!(outcome, SendOutcome::Completed { bytes: len as u64 });

    let stored = match join(receiver).await? {
        ReceiveOutcome::Received(path) => path,
        other => panic!("expected a stored file, got {other:?}"),
    };
    assert_eq!(stored, dst_dir.path().join(format!("sample-{len}.bin")));
    assert_eq!(std::fs::read(&stored)?, data, "content mismatch for {len} bytes");

    assert_progress_complete(&sender_log.progress(), len as u64);
    assert_progress_complete(&receiver_log.progress(), len as u64);
    Ok(())
}

#[tokio::test]
async fn empty_file_round_trip() {
    round_trip(0, 64 * 1024).await.unwrap();
}

#[tokio::test]
async fn single_byte_round_trip() {
    round_trip(1, 64 * 1024).await.unwrap();
}

#[tokio::test]
async fn chunk_boundary_round_trips() {
    for len in [64 * 1024 - 1, 64 * 1024, 64 * 1024 + 1] {
        round_trip(len, 64 * 1024).await.unwrap();
    }
}

#[tokio::test]
async fn multi_chunk_round_trip_with_small_chunks() {
    round_trip(300_003, 4096).await.unwrap();
}

#[tokio::test]
async fn large_file_round_trip() {
    round_trip(3 * 1024 * 1024 + 17, 64 * 1024).await.unwrap();
}

#[tokio::test]
async fn unicode_filename_is_preserved() {
    let src_dir = tempfile::tempdir().unwrap();
    let dst_dir = tempfile::tempdir().unwrap();
    let source = src_dir.path().join("résumé – 2024.txt");
    std::fs::write(&source, b"bonjour").unwrap();

    let (port, receiver) = spawn_receiver(dst_dir.path(), TransferHooks::new(), CancelToken::new())
        .await
        .unwrap();
    ether_transfer::send_file("127.0.0.1", port, &source, TransferHooks::new(), CancelToken::new())
        .await
        .unwrap();

    let outcome = join(receiver).await.unwrap();
    let expected = dst_dir.path().join("résumé – 2024.txt");
    assert_eq!(outcome, ReceiveOutcome::Received(expected.clone()));
    assert_eq!(std::fs::read(expected).unwrap(), b"bonjour");
}

#[tokio::test]
async fn existing_destination_is_overwritten() {
    let src_dir = tempfile::tempdir().unwrap();
    let dst_dir = tempfile::tempdir().unwrap();
    let source = src_dir.path().join("note.txt");
    std::fs::write(&source, b"new").unwrap();
    std::fs::write(dst_dir.path().join("note.txt"), b"much older content").unwrap();

    let (port, receiver) = spawn_receiver(dst_dir.path(), TransferHooks::new(), CancelToken::new())
        .await
        .unwrap();
    FileSender::new("127.0.0.1", port).send(&source).await.unwrap();
    join(receiver).await.unwrap();

    assert_eq!(std::fs::read(dst_dir.path().join("note.txt")).unwrap(), b"new");
}

#[tokio::test]
async fn missing_destination_directory_is_created() {
    let src_dir = tempfile::tempdir().unwrap();
    let root = tempfile::tempdir().unwrap();
    let nested = root.path().join("a").join("b").join("inbox");
    let source = src_dir.path().join("x.dat");
    std::fs::write(&source, payload(10)).unwrap();

    let (port, receiver) = spawn_receiver(&nested, TransferHooks::new(), CancelToken::new())
        .await
        .unwrap();
    assert!(nested.is_dir());

    FileSender::new("127.0.0.1", port).send(&source).await.unwrap();
    assert_eq!(
        join(receiver).await.unwrap(),
        ReceiveOutcome::Received(nested.join("x.dat"))
    );
}

#[tokio::test]
async fn status_milestones_follow_wire_order() {
    let src_dir = tempfile::tempdir().unwrap();
    let dst_dir = tempfile::tempdir().unwrap();
    let source = src_dir.path().join("order.txt");
    std::fs::write(&source, payload(5000)).unwrap();

    let receiver_log = Recorder::new();
    let (port, receiver) = spawn_receiver(dst_dir.path(), receiver_log.hooks(), CancelToken::new())
        .await
        .unwrap();
    let sender_log = Recorder::new();
    FileSender::new("127.0.0.1", port)
        .hooks(sender_log.hooks())
        .send(&source)
        .await
        .unwrap();
    join(receiver).await.unwrap();

    let sent = sender_log.statuses();
    assert_eq!(sent.len(), 3, "{sent:?}");
    assert!(matches!(sent[0], TransferStatus::Connecting { .. }));
    assert_eq!(sent[1], TransferStatus::Transferring);
    assert_eq!(sent[2], TransferStatus::Completed);

    let received = receiver_log.statuses();
    assert_eq!(received.len(), 3, "{received:?}");
    assert_eq!(received[0], TransferStatus::WaitingForSender { port });
    assert!(matches!(received[1], TransferStatus::Connected { .. }));
    assert_eq!(
        received[2],
        TransferStatus::Received(dst_dir.path().join("order.txt"))
    );
    assert!(received[2].to_string().starts_with("file received: "));
}

#[tokio::test]
async fn missing_source_opens_no_connection() {
    let dst_dir = tempfile::tempdir().unwrap();
    let cancel = CancelToken::new();
    let (port, receiver) = spawn_receiver(dst_dir.path(), TransferHooks::new(), cancel.clone())
        .await
        .unwrap();

    let err = FileSender::new("127.0.0.1", port)
        .send(dst_dir.path().join("nope.bin"))
        .await
        .unwrap_err();
    assert!(matches!(err, TransferError::FileNotFound(_)), "{err}");

    // The receiver never saw a sender; it is still waiting until cancelled.
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert!(!receiver.is_finished());
    cancel.cancel();
    assert_eq!(join(receiver).await.unwrap(), ReceiveOutcome::Cancelled);
}
