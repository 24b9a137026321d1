//! Encoding pipeline: messages in, framed bytes out.
//!
//! ```text
//! Producer ─► MessageSender ─► [queue] ─► Encoder Task ─► Sink
//!                                              │
//!                              ErrorReceiver ◄─┘
//! ```
//!
//! The encoder task owns the sink. A failed message is reported on the
//! error queue and the task moves on to the next one. Once every
//! [`MessageSender`] is gone and the queue is drained, the task shuts the
//! sink down and closes the error queue. That close is the only signal
//! that the pipeline has finished.
//!
//! # Example
//!
//! ```
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! use netqueue::{channel_from_writer, Message};
//!
//! let (tx, mut errors) = channel_from_writer(tokio::io::sink());
//! tx.send(Message::new("regenerate apprc", ["app1"])).await.unwrap();
//! tx.close();
//!
//! // No errors, and the queue closes once the message is written
//! assert!(errors.recv().await.is_none());
//! # }
//! ```

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;

use crate::config::PipelineConfig;
use crate::error::{NetqueueError, Result};
use crate::protocol::encode_message;
use crate::queue::{ErrorReceiver, MessageSender, QueueReceiver};
use crate::Message;

/// Start an encoding pipeline over `writer` with default configuration.
///
/// The encoder takes ownership of `writer`. After the last [`MessageSender`]
/// is closed and the queue drained, it calls `shutdown()` on the writer
/// before closing the error queue.
///
/// Must be called from within a tokio runtime.
pub fn channel_from_writer<W>(writer: W) -> (MessageSender, ErrorReceiver)
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    channel_from_writer_with_config(writer, &PipelineConfig::default())
}

/// Start an encoding pipeline over `writer`.
///
/// Shuts `writer` down once drained, as [`channel_from_writer`] does.
/// Zero capacities in `config` are treated as 1.
pub fn channel_from_writer_with_config<W>(
    writer: W,
    config: &PipelineConfig,
) -> (MessageSender, ErrorReceiver)
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (msg_tx, msg_rx) = mpsc::channel(config.queue_capacity_clamped());
    let (err_tx, err_rx) = mpsc::channel(config.error_capacity_clamped());

    tokio::spawn(encoder_loop(
        msg_rx,
        writer,
        err_tx,
        config.max_payload_size,
    ));

    (MessageSender::new(msg_tx), QueueReceiver::new(err_rx))
}

/// Main encoder loop. Exits when the message queue is closed and drained.
///
/// `err_tx` is dropped on return, which closes the error queue.
async fn encoder_loop<W>(
    mut rx: mpsc::Receiver<Message>,
    mut writer: W,
    err_tx: mpsc::Sender<NetqueueError>,
    max_payload_size: u32,
) where
    W: AsyncWrite + Unpin,
{
    tracing::debug!("encoder started");

    let mut written = 0u64;
    let mut failed = 0u64;

    while let Some(msg) = rx.recv().await {
        match write_message(&mut writer, &msg, max_payload_size).await {
            Ok(()) => written += 1,
            Err(e) => {
                failed += 1;
                tracing::warn!(action = %msg.action, error = %e, "failed to encode message");
                // Blocks while the error queue is full
                if err_tx.send(e).await.is_err() {
                    tracing::warn!("error receiver dropped, discarding encoder error");
                }
            }
        }
    }

    if let Err(e) = writer.shutdown().await {
        tracing::debug!(error = %e, "sink shutdown failed");
    }

    tracing::debug!(written, failed, "encoder stopped");
}

/// Serialize one message and write it to the sink as a single record.
async fn write_message<W>(writer: &mut W, msg: &Message, max_payload_size: u32) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let frame = encode_message(msg, max_payload_size)?;

    writer
        .write_all(&frame)
        .await
        .map_err(NetqueueError::Write)?;
    writer.flush().await.map_err(NetqueueError::Write)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::MsgPackCodec;
    use crate::error::ErrorKind;
    use crate::protocol::{Header, HEADER_SIZE};
    use std::io::Cursor;
    use std::pin::Pin;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::task::{Context, Poll};
    use std::time::Duration;

    /// Sink that fails exactly one `poll_write` call and records the rest.
    struct FailingSink {
        fail_on: usize,
        calls: Arc<AtomicUsize>,
        written: Arc<Mutex<Vec<u8>>>,
    }

    impl AsyncWrite for FailingSink {
        fn poll_write(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &[u8],
        ) -> Poll<std::io::Result<usize>> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call == self.fail_on {
                return Poll::Ready(Err(std::io::Error::new(
                    std::io::ErrorKind::BrokenPipe,
                    "injected failure",
                )));
            }
            self.written.lock().unwrap().extend_from_slice(buf);
            Poll::Ready(Ok(buf.len()))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    /// Sink that never accepts a byte.
    struct StuckSink;

    impl AsyncWrite for StuckSink {
        fn poll_write(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &[u8],
        ) -> Poll<std::io::Result<usize>> {
            Poll::Pending
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
            Poll::Pending
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
            Poll::Pending
        }
    }

    fn split_records(mut bytes: &[u8]) -> Vec<Message> {
        let mut messages = Vec::new();
        while !bytes.is_empty() {
            let header = Header::decode(bytes).unwrap();
            let end = HEADER_SIZE + header.payload_length as usize;
            messages.push(MsgPackCodec::decode(&bytes[HEADER_SIZE..end]).unwrap());
            bytes = &bytes[end..];
        }
        messages
    }

    #[tokio::test]
    async fn test_write_message_to_buffer() {
        let mut buf = Cursor::new(Vec::new());
        let msg = Message::new("regenerate apprc", ["app1"]);

        write_message(&mut buf, &msg, u32::MAX).await.unwrap();

        assert_eq!(split_records(&buf.into_inner()), vec![msg]);
    }

    #[tokio::test]
    async fn test_error_queue_closes_after_drain() {
        let written = Arc::new(Mutex::new(Vec::new()));
        let sink = FailingSink {
            fail_on: 0,
            calls: Arc::new(AtomicUsize::new(0)),
            written: written.clone(),
        };
        let (tx, mut errors) = channel_from_writer(sink);

        for i in 0..5 {
            tx.send(Message::new("job", [i.to_string()])).await.unwrap();
        }
        tx.close();

        assert!(errors.recv().await.is_none());
        let messages = split_records(&written.lock().unwrap());
        assert_eq!(messages.len(), 5);
        assert_eq!(messages[4].args, vec!["4"]);
    }

    #[tokio::test]
    async fn test_failed_write_does_not_stop_pipeline() {
        let calls = Arc::new(AtomicUsize::new(0));
        let written = Arc::new(Mutex::new(Vec::new()));
        let sink = FailingSink {
            fail_on: 2,
            calls: calls.clone(),
            written: written.clone(),
        };
        let (tx, mut errors) = channel_from_writer(sink);

        tx.send(Message::action_only("first")).await.unwrap();
        tx.send(Message::action_only("second")).await.unwrap();
        tx.send(Message::action_only("third")).await.unwrap();
        tx.close();

        let err = errors.recv().await.expect("one write error");
        assert_eq!(err.kind(), ErrorKind::Write);
        assert!(errors.recv().await.is_none(), "exactly one error");

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        let actions: Vec<_> = split_records(&written.lock().unwrap())
            .into_iter()
            .map(|m| m.action)
            .collect();
        assert_eq!(actions, vec!["first", "third"]);
    }

    #[tokio::test]
    async fn test_oversized_message_reported_and_skipped() {
        let written = Arc::new(Mutex::new(Vec::new()));
        let sink = FailingSink {
            fail_on: 0,
            calls: Arc::new(AtomicUsize::new(0)),
            written: written.clone(),
        };
        let config = PipelineConfig::default().with_max_payload_size(64);
        let (tx, mut errors) = channel_from_writer_with_config(sink, &config);

        tx.send(Message::new("big", ["x".repeat(128)])).await.unwrap();
        tx.send(Message::action_only("small")).await.unwrap();
        tx.close();

        let err = errors.recv().await.unwrap();
        assert_eq!(err.kind(), ErrorKind::Serialization);
        assert!(errors.recv().await.is_none());

        let messages = split_records(&written.lock().unwrap());
        assert_eq!(messages, vec![Message::action_only("small")]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_error_queue_stalls_encoder() {
        // Every message is over the payload limit; error queue holds one error
        let calls = Arc::new(AtomicUsize::new(0));
        let sink = FailingSink {
            fail_on: 1,
            calls: calls.clone(),
            written: Arc::new(Mutex::new(Vec::new())),
        };
        let config = PipelineConfig::default()
            .with_error_capacity(1)
            .with_max_payload_size(8);
        let (tx, mut errors) = channel_from_writer_with_config(sink, &config);

        for _ in 0..3 {
            tx.send(Message::action_only("way too long to fit"))
                .await
                .unwrap();
        }
        tx.close();

        // First error fills the queue, second blocks the worker
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(errors.try_recv().unwrap().unwrap().kind(), ErrorKind::Serialization);

        // Errors are delayed, never dropped
        let mut remaining = 0;
        while let Some(err) = errors.recv().await {
            assert_eq!(err.kind(), ErrorKind::Serialization);
            remaining += 1;
        }
        assert_eq!(remaining, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 0, "nothing reached the sink");
    }

    #[tokio::test(start_paused = true)]
    async fn test_input_queue_backpressure() {
        let config = PipelineConfig::default().with_queue_capacity(2);
        let (tx, _errors) = channel_from_writer_with_config(StuckSink, &config);

        // The worker takes the first message and hangs on the sink
        tx.send(Message::action_only("held")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        tx.try_send(Message::action_only("queued 1")).unwrap();
        tx.try_send(Message::action_only("queued 2")).unwrap();
        assert!(matches!(
            tx.try_send(Message::action_only("overflow")),
            Err(NetqueueError::QueueFull)
        ));

        let blocked = tokio::time::timeout(
            Duration::from_millis(20),
            tx.send(Message::action_only("overflow")),
        )
        .await;
        assert!(blocked.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_error_receiver_keeps_encoding() {
        let written = Arc::new(Mutex::new(Vec::new()));
        let sink = FailingSink {
            fail_on: 1,
            calls: Arc::new(AtomicUsize::new(0)),
            written: written.clone(),
        };
        let (tx, errors) = channel_from_writer(sink);
        drop(errors);

        tx.send(Message::action_only("lost")).await.unwrap();
        tx.send(Message::action_only("kept")).await.unwrap();

        tx.close();
        tokio::time::sleep(Duration::from_millis(50)).await;

        let messages = split_records(&written.lock().unwrap());
        assert_eq!(messages, vec![Message::action_only("kept")]);
    }
}
