//! Decoding pipeline: framed bytes in, messages out.
//!
//! ```text
//! Source ─► Decoder Task ─► [queue] ─► MessageReceiver ─► Consumer
//!                │
//!                └─► ErrorReceiver
//! ```
//!
//! The decoder task owns the source and reads one record at a time. It
//! only reads the next record after the previous message has been queued,
//! so a slow consumer stalls the source instead of buffering it.
//!
//! A clean end-of-stream closes both queues without an error. Any other
//! failure is reported once, after which both queues close and no more
//! bytes are read, even if valid records follow.
//!
//! # Example
//!
//! ```
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! use netqueue::protocol::{encode_message, DEFAULT_MAX_PAYLOAD_SIZE};
//! use netqueue::{channel_from_reader, Message};
//!
//! let msg = Message::new("regenerate apprc", ["app1"]);
//! let bytes = encode_message(&msg, DEFAULT_MAX_PAYLOAD_SIZE).unwrap();
//!
//! let (mut messages, mut errors) = channel_from_reader(std::io::Cursor::new(bytes));
//! assert_eq!(messages.recv().await, Some(msg));
//! assert_eq!(messages.recv().await, None);
//! assert!(errors.recv().await.is_none());
//! # }
//! ```

use tokio::io::AsyncRead;
use tokio::sync::mpsc;

use crate::codec::MsgPackCodec;
use crate::config::PipelineConfig;
use crate::error::{NetqueueError, Result};
use crate::protocol::FrameReader;
use crate::queue::{ErrorReceiver, MessageReceiver, QueueReceiver};
use crate::Message;

/// Start a decoding pipeline over `reader` with default configuration.
///
/// Must be called from within a tokio runtime.
pub fn channel_from_reader<R>(reader: R) -> (MessageReceiver, ErrorReceiver)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    channel_from_reader_with_config(reader, &PipelineConfig::default())
}

/// Start a decoding pipeline over `reader`.
///
/// Zero capacities in `config` are treated as 1.
pub fn channel_from_reader_with_config<R>(
    reader: R,
    config: &PipelineConfig,
) -> (MessageReceiver, ErrorReceiver)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let (msg_tx, msg_rx) = mpsc::channel(config.queue_capacity_clamped());
    let (err_tx, err_rx) = mpsc::channel(config.error_capacity_clamped());

    let frames = FrameReader::with_max_payload(reader, config.max_payload_size);
    tokio::spawn(decoder_loop(frames, msg_tx, err_tx));

    (QueueReceiver::new(msg_rx), QueueReceiver::new(err_rx))
}

/// Main decoder loop. Runs until end-of-stream, the first failure, or the
/// message receiver going away.
///
/// Both senders are dropped on return, which closes both queues.
async fn decoder_loop<R>(
    mut frames: FrameReader<R>,
    msg_tx: mpsc::Sender<Message>,
    err_tx: mpsc::Sender<NetqueueError>,
) where
    R: AsyncRead + Unpin,
{
    tracing::debug!("decoder started");

    loop {
        let msg = match read_message(&mut frames).await {
            Ok(Some(msg)) => msg,
            Ok(None) => {
                tracing::debug!(frames = frames.frames_read(), "decoder reached end of stream");
                break;
            }
            Err(e) => {
                tracing::error!(frames = frames.frames_read(), error = %e, "decoder failed");
                if err_tx.send(e).await.is_err() {
                    tracing::warn!("error receiver dropped, discarding decoder error");
                }
                break;
            }
        };

        // Blocks while the message queue is full
        if msg_tx.send(msg).await.is_err() {
            tracing::debug!("message receiver dropped, stopping decoder");
            break;
        }
    }

    tracing::debug!("decoder stopped");
}

/// Read and deserialize the next record.
async fn read_message<R>(frames: &mut FrameReader<R>) -> Result<Option<Message>>
where
    R: AsyncRead + Unpin,
{
    match frames.read_frame().await? {
        Some(payload) => Ok(Some(MsgPackCodec::decode(&payload)?)),
        None => Ok(None),
    }
}
