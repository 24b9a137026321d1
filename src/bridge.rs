//! Both pipelines over one duplex transport.
//!
//! A socket or pipe is split into its read and write halves. The write
//! half feeds an encoding pipeline, the read half a decoding pipeline.
//! Each half is owned by exactly one worker.
//!
//! # Example
//!
//! ```
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! use netqueue::{bridge, Message};
//!
//! let (left, right) = tokio::io::duplex(4096);
//! let a = bridge(left);
//! let mut b = bridge(right);
//!
//! a.sender.send(Message::new("restart", ["app1"])).await.unwrap();
//! assert_eq!(b.receiver.recv().await.unwrap().action, "restart");
//! # }
//! ```

use tokio::io::{AsyncRead, AsyncWrite};

use crate::config::PipelineConfig;
use crate::decoder::channel_from_reader_with_config;
use crate::encoder::channel_from_writer_with_config;
use crate::queue::{ErrorReceiver, MessageReceiver, MessageSender};

/// Handles for both directions of a transport.
#[derive(Debug)]
pub struct Bridge {
    /// Outgoing messages.
    pub sender: MessageSender,
    /// Failures while encoding or writing outgoing messages.
    pub send_errors: ErrorReceiver,
    /// Incoming messages.
    pub receiver: MessageReceiver,
    /// The failure, if any, that ended the incoming stream.
    pub recv_errors: ErrorReceiver,
}

/// Start both pipelines over `stream` with default configuration.
pub fn bridge<S>(stream: S) -> Bridge
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    bridge_with_config(stream, &PipelineConfig::default())
}

/// Start both pipelines over `stream`.
pub fn bridge_with_config<S>(stream: S, config: &PipelineConfig) -> Bridge
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    let (read_half, write_half) = tokio::io::split(stream);

    let (sender, send_errors) = channel_from_writer_with_config(write_half, config);
    let (receiver, recv_errors) = channel_from_reader_with_config(read_half, config);

    Bridge {
        sender,
        send_errors,
        receiver,
        recv_errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Message;

    #[tokio::test]
    async fn test_bidirectional_exchange() {
        let (left, right) = tokio::io::duplex(64);
        let mut a = bridge(left);
        let mut b = bridge(right);

        a.sender.send(Message::new("ping", ["1"])).await.unwrap();
        b.sender.send(Message::new("pong", ["2"])).await.unwrap();

        assert_eq!(b.receiver.recv().await.unwrap(), Message::new("ping", ["1"]));
        assert_eq!(a.receiver.recv().await.unwrap(), Message::new("pong", ["2"]));
    }

    #[tokio::test]
    async fn test_closing_one_side_ends_the_other() {
        let (left, right) = tokio::io::duplex(64);
        let mut a = bridge(left);
        let mut b = bridge(right);

        a.sender.send(Message::action_only("last")).await.unwrap();
        a.sender.close();

        // Encoder drains, shuts down its write half, then closes its errors
        assert!(a.send_errors.recv().await.is_none());

        assert_eq!(b.receiver.recv().await.unwrap().action, "last");
        assert!(b.receiver.recv().await.is_none());
        assert!(b.recv_errors.recv().await.is_none());
    }
}
