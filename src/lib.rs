//! # netqueue
//!
//! Bounded in-process message queues bridged over any async byte stream.
//!
//! A producer pushes [`Message`]s into a bounded queue; an encoder task
//! serializes them onto a sink. On the other side a decoder task reads the
//! same bytes from a source and pushes reconstructed messages into another
//! bounded queue. Failures travel on a separate error queue per pipeline.
//!
//! ## Architecture
//!
//! - **Encoding pipeline** ([`channel_from_writer`]): failures are reported
//!   and the pipeline keeps going
//! - **Decoding pipeline** ([`channel_from_reader`]): the first failure is
//!   reported and the pipeline shuts down
//! - **Wire format** ([`protocol`]): 5-byte versioned header plus a
//!   MessagePack map per record
//!
//! ## Example
//!
//! ```
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! use netqueue::{channel_from_reader, channel_from_writer, Message};
//!
//! let (writer, reader) = tokio::io::duplex(4096);
//! let (tx, _send_errors) = channel_from_writer(writer);
//! let (mut rx, _recv_errors) = channel_from_reader(reader);
//!
//! tx.send(Message::new("regenerate apprc", ["app1"])).await.unwrap();
//! tx.send(Message::action_only("restart")).await.unwrap();
//!
//! assert_eq!(rx.recv().await.unwrap().args, vec!["app1"]);
//! assert_eq!(rx.recv().await.unwrap().action, "restart");
//! # }
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod protocol;
pub mod queue;

mod bridge;
mod decoder;
mod encoder;
mod message;

pub use bridge::{bridge, bridge_with_config, Bridge};
pub use config::PipelineConfig;
pub use decoder::{channel_from_reader, channel_from_reader_with_config};
pub use encoder::{channel_from_writer, channel_from_writer_with_config};
pub use error::{ErrorKind, NetqueueError, Result};
pub use message::{Message, DEFAULT_QUEUE_CAPACITY};
pub use queue::{ErrorReceiver, MessageReceiver, MessageSender, QueueReceiver};
