//! Error types for netqueue.

use thiserror::Error;

/// Main error type for all netqueue operations.
///
/// Pipeline failures (`Serialization`, `Write`, `Decode`, `Protocol`,
/// `Source`) are delivered through a pipeline's error queue. Queue handle
/// failures (`QueueClosed`, `QueueFull`, `Timeout`) are returned directly
/// to the caller.
#[derive(Debug, Error)]
pub enum NetqueueError {
    /// A message could not be converted to wire format.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The sink rejected a write or flush.
    #[error("write error: {0}")]
    Write(#[source] std::io::Error),

    /// The payload of a record is not a valid message.
    #[error("decode error: {0}")]
    Decode(#[from] rmp_serde::decode::Error),

    /// Malformed framing (bad version, oversized length, truncated record).
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The source failed to produce bytes.
    #[error("source error: {0}")]
    Source(#[source] std::io::Error),

    /// The other end of a queue is gone.
    #[error("queue closed")]
    QueueClosed,

    /// The queue is at capacity.
    #[error("queue full")]
    QueueFull,

    /// No item arrived before the deadline.
    #[error("timed out waiting for queue")]
    Timeout,

    /// Configuration value out of range or unparseable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Coarse classification of a [`NetqueueError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Encoding side: the message could not be serialized.
    Serialization,
    /// Encoding side: the sink failed.
    Write,
    /// Decoding side: bytes could not be parsed into a record.
    Decode,
    /// Decoding side: the source failed.
    Source,
    /// Queue handle misuse (closed, full, timeout).
    Queue,
    /// Bad configuration.
    Config,
}

impl NetqueueError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Serialization(_) => ErrorKind::Serialization,
            Self::Write(_) => ErrorKind::Write,
            Self::Decode(_) | Self::Protocol(_) => ErrorKind::Decode,
            Self::Source(_) => ErrorKind::Source,
            Self::QueueClosed | Self::QueueFull | Self::Timeout => ErrorKind::Queue,
            Self::InvalidConfig(_) => ErrorKind::Config,
        }
    }
}

impl From<rmp_serde::encode::Error> for NetqueueError {
    fn from(err: rmp_serde::encode::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type alias using NetqueueError.
pub type Result<T> = std::result::Result<T, NetqueueError>;
