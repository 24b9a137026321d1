//! Bounded queue handles.
//!
//! Thin wrappers over `tokio::sync::mpsc` bounded channels that expose
//! only the direction a caller is allowed to use:
//!
//! - [`MessageSender`]: send-only end of an encoder's input queue
//! - [`MessageReceiver`]: receive-only end of a decoder's output queue
//! - [`ErrorReceiver`]: receive-only end of either pipeline's error queue
//!
//! Sending into a full queue waits; receiving from an empty open queue
//! waits; receiving from an empty closed queue returns `None` at once.

use std::time::Duration;

use tokio::sync::mpsc;

use crate::error::{NetqueueError, Result};
use crate::Message;

/// Send-only handle to an encoding pipeline's message queue.
///
/// Cloneable. The queue closes once every clone has been closed or
/// dropped; the encoder then drains what is buffered and closes its
/// error queue.
#[derive(Debug, Clone)]
pub struct MessageSender {
    tx: mpsc::Sender<Message>,
}

impl MessageSender {
    pub(crate) fn new(tx: mpsc::Sender<Message>) -> Self {
        Self { tx }
    }

    /// Queue a message, waiting while the queue is full.
    ///
    /// Returns `Err(QueueClosed)` if the encoder is gone.
    pub async fn send(&self, msg: Message) -> Result<()> {
        self.tx
            .send(msg)
            .await
            .map_err(|_| NetqueueError::QueueClosed)
    }

    /// Queue a message without waiting.
    ///
    /// Returns `Err(QueueFull)` immediately if at capacity.
    pub fn try_send(&self, msg: Message) -> Result<()> {
        self.tx.try_send(msg).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => NetqueueError::QueueFull,
            mpsc::error::TrySendError::Closed(_) => NetqueueError::QueueClosed,
        })
    }

    /// Close this handle. Same as dropping it.
    pub fn close(self) {
        drop(self);
    }

    /// Free slots left in the queue.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.tx.capacity()
    }

    /// Total size of the queue.
    #[inline]
    pub fn max_capacity(&self) -> usize {
        self.tx.max_capacity()
    }

    /// Whether the encoder has stopped receiving.
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Receive-only handle to a bounded queue.
#[derive(Debug)]
pub struct QueueReceiver<T> {
    rx: mpsc::Receiver<T>,
}

/// Receive-only handle to a decoding pipeline's message queue.
pub type MessageReceiver = QueueReceiver<Message>;

/// Receive-only handle to a pipeline's error queue.
pub type ErrorReceiver = QueueReceiver<NetqueueError>;

impl<T> QueueReceiver<T> {
    pub(crate) fn new(rx: mpsc::Receiver<T>) -> Self {
        Self { rx }
    }

    /// Receive the next item.
    ///
    /// Returns `None` once the queue is closed and drained.
    pub async fn recv(&mut self) -> Option<T> {
        self.rx.recv().await
    }

    /// Receive without waiting.
    ///
    /// - `Ok(Some(item))`: an item was buffered
    /// - `Ok(None)`: queue is empty but still open
    /// - `Err(QueueClosed)`: queue is closed and drained
    pub fn try_recv(&mut self) -> Result<Option<T>> {
        match self.rx.try_recv() {
            Ok(item) => Ok(Some(item)),
            Err(mpsc::error::TryRecvError::Empty) => Ok(None),
            Err(mpsc::error::TryRecvError::Disconnected) => Err(NetqueueError::QueueClosed),
        }
    }

    /// Receive the next item, giving up after `timeout`.
    ///
    /// Returns `Err(Timeout)` if nothing arrived in time, `Ok(None)` if the
    /// queue closed.
    pub async fn recv_timeout(&mut self, timeout: Duration) -> Result<Option<T>> {
        tokio::time::timeout(timeout, self.rx.recv())
            .await
            .map_err(|_| NetqueueError::Timeout)
    }

    /// Stop the producing side from queueing more items.
    ///
    /// Items already buffered can still be received.
    pub fn close(&mut self) {
        self.rx.close();
    }
}
