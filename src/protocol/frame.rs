//! Record framing: a header followed by a MessagePack payload.

use crate::codec::MsgPackCodec;
use crate::error::{NetqueueError, Result};
use crate::Message;

use super::wire_format::{Header, HEADER_SIZE};

/// Build a complete record from a raw payload.
///
/// # Errors
///
/// Returns [`NetqueueError::Serialization`] if the payload length does not
/// fit the 32-bit length field.
pub fn build_frame(payload: &[u8]) -> Result<Vec<u8>> {
    let length = header_length(payload.len())?;

    let mut buf = Vec::with_capacity(HEADER_SIZE + payload.len());
    buf.extend_from_slice(&Header::new(length).encode());
    buf.extend_from_slice(payload);
    Ok(buf)
}

fn header_length(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| {
        NetqueueError::Serialization(format!(
            "Payload size {} does not fit a record header",
            len
        ))
    })
}

/// Serialize a message into one complete record, ready to be written.
///
/// # Errors
///
/// Returns [`NetqueueError::Serialization`] if the message cannot be
/// serialized or its payload exceeds `max_payload_size`.
///
/// # Example
///
/// ```
/// use netqueue::protocol::{encode_message, DEFAULT_MAX_PAYLOAD_SIZE, HEADER_SIZE};
/// use netqueue::Message;
///
/// let bytes = encode_message(&Message::action_only("restart"), DEFAULT_MAX_PAYLOAD_SIZE).unwrap();
/// assert!(bytes.len() > HEADER_SIZE);
/// ```
pub fn encode_message(msg: &Message, max_payload_size: u32) -> Result<Vec<u8>> {
    let payload = MsgPackCodec::encode(msg)?;
    if payload.len() > max_payload_size as usize {
        return Err(NetqueueError::Serialization(format!(
            "Payload size {} exceeds maximum {}",
            payload.len(),
            max_payload_size
        )));
    }
    build_frame(&payload)
}
