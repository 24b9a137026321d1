//! MsgPack codec using `rmp-serde`.
//!
//! **Always use `to_vec_named`, never `to_vec`.** `to_vec` writes structs
//! as positional arrays, which breaks as soon as a field is added or
//! reordered on one side only. `to_vec_named` writes a map keyed by field
//! name, so a reader built against a different revision of [`Message`]
//! still finds the fields it knows.
//!
//! [`Message`]: crate::Message

use std::io::Cursor;

use crate::error::{NetqueueError, Result};

/// MessagePack codec for record payloads.
pub struct MsgPackCodec;

impl MsgPackCodec {
    /// Encode a value to MsgPack bytes (struct-as-map).
    ///
    /// # Errors
    ///
    /// Returns [`NetqueueError::Serialization`](crate::NetqueueError::Serialization)
    /// if the value cannot be serialized.
    #[inline]
    pub fn encode<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
        Ok(rmp_serde::to_vec_named(value)?)
    }

    /// Decode MsgPack bytes to a value. The value must span all of `bytes`.
    ///
    /// # Errors
    ///
    /// Returns [`NetqueueError::Decode`] if the bytes cannot be deserialized
    /// to `T`, or [`NetqueueError::Protocol`] if bytes are left over after it.
    pub fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T> {
        let mut cursor = Cursor::new(bytes);
        let value = rmp_serde::from_read(&mut cursor)?;

        let consumed = cursor.position() as usize;
        if consumed != bytes.len() {
            return Err(NetqueueError::Protocol(format!(
                "Trailing bytes in record: {} of {} unused",
                bytes.len() - consumed,
                bytes.len()
            )));
        }
        Ok(value)
    }
}
