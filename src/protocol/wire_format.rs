//! Wire format encoding and decoding.
//!
//! Every record starts with a 5-byte header:
//! ```text
//! ┌─────────┬──────────┐
//! │ Version │ Length   │
//! │ 1 byte  │ 4 bytes  │
//! │ uint8   │ uint32 BE│
//! └─────────┴──────────┘
//! ```
//!
//! followed by `Length` bytes of MessagePack payload. Records are written
//! back-to-back with nothing in between.

use crate::error::{NetqueueError, Result};

/// Header size in bytes (fixed, exactly 5).
pub const HEADER_SIZE: usize = 5;

/// Current wire format version.
pub const WIRE_VERSION: u8 = 1;

/// Default maximum payload size (16 MiB).
pub const DEFAULT_MAX_PAYLOAD_SIZE: u32 = 16 * 1024 * 1024;

/// Decoded record header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Wire format version the record was written with.
    pub version: u8,
    /// Payload length in bytes.
    pub payload_length: u32,
}

impl Header {
    /// Create a header for the current wire version.
    pub fn new(payload_length: u32) -> Self {
        Self {
            version: WIRE_VERSION,
            payload_length,
        }
    }

    /// Encode header to bytes (Big Endian).
    ///
    /// # Example
    ///
    /// ```
    /// use netqueue::protocol::{Header, HEADER_SIZE};
    ///
    /// let bytes = Header::new(100).encode();
    /// assert_eq!(bytes.len(), HEADER_SIZE);
    /// assert_eq!(bytes, [1, 0, 0, 0, 100]);
    /// ```
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[0] = self.version;
        buf[1..5].copy_from_slice(&self.payload_length.to_be_bytes());
        buf
    }

    /// Decode header from bytes (Big Endian).
    ///
    /// Returns `None` if buffer is too short. No validation is done here;
    /// see [`Header::validate`].
    pub fn decode(buf: &[u8]) -> Option<Self> {
        if buf.len() < HEADER_SIZE {
            return None;
        }
        Some(Self {
            version: buf[0],
            payload_length: u32::from_be_bytes([buf[1], buf[2], buf[3], buf[4]]),
        })
    }

    /// Validate the header against this build's reader.
    ///
    /// Checks:
    /// - Version matches [`WIRE_VERSION`]
    /// - Payload length doesn't exceed max
    pub fn validate(&self, max_payload_size: u32) -> Result<()> {
        if self.version != WIRE_VERSION {
            return Err(NetqueueError::Protocol(format!(
                "Unsupported wire version {} (expected {})",
                self.version, WIRE_VERSION
            )));
        }

        if self.payload_length > max_payload_size {
            return Err(NetqueueError::Protocol(format!(
                "Payload size {} exceeds maximum {}",
                self.payload_length, max_payload_size
            )));
        }

        Ok(())
    }
}
