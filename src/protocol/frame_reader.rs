//! Record reader over an async byte source.
//!
//! Reads exactly one header, then exactly one payload, per call. Nothing
//! past the current record is ever pulled from the source, so a caller
//! that stops calling [`FrameReader::read_frame`] stops consuming input.
//!
//! Outcomes of a read:
//! - `Ok(Some(payload))`: a complete record
//! - `Ok(None)`: clean end-of-stream (EOF before the first header byte)
//! - `Err(Protocol)`: bad header, or EOF in the middle of a record
//! - `Err(Source)`: the source itself failed

use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};

use super::wire_format::{Header, DEFAULT_MAX_PAYLOAD_SIZE, HEADER_SIZE};
use crate::error::{NetqueueError, Result};

/// Pulls framed records off an [`AsyncRead`].
pub struct FrameReader<R> {
    reader: R,
    max_payload_size: u32,
    frames_read: u64,
}

impl<R> FrameReader<R>
where
    R: AsyncRead + Unpin,
{
    /// Create a reader with the default payload limit.
    pub fn new(reader: R) -> Self {
        Self::with_max_payload(reader, DEFAULT_MAX_PAYLOAD_SIZE)
    }

    /// Create a reader with a custom payload limit.
    pub fn with_max_payload(reader: R, max_payload_size: u32) -> Self {
        Self {
            reader,
            max_payload_size,
            frames_read: 0,
        }
    }

    /// Read the next record's payload.
    pub async fn read_frame(&mut self) -> Result<Option<Bytes>> {
        let header = match self.read_header().await? {
            Some(header) => header,
            None => return Ok(None),
        };

        // Validate before allocating for the payload
        header.validate(self.max_payload_size)?;

        let mut payload = BytesMut::zeroed(header.payload_length as usize);
        if !payload.is_empty() {
            self.reader
                .read_exact(&mut payload)
                .await
                .map_err(|e| self.map_read_error(e, "payload"))?;
        }

        self.frames_read += 1;
        Ok(Some(payload.freeze()))
    }

    /// Number of complete records read so far.
    pub fn frames_read(&self) -> u64 {
        self.frames_read
    }

    /// Give back the underlying source.
    pub fn into_inner(self) -> R {
        self.reader
    }

    async fn read_header(&mut self) -> Result<Option<Header>> {
        let mut buf = [0u8; HEADER_SIZE];
        let mut filled = 0;

        while filled < HEADER_SIZE {
            let n = match self.reader.read(&mut buf[filled..]).await {
                Ok(n) => n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(NetqueueError::Source(e)),
            };

            if n == 0 {
                if filled == 0 {
                    return Ok(None);
                }
                return Err(self.truncated("header"));
            }
            filled += n;
        }

        Ok(Header::decode(&buf))
    }

    fn map_read_error(&self, err: std::io::Error, part: &str) -> NetqueueError {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            self.truncated(part)
        } else {
            NetqueueError::Source(err)
        }
    }

    fn truncated(&self, part: &str) -> NetqueueError {
        NetqueueError::Protocol(format!(
            "Stream ended inside record {} ({})",
            self.frames_read + 1,
            part
        ))
    }
}
