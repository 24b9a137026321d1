//! Protocol module - the wire contract shared by both pipelines.
//!
//! - 5-byte versioned header
//! - Record building on the write side
//! - Exact-size record reading on the read side

mod frame;
mod frame_reader;
mod wire_format;

pub use frame::{build_frame, encode_message};
pub use frame_reader::FrameReader;
pub use wire_format::{Header, DEFAULT_MAX_PAYLOAD_SIZE, HEADER_SIZE, WIRE_VERSION};
