//! Codec module - serialization of record payloads.
//!
//! - [`MsgPackCodec`] - MessagePack using `rmp-serde` (`to_vec_named`, so
//!   every record carries its field names)
//!
//! # Example
//!
//! ```
//! use netqueue::codec::MsgPackCodec;
//! use netqueue::Message;
//!
//! let msg = Message::new("regenerate apprc", ["app1"]);
//! let encoded = MsgPackCodec::encode(&msg).unwrap();
//! let decoded: Message = MsgPackCodec::decode(&encoded).unwrap();
//! assert_eq!(decoded, msg);
//! ```

mod msgpack;

pub use msgpack::MsgPackCodec;
