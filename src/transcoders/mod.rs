//! Stock transcoders: JSON (text mode) and canonical MessagePack (binary
//! mode).
//!
//! Both apply the same extension hooks on the way out (UUIDs and
//! timestamps serialize as strings, byte buffers as base64 for JSON or the
//! bin family for MessagePack) and neither reverses them on the way in:
//! decoded
//! UUIDs and timestamps come back as plain strings, matching common
//! practice for JSON APIs.

mod json;
mod msgpack;

pub use json::JsonTranscoder;
pub use msgpack::MsgPackTranscoder;
