//! Dynamic value union shared by every transcoder.
//!
//! Decoded request bodies and outbound response bodies are both represented
//! as a [`Value`]: a closed tagged union over the JSON/MessagePack-native
//! kinds plus two semantic extension kinds (UUID and timestamp) that every
//! transcoder special-cases. Anything a target format cannot represent is
//! rejected at encode time with [`ContentError::Type`].
//!
//! [`ContentError::Type`]: crate::errors::ContentError::Type

use bytes::Bytes;
use chrono::{DateTime, FixedOffset, NaiveDateTime, SecondsFormat};
use uuid::Uuid;

/// A timestamp that may or may not carry a UTC offset.
#[derive(Debug, Clone, PartialEq)]
pub enum Timestamp {
    /// Wall-clock time with no offset information.
    Naive(NaiveDateTime),
    /// Time with an explicit UTC offset.
    Aware(DateTime<FixedOffset>),
}

impl Timestamp {
    /// ISO-8601 rendering. The numeric offset suffix (e.g. `+00:00`) is
    /// present iff the timestamp is offset-aware.
    pub fn iso_string(&self) -> String {
        match self {
            Timestamp::Naive(dt) => dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string(),
            Timestamp::Aware(dt) => dt.to_rfc3339_opts(SecondsFormat::AutoSi, false),
        }
    }
}

/// An in-memory body value.
///
/// `Integer` carries an `i128` so the full MessagePack integer range
/// `[-2^63, 2^64)` stays representable; encoders reject values outside the
/// range of their wire format. `Map` preserves insertion order and allows
/// non-string keys (individual transcoders constrain keys further).
///
/// Sequences built from unordered host collections (sets and the like)
/// encode in whatever order the caller produced; this crate does not impose
/// one.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Integer(i128),
    Float(f64),
    String(String),
    Binary(Bytes),
    Array(Vec<Value>),
    Map(Vec<(Value, Value)>),
    Uuid(Uuid),
    Timestamp(Timestamp),
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v.into())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v.into())
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Integer(v.into())
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::Integer(v.into())
    }
}

impl From<i128> for Value {
    fn from(v: i128) -> Self {
        Value::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Bytes> for Value {
    fn from(v: Bytes) -> Self {
        Value::Binary(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Binary(Bytes::from(v))
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Binary(Bytes::copy_from_slice(v))
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Array(v)
    }
}

impl From<Vec<(Value, Value)>> for Value {
    fn from(v: Vec<(Value, Value)>) -> Self {
        Value::Map(v)
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Value::Uuid(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::Timestamp(Timestamp::Naive(v))
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(v: DateTime<FixedOffset>) -> Self {
        Value::Timestamp(Timestamp::Aware(v))
    }
}
