use bytes::Bytes;

use crate::errors::ContentError;
use crate::value::Value;

/// Codec for text-mode formats: values marshal to strings, and the owning
/// handler applies the declared charset before bytes hit the wire.
pub trait TextCodec: Send + Sync {
    fn marshal(&self, value: &Value) -> Result<String, ContentError>;
    fn unmarshal(&self, text: &str) -> Result<Value, ContentError>;
}

/// Codec for binary-mode formats: values pack straight to bytes with no
/// charset step.
pub trait BinaryCodec: Send + Sync {
    fn pack(&self, value: &Value) -> Result<Bytes, ContentError>;
    fn unpack(&self, data: &[u8]) -> Result<Value, ContentError>;
}
