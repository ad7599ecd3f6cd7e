use std::sync::Arc;

use bytes::Bytes;

use super::traits::{BinaryCodec, TextCodec};
use crate::errors::ContentError;
use crate::value::Value;

/// One registered transcoding handler: a media type plus its paired
/// encode/decode implementation. Immutable once constructed.
pub trait ContentHandler: Send + Sync {
    /// The media type this handler was registered under.
    fn content_type(&self) -> &str;

    /// The value for a response `Content-Type` header. Text handlers append
    /// their charset parameter; binary handlers return the bare type.
    fn response_content_type(&self) -> &str;

    fn encode(&self, value: &Value) -> Result<Bytes, ContentError>;

    fn decode(&self, data: &[u8]) -> Result<Value, ContentError>;
}

impl std::fmt::Debug for dyn ContentHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentHandler")
            .field("content_type", &self.content_type())
            .finish()
    }
}

/// Handler for text payloads. Marshalled strings are encoded with the
/// declared charset before transmission, and inbound bytes are decoded with
/// it before unmarshalling.
pub struct TextContentHandler {
    content_type: String,
    charset: String,
    header_value: String,
    codec: Arc<dyn TextCodec>,
}

impl TextContentHandler {
    /// Only UTF-8-compatible charset names are accepted; anything else is a
    /// registration error.
    pub fn new(
        content_type: impl Into<String>,
        charset: impl Into<String>,
        codec: Arc<dyn TextCodec>,
    ) -> Result<Self, ContentError> {
        let content_type = content_type.into();
        let charset = charset.into().to_ascii_lowercase();
        if !matches!(charset.as_str(), "utf-8" | "utf8" | "us-ascii" | "ascii") {
            return Err(ContentError::Registration(format!(
                "unsupported charset {charset:?} for {content_type}: only UTF-8 compatible charsets are available"
            )));
        }
        let header_value = format!("{content_type}; charset=\"{charset}\"");
        Ok(Self {
            content_type,
            charset,
            header_value,
            codec,
        })
    }

    pub fn charset(&self) -> &str {
        &self.charset
    }
}

impl ContentHandler for TextContentHandler {
    fn content_type(&self) -> &str {
        &self.content_type
    }

    fn response_content_type(&self) -> &str {
        &self.header_value
    }

    fn encode(&self, value: &Value) -> Result<Bytes, ContentError> {
        let text = self.codec.marshal(value)?;
        Ok(Bytes::from(text.into_bytes()))
    }

    fn decode(&self, data: &[u8]) -> Result<Value, ContentError> {
        let text = std::str::from_utf8(data).map_err(|err| {
            ContentError::Decode(format!("body is not valid {}: {err}", self.charset))
        })?;
        self.codec.unmarshal(text)
    }
}

/// Handler for raw-byte payloads; no charset step in either direction.
pub struct BinaryContentHandler {
    content_type: String,
    codec: Arc<dyn BinaryCodec>,
}

impl BinaryContentHandler {
    pub fn new(content_type: impl Into<String>, codec: Arc<dyn BinaryCodec>) -> Self {
        Self {
            content_type: content_type.into(),
            codec,
        }
    }
}

impl ContentHandler for BinaryContentHandler {
    fn content_type(&self) -> &str {
        &self.content_type
    }

    fn response_content_type(&self) -> &str {
        &self.content_type
    }

    fn encode(&self, value: &Value) -> Result<Bytes, ContentError> {
        self.codec.pack(value)
    }

    fn decode(&self, data: &[u8]) -> Result<Value, ContentError> {
        self.codec.unpack(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct UpperCodec;

    impl TextCodec for UpperCodec {
        fn marshal(&self, value: &Value) -> Result<String, ContentError> {
            match value {
                Value::String(s) => Ok(s.to_ascii_uppercase()),
                other => Err(ContentError::Type(format!("not a string: {other:?}"))),
            }
        }

        fn unmarshal(&self, text: &str) -> Result<Value, ContentError> {
            Ok(Value::String(text.to_ascii_lowercase()))
        }
    }

    #[test]
    fn text_handler_appends_quoted_charset() {
        let handler =
            TextContentHandler::new("text/plain", "UTF-8", Arc::new(UpperCodec)).unwrap();
        assert_eq!(handler.content_type(), "text/plain");
        assert_eq!(handler.response_content_type(), "text/plain; charset=\"utf-8\"");
    }

    #[test]
    fn text_handler_rejects_non_utf8_charsets() {
        let result = TextContentHandler::new("text/plain", "latin-1", Arc::new(UpperCodec));
        assert!(matches!(result, Err(ContentError::Registration(_))));
    }

    #[test]
    fn text_handler_round_trips_through_codec() {
        let handler =
            TextContentHandler::new("text/plain", "utf-8", Arc::new(UpperCodec)).unwrap();
        let encoded = handler.encode(&Value::String("hello".into())).unwrap();
        assert_eq!(&encoded[..], b"HELLO");
        assert_eq!(
            handler.decode(b"HELLO").unwrap(),
            Value::String("hello".into())
        );
    }

    #[test]
    fn text_handler_rejects_invalid_utf8_bodies() {
        let handler =
            TextContentHandler::new("text/plain", "utf-8", Arc::new(UpperCodec)).unwrap();
        assert!(matches!(
            handler.decode(&[0xFF, 0xFE]),
            Err(ContentError::Decode(_))
        ));
    }
}
