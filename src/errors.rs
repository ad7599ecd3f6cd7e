use thiserror::Error;

/// Error taxonomy for the content layer.
///
/// Every failure is synchronous and deterministic for a given input; nothing
/// in this crate retries. The HTTP status mapping lives in [`crate::api`].
#[derive(Debug, Error)]
pub enum ContentError {
    /// The request declared a content type with no registered handler.
    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),

    /// No registered type satisfies the Accept preferences and no default
    /// content type is configured.
    #[error("no acceptable representation for: {0}")]
    NotAcceptable(String),

    /// A value handed to an encoder has no representation in the target
    /// format. This is a server-side data/encoder mismatch, not a client
    /// fault.
    #[error("cannot encode value: {0}")]
    Type(String),

    /// Malformed bytes for the declared format.
    #[error("malformed payload: {0}")]
    Decode(String),

    /// Invalid registration input (wildcard key, unparseable media type,
    /// unsupported charset).
    #[error("invalid registration: {0}")]
    Registration(String),
}

impl ContentError {
    pub fn code(&self) -> &'static str {
        match self {
            ContentError::UnsupportedMediaType(_) => "UNSUPPORTED_MEDIA_TYPE",
            ContentError::NotAcceptable(_) => "NOT_ACCEPTABLE",
            ContentError::Type(_) => "ENCODING_TYPE_ERROR",
            ContentError::Decode(_) => "DECODE_ERROR",
            ContentError::Registration(_) => "REGISTRATION_ERROR",
        }
    }
}
