use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use super::traits::{BinaryCodec, TextCodec};
use super::types::{BinaryContentHandler, ContentHandler, TextContentHandler};
use crate::errors::ContentError;
use crate::negotiation::{self, MediaType, parse_accept};
use crate::transcoders::{JsonTranscoder, MsgPackTranscoder};

/// Registry mapping media-type keys to transcoding handlers.
///
/// One instance is owned by the hosting application's state (shared behind
/// an `Arc` once registration is done) and consulted for every request body
/// decode and every response body encode. Registration is first-wins:
/// re-registering an existing key is a silent no-op, so repeated
/// module-initialization cannot clobber an application's custom handler
/// with a stock one.
#[derive(Default)]
pub struct ContentSettings {
    handlers: HashMap<String, Arc<dyn ContentHandler>>,
    // Registration order, one parameterless MediaType per key.
    order: Vec<MediaType>,
    default_content_type: Option<String>,
}

/// The lookup key for a content type string: the bare lower-cased
/// `type/subtype`, parameters ignored.
fn key_of(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

impl ContentSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry pre-populated with the stock transcoders:
    /// `application/json` (text, utf-8) and `application/msgpack` (binary),
    /// with JSON as the default content type.
    pub fn with_defaults() -> Self {
        let mut settings = Self::new();
        settings
            .register_text("application/json", "utf-8", Arc::new(JsonTranscoder::new()))
            .expect("stock json registration");
        settings
            .register_binary("application/msgpack", Arc::new(MsgPackTranscoder::new()))
            .expect("stock msgpack registration");
        settings.set_default_content_type(Some("application/json".to_owned()));
        settings
    }

    /// Insert a handler under `content_type` iff the key is absent.
    ///
    /// The key must parse as a concrete `type/subtype`; wildcards are
    /// negotiation-only and are rejected here.
    pub fn set(
        &mut self,
        content_type: &str,
        handler: Arc<dyn ContentHandler>,
    ) -> Result<(), ContentError> {
        let media = MediaType::parse(content_type)
            .map_err(|err| ContentError::Registration(err.to_string()))?;
        if media.is_wildcard() {
            return Err(ContentError::Registration(format!(
                "wildcard media type {content_type:?} cannot be a registration key"
            )));
        }
        let key = media.essence();
        if self.handlers.contains_key(&key) {
            debug!(content_type = %key, "handler already registered, keeping the first one");
            return Ok(());
        }
        self.handlers.insert(key.clone(), handler);
        self.order
            .push(MediaType::new(media.content_type, media.content_subtype));
        debug!(content_type = %key, "registered content handler");
        Ok(())
    }

    /// Register a text-mode handler for `content_type` with the declared
    /// charset.
    pub fn register_text(
        &mut self,
        content_type: &str,
        charset: &str,
        codec: Arc<dyn TextCodec>,
    ) -> Result<(), ContentError> {
        let handler = TextContentHandler::new(content_type, charset, codec)?;
        self.set(content_type, Arc::new(handler))
    }

    /// Register a binary-mode handler for `content_type`.
    pub fn register_binary(
        &mut self,
        content_type: &str,
        codec: Arc<dyn BinaryCodec>,
    ) -> Result<(), ContentError> {
        let handler = BinaryContentHandler::new(content_type, codec);
        self.set(content_type, Arc::new(handler))
    }

    pub fn get(&self, content_type: &str) -> Option<Arc<dyn ContentHandler>> {
        self.handlers.get(&key_of(content_type)).cloned()
    }

    /// Registered media types, in registration order, without parameters.
    pub fn available_content_types(&self) -> Vec<MediaType> {
        self.order.clone()
    }

    pub fn default_content_type(&self) -> Option<&str> {
        self.default_content_type.as_deref()
    }

    pub fn set_default_content_type(&mut self, content_type: Option<String>) {
        self.default_content_type = content_type;
    }

    /// The handler for an inbound body's declared content type.
    pub fn select_decoder(
        &self,
        declared_content_type: &str,
    ) -> Result<Arc<dyn ContentHandler>, ContentError> {
        self.get(declared_content_type).ok_or_else(|| {
            debug!(content_type = declared_content_type, "no decoder registered");
            ContentError::UnsupportedMediaType(key_of(declared_content_type))
        })
    }

    /// The best handler for an outbound body given the request's Accept
    /// header, plus the resolved `Content-Type` header value.
    ///
    /// A missing or empty Accept resolves straight to the default content
    /// type; so does a non-matching one. With no default configured either,
    /// this is `NotAcceptable`.
    pub fn select_encoder(
        &self,
        accept: Option<&str>,
    ) -> Result<(Arc<dyn ContentHandler>, String), ContentError> {
        let accept = accept.map(str::trim).filter(|header| !header.is_empty());
        if let Some(header) = accept {
            let preferences = parse_accept(header);
            if let Some(idx) = negotiation::select_content_type(&preferences, &self.order) {
                let key = self.order[idx].essence();
                if let Some(handler) = self.handlers.get(&key) {
                    debug!(content_type = %key, "negotiated response content type");
                    return Ok((handler.clone(), handler.response_content_type().to_owned()));
                }
            }
        }
        match self
            .default_content_type
            .as_deref()
            .and_then(|content_type| self.get(content_type))
        {
            Some(handler) => {
                debug!(
                    content_type = handler.content_type(),
                    "falling back to default response content type"
                );
                Ok((handler.clone(), handler.response_content_type().to_owned()))
            }
            None => Err(ContentError::NotAcceptable(
                accept.unwrap_or("*/*").to_owned(),
            )),
        }
    }
}
