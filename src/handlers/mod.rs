//! Content handlers and the per-application handler registry.
//!
//! A handler pairs one media type with an encode/decode implementation.
//! Two variants exist: [`TextContentHandler`] for formats whose payload is
//! text (run through a declared charset on the way in and out) and
//! [`BinaryContentHandler`] for raw-byte formats. Both are built over the
//! capability traits in this module rather than bare function pointers, and
//! are stored in a [`ContentSettings`] registry owned by the hosting
//! application's state.

mod registry;
mod traits;
mod types;

pub use registry::ContentSettings;
pub use traits::{BinaryCodec, TextCodec};
pub use types::{BinaryContentHandler, ContentHandler, TextContentHandler};
