//! HTTP surface for the demo server: an echo endpoint that decodes the
//! request body via the registered handlers and re-encodes it per the
//! client's Accept preferences.

mod error;
pub mod services;
pub mod state;
mod server;

pub use error::ErrorResponse;
pub use server::{router, run};
