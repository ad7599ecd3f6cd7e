pub mod api;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod negotiation;
pub mod observability;
pub mod transcoders;
pub mod value;
