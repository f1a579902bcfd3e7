//! HTTP JSON API over the DocuMind assistant: health, indexing, chat and model listing.

mod error;
mod handlers;
mod router;
mod server;

pub use error::GatewayError;
pub use router::build_router;
pub use server::{AppState, GatewayServer};
