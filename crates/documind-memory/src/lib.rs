//! Chunk data model and the flat-file store that persists one index per collection.

pub mod error;
pub mod store;
pub mod types;

pub use error::StoreError;
pub use store::{IndexStore, sanitize_collection_name};
pub use types::{Chunk, CollectionIndex, DEFAULT_SOURCE};
