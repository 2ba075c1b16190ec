//! Model export and serialization module
//!
//! Fitted models are persisted as a single checksummed bincode artifact.

mod serializer;

pub use serializer::{load_model, save_model, ModelMetadata, SerializedModel};
