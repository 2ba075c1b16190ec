//! Model artifact serialization
//!
//! The artifact is one bincode blob: a small envelope carrying magic bytes,
//! a format version, metadata and an FNV-1a checksum around the
//! bincode-encoded model.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{DiabetesError, Result};

/// Model metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Model name
    pub name: String,
    /// Version of the crate that wrote the artifact
    pub version: String,
    /// Training timestamp (RFC 3339)
    pub trained_at: String,
    /// Feature names, in input column order
    pub feature_names: Vec<String>,
    /// Target name
    pub target_name: String,
    /// Model type
    pub model_type: String,
    /// Hyperparameters
    pub hyperparameters: BTreeMap<String, String>,
    /// Rows used for fitting
    pub n_train: usize,
    /// Rows held out
    pub n_test: usize,
}

impl Default for ModelMetadata {
    fn default() -> Self {
        Self {
            name: "model".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            trained_at: chrono::Utc::now().to_rfc3339(),
            feature_names: Vec::new(),
            target_name: "target".to_string(),
            model_type: "unknown".to_string(),
            hyperparameters: BTreeMap::new(),
            n_train: 0,
            n_test: 0,
        }
    }
}

impl ModelMetadata {
    /// Create new metadata with name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set model type
    pub fn with_model_type(mut self, model_type: impl Into<String>) -> Self {
        self.model_type = model_type.into();
        self
    }

    /// Set feature names
    pub fn with_features(mut self, features: Vec<String>) -> Self {
        self.feature_names = features;
        self
    }

    /// Set target name
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target_name = target.into();
        self
    }

    /// Add hyperparameter
    pub fn add_hyperparameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.hyperparameters.insert(key.into(), value.into());
        self
    }

    /// Record split sizes
    pub fn with_split_sizes(mut self, n_train: usize, n_test: usize) -> Self {
        self.n_train = n_train;
        self.n_test = n_test;
        self
    }
}

/// Serializable model wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializedModel {
    /// Magic bytes for format detection
    pub magic: [u8; 4],
    /// Format version
    pub format_version: u32,
    /// Model metadata
    pub metadata: ModelMetadata,
    /// Serialized model data
    pub model_data: Vec<u8>,
    /// Checksum for integrity verification
    pub checksum: u64,
}

impl SerializedModel {
    /// Magic bytes for diabetes model files
    pub const MAGIC: [u8; 4] = *b"DMRF";
    /// Current format version
    pub const VERSION: u32 = 1;

    /// Create new serialized model
    pub fn new(metadata: ModelMetadata, model_data: Vec<u8>) -> Self {
        let checksum = Self::compute_checksum(&model_data);
        Self {
            magic: Self::MAGIC,
            format_version: Self::VERSION,
            metadata,
            model_data,
            checksum,
        }
    }

    /// Compute checksum using FNV-1a hash
    fn compute_checksum(data: &[u8]) -> u64 {
        const FNV_OFFSET: u64 = 14695981039346656037;
        const FNV_PRIME: u64 = 1099511628211;

        let mut hash = FNV_OFFSET;
        for byte in data {
            hash ^= *byte as u64;
            hash = hash.wrapping_mul(FNV_PRIME);
        }
        hash
    }

    /// Verify checksum
    pub fn verify_checksum(&self) -> bool {
        Self::compute_checksum(&self.model_data) == self.checksum
    }

    /// Check magic, version and checksum
    pub fn validate(&self) -> Result<()> {
        if self.magic != Self::MAGIC {
            return Err(DiabetesError::SerializationError(
                "not a diabetes model artifact".to_string(),
            ));
        }
        if self.format_version != Self::VERSION {
            return Err(DiabetesError::SerializationError(format!(
                "unsupported format version {} (expected {})",
                self.format_version,
                Self::VERSION
            )));
        }
        if !self.verify_checksum() {
            return Err(DiabetesError::SerializationError(
                "Checksum verification failed - file may be corrupted".to_string(),
            ));
        }
        Ok(())
    }
}

/// Write `model` to `path`, truncating any existing file. Returns bytes written.
pub fn save_model<M: Serialize>(model: &M, path: impl AsRef<Path>, metadata: ModelMetadata) -> Result<u64> {
    let model_data = bincode::serialize(model)?;
    let serialized = SerializedModel::new(metadata, model_data);

    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    bincode::serialize_into(&mut writer, &serialized)?;
    writer.flush()?;

    Ok(bincode::serialized_size(&serialized)?)
}

/// Load a model and its metadata from `path`
pub fn load_model<M: for<'de> Deserialize<'de>>(path: impl AsRef<Path>) -> Result<(M, ModelMetadata)> {
    // Decoding from a slice bounds every length prefix by the file size.
    let bytes = std::fs::read(path.as_ref())?;

    let serialized: SerializedModel = bincode::deserialize(&bytes)?;
    serialized.validate()?;

    let model: M = bincode::deserialize(&serialized.model_data)?;
    Ok((model, serialized.metadata))
}
