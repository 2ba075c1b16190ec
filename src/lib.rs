//! diabetes-model - random forest training pipeline
//!
//! Loads the Pima Indians diabetes CSV, projects five features and the
//! `Outcome` label, splits rows 80/20 with a fixed seed, fits a random
//! forest classifier on the training rows and writes it to
//! `diabetes_model.pkl`.
//!
//! # Modules
//!
//! - [`data`] - CSV loading, schema projection, train/test split
//! - [`training`] - Decision trees and the random forest
//! - [`export`] - Model artifact serialization
//! - [`pipeline`] - The end-to-end run
//! - [`config`] - Pipeline configuration
//! - [`cli`] - Command-line interface

// Core error handling
pub mod error;

pub mod config;
pub mod data;
pub mod training;
pub mod export;
pub mod pipeline;
pub mod cli;

pub use error::{DiabetesError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{DiabetesError, Result};
    pub use crate::config::PipelineConfig;
    pub use crate::data::{DataLoader, DatasetSource, TrainTestSplit, FEATURE_COLUMNS, LABEL_COLUMN};
    pub use crate::training::{Criterion, DecisionTree, MaxFeatures, RandomForest};
    pub use crate::export::{load_model, save_model, ModelMetadata};
    pub use crate::pipeline::{Pipeline, PipelineReport};
}
