//! Pipeline configuration

use crate::error::{DiabetesError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Remote location of the Pima Indians diabetes CSV
pub const DEFAULT_SOURCE: &str = "https://raw.githubusercontent.com/plotly/datasets/master/diabetes.csv";

/// Filename of the persisted model
pub const DEFAULT_ARTIFACT: &str = "diabetes_model.pkl";

/// Seed used for the train/test shuffle
pub const DEFAULT_SPLIT_SEED: u64 = 42;

/// Fraction of rows held out from training
pub const DEFAULT_TEST_SIZE: f64 = 0.2;

/// Number of trees in the forest
pub const DEFAULT_N_ESTIMATORS: usize = 100;

/// Configuration for a single pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Dataset location: an http(s) URL or a local path
    pub source: String,

    /// Where the fitted model is written
    pub output: PathBuf,

    /// Seed for the train/test shuffle
    pub split_seed: u64,

    /// Held-out fraction in [0, 1)
    pub test_size: f64,

    /// Number of trees
    pub n_estimators: usize,

    /// Seed for bootstrap and feature sampling (None = fresh entropy)
    pub model_seed: Option<u64>,

    /// Worker threads for tree building (None = calling thread only)
    pub n_jobs: Option<usize>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            source: DEFAULT_SOURCE.to_string(),
            output: PathBuf::from(DEFAULT_ARTIFACT),
            split_seed: DEFAULT_SPLIT_SEED,
            test_size: DEFAULT_TEST_SIZE,
            n_estimators: DEFAULT_N_ESTIMATORS,
            model_seed: None,
            n_jobs: None,
        }
    }
}

impl PipelineConfig {
    /// Create a configuration with the default constants
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the dataset source
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Set the artifact path
    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    /// Set the split seed
    pub fn with_split_seed(mut self, seed: u64) -> Self {
        self.split_seed = seed;
        self
    }

    /// Set the held-out fraction
    pub fn with_test_size(mut self, test_size: f64) -> Self {
        self.test_size = test_size;
        self
    }

    /// Set the number of trees
    pub fn with_n_estimators(mut self, n: usize) -> Self {
        self.n_estimators = n;
        self
    }

    /// Fix the model seed
    pub fn with_model_seed(mut self, seed: u64) -> Self {
        self.model_seed = Some(seed);
        self
    }

    /// Build trees on a pool of `n` workers
    pub fn with_n_jobs(mut self, n: usize) -> Self {
        self.n_jobs = Some(n);
        self
    }

    /// Reject parameter values the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if !(0.0..1.0).contains(&self.test_size) {
            return Err(DiabetesError::InvalidParameter {
                name: "test_size".to_string(),
                value: self.test_size.to_string(),
                reason: "must be in [0, 1)".to_string(),
            });
        }

        if self.n_estimators == 0 {
            return Err(DiabetesError::InvalidParameter {
                name: "n_estimators".to_string(),
                value: "0".to_string(),
                reason: "need at least one tree".to_string(),
            });
        }

        if self.n_jobs == Some(0) {
            return Err(DiabetesError::InvalidParameter {
                name: "n_jobs".to_string(),
                value: "0".to_string(),
                reason: "need at least one worker".to_string(),
            });
        }

        Ok(())
    }
}
