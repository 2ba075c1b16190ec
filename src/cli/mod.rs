//! Command-line interface
//!
//! Every flag defaults to the fixed pipeline constants, so running the
//! binary with no arguments trains on the public dataset and writes
//! `diabetes_model.pkl` to the working directory.

use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use crate::config::{
    PipelineConfig, DEFAULT_ARTIFACT, DEFAULT_N_ESTIMATORS, DEFAULT_SOURCE, DEFAULT_SPLIT_SEED,
    DEFAULT_TEST_SIZE,
};
use crate::pipeline::Pipeline;

#[derive(Parser, Debug)]
#[command(name = "diabetes-model")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Train a random forest on the diabetes dataset and save it")]
#[command(long_about = None)]
pub struct Cli {
    /// Dataset location (http(s) URL or local CSV path)
    #[arg(short, long, default_value = DEFAULT_SOURCE)]
    pub source: String,

    /// Output model file
    #[arg(short, long, default_value = DEFAULT_ARTIFACT)]
    pub output: PathBuf,

    /// Seed for the train/test shuffle
    #[arg(long, default_value_t = DEFAULT_SPLIT_SEED)]
    pub seed: u64,

    /// Fraction of rows held out from training
    #[arg(long, default_value_t = DEFAULT_TEST_SIZE)]
    pub test_size: f64,

    /// Number of trees in the forest
    #[arg(long, default_value_t = DEFAULT_N_ESTIMATORS)]
    pub n_estimators: usize,

    /// Seed for bootstrap and feature sampling (random when omitted)
    #[arg(long)]
    pub model_seed: Option<u64>,

    /// Threads used to build trees (calling thread only when omitted)
    #[arg(long)]
    pub n_jobs: Option<usize>,
}

impl Cli {
    /// Map parsed flags onto a pipeline configuration
    pub fn to_config(&self) -> PipelineConfig {
        PipelineConfig {
            source: self.source.clone(),
            output: self.output.clone(),
            split_seed: self.seed,
            test_size: self.test_size,
            n_estimators: self.n_estimators,
            model_seed: self.model_seed,
            n_jobs: self.n_jobs,
        }
    }
}

/// Run the pipeline for parsed arguments
pub fn cmd_train(cli: &Cli) -> anyhow::Result<()> {
    let report = Pipeline::new(cli.to_config()).run()?;

    info!(
        rows = report.n_rows,
        train = report.split.n_train(),
        test = report.split.n_test(),
        trees = report.n_trees,
        artifact = %report.artifact.display(),
        bytes = report.artifact_bytes,
        elapsed_secs = report.elapsed_secs,
        "Training complete"
    );

    Ok(())
}
