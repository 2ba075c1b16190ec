//! The training pipeline: load, select, split, fit, persist

use crate::config::PipelineConfig;
use crate::data::{schema, train_test_split, DataLoader, DatasetSource, TrainTestSplit, LABEL_COLUMN};
use crate::error::Result;
use crate::export::{save_model, ModelMetadata};
use crate::training::RandomForest;
use polars::prelude::DataFrame;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

/// Outcome of a successful run
#[derive(Debug, Clone)]
pub struct PipelineReport {
    /// Rows in the loaded dataset
    pub n_rows: usize,
    /// Held-out partition, kept for downstream evaluation
    pub split: TrainTestSplit,
    /// Trees in the fitted forest
    pub n_trees: usize,
    /// Where the model was written
    pub artifact: PathBuf,
    /// Size of the written artifact
    pub artifact_bytes: u64,
    /// Wall time of the whole run
    pub elapsed_secs: f64,
}

/// Single-shot training pipeline
pub struct Pipeline {
    config: PipelineConfig,
    loader: DataLoader,
}

impl Pipeline {
    /// Create a pipeline for `config`
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            loader: DataLoader::new(),
        }
    }

    /// The configuration this pipeline runs with
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Fetch the configured source and run every stage
    pub fn run(&self) -> Result<PipelineReport> {
        self.config.validate()?;
        let start = Instant::now();

        let source = DatasetSource::parse(&self.config.source);
        let df = self.loader.load(&source)?;

        self.run_with_start(&df, start)
    }

    /// Run every stage after loading, on an already materialized dataset
    pub fn run_on_frame(&self, df: &DataFrame) -> Result<PipelineReport> {
        self.config.validate()?;
        self.run_with_start(df, Instant::now())
    }

    fn run_with_start(&self, df: &DataFrame, start: Instant) -> Result<PipelineReport> {
        let (x, y) = schema::select(df)?;
        info!(rows = x.nrows(), features = x.ncols(), "Selected features");

        let split = train_test_split(&x, &y, self.config.test_size, self.config.split_seed)?;
        info!(
            train = split.n_train(),
            test = split.n_test(),
            seed = self.config.split_seed,
            "Split dataset"
        );

        let model = self.fit(&split)?;

        let metadata = ModelMetadata::new("diabetes")
            .with_model_type("random_forest_classifier")
            .with_features(schema::feature_names())
            .with_target(LABEL_COLUMN)
            .with_split_sizes(split.n_train(), split.n_test());
        let metadata = model
            .hyperparameters()
            .into_iter()
            .fold(metadata, |m, (k, v)| m.add_hyperparameter(k, v));

        let artifact_bytes = save_model(&model, &self.config.output, metadata)?;
        info!(
            path = %self.config.output.display(),
            bytes = artifact_bytes,
            "Model written"
        );

        Ok(PipelineReport {
            n_rows: x.nrows(),
            n_trees: model.n_trees(),
            split,
            artifact: self.config.output.clone(),
            artifact_bytes,
            elapsed_secs: start.elapsed().as_secs_f64(),
        })
    }

    fn fit(&self, split: &TrainTestSplit) -> Result<RandomForest> {
        let start = Instant::now();

        let mut model = RandomForest::new_classifier(self.config.n_estimators);
        if let Some(seed) = self.config.model_seed {
            model = model.with_random_state(seed);
        }
        if let Some(n) = self.config.n_jobs {
            model = model.with_n_jobs(n);
        }

        model.fit(&split.x_train, &split.y_train)?;
        info!(
            trees = model.n_trees(),
            classes = model.classes().len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Random forest fitted"
        );

        Ok(model)
    }
}

/// Run the pipeline with `config`
pub fn run(config: PipelineConfig) -> Result<PipelineReport> {
    Pipeline::new(config).run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DiabetesError;
    use polars::prelude::*;

    fn frame(n: usize) -> DataFrame {
        let idx: Vec<f64> = (0..n).map(|i| i as f64).collect();
        df!(
            "Pregnancies" => idx.iter().map(|i| i % 7.0).collect::<Vec<f64>>(),
            "Glucose" => idx.iter().map(|i| 80.0 + i).collect::<Vec<f64>>(),
            "BloodPressure" => idx.iter().map(|i| 60.0 + (i % 20.0)).collect::<Vec<f64>>(),
            "BMI" => idx.iter().map(|i| 20.0 + (i % 15.0)).collect::<Vec<f64>>(),
            "Age" => idx.iter().map(|i| 21.0 + (i % 40.0)).collect::<Vec<f64>>(),
            "Outcome" => idx.iter().map(|i| if *i >= n as f64 / 2.0 { 1i64 } else { 0 }).collect::<Vec<i64>>()
        )
        .unwrap()
    }

    #[test]
    fn test_run_on_frame() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig::new()
            .with_output(dir.path().join("diabetes_model.pkl"))
            .with_n_estimators(5)
            .with_model_seed(1);

        let report = Pipeline::new(config).run_on_frame(&frame(100)).unwrap();

        assert_eq!(report.n_rows, 100);
        assert_eq!(report.split.n_train(), 80);
        assert_eq!(report.split.n_test(), 20);
        assert_eq!(report.n_trees, 5);
        assert!(report.artifact_bytes > 0);
        assert!(report.artifact.exists());
    }

    #[test]
    fn test_missing_column_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("diabetes_model.pkl");
        let config = PipelineConfig::new().with_output(&output).with_n_estimators(3);

        let df = frame(20).drop("Age").unwrap();
        let err = Pipeline::new(config).run_on_frame(&df).unwrap_err();

        assert!(matches!(err, DiabetesError::FeatureNotFound(ref n) if n == "Age"));
        assert!(!output.exists());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = PipelineConfig::new().with_test_size(1.5);
        let err = Pipeline::new(config).run_on_frame(&frame(10)).unwrap_err();
        assert!(matches!(err, DiabetesError::InvalidParameter { .. }));
    }
}
