//! Random Forest classifier

use crate::error::{DiabetesError, Result};
use super::decision_tree::{argmax, bootstrap_indices, encode_labels, unique_classes, Criterion, DecisionTree};
use ndarray::{Array1, Array2};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Random Forest model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    /// Individual trees
    trees: Vec<DecisionTree>,
    /// Number of trees
    pub n_estimators: usize,
    /// Maximum depth per tree
    pub max_depth: Option<usize>,
    /// Minimum samples to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf
    pub min_samples_leaf: usize,
    /// Features drawn per split (sqrt by default)
    pub max_features: MaxFeatures,
    /// Bootstrap sampling
    pub bootstrap: bool,
    /// Impurity criterion
    pub criterion: Criterion,
    /// Random state
    pub random_state: Option<u64>,
    /// Worker threads for fitting (None = calling thread)
    pub n_jobs: Option<usize>,
    /// Feature importances
    feature_importances: Option<Array1<f64>>,
    /// Number of features
    n_features: usize,
    /// Classes seen during fit, ascending
    classes: Vec<f64>,
}

/// Strategy for max features
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MaxFeatures {
    /// Square root of n_features
    Sqrt,
    /// Log2 of n_features
    Log2,
    /// Fraction of n_features
    Fraction(f64),
    /// Fixed number
    Fixed(usize),
    /// All features
    All,
}

impl Default for RandomForest {
    fn default() -> Self {
        Self::new_classifier(100)
    }
}

impl RandomForest {
    /// Create a new classifier forest
    pub fn new_classifier(n_estimators: usize) -> Self {
        Self {
            trees: Vec::new(),
            n_estimators,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::Sqrt,
            bootstrap: true,
            criterion: Criterion::Gini,
            random_state: None,
            n_jobs: None,
            feature_importances: None,
            n_features: 0,
            classes: Vec::new(),
        }
    }

    /// Set maximum depth
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Set minimum samples to split
    pub fn with_min_samples_split(mut self, min_samples: usize) -> Self {
        self.min_samples_split = min_samples;
        self
    }

    /// Set minimum samples in leaf
    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples;
        self
    }

    /// Set max features strategy
    pub fn with_max_features(mut self, max_features: MaxFeatures) -> Self {
        self.max_features = max_features;
        self
    }

    /// Enable or disable bootstrap sampling
    pub fn with_bootstrap(mut self, bootstrap: bool) -> Self {
        self.bootstrap = bootstrap;
        self
    }

    /// Set criterion
    pub fn with_criterion(mut self, criterion: Criterion) -> Self {
        self.criterion = criterion;
        self
    }

    /// Set random state
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    /// Build trees on a dedicated pool of `n` threads
    pub fn with_n_jobs(mut self, n: usize) -> Self {
        self.n_jobs = Some(n);
        self
    }

    fn compute_max_features(&self, n_features: usize) -> usize {
        match self.max_features {
            MaxFeatures::Sqrt => (n_features as f64).sqrt().floor() as usize,
            MaxFeatures::Log2 => (n_features as f64).log2().floor() as usize,
            MaxFeatures::Fraction(f) => (n_features as f64 * f).floor() as usize,
            MaxFeatures::Fixed(n) => n,
            MaxFeatures::All => n_features,
        }
        .clamp(1, n_features.max(1))
    }

    /// Fit the forest to training data
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        let n_samples = x.nrows();
        let n_features = x.ncols();

        if n_samples != y.len() {
            return Err(DiabetesError::ShapeError {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }
        if n_samples == 0 || n_features == 0 {
            return Err(DiabetesError::ValidationError(format!(
                "cannot fit on a {}x{} training set",
                n_samples, n_features
            )));
        }
        if self.n_estimators == 0 {
            return Err(DiabetesError::InvalidParameter {
                name: "n_estimators".to_string(),
                value: "0".to_string(),
                reason: "need at least one tree".to_string(),
            });
        }

        let classes = unique_classes(y);
        let encoded = encode_labels(y, &classes)?;
        let max_features = self.compute_max_features(n_features);
        let base_seed = self.random_state.unwrap_or_else(rand::random);

        let build = |tree_idx: usize| -> Result<DecisionTree> {
            let seed = base_seed.wrapping_add(tree_idx as u64);
            let mut rng = ChaCha8Rng::seed_from_u64(seed);

            let sample_indices: Vec<usize> = if self.bootstrap {
                bootstrap_indices(&mut rng, n_samples)
            } else {
                (0..n_samples).collect()
            };

            let mut tree = DecisionTree::new()
                .with_min_samples_split(self.min_samples_split)
                .with_min_samples_leaf(self.min_samples_leaf)
                .with_max_features(max_features)
                .with_criterion(self.criterion)
                .with_random_state(seed);
            if let Some(d) = self.max_depth {
                tree = tree.with_max_depth(d);
            }

            tree.fit_indices(x, &encoded, &sample_indices, classes.clone(), &mut rng)?;
            debug!(tree = tree_idx, depth = tree.get_depth(), leaves = tree.get_n_leaves(), "Tree fitted");
            Ok(tree)
        };

        let trees: Vec<DecisionTree> = match self.n_jobs {
            Some(n) if n > 1 => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .build()
                    .map_err(|e| DiabetesError::TrainingError(e.to_string()))?;
                pool.install(|| {
                    (0..self.n_estimators)
                        .into_par_iter()
                        .map(build)
                        .collect::<Result<Vec<_>>>()
                })?
            }
            _ => (0..self.n_estimators).map(build).collect::<Result<Vec<_>>>()?,
        };

        self.trees = trees;
        self.n_features = n_features;
        self.classes = classes;
        self.compute_feature_importances();

        Ok(self)
    }

    fn compute_feature_importances(&mut self) {
        if self.trees.is_empty() {
            return;
        }

        let mut total_importances = vec![0.0; self.n_features];

        for tree in &self.trees {
            if let Some(imp) = tree.feature_importances() {
                for (i, &val) in imp.iter().enumerate() {
                    if i < self.n_features {
                        total_importances[i] += val;
                    }
                }
            }
        }

        let n_trees = self.trees.len() as f64;
        for imp in &mut total_importances {
            *imp /= n_trees;
        }

        // Normalize
        let total: f64 = total_importances.iter().sum();
        if total > 0.0 {
            for imp in &mut total_importances {
                *imp /= total;
            }
        }

        self.feature_importances = Some(Array1::from_vec(total_importances));
    }

    /// Mean of per-tree leaf distributions, one column per class
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if self.trees.is_empty() {
            return Err(DiabetesError::ModelNotFitted);
        }
        if x.ncols() != self.n_features {
            return Err(DiabetesError::ShapeError {
                expected: format!("{} features", self.n_features),
                actual: format!("{} features", x.ncols()),
            });
        }

        let mut proba = Array2::<f64>::zeros((x.nrows(), self.classes.len()));
        for tree in &self.trees {
            proba += &tree.predict_proba(x)?;
        }
        proba /= self.trees.len() as f64;

        Ok(proba)
    }

    /// Make predictions: the class with the highest mean probability
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let proba = self.predict_proba(x)?;
        Ok(proba
            .rows()
            .into_iter()
            .map(|row| self.classes[argmax(row)])
            .collect())
    }

    /// Get feature importances
    pub fn feature_importances(&self) -> Option<&Array1<f64>> {
        self.feature_importances.as_ref()
    }

    /// Classes seen during fit
    pub fn classes(&self) -> &[f64] {
        &self.classes
    }

    /// Width of the input the forest was fitted on
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Get number of trees
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Whether `fit` has completed
    pub fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }

    /// Hyperparameters as printable key/value pairs
    pub fn hyperparameters(&self) -> Vec<(String, String)> {
        vec![
            ("n_estimators".to_string(), self.n_estimators.to_string()),
            ("criterion".to_string(), format!("{:?}", self.criterion)),
            (
                "max_depth".to_string(),
                self.max_depth.map_or("none".to_string(), |d| d.to_string()),
            ),
            ("min_samples_split".to_string(), self.min_samples_split.to_string()),
            ("min_samples_leaf".to_string(), self.min_samples_leaf.to_string()),
            ("max_features".to_string(), format!("{:?}", self.max_features)),
            ("bootstrap".to_string(), self.bootstrap.to_string()),
            (
                "random_state".to_string(),
                self.random_state.map_or("none".to_string(), |s| s.to_string()),
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn blobs() -> (Array2<f64>, Array1<f64>) {
        let x = array![
            [0.0, 0.0],
            [0.1, 0.1],
            [0.2, 0.2],
            [0.3, 0.1],
            [1.0, 1.0],
            [1.1, 1.1],
            [1.2, 1.2],
            [1.3, 1.1],
        ];
        let y = array![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0];
        (x, y)
    }

    #[test]
    fn test_classifier() {
        let (x, y) = blobs();

        let mut rf = RandomForest::new_classifier(25).with_random_state(42);
        rf.fit(&x, &y).unwrap();

        let predictions = rf.predict(&x).unwrap();

        let accuracy = predictions.iter().zip(y.iter())
            .filter(|(p, a)| (*p - *a).abs() < 0.5)
            .count() as f64 / y.len() as f64;

        assert!(accuracy >= 0.8, "Accuracy too low: {}", accuracy);
        assert_eq!(rf.n_trees(), 25);
        assert_eq!(rf.classes(), &[0.0, 1.0]);
    }

    #[test]
    fn test_predict_proba() {
        let (x, y) = blobs();

        let mut rf = RandomForest::new_classifier(10).with_random_state(42);
        rf.fit(&x, &y).unwrap();

        let proba = rf.predict_proba(&x).unwrap();

        assert_eq!(proba.nrows(), 8);
        assert_eq!(proba.ncols(), 2);

        for i in 0..proba.nrows() {
            let row_sum: f64 = proba.row(i).sum();
            assert!((row_sum - 1.0).abs() < 1e-6, "Row {} sum: {}", i, row_sum);
        }
    }

    #[test]
    fn test_seeded_fit_is_reproducible() {
        let (x, y) = blobs();

        let mut a = RandomForest::new_classifier(15).with_random_state(7);
        let mut b = RandomForest::new_classifier(15).with_random_state(7);
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();

        let probe = array![[0.5, 0.5], [0.05, 1.2], [1.15, 0.0]];
        assert_eq!(a.predict_proba(&probe).unwrap(), b.predict_proba(&probe).unwrap());
    }

    #[test]
    fn test_thread_pool_matches_sequential() {
        let (x, y) = blobs();

        let mut seq = RandomForest::new_classifier(12).with_random_state(11);
        let mut par = RandomForest::new_classifier(12).with_random_state(11).with_n_jobs(3);
        seq.fit(&x, &y).unwrap();
        par.fit(&x, &y).unwrap();

        let probe = array![[0.5, 0.5], [0.6, 0.4]];
        assert_eq!(seq.predict_proba(&probe).unwrap(), par.predict_proba(&probe).unwrap());
    }

    #[test]
    fn test_feature_importances() {
        let x = array![
            [1.0, 5.0],
            [2.0, 5.0],
            [3.0, 5.0],
            [4.0, 5.0],
            [5.0, 5.0],
            [6.0, 5.0],
        ];
        let y = array![0.0, 0.0, 0.0, 1.0, 1.0, 1.0];

        let mut rf = RandomForest::new_classifier(10).with_random_state(42);
        rf.fit(&x, &y).unwrap();

        let importances = rf.feature_importances().unwrap();
        assert_eq!(importances.len(), 2);
        assert!(importances[0] >= importances[1]);
    }

    #[test]
    fn test_max_features_resolution() {
        let rf = RandomForest::new_classifier(1);
        assert_eq!(rf.compute_max_features(5), 2);
        assert_eq!(rf.compute_max_features(9), 3);
        assert_eq!(rf.compute_max_features(1), 1);
        assert_eq!(rf.clone().with_max_features(MaxFeatures::Log2).compute_max_features(5), 2);
        assert_eq!(rf.clone().with_max_features(MaxFeatures::Log2).compute_max_features(1), 1);
        assert_eq!(rf.clone().with_max_features(MaxFeatures::Fixed(9)).compute_max_features(5), 5);
        assert_eq!(rf.clone().with_max_features(MaxFeatures::Fraction(0.5)).compute_max_features(5), 2);
        assert_eq!(rf.clone().with_max_features(MaxFeatures::Fraction(0.01)).compute_max_features(5), 1);
    }

    #[test]
    fn test_errors() {
        let rf = RandomForest::new_classifier(3);
        assert!(matches!(rf.predict(&array![[1.0, 2.0]]), Err(DiabetesError::ModelNotFitted)));

        let (x, y) = blobs();
        let mut rf = RandomForest::new_classifier(3).with_random_state(1);
        rf.fit(&x, &y).unwrap();
        assert!(matches!(
            rf.predict(&array![[1.0, 2.0, 3.0]]),
            Err(DiabetesError::ShapeError { .. })
        ));

        let mut empty = RandomForest::new_classifier(3);
        let err = empty.fit(&Array2::zeros((0, 5)), &Array1::zeros(0)).unwrap_err();
        assert!(matches!(err, DiabetesError::ValidationError(_)));
    }
}
