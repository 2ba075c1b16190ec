//! Seeded train/test partitioning

use crate::error::{DiabetesError, Result};
use ndarray::{Array1, Array2, Axis};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Train and held-out partitions of (X, y)
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    pub x_train: Array2<f64>,
    pub x_test: Array2<f64>,
    pub y_train: Array1<f64>,
    pub y_test: Array1<f64>,
    /// Source row of each training sample
    pub train_indices: Vec<usize>,
    /// Source row of each held-out sample
    pub test_indices: Vec<usize>,
}

impl TrainTestSplit {
    pub fn n_train(&self) -> usize {
        self.train_indices.len()
    }

    pub fn n_test(&self) -> usize {
        self.test_indices.len()
    }
}

/// Number of training rows for `n_samples` rows: `round((1 - test_size) * n)`
pub fn train_size(n_samples: usize, test_size: f64) -> usize {
    (((1.0 - test_size) * n_samples as f64).round() as usize).min(n_samples)
}

/// Shuffle `0..n_samples` with a seeded ChaCha8 stream and cut it in two.
///
/// The first `n - train_size` shuffled indices are held out, the remainder
/// is the training set. Same seed and `n` always give the same partition.
pub fn split_indices(n_samples: usize, test_size: f64, seed: u64) -> Result<(Vec<usize>, Vec<usize>)> {
    if !(0.0..1.0).contains(&test_size) {
        return Err(DiabetesError::InvalidParameter {
            name: "test_size".to_string(),
            value: test_size.to_string(),
            reason: "must be in [0, 1)".to_string(),
        });
    }

    let n_train = train_size(n_samples, test_size);
    let n_test = n_samples - n_train;

    let mut indices: Vec<usize> = (0..n_samples).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let train_indices = indices.split_off(n_test);
    Ok((train_indices, indices))
}

/// Partition rows of `x` and `y` into train and test subsets
pub fn train_test_split(
    x: &Array2<f64>,
    y: &Array1<f64>,
    test_size: f64,
    seed: u64,
) -> Result<TrainTestSplit> {
    if x.nrows() != y.len() {
        return Err(DiabetesError::ShapeError {
            expected: format!("y length = {}", x.nrows()),
            actual: format!("y length = {}", y.len()),
        });
    }

    let (train_indices, test_indices) = split_indices(x.nrows(), test_size, seed)?;

    Ok(TrainTestSplit {
        x_train: x.select(Axis(0), &train_indices),
        x_test: x.select(Axis(0), &test_indices),
        y_train: y.select(Axis(0), &train_indices),
        y_test: y.select(Axis(0), &test_indices),
        train_indices,
        test_indices,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_sizes_for_100_rows() {
        let (train, test) = split_indices(100, 0.2, 42).unwrap();
        assert_eq!(train.len(), 80);
        assert_eq!(test.len(), 20);
    }

    #[test]
    fn test_train_size_rounds() {
        assert_eq!(train_size(768, 0.2), 614);
        assert_eq!(train_size(1, 0.2), 1);
        assert_eq!(train_size(3, 0.2), 2);
        assert_eq!(train_size(0, 0.2), 0);
        assert_eq!(train_size(10, 0.0), 10);
    }

    #[test]
    fn test_partition_is_disjoint_and_complete() {
        let n = 137;
        let (train, test) = split_indices(n, 0.2, 42).unwrap();

        let train_set: HashSet<usize> = train.iter().copied().collect();
        let test_set: HashSet<usize> = test.iter().copied().collect();

        assert_eq!(train_set.len(), train.len());
        assert_eq!(test_set.len(), test.len());
        assert!(train_set.is_disjoint(&test_set));

        let all: HashSet<usize> = train_set.union(&test_set).copied().collect();
        assert_eq!(all, (0..n).collect::<HashSet<usize>>());
    }

    #[test]
    fn test_same_seed_same_partition() {
        let first = split_indices(500, 0.2, 42).unwrap();
        let second = split_indices(500, 0.2, 42).unwrap();
        assert_eq!(first, second);

        let other = split_indices(500, 0.2, 43).unwrap();
        assert_ne!(first, other);
    }

    #[test]
    fn test_rows_follow_indices() {
        let x = Array2::from_shape_fn((10, 2), |(r, c)| (r * 10 + c) as f64);
        let y = Array1::from_shape_fn(10, |r| r as f64);

        let split = train_test_split(&x, &y, 0.2, 42).unwrap();

        assert_eq!(split.x_train.nrows(), 8);
        assert_eq!(split.x_test.nrows(), 2);
        for (row, &src) in split.train_indices.iter().enumerate() {
            assert_eq!(split.y_train[row], src as f64);
            assert_eq!(split.x_train[[row, 1]], (src * 10 + 1) as f64);
        }
        for (row, &src) in split.test_indices.iter().enumerate() {
            assert_eq!(split.y_test[row], src as f64);
        }
    }

    #[test]
    fn test_shape_mismatch() {
        let x = Array2::zeros((4, 2));
        let y = Array1::zeros(3);
        assert!(matches!(
            train_test_split(&x, &y, 0.2, 42),
            Err(DiabetesError::ShapeError { .. })
        ));
    }

    #[test]
    fn test_invalid_test_size() {
        assert!(split_indices(10, 1.0, 42).is_err());
    }
}
