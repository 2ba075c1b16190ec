//! Model training module
//!
//! Provides the tree ensemble fitted by the pipeline:
//! - CART decision trees (Gini / entropy)
//! - Random Forests built from bootstrapped trees

pub mod decision_tree;
pub mod random_forest;

pub use decision_tree::{Criterion, DecisionTree, TreeNode};
pub use random_forest::{MaxFeatures, RandomForest};
