//! Dataset access: loading, schema projection and splitting

pub mod loader;
pub mod schema;
pub mod split;

pub use loader::{DataLoader, DatasetSource};
pub use schema::{FEATURE_COLUMNS, LABEL_COLUMN, N_FEATURES};
pub use split::{train_test_split, TrainTestSplit};
