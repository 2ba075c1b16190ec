//! diabetes-model - main entry point
//!
//! Trains a random forest on the diabetes dataset and writes it to disk.

use clap::Parser;
use diabetes_model::cli::{cmd_train, Cli};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "diabetes_model=info".into()),
        )
        .init();

    let cli = Cli::parse();
    cmd_train(&cli)
}
