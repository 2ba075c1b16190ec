//! Dataset loading from a URL or a local CSV file

use crate::error::{DiabetesError, Result};
use polars::prelude::*;
use std::fmt;
use std::fs::File;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info};

const USER_AGENT: &str = concat!("diabetes-model/", env!("CARGO_PKG_VERSION"));

/// Where the dataset comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetSource {
    /// Remote CSV fetched over http(s)
    Url(String),
    /// CSV on the local filesystem
    Path(PathBuf),
}

impl DatasetSource {
    /// Classify a source string: http(s) URLs are fetched, everything else is a path
    pub fn parse(source: &str) -> Self {
        let lower = source.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            DatasetSource::Url(source.to_string())
        } else {
            DatasetSource::Path(PathBuf::from(source))
        }
    }
}

impl fmt::Display for DatasetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetSource::Url(url) => write!(f, "{}", url),
            DatasetSource::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

impl From<&str> for DatasetSource {
    fn from(source: &str) -> Self {
        Self::parse(source)
    }
}

/// CSV loader
pub struct DataLoader {
    /// Rows scanned for dtype inference; `None` scans the whole file
    infer_schema_length: Option<usize>,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    /// Create a new data loader
    pub fn new() -> Self {
        Self {
            infer_schema_length: None,
        }
    }

    /// Limit dtype inference to the first `rows` rows.
    ///
    /// A column whose first float appears after the limit then fails to parse.
    pub fn with_infer_schema_length(mut self, rows: usize) -> Self {
        self.infer_schema_length = Some(rows.max(1));
        self
    }

    /// Load a dataset from either kind of source
    pub fn load(&self, source: &DatasetSource) -> Result<DataFrame> {
        let start = Instant::now();
        let df = match source {
            DatasetSource::Url(url) => self.fetch_csv(url)?,
            DatasetSource::Path(path) => self.load_csv(path)?,
        };

        info!(
            source = %source,
            rows = df.height(),
            cols = df.width(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Dataset loaded"
        );

        Ok(df)
    }

    /// Load a CSV file from disk
    pub fn load_csv(&self, path: &Path) -> Result<DataFrame> {
        let file = File::open(path)
            .map_err(|e| DiabetesError::DataError(format!("{}: {}", path.display(), e)))?;

        CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(self.infer_schema_length)
            .into_reader_with_file_handle(file)
            .finish()
            .map_err(|e| DiabetesError::DataError(e.to_string()))
    }

    /// Download a CSV over http(s); no retry and no timeout
    pub fn fetch_csv(&self, url: &str) -> Result<DataFrame> {
        info!(url = %url, "Downloading dataset");

        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(None::<Duration>)
            .build()?;

        let response = client.get(url).send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(DiabetesError::FetchError(format!(
                "HTTP error {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        let bytes = response.bytes()?;
        debug!(size_bytes = bytes.len(), "Dataset downloaded");

        self.parse_csv(bytes.to_vec())
    }

    /// Parse an in-memory CSV document
    pub fn parse_csv(&self, bytes: Vec<u8>) -> Result<DataFrame> {
        CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(self.infer_schema_length)
            .into_reader_with_file_handle(Cursor::new(bytes))
            .finish()
            .map_err(|e| DiabetesError::DataError(e.to_string()))
    }
}
