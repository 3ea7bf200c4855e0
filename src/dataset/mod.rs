// src/dataset/mod.rs

pub mod record;

pub use record::{is_sentinel, normalize_key, Field, Record, Row};

use crate::error::{AdvisoryError, Result};
use csv::{ReaderBuilder, Trim};
use once_cell::sync::OnceCell;
use std::{
    fs::File,
    io::Read,
    path::PathBuf,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};
use tracing::{debug, info};

/// Immutable, in-memory view of the agronomic CSV.
#[derive(Debug, Default)]
pub struct Dataset {
    columns: Vec<String>,
    records: Vec<Record>,
}

impl Dataset {
    /// Parse a header-first CSV from `reader`.
    /// Headers are normalized with [`normalize_key`]; short records are padded
    /// with empty strings so every column is always present.
    pub fn from_reader<R: Read>(reader: R) -> std::result::Result<Self, csv::Error> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);

        let columns: Vec<String> = rdr.headers()?.iter().map(normalize_key).collect();

        let mut records = Vec::new();
        for result in rdr.records() {
            let record = result?;
            let cells = columns
                .iter()
                .enumerate()
                .filter(|(_, name)| !name.is_empty())
                .map(|(i, name)| {
                    let value = record.get(i).map(str::trim).unwrap_or("");
                    (name.clone(), value.to_string())
                })
                .collect();
            records.push(Record::from_row(Row::new(cells)));
        }

        Ok(Self { columns, records })
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct districts in first-seen order.
    pub fn districts(&self) -> Vec<&str> {
        self.distinct(Field::District)
    }

    /// Distinct crops in first-seen order.
    pub fn crops(&self) -> Vec<&str> {
        self.distinct(Field::Crop)
    }

    fn distinct(&self, field: Field) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for value in self.records.iter().filter_map(|r| r.get(field)) {
            if !out.iter().any(|seen| seen.eq_ignore_ascii_case(value)) {
                out.push(value);
            }
        }
        out
    }
}

/// Loads the dataset at most once and hands out shared references to it.
///
/// Construct one at startup and pass it by reference; concurrent first
/// callers block on the same initialization instead of reading twice.
pub struct DatasetStore {
    path: PathBuf,
    cell: OnceCell<Arc<Dataset>>,
    reads: AtomicUsize,
}

impl DatasetStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cell: OnceCell::new(),
            reads: AtomicUsize::new(0),
        }
    }

    /// A store that is already populated and never touches storage.
    pub fn with_dataset(dataset: Dataset) -> Self {
        let cell = OnceCell::new();
        let _ = cell.set(Arc::new(dataset));
        Self {
            path: PathBuf::new(),
            cell,
            reads: AtomicUsize::new(0),
        }
    }

    /// Number of times the source file has been read.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Return the cached dataset, reading it on first use.
    /// Failures are not cached; the next call retries the read.
    pub fn load(&self) -> Result<Arc<Dataset>> {
        self.cell
            .get_or_try_init(|| {
                let dataset = self.read_from_disk()?;
                Ok(Arc::new(dataset))
            })
            .map(Arc::clone)
    }

    fn read_from_disk(&self) -> Result<Dataset> {
        if !self.path.exists() {
            return Err(AdvisoryError::DatasetNotFound {
                path: self.path.clone(),
            });
        }
        self.reads.fetch_add(1, Ordering::SeqCst);
        debug!(path = %self.path.display(), "reading dataset");

        let file = File::open(&self.path).map_err(|e| AdvisoryError::DatasetParse {
            path: self.path.clone(),
            source: csv::Error::from(e),
        })?;
        let dataset = Dataset::from_reader(file).map_err(|source| AdvisoryError::DatasetParse {
            path: self.path.clone(),
            source,
        })?;

        info!(
            path = %self.path.display(),
            rows = dataset.len(),
            columns = dataset.columns().len(),
            "dataset loaded"
        );
        Ok(dataset)
    }
}
