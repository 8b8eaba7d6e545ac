pub mod accounts;
pub mod generic;
pub mod n26;
pub(crate) mod parse;

use std::path::{Path, PathBuf};

use ledgerize_core::{RawRecord, SourceBatch};
use thiserror::Error;

pub use accounts::{AccountMap, AccountMapping};
pub use generic::GenericReader;
pub use n26::N26Reader;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("{file}: {source}")]
    Io {
        file: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{file}: {source}")]
    Csv {
        file: String,
        #[source]
        source: csv::Error,
    },
    #[error("{file}: missing required column '{column}'")]
    MissingColumn { file: String, column: String },
    #[error("{file} row {row}: unparseable date '{value}'")]
    InvalidDate {
        file: String,
        row: usize,
        value: String,
    },
    #[error("{file} row {row}: unparseable amount '{value}'")]
    InvalidAmount {
        file: String,
        row: usize,
        value: String,
    },
    #[error("invalid accounts config: {0}")]
    AccountsConfig(#[from] toml::de::Error),
}

impl ImportError {
    fn missing_column(file: &str, column: &str) -> Self {
        ImportError::MissingColumn {
            file: file.to_string(),
            column: column.to_string(),
        }
    }

    fn invalid_date(file: &str, row: usize, value: &str) -> Self {
        ImportError::InvalidDate {
            file: file.to_string(),
            row,
            value: value.to_string(),
        }
    }

    fn invalid_amount(file: &str, row: usize, value: &str) -> Self {
        ImportError::InvalidAmount {
            file: file.to_string(),
            row,
            value: value.to_string(),
        }
    }
}

/// A per-source reader turns one export file into uniform raw records.
/// New bank dialects plug in here. `label` is the source name stamped on
/// every record and used in error messages.
pub trait SourceReader {
    fn read(
        &self,
        path: &Path,
        label: &str,
        accounts: &AccountMap,
        currency: &str,
    ) -> Result<Vec<RawRecord>, ImportError>;
}

/// Pick a reader from the file stem: anything mentioning "n26" gets the N26
/// dialect, everything else the generic header-driven reader.
pub fn choose_reader(path: &Path) -> Box<dyn SourceReader> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_lowercase();
    if stem.contains("n26") {
        Box::new(N26Reader)
    } else {
        Box::new(GenericReader)
    }
}

/// Read one export file into a source batch, using the reader its name
/// selects. `currency` fills records whose source carries no currency column.
///
/// With `base` set, the source label is the path relative to it, so two
/// same-named files from different subdirectories stay distinguishable in
/// the audit trail and order deterministically.
pub fn read_file(
    path: &Path,
    base: Option<&Path>,
    accounts: &AccountMap,
    currency: &str,
) -> Result<SourceBatch, ImportError> {
    let label = source_label(path, base);
    let records = choose_reader(path).read(path, &label, accounts, currency)?;
    tracing::debug!(file = %path.display(), records = records.len(), "read source file");
    Ok(SourceBatch {
        source: label,
        records,
    })
}

/// Recursively collect the CSV files under `dir`, sorted by path so callers
/// see a stable order before the pipeline re-sorts batches by source name.
pub fn collect_csv_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    walk(dir, &mut files)?;
    files.sort();
    Ok(files)
}

fn walk(dir: &Path, files: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            walk(&path, files)?;
        } else if path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("csv"))
        {
            files.push(path);
        }
    }
    Ok(())
}

fn source_label(path: &Path, base: Option<&Path>) -> String {
    match base {
        Some(base) => path
            .strip_prefix(base)
            .unwrap_or(path)
            .display()
            .to_string(),
        None => path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .unwrap_or_else(|| path.display().to_string()),
    }
}

pub(crate) fn open_reader(
    path: &Path,
    label: &str,
    delimiter: u8,
) -> Result<csv::Reader<std::fs::File>, ImportError> {
    let handle = std::fs::File::open(path).map_err(|source| ImportError::Io {
        file: label.to_string(),
        source,
    })?;
    Ok(csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(handle))
}
