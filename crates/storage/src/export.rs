use std::io::Write;
use std::path::Path;

use ledgerize_core::NormalizedTransaction;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn export_csv(
    transactions: &[NormalizedTransaction],
    path: &Path,
) -> Result<(), ExportError> {
    let mut writer = csv::Writer::from_path(path)?;
    for tx in transactions {
        writer.serialize(tx)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn export_jsonl(
    transactions: &[NormalizedTransaction],
    path: &Path,
) -> Result<(), ExportError> {
    let mut file = std::fs::File::create(path)?;
    for tx in transactions {
        serde_json::to_writer(&mut file, tx)?;
        file.write_all(b"\n")?;
    }
    Ok(())
}

/// Write the full export set into `out`: `normalized.csv`, `normalized.jsonl`
/// and an `import_log.json` with the row count.
pub fn export_all(transactions: &[NormalizedTransaction], out: &Path) -> Result<(), ExportError> {
    export_csv(transactions, &out.join("normalized.csv"))?;
    export_jsonl(transactions, &out.join("normalized.jsonl"))?;

    let log = serde_json::json!({ "rows": transactions.len() });
    std::fs::write(out.join("import_log.json"), serde_json::to_vec(&log)?)?;

    tracing::debug!(rows = transactions.len(), dir = %out.display(), "export complete");
    Ok(())
}
