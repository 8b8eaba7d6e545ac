use std::fs::File;
use std::path::Path;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Pack a data directory into a single tar.gz archive, e.g. for moving an
/// import run's output out of the working tree.
pub fn pack(data_dir: &Path, archive: &Path) -> Result<(), SnapshotError> {
    let file = File::create(archive)?;
    let encoder = GzEncoder::new(file, Compression::default());
    let mut builder = tar::Builder::new(encoder);
    builder.append_dir_all(".", data_dir)?;
    builder.into_inner()?.finish()?;
    tracing::debug!(dir = %data_dir.display(), archive = %archive.display(), "snapshot packed");
    Ok(())
}

/// Unpack an archive produced by [`pack`] into `out_dir`.
pub fn unpack(archive: &Path, out_dir: &Path) -> Result<(), SnapshotError> {
    std::fs::create_dir_all(out_dir)?;
    let file = File::open(archive)?;
    let mut tar = tar::Archive::new(GzDecoder::new(file));
    tar.unpack(out_dir)?;
    Ok(())
}
