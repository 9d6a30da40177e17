//! Artifact output
//!
//! Artifacts are written to a temporary file next to the destination and
//! renamed into place, so a failed run never leaves a truncated file.

use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::{Result, TaxonomyError};

/// Write `content` to `path` atomically, creating parent directories as needed
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    let io_err = |source| TaxonomyError::Io {
        path: path.to_path_buf(),
        source,
    };

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(io_err)?;

    let mut tmp = NamedTempFile::new_in(parent).map_err(io_err)?;
    tmp.write_all(content).map_err(io_err)?;
    tmp.as_file().sync_all().map_err(io_err)?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;

    tracing::debug!(path = %path.display(), bytes = content.len(), "artifact written");
    Ok(())
}
