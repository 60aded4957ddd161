//! Atomic file replacement.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

/// Write `bytes` to `path` via a temporary file in the same directory, so
/// readers see either the old or the new content, never a partial one.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).with_context(|| format!("Failed to create `{}`", dir.display()))?;

    let mut file = tempfile::Builder::new()
        .prefix(".preview-")
        .tempfile_in(dir)
        .with_context(|| format!("Failed to create temporary file in `{}`", dir.display()))?;
    file.write_all(bytes)
        .and_then(|()| file.flush())
        .with_context(|| format!("Failed to write `{}`", path.display()))?;
    file.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("Failed to replace `{}`", path.display()))?;
    Ok(())
}
