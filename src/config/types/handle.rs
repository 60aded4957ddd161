//! Global config with atomic reload support.
//!
//! Uses `arc-swap` for lock-free reads and atomic config replacement.
//! This enables hot-reloading of `preview.toml` during watch mode.

use crate::cli::Cli;
use crate::config::ProjectConfig;
use anyhow::Result;
use arc_swap::ArcSwap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LazyLock};

/// Global config storage.
pub static CONFIG: LazyLock<ArcSwap<ProjectConfig>> =
    LazyLock::new(|| ArcSwap::from_pointee(ProjectConfig::default()));

/// Hash of the config file content currently loaded.
static CONFIG_HASH: AtomicU64 = AtomicU64::new(0);

#[inline]
pub fn cfg() -> Arc<ProjectConfig> {
    CONFIG.load_full()
}

/// Reload config from disk if content changed.
///
/// Returns `Ok(true)` if config was updated, `Ok(false)` if unchanged.
pub fn reload_config(cli: &Cli) -> Result<bool> {
    let current = cfg();
    let new_hash = file_hash(&current.config_path);
    if new_hash == CONFIG_HASH.load(Ordering::Relaxed) {
        return Ok(false);
    }

    let new_config = ProjectConfig::load(cli)?;
    CONFIG.store(Arc::new(new_config));
    CONFIG_HASH.store(new_hash, Ordering::Relaxed);

    Ok(true)
}

#[inline]
pub fn init_config(config: ProjectConfig) -> Arc<ProjectConfig> {
    CONFIG_HASH.store(file_hash(&config.config_path), Ordering::Relaxed);

    let arc = Arc::new(config);
    CONFIG.store(Arc::clone(&arc));
    arc
}

/// Hash of a file's content; zero when the file is unreadable.
fn file_hash(path: &std::path::Path) -> u64 {
    std::fs::read(path)
        .map(|bytes| {
            let digest = blake3::hash(&bytes);
            let mut head = [0u8; 8];
            head.copy_from_slice(&digest.as_bytes()[..8]);
            u64::from_le_bytes(head)
        })
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_hash_tracks_content() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("preview.toml");

        assert_eq!(file_hash(&path), 0);

        std::fs::write(&path, "[pipeline]\ndebounce_ms = 100\n").unwrap();
        let first = file_hash(&path);
        assert_ne!(first, 0);

        std::fs::write(&path, "[pipeline]\ndebounce_ms = 200\n").unwrap();
        assert_ne!(file_hash(&path), first);
    }
}
