//! Path utilities.
//!
//! - [`fs`]: Filesystem path normalization (`normalize_path`, `find_upward`, `expand_path`)

pub mod fs;

pub use fs::{expand_path, find_upward, normalize_path};
