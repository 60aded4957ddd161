//! Freshness detection: blake3 content hashes and render fingerprints.

mod fingerprint;
mod hash;

pub use fingerprint::{Fingerprint, fingerprint};
pub use hash::ContentHash;
