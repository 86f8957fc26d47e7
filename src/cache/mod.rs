//! Advisory response cache keyed by request fingerprint.

pub mod fingerprint;
pub mod store;

pub use fingerprint::{FINGERPRINT_SCHEMA, Fingerprint, FingerprintInput, normalize_query};
pub use store::{FsResponseCache, MemoryResponseCache, ResponseCache};
