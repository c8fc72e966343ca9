//! Utility functions and helpers
//!
//! Digest helpers, base58, timestamps and the canonical binary codec used
//! for both the wire protocol and the on-disk database.

pub mod crypto;
pub mod serialization;

pub use crypto::{base58_decode, base58_encode, current_timestamp, ripemd160_digest, sha256_digest};

pub use serialization::{deserialize, serialize};
