//! Content digests in multihash form.
//!
//! A [`Digest`] pairs a hash-algorithm tag with the raw digest bytes, so
//! the store can hold identifiers produced by different algorithms without
//! ambiguity. Equality and ordering are byte-wise; a digest never changes
//! after construction.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};

/// Multihash code for sha2-256.
pub const SHA2_256_CODE: u64 = 0x12;

/// A content-derived identifier: hash-algorithm tag plus digest bytes.
///
/// Used as the key type for blocks, transactions, and blobs. Two entities
/// with equal content map to the same digest (content addressing).
#[derive(
    Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord,
    bincode::Encode, bincode::Decode,
)]
pub struct Digest {
    /// Multihash algorithm code (sha2-256 = 0x12).
    pub code: u64,
    /// Raw digest bytes.
    pub bytes: Vec<u8>,
}

impl Digest {
    /// Compute the sha2-256 digest of `data`.
    pub fn sha2_256(data: &[u8]) -> Self {
        let hash = Sha256::digest(data);
        Self {
            code: SHA2_256_CODE,
            bytes: hash.to_vec(),
        }
    }

    /// The genesis sentinel: sha2-256 code over 32 zero bytes.
    ///
    /// A block whose previous-block id is this digest is a genesis block
    /// at height 0.
    pub fn zero() -> Self {
        Self {
            code: SHA2_256_CODE,
            bytes: vec![0u8; 32],
        }
    }

    /// True if every digest byte is zero (the genesis sentinel, regardless
    /// of algorithm tag).
    pub fn is_zero(&self) -> bool {
        self.bytes.iter().all(|b| *b == 0)
    }

    /// Construct from an algorithm code and raw bytes.
    pub fn from_parts(code: u64, bytes: Vec<u8>) -> Self {
        Self { code, bytes }
    }

    /// Stable key encoding: algorithm code (big-endian) followed by the
    /// digest bytes. Used as the backend key so ids produced by different
    /// algorithms can never collide.
    pub fn key_bytes(&self) -> Vec<u8> {
        let mut key = Vec::with_capacity(8 + self.bytes.len());
        key.extend_from_slice(&self.code.to_be_bytes());
        key.extend_from_slice(&self.bytes);
        key
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02x}:", self.code)?;
        for byte in &self.bytes {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl AsRef<[u8]> for Digest {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}
