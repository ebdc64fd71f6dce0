//! Content-addressed blob storage.
//!
//! A [`BlobStore`] stores raw bytes keyed by digest in one backend
//! namespace. Re-putting identical content is idempotent; putting
//! different content under an existing digest is a [`IndexError::Conflict`]
//! and leaves the stored bytes unchanged.

use std::sync::Arc;

use strata_core::{Digest, IndexError, StrataError};

use crate::backend::{KvBackend, Namespace};

/// Append-only digest → bytes storage over one backend namespace.
pub struct BlobStore<B: KvBackend> {
    backend: Arc<B>,
    ns: Namespace,
}

impl<B: KvBackend> BlobStore<B> {
    pub fn new(backend: Arc<B>, ns: Namespace) -> Self {
        Self { backend, ns }
    }

    /// Store `bytes` under `id`.
    ///
    /// Idempotent when the digest already holds identical content; fails
    /// with [`IndexError::Conflict`] when the stored content differs,
    /// which indicates a caller or hashing bug.
    pub fn put(&self, id: &Digest, bytes: &[u8]) -> Result<(), StrataError> {
        if let Some(existing) = self.backend.get(self.ns, &id.key_bytes())? {
            if existing == bytes {
                return Ok(());
            }
            tracing::warn!(ns = self.ns.name(), id = %id, "content conflict on blob put");
            return Err(IndexError::Conflict(id.to_string()).into());
        }
        self.backend.put(self.ns, &id.key_bytes(), bytes)
    }

    /// Fetch the bytes stored under `id`, if any.
    pub fn get(&self, id: &Digest) -> Result<Option<Vec<u8>>, StrataError> {
        self.backend.get(self.ns, &id.key_bytes())
    }
}
