//! Transaction index: digest → transaction body.
//!
//! Transactions have no height or parent relationship; they are addressed
//! purely by content. Records are append-only with the same
//! content-conflict rules as the blob store.

use std::sync::Arc;

use strata_core::wire::TransactionRecord;
use strata_core::{Digest, IndexError, StrataError};

use crate::backend::{KvBackend, Namespace};

/// Append-only digest → transaction body storage.
pub struct TransactionIndex<B: KvBackend> {
    backend: Arc<B>,
}

impl<B: KvBackend> TransactionIndex<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    /// Store a transaction body under its id.
    ///
    /// Idempotent for identical content; [`IndexError::Conflict`] when the
    /// id already holds a different body.
    pub fn add(&mut self, id: &Digest, body: &[u8]) -> Result<(), StrataError> {
        if let Some(existing) = self.get(id)? {
            if existing == body {
                return Ok(());
            }
            tracing::warn!(id = %id, "transaction re-added with different content");
            return Err(IndexError::Conflict(id.to_string()).into());
        }

        let record = TransactionRecord {
            transaction_blob: body.to_vec(),
        };
        let bytes = bincode::encode_to_vec(&record, bincode::config::standard())
            .map_err(|e| StrataError::Codec(e.to_string()))?;
        self.backend
            .put(Namespace::Transactions, &id.key_bytes(), &bytes)
    }

    /// Fetch the body stored under `id`, if any.
    pub fn get(&self, id: &Digest) -> Result<Option<Vec<u8>>, StrataError> {
        match self.backend.get(Namespace::Transactions, &id.key_bytes())? {
            Some(bytes) => {
                let (record, _): (TransactionRecord, _) =
                    bincode::decode_from_slice(&bytes, bincode::config::standard())
                        .map_err(|e| StrataError::Codec(e.to_string()))?;
                Ok(Some(record.transaction_blob))
            }
            None => Ok(None),
        }
    }

    /// Fetch a batch of bodies, input order preserved; each element reports
    /// its own outcome, a miss never fails the batch.
    pub fn get_many(&self, ids: &[Digest]) -> Result<Vec<Option<Vec<u8>>>, StrataError> {
        ids.iter().map(|id| self.get(id)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;

    fn new_index() -> TransactionIndex<MemoryBackend> {
        TransactionIndex::new(Arc::new(MemoryBackend::new()))
    }

    #[test]
    fn add_then_get() {
        let mut index = new_index();
        let id = Digest::sha2_256(b"tx");
        index.add(&id, b"tx").unwrap();
        assert_eq!(index.get(&id).unwrap(), Some(b"tx".to_vec()));
    }

    #[test]
    fn readd_identical_is_idempotent() {
        let mut index = new_index();
        let id = Digest::sha2_256(b"tx");
        index.add(&id, b"tx").unwrap();
        index.add(&id, b"tx").unwrap();
    }

    #[test]
    fn readd_different_content_is_conflict() {
        let mut index = new_index();
        let id = Digest::sha2_256(b"tx");
        index.add(&id, b"tx").unwrap();
        let err = index.add(&id, b"other").unwrap_err();
        assert!(matches!(err, StrataError::Index(IndexError::Conflict(_))));
        assert_eq!(index.get(&id).unwrap(), Some(b"tx".to_vec()));
    }

    #[test]
    fn batch_preserves_order_with_misses() {
        let mut index = new_index();
        let a = Digest::sha2_256(b"a");
        let b = Digest::sha2_256(b"b");
        index.add(&a, b"a").unwrap();
        index.add(&b, b"b").unwrap();

        let results = index
            .get_many(&[b.clone(), Digest::sha2_256(b"missing"), a.clone()])
            .unwrap();
        assert_eq!(results[0], Some(b"b".to_vec()));
        assert_eq!(results[1], None);
        assert_eq!(results[2], Some(b"a".to_vec()));
    }
}
