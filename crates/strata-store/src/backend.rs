//! Key-value backend abstraction.
//!
//! Every persistent structure in the store (block records, block bodies,
//! receipts, transaction bodies) lives in its own [`Namespace`] of an
//! abstract key-value backend. The engine only appends: there is no
//! deletion path (pruning is an external policy, not part of this engine).

use std::collections::HashMap;

use parking_lot::RwLock;

use strata_core::StrataError;

/// The keyspaces used by the store.
///
/// Backed by column families in RocksDB and by separate maps in
/// [`MemoryBackend`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// Block index records (bincode-encoded `BlockRecord`s).
    Records,
    /// Raw block bodies.
    BlockBlobs,
    /// Raw block receipts.
    ReceiptBlobs,
    /// Raw transaction bodies.
    Transactions,
}

impl Namespace {
    /// All namespaces, in column-family declaration order.
    pub const ALL: &'static [Namespace] = &[
        Namespace::Records,
        Namespace::BlockBlobs,
        Namespace::ReceiptBlobs,
        Namespace::Transactions,
    ];

    /// Stable name, used as the RocksDB column family name.
    pub fn name(self) -> &'static str {
        match self {
            Namespace::Records => "records",
            Namespace::BlockBlobs => "block_blobs",
            Namespace::ReceiptBlobs => "receipt_blobs",
            Namespace::Transactions => "transactions",
        }
    }

    fn index(self) -> usize {
        match self {
            Namespace::Records => 0,
            Namespace::BlockBlobs => 1,
            Namespace::ReceiptBlobs => 2,
            Namespace::Transactions => 3,
        }
    }
}

/// Abstract append-only key-value storage.
///
/// `put` must be durable (or the implementation documents its flush
/// contract); writes to distinct keys do not block each other. `get` is
/// safe to call concurrently with writes.
pub trait KvBackend: Send + Sync {
    /// Store `value` under `key` in the given namespace.
    fn put(&self, ns: Namespace, key: &[u8], value: &[u8]) -> Result<(), StrataError>;

    /// Fetch a previously stored value. Returns `None` if the key is absent.
    fn get(&self, ns: Namespace, key: &[u8]) -> Result<Option<Vec<u8>>, StrataError>;

    /// Flush buffered writes to durable storage. No-op for in-memory
    /// backends.
    fn flush(&self) -> Result<(), StrataError>;
}

/// In-memory backend: one `HashMap` per namespace behind a reader-writer
/// lock.
///
/// Suitable for tests and embedders that do not need durability.
#[derive(Default)]
pub struct MemoryBackend {
    maps: [RwLock<HashMap<Vec<u8>, Vec<u8>>>; 4],
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries in a namespace. Test helper.
    pub fn len(&self, ns: Namespace) -> usize {
        self.maps[ns.index()].read().len()
    }

    /// True if the namespace holds no entries.
    pub fn is_empty(&self, ns: Namespace) -> bool {
        self.len(ns) == 0
    }
}

impl KvBackend for MemoryBackend {
    fn put(&self, ns: Namespace, key: &[u8], value: &[u8]) -> Result<(), StrataError> {
        self.maps[ns.index()]
            .write()
            .insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn get(&self, ns: Namespace, key: &[u8]) -> Result<Option<Vec<u8>>, StrataError> {
        Ok(self.maps[ns.index()].read().get(key).cloned())
    }

    fn flush(&self) -> Result<(), StrataError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_get_roundtrip() {
        let backend = MemoryBackend::new();
        backend.put(Namespace::Records, b"k", b"v").unwrap();
        assert_eq!(
            backend.get(Namespace::Records, b"k").unwrap(),
            Some(b"v".to_vec())
        );
    }

    #[test]
    fn namespaces_are_isolated() {
        let backend = MemoryBackend::new();
        backend.put(Namespace::BlockBlobs, b"k", b"body").unwrap();
        assert!(backend.get(Namespace::ReceiptBlobs, b"k").unwrap().is_none());
        assert!(backend.get(Namespace::Records, b"k").unwrap().is_none());
    }

    #[test]
    fn missing_key_is_none() {
        let backend = MemoryBackend::new();
        assert!(backend.get(Namespace::Transactions, b"nope").unwrap().is_none());
    }
}
