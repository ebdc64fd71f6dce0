//! Block store engine: the façade over blobs, block index, and
//! transaction index.
//!
//! One method per request kind, plus [`BlockStore::handle`] for sum-type
//! dispatch by a transport layer. Mutations are serialized (the index
//! write lock covers blob puts too, the transaction mutex covers the
//! transaction index); reads share the index read lock and never block
//! each other. Bodies and receipts are durably stored before the index
//! insert that references them, so a failed insert leaves only unlinked
//! content-addressed blobs behind, which a later retry reuses.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use strata_core::digest::SHA2_256_CODE;
use strata_core::wire::{
    AddBlockResp, AddTransactionResp, BlockItem, BlockRecord, BlockStoreRequest,
    BlockStoreResponse, GetBlocksByHeightResp, GetBlocksByIdResp, GetTransactionsByIdResp,
    TransactionItem,
};
use strata_core::{Digest, EngineError, StrataError};

use crate::backend::{KvBackend, MemoryBackend, Namespace};
use crate::blob::BlobStore;
use crate::block_index::{BlockIndex, InsertOutcome};
use crate::config::StoreConfig;
use crate::rocks::RocksBackend;
use crate::tx_index::TransactionIndex;

/// Content-addressed block and transaction store.
pub struct BlockStore<B: KvBackend> {
    backend: Arc<B>,
    index: RwLock<BlockIndex<B>>,
    bodies: BlobStore<B>,
    receipts: BlobStore<B>,
    transactions: Mutex<TransactionIndex<B>>,
    flush_each_put: bool,
}

impl BlockStore<RocksBackend> {
    /// Open a durable store at the configured path.
    pub fn open(config: &StoreConfig) -> Result<Self, StrataError> {
        let backend = Arc::new(RocksBackend::open(config.db_path())?);
        let mut store = Self::new(backend);
        store.flush_each_put = config.flush_each_put;
        Ok(store)
    }
}

impl BlockStore<MemoryBackend> {
    /// A store over an in-memory backend, for tests and light embedders.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::new()))
    }
}

impl<B: KvBackend> BlockStore<B> {
    /// Compose a store over an already-opened backend.
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            index: RwLock::new(BlockIndex::new(Arc::clone(&backend))),
            bodies: BlobStore::new(Arc::clone(&backend), Namespace::BlockBlobs),
            receipts: BlobStore::new(Arc::clone(&backend), Namespace::ReceiptBlobs),
            transactions: Mutex::new(TransactionIndex::new(Arc::clone(&backend))),
            backend,
            flush_each_put: false,
        }
    }

    /// Add a block whose canonical parent is `previous_block_id`
    /// ([`Digest::zero`] for genesis).
    ///
    /// The claimed height in `block_to_add` is ignored; the index computes
    /// it from the parent. Re-adding an identical block is idempotent
    /// success. Returns the computed height.
    pub fn add_block(
        &self,
        block_to_add: &BlockItem,
        previous_block_id: &Digest,
    ) -> Result<u64, StrataError> {
        verify_digest(&block_to_add.block_id, &block_to_add.block_blob)?;

        // The write guard spans the blob puts as well as the index insert:
        // blob put is a check-then-write, so it must not interleave with
        // another writer on the same id. Blobs still go in first so the
        // index never references a missing body.
        let mut index = self.index.write();
        if !block_to_add.block_blob.is_empty() {
            self.bodies
                .put(&block_to_add.block_id, &block_to_add.block_blob)?;
        }
        if !block_to_add.block_receipt_blob.is_empty() {
            self.receipts
                .put(&block_to_add.block_id, &block_to_add.block_receipt_blob)?;
        }

        let outcome = index.insert(&block_to_add.block_id, previous_block_id)?;
        drop(index);

        if self.flush_each_put {
            self.backend.flush()?;
        }

        if let InsertOutcome::Duplicate(height) = outcome {
            tracing::debug!(id = %block_to_add.block_id, height, "duplicate block add ignored");
        }
        Ok(outcome.height())
    }

    /// Look up blocks by id, hydrating bodies/receipts per the flags.
    ///
    /// Unknown ids are omitted from the result; a miss never fails the
    /// batch.
    pub fn get_blocks_by_id(
        &self,
        block_ids: &[Digest],
        return_block_blob: bool,
        return_receipt_blob: bool,
    ) -> Result<Vec<BlockItem>, StrataError> {
        let records = self.index.read().get_many(block_ids)?;
        records
            .into_iter()
            .flatten()
            .map(|record| self.hydrate(record, return_block_blob, return_receipt_blob))
            .collect()
    }

    /// Collect the canonical ancestor window of `head_block_id` starting at
    /// `ancestor_start_height`, ascending by height, at most `num_blocks`
    /// records. Truncated (never failed) when the window reaches past the
    /// head or below genesis.
    pub fn get_blocks_by_height(
        &self,
        head_block_id: &Digest,
        ancestor_start_height: u64,
        num_blocks: u32,
        return_block_blob: bool,
        return_receipt_blob: bool,
    ) -> Result<Vec<BlockItem>, StrataError> {
        let records =
            self.index
                .read()
                .get_ancestry(head_block_id, ancestor_start_height, num_blocks)?;
        records
            .into_iter()
            .map(|record| self.hydrate(record, return_block_blob, return_receipt_blob))
            .collect()
    }

    /// Store a transaction body under its content digest.
    pub fn add_transaction(&self, id: &Digest, body: &[u8]) -> Result<(), StrataError> {
        verify_digest(id, body)?;
        self.transactions.lock().add(id, body)?;
        if self.flush_each_put {
            self.backend.flush()?;
        }
        Ok(())
    }

    /// Fetch transaction bodies, input order preserved, one outcome per id.
    pub fn get_transactions_by_id(
        &self,
        ids: &[Digest],
    ) -> Result<Vec<Option<Vec<u8>>>, StrataError> {
        self.transactions.lock().get_many(ids)
    }

    /// Dispatch a wire request to the matching operation.
    pub fn handle(&self, request: &BlockStoreRequest) -> Result<BlockStoreResponse, StrataError> {
        match request {
            BlockStoreRequest::Reserved(_) => Err(EngineError::ReservedRequest.into()),
            BlockStoreRequest::GetBlocksById(req) => {
                let block_items = self.get_blocks_by_id(
                    &req.block_ids,
                    req.return_block_blob,
                    req.return_receipt_blob,
                )?;
                Ok(BlockStoreResponse::GetBlocksById(GetBlocksByIdResp {
                    block_items,
                }))
            }
            BlockStoreRequest::GetBlocksByHeight(req) => {
                let block_items = self.get_blocks_by_height(
                    &req.head_block_id,
                    req.ancestor_start_height,
                    req.num_blocks,
                    req.return_block_blob,
                    req.return_receipt_blob,
                )?;
                Ok(BlockStoreResponse::GetBlocksByHeight(
                    GetBlocksByHeightResp { block_items },
                ))
            }
            BlockStoreRequest::AddBlock(req) => {
                self.add_block(&req.block_to_add, &req.previous_block_id)?;
                Ok(BlockStoreResponse::AddBlock(AddBlockResp {}))
            }
            BlockStoreRequest::AddTransaction(req) => {
                self.add_transaction(&req.transaction_id, &req.transaction_blob)?;
                Ok(BlockStoreResponse::AddTransaction(AddTransactionResp {}))
            }
            BlockStoreRequest::GetTransactionsById(req) => {
                let transaction_items = self
                    .get_transactions_by_id(&req.transaction_ids)?
                    .into_iter()
                    .map(|body| TransactionItem {
                        transaction_blob: body.unwrap_or_default(),
                    })
                    .collect();
                Ok(BlockStoreResponse::GetTransactionsById(
                    GetTransactionsByIdResp { transaction_items },
                ))
            }
        }
    }

    /// Flush buffered backend writes to durable storage.
    pub fn flush(&self) -> Result<(), StrataError> {
        self.backend.flush()
    }

    fn hydrate(
        &self,
        record: BlockRecord,
        return_block_blob: bool,
        return_receipt_blob: bool,
    ) -> Result<BlockItem, StrataError> {
        let mut item = BlockItem::bare(record.block_id, record.block_height);
        if return_block_blob {
            item.block_blob = self.bodies.get(&item.block_id)?.unwrap_or_default();
        }
        if return_receipt_blob {
            item.block_receipt_blob = self.receipts.get(&item.block_id)?.unwrap_or_default();
        }
        Ok(item)
    }
}

/// Content-address check: a sha2-256-coded id must equal the hash of the
/// supplied bytes. Ids under other algorithm tags are accepted as-is (the
/// hash function for them is external). Empty bodies skip the check, since
/// an add may carry metadata only.
fn verify_digest(id: &Digest, bytes: &[u8]) -> Result<(), StrataError> {
    if bytes.is_empty() || id.code != SHA2_256_CODE {
        return Ok(());
    }
    let computed = Digest::sha2_256(bytes);
    if computed != *id {
        tracing::warn!(id = %id, computed = %computed, "digest mismatch on add");
        return Err(EngineError::DigestMismatch(id.to_string()).into());
    }
    Ok(())
}
