//! Wire schema for the block store service.
//!
//! Six request/response pairs, tagged by [`BlockStoreRequest`] and
//! [`BlockStoreResponse`] so a transport layer can dispatch on the active
//! variant. The engine itself is transport-agnostic: one method per
//! variant, these types are plain data.

use serde::{Deserialize, Serialize};

use crate::digest::Digest;

/// A hydrated block returned to callers.
///
/// `block_blob` / `block_receipt_blob` are empty when the corresponding
/// `return_*_blob` request flag was false, or when the blob was never
/// stored.
#[derive(
    Serialize, Deserialize, Clone, Debug, PartialEq, Eq,
    bincode::Encode, bincode::Decode,
)]
pub struct BlockItem {
    /// Content hash of the block.
    pub block_id: Digest,
    /// Number of ancestors from genesis (genesis = 0).
    pub block_height: u64,
    /// The block body.
    pub block_blob: Vec<u8>,
    /// The block receipt.
    pub block_receipt_blob: Vec<u8>,
}

/// A hydrated transaction returned to callers.
#[derive(
    Serialize, Deserialize, Clone, Debug, PartialEq, Eq,
    bincode::Encode, bincode::Decode,
)]
pub struct TransactionItem {
    /// The transaction body; empty when the id was unknown.
    pub transaction_blob: Vec<u8>,
}

/// The persisted form of a block's index entry.
///
/// `previous_block_ids[0]` is the canonical parent (height - 1); entries at
/// index `i > 0` are ancestor shortcuts at height `height - 2^i`, derived
/// at insertion and never supplied by callers. Height and ancestry only
/// ever consult the canonical parent.
#[derive(
    Serialize, Deserialize, Clone, Debug, PartialEq, Eq,
    bincode::Encode, bincode::Decode,
)]
pub struct BlockRecord {
    pub block_id: Digest,
    pub block_height: u64,
    pub previous_block_ids: Vec<Digest>,
}

/// The persisted form of a transaction.
#[derive(
    Serialize, Deserialize, Clone, Debug, PartialEq, Eq,
    bincode::Encode, bincode::Decode,
)]
pub struct TransactionRecord {
    pub transaction_blob: Vec<u8>,
}

// --- Request/response pairs ---

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
pub struct ReservedReq {}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
pub struct ReservedResp {}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct GetBlocksByIdReq {
    /// The ids of the blocks to get.
    pub block_ids: Vec<Digest>,
    /// If true, returns the blocks' contents.
    pub return_block_blob: bool,
    /// If true, returns the blocks' receipts.
    pub return_receipt_blob: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct GetBlocksByIdResp {
    pub block_items: Vec<BlockItem>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct GetBlocksByHeightReq {
    /// Head of the canonical chain to walk.
    pub head_block_id: Digest,
    /// Lowest height of the requested window.
    pub ancestor_start_height: u64,
    /// Maximum number of blocks to return.
    pub num_blocks: u32,
    pub return_block_blob: bool,
    pub return_receipt_blob: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct GetBlocksByHeightResp {
    /// Ascending by height.
    pub block_items: Vec<BlockItem>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct AddBlockReq {
    /// `block_height` is ignored on add; the index computes it.
    pub block_to_add: BlockItem,
    /// Canonical parent, or [`Digest::zero`] for a genesis block.
    pub previous_block_id: Digest,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
pub struct AddBlockResp {}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct AddTransactionReq {
    pub transaction_id: Digest,
    pub transaction_blob: Vec<u8>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
pub struct AddTransactionResp {}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct GetTransactionsByIdReq {
    pub transaction_ids: Vec<Digest>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct GetTransactionsByIdResp {
    /// One item per requested id, input order preserved; unknown ids yield
    /// an empty blob.
    pub transaction_items: Vec<TransactionItem>,
}

/// Sum type over all request kinds.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum BlockStoreRequest {
    Reserved(ReservedReq),
    GetBlocksById(GetBlocksByIdReq),
    GetBlocksByHeight(GetBlocksByHeightReq),
    AddBlock(AddBlockReq),
    AddTransaction(AddTransactionReq),
    GetTransactionsById(GetTransactionsByIdReq),
}

/// Sum type over all response kinds.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum BlockStoreResponse {
    Reserved(ReservedResp),
    GetBlocksById(GetBlocksByIdResp),
    GetBlocksByHeight(GetBlocksByHeightResp),
    AddBlock(AddBlockResp),
    AddTransaction(AddTransactionResp),
    GetTransactionsById(GetTransactionsByIdResp),
}

impl BlockItem {
    /// An item carrying only identity and height, with empty blobs.
    pub fn bare(block_id: Digest, block_height: u64) -> Self {
        Self {
            block_id,
            block_height,
            block_blob: Vec::new(),
            block_receipt_blob: Vec::new(),
        }
    }
}
