//! Block index: height bookkeeping and ancestry walks.
//!
//! Each stored block has a [`BlockRecord`] keyed by its digest. The record
//! carries the canonical parent at `previous_block_ids[0]` plus ancestor
//! shortcuts at power-of-two distances, so a walk from a head block to any
//! ancestor costs O(log distance) record loads instead of one per height.
//!
//! Heights are computed here, never trusted from callers: a block's height
//! is always its canonical parent's height plus one, and a block whose
//! previous id is the zero digest is a genesis block at height 0.

use std::sync::Arc;

use strata_core::wire::BlockRecord;
use strata_core::{Digest, IndexError, StrataError};

use crate::backend::{KvBackend, Namespace};

/// Outcome of a successful [`BlockIndex::insert`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InsertOutcome {
    /// A new record was stored at the given height.
    Inserted(u64),
    /// The id was already present with the same canonical parent; the
    /// index is unchanged. Idempotent success, not an error.
    Duplicate(u64),
}

impl InsertOutcome {
    /// The height of the record, whether freshly inserted or pre-existing.
    pub fn height(self) -> u64 {
        match self {
            InsertOutcome::Inserted(h) | InsertOutcome::Duplicate(h) => h,
        }
    }
}

/// Heights reachable by shortcut from a block at height `h`.
///
/// Returns `[h - 1, h - 2, h - 4, ..., h - 2^tz(h)]` where `tz` is the
/// number of trailing zero bits of `h`; empty for genesis (`h == 0`).
/// Strictly descending, and `result[0]` is always the canonical parent
/// height.
pub fn previous_heights(h: u64) -> Vec<u64> {
    if h == 0 {
        return Vec::new();
    }
    let zeros = h.trailing_zeros();
    (0..=zeros).map(|i| h - (1u64 << i)).collect()
}

/// Greatest shortcut index from `current` that does not overshoot `goal`.
///
/// With `a = previous_heights(current)`, returns `(i, a[i])` for the
/// largest `i` such that `a[i] >= goal`. `a[0] = current - 1 >= goal`
/// always holds when `goal < current`, so the result exists.
pub fn previous_height_index(goal: u64, current: u64) -> Result<(usize, u64), IndexError> {
    if goal >= current {
        return Err(IndexError::InvalidRange {
            start: goal,
            head: current,
        });
    }

    let zeros = current.trailing_zeros();
    let mut best = (0usize, current - 1);
    for i in 1..=zeros {
        let h = current - (1u64 << i);
        if h < goal {
            break;
        }
        best = (i as usize, h);
    }
    Ok(best)
}

/// Digest-keyed arena of block records over a key-value backend.
///
/// All mutation goes through [`insert`](Self::insert), which takes
/// `&mut self` so the engine can enforce single-writer discipline with a
/// reader-writer lock.
pub struct BlockIndex<B: KvBackend> {
    backend: Arc<B>,
}

impl<B: KvBackend> BlockIndex<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    /// Load the record for `id`, if present.
    pub fn get(&self, id: &Digest) -> Result<Option<BlockRecord>, StrataError> {
        match self.backend.get(Namespace::Records, &id.key_bytes())? {
            Some(bytes) => {
                let (record, _): (BlockRecord, _) =
                    bincode::decode_from_slice(&bytes, bincode::config::standard())
                        .map_err(|e| StrataError::Codec(e.to_string()))?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    /// Load records for a batch of ids, input order preserved. Misses are
    /// reported per element, never as a batch failure.
    pub fn get_many(&self, ids: &[Digest]) -> Result<Vec<Option<BlockRecord>>, StrataError> {
        ids.iter().map(|id| self.get(id)).collect()
    }

    /// Insert a block whose canonical parent is `previous_id`.
    ///
    /// The height is computed from the parent (zero digest ⇒ genesis at
    /// height 0). Re-inserting an existing id with the same parent is
    /// [`InsertOutcome::Duplicate`]; with a different parent it is a
    /// content-addressing violation and fails with [`IndexError::Conflict`].
    pub fn insert(
        &mut self,
        id: &Digest,
        previous_id: &Digest,
    ) -> Result<InsertOutcome, StrataError> {
        if let Some(existing) = self.get(id)? {
            let same_parent = match existing.previous_block_ids.first() {
                Some(parent) => parent == previous_id,
                None => previous_id.is_zero(),
            };
            if same_parent {
                return Ok(InsertOutcome::Duplicate(existing.block_height));
            }
            tracing::warn!(id = %id, "block re-added with a different parent");
            return Err(IndexError::Conflict(id.to_string()).into());
        }

        let (height, previous_block_ids) = if previous_id.is_zero() {
            (0, Vec::new())
        } else {
            let parent = self
                .get(previous_id)?
                .ok_or_else(|| IndexError::ParentNotFound(previous_id.to_string()))?;
            let height = parent.block_height + 1;

            // Ladder entry 0 is the parent itself; deeper entries are
            // resolved through the existing index.
            let mut ids = Vec::new();
            for h in previous_heights(height) {
                if h == height - 1 {
                    ids.push(previous_id.clone());
                } else {
                    ids.push(self.ancestor_at_height(previous_id, h)?);
                }
            }
            (height, ids)
        };

        let record = BlockRecord {
            block_id: id.clone(),
            block_height: height,
            previous_block_ids,
        };
        let bytes = bincode::encode_to_vec(&record, bincode::config::standard())
            .map_err(|e| StrataError::Codec(e.to_string()))?;
        self.backend.put(Namespace::Records, &id.key_bytes(), &bytes)?;

        tracing::debug!(id = %id, height, "block indexed");
        Ok(InsertOutcome::Inserted(height))
    }

    /// Resolve the id of the ancestor of `block_id` at exactly `height`.
    ///
    /// Follows shortcut pointers, loading O(log distance) records. The
    /// caller must ensure `height <= ` the block's own height.
    pub fn ancestor_at_height(
        &self,
        block_id: &Digest,
        height: u64,
    ) -> Result<Digest, StrataError> {
        let mut current = block_id.clone();
        let mut expected_height: Option<u64> = None;

        loop {
            let record = self
                .get(&current)?
                .ok_or_else(|| IndexError::ParentNotFound(current.to_string()))?;

            if let Some(expected) = expected_height {
                if record.block_height != expected {
                    return Err(IndexError::CorruptRecord {
                        expected,
                        got: record.block_height,
                    }
                    .into());
                }
            }

            if record.block_height == height {
                return Ok(record.block_id);
            }

            let (index, next_height) = previous_height_index(height, record.block_height)?;
            let next = record.previous_block_ids.get(index).ok_or({
                IndexError::CorruptRecord {
                    expected: next_height,
                    got: record.block_height,
                }
            })?;

            // Only the id is needed once the shortcut lands exactly on the
            // requested height.
            if next_height == height {
                return Ok(next.clone());
            }
            current = next.clone();
            expected_height = Some(next_height);
        }
    }

    /// Collect the canonical-chain window `[start_height ..= start_height
    /// + count - 1]` ending at or below `head_id`, ascending by height.
    ///
    /// A window reaching above the head is truncated at the head, never an
    /// error; `start_height > head.height` or `count == 0` is an
    /// [`IndexError::InvalidRange`]. Fork ambiguity does not arise: only
    /// the canonical-parent chain of `head_id` is followed.
    pub fn get_ancestry(
        &self,
        head_id: &Digest,
        start_height: u64,
        count: u32,
    ) -> Result<Vec<BlockRecord>, StrataError> {
        let head = self
            .get(head_id)?
            .ok_or_else(|| IndexError::HeadNotFound(head_id.to_string()))?;

        if count == 0 || start_height > head.block_height {
            return Err(IndexError::InvalidRange {
                start: start_height,
                head: head.block_height,
            }
            .into());
        }

        // Nearest end of the window to the head.
        let top = head
            .block_height
            .min(start_height.saturating_add(count as u64 - 1));

        let mut record = if top == head.block_height {
            head
        } else {
            let id = self.ancestor_at_height(head_id, top)?;
            self.get(&id)?
                .ok_or_else(|| IndexError::ParentNotFound(id.to_string()))?
        };

        // Walk canonical parents from the top of the window down to
        // start_height, then flip to ascending order.
        let mut records = Vec::with_capacity((top - start_height + 1) as usize);
        loop {
            let height = record.block_height;
            let parent = record.previous_block_ids.first().cloned();
            records.push(record);
            if height == start_height {
                break;
            }
            let parent_id = parent.ok_or(IndexError::CorruptRecord {
                expected: start_height,
                got: height,
            })?;
            record = self
                .get(&parent_id)?
                .ok_or_else(|| IndexError::ParentNotFound(parent_id.to_string()))?;
        }
        records.reverse();
        Ok(records)
    }
}
