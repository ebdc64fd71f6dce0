//! Criterion benchmarks for strata-store operations.
//!
//! Covers: add_block on a growing chain and long-range ancestry walks over
//! the in-memory backend.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use strata_core::Digest;
use strata_core::wire::BlockItem;
use strata_store::BlockStore;

/// Build a linear chain of `len` blocks and return the head id.
fn build_chain(store: &BlockStore<strata_store::MemoryBackend>, len: u64) -> Digest {
    let mut parent = Digest::zero();
    for i in 0..len {
        let blob = format!("block {i}").into_bytes();
        let block = BlockItem {
            block_id: Digest::sha2_256(&blob),
            block_height: 0,
            block_blob: blob,
            block_receipt_blob: Vec::new(),
        };
        store.add_block(&block, &parent).unwrap();
        parent = block.block_id;
    }
    parent
}

fn bench_add_block(c: &mut Criterion) {
    c.bench_function("add_block_on_1k_chain", |b| {
        b.iter_with_setup(
            || {
                let store = BlockStore::in_memory();
                let head = build_chain(&store, 1000);
                let blob = b"benchmark block".to_vec();
                let block = BlockItem {
                    block_id: Digest::sha2_256(&blob),
                    block_height: 0,
                    block_blob: blob,
                    block_receipt_blob: Vec::new(),
                };
                (store, block, head)
            },
            |(store, block, head)| {
                store.add_block(black_box(&block), black_box(&head)).unwrap();
            },
        );
    });
}

fn bench_ancestry_walk(c: &mut Criterion) {
    let store = BlockStore::in_memory();
    let head = build_chain(&store, 4096);

    // Window far below the head; skip pointers keep this O(log distance).
    c.bench_function("ancestry_window_deep", |b| {
        b.iter(|| {
            let items = store
                .get_blocks_by_height(black_box(&head), 10, 16, false, false)
                .unwrap();
            black_box(items);
        });
    });

    c.bench_function("ancestry_full_chain", |b| {
        b.iter(|| {
            let items = store
                .get_blocks_by_height(black_box(&head), 0, 4096, false, false)
                .unwrap();
            black_box(items);
        });
    });
}

criterion_group!(benches, bench_add_block, bench_ancestry_walk);
criterion_main!(benches);
