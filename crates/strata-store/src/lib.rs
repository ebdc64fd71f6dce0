//! # strata-store — Block store engine: backends, indexes, façade.
//!
//! Composes the storage subsystems into an embeddable engine:
//! - [`backend::KvBackend`] — key-value backend abstraction with an
//!   in-memory implementation for tests and light embedders
//! - [`rocks::RocksBackend`] — durable RocksDB backend
//! - [`blob::BlobStore`] — content-addressed blob storage
//! - [`block_index::BlockIndex`] — height bookkeeping and ancestry walks
//! - [`tx_index::TransactionIndex`] — transaction body storage
//! - [`engine::BlockStore`] — the façade, one method per request kind
//! - [`config::StoreConfig`] — engine configuration

pub mod backend;
pub mod blob;
pub mod block_index;
pub mod config;
pub mod engine;
pub mod rocks;
pub mod tx_index;

pub use backend::{KvBackend, MemoryBackend, Namespace};
pub use config::StoreConfig;
pub use engine::BlockStore;
pub use rocks::RocksBackend;
