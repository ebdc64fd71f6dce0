//! Error types for the Strata block store.
use thiserror::Error;

/// Errors raised by the block index.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    #[error("parent block not found: {0}")] ParentNotFound(String),
    #[error("head block not found: {0}")] HeadNotFound(String),
    #[error("content conflict on id: {0}")] Conflict(String),
    #[error("invalid range: start height {start} with head height {head}")] InvalidRange { start: u64, head: u64 },
    #[error("corrupt record: expected height {expected}, got {got}")] CorruptRecord { expected: u64, got: u64 },
}

/// Errors raised by the engine façade.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("digest does not match content: {0}")] DigestMismatch(String),
    #[error("reserved request is not supported")] ReservedRequest,
}

/// Top-level error type for the Strata block store.
#[derive(Error, Debug)]
pub enum StrataError {
    #[error(transparent)] Index(#[from] IndexError),
    #[error(transparent)] Engine(#[from] EngineError),
    #[error("storage: {0}")] Storage(String),
    #[error("codec: {0}")] Codec(String),
}
