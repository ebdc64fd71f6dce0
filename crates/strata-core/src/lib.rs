//! # strata-core
//! Foundation types for the Strata block store: content digests, the
//! request/response wire schema, and the error taxonomy.

pub mod digest;
pub mod error;
pub mod wire;

pub use digest::Digest;
pub use error::{EngineError, IndexError, StrataError};
