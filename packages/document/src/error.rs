//! Error types for document mutations.

use thiserror::Error;

use crate::BlockId;

/// Errors raised by the primitive document mutations.
///
/// Every failing operation leaves the document unchanged.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DocumentError {
    /// Block not found in document.
    #[error("block not found: {0:?}")]
    BlockNotFound(BlockId),

    /// The mutation would break a structural invariant (e.g. zero blocks).
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// A block with this ID is already part of the document.
    #[error("block already exists: {0:?}")]
    DuplicateBlock(BlockId),

    /// Positional insert past the end of the block list.
    #[error("index {index} out of bounds for document with {len} blocks")]
    IndexOutOfBounds { index: usize, len: usize },
}
