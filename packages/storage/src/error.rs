//! Error types for persistence

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use folio_document::{BlockId, DocumentId};
use thiserror::Error;

/// A document failed its pre-save (or post-load) invariant check.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("document id is nil")]
    NilDocumentId,

    #[error("document has no blocks")]
    NoBlocks,

    #[error("block id {0} appears more than once")]
    DuplicateBlockId(BlockId),

    #[error("created at {created_at} is after last edited at {last_edited_at}")]
    TimestampOrder {
        created_at: DateTime<Utc>,
        last_edited_at: DateTime<Utc>,
    },
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Corrupt file {}: {source}", .path.display())]
    CorruptFile {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Document not found: {0}")]
    DocumentNotFound(DocumentId),

    #[error("Config error: {0}")]
    Config(String),
}

pub type StorageResult<T> = Result<T, StorageError>;
