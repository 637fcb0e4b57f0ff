//! Error types for the editor

use folio_document::DocumentError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditorError {
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    #[error("Batch already in progress")]
    BatchInProgress,
}

pub type EditorResult<T> = Result<T, EditorError>;
