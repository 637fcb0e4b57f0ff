//! # Folio Document
//!
//! Block document model for Folio notes.
//!
//! A [`Document`] is an ordered, never-empty sequence of typed [`Block`]s plus
//! metadata (timestamps, soft-delete flag, cursor, tags). This crate holds the
//! data and the primitive mutations only; reversible editing lives in
//! `folio-editor` and persistence in `folio-storage`.
//!
//! ```rust
//! use folio_document::{BlockType, Document};
//!
//! let mut doc = Document::new();
//! let heading = doc.blocks()[0].id();
//! doc.set_block_content(heading, "Shopping").unwrap();
//! let added = doc.insert_block(heading, BlockType::Paragraph).unwrap().id();
//!
//! assert_eq!(doc.block_index(added), Some(1));
//! assert_eq!(doc.generated_title(), "Shopping");
//! ```

mod block;
mod document;
mod error;
pub mod ids;

pub use block::{Block, BlockType};
pub use document::{Cursor, Document, DocumentParts, TITLE_MAX_CHARS, UNTITLED};
pub use error::DocumentError;
pub use ids::{BlockId, DocumentId, VersionToken};

/// Result type for document operations.
pub type Result<T> = std::result::Result<T, DocumentError>;
