//! # Commands
//!
//! Reversible block mutations.
//!
//! Each command stores exactly the state it needs to invert itself, captured
//! from the document when the command is built. Constructors return `None`
//! for edits that would not change anything, so focus-only events never reach
//! the history.
//!
//! ## Semantics
//!
//! ### ContentChange / TypeChange
//! - Atomic replacement of the whole value (no character diff)
//! - Undo writes the captured old value back
//!
//! ### Insert
//! - Places a concrete block (with its ID) at an index
//! - Undo removes the block by ID; redo re-inserts the same block
//!
//! ### Delete
//! - Snapshots the removed block and the index it occupied
//! - Undo re-inserts at that exact index, not "after some neighbour", so
//!   interleaved inserts and deletes unwind correctly

use folio_document::{Block, BlockId, BlockType, Document, DocumentError};

/// A reversible document mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    ContentChange {
        block_id: BlockId,
        old_content: String,
        new_content: String,
    },

    TypeChange {
        block_id: BlockId,
        old_type: BlockType,
        new_type: BlockType,
    },

    Insert {
        block: Block,
        index: usize,
    },

    Delete {
        block: Block,
        index: usize,
    },
}

impl Command {
    /// Replace a block's content. `None` if the content is already `new_content`.
    pub fn content_change(
        doc: &Document,
        block_id: BlockId,
        new_content: impl Into<String>,
    ) -> Result<Option<Self>, DocumentError> {
        let block = doc
            .block(block_id)
            .ok_or(DocumentError::BlockNotFound(block_id))?;
        let new_content = new_content.into();
        if block.content == new_content {
            return Ok(None);
        }

        Ok(Some(Command::ContentChange {
            block_id,
            old_content: block.content.clone(),
            new_content,
        }))
    }

    /// Change a block's type. `None` if it already has `new_type`.
    pub fn type_change(
        doc: &Document,
        block_id: BlockId,
        new_type: BlockType,
    ) -> Result<Option<Self>, DocumentError> {
        let block = doc
            .block(block_id)
            .ok_or(DocumentError::BlockNotFound(block_id))?;
        if block.block_type == new_type {
            return Ok(None);
        }

        Ok(Some(Command::TypeChange {
            block_id,
            old_type: block.block_type,
            new_type,
        }))
    }

    /// Insert a fresh empty block right after `after`.
    pub fn insert_after(
        doc: &Document,
        after: BlockId,
        block_type: BlockType,
    ) -> Result<Self, DocumentError> {
        let index = doc
            .block_index(after)
            .ok_or(DocumentError::BlockNotFound(after))?;

        Ok(Command::Insert {
            block: Block::new(block_type),
            index: index + 1,
        })
    }

    /// Delete a block, remembering where it was.
    pub fn delete(doc: &Document, block_id: BlockId) -> Result<Self, DocumentError> {
        let index = doc
            .block_index(block_id)
            .ok_or(DocumentError::BlockNotFound(block_id))?;
        if doc.block_count() == 1 {
            return Err(DocumentError::InvariantViolation(
                "cannot delete the only block".to_string(),
            ));
        }

        Ok(Command::Delete {
            block: doc.blocks()[index].clone(),
            index,
        })
    }

    /// Apply the command.
    pub fn execute(&self, doc: &mut Document) -> Result<(), DocumentError> {
        match self {
            Command::ContentChange {
                block_id,
                new_content,
                ..
            } => doc.set_block_content(*block_id, new_content.as_str()),

            Command::TypeChange {
                block_id, new_type, ..
            } => doc.set_block_type(*block_id, *new_type),

            Command::Insert { block, index } => doc.insert_block_at(*index, block.clone()),

            Command::Delete { block, .. } => doc.remove_block(block.id()).map(|_| ()),
        }
    }

    /// Apply the exact inverse of [`Command::execute`].
    pub fn undo(&self, doc: &mut Document) -> Result<(), DocumentError> {
        match self {
            Command::ContentChange {
                block_id,
                old_content,
                ..
            } => doc.set_block_content(*block_id, old_content.as_str()),

            Command::TypeChange {
                block_id, old_type, ..
            } => doc.set_block_type(*block_id, *old_type),

            Command::Insert { block, .. } => doc.remove_block(block.id()).map(|_| ()),

            Command::Delete { block, index } => doc.insert_block_at(*index, block.clone()),
        }
    }

    /// The block this command targets.
    pub fn block_id(&self) -> BlockId {
        match self {
            Command::ContentChange { block_id, .. } | Command::TypeChange { block_id, .. } => {
                *block_id
            }
            Command::Insert { block, .. } | Command::Delete { block, .. } => block.id(),
        }
    }

    /// Get a debug name for this command
    pub fn name(&self) -> &'static str {
        match self {
            Command::ContentChange { .. } => "content_change",
            Command::TypeChange { .. } => "type_change",
            Command::Insert { .. } => "insert",
            Command::Delete { .. } => "delete",
        }
    }
}
