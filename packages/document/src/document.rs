//! # Document
//!
//! The aggregate root: an ordered, never-empty list of blocks plus metadata.
//!
//! ## Invariants
//!
//! - At least one block always exists.
//! - Block IDs are pairwise distinct.
//! - `created_at <= last_edited_at`.
//! - Every content or structure mutation regenerates `version` and bumps
//!   `last_edited_at`. Cursor moves do neither.
//!
//! The primitives here are not reversible on their own; the editor wraps
//! them in commands that capture enough state to invert them.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use crate::{Block, BlockId, BlockType, DocumentError, DocumentId, Result, VersionToken};

/// Maximum length (in characters) of a generated title.
pub const TITLE_MAX_CHARS: usize = 50;

/// Title used when no block has any content.
pub const UNTITLED: &str = "Untitled";

/// Last known caret location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub block_id: BlockId,
    /// Offset in characters into the block's content.
    pub offset: usize,
}

/// Raw fields of a document, used to rebuild one from storage.
///
/// No invariants are checked when converting; callers that need guarantees
/// validate the result themselves.
#[derive(Debug, Clone)]
pub struct DocumentParts {
    pub id: DocumentId,
    pub version: VersionToken,
    pub created_at: DateTime<Utc>,
    pub last_edited_at: DateTime<Utc>,
    pub author: String,
    pub active: bool,
    pub blocks: Vec<Block>,
    pub cursor: Cursor,
    pub tags: BTreeSet<String>,
}

/// A block-based note.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    id: DocumentId,
    version: VersionToken,
    created_at: DateTime<Utc>,
    last_edited_at: DateTime<Utc>,
    author: String,
    active: bool,
    blocks: Vec<Block>,
    cursor: Cursor,
    tags: BTreeSet<String>,
}

impl Document {
    /// Create an empty document: one Heading and one Paragraph, caret at the
    /// start of the heading.
    pub fn new() -> Self {
        let heading = Block::new(BlockType::Heading);
        let paragraph = Block::new(BlockType::Paragraph);
        let now = heading.created_at;
        let cursor = Cursor {
            block_id: heading.id(),
            offset: 0,
        };

        Self {
            id: DocumentId::new(),
            version: VersionToken::new(),
            created_at: now,
            last_edited_at: now,
            author: String::new(),
            active: true,
            blocks: vec![heading, paragraph],
            cursor,
            tags: BTreeSet::new(),
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    /// Rebuild a document from raw parts without checking invariants.
    pub fn from_parts(parts: DocumentParts) -> Self {
        Self {
            id: parts.id,
            version: parts.version,
            created_at: parts.created_at,
            last_edited_at: parts.last_edited_at,
            author: parts.author,
            active: parts.active,
            blocks: parts.blocks,
            cursor: parts.cursor,
            tags: parts.tags,
        }
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn version(&self) -> VersionToken {
        self.version
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_edited_at(&self) -> DateTime<Utc> {
        self.last_edited_at
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    /// False once soft-deleted.
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id() == id)
    }

    pub fn block_index(&self, id: BlockId) -> Option<usize> {
        self.blocks.iter().position(|b| b.id() == id)
    }

    /// The block immediately before `id`, if any.
    pub fn previous_block(&self, id: BlockId) -> Option<&Block> {
        let index = self.block_index(id)?;
        index.checked_sub(1).and_then(|i| self.blocks.get(i))
    }

    pub fn first_block_of_type(&self, block_type: BlockType) -> Option<&Block> {
        self.blocks.iter().find(|b| b.block_type == block_type)
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    /// Insert a new empty block immediately after `after`.
    pub fn insert_block(&mut self, after: BlockId, block_type: BlockType) -> Result<&Block> {
        let index = self
            .block_index(after)
            .ok_or(DocumentError::BlockNotFound(after))?;
        let block = Block::new(block_type);
        self.insert_block_at(index + 1, block)?;
        Ok(&self.blocks[index + 1])
    }

    /// Insert an existing block at an exact position.
    pub fn insert_block_at(&mut self, index: usize, block: Block) -> Result<()> {
        if index > self.blocks.len() {
            return Err(DocumentError::IndexOutOfBounds {
                index,
                len: self.blocks.len(),
            });
        }
        if self.block_index(block.id()).is_some() {
            return Err(DocumentError::DuplicateBlock(block.id()));
        }

        self.blocks.insert(index, block);
        self.touch();
        Ok(())
    }

    /// Remove a block, returning it with the index it occupied.
    ///
    /// The last remaining block can never be removed.
    pub fn remove_block(&mut self, id: BlockId) -> Result<(usize, Block)> {
        let index = self.block_index(id).ok_or(DocumentError::BlockNotFound(id))?;
        if self.blocks.len() == 1 {
            tracing::debug!(block = %id, "refusing to remove the last block");
            return Err(DocumentError::InvariantViolation(
                "a document must keep at least one block".to_string(),
            ));
        }

        let removed = self.blocks.remove(index);
        if self.cursor.block_id == id {
            let fallback = &self.blocks[index.saturating_sub(1)];
            self.cursor = Cursor {
                block_id: fallback.id(),
                offset: fallback.char_len(),
            };
        }
        self.touch();
        Ok((index, removed))
    }

    /// Replace a block's content verbatim.
    pub fn set_block_content(&mut self, id: BlockId, text: impl Into<String>) -> Result<()> {
        let now = Utc::now();
        let block = self.block_mut(id)?;
        block.content = text.into();
        block.touch(now);
        self.touch();
        Ok(())
    }

    pub fn set_block_type(&mut self, id: BlockId, block_type: BlockType) -> Result<()> {
        let now = Utc::now();
        let block = self.block_mut(id)?;
        block.block_type = block_type;
        block.touch(now);
        self.touch();
        Ok(())
    }

    /// Flip the soft-delete flag.
    pub fn set_active(&mut self, active: bool) {
        if self.active != active {
            self.active = active;
            self.touch();
        }
    }

    /// Record the caret location. Offsets past the end clamp to the content
    /// length. Focus-only: the version is left alone.
    pub fn set_cursor(&mut self, block_id: BlockId, offset: usize) -> Result<()> {
        let block = self
            .block(block_id)
            .ok_or(DocumentError::BlockNotFound(block_id))?;
        self.cursor = Cursor {
            block_id,
            offset: offset.min(block.char_len()),
        };
        Ok(())
    }

    /// Merge tags by set union. Blank entries are dropped and the rest
    /// trimmed. Returns true if anything new was added.
    pub fn add_tags<I, S>(&mut self, tags: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let before = self.tags.len();
        for tag in tags {
            let tag = tag.as_ref().trim();
            if !tag.is_empty() {
                self.tags.insert(tag.to_string());
            }
        }

        let changed = self.tags.len() != before;
        if changed {
            self.touch();
        }
        changed
    }

    /// True iff every block is blank.
    pub fn is_empty(&self) -> bool {
        self.blocks.iter().all(Block::is_blank)
    }

    /// First non-blank block content, trimmed and capped at
    /// [`TITLE_MAX_CHARS`]; [`UNTITLED`] when there is none.
    pub fn generated_title(&self) -> String {
        self.blocks
            .iter()
            .map(|b| b.content.trim())
            .find(|c| !c.is_empty())
            .map(|c| c.chars().take(TITLE_MAX_CHARS).collect())
            .unwrap_or_else(|| UNTITLED.to_string())
    }

    /// The seamless text surface: block contents joined by blank lines.
    pub fn full_text(&self) -> String {
        self.blocks
            .iter()
            .map(|b| b.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    fn block_mut(&mut self, id: BlockId) -> Result<&mut Block> {
        self.blocks
            .iter_mut()
            .find(|b| b.id() == id)
            .ok_or(DocumentError::BlockNotFound(id))
    }

    fn touch(&mut self) {
        self.last_edited_at = Utc::now().max(self.created_at);
        self.version = VersionToken::new();
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_document_layout() {
        let doc = Document::new();

        assert_eq!(doc.block_count(), 2);
        assert_eq!(doc.blocks()[0].block_type, BlockType::Heading);
        assert_eq!(doc.blocks()[1].block_type, BlockType::Paragraph);
        assert!(doc.blocks().iter().all(|b| b.content.is_empty()));
        assert_eq!(doc.cursor().block_id, doc.blocks()[0].id());
        assert_eq!(doc.cursor().offset, 0);
        assert!(doc.is_active());
        assert!(doc.is_empty());
    }

    #[test]
    fn test_insert_block_after() {
        let mut doc = Document::new();
        let heading = doc.blocks()[0].id();
        let version = doc.version();

        let new_id = doc.insert_block(heading, BlockType::Paragraph).unwrap().id();

        assert_eq!(doc.block_count(), 3);
        assert_eq!(doc.block_index(new_id), Some(1));
        assert_ne!(doc.version(), version);
    }

    #[test]
    fn test_insert_after_missing_block() {
        let mut doc = Document::new();
        let missing = BlockId::new();

        let err = doc.insert_block(missing, BlockType::Paragraph).unwrap_err();
        assert_eq!(err, DocumentError::BlockNotFound(missing));
        assert_eq!(doc.block_count(), 2);
    }

    #[test]
    fn test_insert_duplicate_id_rejected() {
        let mut doc = Document::new();
        let existing = doc.blocks()[1].clone();

        let err = doc.insert_block_at(0, existing.clone()).unwrap_err();
        assert_eq!(err, DocumentError::DuplicateBlock(existing.id()));
    }

    #[test]
    fn test_insert_at_out_of_bounds() {
        let mut doc = Document::new();
        let err = doc.insert_block_at(5, Block::new(BlockType::Paragraph)).unwrap_err();
        assert_eq!(err, DocumentError::IndexOutOfBounds { index: 5, len: 2 });
    }

    #[test]
    fn test_cannot_remove_last_block() {
        let mut doc = Document::new();
        let paragraph = doc.blocks()[1].id();
        let heading = doc.blocks()[0].id();

        doc.remove_block(paragraph).unwrap();
        let version = doc.version();

        let err = doc.remove_block(heading).unwrap_err();
        assert!(matches!(err, DocumentError::InvariantViolation(_)));
        assert_eq!(doc.block_count(), 1);
        assert_eq!(doc.version(), version);
    }

    #[test]
    fn test_remove_block_returns_index() {
        let mut doc = Document::new();
        let paragraph = doc.blocks()[1].id();

        let (index, block) = doc.remove_block(paragraph).unwrap();
        assert_eq!(index, 1);
        assert_eq!(block.id(), paragraph);
        assert!(doc.block(paragraph).is_none());
    }

    #[test]
    fn test_remove_moves_cursor_to_previous_block_end() {
        let mut doc = Document::new();
        let heading = doc.blocks()[0].id();
        let paragraph = doc.blocks()[1].id();
        doc.set_block_content(heading, "Title").unwrap();
        doc.set_cursor(paragraph, 0).unwrap();

        doc.remove_block(paragraph).unwrap();

        assert_eq!(doc.cursor(), Cursor { block_id: heading, offset: 5 });
    }

    #[test]
    fn test_set_content_updates_timestamps() {
        let mut doc = Document::new();
        let paragraph = doc.blocks()[1].id();
        let before = doc.blocks()[1].last_edited_at;

        doc.set_block_content(paragraph, "Hello").unwrap();

        let block = doc.block(paragraph).unwrap();
        assert_eq!(block.content, "Hello");
        assert!(block.last_edited_at >= before);
        assert!(doc.last_edited_at() >= doc.created_at());
    }

    #[test]
    fn test_set_cursor_is_focus_only() {
        let mut doc = Document::new();
        let paragraph = doc.blocks()[1].id();
        doc.set_block_content(paragraph, "abc").unwrap();
        let version = doc.version();

        doc.set_cursor(paragraph, 99).unwrap();

        assert_eq!(doc.cursor().offset, 3);
        assert_eq!(doc.version(), version);
    }

    #[test]
    fn test_generated_title() {
        let mut doc = Document::new();
        assert_eq!(doc.generated_title(), UNTITLED);

        let paragraph = doc.blocks()[1].id();
        doc.set_block_content(paragraph, "   Grocery list  ").unwrap();
        assert_eq!(doc.generated_title(), "Grocery list");

        doc.set_block_content(paragraph, "x".repeat(80)).unwrap();
        assert_eq!(doc.generated_title().chars().count(), TITLE_MAX_CHARS);
    }

    #[test]
    fn test_is_empty_ignores_whitespace() {
        let mut doc = Document::new();
        let paragraph = doc.blocks()[1].id();

        doc.set_block_content(paragraph, " \n ").unwrap();
        assert!(doc.is_empty());

        doc.set_block_content(paragraph, "a").unwrap();
        assert!(!doc.is_empty());
    }

    #[test]
    fn test_add_tags_is_set_union() {
        let mut doc = Document::new();

        assert!(doc.add_tags(["work", "ideas"]));
        assert!(doc.add_tags(["ideas", " travel ", ""]));
        assert!(!doc.add_tags(["work"]));

        let tags: Vec<_> = doc.tags().iter().cloned().collect();
        assert_eq!(tags, vec!["ideas", "travel", "work"]);
    }

    #[test]
    fn test_soft_delete_flag() {
        let mut doc = Document::new();
        let version = doc.version();

        doc.set_active(false);
        assert!(!doc.is_active());
        assert_ne!(doc.version(), version);
    }

    #[test]
    fn test_full_text_joins_with_blank_lines() {
        let mut doc = Document::new();
        let heading = doc.blocks()[0].id();
        let paragraph = doc.blocks()[1].id();
        doc.set_block_content(heading, "Title").unwrap();
        doc.set_block_content(paragraph, "Body").unwrap();

        assert_eq!(doc.full_text(), "Title\n\nBody");
    }

    #[test]
    fn test_previous_block() {
        let doc = Document::new();
        let heading = doc.blocks()[0].id();
        let paragraph = doc.blocks()[1].id();

        assert_eq!(doc.previous_block(paragraph).map(Block::id), Some(heading));
        assert!(doc.previous_block(heading).is_none());
        assert!(doc.previous_block(BlockId::new()).is_none());
    }
}
