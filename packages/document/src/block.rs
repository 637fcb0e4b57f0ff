//! Blocks: typed units of document content.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::BlockId;

/// What a block *is*.
///
/// Deliberately small. Type-specific behavior (Return-key routing, the
/// default document layout) matches on this at the few sites that need it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BlockType {
    /// Document heading, conventionally the first block.
    Heading,
    /// Body text.
    #[default]
    Paragraph,
}

impl BlockType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockType::Heading => "heading",
            BlockType::Paragraph => "paragraph",
        }
    }
}

/// A single block of content.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    id: BlockId,
    pub block_type: BlockType,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub last_edited_at: DateTime<Utc>,
}

impl Block {
    /// Create an empty block with a fresh ID.
    pub fn new(block_type: BlockType) -> Self {
        Self::with_content(block_type, String::new())
    }

    pub fn with_content(block_type: BlockType, content: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: BlockId::new(),
            block_type,
            content: content.into(),
            created_at: now,
            last_edited_at: now,
        }
    }

    /// Rebuild a block from persisted parts, keeping its original ID.
    pub fn from_parts(
        id: BlockId,
        block_type: BlockType,
        content: String,
        created_at: DateTime<Utc>,
        last_edited_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            block_type,
            content,
            created_at,
            last_edited_at,
        }
    }

    /// Immutable for the block's lifetime.
    pub fn id(&self) -> BlockId {
        self.id
    }

    /// Content length in characters, the unit used for cursor offsets.
    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }

    /// True if the content is empty after trimming whitespace.
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }

    pub(crate) fn touch(&mut self, now: DateTime<Utc>) {
        self.last_edited_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_block_is_empty() {
        let block = Block::new(BlockType::Paragraph);
        assert!(block.content.is_empty());
        assert!(block.is_blank());
        assert_eq!(block.created_at, block.last_edited_at);
    }

    #[test]
    fn test_char_len_counts_chars_not_bytes() {
        let block = Block::with_content(BlockType::Paragraph, "héllo");
        assert_eq!(block.char_len(), 5);
        assert_eq!(block.content.len(), 6);
    }

    #[test]
    fn test_block_type_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&BlockType::Heading).unwrap(), "\"heading\"");
        let parsed: BlockType = serde_json::from_str("\"paragraph\"").unwrap();
        assert_eq!(parsed, BlockType::Paragraph);
    }

    #[test]
    fn test_whitespace_only_is_blank() {
        let block = Block::with_content(BlockType::Heading, "  \n\t");
        assert!(block.is_blank());
    }
}
