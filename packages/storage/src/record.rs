//! # On-disk record format
//!
//! One pretty-printed JSON object per document:
//!
//! ```text
//! {
//!   "active": true,
//!   "author": "...",
//!   "blocks": [ { "blockType": "heading", "content": "...", "id": "<uuid>",
//!                 "metadata": { "createdAt": "...", "lastEditedAt": "..." } } ],
//!   "createdAt": "<ISO-8601>",
//!   "cursorPosition": { "blockId": "<uuid>", "position": 0 },
//!   "id": "<uuid>",
//!   "lastEditedAt": "<ISO-8601>",
//!   "tags": [],
//!   "title": "...",
//!   "version": "<uuid>"
//! }
//! ```
//!
//! Keys are emitted in sorted order so files diff cleanly. `title` is derived
//! from the content at save time and ignored on load.

use chrono::{DateTime, Utc};
use folio_document::{
    Block, BlockId, BlockType, Cursor, Document, DocumentId, DocumentParts, VersionToken,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRecord {
    pub id: DocumentId,
    pub version: VersionToken,
    pub created_at: DateTime<Utc>,
    pub last_edited_at: DateTime<Utc>,
    #[serde(default)]
    pub author: String,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub title: String,
    pub blocks: Vec<BlockRecord>,
    pub cursor_position: CursorRecord,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockRecord {
    pub id: BlockId,
    pub block_type: BlockType,
    #[serde(default)]
    pub content: String,
    pub metadata: BlockMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockMetadata {
    pub created_at: DateTime<Utc>,
    pub last_edited_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CursorRecord {
    pub block_id: BlockId,
    pub position: usize,
}

fn default_active() -> bool {
    true
}

impl From<&Document> for DocumentRecord {
    fn from(doc: &Document) -> Self {
        let cursor = doc.cursor();
        Self {
            id: doc.id(),
            version: doc.version(),
            created_at: doc.created_at(),
            last_edited_at: doc.last_edited_at(),
            author: doc.author().to_string(),
            active: doc.is_active(),
            title: doc.generated_title(),
            blocks: doc.blocks().iter().map(BlockRecord::from).collect(),
            cursor_position: CursorRecord {
                block_id: cursor.block_id,
                position: cursor.offset,
            },
            tags: doc.tags().iter().cloned().collect(),
        }
    }
}

impl From<&Block> for BlockRecord {
    fn from(block: &Block) -> Self {
        Self {
            id: block.id(),
            block_type: block.block_type,
            content: block.content.clone(),
            metadata: BlockMetadata {
                created_at: block.created_at,
                last_edited_at: block.last_edited_at,
            },
        }
    }
}

impl DocumentRecord {
    /// Build the in-memory document. Invariants are not checked here.
    pub fn into_document(self) -> Document {
        let blocks: Vec<Block> = self
            .blocks
            .into_iter()
            .map(|b| {
                Block::from_parts(
                    b.id,
                    b.block_type,
                    b.content,
                    b.metadata.created_at,
                    b.metadata.last_edited_at,
                )
            })
            .collect();

        Document::from_parts(DocumentParts {
            id: self.id,
            version: self.version,
            created_at: self.created_at,
            last_edited_at: self.last_edited_at,
            author: self.author,
            active: self.active,
            blocks,
            cursor: Cursor {
                block_id: self.cursor_position.block_id,
                offset: self.cursor_position.position,
            },
            tags: self.tags.into_iter().collect(),
        })
    }
}

/// Serialize a document as sorted-key, pretty-printed JSON.
pub fn encode(doc: &Document) -> serde_json::Result<String> {
    // serde_json::Value objects are BTreeMap-backed, which sorts the keys.
    let value = serde_json::to_value(DocumentRecord::from(doc))?;
    serde_json::to_string_pretty(&value)
}

/// Parse raw file bytes. Invalid UTF-8 is reported like any other
/// malformed JSON.
pub fn decode(bytes: &[u8]) -> serde_json::Result<DocumentRecord> {
    serde_json::from_slice(bytes)
}
