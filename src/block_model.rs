//! Data model definitions for script blocks.
//!
//! This module defines the core data structures held by the block repository.
//! The primary model is [`Block`], a typed unit of script content carrying a
//! unique identifier, its category tag, mutable text and a creation timestamp.
//! Identifiers and tags are wrapped in the [`BlockId`] and [`BlockType`]
//! newtypes so they cannot be mixed up with free-form content strings.

use std::borrow::Borrow;
use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tag for character cue blocks. These feed the character aggregation.
pub const CHARACTER: &str = "CHARACTER";
/// Tag for dialogue blocks, usually related to a character cue.
pub const DIALOGUE: &str = "DIALOGUE";
/// Tag for action (scene description) lines.
pub const ACTION: &str = "ACTION";
/// Tag for scene headings (`INT. HOUSE - DAY`).
pub const SCENE_HEADING: &str = "SCENE_HEADING";
/// Tag for parentheticals attached to dialogue.
pub const PARENTHETICAL: &str = "PARENTHETICAL";
/// Tag for transitions (`CUT TO:`).
pub const TRANSITION: &str = "TRANSITION";

/// The category tag of a block.
///
/// The set of tags is open: the repository accepts any string on first use,
/// including the empty string. The constants in this module name the tags a
/// screenplay editor normally produces.
///
/// # Examples
///
/// ```rust
/// use script_block_core::block_model::{BlockType, CHARACTER};
///
/// let cue = BlockType::from(CHARACTER);
/// assert_eq!(cue.as_str(), "CHARACTER");
///
/// let custom = BlockType::from("SHOT".to_string());
/// assert_eq!(custom.to_string(), "SHOT");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockType(String);

impl BlockType {
    pub fn new(tag: impl Into<String>) -> Self {
        BlockType(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for BlockType {
    fn default() -> Self {
        BlockType::from(CHARACTER)
    }
}

impl Display for BlockType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BlockType {
    fn from(tag: &str) -> Self {
        BlockType(tag.to_string())
    }
}

impl From<String> for BlockType {
    fn from(tag: String) -> Self {
        BlockType(tag)
    }
}

impl Borrow<str> for BlockType {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Globally unique block identifier of the form `"<TYPE>_<sequence>"`.
///
/// The sequence comes from a single counter shared by every type in a
/// repository, so `CHARACTER_1` and `DIALOGUE_2` can never both carry `1`.
/// Identifiers are never reused, not even after the block is removed or the
/// repository is cleared.
///
/// # Examples
///
/// ```rust
/// use script_block_core::block_model::BlockId;
///
/// let id = BlockId::from("SCENE_HEADING_12");
/// assert_eq!(id.sequence(), Some(12));
/// assert_eq!(id.as_str(), "SCENE_HEADING_12");
///
/// // Ids coming from a host are opaque; unparseable ones have no sequence.
/// assert_eq!(BlockId::from("draft").sequence(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(String);

impl BlockId {
    pub(crate) fn compose(block_type: &BlockType, sequence: u64) -> Self {
        BlockId(format!("{block_type}_{sequence}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric suffix after the last underscore, if there is one.
    pub fn sequence(&self) -> Option<u64> {
        let (_, suffix) = self.0.rsplit_once('_')?;
        suffix.parse().ok()
    }
}

impl Display for BlockId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BlockId {
    fn from(id: &str) -> Self {
        BlockId(id.to_string())
    }
}

impl From<String> for BlockId {
    fn from(id: String) -> Self {
        BlockId(id)
    }
}

impl Borrow<str> for BlockId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for BlockId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for BlockId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// A unit of structured script content.
///
/// Blocks are created and owned by the
/// [`BlockRepository`](crate::block_repository::BlockRepository); callers
/// only ever see shared borrows or serialized copies of them.
///
/// # Structure
///
/// - **id**: Unique, immutable identifier
/// - **block_type**: Category tag, fixed at creation (blocks are never retyped)
/// - **content**: The text, replaced through `update_block`
/// - **created_at**: Creation time in UTC, unaffected by later updates
///
/// # Serialization
///
/// Blocks serialize to the JSON shape the editor front end consumes:
///
/// ```rust
/// use script_block_core::block_repository::BlockRepository;
///
/// let mut repository = BlockRepository::new();
/// let id = repository.add_block("ACTION", "Rain hammers the window.", None);
///
/// let block = repository.get_block(id.as_str()).expect("block exists");
/// let json = serde_json::to_value(block)?;
///
/// assert_eq!(json["id"], "ACTION_1");
/// assert_eq!(json["type"], "ACTION");
/// assert_eq!(json["content"], "Rain hammers the window.");
/// assert!(json["createdAt"].is_string());
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub id: BlockId,

    #[serde(rename = "type")]
    pub block_type: BlockType,

    pub content: String,

    pub created_at: DateTime<Utc>,
}

impl Block {
    pub(crate) fn new(id: BlockId, block_type: BlockType, content: String) -> Self {
        Block {
            id,
            block_type,
            content,
            created_at: Utc::now(),
        }
    }
}
