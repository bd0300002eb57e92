//! The block repository: typed storage, id generation and relation tracking.
//!
//! Blocks live in per-type buckets that keep insertion order. A separate
//! relation index maps each child block to its single parent; the children of
//! a block are found by scanning that index in reverse, so there is only one
//! structure to keep consistent.

use std::collections::HashMap;

use log::{debug, info};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::block_model::{Block, BlockId, BlockType};
use crate::repository_config::RepositoryConfig;

/// All blocks of one type, in insertion order.
#[derive(Debug, Clone)]
pub struct TypeBucket {
    pub block_type: BlockType,
    pub blocks: Vec<Block>,
}

/// In-memory store of script blocks and their parent links.
///
/// # Examples
///
/// ```rust
/// use script_block_core::block_repository::BlockRepository;
///
/// let mut repository = BlockRepository::new();
///
/// let cue = repository.add_block("CHARACTER", "ALICE", None);
/// let line = repository.add_block("DIALOGUE", "Hi", Some(cue.clone()));
///
/// assert_eq!(cue.as_str(), "CHARACTER_1");
/// assert_eq!(line.as_str(), "DIALOGUE_2");
/// assert_eq!(repository.related_block(line.as_str()), Some(&cue));
/// assert_eq!(repository.related_blocks(cue.as_str()), vec![line]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct BlockRepository {
    config: RepositoryConfig,
    counter: u64,
    buckets: Vec<TypeBucket>,
    relations: HashMap<BlockId, BlockId>,
}

impl BlockRepository {
    pub fn new() -> Self {
        Self::with_config(RepositoryConfig::default())
    }

    pub fn with_config(config: RepositoryConfig) -> Self {
        info!("Creating block repository '{}'", config.name);
        BlockRepository {
            config,
            counter: 0,
            buckets: Vec::new(),
            relations: HashMap::new(),
        }
    }

    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    /// Last sequence number handed out. Never decreases.
    pub fn counter(&self) -> u64 {
        self.counter
    }

    /// Issues the next id for `block_type` and makes sure its bucket exists.
    pub fn generate_id(&mut self, block_type: impl Into<BlockType>) -> BlockId {
        let block_type = block_type.into();
        self.counter += 1;
        let id = BlockId::compose(&block_type, self.counter);
        self.bucket_mut(block_type);
        id
    }

    /// Stores a new block and returns its id.
    ///
    /// When `parent` is given the relation `id -> parent` is recorded as is;
    /// the parent is not looked up.
    pub fn add_block(
        &mut self,
        block_type: impl Into<BlockType>,
        content: impl Into<String>,
        parent: Option<BlockId>,
    ) -> BlockId {
        let block_type = block_type.into();
        let id = self.generate_id(block_type.clone());
        let block = Block::new(id.clone(), block_type.clone(), content.into());

        self.bucket_mut(block_type).blocks.push(block);

        match parent {
            Some(parent) => {
                debug!("[{}] Added {} under {}", self.config.name, id, parent);
                self.relations.insert(id.clone(), parent);
            }
            None => debug!("[{}] Added {}", self.config.name, id),
        }

        id
    }

    /// Blocks of one type in insertion order; empty for an unknown type.
    pub fn blocks_by_type(&self, block_type: &str) -> &[Block] {
        self.buckets
            .iter()
            .find(|bucket| bucket.block_type.as_str() == block_type)
            .map(|bucket| bucket.blocks.as_slice())
            .unwrap_or(&[])
    }

    pub fn get_block(&self, id: &str) -> Option<&Block> {
        self.buckets
            .iter()
            .flat_map(|bucket| bucket.blocks.iter())
            .find(|block| block.id == id)
    }

    /// Replaces the content of a block. `created_at` is left alone.
    pub fn update_block(&mut self, id: &str, content: impl Into<String>) -> bool {
        let found = self
            .buckets
            .iter_mut()
            .flat_map(|bucket| bucket.blocks.iter_mut())
            .find(|block| block.id == id);

        match found {
            Some(block) => {
                block.content = content.into();
                debug!("[{}] Updated {}", self.config.name, id);
                true
            }
            None => {
                debug!("[{}] Update skipped, no block {}", self.config.name, id);
                false
            }
        }
    }

    /// Removes a block together with every relation it takes part in.
    ///
    /// Both the link from the block to its parent and the links from its
    /// children to it are dropped, so no relation ever names an absent block.
    pub fn remove_block(&mut self, id: &str) -> bool {
        for bucket in &mut self.buckets {
            let Some(index) = bucket.blocks.iter().position(|block| block.id == id) else {
                continue;
            };

            bucket.blocks.remove(index);
            self.relations.remove(id);
            self.relations.retain(|_, parent| parent.as_str() != id);

            debug!("[{}] Removed {}", self.config.name, id);
            return true;
        }

        debug!("[{}] Remove skipped, no block {}", self.config.name, id);
        false
    }

    /// Parent of `id`, if one was recorded.
    pub fn related_block(&self, id: &str) -> Option<&BlockId> {
        self.relations.get(id)
    }

    /// Every block whose parent is `id`, oldest first.
    pub fn related_blocks(&self, id: &str) -> Vec<BlockId> {
        let mut children: Vec<BlockId> = self
            .relations
            .iter()
            .filter(|(_, parent)| parent.as_str() == id)
            .map(|(child, _)| child.clone())
            .collect();

        children.sort_by(|a, b| a.sequence().cmp(&b.sequence()).then_with(|| a.cmp(b)));
        children
    }

    /// Drops every block and relation. The id counter keeps its value.
    pub fn clear_blocks(&mut self) {
        info!(
            "[{}] Clearing {} blocks and {} relations",
            self.config.name,
            self.len(),
            self.relations.len()
        );
        self.buckets.clear();
        self.relations.clear();
    }

    pub fn all_blocks(&self) -> BlockTable<'_> {
        BlockTable {
            buckets: &self.buckets,
        }
    }

    /// Total number of blocks across all types.
    pub fn len(&self) -> usize {
        self.buckets.iter().map(|bucket| bucket.blocks.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(|bucket| bucket.blocks.is_empty())
    }

    pub fn relation_count(&self) -> usize {
        self.relations.len()
    }

    fn bucket_mut(&mut self, block_type: BlockType) -> &mut TypeBucket {
        let index = match self
            .buckets
            .iter()
            .position(|bucket| bucket.block_type == block_type)
        {
            Some(index) => index,
            None => {
                self.buckets.push(TypeBucket {
                    block_type,
                    blocks: Vec::new(),
                });
                self.buckets.len() - 1
            }
        };
        &mut self.buckets[index]
    }
}

/// Read-only view of every bucket, in the order the types were first used.
///
/// Serializes as a JSON object mapping each type to its blocks.
#[derive(Debug, Clone, Copy)]
pub struct BlockTable<'a> {
    buckets: &'a [TypeBucket],
}

impl<'a> BlockTable<'a> {
    pub fn iter(&self) -> impl Iterator<Item = (&'a BlockType, &'a [Block])> + 'a {
        let buckets = self.buckets;
        buckets
            .iter()
            .map(|bucket| (&bucket.block_type, bucket.blocks.as_slice()))
    }

    pub fn get(&self, block_type: &str) -> Option<&'a [Block]> {
        let buckets = self.buckets;
        buckets
            .iter()
            .find(|bucket| bucket.block_type.as_str() == block_type)
            .map(|bucket| bucket.blocks.as_slice())
    }

    pub fn types(&self) -> impl Iterator<Item = &'a BlockType> + 'a {
        let buckets = self.buckets;
        buckets.iter().map(|bucket| &bucket.block_type)
    }

    /// Number of buckets, including empty ones.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

impl Serialize for BlockTable<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.buckets.len()))?;
        for bucket in self.buckets {
            map.serialize_entry(&bucket.block_type, &bucket.blocks)?;
        }
        map.end()
    }
}
