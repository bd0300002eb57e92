//! Character aggregation over the repository.
//!
//! Produces the cast list with per-character line counts. The view is
//! computed from scratch on every call, so it always reflects the current
//! blocks and relations.

use std::collections::HashMap;

use feruca::Collator;
use serde::{Deserialize, Serialize};

use crate::block_model::BlockId;
use crate::block_repository::BlockRepository;

/// One entry of the cast report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterLine {
    pub name: String,
    pub lines: usize,
}

/// A cast entry together with the blocks it was derived from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterSummary {
    pub name: String,
    pub lines: usize,
    /// Character cue blocks that carry this name, in document order.
    pub block_ids: Vec<BlockId>,
    /// Children (usually dialogue) of those cues. Not counted in `lines`.
    pub related_block_ids: Vec<BlockId>,
}

impl From<CharacterSummary> for CharacterLine {
    fn from(summary: CharacterSummary) -> Self {
        CharacterLine {
            name: summary.name,
            lines: summary.lines,
        }
    }
}

/// Trimmed, upper-cased character name, or `None` when nothing is left.
///
/// Trims the ECMAScript whitespace set: Unicode `White_Space` minus U+0085,
/// plus the byte-order mark U+FEFF.
pub fn normalize_name(content: &str) -> Option<String> {
    let name = content.trim_matches(is_name_padding).to_uppercase();
    (!name.is_empty()).then_some(name)
}

fn is_name_padding(c: char) -> bool {
    c == '\u{feff}' || (c.is_whitespace() && c != '\u{85}')
}

/// Sorts names with the Unicode Collation Algorithm (root tailoring), so
/// `ÉMILE` lands between `ANNA` and `ZOE`. Code point order breaks ties.
fn sort_by_name(summaries: &mut [CharacterSummary]) {
    let mut collator = Collator::default();
    summaries.sort_by(|a, b| {
        collator
            .collate(a.name.as_str(), b.name.as_str())
            .then_with(|| a.name.cmp(&b.name))
    });
}

impl BlockRepository {
    /// Cast report sorted by name, in locale-aware collation order.
    ///
    /// Every character cue counts as one line, no matter how many dialogue
    /// blocks hang off it. Names are merged after trimming and upper-casing;
    /// blank cues are ignored.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use script_block_core::block_repository::BlockRepository;
    /// use script_block_core::characters::CharacterLine;
    ///
    /// let mut repository = BlockRepository::new();
    /// repository.add_block("CHARACTER", "John", None);
    /// repository.add_block("CHARACTER", " anna ", None);
    /// repository.add_block("CHARACTER", "JOHN", None);
    ///
    /// assert_eq!(
    ///     repository.characters(),
    ///     vec![
    ///         CharacterLine { name: "ANNA".to_string(), lines: 1 },
    ///         CharacterLine { name: "JOHN".to_string(), lines: 2 },
    ///     ]
    /// );
    /// ```
    pub fn characters(&self) -> Vec<CharacterLine> {
        self.character_summaries()
            .into_iter()
            .map(CharacterLine::from)
            .collect()
    }

    /// Same report as [`characters`](Self::characters), keeping the
    /// contributing cue ids and their related blocks.
    pub fn character_summaries(&self) -> Vec<CharacterSummary> {
        let cues = self.blocks_by_type(self.config().character_type.as_str());
        let mut by_name: HashMap<String, CharacterSummary> = HashMap::new();

        for cue in cues {
            let Some(name) = normalize_name(&cue.content) else {
                continue;
            };
            let related = self.related_blocks(cue.id.as_str());

            let entry = by_name
                .entry(name.clone())
                .or_insert_with(|| CharacterSummary {
                    name,
                    lines: 0,
                    block_ids: Vec::new(),
                    related_block_ids: Vec::new(),
                });
            entry.lines += 1;
            entry.block_ids.push(cue.id.clone());
            entry.related_block_ids.extend(related);
        }

        let mut summaries: Vec<CharacterSummary> = by_name.into_values().collect();
        sort_by_name(&mut summaries);
        summaries
    }
}
