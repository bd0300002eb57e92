//! Repository configuration.
//!
//! Hosts pass the configuration as JSON when creating a repository through
//! [`create_repository`](crate::create_repository); Rust callers build it
//! directly. Every field has a default, so `{}` is a valid configuration.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::block_model::BlockType;

/// Options for a [`BlockRepository`](crate::block_repository::BlockRepository).
///
/// # Examples
///
/// ```rust
/// use script_block_core::repository_config::RepositoryConfig;
///
/// let config = RepositoryConfig::from_json(r#"{"name": "pilot_episode"}"#)?;
/// assert_eq!(config.name, "pilot_episode");
/// assert_eq!(config.character_type.as_str(), "CHARACTER");
/// # Ok::<(), script_block_core::repository_config::RepositoryConfigError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RepositoryConfig {
    /// Label used in log lines to tell repositories apart.
    pub name: String,

    /// Bucket read by the character aggregation.
    pub character_type: BlockType,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        RepositoryConfig {
            name: "script".to_string(),
            character_type: BlockType::default(),
        }
    }
}

impl RepositoryConfig {
    pub fn named(name: impl Into<String>) -> Self {
        RepositoryConfig {
            name: name.into(),
            ..RepositoryConfig::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, RepositoryConfigError> {
        serde_json::from_str(json).map_err(RepositoryConfigError)
    }
}

/// The configuration JSON could not be parsed.
#[derive(Debug)]
pub struct RepositoryConfigError(serde_json::Error);

impl Display for RepositoryConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invalid repository configuration: {}", self.0)
    }
}

impl std::error::Error for RepositoryConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}
