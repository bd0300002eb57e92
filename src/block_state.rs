use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{info, warn};

use crate::block_repository::BlockRepository;
use crate::repository_config::RepositoryConfig;

/// Handle owned by the host: one repository behind one lock.
///
/// Every repository operation touches the buckets, the relation index and
/// the counter together, so they are all guarded by the same mutex.
pub struct AppBlockState {
    repository: Mutex<BlockRepository>,
}

impl AppBlockState {
    pub fn init(config: RepositoryConfig) -> Self {
        info!("Initializing block state '{}'", config.name);
        Self {
            repository: Mutex::new(BlockRepository::with_config(config)),
        }
    }

    /// Exclusive access to the repository for the duration of the guard.
    pub fn lock(&self) -> MutexGuard<'_, BlockRepository> {
        self.repository.lock().unwrap_or_else(|poisoned: PoisonError<_>| {
            // No repository operation panics between its bucket and relation updates.
            warn!("Block repository lock was poisoned; recovering");
            poisoned.into_inner()
        })
    }

    pub fn with_repository<T>(&self, f: impl FnOnce(&mut BlockRepository) -> T) -> T {
        let mut repository = self.lock();
        f(&mut repository)
    }
}

impl Default for AppBlockState {
    fn default() -> Self {
        Self::init(RepositoryConfig::default())
    }
}
