//! Per-run cache of dependency sources
//!
//! Each file is read at most once per bundling run. Unreadable or missing
//! files are remembered as absent so the failure is logged only once.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use log::{debug, warn};
use rustc_hash::FxHashMap;

#[derive(Debug, Default)]
pub struct SourceCache {
    sources: FxHashMap<PathBuf, Option<Arc<str>>>,
}

impl SourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Source text of `path`, or `None` when it cannot be read
    pub fn load(&mut self, path: &Path) -> Option<Arc<str>> {
        if let Some(cached) = self.sources.get(path) {
            return cached.clone();
        }

        let loaded = match std::fs::read_to_string(path) {
            Ok(content) => {
                debug!("Loaded {}", path.display());
                Some(Arc::<str>::from(content))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Dependency file {} does not exist", path.display());
                None
            }
            Err(e) => {
                warn!("Failed to read {}: {e}", path.display());
                None
            }
        };

        self.sources.insert(path.to_path_buf(), loaded.clone());
        loaded
    }

    /// Number of distinct paths requested so far
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
