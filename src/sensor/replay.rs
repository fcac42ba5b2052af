//! Replay feed - plays back recorded fixes, one per poll

use std::collections::VecDeque;
use std::path::Path;

use crate::core::Result;
use super::fix::RawFix;
use super::SensorFeed;

/// Feed that returns pre-recorded fixes in order
#[derive(Clone, Debug, Default)]
pub struct ReplayFeed {
    fixes: VecDeque<RawFix>,
}

impl ReplayFeed {
    pub fn new(fixes: impl IntoIterator<Item = RawFix>) -> Self {
        Self {
            fixes: fixes.into_iter().collect(),
        }
    }

    /// Load a JSON array of fixes
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let fixes: Vec<RawFix> = serde_json::from_str(&json)?;
        log::info!("Loaded {} fixes from {}", fixes.len(), path.as_ref().display());
        Ok(Self::new(fixes))
    }

    /// Queue another fix
    pub fn push(&mut self, fix: RawFix) {
        self.fixes.push_back(fix);
    }

    /// Fixes not yet handed out
    pub fn remaining(&self) -> usize {
        self.fixes.len()
    }
}

impl SensorFeed for ReplayFeed {
    fn poll(&mut self) -> Option<RawFix> {
        self.fixes.pop_front()
    }
}
