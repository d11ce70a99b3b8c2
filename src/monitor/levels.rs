use crate::error::{LevelWatchError, Result};
use std::sync::{Arc, Mutex, MutexGuard};

/// Level set shared between the operator menu and the poll scheduler.
pub type SharedLevels = Arc<Mutex<LevelSet>>;

/// Locks the shared set. A poisoned lock still holds a consistent set since
/// every mutation is a single `Vec` operation.
pub fn lock(levels: &SharedLevels) -> MutexGuard<'_, LevelSet> {
    levels.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// The user-defined price levels being watched.
///
/// Levels are distinct and finite. Insertion order is kept only so the
/// level file round-trips the way the operator wrote it; display order is
/// always derived through [`LevelSet::snapshot`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LevelSet {
    levels: Vec<f64>,
}

impl LevelSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a level. Non-finite values are `InvalidInput`, a value already
    /// present is `DuplicateLevel` and leaves the set untouched.
    pub fn add(&mut self, value: f64) -> Result<()> {
        if !value.is_finite() {
            return Err(LevelWatchError::InvalidInput(format!(
                "{} is not a finite price",
                value
            )));
        }
        if self.contains(value) {
            return Err(LevelWatchError::DuplicateLevel(value));
        }
        self.levels.push(value);
        Ok(())
    }

    pub fn remove(&mut self, value: f64) -> Result<()> {
        match self.levels.iter().position(|&level| level == value) {
            Some(index) => {
                self.levels.remove(index);
                Ok(())
            }
            None => Err(LevelWatchError::NotFound(value)),
        }
    }

    pub fn clear(&mut self) {
        self.levels.clear();
    }

    pub fn contains(&self, value: f64) -> bool {
        self.levels.iter().any(|&level| level == value)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Levels in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.levels.iter().copied()
    }

    pub fn into_shared(self) -> SharedLevels {
        Arc::new(Mutex::new(self))
    }

    /// Levels sorted from highest to lowest, for display.
    pub fn snapshot(&self) -> Vec<f64> {
        let mut sorted = self.levels.clone();
        sorted.sort_by(|a, b| b.total_cmp(a));
        sorted
    }
}
