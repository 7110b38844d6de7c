//! Level catalog: cue pools and timing profiles keyed by level.
//!
//! The catalog is owned by the session host and shared with the sequencer
//! through [`SharedCatalog`]. The sequencer reads it at draw time, so pool
//! edits are visible on the very next draw.
//!
//! - [`Level`]: the fixed levels plus the single editable `custom` level
//! - [`CuePool`]: per-level cue definitions and the selectable set
//! - [`TimingRegistry`]: per-level phase durations with clamping

pub mod defaults;
pub mod pool;
pub mod timing;

use std::str::FromStr;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub use pool::{CueDefinition, CuePool};
pub use timing::{FieldRange, TimingField, TimingProfile, TimingRegistry};

/// Minimum similarity for "did you mean" suggestions.
const SUGGESTION_THRESHOLD: f64 = 0.7;

/// Practice level selecting a cue pool and timing profile.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Two basic shots, slow pacing.
    Beginner,
    /// Basic shots, quicker recovery.
    Intermediate,
    /// Full shot set, fast pacing.
    Pro,
    /// User-editable pool and timing.
    Custom,
}

impl Level {
    /// All levels in display order.
    pub const ALL: [Self; 4] = [Self::Beginner, Self::Intermediate, Self::Pro, Self::Custom];

    /// Returns whether the level's cue pool can be edited at runtime.
    #[must_use]
    pub const fn is_editable(self) -> bool {
        matches!(self, Self::Custom)
    }

    /// Lowercase identifier used in config files and commands.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Pro => "pro",
            Self::Custom => "custom",
        }
    }

    /// Returns the level name closest to `input`, if it is similar enough.
    #[must_use]
    pub fn suggest(input: &str) -> Option<&'static str> {
        let input = input.to_lowercase();
        Self::ALL
            .iter()
            .map(|level| (level.as_str(), strsim::jaro_winkler(&input, level.as_str())))
            .filter(|(_, score)| *score >= SUGGESTION_THRESHOLD)
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(name, _)| name)
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = crate::error::ControlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|level| level.as_str() == lowered)
            .ok_or_else(|| crate::error::ControlError::UnknownLevel {
                input: s.to_string(),
                suggestion: Self::suggest(s).map(str::to_string),
            })
    }
}

/// Cue pools and timing profiles for every level.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    /// Per-level cue definitions.
    pub pool: CuePool,
    /// Per-level phase durations.
    pub timings: TimingRegistry,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            pool: CuePool::seeded(),
            timings: TimingRegistry::seeded(),
        }
    }
}

/// Handle to a [`Catalog`] shared between the session host and the sequencer.
///
/// Lock poisoning is recovered from: every catalog mutation is a single
/// field write, so a panicking writer cannot leave it half-updated.
#[derive(Debug, Clone, Default)]
pub struct SharedCatalog(Arc<RwLock<Catalog>>);

impl SharedCatalog {
    /// Wraps a catalog for sharing.
    #[must_use]
    pub fn new(catalog: Catalog) -> Self {
        Self(Arc::new(RwLock::new(catalog)))
    }

    /// Acquires shared read access.
    pub fn read(&self) -> RwLockReadGuard<'_, Catalog> {
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Acquires exclusive write access.
    pub fn write(&self) -> RwLockWriteGuard<'_, Catalog> {
        self.0.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl From<Catalog> for SharedCatalog {
    fn from(catalog: Catalog) -> Self {
        Self::new(catalog)
    }
}
