//! Session file schema.
//!
//! ```yaml
//! level: pro
//! muted: false
//! levels:
//!   custom:
//!     timing: { cue_delay: 3, hit_delay: 1.5, recovering_delay: 2 }
//!     cues:
//!       - Drop shot
//!       - { label: Lob, enabled: false }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::{CueDefinition, Level, TimingField};

/// Top-level session file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// Level selected when the session opens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<Level>,

    /// Start with announcements muted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub muted: Option<bool>,

    /// Per-level overrides.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub levels: BTreeMap<Level, LevelConfig>,
}

/// Overrides for one level.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LevelConfig {
    /// Timing fields to override; absent fields keep the built-in value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timing: Option<TimingOverride>,

    /// Replacement cue list. Absent keeps the built-in pool.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cues: Option<Vec<CueEntry>>,
}

/// Partial timing profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimingOverride {
    /// Seconds from shot announcement to "Hit!".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cue_delay: Option<f64>,
    /// Seconds from "Hit!" to "Recover".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hit_delay: Option<f64>,
    /// Seconds from "Recover" to the next shot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recovering_delay: Option<f64>,
}

impl TimingOverride {
    /// Returns the fields that are set, in phase order.
    pub fn fields(&self) -> impl Iterator<Item = (TimingField, f64)> + '_ {
        TimingField::ALL.into_iter().filter_map(|field| {
            let value = match field {
                TimingField::CueDelay => self.cue_delay,
                TimingField::HitDelay => self.hit_delay,
                TimingField::RecoveringDelay => self.recovering_delay,
            };
            value.map(|v| (field, v))
        })
    }
}

/// A cue entry: a bare label, or a label with its enabled flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CueEntry {
    /// Bare label, enabled.
    Label(String),
    /// Label with explicit flag.
    Full(CueSpec),
}

/// Long form of a cue entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CueSpec {
    /// Cue text.
    pub label: String,
    /// Whether the cue can be drawn.
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

const fn enabled_by_default() -> bool {
    true
}

impl From<&CueEntry> for CueDefinition {
    fn from(entry: &CueEntry) -> Self {
        match entry {
            CueEntry::Label(label) => Self::new(label.as_str()),
            CueEntry::Full(spec) => Self {
                label: spec.label.clone(),
                enabled: spec.enabled,
            },
        }
    }
}
