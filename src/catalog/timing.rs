//! Per-level timing profiles.
//!
//! Every stored duration is clamped into its field's range, so the
//! sequencer can schedule any profile without re-checking positivity.

use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::TimingRejection;

use super::Level;
use super::defaults;

/// Inclusive range of valid values for a timing field, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldRange {
    /// Smallest accepted value.
    pub min: f64,
    /// Largest accepted value.
    pub max: f64,
}

impl FieldRange {
    /// Clamps `value` to the nearest bound.
    #[must_use]
    pub fn clamp(self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    /// Returns whether `value` lies inside the range.
    #[must_use]
    pub fn contains(self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// One of the three phase durations of a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimingField {
    /// Shot announcement until "Hit!".
    CueDelay,
    /// "Hit!" until "Recover".
    HitDelay,
    /// "Recover" until the next shot draw.
    RecoveringDelay,
}

impl TimingField {
    /// All fields in phase order.
    pub const ALL: [Self; 3] = [Self::CueDelay, Self::HitDelay, Self::RecoveringDelay];

    /// Valid range for this field.
    #[must_use]
    pub const fn range(self) -> FieldRange {
        match self {
            Self::CueDelay | Self::RecoveringDelay => FieldRange {
                min: 0.5,
                max: 10.0,
            },
            Self::HitDelay => FieldRange { min: 0.5, max: 5.0 },
        }
    }

    /// Snake-case name used in session files and commands.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CueDelay => "cue_delay",
            Self::HitDelay => "hit_delay",
            Self::RecoveringDelay => "recovering_delay",
        }
    }
}

impl std::fmt::Display for TimingField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimingField {
    type Err = TimingRejection;

    /// Accepts `cue_delay`, `cue-delay` and `cueDelay` spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect();
        match normalized.as_str() {
            "cuedelay" | "cue" => Ok(Self::CueDelay),
            "hitdelay" | "hit" => Ok(Self::HitDelay),
            "recoveringdelay" | "recoverydelay" | "recover" => Ok(Self::RecoveringDelay),
            _ => Err(TimingRejection::UnknownField(s.to_string())),
        }
    }
}

/// Parses user-entered text as a timing value.
///
/// # Errors
///
/// Returns [`TimingRejection::NotNumeric`] for unparseable text and
/// [`TimingRejection::NotFinite`] for NaN or infinity.
pub fn parse_value(raw: &str) -> Result<f64, TimingRejection> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| TimingRejection::NotNumeric(raw.to_string()))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(TimingRejection::NotFinite)
    }
}

/// Phase durations of one level, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimingProfile {
    /// Shot announcement until "Hit!".
    pub cue_delay: f64,
    /// "Hit!" until "Recover".
    pub hit_delay: f64,
    /// "Recover" until the next shot draw.
    pub recovering_delay: f64,
}

impl TimingProfile {
    /// Returns the value of `field`.
    #[must_use]
    pub const fn get(&self, field: TimingField) -> f64 {
        match field {
            TimingField::CueDelay => self.cue_delay,
            TimingField::HitDelay => self.hit_delay,
            TimingField::RecoveringDelay => self.recovering_delay,
        }
    }

    /// Returns `field` as a schedulable duration.
    #[must_use]
    pub fn delay(&self, field: TimingField) -> Duration {
        Duration::from_secs_f64(field.range().clamp(self.get(field)))
    }

    fn slot_mut(&mut self, field: TimingField) -> &mut f64 {
        match field {
            TimingField::CueDelay => &mut self.cue_delay,
            TimingField::HitDelay => &mut self.hit_delay,
            TimingField::RecoveringDelay => &mut self.recovering_delay,
        }
    }
}

/// Timing profiles for every level.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimingRegistry {
    profiles: HashMap<Level, TimingProfile>,
}

impl TimingRegistry {
    /// Creates a registry seeded with the built-in profile for every level.
    #[must_use]
    pub fn seeded() -> Self {
        let profiles = Level::ALL
            .into_iter()
            .map(|level| (level, defaults::seed_timing(level)))
            .collect();
        Self { profiles }
    }

    /// Returns the level's profile.
    #[must_use]
    pub fn get(&self, level: Level) -> TimingProfile {
        self.profiles
            .get(&level)
            .copied()
            .unwrap_or_else(|| defaults::seed_timing(level))
    }

    /// Stores `value` for `field`, clamped to the field's range.
    ///
    /// Returns the value actually stored.
    ///
    /// # Errors
    ///
    /// Returns [`TimingRejection::NotFinite`] for NaN or infinity; the
    /// prior value is retained.
    pub fn set(
        &mut self,
        level: Level,
        field: TimingField,
        value: f64,
    ) -> Result<f64, TimingRejection> {
        if !value.is_finite() {
            return Err(TimingRejection::NotFinite);
        }
        let stored = field.range().clamp(value);
        let mut profile = self.get(level);
        *profile.slot_mut(field) = stored;
        self.profiles.insert(level, profile);
        Ok(stored)
    }

    /// Parses `raw` and stores it like [`set`](Self::set).
    ///
    /// # Errors
    ///
    /// Returns the parse or validation rejection; the prior value is retained.
    pub fn set_from_str(
        &mut self,
        level: Level,
        field: TimingField,
        raw: &str,
    ) -> Result<f64, TimingRejection> {
        let value = parse_value(raw)?;
        self.set(level, field, value)
    }
}
