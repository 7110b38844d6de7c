//! Sequencer phases and the observable snapshot.

use serde::Serialize;

use crate::catalog::Level;

/// Text announced when the user should swing.
pub const HIT_CUE: &str = "Hit!";

/// Text announced when the user should return to the ready position.
pub const RECOVER_CUE: &str = "Recover";

/// Stage of the repeating cue cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// No timer outstanding, no cue displayed.
    #[default]
    Idle,
    /// A shot label was drawn and announced.
    AnnouncingShot,
    /// "Hit!" was announced.
    AwaitingHit,
    /// "Recover" was announced.
    Recovering,
}

impl Phase {
    /// Phase entered when the pending continuation fires.
    ///
    /// `Idle` has no successor because it never holds a timer.
    #[must_use]
    pub const fn successor(self) -> Option<Self> {
        match self {
            Self::Idle => None,
            Self::AnnouncingShot => Some(Self::AwaitingHit),
            Self::AwaitingHit => Some(Self::Recovering),
            Self::Recovering => Some(Self::AnnouncingShot),
        }
    }

    /// Snake-case name used in logs and events.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::AnnouncingShot => "announcing_shot",
            Self::AwaitingHit => "awaiting_hit",
            Self::Recovering => "recovering",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only view of the sequencer for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SequencerSnapshot {
    /// Level of the current (or last) session.
    pub level: Level,
    /// Current phase.
    pub phase: Phase,
    /// Text of the current cue, `None` while idle.
    pub current_cue: Option<String>,
    /// Whether announcements are suppressed.
    pub muted: bool,
    /// Shot draws since the last start.
    pub cycle: u64,
}

impl SequencerSnapshot {
    /// Idle snapshot for `level`.
    #[must_use]
    pub const fn idle(level: Level, muted: bool) -> Self {
        Self {
            level,
            phase: Phase::Idle,
            current_cue: None,
            muted,
            cycle: 0,
        }
    }

    /// Returns whether a cue is being shown.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        !matches!(self.phase, Phase::Idle)
    }
}
