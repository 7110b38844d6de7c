//! Built-in cue pools and timing profiles.

use super::Level;
use super::timing::TimingProfile;

/// Shot cue labels each level starts with.
#[must_use]
pub const fn seed_cues(level: Level) -> &'static [&'static str] {
    match level {
        Level::Beginner | Level::Intermediate => &["Forehand", "Backhand"],
        Level::Pro => &[
            "Forehand",
            "Backhand",
            "Forehand Slice",
            "Backhand Slice",
            "Volley",
            "Overhead",
        ],
        Level::Custom => &["Forehand", "Backhand", "Volley"],
    }
}

/// Timing profile each level starts with, in seconds.
#[must_use]
pub const fn seed_timing(level: Level) -> TimingProfile {
    match level {
        Level::Beginner => TimingProfile {
            cue_delay: 2.0,
            hit_delay: 2.0,
            recovering_delay: 2.0,
        },
        Level::Intermediate => TimingProfile {
            cue_delay: 2.0,
            hit_delay: 2.0,
            recovering_delay: 1.0,
        },
        Level::Pro => TimingProfile {
            cue_delay: 1.5,
            hit_delay: 1.5,
            recovering_delay: 1.0,
        },
        Level::Custom => TimingProfile {
            cue_delay: 3.0,
            hit_delay: 1.5,
            recovering_delay: 2.0,
        },
    }
}
