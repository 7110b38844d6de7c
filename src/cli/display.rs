//! Text rendering shared by the commands.

use std::io::Write;

use serde::Serialize;

use crate::catalog::{Catalog, CueDefinition, Level, TimingField, TimingProfile};
use crate::phase::{Phase, SequencerSnapshot};

/// One-line rendering of a snapshot, as printed on every change.
#[must_use]
pub fn render_snapshot(snapshot: &SequencerSnapshot) -> String {
    let mut line = format!("[{}]", snapshot.level);
    match (&snapshot.phase, &snapshot.current_cue) {
        (Phase::Idle, _) | (_, None) => line.push_str(" idle"),
        (phase, Some(cue)) => {
            let marker = match phase {
                Phase::AnnouncingShot => ">>",
                Phase::AwaitingHit => "!!",
                _ => "..",
            };
            line.push_str(&format!(" #{} {marker} {cue}", snapshot.cycle));
        }
    }
    if snapshot.muted {
        line.push_str(" (muted)");
    }
    line
}

/// A level's pool and timing in serializable form.
#[derive(Debug, Serialize)]
pub struct LevelView {
    /// Level name.
    pub level: Level,
    /// Whether cues can be edited.
    pub editable: bool,
    /// Phase durations.
    pub timing: TimingProfile,
    /// Cue definitions in list order.
    pub cues: Vec<CueDefinition>,
}

impl LevelView {
    /// Captures `level` from `catalog`.
    #[must_use]
    pub fn capture(catalog: &Catalog, level: Level) -> Self {
        Self {
            level,
            editable: level.is_editable(),
            timing: catalog.timings.get(level),
            cues: catalog.pool.list_level(level).to_vec(),
        }
    }
}

/// Writes the numbered cue list and timing of `level`.
///
/// # Errors
///
/// Returns any error from writing to `out`.
pub fn write_level(out: &mut impl Write, catalog: &Catalog, level: Level) -> std::io::Result<()> {
    let view = LevelView::capture(catalog, level);
    let suffix = if view.editable { " (editable)" } else { "" };
    writeln!(out, "{level}{suffix}")?;
    let timing: Vec<String> = TimingField::ALL
        .iter()
        .map(|field| format!("{field}={}s", view.timing.get(*field)))
        .collect();
    writeln!(out, "  timing: {}", timing.join(" "))?;
    if view.cues.is_empty() {
        writeln!(out, "  (no cues)")?;
    }
    for (position, def) in view.cues.iter().enumerate() {
        let mark = if def.enabled { 'x' } else { ' ' };
        writeln!(out, "  {:>2}. [{mark}] {}", position + 1, def.label)?;
    }
    Ok(())
}
