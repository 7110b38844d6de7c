//! `simulate`: run the sequencer on a virtual clock and print the timeline.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::announcer::SilentAnnouncer;
use crate::catalog::{Catalog, Level, SharedCatalog};
use crate::cli::args::{OutputFormat, SimulateArgs};
use crate::config::ConfigLoader;
use crate::error::ShadowCueError;
use crate::phase::{CueSequencer, ManualScheduler, Phase, SequencerOptions};

/// One phase entry on the virtual clock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineEntry {
    /// Milliseconds since start.
    pub at_ms: u64,
    /// Shot cycle the entry belongs to.
    pub cycle: u64,
    /// Phase entered.
    pub phase: Phase,
    /// Cue shown.
    pub cue: String,
}

/// Produces `cycles` full shot cycles for `level`.
///
/// Returns an empty timeline when the level has no enabled cues.
#[must_use]
pub fn timeline(
    catalog: Catalog,
    level: Level,
    cycles: u32,
    seed: Option<u64>,
) -> Vec<TimelineEntry> {
    let scheduler = Arc::new(ManualScheduler::new());
    let sequencer = CueSequencer::with_options(
        SharedCatalog::new(catalog),
        scheduler.clone(),
        Arc::new(SilentAnnouncer),
        SequencerOptions {
            initial_level: Some(level),
            seed,
            ..SequencerOptions::default()
        },
    );

    let mut entries = Vec::new();
    if !sequencer.start(level) {
        return entries;
    }

    loop {
        let snapshot = sequencer.snapshot();
        if snapshot.cycle > u64::from(cycles) || snapshot.phase == Phase::Idle {
            break;
        }
        entries.push(TimelineEntry {
            at_ms: millis(scheduler.now()),
            cycle: snapshot.cycle,
            phase: snapshot.phase,
            cue: snapshot.current_cue.unwrap_or_default(),
        });
        if !scheduler.run_next() {
            break;
        }
    }
    sequencer.stop();
    entries
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

/// Prints the simulated timeline.
///
/// # Errors
///
/// Returns an error if the session file cannot be loaded.
pub fn run(args: &SimulateArgs) -> Result<(), ShadowCueError> {
    let (catalog, file_level) = match &args.config {
        Some(path) => {
            let loaded = ConfigLoader::with_defaults().load(path)?;
            (loaded.catalog, loaded.config.level)
        }
        None => (Catalog::default(), None),
    };
    let level = args.level.or(file_level).unwrap_or(Level::Beginner);
    let entries = timeline(catalog, level, args.cycles, args.seed);

    match args.format {
        OutputFormat::Human => {
            if entries.is_empty() {
                println!("{level}: no enabled cues");
            }
            for entry in &entries {
                #[allow(clippy::cast_precision_loss)]
                let secs = entry.at_ms as f64 / 1000.0;
                println!(
                    "{secs:>8.3}s  #{:<3} {:<16} {}",
                    entry.cycle, entry.phase, entry.cue
                );
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
    }
    Ok(())
}
