//! Session controller.
//!
//! Front ends talk to the session through [`SessionController`]. It owns
//! the user's intent (selected level, running or not, muted) and applies
//! the restart rule: when a session is running, a level switch, a mute
//! change or an applied edit to the current level's pool or timing cancels
//! the pending timer and starts over from a fresh draw.
//!
//! Rejected edits are absorbed here. They are logged, counted and emitted
//! as events, and the method returns `false`.

use std::fmt::Display;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tokio::sync::watch;
use tracing::{debug, info};
use uuid::Uuid;

use crate::announcer::Announcer;
use crate::catalog::{Level, SharedCatalog, TimingField, timing};
use crate::error::TimingRejection;
use crate::observability::metrics;
use crate::observability::{Event, EventEmitter, SessionSummary, StopReason};
use crate::phase::{CueSequencer, Scheduler, SequencerOptions, SequencerSnapshot};

/// Session construction options.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// Initially selected level. Defaults to beginner.
    pub level: Option<Level>,
    /// Start with announcements muted.
    pub muted: bool,
    /// Seed for reproducible draws.
    pub seed: Option<u64>,
    /// Event sink.
    pub events: Option<Arc<EventEmitter>>,
}

/// Edit applied to the catalog, used to decide whether to restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Change {
    Level,
    Mute,
    Timing,
    CuePool,
}

impl Change {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Level => "level",
            Self::Mute => "mute",
            Self::Timing => "timing",
            Self::CuePool => "cue_pool",
        }
    }
}

/// Practice session: the sequencer plus the user's intent.
pub struct SessionController {
    id: Uuid,
    sequencer: CueSequencer,
    catalog: SharedCatalog,
    level: Level,
    active: bool,
    muted: bool,
    events: Option<Arc<EventEmitter>>,
    started_at: Instant,
    banked_cycles: u64,
    restarts: u64,
    rejected_edits: u64,
}

impl SessionController {
    /// Creates an idle session over `catalog`.
    ///
    /// Emits `SessionStarted`.
    #[must_use]
    pub fn new(
        catalog: SharedCatalog,
        scheduler: Arc<dyn Scheduler>,
        announcer: Arc<dyn Announcer>,
        options: SessionOptions,
    ) -> Self {
        let level = options.level.unwrap_or(Level::Beginner);
        let sequencer = CueSequencer::with_options(
            catalog.clone(),
            scheduler,
            announcer,
            SequencerOptions {
                initial_level: Some(level),
                muted: options.muted,
                seed: options.seed,
                events: options.events.clone(),
            },
        );
        let id = Uuid::new_v4();

        info!(session_id = %id, %level, muted = options.muted, "session created");
        if let Some(events) = &options.events {
            events.emit(Event::SessionStarted {
                timestamp: Utc::now(),
                session_id: id.to_string(),
                level,
                muted: options.muted,
            });
        }

        Self {
            id,
            sequencer,
            catalog,
            level,
            active: false,
            muted: options.muted,
            events: options.events,
            started_at: Instant::now(),
            banked_cycles: 0,
            restarts: 0,
            rejected_edits: 0,
        }
    }

    /// Session identifier.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Selected level.
    #[must_use]
    pub const fn level(&self) -> Level {
        self.level
    }

    /// Whether the user has the session running.
    ///
    /// Stays `true` while the sequencer idles on an empty pool, so a later
    /// edit that re-enables a cue resumes the loop.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Whether announcements are muted.
    #[must_use]
    pub const fn is_muted(&self) -> bool {
        self.muted
    }

    /// Catalog shared with the sequencer.
    #[must_use]
    pub const fn catalog(&self) -> &SharedCatalog {
        &self.catalog
    }

    /// Selects `level` and starts the loop.
    ///
    /// Returns whether a cue is now showing.
    pub fn start(&mut self, level: Level) -> bool {
        self.bank_cycles();
        self.level = level;
        self.active = true;
        metrics::set_session_active(true);
        self.sequencer.start(level)
    }

    /// Stops the loop. Idempotent.
    pub fn stop(&mut self) {
        self.active = false;
        metrics::set_session_active(false);
        self.sequencer.stop();
    }

    /// Sets the mute flag, restarting a running session when it changes.
    ///
    /// Returns whether the flag changed.
    pub fn set_muted(&mut self, muted: bool) -> bool {
        if self.muted == muted {
            return false;
        }
        self.muted = muted;
        self.sequencer.set_muted(muted);
        self.restart_if_active(Change::Mute);
        true
    }

    /// Switches the selected level, restarting a running session.
    ///
    /// Returns whether the level changed.
    pub fn select_level(&mut self, level: Level) -> bool {
        if self.level == level {
            return false;
        }
        debug!(from = %self.level, to = %level, "level selected");
        self.level = level;
        self.sequencer.set_level(level);
        self.restart_if_active(Change::Level);
        true
    }

    /// Stores a timing value, clamped to the field's range.
    ///
    /// Returns whether the stored value changed.
    pub fn edit_timing(&mut self, level: Level, field: TimingField, value: f64) -> bool {
        self.apply_timing(level, field, Ok(value))
    }

    /// Parses and stores a timing value typed by the user.
    ///
    /// Non-numeric input is rejected and the prior value retained.
    pub fn edit_timing_text(&mut self, level: Level, field: TimingField, raw: &str) -> bool {
        self.apply_timing(level, field, timing::parse_value(raw))
    }

    /// Flips the enabled flag of the cue at 0-based `index`.
    ///
    /// Returns whether the edit applied.
    pub fn toggle_cue(&mut self, level: Level, index: usize) -> bool {
        let result = self.catalog.write().pool.toggle(level, index);
        match result {
            Ok(enabled) => {
                info!(%level, index, enabled, "cue toggled");
                self.after_pool_edit(level);
                true
            }
            Err(rejection) => self.reject("toggle_cue", rejection),
        }
    }

    /// Appends an enabled custom cue.
    ///
    /// Returns whether the edit applied.
    pub fn add_custom_cue(&mut self, level: Level, label: &str) -> bool {
        let result = self.catalog.write().pool.add_custom(level, label);
        match result {
            Ok(index) => {
                info!(%level, index, label = label.trim(), "custom cue added");
                self.after_pool_edit(level);
                true
            }
            Err(rejection) => self.reject("add_custom_cue", rejection),
        }
    }

    /// Returns the sequencer's observable state.
    #[must_use]
    pub fn snapshot(&self) -> SequencerSnapshot {
        self.sequencer.snapshot()
    }

    /// Subscribes to observable state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SequencerSnapshot> {
        self.sequencer.subscribe()
    }

    /// Returns whether the sequencer has a continuation pending.
    #[must_use]
    pub fn has_pending_timer(&self) -> bool {
        self.sequencer.has_pending_timer()
    }

    /// Counters accumulated so far.
    #[must_use]
    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            duration_ms: u64::try_from(self.started_at.elapsed().as_millis()).unwrap_or(u64::MAX),
            shot_cycles: self.banked_cycles + self.sequencer.snapshot().cycle,
            restarts: self.restarts,
            rejected_edits: self.rejected_edits,
        }
    }

    /// Ends the session: stops the loop and cuts any in-flight output.
    ///
    /// Emits `SessionStopped` and returns the final counters.
    pub fn shutdown(&mut self, reason: StopReason) -> SessionSummary {
        self.stop();
        let summary = self.summary();
        info!(
            session_id = %self.id,
            %reason,
            shot_cycles = summary.shot_cycles,
            restarts = summary.restarts,
            "session ended"
        );
        if let Some(events) = &self.events {
            events.emit(Event::SessionStopped {
                timestamp: Utc::now(),
                reason,
                summary: summary.clone(),
            });
        }
        summary
    }

    fn apply_timing(
        &mut self,
        level: Level,
        field: TimingField,
        value: Result<f64, TimingRejection>,
    ) -> bool {
        let result = {
            let mut catalog = self.catalog.write();
            let before = catalog.timings.get(level).get(field);
            value
                .and_then(|v| catalog.timings.set(level, field, v))
                .map(|stored| (before, stored))
        };
        match result {
            Ok((before, stored)) if (before - stored).abs() < f64::EPSILON => {
                debug!(%level, %field, stored, "timing unchanged");
                false
            }
            Ok((before, stored)) => {
                info!(%level, %field, before, stored, "timing updated");
                if level == self.level {
                    self.restart_if_active(Change::Timing);
                }
                true
            }
            Err(rejection) => self.reject("edit_timing", rejection),
        }
    }

    fn after_pool_edit(&mut self, level: Level) {
        if level == self.level {
            self.restart_if_active(Change::CuePool);
        }
    }

    fn restart_if_active(&mut self, change: Change) {
        if !self.active {
            return;
        }
        self.bank_cycles();
        self.sequencer.stop();
        let running = self.sequencer.start(self.level);
        self.restarts += 1;
        metrics::record_restart(change.as_str());
        info!(level = %self.level, reason = change.as_str(), running, "session restarted");
        if let Some(events) = &self.events {
            events.emit(Event::SessionRestarted {
                timestamp: Utc::now(),
                level: self.level,
                reason: change.as_str().to_string(),
            });
        }
    }

    fn reject(&mut self, operation: &'static str, reason: impl Display) -> bool {
        self.rejected_edits += 1;
        info!(operation, %reason, "edit not applied");
        metrics::record_edit_rejected(operation);
        if let Some(events) = &self.events {
            events.emit(Event::EditRejected {
                timestamp: Utc::now(),
                operation: operation.to_string(),
                reason: reason.to_string(),
            });
        }
        false
    }

    /// Moves the sequencer's cycle count into the total before it resets.
    fn bank_cycles(&mut self) {
        self.banked_cycles += self.sequencer.snapshot().cycle;
    }
}

impl std::fmt::Debug for SessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("id", &self.id)
            .field("level", &self.level)
            .field("active", &self.active)
            .field("muted", &self.muted)
            .finish_non_exhaustive()
    }
}
