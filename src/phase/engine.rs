//! Cue sequencer: the phase state machine.
//!
//! The sequencer owns a single pending-continuation slot. Every entry point
//! cancels the slot before scheduling again, and every continuation checks
//! that its handle is still the one in the slot before touching state, so a
//! continuation that lost a race with `stop` does nothing.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::watch;
use tracing::{debug, info, trace, warn};

use crate::announcer::Announcer;
use crate::catalog::{Level, SharedCatalog, TimingField, TimingProfile};
use crate::observability::metrics;
use crate::observability::{Event, EventEmitter};

use super::scheduler::{Scheduler, TimerHandle};
use super::state::{HIT_CUE, Phase, RECOVER_CUE, SequencerSnapshot};

/// Construction options for [`CueSequencer`].
#[derive(Debug, Clone, Default)]
pub struct SequencerOptions {
    /// Level reported before the first start.
    pub initial_level: Option<Level>,
    /// Whether announcements start suppressed.
    pub muted: bool,
    /// Seed for reproducible draws; entropy from the OS when `None`.
    pub seed: Option<u64>,
    /// Event sink for phase entries.
    pub events: Option<Arc<EventEmitter>>,
}

/// Mutable session state. Guarded by one mutex.
struct Core {
    level: Level,
    phase: Phase,
    current_cue: Option<String>,
    muted: bool,
    cycle: u64,
    profile: TimingProfile,
    active_timer: Option<TimerHandle>,
    rng: StdRng,
}

impl Core {
    fn snapshot(&self) -> SequencerSnapshot {
        SequencerSnapshot {
            level: self.level,
            phase: self.phase,
            current_cue: self.current_cue.clone(),
            muted: self.muted,
            cycle: self.cycle,
        }
    }
}

struct Shared {
    core: Mutex<Core>,
    catalog: SharedCatalog,
    scheduler: Arc<dyn Scheduler>,
    announcer: Arc<dyn Announcer>,
    events: Option<Arc<EventEmitter>>,
    snapshot_tx: watch::Sender<SequencerSnapshot>,
}

/// Phase state machine issuing timed cues.
///
/// Dropping the sequencer cancels its pending timer and any in-flight
/// announcement.
pub struct CueSequencer {
    shared: Arc<Shared>,
}

impl CueSequencer {
    /// Creates an idle sequencer with default options.
    #[must_use]
    pub fn new(
        catalog: SharedCatalog,
        scheduler: Arc<dyn Scheduler>,
        announcer: Arc<dyn Announcer>,
    ) -> Self {
        Self::with_options(catalog, scheduler, announcer, SequencerOptions::default())
    }

    /// Creates an idle sequencer.
    #[must_use]
    pub fn with_options(
        catalog: SharedCatalog,
        scheduler: Arc<dyn Scheduler>,
        announcer: Arc<dyn Announcer>,
        options: SequencerOptions,
    ) -> Self {
        let level = options.initial_level.unwrap_or(Level::Beginner);
        let profile = catalog.read().timings.get(level);
        let rng = options
            .seed
            .map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
        let core = Core {
            level,
            phase: Phase::Idle,
            current_cue: None,
            muted: options.muted,
            cycle: 0,
            profile,
            active_timer: None,
            rng,
        };
        let (snapshot_tx, _) = watch::channel(core.snapshot());

        Self {
            shared: Arc::new(Shared {
                core: Mutex::new(core),
                catalog,
                scheduler,
                announcer,
                events: options.events,
                snapshot_tx,
            }),
        }
    }

    /// Starts the cue loop for `level` from a fresh draw.
    ///
    /// Cancels any pending timer first. The timing profile is read from the
    /// catalog now; pool contents are read at every draw.
    ///
    /// Returns `false` when the level has no enabled cues; the sequencer is
    /// then idle with nothing scheduled and nothing announced.
    pub fn start(&self, level: Level) -> bool {
        let shared = &self.shared;
        let mut core = shared.lock();
        shared.cancel_pending(&mut core);

        core.level = level;
        core.profile = shared.catalog.read().timings.get(level);
        core.cycle = 0;
        info!(
            %level,
            cue_delay = core.profile.cue_delay,
            hit_delay = core.profile.hit_delay,
            recovering_delay = core.profile.recovering_delay,
            "starting cue sequence"
        );

        shared.draw_shot(&mut core)
    }

    /// Cancels the pending timer, clears the cue and returns to idle.
    ///
    /// Idempotent. Always asks the announcer to cancel in-flight output.
    pub fn stop(&self) {
        let shared = &self.shared;
        let mut core = shared.lock();
        if core.phase != Phase::Idle || core.active_timer.is_some() {
            info!(level = %core.level, cycle = core.cycle, "stopping cue sequence");
        }
        shared.reset(&mut core);
    }

    /// Sets whether announcements are suppressed.
    ///
    /// Muting also cuts any in-flight announcement. Observable state keeps
    /// updating either way.
    pub fn set_muted(&self, muted: bool) {
        let shared = &self.shared;
        let mut core = shared.lock();
        if core.muted == muted {
            return;
        }
        core.muted = muted;
        debug!(muted, "mute changed");
        if muted {
            shared.announcer.cancel_outstanding();
        }
        shared.publish(&core);
    }

    /// Sets the level reported while idle.
    ///
    /// A running loop keeps its level until the next [`start`](Self::start).
    pub fn set_level(&self, level: Level) {
        let shared = &self.shared;
        let mut core = shared.lock();
        if core.phase != Phase::Idle || core.level == level {
            return;
        }
        core.level = level;
        shared.publish(&core);
    }

    /// Returns the current observable state.
    #[must_use]
    pub fn snapshot(&self) -> SequencerSnapshot {
        self.shared.lock().snapshot()
    }

    /// Subscribes to observable state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SequencerSnapshot> {
        self.shared.snapshot_tx.subscribe()
    }

    /// Returns whether a continuation is pending.
    #[must_use]
    pub fn has_pending_timer(&self) -> bool {
        self.shared.lock().active_timer.is_some()
    }

    /// Catalog the sequencer draws from.
    #[must_use]
    pub fn catalog(&self) -> &SharedCatalog {
        &self.shared.catalog
    }
}

impl Drop for CueSequencer {
    fn drop(&mut self) {
        let mut core = self.shared.lock();
        if core.active_timer.is_some() {
            debug!("sequencer dropped with pending timer; cancelling");
        }
        self.shared.reset(&mut core);
    }
}

impl std::fmt::Debug for CueSequencer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let core = self.shared.lock();
        f.debug_struct("CueSequencer")
            .field("level", &core.level)
            .field("phase", &core.phase)
            .field("active_timer", &core.active_timer)
            .finish_non_exhaustive()
    }
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Core> {
        self.core.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn cancel_pending(&self, core: &mut Core) {
        if let Some(handle) = core.active_timer.take() {
            let cancelled = self.scheduler.cancel(handle);
            trace!(%handle, cancelled, "cancelled pending timer");
        }
    }

    fn reset(&self, core: &mut Core) {
        self.cancel_pending(core);
        core.phase = Phase::Idle;
        core.current_cue = None;
        self.announcer.cancel_outstanding();
        self.publish(core);
    }

    fn publish(&self, core: &Core) {
        self.snapshot_tx.send_replace(core.snapshot());
    }

    /// Draws a shot label and enters `AnnouncingShot`, or idles on an
    /// empty selectable set.
    fn draw_shot(self: &Arc<Self>, core: &mut Core) -> bool {
        let drawn = {
            let catalog = self.catalog.read();
            let labels = catalog.pool.selectable_labels(core.level);
            if labels.is_empty() {
                None
            } else {
                let index = core.rng.random_range(0..labels.len());
                Some(labels[index].to_string())
            }
        };

        let Some(label) = drawn else {
            warn!(level = %core.level, "no enabled cues; sequencer idle");
            metrics::record_empty_pool(core.level);
            if let Some(events) = &self.events {
                events.emit(Event::PoolExhausted {
                    timestamp: Utc::now(),
                    level: core.level,
                });
            }
            core.phase = Phase::Idle;
            core.current_cue = None;
            self.publish(core);
            return false;
        };

        core.cycle += 1;
        self.enter(core, Phase::AnnouncingShot, label);
        true
    }

    /// Enters `phase` showing `text`, announces it and schedules the
    /// successor.
    fn enter(self: &Arc<Self>, core: &mut Core, phase: Phase, text: String) {
        core.phase = phase;
        let announced = !core.muted;
        if announced {
            self.announcer.announce(&text);
        }
        debug!(level = %core.level, %phase, cue = %text, announced, "phase entered");
        metrics::record_phase(phase, announced);
        if let Some(events) = &self.events {
            events.emit(Event::PhaseEntered {
                timestamp: Utc::now(),
                level: core.level,
                phase,
                cue: text.clone(),
                cycle: core.cycle,
                announced,
            });
        }
        core.current_cue = Some(text);
        self.publish(core);
        self.schedule_successor(core);
    }

    fn schedule_successor(self: &Arc<Self>, core: &mut Core) {
        let field = match core.phase {
            Phase::AnnouncingShot => TimingField::CueDelay,
            Phase::AwaitingHit => TimingField::HitDelay,
            Phase::Recovering => TimingField::RecoveringDelay,
            Phase::Idle => return,
        };
        let delay = core.profile.delay(field);
        let weak = Arc::downgrade(self);
        let handle = self.scheduler.schedule(
            delay,
            Box::new(move |fired| {
                if let Some(shared) = weak.upgrade() {
                    shared.on_timer(fired);
                }
            }),
        );
        trace!(%handle, ?delay, "scheduled continuation");
        core.active_timer = Some(handle);
    }

    fn on_timer(self: &Arc<Self>, fired: TimerHandle) {
        let mut core = self.lock();
        if core.active_timer != Some(fired) {
            trace!(handle = %fired, "stale continuation ignored");
            return;
        }
        core.active_timer = None;

        match core.phase.successor() {
            Some(Phase::AwaitingHit) => {
                self.enter(&mut core, Phase::AwaitingHit, HIT_CUE.to_string());
            }
            Some(Phase::Recovering) => {
                self.enter(&mut core, Phase::Recovering, RECOVER_CUE.to_string());
            }
            Some(Phase::AnnouncingShot) => {
                self.draw_shot(&mut core);
            }
            Some(Phase::Idle) | None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::announcer::{Announcement, RecordingAnnouncer};
    use crate::catalog::Catalog;
    use crate::phase::scheduler::{ManualScheduler, TokioScheduler};
    use proptest::prelude::*;

    struct Rig {
        catalog: SharedCatalog,
        scheduler: Arc<ManualScheduler>,
        announcer: Arc<RecordingAnnouncer>,
        sequencer: CueSequencer,
    }

    fn beginner_scenario_catalog() -> SharedCatalog {
        let mut catalog = Catalog::default();
        catalog.pool.replace_level(
            Level::Beginner,
            vec![
                crate::catalog::CueDefinition::new("Prepare forehand"),
                crate::catalog::CueDefinition::new("Prepare backhand"),
            ],
        );
        catalog.timings.set(Level::Beginner, TimingField::CueDelay, 3.0).unwrap();
        catalog.timings.set(Level::Beginner, TimingField::HitDelay, 1.5).unwrap();
        catalog
            .timings
            .set(Level::Beginner, TimingField::RecoveringDelay, 2.0)
            .unwrap();
        SharedCatalog::new(catalog)
    }

    fn rig(catalog: SharedCatalog) -> Rig {
        let scheduler = Arc::new(ManualScheduler::new());
        let announcer = Arc::new(RecordingAnnouncer::new());
        let sequencer = CueSequencer::with_options(
            catalog.clone(),
            scheduler.clone(),
            announcer.clone(),
            SequencerOptions {
                seed: Some(7),
                ..SequencerOptions::default()
            },
        );
        Rig {
            catalog,
            scheduler,
            announcer,
            sequencer,
        }
    }

    fn secs(s: f64) -> Duration {
        Duration::from_secs_f64(s)
    }

    const SCENARIO_CUES: [&str; 2] = ["Prepare forehand", "Prepare backhand"];

    #[test]
    fn new_sequencer_is_idle() {
        let rig = rig(SharedCatalog::default());
        let snapshot = rig.sequencer.snapshot();
        assert_eq!(snapshot.phase, Phase::Idle);
        assert_eq!(snapshot.current_cue, None);
        assert!(!rig.sequencer.has_pending_timer());
        assert_eq!(rig.scheduler.outstanding(), 0);
    }

    #[test]
    fn beginner_scenario_timeline() {
        let rig = rig(beginner_scenario_catalog());

        assert!(rig.sequencer.start(Level::Beginner));
        let snap = rig.sequencer.snapshot();
        assert_eq!(snap.phase, Phase::AnnouncingShot);
        let first = snap.current_cue.unwrap();
        assert!(SCENARIO_CUES.contains(&first.as_str()));

        rig.scheduler.advance(Duration::from_millis(2_999));
        assert_eq!(rig.sequencer.snapshot().phase, Phase::AnnouncingShot);

        rig.scheduler.advance(Duration::from_millis(1));
        let snap = rig.sequencer.snapshot();
        assert_eq!(snap.phase, Phase::AwaitingHit);
        assert_eq!(snap.current_cue.as_deref(), Some(HIT_CUE));

        rig.scheduler.advance(secs(1.5));
        let snap = rig.sequencer.snapshot();
        assert_eq!(snap.phase, Phase::Recovering);
        assert_eq!(snap.current_cue.as_deref(), Some(RECOVER_CUE));

        rig.scheduler.advance(secs(2.0));
        let snap = rig.sequencer.snapshot();
        assert_eq!(snap.phase, Phase::AnnouncingShot);
        assert_eq!(snap.cycle, 2);
        assert!(SCENARIO_CUES.contains(&snap.current_cue.unwrap().as_str()));

        let spoken = rig.announcer.spoken();
        assert_eq!(spoken.len(), 4);
        assert_eq!(spoken[0], first);
        assert_eq!(spoken[1], HIT_CUE);
        assert_eq!(spoken[2], RECOVER_CUE);
        assert_eq!(rig.scheduler.outstanding(), 1);
    }

    #[test]
    fn stop_cancels_timer_and_announcer() {
        let rig = rig(SharedCatalog::default());
        rig.sequencer.start(Level::Pro);
        assert_eq!(rig.scheduler.outstanding(), 1);

        rig.sequencer.stop();
        let snap = rig.sequencer.snapshot();
        assert_eq!(snap.phase, Phase::Idle);
        assert_eq!(snap.current_cue, None);
        assert_eq!(rig.scheduler.outstanding(), 0);
        assert_eq!(rig.announcer.calls().last(), Some(&Announcement::Cancelled));

        rig.announcer.take();
        assert_eq!(rig.scheduler.advance(secs(60.0)), 0);
        assert!(rig.announcer.spoken().is_empty());
    }

    #[test]
    fn stop_on_idle_is_noop() {
        let rig = rig(SharedCatalog::default());
        rig.sequencer.stop();
        rig.sequencer.stop();
        assert_eq!(rig.sequencer.snapshot().phase, Phase::Idle);
        assert_eq!(rig.scheduler.outstanding(), 0);
        assert!(rig.announcer.spoken().is_empty());
    }

    #[test]
    fn start_while_running_replaces_timer() {
        let rig = rig(SharedCatalog::default());
        rig.sequencer.start(Level::Pro);
        rig.scheduler.advance(secs(0.5));
        rig.sequencer.start(Level::Beginner);
        rig.sequencer.start(Level::Beginner);

        assert_eq!(rig.scheduler.outstanding(), 1);
        assert_eq!(rig.sequencer.snapshot().level, Level::Beginner);
        assert_eq!(rig.sequencer.snapshot().phase, Phase::AnnouncingShot);
    }

    #[test]
    fn empty_pool_start_stays_idle_without_announcing() {
        let rig = rig(SharedCatalog::default());
        {
            let mut catalog = rig.catalog.write();
            let len = catalog.pool.list_level(Level::Custom).len();
            for index in 0..len {
                catalog.pool.toggle(Level::Custom, index).unwrap();
            }
        }

        assert!(!rig.sequencer.start(Level::Custom));
        let snap = rig.sequencer.snapshot();
        assert_eq!(snap.phase, Phase::Idle);
        assert_eq!(snap.level, Level::Custom);
        assert_eq!(rig.scheduler.outstanding(), 0);
        assert!(rig.announcer.spoken().is_empty());
    }

    #[test]
    fn pool_emptied_mid_session_idles_at_next_draw() {
        let rig = rig(SharedCatalog::default());
        {
            let mut catalog = rig.catalog.write();
            let len = catalog.pool.list_level(Level::Custom).len();
            for index in 1..len {
                catalog.pool.toggle(Level::Custom, index).unwrap();
            }
        }
        assert!(rig.sequencer.start(Level::Custom));
        assert_eq!(
            rig.sequencer.snapshot().current_cue.as_deref(),
            Some("Forehand")
        );

        // Disable the only enabled cue while the loop is running.
        rig.catalog.write().pool.toggle(Level::Custom, 0).unwrap();

        let profile = rig.catalog.read().timings.get(Level::Custom);
        let cycle = profile.cue_delay + profile.hit_delay + profile.recovering_delay;
        rig.scheduler.advance(secs(cycle));

        let snap = rig.sequencer.snapshot();
        assert_eq!(snap.phase, Phase::Idle);
        assert_eq!(rig.scheduler.outstanding(), 0);
        assert_eq!(rig.announcer.spoken(), vec!["Forehand", HIT_CUE, RECOVER_CUE]);
    }

    #[test]
    fn draw_reflects_pool_edits_without_restart() {
        let rig = rig(SharedCatalog::default());
        {
            let mut catalog = rig.catalog.write();
            let len = catalog.pool.list_level(Level::Custom).len();
            for index in 1..len {
                catalog.pool.toggle(Level::Custom, index).unwrap();
            }
        }
        rig.sequencer.start(Level::Custom);
        {
            let mut catalog = rig.catalog.write();
            catalog.pool.toggle(Level::Custom, 0).unwrap();
            catalog.pool.add_custom(Level::Custom, "Drop shot").unwrap();
        }
        let profile = rig.catalog.read().timings.get(Level::Custom);
        rig.scheduler
            .advance(secs(profile.cue_delay + profile.hit_delay + profile.recovering_delay));
        assert_eq!(
            rig.sequencer.snapshot().current_cue.as_deref(),
            Some("Drop shot")
        );
    }

    #[test]
    fn timing_is_captured_at_start() {
        let rig = rig(beginner_scenario_catalog());
        rig.sequencer.start(Level::Beginner);
        rig.catalog
            .write()
            .timings
            .set(Level::Beginner, TimingField::CueDelay, 9.0)
            .unwrap();

        rig.scheduler.advance(secs(3.0));
        assert_eq!(rig.sequencer.snapshot().phase, Phase::AwaitingHit);
    }

    #[test]
    fn muted_updates_state_without_announcing() {
        let rig = rig(beginner_scenario_catalog());
        rig.sequencer.start(Level::Beginner);
        rig.sequencer.set_muted(true);
        rig.announcer.take();

        rig.scheduler.advance(secs(3.0));
        let snap = rig.sequencer.snapshot();
        assert!(snap.muted);
        assert_eq!(snap.phase, Phase::AwaitingHit);
        rig.scheduler.advance(secs(1.5));
        assert_eq!(rig.sequencer.snapshot().phase, Phase::Recovering);
        assert!(rig.announcer.spoken().is_empty());
    }

    #[test]
    fn muting_cuts_in_flight_output() {
        let rig = rig(SharedCatalog::default());
        rig.sequencer.start(Level::Pro);
        rig.announcer.take();
        rig.sequencer.set_muted(true);
        assert_eq!(rig.announcer.calls(), vec![Announcement::Cancelled]);
        // Same value again is a no-op.
        rig.sequencer.set_muted(true);
        assert_eq!(rig.announcer.calls().len(), 1);
    }

    #[test]
    fn drop_cancels_pending_timer() {
        let rig = rig(SharedCatalog::default());
        rig.sequencer.start(Level::Intermediate);
        assert_eq!(rig.scheduler.outstanding(), 1);

        let Rig {
            scheduler,
            announcer,
            sequencer,
            ..
        } = rig;
        drop(sequencer);
        assert_eq!(scheduler.outstanding(), 0);
        announcer.take();
        assert_eq!(scheduler.advance(secs(30.0)), 0);
        assert!(announcer.spoken().is_empty());
    }

    #[test]
    fn subscribers_see_phase_changes() {
        let rig = rig(beginner_scenario_catalog());
        let mut rx = rig.sequencer.subscribe();
        rig.sequencer.start(Level::Beginner);
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().phase, Phase::AnnouncingShot);

        rig.scheduler.advance(secs(3.0));
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().phase, Phase::AwaitingHit);
    }

    #[test]
    fn seeded_sequencers_draw_identically() {
        let draws = |seed| {
            let scheduler = Arc::new(ManualScheduler::new());
            let sequencer = CueSequencer::with_options(
                SharedCatalog::default(),
                scheduler.clone(),
                Arc::new(RecordingAnnouncer::new()),
                SequencerOptions {
                    seed: Some(seed),
                    ..SequencerOptions::default()
                },
            );
            sequencer.start(Level::Pro);
            let mut labels = Vec::new();
            for _ in 0..20 {
                if sequencer.snapshot().phase == Phase::AnnouncingShot {
                    labels.push(sequencer.snapshot().current_cue.unwrap());
                }
                scheduler.run_next();
            }
            labels
        };
        assert_eq!(draws(42), draws(42));
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_scheduler_runs_the_loop() {
        let catalog = beginner_scenario_catalog();
        let scheduler = Arc::new(TokioScheduler::current());
        let announcer = Arc::new(RecordingAnnouncer::new());
        let sequencer = CueSequencer::new(catalog, scheduler.clone(), announcer.clone());

        sequencer.start(Level::Beginner);
        assert_eq!(sequencer.snapshot().phase, Phase::AnnouncingShot);

        tokio::time::advance(secs(3.0)).await;
        settle().await;
        assert_eq!(sequencer.snapshot().phase, Phase::AwaitingHit);

        tokio::time::advance(secs(1.5)).await;
        settle().await;
        assert_eq!(sequencer.snapshot().phase, Phase::Recovering);

        tokio::time::advance(secs(2.0)).await;
        settle().await;
        assert_eq!(sequencer.snapshot().phase, Phase::AnnouncingShot);
        assert_eq!(scheduler.outstanding(), 1);

        sequencer.stop();
        assert_eq!(scheduler.outstanding(), 0);
        let spoken_before = announcer.spoken().len();
        tokio::time::advance(secs(30.0)).await;
        settle().await;
        assert_eq!(announcer.spoken().len(), spoken_before);
    }

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[derive(Debug, Clone)]
    enum Op {
        Start(Level),
        Stop,
        Mute(bool),
        Advance(u16),
        ToggleCustom(usize),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            prop::sample::select(Level::ALL.to_vec()).prop_map(Op::Start),
            Just(Op::Stop),
            any::<bool>().prop_map(Op::Mute),
            (0u16..8000).prop_map(Op::Advance),
            (0usize..4).prop_map(Op::ToggleCustom),
        ]
    }

    proptest! {
        #[test]
        fn at_most_one_timer_outstanding(ops in prop::collection::vec(op(), 1..60)) {
            let rig = rig(SharedCatalog::default());
            for op in ops {
                match op {
                    Op::Start(level) => { rig.sequencer.start(level); }
                    Op::Stop => rig.sequencer.stop(),
                    Op::Mute(muted) => rig.sequencer.set_muted(muted),
                    Op::Advance(ms) => { rig.scheduler.advance(Duration::from_millis(u64::from(ms))); }
                    Op::ToggleCustom(index) => { let _ = rig.catalog.write().pool.toggle(Level::Custom, index); }
                }
                let outstanding = rig.scheduler.outstanding();
                prop_assert!(outstanding <= 1, "outstanding = {}", outstanding);
                let snap = rig.sequencer.snapshot();
                prop_assert_eq!(outstanding == 1, snap.phase != Phase::Idle);
                prop_assert_eq!(snap.current_cue.is_some(), snap.phase != Phase::Idle);
            }
        }
    }
}
