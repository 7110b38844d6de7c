//! Session-level scenarios on a virtual clock.

use std::sync::Arc;
use std::time::Duration;

use tokio_test::{assert_pending, assert_ready_ok};

use shadowcue::announcer::{Announcement, RecordingAnnouncer};
use shadowcue::catalog::{Catalog, Level, SharedCatalog, TimingField};
use shadowcue::phase::{HIT_CUE, ManualScheduler, Phase, RECOVER_CUE};
use shadowcue::session::{SessionController, SessionOptions};

struct Rig {
    session: SessionController,
    scheduler: Arc<ManualScheduler>,
    announcer: Arc<RecordingAnnouncer>,
}

fn rig(level: Level) -> Rig {
    let scheduler = Arc::new(ManualScheduler::new());
    let announcer = Arc::new(RecordingAnnouncer::new());
    let session = SessionController::new(
        SharedCatalog::new(Catalog::default()),
        scheduler.clone(),
        announcer.clone(),
        SessionOptions {
            level: Some(level),
            seed: Some(42),
            ..SessionOptions::default()
        },
    );
    Rig {
        session,
        scheduler,
        announcer,
    }
}

fn secs(s: f64) -> Duration {
    Duration::from_secs_f64(s)
}

#[test]
fn custom_drill_with_live_timing_edit() {
    let mut rig = rig(Level::Custom);
    assert!(rig.session.start(Level::Custom));

    rig.scheduler.advance(secs(3.0));
    assert_eq!(rig.session.snapshot().phase, Phase::AwaitingHit);

    assert!(rig.session.edit_timing(Level::Custom, TimingField::HitDelay, 1.0));
    let snapshot = rig.session.snapshot();
    assert_eq!(snapshot.phase, Phase::AnnouncingShot);
    assert_eq!(snapshot.cycle, 1);
    assert_eq!(rig.session.summary().restarts, 1);

    rig.scheduler.advance(secs(3.0));
    assert_eq!(rig.session.snapshot().current_cue.as_deref(), Some(HIT_CUE));
    rig.scheduler.advance(secs(1.0));
    assert_eq!(
        rig.session.snapshot().current_cue.as_deref(),
        Some(RECOVER_CUE)
    );
    rig.scheduler.advance(secs(2.0));
    let snapshot = rig.session.snapshot();
    assert_eq!(snapshot.phase, Phase::AnnouncingShot);
    assert_eq!(snapshot.cycle, 2);

    let spoken = rig.announcer.spoken();
    assert_eq!(spoken.iter().filter(|s| *s == HIT_CUE).count(), 2);
    assert_eq!(spoken.iter().filter(|s| *s == RECOVER_CUE).count(), 1);
}

#[test]
fn editing_another_level_leaves_running_timer_alone() {
    let mut rig = rig(Level::Beginner);
    rig.session.start(Level::Beginner);
    rig.scheduler.advance(secs(1.0));
    let deadline = rig.scheduler.next_deadline();

    assert!(rig.session.edit_timing(Level::Pro, TimingField::CueDelay, 4.0));
    assert_eq!(rig.scheduler.next_deadline(), deadline);
    assert_eq!(rig.session.summary().restarts, 0);

    assert!(rig.session.toggle_cue(Level::Custom, 0));
    assert_eq!(rig.scheduler.next_deadline(), deadline);
    assert_eq!(rig.session.snapshot().phase, Phase::AnnouncingShot);
}

#[test]
fn emptied_pool_idles_until_a_cue_is_added() {
    let mut rig = rig(Level::Custom);
    rig.session.start(Level::Custom);

    for index in 0..3 {
        assert!(rig.session.toggle_cue(Level::Custom, index));
    }
    assert_eq!(rig.session.snapshot().phase, Phase::Idle);
    assert!(!rig.session.has_pending_timer());
    assert!(rig.session.is_active());

    assert!(rig.session.add_custom_cue(Level::Custom, "Lob"));
    let snapshot = rig.session.snapshot();
    assert_eq!(snapshot.phase, Phase::AnnouncingShot);
    assert_eq!(snapshot.current_cue.as_deref(), Some("Lob"));
    assert!(rig.session.has_pending_timer());
}

#[test]
fn muting_cancels_speech_but_not_cues() {
    let mut rig = rig(Level::Pro);
    rig.session.start(Level::Pro);
    rig.announcer.take();

    rig.session.set_muted(true);
    assert_eq!(rig.announcer.calls().first(), Some(&Announcement::Cancelled));
    assert!(rig.announcer.spoken().is_empty());

    rig.scheduler.advance(secs(1.5));
    let snapshot = rig.session.snapshot();
    assert!(snapshot.muted);
    assert_eq!(snapshot.current_cue.as_deref(), Some(HIT_CUE));
    assert!(rig.announcer.spoken().is_empty());
}

#[test]
fn fixed_levels_refuse_cue_edits() {
    let mut rig = rig(Level::Beginner);
    rig.session.start(Level::Beginner);
    let deadline = rig.scheduler.next_deadline();

    assert!(!rig.session.toggle_cue(Level::Beginner, 0));
    assert!(!rig.session.add_custom_cue(Level::Pro, "Lob"));
    assert_eq!(rig.scheduler.next_deadline(), deadline);
    assert_eq!(rig.session.summary().rejected_edits, 2);
}

#[test]
fn subscribers_are_woken_on_start() {
    let mut rig = rig(Level::Intermediate);
    let mut rx = rig.session.subscribe();
    {
        let mut changed = tokio_test::task::spawn(rx.changed());
        assert_pending!(changed.poll());

        rig.session.start(Level::Intermediate);
        assert!(changed.is_woken());
        assert_ready_ok!(changed.poll());
    }
    assert_eq!(rx.borrow_and_update().phase, Phase::AnnouncingShot);
}
