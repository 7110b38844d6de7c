//! Cue announcers.
//!
//! The sequencer renders each cue through an injected [`Announcer`]. Visual
//! display is driven from the sequencer's observable snapshot instead, so
//! muting or losing the speech backend never hides a cue.

pub mod speech;

use std::sync::{Mutex, PoisonError};

pub use speech::SpeechAnnouncer;

/// Renders cue text for the user.
///
/// Both methods are best-effort and must not block on output completion.
pub trait Announcer: Send + Sync {
    /// Starts rendering `text`.
    fn announce(&self, text: &str);

    /// Stops any in-flight announcement. Safe to call when idle.
    fn cancel_outstanding(&self);
}

/// Announcer that produces no output.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentAnnouncer;

impl Announcer for SilentAnnouncer {
    fn announce(&self, _text: &str) {}

    fn cancel_outstanding(&self) {}
}

/// What a [`RecordingAnnouncer`] was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Announcement {
    /// `announce` was called with this text.
    Spoken(String),
    /// `cancel_outstanding` was called.
    Cancelled,
}

/// Announcer that records every call, in order.
///
/// Lets tests observe what would have been spoken.
#[derive(Debug, Default)]
pub struct RecordingAnnouncer {
    log: Mutex<Vec<Announcement>>,
}

impl RecordingAnnouncer {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every recorded call.
    #[must_use]
    pub fn calls(&self) -> Vec<Announcement> {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns only the announced texts.
    #[must_use]
    pub fn spoken(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Announcement::Spoken(text) => Some(text),
                Announcement::Cancelled => None,
            })
            .collect()
    }

    /// Removes and returns every recorded call.
    pub fn take(&self) -> Vec<Announcement> {
        std::mem::take(&mut *self.log.lock().unwrap_or_else(PoisonError::into_inner))
    }

    fn push(&self, call: Announcement) {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }
}

impl Announcer for RecordingAnnouncer {
    fn announce(&self, text: &str) {
        self.push(Announcement::Spoken(text.to_string()));
    }

    fn cancel_outstanding(&self) {
        self.push(Announcement::Cancelled);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorder_keeps_call_order() {
        let recorder = RecordingAnnouncer::new();
        recorder.announce("Forehand");
        recorder.cancel_outstanding();
        recorder.announce("Hit!");

        assert_eq!(
            recorder.calls(),
            vec![
                Announcement::Spoken("Forehand".into()),
                Announcement::Cancelled,
                Announcement::Spoken("Hit!".into()),
            ]
        );
        assert_eq!(recorder.spoken(), vec!["Forehand", "Hit!"]);
    }

    #[test]
    fn take_drains_log() {
        let recorder = RecordingAnnouncer::new();
        recorder.announce("Volley");
        assert_eq!(recorder.take().len(), 1);
        assert!(recorder.calls().is_empty());
    }

    #[test]
    fn silent_announcer_is_callable_when_idle() {
        let silent = SilentAnnouncer;
        silent.cancel_outstanding();
        silent.announce("Overhead");
    }
}
