//! Phase engine.
//!
//! [`CueSequencer`] drives the repeating shot / hit / recover cycle over a
//! [`Scheduler`]; [`SequencerSnapshot`] is what front ends render.

pub mod engine;
pub mod scheduler;
pub mod state;

pub use engine::{CueSequencer, SequencerOptions};
pub use scheduler::{Continuation, ManualScheduler, Scheduler, TimerHandle, TokioScheduler};
pub use state::{HIT_CUE, Phase, RECOVER_CUE, SequencerSnapshot};
