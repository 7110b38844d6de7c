//! `shadowcue` - timed cue sequencer for shadow tennis practice
//!
//! A session loops through announcing a shot, calling the hit and calling
//! the recovery, with per-level timing and cue pools that can be edited
//! while it runs.

pub mod announcer;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod observability;
pub mod phase;
pub mod session;
