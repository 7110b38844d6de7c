//! Speech output through an external text-to-speech program.
//!
//! Each announcement spawns the configured command with the cue text as its
//! final argument. A new announcement pre-empts the previous utterance. If
//! the program cannot be spawned the announcer degrades to silence and the
//! session continues with visual cues only.

use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use tokio::process::{Child, Command};
use tracing::{debug, warn};

use crate::error::ControlError;

use super::Announcer;

/// Program used when no speech command is configured.
pub const DEFAULT_SPEECH_COMMAND: &str = "espeak";

/// Announcer that speaks through an external program.
///
/// Must be used from within a tokio runtime.
#[derive(Debug)]
pub struct SpeechAnnouncer {
    program: String,
    args: Vec<String>,
    in_flight: Mutex<Option<Child>>,
    unavailable: AtomicBool,
}

impl SpeechAnnouncer {
    /// Creates an announcer running `program` with leading `args`.
    #[must_use]
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            in_flight: Mutex::new(None),
            unavailable: AtomicBool::new(false),
        }
    }

    /// Parses a command line such as `"espeak -s 160"` using shell quoting.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError::Tokenize`] on unbalanced quotes and
    /// [`ControlError::InvalidArgument`] when the command is empty.
    pub fn from_command_line(command: &str) -> Result<Self, ControlError> {
        let mut words = shlex::split(command).ok_or(ControlError::Tokenize)?;
        if words.is_empty() {
            return Err(ControlError::InvalidArgument(
                "speech command is empty".to_string(),
            ));
        }
        let program = words.remove(0);
        Ok(Self::new(program, words))
    }

    /// Returns the program name.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Returns whether spawning failed and output is disabled.
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        self.unavailable.load(Ordering::SeqCst)
    }

    fn stop_in_flight(slot: &mut Option<Child>) {
        if let Some(mut child) = slot.take() {
            if let Err(e) = child.start_kill() {
                debug!(error = %e, "speech process already exited");
            }
        }
    }
}

impl Default for SpeechAnnouncer {
    fn default() -> Self {
        Self::new(DEFAULT_SPEECH_COMMAND, Vec::new())
    }
}

impl Announcer for SpeechAnnouncer {
    fn announce(&self, text: &str) {
        if self.is_unavailable() {
            return;
        }

        let mut slot = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Self::stop_in_flight(&mut slot);

        let spawned = Command::new(&self.program)
            .args(&self.args)
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn();

        match spawned {
            Ok(child) => {
                debug!(program = %self.program, text, "speaking cue");
                *slot = Some(child);
            }
            Err(e) => {
                if !self.unavailable.swap(true, Ordering::SeqCst) {
                    warn!(
                        program = %self.program,
                        error = %e,
                        "speech command unavailable; continuing with visual cues only"
                    );
                }
            }
        }
    }

    fn cancel_outstanding(&self) {
        let mut slot = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Self::stop_in_flight(&mut slot);
    }
}
