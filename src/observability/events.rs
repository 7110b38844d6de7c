//! Structured session event stream.
//!
//! Discrete, typed events emitted while a session runs. Events are written
//! as newline-delimited JSON with a monotonically increasing sequence number.

use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::catalog::Level;
use crate::phase::Phase;

// ---------------------------------------------------------------------------
// Event variants
// ---------------------------------------------------------------------------

/// A discrete event emitted during a practice session.
///
/// Serialized with a `"type"` tag so consumers can dispatch on the kind.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum Event {
    /// The session host is up and accepting commands.
    SessionStarted {
        /// When the session started.
        timestamp: DateTime<Utc>,
        /// Random session identifier.
        session_id: String,
        /// Selected level.
        level: Level,
        /// Whether announcements start muted.
        muted: bool,
    },

    /// The sequencer entered a phase.
    PhaseEntered {
        /// When the phase was entered.
        timestamp: DateTime<Utc>,
        /// Active level.
        level: Level,
        /// Phase entered.
        phase: Phase,
        /// Cue text shown for the phase.
        cue: String,
        /// Shot draws since the last start.
        cycle: u64,
        /// Whether the cue was passed to the announcer.
        announced: bool,
    },

    /// A draw found no enabled cues and the sequencer went idle.
    PoolExhausted {
        /// When the draw happened.
        timestamp: DateTime<Utc>,
        /// Level with the empty selectable set.
        level: Level,
    },

    /// The sequencer was restarted after a setting changed.
    SessionRestarted {
        /// When the restart happened.
        timestamp: DateTime<Utc>,
        /// Level started.
        level: Level,
        /// What changed (e.g. `"timing"`, `"level"`).
        reason: String,
    },

    /// An edit was rejected and the prior value retained.
    EditRejected {
        /// When the edit was attempted.
        timestamp: DateTime<Utc>,
        /// Edit operation (e.g. `"toggle_cue"`).
        operation: String,
        /// Human-readable rejection.
        reason: String,
    },

    /// The session ended.
    SessionStopped {
        /// When the session ended.
        timestamp: DateTime<Utc>,
        /// Why the session ended.
        reason: StopReason,
        /// Counters accumulated over the session.
        summary: SessionSummary,
    },
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The user typed `quit`.
    UserQuit,
    /// Standard input reached end of file.
    EndOfInput,
    /// The configured session length elapsed.
    DurationElapsed,
    /// SIGINT or Ctrl+C.
    Interrupted,
    /// SIGTERM.
    Terminated,
    /// Reading standard input failed.
    InputError,
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::UserQuit => "user quit",
            Self::EndOfInput => "end of input",
            Self::DurationElapsed => "duration elapsed",
            Self::Interrupted => "interrupted",
            Self::Terminated => "terminated",
            Self::InputError => "input error",
        };
        f.write_str(text)
    }
}

/// Counters reported when a session ends.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    /// Wall-clock session length in milliseconds.
    pub duration_ms: u64,
    /// Shot cues drawn across all starts.
    pub shot_cycles: u64,
    /// Automatic restarts after edits.
    pub restarts: u64,
    /// Edits that were not applied.
    pub rejected_edits: u64,
}

// ---------------------------------------------------------------------------
// Envelope (adds sequence number via serde flatten)
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct EventEnvelope {
    sequence: u64,
    #[serde(flatten)]
    event: Event,
}

// ---------------------------------------------------------------------------
// Emitter
// ---------------------------------------------------------------------------

/// Thread-safe, buffered JSONL event writer.
///
/// Serialization and I/O failures are dropped; a broken event sink never
/// interrupts a session.
pub struct EventEmitter {
    writer: Mutex<BufWriter<Box<dyn Write + Send>>>,
    sequence: AtomicU64,
}

impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("sequence", &self.sequence.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl EventEmitter {
    /// Creates an emitter that writes to the given writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(BufWriter::new(writer)),
            sequence: AtomicU64::new(0),
        }
    }

    /// Creates an emitter that writes to stderr.
    ///
    /// Stdout is reserved for the cue display.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(Box::new(std::io::stderr()))
    }

    /// Creates an emitter that writes to a file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be created.
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let file = std::fs::File::create(path)?;
        Ok(Self::new(Box::new(file)))
    }

    /// Opens the sink named on the command line: `-` is stderr.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be created.
    pub fn open(target: &Path) -> std::io::Result<Self> {
        if target.as_os_str() == "-" {
            Ok(Self::stderr())
        } else {
            Self::from_file(target)
        }
    }

    /// Emits an event as a single JSONL line.
    pub fn emit(&self, event: Event) {
        let seq = self.sequence.fetch_add(1, Ordering::SeqCst);
        let envelope = EventEnvelope {
            sequence: seq,
            event,
        };

        if let Ok(mut w) = self.writer.lock() {
            if let Ok(line) = serde_json::to_string(&envelope) {
                let _ = writeln!(w, "{line}");
                let _ = w.flush();
            }
        }
    }

    /// Returns the number of events emitted so far.
    #[must_use]
    pub fn event_count(&self) -> u64 {
        self.sequence.load(Ordering::Relaxed)
    }
}
