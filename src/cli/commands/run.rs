//! `run`: interactive practice session.
//!
//! Cues are printed to stdout as they change; commands are read from stdin
//! one per line. Logs, events and metrics go to stderr.

use std::io::Write;
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::WatchStream;
use tracing::{info, warn};

use crate::announcer::{Announcer, SilentAnnouncer, SpeechAnnouncer};
use crate::catalog::{Catalog, Level, SharedCatalog};
use crate::cli::args::RunArgs;
use crate::cli::control::{self, Flow};
use crate::cli::display;
use crate::config::ConfigLoader;
use crate::error::ShadowCueError;
use crate::observability::{EventEmitter, StopReason, init_metrics, render_metrics};
use crate::phase::{SequencerSnapshot, TokioScheduler};
use crate::session::{SessionController, SessionOptions};

/// Receives the reason for an external shutdown (signal).
pub type ShutdownSignal = watch::Receiver<Option<StopReason>>;

/// Longest control line accepted, in bytes. Longer lines are skipped.
pub const MAX_LINE_BYTES: usize = 4096;

/// Runs a session until `quit`, end of input, `--duration` or a signal.
///
/// # Errors
///
/// Returns an error if the session file cannot be loaded, the event sink
/// cannot be opened, or the speech command is malformed.
pub async fn run(
    args: &RunArgs,
    mut shutdown: ShutdownSignal,
) -> Result<StopReason, ShadowCueError> {
    let (catalog, file_level, file_muted) = load_catalog(args)?;
    let level = args.level.or(file_level).unwrap_or(Level::Beginner);
    let muted = args.muted || file_muted;

    if args.metrics {
        init_metrics()?;
    }

    let events = args
        .events
        .as_deref()
        .map(EventEmitter::open)
        .transpose()?
        .map(Arc::new);

    let announcer: Arc<dyn Announcer> = if args.no_speech {
        Arc::new(SilentAnnouncer)
    } else {
        let speech = SpeechAnnouncer::from_command_line(&args.speech_command)
            .map_err(|e| ShadowCueError::Usage(format!("--speech-command: {e}")))?;
        info!(program = speech.program(), "speech enabled");
        Arc::new(speech)
    };

    let mut session = SessionController::new(
        SharedCatalog::new(catalog),
        Arc::new(TokioScheduler::current()),
        announcer,
        SessionOptions {
            level: Some(level),
            muted,
            seed: args.seed,
            events,
        },
    );

    let display = tokio::spawn(print_changes(session.subscribe()));

    eprintln!("shadowcue: level {level}; type 'start' to begin, 'help' for commands");
    if args.autostart {
        let mut stdout = std::io::stdout();
        control::execute(&mut session, control::ControlCommand::Start, &mut stdout)?;
    }

    let deadline = args.duration.map(|d| tokio::time::Instant::now() + d);
    let outcome = input_loop(&mut session, &mut shutdown, deadline).await;
    let reason = match &outcome {
        Ok(reason) => *reason,
        Err(e) => {
            warn!(error = %e, "reading control input failed");
            StopReason::InputError
        }
    };

    let summary = session.shutdown(reason);
    drop(session);
    display.abort();

    eprintln!(
        "session ended ({reason}): {} shot cues, {} restarts, {} rejected edits",
        summary.shot_cycles, summary.restarts, summary.rejected_edits
    );
    if args.metrics {
        if let Some(rendered) = render_metrics() {
            eprint!("{rendered}");
        }
    }
    outcome
}

fn load_catalog(args: &RunArgs) -> Result<(Catalog, Option<Level>, bool), ShadowCueError> {
    let Some(path) = &args.config else {
        return Ok((Catalog::default(), None, false));
    };
    info!(config = %path.display(), "loading session file");
    let loaded = ConfigLoader::with_defaults().load(path)?;
    Ok((
        loaded.catalog,
        loaded.config.level,
        loaded.config.muted.unwrap_or(false),
    ))
}

async fn input_loop(
    session: &mut SessionController,
    shutdown: &mut ShutdownSignal,
    deadline: Option<tokio::time::Instant>,
) -> Result<StopReason, ShadowCueError> {
    let mut lines = ControlLines::new(BufReader::new(tokio::io::stdin()));
    let expiry = async {
        match deadline {
            Some(at) => tokio::time::sleep_until(at).await,
            None => std::future::pending().await,
        }
    };
    tokio::pin!(expiry);
    let mut signals_open = true;

    loop {
        tokio::select! {
            changed = shutdown.changed(), if signals_open => {
                if changed.is_err() {
                    signals_open = false;
                } else if let Some(reason) = *shutdown.borrow() {
                    return Ok(reason);
                }
            }
            () = &mut expiry => {
                info!("session duration elapsed");
                return Ok(StopReason::DurationElapsed);
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    return Ok(StopReason::EndOfInput);
                };
                let mut stdout = std::io::stdout();
                match control::parse_line(&line) {
                    Ok(Some(command)) => {
                        if control::execute(session, command, &mut stdout)? == Flow::Quit {
                            return Ok(StopReason::UserQuit);
                        }
                    }
                    Ok(None) => {}
                    Err(e) => {
                        warn!(input = %line, error = %e, "ignored control line");
                        writeln!(stdout, "{e}")?;
                    }
                }
                stdout.flush()?;
            }
        }
    }
}

/// Splits control input into lines, skipping any line that is too long or
/// not valid UTF-8 instead of failing the read.
struct ControlLines<R> {
    reader: R,
    buf: Vec<u8>,
    overflowed: bool,
}

impl<R: AsyncBufRead + Unpin> ControlLines<R> {
    const fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            overflowed: false,
        }
    }

    /// Returns the next usable line without its newline, or `None` at end
    /// of input. A final line without a newline is still returned.
    async fn next_line(&mut self) -> std::io::Result<Option<String>> {
        loop {
            let available = self.reader.fill_buf().await?;
            if available.is_empty() {
                if self.buf.is_empty() && !self.overflowed {
                    return Ok(None);
                }
                if let Some(line) = self.take_line() {
                    return Ok(Some(line));
                }
                continue;
            }

            let (chunk, consumed, complete) = match available.iter().position(|&b| b == b'\n') {
                Some(pos) => (&available[..pos], pos + 1, true),
                None => (available, available.len(), false),
            };
            if !self.overflowed {
                if self.buf.len() + chunk.len() > MAX_LINE_BYTES {
                    self.overflowed = true;
                    self.buf.clear();
                } else {
                    self.buf.extend_from_slice(chunk);
                }
            }
            self.reader.consume(consumed);

            if complete {
                if let Some(line) = self.take_line() {
                    return Ok(Some(line));
                }
            }
        }
    }

    fn take_line(&mut self) -> Option<String> {
        let bytes = std::mem::take(&mut self.buf);
        if std::mem::replace(&mut self.overflowed, false) {
            warn!(limit = MAX_LINE_BYTES, "control line exceeds size limit, skipping");
            return None;
        }
        match String::from_utf8(bytes) {
            Ok(line) => Some(line),
            Err(e) => {
                warn!("invalid UTF-8 in control line, skipping: {}", e.utf8_error());
                None
            }
        }
    }
}

async fn print_changes(rx: watch::Receiver<SequencerSnapshot>) {
    let mut changes = WatchStream::from_changes(rx);
    while let Some(snapshot) = changes.next().await {
        let mut stdout = std::io::stdout().lock();
        let _ = writeln!(stdout, "{}", display::render_snapshot(&snapshot));
        let _ = stdout.flush();
    }
}
