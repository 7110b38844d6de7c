//! Line-oriented control protocol for `shadowcue run`.
//!
//! Each line on stdin is one command, split with shell quoting rules.
//! Parsing is pure; [`execute`] applies a command to a session and writes
//! the response.

use std::io::Write;

use crate::catalog::{Level, TimingField};
use crate::cli::display;
use crate::error::ControlError;
use crate::session::SessionController;

/// Minimum similarity for command suggestions.
const SUGGESTION_THRESHOLD: f64 = 0.7;

/// Command words, aliases included.
const COMMAND_WORDS: [&str; 16] = [
    "start", "play", "stop", "pause", "mute", "unmute", "level", "timing", "toggle", "add",
    "list", "status", "help", "quit", "exit", "levels",
];

const USAGE_LEVEL: &str = "level <beginner|intermediate|pro|custom>";
const USAGE_TIMING: &str = "timing <level> <cue_delay|hit_delay|recovering_delay> <seconds>";
const USAGE_TOGGLE: &str = "toggle <level> <n>";
const USAGE_ADD: &str = "add <level> <label...>";

/// Help text printed by `help`.
pub const HELP: &str = "\
commands:
  start | play                      start the current level
  stop | pause                      stop cues
  mute | unmute                     silence or restore spoken cues
  level <name>                      switch level
  timing <level> <field> <seconds>  set cue_delay, hit_delay or recovering_delay
  toggle <level> <n>                enable/disable cue n (as numbered by list)
  add <level> <label...>            add a cue to the custom level
  list [level]                      show cues and timing
  status                            show the current cue
  help                              show this help
  quit | exit                       end the session";

/// A parsed control line.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlCommand {
    /// Start the selected level.
    Start,
    /// Stop cues.
    Stop,
    /// Set the mute flag.
    Mute(bool),
    /// Switch level.
    Level(Level),
    /// Edit a timing field; the value is validated by the session.
    Timing {
        /// Level to edit.
        level: Level,
        /// Field to edit.
        field: TimingField,
        /// Value as typed.
        value: String,
    },
    /// Toggle a cue by its 0-based index.
    Toggle {
        /// Level to edit.
        level: Level,
        /// 0-based cue index.
        index: usize,
    },
    /// Add a custom cue.
    Add {
        /// Level to edit.
        level: Level,
        /// Label as typed.
        label: String,
    },
    /// Show cues and timing, of the selected level when `None`.
    List(Option<Level>),
    /// Show the current snapshot.
    Status,
    /// Show help.
    Help,
    /// End the session.
    Quit,
}

/// What the input loop should do after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Read the next line.
    Continue,
    /// End the session.
    Quit,
}

/// Parses one control line.
///
/// Blank lines and `#` comments parse to `None`.
///
/// # Errors
///
/// Returns a [`ControlError`] for malformed input; the caller reports it and
/// keeps reading.
pub fn parse_line(line: &str) -> Result<Option<ControlCommand>, ControlError> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }
    let words = shlex::split(trimmed).ok_or(ControlError::Tokenize)?;
    let Some((head, rest)) = words.split_first() else {
        return Ok(None);
    };

    let command = match head.to_lowercase().as_str() {
        "start" | "play" => ControlCommand::Start,
        "stop" | "pause" => ControlCommand::Stop,
        "mute" => ControlCommand::Mute(true),
        "unmute" => ControlCommand::Mute(false),
        "level" => match rest {
            [name] => ControlCommand::Level(name.parse()?),
            _ => return Err(ControlError::Usage(USAGE_LEVEL)),
        },
        "timing" => match rest {
            [level, field, value] => ControlCommand::Timing {
                level: level.parse()?,
                field: field
                    .parse()
                    .map_err(|e: crate::error::TimingRejection| {
                        ControlError::InvalidArgument(e.to_string())
                    })?,
                value: value.clone(),
            },
            _ => return Err(ControlError::Usage(USAGE_TIMING)),
        },
        "toggle" => match rest {
            [level, n] => ControlCommand::Toggle {
                level: level.parse()?,
                index: parse_position(n)?,
            },
            _ => return Err(ControlError::Usage(USAGE_TOGGLE)),
        },
        "add" => match rest {
            [level, label @ ..] if !label.is_empty() => ControlCommand::Add {
                level: level.parse()?,
                label: label.join(" "),
            },
            _ => return Err(ControlError::Usage(USAGE_ADD)),
        },
        "list" | "levels" => match rest {
            [] => ControlCommand::List(None),
            [level] => ControlCommand::List(Some(level.parse()?)),
            _ => return Err(ControlError::Usage("list [level]")),
        },
        "status" => ControlCommand::Status,
        "help" | "?" => ControlCommand::Help,
        "quit" | "exit" => ControlCommand::Quit,
        other => {
            return Err(ControlError::UnknownCommand {
                input: head.clone(),
                suggestion: suggest_command(other).map(str::to_string),
            });
        }
    };
    Ok(Some(command))
}

/// Parses a 1-based position as shown by `list`.
fn parse_position(raw: &str) -> Result<usize, ControlError> {
    match raw.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n - 1),
        _ => Err(ControlError::InvalidArgument(format!(
            "'{raw}' is not a cue number (1, 2, ...)"
        ))),
    }
}

fn suggest_command(input: &str) -> Option<&'static str> {
    COMMAND_WORDS
        .iter()
        .map(|word| (*word, strsim::jaro_winkler(input, word)))
        .filter(|(_, score)| *score >= SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(word, _)| word)
}

/// Applies `command` to `session`, writing the response to `out`.
///
/// # Errors
///
/// Returns an error only when writing to `out` fails.
pub fn execute(
    session: &mut SessionController,
    command: ControlCommand,
    out: &mut impl Write,
) -> std::io::Result<Flow> {
    match command {
        ControlCommand::Start => {
            let level = session.level();
            if !session.start(level) {
                writeln!(out, "no enabled cues for {level}; waiting for a cue to be enabled")?;
            }
        }
        ControlCommand::Stop => {
            session.stop();
            writeln!(out, "stopped")?;
        }
        ControlCommand::Mute(muted) => {
            session.set_muted(muted);
            writeln!(out, "{}", if muted { "muted" } else { "unmuted" })?;
        }
        ControlCommand::Level(level) => {
            session.select_level(level);
            writeln!(out, "level: {level}")?;
        }
        ControlCommand::Timing {
            level,
            field,
            value,
        } => {
            let applied = session.edit_timing_text(level, field, &value);
            let stored = session.catalog().read().timings.get(level).get(field);
            if applied {
                writeln!(out, "{level} {field} = {stored}s")?;
            } else {
                writeln!(out, "{level} {field} unchanged ({stored}s)")?;
            }
        }
        ControlCommand::Toggle { level, index } => {
            if session.toggle_cue(level, index) {
                let catalog = session.catalog().read();
                if let Some(def) = catalog.pool.list_level(level).get(index) {
                    let state = if def.enabled { "enabled" } else { "disabled" };
                    writeln!(out, "{level} #{} {}: {state}", index + 1, def.label)?;
                }
            } else {
                writeln!(out, "not applied")?;
            }
        }
        ControlCommand::Add { level, label } => {
            if session.add_custom_cue(level, &label) {
                writeln!(out, "added '{}' to {level}", label.trim())?;
            } else {
                writeln!(out, "not added")?;
            }
        }
        ControlCommand::List(level) => {
            let level = level.unwrap_or_else(|| session.level());
            display::write_level(out, &session.catalog().read(), level)?;
        }
        ControlCommand::Status => {
            let state = if session.is_active() { "running" } else { "stopped" };
            writeln!(out, "{} ({state})", display::render_snapshot(&session.snapshot()))?;
        }
        ControlCommand::Help => writeln!(out, "{HELP}")?,
        ControlCommand::Quit => return Ok(Flow::Quit),
    }
    Ok(Flow::Continue)
}
