//! CLI argument definitions.

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use crate::announcer::speech::DEFAULT_SPEECH_COMMAND;
use crate::catalog::Level;
use crate::observability::LogFormat;

// ============================================================================
// Root CLI
// ============================================================================

/// Timed cue sequencer for shadow tennis practice.
#[derive(Parser, Debug)]
#[command(name = "shadowcue", author, version, about)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Log output format.
    #[arg(long, default_value = "human", global = true)]
    pub log_format: LogFormat,

    /// Color output control.
    #[arg(long, default_value = "auto", global = true, env = "SHADOWCUE_COLOR")]
    pub color: ColorChoice,
}

// ============================================================================
// Commands
// ============================================================================

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run an interactive practice session.
    Run(RunArgs),

    /// Print the cue timeline a session would produce, without waiting.
    Simulate(SimulateArgs),

    /// Show the cue pool and timing of every level.
    Levels(LevelsArgs),

    /// Validate session files.
    Validate(ValidateArgs),

    /// Generate shell completion scripts.
    Completions(CompletionsArgs),

    /// Display version information.
    Version(VersionArgs),
}

/// Arguments for `run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Session file seeding levels, cues and timing.
    #[arg(short, long, env = "SHADOWCUE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Level to practice (overrides the session file).
    #[arg(short, long, env = "SHADOWCUE_LEVEL")]
    pub level: Option<Level>,

    /// Start the cue loop immediately instead of waiting for `start`.
    #[arg(long)]
    pub autostart: bool,

    /// Start with spoken cues muted.
    #[arg(long)]
    pub muted: bool,

    /// Disable speech output entirely.
    #[arg(long, conflicts_with = "speech_command")]
    pub no_speech: bool,

    /// Text-to-speech command; the cue text is appended as the last argument.
    #[arg(long, env = "SHADOWCUE_SPEECH_COMMAND", default_value = DEFAULT_SPEECH_COMMAND)]
    pub speech_command: String,

    /// End the session after this long (e.g. `10m`, `90s`).
    #[arg(short, long, value_parser = humantime::parse_duration)]
    pub duration: Option<Duration>,

    /// Seed for reproducible cue draws.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Write JSONL session events to this path (`-` for stderr).
    #[arg(long)]
    pub events: Option<PathBuf>,

    /// Print Prometheus metrics to stderr when the session ends.
    #[arg(long)]
    pub metrics: bool,
}

/// Arguments for `simulate`.
#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Session file seeding levels, cues and timing.
    #[arg(short, long, env = "SHADOWCUE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Level to simulate.
    #[arg(short, long, env = "SHADOWCUE_LEVEL")]
    pub level: Option<Level>,

    /// Number of shot cycles to run.
    #[arg(short = 'n', long, default_value_t = 3, value_parser = clap::value_parser!(u32).range(1..=10_000))]
    pub cycles: u32,

    /// Seed for reproducible cue draws.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

/// Arguments for `levels`.
#[derive(Args, Debug)]
pub struct LevelsArgs {
    /// Session file to apply before listing.
    #[arg(short, long, env = "SHADOWCUE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Show only this level.
    pub level: Option<Level>,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

/// Arguments for `validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Session files to validate.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,

    /// Treat warnings as errors.
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for shell completion generation.
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Target shell for completion script.
    pub shell: Shell,
}

/// Arguments for version display.
#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

// ============================================================================
// CLI-Local Enums
// ============================================================================

/// Color output choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorChoice {
    /// Auto-detect terminal support.
    #[default]
    Auto,
    /// Always use color.
    Always,
    /// Never use color.
    Never,
}

/// Output format for structured output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output.
    #[default]
    Human,
    /// JSON output.
    Json,
}

/// Shell type for completion generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    /// Bash shell.
    Bash,
    /// Zsh shell.
    Zsh,
    /// Fish shell.
    Fish,
    /// `PowerShell`.
    #[value(name = "powershell")]
    PowerShell,
    /// Elvish shell.
    Elvish,
}
