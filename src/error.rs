//! Error types for `shadowcue`
//!
//! Process-level errors map to exit codes. Edit rejections
//! ([`CueRejection`], [`TimingRejection`]) never leave the session boundary:
//! the controller logs them and reports the edit as not applied.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::catalog::Level;

// ============================================================================
// Exit Codes
// ============================================================================

/// Exit codes for `shadowcue` CLI operations.
pub struct ExitCode;

impl ExitCode {
    /// Successful execution
    pub const SUCCESS: i32 = 0;

    /// General error
    pub const ERROR: i32 = 1;

    /// Configuration error (invalid YAML, validation failure)
    pub const CONFIG_ERROR: i32 = 2;

    /// I/O error (file not found, permission denied)
    pub const IO_ERROR: i32 = 3;

    /// Usage error (invalid arguments, missing required options)
    pub const USAGE_ERROR: i32 = 64;

    /// Interrupted by SIGINT (Ctrl+C)
    pub const INTERRUPTED: i32 = 130;

    /// Terminated by SIGTERM
    pub const TERMINATED: i32 = 143;
}

// ============================================================================
// Top-Level Error
// ============================================================================

/// Top-level error type for `shadowcue` operations.
#[derive(Debug, Error)]
pub enum ShadowCueError {
    /// Session file loading or validation error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Metrics recorder could not be installed
    #[error("metrics error: {0}")]
    Metrics(String),

    /// Invalid command-line input not caught by argument parsing
    #[error("usage error: {0}")]
    Usage(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl ShadowCueError {
    /// Returns the exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Json(_) | Self::Yaml(_) => ExitCode::CONFIG_ERROR,
            Self::Io(_) => ExitCode::IO_ERROR,
            Self::Metrics(_) => ExitCode::ERROR,
            Self::Usage(_) => ExitCode::USAGE_ERROR,
        }
    }
}

// ============================================================================
// Configuration Errors
// ============================================================================

/// Session file loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// YAML parsing failed
    #[error("parse error in {path}{}: {message}", line.map_or_else(String::new, |l| format!(" (line {l})")))]
    ParseError {
        /// Path to the session file
        path: PathBuf,
        /// Line number where the error occurred (if available)
        line: Option<usize>,
        /// Error message from the parser
        message: String,
    },

    /// Session file validation failed
    #[error("validation failed for {path}: {} error(s)", errors.len())]
    ValidationError {
        /// Path to the session file
        path: PathBuf,
        /// Validation issues that prevented loading
        errors: Vec<ValidationIssue>,
    },

    /// Session file not found
    #[error("file not found: {path}")]
    MissingFile {
        /// Path to the missing file
        path: PathBuf,
    },

    /// Session file exceeds the configured size limit
    #[error("{path} is {size} bytes, limit is {limit}")]
    TooLarge {
        /// Path to the session file
        path: PathBuf,
        /// Actual size in bytes
        size: u64,
        /// Configured limit in bytes
        limit: u64,
    },
}

// ============================================================================
// Validation Types
// ============================================================================

/// A single issue found while validating a session file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    /// Path to the problematic field (e.g. `"levels.custom.cues[2]"`)
    pub path: String,
    /// Description of the issue
    pub message: String,
    /// Severity level of the issue
    pub severity: Severity,
}

impl ValidationIssue {
    /// Creates an error-severity issue.
    #[must_use]
    pub fn error(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            severity: Severity::Error,
        }
    }

    /// Creates a warning-severity issue.
    #[must_use]
    pub fn warning(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            severity: Severity::Warning,
        }
    }
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {} at {}", prefix, self.message, self.path)
    }
}

/// Severity level for validation issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Prevents the session file from being used
    Error,
    /// Reported, but the session file still loads
    Warning,
}

// ============================================================================
// Edit Rejections
// ============================================================================

/// Reason a cue pool edit did not apply.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CueRejection {
    /// The level's pool is fixed
    #[error("level '{0}' is not editable")]
    NotEditable(Level),

    /// Label is empty after trimming
    #[error("cue label is empty")]
    EmptyLabel,

    /// A definition with the same label (ignoring case) exists
    #[error("cue '{0}' already exists")]
    Duplicate(String),

    /// No definition at the given index
    #[error("cue index {index} out of range (pool has {len})")]
    IndexOutOfRange {
        /// Requested index (0-based)
        index: usize,
        /// Pool length
        len: usize,
    },
}

/// Reason a timing edit did not apply.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimingRejection {
    /// Input text is not a number
    #[error("'{0}' is not a number")]
    NotNumeric(String),

    /// Input is NaN or infinite
    #[error("timing value must be finite")]
    NotFinite,

    /// Unrecognized timing field name
    #[error("unknown timing field '{0}' (expected cue_delay, hit_delay or recovering_delay)")]
    UnknownField(String),
}

// ============================================================================
// Control Line Errors
// ============================================================================

/// Failure to parse a control line typed into a running session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControlError {
    /// Line could not be tokenized (unbalanced quotes)
    #[error("could not tokenize input")]
    Tokenize,

    /// Unknown command word
    #[error("unknown command '{input}'{}", suggestion.as_ref().map_or_else(String::new, |s| format!(", did you mean '{s}'?")))]
    UnknownCommand {
        /// The word that was typed
        input: String,
        /// Closest known command, if any is close enough
        suggestion: Option<String>,
    },

    /// Unknown level name
    #[error("unknown level '{input}'{}", suggestion.as_ref().map_or_else(String::new, |s| format!(", did you mean '{s}'?")))]
    UnknownLevel {
        /// The name that was typed
        input: String,
        /// Closest level name, if any is close enough
        suggestion: Option<String>,
    },

    /// Command is missing arguments
    #[error("usage: {0}")]
    Usage(&'static str),

    /// Argument could not be interpreted
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
