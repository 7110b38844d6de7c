//! Session file loader.
//!
//! 1. Size check against [`ConfigLimits`]
//! 2. YAML parsing into [`SessionConfig`] (unknown keys rejected)
//! 3. Validation, which also builds the [`Catalog`]

use std::path::{Path, PathBuf};

use crate::catalog::Catalog;
use crate::config::schema::SessionConfig;
use crate::config::validation::Validator;
use crate::error::{ConfigError, ValidationIssue};

/// Environment variable overriding the maximum session file size.
pub const MAX_CONFIG_SIZE_ENV: &str = "SHADOWCUE_MAX_CONFIG_SIZE";

/// Default maximum session file size (1 MiB).
pub const DEFAULT_MAX_CONFIG_SIZE: u64 = 1024 * 1024;

/// Resource limits applied while loading.
#[derive(Debug, Clone)]
pub struct ConfigLimits {
    /// Maximum file size in bytes.
    pub max_config_size: u64,
}

impl Default for ConfigLimits {
    fn default() -> Self {
        Self {
            max_config_size: env_or(MAX_CONFIG_SIZE_ENV, DEFAULT_MAX_CONFIG_SIZE),
        }
    }
}

/// A loaded session file.
#[derive(Debug)]
pub struct LoadResult {
    /// Parsed file contents.
    pub config: SessionConfig,

    /// Catalog with the file's overrides applied.
    pub catalog: Catalog,

    /// Adjustments made while applying the file.
    pub warnings: Vec<ValidationIssue>,
}

/// Loads session files.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    limits: ConfigLimits,
}

impl ConfigLoader {
    /// Creates a loader with explicit limits.
    #[must_use]
    pub const fn new(limits: ConfigLimits) -> Self {
        Self { limits }
    }

    /// Creates a loader with limits taken from the environment.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::default()
    }

    /// Reads, parses and validates the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or too large, is not valid
    /// YAML for the schema, or fails validation.
    pub fn load(&self, path: &Path) -> Result<LoadResult, ConfigError> {
        let metadata = std::fs::metadata(path).map_err(|_| ConfigError::MissingFile {
            path: path.to_path_buf(),
        })?;
        if metadata.len() > self.limits.max_config_size {
            return Err(ConfigError::TooLarge {
                path: path.to_path_buf(),
                size: metadata.len(),
                limit: self.limits.max_config_size,
            });
        }

        let raw = std::fs::read_to_string(path).map_err(|_| ConfigError::MissingFile {
            path: path.to_path_buf(),
        })?;
        self.load_str(&raw, path)
    }

    /// Parses and validates `raw` as if read from `path`.
    ///
    /// # Errors
    ///
    /// Same as [`load`](Self::load), minus the file system checks.
    pub fn load_str(&self, raw: &str, path: &Path) -> Result<LoadResult, ConfigError> {
        let config = parse_session(raw).map_err(|(line, message)| ConfigError::ParseError {
            path: path.to_path_buf(),
            line,
            message,
        })?;

        let (catalog, result) = Validator::new().validate(&config);
        if result.has_errors() {
            return Err(ConfigError::ValidationError {
                path: PathBuf::from(path),
                errors: result.errors,
            });
        }

        for warning in &result.warnings {
            tracing::warn!(path = %path.display(), "{warning}");
        }

        Ok(LoadResult {
            config,
            catalog,
            warnings: result.warnings,
        })
    }
}

/// Parses session YAML.
///
/// # Errors
///
/// Returns the 1-based line (when known) and a message.
pub fn parse_session(raw: &str) -> Result<SessionConfig, (Option<usize>, String)> {
    let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    if raw.trim().is_empty() {
        return Err((None, "session file is empty".to_string()));
    }
    serde_yaml::from_str(raw).map_err(|e| (e.location().map(|l| l.line()), e.to_string()))
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
