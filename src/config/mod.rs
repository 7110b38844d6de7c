//! Session files.
//!
//! A session file seeds the in-memory catalog and the opening level and
//! mute state. It is read once; nothing is written back.

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{ConfigLimits, ConfigLoader, LoadResult, parse_session};
pub use schema::{CueEntry, CueSpec, LevelConfig, SessionConfig, TimingOverride};
pub use validation::{ValidationResult, Validator};
