//! Version information display.

use serde::Serialize;

use crate::cli::args::{OutputFormat, VersionArgs};
use crate::error::ShadowCueError;

#[derive(Serialize)]
struct VersionInfo {
    name: &'static str,
    version: &'static str,
    description: &'static str,
}

/// Prints name and version.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn run(args: &VersionArgs) -> Result<(), ShadowCueError> {
    let info = VersionInfo {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        description: env!("CARGO_PKG_DESCRIPTION"),
    };

    match args.format {
        OutputFormat::Human => println!("{} {}", info.name, info.version),
        OutputFormat::Json => println!("{}", serde_json::to_string(&info)?),
    }
    Ok(())
}
