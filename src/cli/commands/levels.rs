//! `levels`: show cue pools and timing.

use std::io::Write;

use crate::catalog::{Catalog, Level};
use crate::cli::args::{LevelsArgs, OutputFormat};
use crate::cli::display::{self, LevelView};
use crate::config::ConfigLoader;
use crate::error::ShadowCueError;

/// Prints every level, or only the one requested.
///
/// # Errors
///
/// Returns an error if the session file cannot be loaded or output fails.
pub fn run(args: &LevelsArgs) -> Result<(), ShadowCueError> {
    let catalog = match &args.config {
        Some(path) => ConfigLoader::with_defaults().load(path)?.catalog,
        None => Catalog::default(),
    };
    let levels: Vec<Level> = args.level.map_or_else(|| Level::ALL.to_vec(), |l| vec![l]);

    let mut stdout = std::io::stdout().lock();
    match args.format {
        OutputFormat::Human => {
            for (i, level) in levels.iter().enumerate() {
                if i > 0 {
                    writeln!(stdout)?;
                }
                display::write_level(&mut stdout, &catalog, *level)?;
            }
        }
        OutputFormat::Json => {
            let views: Vec<LevelView> = levels
                .iter()
                .map(|level| LevelView::capture(&catalog, *level))
                .collect();
            serde_json::to_writer_pretty(&mut stdout, &views)?;
            writeln!(stdout)?;
        }
    }
    Ok(())
}
