//! Command dispatch.
//!
//! Routes parsed CLI arguments to the appropriate command handler and turns
//! the outcome into a process exit code.

pub mod completions;
pub mod levels;
pub mod run;
pub mod simulate;
pub mod validate;
pub mod version;

pub use run::ShutdownSignal;

use crate::cli::args::{Cli, Commands};
use crate::error::{ExitCode, ShadowCueError};
use crate::observability::StopReason;

/// Dispatches a parsed CLI invocation and returns the exit code.
///
/// A session ended by a signal exits with the signal's conventional code;
/// every other way of ending a session is a success.
///
/// # Errors
///
/// Returns an error if the dispatched command handler fails.
pub async fn dispatch(cli: Cli, shutdown: ShutdownSignal) -> Result<i32, ShadowCueError> {
    match cli.command {
        Commands::Run(args) => {
            let reason = run::run(&args, shutdown).await?;
            Ok(exit_code_for(reason))
        }
        Commands::Simulate(args) => simulate::run(&args).map(|()| ExitCode::SUCCESS),
        Commands::Levels(args) => levels::run(&args).map(|()| ExitCode::SUCCESS),
        Commands::Validate(args) => validate::run(&args).map(|()| ExitCode::SUCCESS),
        Commands::Completions(args) => {
            completions::run(&args);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Version(args) => {
            version::run(&args)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Exit code for a session that ended for `reason`.
#[must_use]
pub const fn exit_code_for(reason: StopReason) -> i32 {
    match reason {
        StopReason::Interrupted => ExitCode::INTERRUPTED,
        StopReason::Terminated => ExitCode::TERMINATED,
        StopReason::InputError => ExitCode::IO_ERROR,
        StopReason::UserQuit | StopReason::EndOfInput | StopReason::DurationElapsed => {
            ExitCode::SUCCESS
        }
    }
}
