//! `validate`: check session files without running them.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::cli::args::{OutputFormat, ValidateArgs};
use crate::config::ConfigLoader;
use crate::error::{ConfigError, ShadowCueError, ValidationIssue};

#[derive(Debug, Serialize)]
struct FileReport {
    file: PathBuf,
    valid: bool,
    errors: Vec<ValidationIssue>,
    warnings: Vec<ValidationIssue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    failure: Option<String>,
}

#[derive(Debug, Serialize)]
struct Summary {
    valid: usize,
    invalid: usize,
}

#[derive(Debug, Serialize)]
struct Report {
    files: Vec<FileReport>,
    summary: Summary,
}

/// Validates every file, prints a report and fails if any file failed.
///
/// With `--strict`, warnings fail a file too.
///
/// # Errors
///
/// Returns the first file's failure after all files have been reported.
pub fn run(args: &ValidateArgs) -> Result<(), ShadowCueError> {
    let loader = ConfigLoader::with_defaults();
    let mut reports = Vec::with_capacity(args.files.len());
    let mut first_failure: Option<ConfigError> = None;

    for path in &args.files {
        tracing::info!(file = %path.display(), "validating session file");
        let (report, failure) = check(&loader, path, args.strict);
        if first_failure.is_none() {
            first_failure = failure;
        }
        reports.push(report);
    }

    let invalid = reports.iter().filter(|r| !r.valid).count();
    let report = Report {
        summary: Summary {
            valid: reports.len() - invalid,
            invalid,
        },
        files: reports,
    };

    match args.format {
        OutputFormat::Human => print_human(&report),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    first_failure.map_or(Ok(()), |e| Err(e.into()))
}

fn check(loader: &ConfigLoader, path: &Path, strict: bool) -> (FileReport, Option<ConfigError>) {
    let mut report = FileReport {
        file: path.to_path_buf(),
        valid: false,
        errors: Vec::new(),
        warnings: Vec::new(),
        failure: None,
    };
    match loader.load(path) {
        Ok(loaded) => {
            report.warnings = loaded.warnings;
            if strict && !report.warnings.is_empty() {
                let failure = ConfigError::ValidationError {
                    path: path.to_path_buf(),
                    errors: report.warnings.clone(),
                };
                report.failure = Some("warnings treated as errors".to_string());
                return (report, Some(failure));
            }
            report.valid = true;
            (report, None)
        }
        Err(ConfigError::ValidationError { path, errors }) => {
            report.errors.clone_from(&errors);
            (report, Some(ConfigError::ValidationError { path, errors }))
        }
        Err(other) => {
            report.failure = Some(other.to_string());
            (report, Some(other))
        }
    }
}

fn print_human(report: &Report) {
    for file in &report.files {
        let status = if file.valid { "ok" } else { "FAILED" };
        println!("{}: {status}", file.file.display());
        if let Some(failure) = &file.failure {
            println!("  {failure}");
        }
        for issue in file.errors.iter().chain(&file.warnings) {
            println!("  {issue}");
        }
    }
    println!(
        "{} valid, {} invalid",
        report.summary.valid, report.summary.invalid
    );
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn clean_file_is_valid() {
        let file = write_temp("level: pro\n");
        let (report, failure) = check(&ConfigLoader::with_defaults(), file.path(), true);
        assert!(report.valid);
        assert!(failure.is_none());
    }

    #[test]
    fn strict_fails_on_warnings() {
        let file = write_temp("levels:\n  custom:\n    timing:\n      hit_delay: 99\n");
        let loader = ConfigLoader::with_defaults();

        let (lenient, failure) = check(&loader, file.path(), false);
        assert!(lenient.valid);
        assert_eq!(lenient.warnings.len(), 1);
        assert!(failure.is_none());

        let (strict, failure) = check(&loader, file.path(), true);
        assert!(!strict.valid);
        assert!(matches!(failure, Some(ConfigError::ValidationError { .. })));
    }

    #[test]
    fn parse_failure_is_reported() {
        let file = write_temp("level: [unclosed\n");
        let (report, failure) = check(&ConfigLoader::with_defaults(), file.path(), false);
        assert!(!report.valid);
        assert!(report.failure.is_some());
        assert!(matches!(failure, Some(ConfigError::ParseError { .. })));
    }
}
