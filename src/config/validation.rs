//! Session file validation.
//!
//! The validator builds the catalog the file describes and reports what it
//! had to adjust. Nothing stops at the first problem: every issue is
//! collected so `validate` can show them all.

use crate::catalog::{Catalog, CueDefinition, Level, TimingField};
use crate::config::schema::{CueEntry, SessionConfig};
use crate::error::ValidationIssue;

/// Result of validating a session file.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Issues that prevent loading.
    pub errors: Vec<ValidationIssue>,

    /// Issues that were corrected or are merely suspicious.
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// Returns `true` if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns `true` if there are neither errors nor warnings.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}

/// Applies a [`SessionConfig`] on top of the built-in catalog.
#[derive(Debug, Default)]
pub struct Validator {
    result: ValidationResult,
}

impl Validator {
    /// Creates a new validator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the catalog described by `config`.
    ///
    /// The catalog is only meaningful when the result has no errors.
    pub fn validate(mut self, config: &SessionConfig) -> (Catalog, ValidationResult) {
        let mut catalog = Catalog::default();

        for (level, overrides) in &config.levels {
            let prefix = format!("levels.{level}");
            if overrides.timing.is_none() && overrides.cues.is_none() {
                self.warn(&prefix, "level entry has no settings");
            }
            if let Some(timing) = &overrides.timing {
                self.apply_timing(&mut catalog, *level, &prefix, timing.fields());
            }
            if let Some(cues) = &overrides.cues {
                self.apply_cues(&mut catalog, *level, &prefix, cues);
            }
        }

        for level in Level::ALL {
            if catalog.pool.selectable_labels(level).is_empty() {
                self.warn(
                    format!("levels.{level}.cues"),
                    "no enabled cues; starting this level will stay idle",
                );
            }
        }

        if let Some(level) = config.level {
            if catalog.pool.selectable_labels(level).is_empty() {
                self.warn("level", format!("start level '{level}' has no enabled cues"));
            }
        }

        (catalog, self.result)
    }

    fn apply_timing(
        &mut self,
        catalog: &mut Catalog,
        level: Level,
        prefix: &str,
        fields: impl Iterator<Item = (TimingField, f64)>,
    ) {
        for (field, value) in fields {
            let path = format!("{prefix}.timing.{field}");
            match catalog.timings.set(level, field, value) {
                Ok(_) if field.range().contains(value) => {}
                Ok(stored) => {
                    let range = field.range();
                    self.warn(
                        path,
                        format!(
                            "{value} outside {}..={}, clamped to {stored}",
                            range.min, range.max
                        ),
                    );
                }
                Err(rejection) => {
                    self.result
                        .errors
                        .push(ValidationIssue::error(path, rejection.to_string()));
                }
            }
        }
    }

    fn apply_cues(
        &mut self,
        catalog: &mut Catalog,
        level: Level,
        prefix: &str,
        cues: &[CueEntry],
    ) {
        let definitions: Vec<CueDefinition> = cues.iter().map(CueDefinition::from).collect();

        if !level.is_editable() {
            for (index, def) in definitions.iter().enumerate() {
                if !def.enabled {
                    self.warn(
                        format!("{prefix}.cues[{index}]"),
                        format!("'{level}' cues are always enabled"),
                    );
                }
            }
        }

        for (index, rejection) in catalog.pool.replace_level(level, definitions) {
            self.warn(
                format!("{prefix}.cues[{index}]"),
                format!("{rejection}; entry dropped"),
            );
        }
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.result
            .warnings
            .push(ValidationIssue::warning(path, message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Severity;

    fn validate(yaml: &str) -> (Catalog, ValidationResult) {
        let config: SessionConfig = serde_yaml::from_str(yaml).unwrap();
        Validator::new().validate(&config)
    }

    #[test]
    fn empty_config_is_clean_and_seeded() {
        let (catalog, result) = validate("{}");
        assert!(result.is_clean());
        assert_eq!(catalog, Catalog::default());
    }

    #[test]
    fn partial_timing_override_keeps_other_fields() {
        let (catalog, result) = validate("levels: { beginner: { timing: { cue_delay: 2.5 } } }");
        assert!(result.is_clean());
        let profile = catalog.timings.get(Level::Beginner);
        assert!((profile.cue_delay - 2.5).abs() < f64::EPSILON);
        assert!((profile.hit_delay - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn out_of_range_timing_is_clamped_with_warning() {
        let (catalog, result) = validate("levels: { pro: { timing: { hit_delay: 0.1 } } }");
        assert!(!result.has_errors());
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].path, "levels.pro.timing.hit_delay");
        assert_eq!(result.warnings[0].severity, Severity::Warning);
        let stored = catalog.timings.get(Level::Pro).get(TimingField::HitDelay);
        assert!((stored - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn non_finite_timing_is_an_error() {
        let (_, result) = validate("levels: { custom: { timing: { cue_delay: .nan } } }");
        assert!(result.has_errors());
        assert_eq!(result.errors[0].path, "levels.custom.timing.cue_delay");
    }

    #[test]
    fn duplicate_and_empty_labels_are_dropped() {
        let (catalog, result) = validate(
            "levels: { custom: { cues: [Lob, '  ', LOB, { label: Smash, enabled: false }] } }",
        );
        assert!(!result.has_errors());
        let paths: Vec<&str> = result.warnings.iter().map(|w| w.path.as_str()).collect();
        assert_eq!(paths, vec!["levels.custom.cues[1]", "levels.custom.cues[2]"]);
        assert_eq!(catalog.pool.selectable_labels(Level::Custom), vec!["Lob"]);
    }

    #[test]
    fn disabled_cue_on_fixed_level_warns_and_stays_enabled() {
        let (catalog, result) =
            validate("levels: { beginner: { cues: [{ label: Serve, enabled: false }] } }");
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(catalog.pool.selectable_labels(Level::Beginner), vec!["Serve"]);
    }

    #[test]
    fn empty_selectable_set_warns() {
        let (_, result) = validate(
            "level: custom\nlevels: { custom: { cues: [{ label: Lob, enabled: false }] } }",
        );
        assert!(!result.has_errors());
        let paths: Vec<&str> = result.warnings.iter().map(|w| w.path.as_str()).collect();
        assert_eq!(paths, vec!["levels.custom.cues", "level"]);
    }

    #[test]
    fn empty_level_entry_warns() {
        let (_, result) = validate("levels: { intermediate: {} }");
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].path, "levels.intermediate");
    }
}
