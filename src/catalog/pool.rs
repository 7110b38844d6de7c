//! Per-level cue pools.
//!
//! Fixed levels keep every definition enabled. The editable level accepts
//! toggles and appended labels; labels are unique ignoring case.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::CueRejection;

use super::Level;
use super::defaults;

/// One candidate cue label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CueDefinition {
    /// Text announced and displayed.
    pub label: String,
    /// Whether the label is in the selectable set.
    pub enabled: bool,
}

impl CueDefinition {
    /// Creates an enabled definition.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            enabled: true,
        }
    }
}

/// Ordered cue definitions for every level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CuePool {
    levels: HashMap<Level, Vec<CueDefinition>>,
}

impl CuePool {
    /// Creates a pool seeded with the built-in labels for every level.
    #[must_use]
    pub fn seeded() -> Self {
        let levels = Level::ALL
            .into_iter()
            .map(|level| {
                let defs = defaults::seed_cues(level)
                    .iter()
                    .map(|label| CueDefinition::new(*label))
                    .collect();
                (level, defs)
            })
            .collect();
        Self { levels }
    }

    /// Returns the level's definitions in insertion order.
    #[must_use]
    pub fn list_level(&self, level: Level) -> &[CueDefinition] {
        self.levels.get(&level).map_or(&[], Vec::as_slice)
    }

    /// Flips `enabled` on the definition at `index`.
    ///
    /// Returns the new enabled state.
    ///
    /// # Errors
    ///
    /// Returns [`CueRejection::NotEditable`] for fixed levels and
    /// [`CueRejection::IndexOutOfRange`] when there is no such definition.
    pub fn toggle(&mut self, level: Level, index: usize) -> Result<bool, CueRejection> {
        if !level.is_editable() {
            return Err(CueRejection::NotEditable(level));
        }
        let defs = self.levels.entry(level).or_default();
        let len = defs.len();
        let def = defs
            .get_mut(index)
            .ok_or(CueRejection::IndexOutOfRange { index, len })?;
        def.enabled = !def.enabled;
        Ok(def.enabled)
    }

    /// Appends an enabled definition with the trimmed `label`.
    ///
    /// Returns the index of the new definition.
    ///
    /// # Errors
    ///
    /// Returns [`CueRejection::NotEditable`] for fixed levels,
    /// [`CueRejection::EmptyLabel`] when the trimmed label is empty, and
    /// [`CueRejection::Duplicate`] when a label matches ignoring case.
    pub fn add_custom(&mut self, level: Level, label: &str) -> Result<usize, CueRejection> {
        if !level.is_editable() {
            return Err(CueRejection::NotEditable(level));
        }
        self.push_unique(level, label, true)
    }

    /// Returns the enabled labels of the level, recomputed on every call.
    #[must_use]
    pub fn selectable_labels(&self, level: Level) -> Vec<&str> {
        self.list_level(level)
            .iter()
            .filter(|def| def.enabled)
            .map(|def| def.label.as_str())
            .collect()
    }

    /// Replaces a level's definitions, used when seeding from a session file.
    ///
    /// Empty and duplicate labels are skipped and returned as rejections
    /// alongside their position. Fixed levels ignore `enabled = false`.
    pub fn replace_level(
        &mut self,
        level: Level,
        definitions: impl IntoIterator<Item = CueDefinition>,
    ) -> Vec<(usize, CueRejection)> {
        self.levels.insert(level, Vec::new());
        definitions
            .into_iter()
            .enumerate()
            .filter_map(|(position, def)| {
                let enabled = def.enabled || !level.is_editable();
                self.push_unique(level, &def.label, enabled)
                    .err()
                    .map(|rejection| (position, rejection))
            })
            .collect()
    }

    fn push_unique(
        &mut self,
        level: Level,
        label: &str,
        enabled: bool,
    ) -> Result<usize, CueRejection> {
        let label = label.trim();
        if label.is_empty() {
            return Err(CueRejection::EmptyLabel);
        }
        let defs = self.levels.entry(level).or_default();
        let lowered = label.to_lowercase();
        if defs.iter().any(|def| def.label.to_lowercase() == lowered) {
            return Err(CueRejection::Duplicate(label.to_string()));
        }
        defs.push(CueDefinition {
            label: label.to_string(),
            enabled,
        });
        Ok(defs.len() - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_pool_has_all_levels_enabled() {
        let pool = CuePool::seeded();
        for level in Level::ALL {
            let defs = pool.list_level(level);
            assert!(!defs.is_empty());
            assert!(defs.iter().all(|d| d.enabled));
        }
        assert_eq!(pool.list_level(Level::Pro).len(), 6);
    }

    #[test]
    fn add_custom_appends_enabled() {
        let mut pool = CuePool::seeded();
        let before = pool.list_level(Level::Custom).len();
        let index = pool.add_custom(Level::Custom, "Drop shot").unwrap();
        assert_eq!(index, before);
        let def = &pool.list_level(Level::Custom)[index];
        assert_eq!(def.label, "Drop shot");
        assert!(def.enabled);
    }

    #[test]
    fn add_custom_rejects_case_insensitive_duplicate() {
        let mut pool = CuePool::seeded();
        pool.add_custom(Level::Custom, "Drop shot").unwrap();
        let before = pool.list_level(Level::Custom).to_vec();

        let err = pool.add_custom(Level::Custom, "drop shot").unwrap_err();
        assert_eq!(err, CueRejection::Duplicate("drop shot".into()));
        assert_eq!(pool.list_level(Level::Custom), before.as_slice());
    }

    #[test]
    fn add_custom_trims_and_rejects_blank() {
        let mut pool = CuePool::seeded();
        assert_eq!(
            pool.add_custom(Level::Custom, "   "),
            Err(CueRejection::EmptyLabel)
        );
        let index = pool.add_custom(Level::Custom, "  Lob  ").unwrap();
        assert_eq!(pool.list_level(Level::Custom)[index].label, "Lob");
        assert!(matches!(
            pool.add_custom(Level::Custom, "LOB"),
            Err(CueRejection::Duplicate(_))
        ));
    }

    #[test]
    fn fixed_levels_reject_edits() {
        let mut pool = CuePool::seeded();
        for level in [Level::Beginner, Level::Intermediate, Level::Pro] {
            let before = pool.list_level(level).to_vec();
            assert_eq!(
                pool.add_custom(level, "Tweener"),
                Err(CueRejection::NotEditable(level))
            );
            assert_eq!(pool.toggle(level, 0), Err(CueRejection::NotEditable(level)));
            assert_eq!(pool.list_level(level), before.as_slice());
        }
    }

    #[test]
    fn toggle_flips_and_updates_selectable_set() {
        let mut pool = CuePool::seeded();
        assert_eq!(pool.toggle(Level::Custom, 0), Ok(false));
        assert!(!pool.selectable_labels(Level::Custom).contains(&"Forehand"));
        assert_eq!(pool.toggle(Level::Custom, 0), Ok(true));
        assert!(pool.selectable_labels(Level::Custom).contains(&"Forehand"));
    }

    #[test]
    fn toggle_out_of_range_is_rejected() {
        let mut pool = CuePool::seeded();
        let len = pool.list_level(Level::Custom).len();
        assert_eq!(
            pool.toggle(Level::Custom, len),
            Err(CueRejection::IndexOutOfRange { index: len, len })
        );
    }

    #[test]
    fn selectable_set_can_become_empty() {
        let mut pool = CuePool::seeded();
        for index in 0..pool.list_level(Level::Custom).len() {
            pool.toggle(Level::Custom, index).unwrap();
        }
        assert!(pool.selectable_labels(Level::Custom).is_empty());
    }

    #[test]
    fn replace_level_reports_skipped_entries() {
        let mut pool = CuePool::seeded();
        let rejected = pool.replace_level(
            Level::Custom,
            vec![
                CueDefinition::new("Lob"),
                CueDefinition::new(""),
                CueDefinition::new("lob"),
                CueDefinition {
                    label: "Smash".into(),
                    enabled: false,
                },
            ],
        );
        assert_eq!(rejected.len(), 2);
        assert_eq!(rejected[0], (1, CueRejection::EmptyLabel));
        assert_eq!(rejected[1].0, 2);
        assert_eq!(pool.selectable_labels(Level::Custom), vec!["Lob"]);
        assert_eq!(pool.list_level(Level::Custom).len(), 2);
    }

    #[test]
    fn replace_fixed_level_forces_enabled() {
        let mut pool = CuePool::seeded();
        pool.replace_level(
            Level::Beginner,
            vec![CueDefinition {
                label: "Serve".into(),
                enabled: false,
            }],
        );
        assert_eq!(pool.selectable_labels(Level::Beginner), vec!["Serve"]);
    }
}
