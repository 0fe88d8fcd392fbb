//! Running-order generation.
//!
//! Ordering is fixed and reproduced exactly:
//!
//! 1. levels in configuration-insertion order
//! 2. phases in progression order (Eliminatoria, Semifinal, Final)
//! 3. gender: Mujeres before Varones when separated, otherwise Mixto
//! 4. categories in configured order
//!
//! Each row gets the default duration of its phase; operators may hand-edit
//! it afterwards.

use crate::types::{Category, Gender, LevelId, Phase, ScheduleItem, ScheduleItemId};
use serde::{Deserialize, Serialize};

/// What the operator selected for one level
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelSelection {
    /// Categories in the order they should run
    pub categories: Vec<Category>,
    /// Rounds this level runs (a set; order and duplicates are ignored)
    pub phases: Vec<Phase>,
    /// Run women and men separately instead of mixed
    pub separate_genders: bool,
}

impl LevelSelection {
    /// Creates a selection
    #[must_use]
    pub const fn new(categories: Vec<Category>, phases: Vec<Phase>, separate_genders: bool) -> Self {
        Self {
            categories,
            phases,
            separate_genders,
        }
    }

    /// Rounds in progression order, without duplicates
    #[must_use]
    pub fn ordered_phases(&self) -> Vec<Phase> {
        let mut phases = self.phases.clone();
        phases.sort_unstable();
        phases.dedup();
        phases
    }

    /// Number of rows this level contributes
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.ordered_phases().len()
            * Gender::for_separation(self.separate_genders).len()
            * self.categories.len()
    }
}

/// Selected levels, kept in insertion order
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DanceConfiguration {
    levels: Vec<(LevelId, LevelSelection)>,
}

impl DanceConfiguration {
    /// Creates an empty configuration
    #[must_use]
    pub const fn new() -> Self {
        Self { levels: Vec::new() }
    }

    /// Builder-style [`insert`](Self::insert)
    #[must_use]
    pub fn with_level(mut self, level: impl Into<LevelId>, selection: LevelSelection) -> Self {
        self.insert(level.into(), selection);
        self
    }

    /// Add a level, or replace its selection in place if already present
    pub fn insert(&mut self, level: LevelId, selection: LevelSelection) {
        if let Some(entry) = self.levels.iter_mut().find(|(existing, _)| *existing == level) {
            entry.1 = selection;
        } else {
            self.levels.push((level, selection));
        }
    }

    /// Levels in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&LevelId, &LevelSelection)> {
        self.levels.iter().map(|(level, selection)| (level, selection))
    }

    /// Number of selected levels
    #[must_use]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Whether no level is selected
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Whether any level has at least one category
    #[must_use]
    pub fn has_categories(&self) -> bool {
        self.levels.iter().any(|(_, selection)| !selection.categories.is_empty())
    }
}

/// Default duration of each round, in minutes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseDurations {
    /// Elimination round
    pub eliminatoria: u32,
    /// Semifinal round
    pub semifinal: u32,
    /// Final round
    pub final_round: u32,
}

impl PhaseDurations {
    /// Duration for `phase`
    #[must_use]
    pub const fn minutes(&self, phase: Phase) -> u32 {
        match phase {
            Phase::Eliminatoria => self.eliminatoria,
            Phase::Semifinal => self.semifinal,
            Phase::Final => self.final_round,
        }
    }
}

impl Default for PhaseDurations {
    fn default() -> Self {
        Self {
            eliminatoria: 20,
            semifinal: 15,
            final_round: 10,
        }
    }
}

/// Expands a [`DanceConfiguration`] into a running order
#[derive(Clone, Debug, Default)]
pub struct ScheduleBuilder {
    durations: PhaseDurations,
}

impl ScheduleBuilder {
    /// Builder with the default phase durations
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder with custom phase durations
    #[must_use]
    pub const fn with_durations(durations: PhaseDurations) -> Self {
        Self { durations }
    }

    /// One row per (level, phase, gender, category), numbered `0..N`.
    ///
    /// A configuration without categories yields an empty running order.
    #[must_use]
    pub fn build(&self, configuration: &DanceConfiguration) -> Vec<ScheduleItem> {
        let mut items = Vec::new();

        for (level, selection) in configuration.iter() {
            for phase in selection.ordered_phases() {
                for &gender in Gender::for_separation(selection.separate_genders) {
                    for category in &selection.categories {
                        items.push(ScheduleItem {
                            id: ScheduleItemId::new(),
                            level_id: level.clone(),
                            category: category.clone(),
                            gender,
                            phase,
                            order: 0,
                            estimated_time: self.durations.minutes(phase),
                        });
                    }
                }
            }
        }

        super::order::renumber(&mut items);
        items
    }
}

/// Total running time of a schedule, in minutes
#[must_use]
pub fn total_estimated_minutes(items: &[ScheduleItem]) -> u32 {
    items.iter().map(|item| item.estimated_time).sum()
}
