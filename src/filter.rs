//! Staged filter criteria and the commit boundary that turns them into a
//! [`Snapshot`].
//!
//! Editing a [`StagedCriteria`] never recomputes anything; only [`commit`]
//! produces data for the views.

use crate::loader::Repository;
use crate::types::SubstationRecord;
use std::collections::BTreeSet;
use std::sync::Arc;

/// A categorical constraint. An empty selection means no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    All,
    Only(BTreeSet<String>),
}

impl Selection {
    /// Builds a selection from picked values; picking nothing selects all.
    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set: BTreeSet<String> = values.into_iter().map(Into::into).collect();
        if set.is_empty() {
            Selection::All
        } else {
            Selection::Only(set)
        }
    }

    pub fn matches(&self, value: &str) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(set) => set.contains(value),
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }
}

/// Inclusive fiscal-year bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearRange {
    pub min: i32,
    pub max: i32,
}

impl YearRange {
    pub fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, year: i32) -> bool {
        self.min <= year && year <= self.max
    }

    /// Pulls both ends into `bounds` and orders them.
    pub fn clamped(self, (lo, hi): (i32, i32)) -> Self {
        let a = self.min.clamp(lo, hi);
        let b = self.max.clamp(lo, hi);
        Self { min: a.min(b), max: a.max(b) }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCriteria {
    pub regions: Selection,
    pub ownerships: Selection,
    pub years: YearRange,
}

impl FilterCriteria {
    /// All regions, all ownerships, the repository's full year range.
    pub fn unfiltered(repo: &Repository) -> Self {
        let (min, max) = repo.year_bounds();
        Self {
            regions: Selection::All,
            ownerships: Selection::All,
            years: YearRange::new(min, max),
        }
    }

    pub fn matches(&self, record: &SubstationRecord) -> bool {
        self.regions.matches(&record.region)
            && self.ownerships.matches(&record.ownership)
            && self.years.contains(record.fiscal_year)
    }
}

/// In-progress filter selection, edited freely before Apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedCriteria {
    criteria: FilterCriteria,
}

impl StagedCriteria {
    pub fn new(repo: &Repository) -> Self {
        Self { criteria: FilterCriteria::unfiltered(repo) }
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn set_regions<I, S>(&mut self, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.criteria.regions = Selection::from_values(values);
    }

    pub fn set_ownerships<I, S>(&mut self, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.criteria.ownerships = Selection::from_values(values);
    }

    pub fn set_year_range(&mut self, min: i32, max: i32) {
        self.criteria.years = YearRange::new(min, max);
    }

    pub fn replace(&mut self, criteria: FilterCriteria) {
        self.criteria = criteria;
    }
}

/// The records that passed the last committed criteria, in repository order.
///
/// Cloning shares the underlying rows; a new commit replaces the snapshot
/// wholesale.
#[derive(Debug, Clone)]
pub struct Snapshot {
    records: Arc<[SubstationRecord]>,
    criteria: FilterCriteria,
    generation: u64,
}

impl Snapshot {
    pub fn records(&self) -> &[SubstationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The criteria as applied, after clamping.
    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn with_generation(mut self, generation: u64) -> Self {
        self.generation = generation;
        self
    }
}

/// Applies `criteria` to `repo`. Year bounds outside the repository or given
/// in the wrong order are clamped instead of rejected.
pub fn commit(criteria: &FilterCriteria, repo: &Repository) -> Snapshot {
    let criteria = FilterCriteria {
        years: criteria.years.clamped(repo.year_bounds()),
        ..criteria.clone()
    };
    let records: Vec<SubstationRecord> = repo
        .records()
        .iter()
        .filter(|r| criteria.matches(r))
        .cloned()
        .collect();
    Snapshot { records: records.into(), criteria, generation: 0 }
}

/// Criteria that constrain nothing. Existing snapshots are not touched.
pub fn reset(repo: &Repository) -> FilterCriteria {
    FilterCriteria::unfiltered(repo)
}
