//! Applies transformation groups to rows of one survey year
//!
//! Degrouping groups run first, then revision groups, each in registration
//! order. Every pass sees the code produced by the previous one. Rows are
//! never mutated; each call returns a fresh row set.

use super::rules::TransformationGroup;
use crate::models::Row;
use tracing::debug;

/// Rows rewritten by one group during a call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassCount {
    pub group: String,
    pub remapped: usize,
}

/// Output of a crosswalk call
#[derive(Debug, Clone, Default)]
pub struct Remapped {
    pub rows: Vec<Row>,
    pub passes: Vec<PassCount>,
}

impl Remapped {
    /// Code changes summed over all passes
    pub fn remapped_rows(&self) -> usize {
        self.passes.iter().map(|p| p.remapped).sum()
    }
}

#[derive(Debug, Clone, Default)]
pub struct CrosswalkEngine {
    degrouping: Vec<TransformationGroup>,
    revisions: Vec<TransformationGroup>,
}

impl CrosswalkEngine {
    pub fn new(groups: Vec<TransformationGroup>) -> Self {
        let (degrouping, revisions) = groups.into_iter().partition(|g| g.is_degrouping());
        Self {
            degrouping,
            revisions,
        }
    }

    /// Engine with no rules; every code passes through
    pub fn identity() -> Self {
        Self::default()
    }

    pub fn degrouping_groups(&self) -> &[TransformationGroup] {
        &self.degrouping
    }

    pub fn revision_groups(&self) -> &[TransformationGroup] {
        &self.revisions
    }

    /// Apply the `ExactYear` corrections for `year`
    pub fn degroup(&self, rows: &[Row], year: i32) -> Remapped {
        run_passes(&self.degrouping, rows, year)
    }

    /// Apply the `AtOrBefore` revision crosswalks for `year`
    pub fn reconcile(&self, rows: &[Row], year: i32) -> Remapped {
        run_passes(&self.revisions, rows, year)
    }

    /// Degroup then reconcile
    pub fn apply(&self, rows: &[Row], year: i32) -> Remapped {
        let degrouped = self.degroup(rows, year);
        let mut reconciled = self.reconcile(&degrouped.rows, year);
        let mut passes = degrouped.passes;
        passes.append(&mut reconciled.passes);
        Remapped {
            rows: reconciled.rows,
            passes,
        }
    }

    /// Composed mapping of a single code for `year`
    pub fn remap_code(&self, code: &str, year: i32) -> String {
        self.degrouping
            .iter()
            .chain(self.revisions.iter())
            .filter(|g| g.applies_to(year))
            .fold(code.to_string(), |current, group| {
                group.remap(&current).to_string()
            })
    }
}

fn run_passes(groups: &[TransformationGroup], rows: &[Row], year: i32) -> Remapped {
    let applicable: Vec<&TransformationGroup> =
        groups.iter().filter(|g| g.applies_to(year)).collect();

    if applicable.is_empty() {
        return Remapped {
            rows: rows.to_vec(),
            passes: Vec::new(),
        };
    }

    let mut counts = vec![0usize; applicable.len()];
    let rows = rows
        .iter()
        .map(|row| {
            let mut code = row.occupation_code.as_str();
            for (index, group) in applicable.iter().enumerate() {
                if let Some(target) = group.target(code) {
                    if target != code {
                        counts[index] += 1;
                    }
                    code = target;
                }
            }
            row.with_occupation_code(code)
        })
        .collect();

    let passes = applicable
        .iter()
        .zip(counts)
        .map(|(group, remapped)| {
            debug!(
                "Group {} ({} {}) remapped {} rows for {}",
                group.name(),
                group.comparison(),
                group.reference_year(),
                remapped,
                year
            );
            PassCount {
                group: group.name().to_string(),
                remapped,
            }
        })
        .collect();

    Remapped { rows, passes }
}
