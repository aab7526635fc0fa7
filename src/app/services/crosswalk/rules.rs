//! Transformation rules and rule groups
//!
//! A [`TransformationGroup`] is an immutable, ordered set of
//! `from_code -> to_code` rules that applies to the survey years selected by
//! its [`Comparison`] against a reference year.

use crate::app::services::code_classifier::normalize_occupation_code;
use crate::error::{OewsError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// How a group's reference year selects survey years
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    /// Revision crosswalk: every year up to and including the revision boundary
    AtOrBefore,
    /// Degrouping correction: exactly the affected year
    ExactYear,
}

impl Comparison {
    pub fn applies(&self, year: i32, reference_year: i32) -> bool {
        match self {
            Comparison::AtOrBefore => year <= reference_year,
            Comparison::ExactYear => year == reference_year,
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Comparison::AtOrBefore => f.write_str("<="),
            Comparison::ExactYear => f.write_str("=="),
        }
    }
}

/// A single remapping of an occupation code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformationRule {
    pub from_code: String,
    pub to_code: String,
}

impl TransformationRule {
    pub fn is_identity(&self) -> bool {
        self.from_code == self.to_code
    }
}

#[derive(Debug, Clone)]
pub struct TransformationGroup {
    name: String,
    reference_year: i32,
    comparison: Comparison,
    rules: Vec<TransformationRule>,
    lookup: HashMap<String, String>,
}

impl TransformationGroup {
    /// Build a group, normalizing codes and rejecting duplicate `from_code`s
    pub fn new<S: AsRef<str>>(
        name: impl Into<String>,
        comparison: Comparison,
        reference_year: i32,
        rules: impl IntoIterator<Item = (S, S)>,
    ) -> Result<Self> {
        let name = name.into();
        let normalize = |code: &str| {
            normalize_occupation_code(code).map_err(|_| OewsError::InvalidRuleCode {
                group: name.clone(),
                code: code.to_string(),
            })
        };

        let mut ordered = Vec::new();
        let mut lookup = HashMap::new();
        for (from, to) in rules {
            let rule = TransformationRule {
                from_code: normalize(from.as_ref())?,
                to_code: normalize(to.as_ref())?,
            };
            if lookup
                .insert(rule.from_code.clone(), rule.to_code.clone())
                .is_some()
            {
                return Err(OewsError::DuplicateFromCode {
                    group: name.clone(),
                    code: rule.from_code,
                });
            }
            ordered.push(rule);
        }

        Ok(Self {
            name,
            reference_year,
            comparison,
            rules: ordered,
            lookup,
        })
    }

    /// Revision crosswalk applied to every year through `reference_year`
    pub fn revision<S: AsRef<str>>(
        name: impl Into<String>,
        reference_year: i32,
        rules: impl IntoIterator<Item = (S, S)>,
    ) -> Result<Self> {
        Self::new(name, Comparison::AtOrBefore, reference_year, rules)
    }

    /// Degrouping correction applied to exactly `reference_year`
    pub fn degrouping<S: AsRef<str>>(
        name: impl Into<String>,
        reference_year: i32,
        rules: impl IntoIterator<Item = (S, S)>,
    ) -> Result<Self> {
        Self::new(name, Comparison::ExactYear, reference_year, rules)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn reference_year(&self) -> i32 {
        self.reference_year
    }

    pub fn comparison(&self) -> Comparison {
        self.comparison
    }

    pub fn rules(&self) -> &[TransformationRule] {
        &self.rules
    }

    pub fn is_degrouping(&self) -> bool {
        self.comparison == Comparison::ExactYear
    }

    pub fn applies_to(&self, year: i32) -> bool {
        self.comparison.applies(year, self.reference_year)
    }

    /// Target for `code`, or `code` itself when no rule matches
    pub fn remap<'a>(&'a self, code: &'a str) -> &'a str {
        self.lookup.get(code).map(String::as_str).unwrap_or(code)
    }

    /// Explicit target for `code`, if this group has a rule for it
    pub fn target(&self, code: &str) -> Option<&str> {
        self.lookup.get(code).map(String::as_str)
    }
}
