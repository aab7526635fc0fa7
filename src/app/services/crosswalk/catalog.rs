//! Rule catalog loading and load-time validation
//!
//! The catalog is read once at startup, either from a TOML file or from the
//! bundled default, and rejected outright when it is ambiguous:
//!
//! - two groups sharing `(comparison, reference_year)` that disagree on a code
//! - a composed mapping that is not idempotent for some survey year

use super::engine::CrosswalkEngine;
use super::rules::{Comparison, TransformationGroup};
use crate::error::{OewsError, Result};
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const BUNDLED_CATALOG: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/catalog/default_rules.toml"
));

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default, rename = "group")]
    groups: Vec<GroupEntry>,
}

#[derive(Debug, Deserialize)]
struct GroupEntry {
    name: String,
    comparison: Comparison,
    reference_year: i32,
    #[serde(default)]
    rules: Vec<(String, String)>,
}

/// Validated, ordered collection of transformation groups
#[derive(Debug, Clone)]
pub struct RuleCatalog {
    groups: Vec<TransformationGroup>,
}

impl RuleCatalog {
    /// Validate a set of groups; registration order is preserved
    pub fn new(groups: Vec<TransformationGroup>) -> Result<Self> {
        let catalog = Self { groups };
        catalog.check_conflicts()?;
        catalog.check_idempotence()?;
        Ok(catalog)
    }

    /// Sample catalog shipped with the crate; a subset of the published
    /// crosswalk
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(BUNDLED_CATALOG, Path::new("<bundled>"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(OewsError::InputNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let catalog = Self::from_toml_str(&content, path)?;
        info!(
            "Loaded rule catalog {} ({} groups, {} rules)",
            path.display(),
            catalog.groups.len(),
            catalog.rule_count()
        );
        Ok(catalog)
    }

    /// Parse TOML content; `origin` is only used in error messages
    pub fn from_toml_str(content: &str, origin: &Path) -> Result<Self> {
        let file: CatalogFile =
            toml::from_str(content).map_err(|source| OewsError::CatalogParse {
                path: PathBuf::from(origin),
                source,
            })?;

        let groups = file
            .groups
            .into_iter()
            .map(|entry| {
                TransformationGroup::new(
                    entry.name,
                    entry.comparison,
                    entry.reference_year,
                    entry.rules,
                )
            })
            .collect::<Result<Vec<_>>>()?;

        Self::new(groups)
    }

    pub fn groups(&self) -> &[TransformationGroup] {
        &self.groups
    }

    pub fn rule_count(&self) -> usize {
        self.groups.iter().map(|g| g.rules().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn into_engine(self) -> CrosswalkEngine {
        CrosswalkEngine::new(self.groups)
    }

    fn check_conflicts(&self) -> Result<()> {
        // (comparison, reference_year) -> code -> (group, target)
        let mut windows: HashMap<(Comparison, i32), HashMap<&str, (&str, &str)>> = HashMap::new();

        for group in &self.groups {
            let window = windows
                .entry((group.comparison(), group.reference_year()))
                .or_default();
            for rule in group.rules() {
                match window.get(rule.from_code.as_str()) {
                    Some((first_group, first_target)) if *first_target != rule.to_code => {
                        return Err(OewsError::ConflictingRules {
                            code: rule.from_code.clone(),
                            first_group: first_group.to_string(),
                            second_group: group.name().to_string(),
                            first_target: first_target.to_string(),
                            second_target: rule.to_code.clone(),
                        });
                    }
                    Some(_) => {}
                    None => {
                        window.insert(
                            rule.from_code.as_str(),
                            (group.name(), rule.to_code.as_str()),
                        );
                    }
                }
            }
        }
        Ok(())
    }

    /// Every distinct set of applicable groups is reached by one of the years
    /// adjacent to a reference year
    fn representative_years(&self) -> BTreeSet<i32> {
        self.groups
            .iter()
            .flat_map(|g| {
                let year = g.reference_year();
                [year - 1, year, year + 1]
            })
            .collect()
    }

    fn check_idempotence(&self) -> Result<()> {
        let engine = CrosswalkEngine::new(self.groups.clone());

        for year in self.representative_years() {
            let mut domain: BTreeSet<&str> = BTreeSet::new();
            for group in self.groups.iter().filter(|g| g.applies_to(year)) {
                for rule in group.rules() {
                    domain.insert(&rule.from_code);
                    domain.insert(&rule.to_code);
                }
            }

            for code in domain {
                let once = engine.remap_code(code, year);
                let twice = engine.remap_code(&once, year);
                if once != twice {
                    return Err(OewsError::NonIdempotentCatalog {
                        year,
                        code: code.to_string(),
                        once,
                        twice,
                    });
                }
            }
            debug!("Rule catalog idempotent for {}", year);
        }
        Ok(())
    }
}
