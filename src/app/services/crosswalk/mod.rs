//! Occupation code crosswalks
//!
//! Survey extracts published under an older SOC taxonomy are brought onto
//! the current one by ordered transformation groups:
//!
//! - [`rules`] - rule groups and their year applicability
//! - [`catalog`] - TOML catalog loading and load-time validation
//! - [`engine`] - degrouping and revision passes over rows
//!
//! # Pass Order
//!
//! 1. **Degrouping**: `ExactYear` groups split codes that one survey year
//!    published in aggregated form
//! 2. **Revision**: `AtOrBefore` groups move every year up to a taxonomy
//!    revision onto the revised codes
//!
//! The pipeline deduplicates between the two stages, so both are exposed
//! separately as well as through [`CrosswalkEngine::apply`].

pub mod catalog;
pub mod engine;
pub mod rules;

#[cfg(test)]
pub mod tests;

pub use catalog::RuleCatalog;
pub use engine::{CrosswalkEngine, PassCount, Remapped};
pub use rules::{Comparison, TransformationGroup, TransformationRule};
