//! Feature resolution.
//!
//! This is the only surface a backend needs: for one emitted variant and one
//! feature name, which overlay applies and what its body expands to.
//!
//! ```text
//! variant ──▶ FeatureTable::best_match ──┬─ none      -> inactive, no body
//!                                        ├─ Disabled  -> inactive, raw body + attributes
//!                                        └─ Enabled   -> active, expanded body + attributes
//! ```
//!
//! Resolution only reads the frozen table and scope graph, so a [`Resolver`]
//! is `Copy` and can be handed to as many worker threads as needed. Results
//! are built fresh on every call.

use super::table::{Attributes, FeatureEntry, FeatureTable, FeatureValue};
use super::template::FactSheet;
use crate::api::Options;
use crate::decl::{ScopeGraph, Variant};
use std::collections::BTreeSet;

/// Outcome of resolving one feature on one variant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedFeature {
    pub active: bool,
    pub body: Option<String>,
    pub attributes: Attributes,
}

/// Read-only view used to answer feature queries.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    table: &'a FeatureTable,
    scopes: &'a ScopeGraph,
    options: &'a Options,
}

impl<'a> Resolver<'a> {
    pub fn new(table: &'a FeatureTable, scopes: &'a ScopeGraph, options: &'a Options) -> Self {
        Resolver { table, scopes, options }
    }

    /// Resolve `feature` on `variant`, deriving the template facts from the
    /// variant itself.
    pub fn resolve(&self, variant: &Variant, feature: &str) -> ResolvedFeature {
        self.resolve_inner(variant, feature, None)
    }

    /// Resolve `feature` on `variant` using facts supplied by the backend.
    pub fn resolve_with_facts(&self, variant: &Variant, feature: &str, facts: &FactSheet) -> ResolvedFeature {
        self.resolve_inner(variant, feature, Some(facts))
    }

    /// Winning entry for `feature`, active or not.
    pub fn matched_entry(&self, variant: &Variant, feature: &str) -> Option<&'a FeatureEntry> {
        self.table.best_match(feature, variant, self.scopes)
    }

    /// Every feature name that resolves active on `variant`.
    pub fn active_features(&self, variant: &Variant) -> BTreeSet<String> {
        self.table
            .feature_names()
            .into_iter()
            .filter(|feature| self.matched_entry(variant, feature).is_some_and(|e| e.value().is_active()))
            .map(str::to_string)
            .collect()
    }

    pub fn facts(&self, variant: &Variant) -> FactSheet {
        FactSheet::for_variant(variant, self.scopes, self.options)
    }

    fn resolve_inner(&self, variant: &Variant, feature: &str, facts: Option<&FactSheet>) -> ResolvedFeature {
        let Some(entry) = self.matched_entry(variant, feature) else {
            return ResolvedFeature::default();
        };

        let resolved = match entry.value() {
            FeatureValue::Enabled(_) => {
                let body = entry.body().map(|template| {
                    if template.placeholders().is_empty() {
                        return template.text().to_string();
                    }
                    match facts {
                        Some(facts) => template.expand(facts),
                        None => template.expand(&self.facts(variant)),
                    }
                });
                ResolvedFeature { active: true, body, attributes: entry.attributes().clone() }
            }
            FeatureValue::Disabled | FeatureValue::Cleared => ResolvedFeature {
                active: false,
                body: entry.body().map(|t| t.text().to_string()),
                attributes: entry.attributes().clone(),
            },
        };

        tracing::trace!(
            feature,
            variant = %variant.qualified_name(),
            arity = variant.arity(),
            active = resolved.active,
            "resolved feature"
        );
        resolved
    }
}
