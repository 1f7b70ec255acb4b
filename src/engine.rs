//! Feature attachment and resolution engine.
//!
//! This module is the core of the crate: it accumulates feature directives,
//! expands declarations into the variants a generator emits, and answers
//! "which overlay applies here" for each of them.
//!
//! ## How the parts work together
//!
//! ```text
//! directives ──┐
//!              │  FeatureTableBuilder::define      (table.rs)
//!              │    - replace identical (feature, pattern) keys (dedup.rs)
//!              │    - clear exact keys, report misses
//!              └───────────────┬──────────────
//!                              │ freeze
//!                              v
//! declarations ── expand_default_args ── number_overloads   (expand.rs)
//!                              │
//!                              v  per variant, per feature
//!                    FeatureTable::best_match     (table.rs)
//!                      - FeaturePattern::matches  (pattern.rs)
//!                      - rank: specificity > proximity > recency
//!                              │
//!                              v
//!                    Resolver::resolve            (resolve.rs)
//!                      - Template::expand         (template.rs)
//!                              │
//!                              v
//!                       ResolvedFeature
//! ```
//!
//! ## Responsibilities by module
//!
//! - `pattern.rs`: pattern shapes, the matching test and precedence classes.
//! - `dedup.rs`: the structural identity of an entry.
//! - `table.rs`: accumulation (builder), freezing, indexing and ranking.
//! - `expand.rs`: default-argument variants and overload numbering.
//! - `template.rs`: placeholder scanning, fact sheets and substitution.
//! - `resolve.rs`: the query facade used by backends.
//! - `metrics.rs`: opt-in timing for whole runs.
//!
//! ## Phases
//!
//! Accumulation is single-threaded and strictly ordered. Nothing can be
//! queried until the builder is frozen; the frozen [`FeatureTable`] is
//! immutable and `Sync`, so queries may run concurrently and in any order.
//!
//! ## Debugging
//!
//! Every `define` outcome is logged at `debug`, every winning match and
//! resolution at `trace` (target `declmark::engine`).

#[path = "engine/dedup.rs"]
mod dedup;
#[path = "engine/expand.rs"]
mod expand;
#[path = "engine/metrics.rs"]
mod metrics;
#[path = "engine/pattern.rs"]
mod pattern;
#[path = "engine/resolve.rs"]
mod resolve;
#[path = "engine/table.rs"]
mod table;
#[path = "engine/template.rs"]
mod template;


pub use expand::{DefaultArgMode, expand_default_args, number_overloads};
pub use metrics::RunMetrics;
pub use pattern::{FeaturePattern, ScopeQualifier, Signature, Specificity};
pub use resolve::{ResolvedFeature, Resolver};
pub use table::{Attributes, Defined, FeatureEntry, FeatureTable, FeatureTableBuilder, FeatureValue};
pub use template::{FactSheet, Placeholders, Template};
