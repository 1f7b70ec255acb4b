//! Run metrics.
//!
//! Timing and volume figures for one full resolution run, collected by
//! `Interface::report` and printed by the CLI. Collection is opt-in: the
//! per-query path (`Resolver::resolve`) never touches these structs.

use std::time::Duration;

#[derive(Debug, Default, Clone)]
pub struct RunMetrics {
    /// Total elapsed time for the report, resolution included.
    pub total: Duration,
    /// Time spent freezing the table and expanding default arguments.
    pub expand: Duration,
    /// Time spent resolving features over every variant.
    pub resolve: Duration,
    /// Number of variants emitted after expansion.
    pub variants: usize,
    /// Number of `(variant, feature)` queries answered.
    pub queries: usize,
}
