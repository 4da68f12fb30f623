//! Prune accounting.
//!
//! Counters are state owned by one traverser instance with read accessors,
//! never process-wide globals. They only ever increase during traversal;
//! when to [`reset`](PruneCounters::reset) them is the caller's choice.

use rustc_hash::FxHashMap;

/// Diagnostic bookkeeping for excluded nodes and subtrees.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PruneCounters {
    rescore_prunes: u64,
    score_prunes: u64,
    subtree_prunes: u64,
    duplicate_skips: u64,
    by_scale: FxHashMap<i32, u64>,
}

impl PruneCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total excluded nodes: rescore, score, and bulk subtree prunes.
    ///
    /// Duplicate skips are not prunes (the pair in question was already
    /// fully evaluated) and are reported separately.
    pub fn total(&self) -> u64 {
        self.rescore_prunes + self.score_prunes + self.subtree_prunes
    }

    /// Candidates dropped when a revisit of an existing score failed.
    pub fn rescore_prunes(&self) -> u64 {
        self.rescore_prunes
    }

    /// Children dropped at their first individual scoring.
    pub fn score_prunes(&self) -> u64 {
        self.score_prunes
    }

    /// Nodes excluded through all-or-nothing gates, counted as the pruned
    /// node's immediate child count.
    pub fn subtree_prunes(&self) -> u64 {
        self.subtree_prunes
    }

    /// Base-case evaluations skipped because an identical cached pair was
    /// already evaluated in the same frame.
    pub fn duplicate_skips(&self) -> u64 {
        self.duplicate_skips
    }

    /// Prunes per reference-node scale. Populated only when
    /// [`TraversalConfig::collect_scale_stats`](crate::TraversalConfig) is
    /// set.
    pub fn by_scale(&self) -> &FxHashMap<i32, u64> {
        &self.by_scale
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub(crate) fn record_rescore_prune(&mut self, scale: Option<i32>) {
        self.rescore_prunes += 1;
        self.bump_scale(scale, 1);
    }

    pub(crate) fn record_score_prune(&mut self, scale: Option<i32>) {
        self.score_prunes += 1;
        self.bump_scale(scale, 1);
    }

    pub(crate) fn record_subtree_prune(&mut self, scale: Option<i32>, children: u64) {
        self.subtree_prunes += children;
        self.bump_scale(scale, children);
    }

    pub(crate) fn record_duplicate_skip(&mut self) {
        self.duplicate_skips += 1;
    }

    fn bump_scale(&mut self, scale: Option<i32>, count: u64) {
        if let Some(scale) = scale {
            *self.by_scale.entry(scale).or_insert(0) += count;
        }
    }
}
