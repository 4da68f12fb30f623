//! Traverser configuration.

/// Knobs for a traverser instance.
///
/// Neither option affects which base cases are evaluated or pruned, only
/// how aggressively pruning opportunities are surfaced and how much
/// diagnostic detail is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TraversalConfig {
    /// Sort each scale bucket by ascending score before expansion.
    /// Expanding promising candidates first tightens rule bounds earlier
    /// and improves pruning effectiveness.
    #[cfg_attr(feature = "serde", serde(default = "TraversalConfig::default_sort_candidates"))]
    pub sort_candidates: bool,

    /// Maintain a per-scale prune histogram in the counters.
    #[cfg_attr(feature = "serde", serde(default))]
    pub collect_scale_stats: bool,
}

impl TraversalConfig {
    #[cfg(feature = "serde")]
    const fn default_sort_candidates() -> bool {
        true
    }

    pub fn with_sort_candidates(mut self, sort: bool) -> Self {
        self.sort_candidates = sort;
        self
    }

    pub fn with_scale_stats(mut self, collect: bool) -> Self {
        self.collect_scale_stats = collect;
        self
    }
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            sort_candidates: true,
            collect_scale_stats: false,
        }
    }
}
