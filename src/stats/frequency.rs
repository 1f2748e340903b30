//! Call-frequency buckets used to pick a visual weight per node.

use crate::graph::{CallGraph, CallGraphNode};
use crate::symbols::SymbolTable;
use serde::{Deserialize, Serialize};

/// Lower bounds of equal-width buckets over `[min, max]` call counts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyBuckets {
    bounds: Vec<u64>,
}

impl FrequencyBuckets {
    pub fn bounds(&self) -> &[u64] {
        &self.bounds
    }

    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    /// Weight of the most frequently called functions
    pub fn max_weight(&self) -> usize {
        self.bounds.len()
    }

    /// Index of the first bound above `count`, or `max_weight` if none
    ///
    /// Never decreases as `count` grows.
    pub fn visual_weight(&self, count: u64) -> usize {
        self.bounds
            .iter()
            .position(|bound| *bound > count)
            .unwrap_or_else(|| self.max_weight())
    }
}

/// Split the call-count range of all symbols into `step` buckets
///
/// **Public** - feeds visual weighting of the render output
///
/// # Arguments
/// * `symbols` - Table with call counts already recorded
/// * `step` - Number of buckets; `0` is treated as `1`
///
/// # Returns
/// Bucket bounds. When every symbol has the same count there is a single
/// bucket; an empty table yields no buckets.
pub fn frequency_buckets(symbols: &SymbolTable, step: usize) -> FrequencyBuckets {
    let counts = || symbols.iter().map(|s| s.call_count);
    let (Some(min), Some(max)) = (counts().min(), counts().max()) else {
        return FrequencyBuckets::default();
    };

    if min == max {
        return FrequencyBuckets { bounds: vec![min] };
    }

    let step = step.max(1) as u128;
    let width = (max - min) as u128;
    let bounds = (0..step)
        .map(|i| min + (width * i / step) as u64)
        .collect();

    FrequencyBuckets { bounds }
}

/// Visual weight of a node, from its symbol's call count
pub fn visual_weight(buckets: &FrequencyBuckets, graph: &CallGraph, node: &CallGraphNode) -> usize {
    let count = graph.symbol_of(node).map(|s| s.call_count).unwrap_or(0);
    buckets.visual_weight(count)
}
