//! Reasoning budget limits.
//!
//! Bounds the two cooperative counters the query engine and transitive
//! reasoner must respect: recursion/proof depth
//! and the number of nodes visited during a single reachability or
//! rule-chaining pass. Checked periodically rather than enforced by the
//! type system, matching the cooperative-cancellation model the rest of
//! the core uses.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Reasoning budget error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ResourceError {
    #[error("proof depth {actual} exceeded limit {limit}")]
    DepthExceeded { limit: u32, actual: u32 },

    #[error("visited-node budget exceeded: {actual} nodes, limit {limit}")]
    NodesExceeded { limit: usize, actual: usize },
}

/// Reasoning budget configuration: proof-recursion `maxDepth` and the
/// transitive reasoner's bounded BFS queue/depth.
#[derive(Debug, Clone)]
pub struct ResourceLimits {
    pub max_depth: u32,
    /// BFS depth bound for the transitive reasoner, tracked separately
    /// from `max_depth`'s proof-recursion bound since
    /// the spec names distinct defaults (10 vs. 16) for the two budgets.
    pub transitive_max_depth: u32,
    pub max_nodes_visited: Option<usize>,
}

impl Default for ResourceLimits {
    fn default() -> Self {
        ResourceLimits {
            max_depth: crate::config::DEFAULT_MAX_DEPTH,
            transitive_max_depth: crate::config::DEFAULT_TRANSITIVE_DEPTH,
            max_nodes_visited: None,
        }
    }
}

/// Shared, cooperatively-checked node counter, cloneable across recursive
/// calls without threading `&mut` through every prover function.
#[derive(Clone)]
pub struct NodeBudget {
    visited: Arc<AtomicUsize>,
    limit: Option<usize>,
}

impl NodeBudget {
    pub fn new(limit: Option<usize>) -> Self {
        NodeBudget {
            visited: Arc::new(AtomicUsize::new(0)),
            limit,
        }
    }

    /// Record one node visited; errs once the configured limit is passed.
    pub fn tick(&self) -> Result<(), ResourceError> {
        let actual = self.visited.fetch_add(1, Ordering::Relaxed) + 1;
        if let Some(limit) = self.limit {
            if actual > limit {
                return Err(ResourceError::NodesExceeded { limit, actual });
            }
        }
        Ok(())
    }

    pub fn visited(&self) -> usize {
        self.visited.load(Ordering::Relaxed)
    }
}

pub fn check_depth(limits: &ResourceLimits, depth: u32) -> Result<(), ResourceError> {
    if depth > limits.max_depth {
        Err(ResourceError::DepthExceeded {
            limit: limits.max_depth,
            actual: depth,
        })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_within_limit_is_ok() {
        let limits = ResourceLimits { max_depth: 16, transitive_max_depth: 10, max_nodes_visited: None };
        assert!(check_depth(&limits, 16).is_ok());
        assert!(check_depth(&limits, 17).is_err());
    }

    #[test]
    fn node_budget_trips_past_its_limit() {
        let budget = NodeBudget::new(Some(2));
        assert!(budget.tick().is_ok());
        assert!(budget.tick().is_ok());
        assert!(budget.tick().is_err());
    }

    #[test]
    fn node_budget_unbounded_never_trips() {
        let budget = NodeBudget::new(None);
        for _ in 0..1000 {
            assert!(budget.tick().is_ok());
        }
    }
}
