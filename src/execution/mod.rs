//! Query execution budgets.
//!
//! Provides the cooperative timeout and depth/node-visit limits the query
//! engine and transitive reasoner check periodically.
//! There is no result cache here: the core never mutates the KB during a
//! query and two calls to the same goal are cheap to re-derive, so a cache
//! layer has no counterpart in this spec's scope.
//!
//! ```rust,no_run
//! use sys2_core::execution::{ExecutionConfig, ResourceLimits};
//! use std::time::Duration;
//!
//! let config = ExecutionConfig::default()
//!     .with_timeout(Duration::from_secs(2))
//!     .with_max_depth(16);
//! ```

mod limits;
mod timeout;

pub use limits::{check_depth, NodeBudget, ResourceError, ResourceLimits};
pub use timeout::{CancelHandle, QueryTimeout, TimeoutError};

use std::time::Duration;

/// Configuration for one query's execution budget.
#[derive(Debug, Clone)]
pub struct ExecutionConfig {
    pub timeout: Option<Duration>,
    pub limits: ResourceLimits,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        ExecutionConfig {
            timeout: Some(Duration::from_millis(crate::config::DEFAULT_TIMEOUT_MS as u64)),
            limits: ResourceLimits::default(),
        }
    }
}

impl ExecutionConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.limits.max_depth = max_depth;
        self
    }

    pub fn with_transitive_max_depth(mut self, transitive_max_depth: u32) -> Self {
        self.limits.transitive_max_depth = transitive_max_depth;
        self
    }

    pub fn timeout_controller(&self) -> QueryTimeout {
        QueryTimeout::new(self.timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_methods_compose() {
        let config = ExecutionConfig::default()
            .with_timeout(Duration::from_millis(500))
            .with_max_depth(8);
        assert_eq!(config.timeout, Some(Duration::from_millis(500)));
        assert_eq!(config.limits.max_depth, 8);
    }
}
