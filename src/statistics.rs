//! Reasoning statistics collected per query.
//!
//! Tracks the counters a reasoning budget needs recorded and bounded:
//! rules tried, facts scanned, BFS nodes visited,
//! maximum proof depth reached, wall time, and whether the query stopped
//! early on the timeout or the depth bound. Exposed to callers as
//! `QueryResult::stats`.

use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReasoningStats {
    pub rules_tried: u64,
    pub facts_scanned: u64,
    pub transitive_nodes_visited: u64,
    pub max_depth_reached: u32,
    pub wall_time: Duration,
    pub timed_out: bool,
    pub depth_exceeded: bool,
}

impl ReasoningStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_rule_tried(&mut self) {
        self.rules_tried += 1;
    }

    pub fn record_facts_scanned(&mut self, n: u64) {
        self.facts_scanned += n;
    }

    pub fn record_transitive_node(&mut self) {
        self.transitive_nodes_visited += 1;
    }

    pub fn observe_depth(&mut self, depth: u32) {
        self.max_depth_reached = self.max_depth_reached.max(depth);
    }

    pub fn merge(&mut self, other: &ReasoningStats) {
        self.rules_tried += other.rules_tried;
        self.facts_scanned += other.facts_scanned;
        self.transitive_nodes_visited += other.transitive_nodes_visited;
        self.max_depth_reached = self.max_depth_reached.max(other.max_depth_reached);
        self.timed_out |= other.timed_out;
        self.depth_exceeded |= other.depth_exceeded;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_takes_the_max_depth_and_ors_the_stop_flags() {
        let mut a = ReasoningStats {
            max_depth_reached: 3,
            depth_exceeded: false,
            ..Default::default()
        };
        let b = ReasoningStats {
            max_depth_reached: 5,
            depth_exceeded: true,
            rules_tried: 2,
            ..Default::default()
        };
        a.merge(&b);
        assert_eq!(a.max_depth_reached, 5);
        assert!(a.depth_exceeded);
        assert_eq!(a.rules_tried, 2);
    }

    #[test]
    fn observe_depth_only_grows() {
        let mut s = ReasoningStats::new();
        s.observe_depth(4);
        s.observe_depth(2);
        assert_eq!(s.max_depth_reached, 4);
    }
}
