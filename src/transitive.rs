//! # Transitive Reasoner (L5)
//!
//! On-demand BFS reachability over the edge set `{(op, x, y) | fact exists}`
//! for a relation flagged transitive. Symmetric relations are walked as
//! undirected graphs; reflexive relations always reach their own source.
//! [`reach`] walks forward from a bound subject; [`reach_reverse`] walks
//! backward from a bound object, for queries whose subject position is a
//! hole.

use std::collections::{HashSet, VecDeque};

use crate::catalog::Catalog;
use crate::kb::ComponentKb;
use crate::statistics::ReasoningStats;

pub const DEFAULT_MAX_DEPTH: u32 = 10;

/// One hop in a reachability chain: the fact relating `from` to `to`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hop {
    pub from: String,
    pub to: String,
}

/// Result of a bounded `reachesTransitively` query.
#[derive(Debug, Clone, Default)]
pub struct ReachabilityResult {
    pub reached: HashSet<String>,
    pub chains: std::collections::HashMap<String, Vec<Hop>>,
    pub depth_exceeded: bool,
}

/// BFS over the subgraph of facts `(operator, x, y)`, starting at `from`
/// and bounded by `max_depth`. When `operator` is
/// symmetric, both directions of every edge are explored; when reflexive,
/// `from` is seeded as already-reached.
pub fn reach(
    kb: &ComponentKb,
    catalog: &Catalog,
    operator: &str,
    from: &str,
    max_depth: u32,
    stats: &mut ReasoningStats,
) -> ReachabilityResult {
    let symmetric = catalog.is_symmetric(operator);
    let reflexive = catalog.is_reflexive(operator);

    let mut result = ReachabilityResult::default();
    let mut visited: HashSet<String> = HashSet::new();
    visited.insert(from.to_string());
    if reflexive {
        result.reached.insert(from.to_string());
    }

    let mut queue: VecDeque<(String, u32)> = VecDeque::new();
    queue.push_back((from.to_string(), 0));

    while let Some((node, depth)) = queue.pop_front() {
        stats.record_transitive_node();
        stats.observe_depth(depth);
        if depth >= max_depth {
            if !edges_from(kb, operator, &node, symmetric).is_empty() {
                result.depth_exceeded = true;
            }
            continue;
        }
        for next in edges_from(kb, operator, &node, symmetric) {
            if visited.insert(next.clone()) {
                result.reached.insert(next.clone());
                let mut chain = result.chains.get(&node).cloned().unwrap_or_default();
                chain.push(Hop {
                    from: node.clone(),
                    to: next.clone(),
                });
                result.chains.insert(next.clone(), chain);
                queue.push_back((next, depth + 1));
            }
        }
    }

    result
}

/// `reachesTransitively(op, from, to, maxDepth) → bool | path`. Returns
/// the chain of hops when reachable.
pub fn reaches_transitively(
    kb: &ComponentKb,
    catalog: &Catalog,
    operator: &str,
    from: &str,
    to: &str,
    max_depth: u32,
    stats: &mut ReasoningStats,
) -> Option<Vec<Hop>> {
    if catalog.is_reflexive(operator) && from == to {
        return Some(Vec::new());
    }
    let result = reach(kb, catalog, operator, from, max_depth, stats);
    if result.reached.contains(to) {
        Some(result.chains.get(to).cloned().unwrap_or_default())
    } else {
        None
    }
}

/// BFS over the *inverse* subgraph of facts `(operator, x, y)`, starting at
/// `to` and walking edges backwards: the returned `reached` set is every
/// `x` that reaches `to` transitively, each with a forward-ordered chain
/// (`x`'s first hop first, ending at `to`). Used when a query's subject
/// position is a hole and its object position is bound, so the closure
/// must be discovered by predecessor rather than successor.
pub fn reach_reverse(
    kb: &ComponentKb,
    catalog: &Catalog,
    operator: &str,
    to: &str,
    max_depth: u32,
    stats: &mut ReasoningStats,
) -> ReachabilityResult {
    let symmetric = catalog.is_symmetric(operator);
    let reflexive = catalog.is_reflexive(operator);

    let mut result = ReachabilityResult::default();
    let mut visited: HashSet<String> = HashSet::new();
    visited.insert(to.to_string());
    if reflexive {
        result.reached.insert(to.to_string());
    }
    result.chains.insert(to.to_string(), Vec::new());

    let mut queue: VecDeque<(String, u32)> = VecDeque::new();
    queue.push_back((to.to_string(), 0));

    while let Some((node, depth)) = queue.pop_front() {
        stats.record_transitive_node();
        stats.observe_depth(depth);
        if depth >= max_depth {
            if !edges_into(kb, operator, &node, symmetric).is_empty() {
                result.depth_exceeded = true;
            }
            continue;
        }
        for source in edges_into(kb, operator, &node, symmetric) {
            if visited.insert(source.clone()) {
                result.reached.insert(source.clone());
                let mut chain = vec![Hop {
                    from: source.clone(),
                    to: node.clone(),
                }];
                chain.extend(result.chains.get(&node).cloned().unwrap_or_default());
                result.chains.insert(source.clone(), chain);
                queue.push_back((source, depth + 1));
            }
        }
    }

    result
}

fn edges_into(kb: &ComponentKb, operator: &str, node: &str, symmetric: bool) -> Vec<String> {
    let mut sources: Vec<String> = kb
        .find_by_operator(operator)
        .into_iter()
        .filter(|f| !f.negated)
        .filter(|f| f.args.get(1).map(|a| a.as_str()) == Some(node))
        .filter_map(|f| f.args.first().cloned())
        .collect();

    if symmetric {
        sources.extend(
            kb.find_by_operator_and_arg0(operator, node)
                .into_iter()
                .filter(|f| !f.negated)
                .filter_map(|f| f.args.get(1).cloned()),
        );
    }
    sources
}

fn edges_from(kb: &ComponentKb, operator: &str, node: &str, symmetric: bool) -> Vec<String> {
    let mut targets: Vec<String> = kb
        .find_by_operator_and_arg0(operator, node)
        .into_iter()
        .filter(|f| !f.negated)
        .filter_map(|f| f.args.get(1).cloned())
        .collect();

    if symmetric {
        for fact in kb.find_by_operator(operator) {
            if fact.negated {
                continue;
            }
            if fact.args.get(1).map(|a| a.as_str()) == Some(node) {
                if let Some(other) = fact.args.first() {
                    targets.push(other.clone());
                }
            }
        }
    }
    targets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::LeafBuilder;
    use crate::catalog::OperatorEntry;
    use crate::hdc::{DenseBinaryStrategy, HdcContext, StrategyRegistry};
    use crate::vocabulary::Vocabulary;
    use std::sync::Arc;

    fn setup() -> (ComponentKb, Catalog) {
        let reg = StrategyRegistry::new();
        reg.register(Arc::new(DenseBinaryStrategy::new()));
        let ctx = HdcContext::new(&reg, "dense-binary", 4096).unwrap();
        let mut vocab = Vocabulary::new("T", 4096);
        vocab.preload_core(&ctx, 20).unwrap();
        let mut kb = ComponentKb::new();
        for (a, b) in [("Socrates", "Human"), ("Human", "Mammal"), ("Mammal", "Animal")] {
            let ast = LeafBuilder::new("isA").arg(a).arg(b).build_ast();
            kb.ingest(&ctx, &mut vocab, ast, None, 20).unwrap();
        }
        let mut catalog = Catalog::new();
        catalog.declare("isA", OperatorEntry::relation(2).transitive());
        (kb, catalog)
    }

    #[test]
    fn reaches_through_a_multi_hop_chain() {
        let (kb, catalog) = setup();
        let mut stats = ReasoningStats::new();
        let chain = reaches_transitively(&kb, &catalog, "isA", "Socrates", "Animal", 10, &mut stats);
        assert!(chain.is_some());
        assert_eq!(chain.unwrap().len(), 3);
    }

    #[test]
    fn reverse_reach_finds_every_ancestor() {
        let (kb, catalog) = setup();
        let mut stats = ReasoningStats::new();
        let result = reach_reverse(&kb, &catalog, "isA", "Animal", 10, &mut stats);
        assert!(result.reached.contains("Socrates"));
        assert!(result.reached.contains("Human"));
        assert!(result.reached.contains("Mammal"));
        assert_eq!(result.chains.get("Socrates").unwrap().len(), 3);
    }

    #[test]
    fn depth_bound_prevents_reaching_too_far() {
        let (kb, catalog) = setup();
        let mut stats = ReasoningStats::new();
        let chain = reaches_transitively(&kb, &catalog, "isA", "Socrates", "Animal", 1, &mut stats);
        assert!(chain.is_none());
        assert!(stats.depth_exceeded || stats.max_depth_reached >= 1);
    }

    #[test]
    fn symmetric_relation_is_walked_undirected() {
        let reg = StrategyRegistry::new();
        reg.register(Arc::new(DenseBinaryStrategy::new()));
        let ctx = HdcContext::new(&reg, "dense-binary", 4096).unwrap();
        let mut vocab = Vocabulary::new("T", 4096);
        vocab.preload_core(&ctx, 20).unwrap();
        let mut kb = ComponentKb::new();
        let ast = LeafBuilder::new("friendOf").arg("Alice").arg("Bob").build_ast();
        kb.ingest(&ctx, &mut vocab, ast, None, 20).unwrap();
        let mut catalog = Catalog::new();
        catalog.declare("friendOf", OperatorEntry::relation(2).symmetric());
        let mut stats = ReasoningStats::new();
        let chain = reaches_transitively(&kb, &catalog, "friendOf", "Bob", "Alice", 5, &mut stats);
        assert!(chain.is_some());
    }

    #[test]
    fn reflexive_relation_always_reaches_itself() {
        let (kb, mut catalog) = setup();
        catalog.declare("isA", OperatorEntry::relation(2).transitive().reflexive());
        let mut stats = ReasoningStats::new();
        let chain = reaches_transitively(&kb, &catalog, "isA", "Socrates", "Socrates", 5, &mut stats);
        assert_eq!(chain, Some(Vec::new()));
    }
}
