//! # Meta-Operators (L7)
//!
//! `similar`, `induce`, `bundle`, `difference`, `analogy`, `deduce` — a small
//! set of KB-wide queries built on property-relation aggregation rather than
//! unification. None of them mutate the Component KB.

use std::collections::{HashMap, HashSet};

use rayon::prelude::*;

use crate::ast::Term;
use crate::catalog::Catalog;
use crate::kb::ComponentKb;
use crate::statistics::ReasoningStats;
use crate::transitive;

/// Relations property aggregation reads from.
const PROPERTY_RELATIONS: &[&str] = &["has", "can", "isA", "likes", "knows", "owns", "uses"];

/// Synthetic operators a meta-operator never treats as a property source,
/// to avoid a `difference`/`induce` result feeding back into its own
/// aggregation.
const SYNTHETIC_OPERATORS: &[&str] = &["difference", "bundlePattern", "inducePattern"];

fn is_property_operator(operator: &str) -> bool {
    PROPERTY_RELATIONS.contains(&operator) && !SYNTHETIC_OPERATORS.contains(&operator)
}

/// One `(operator, value)` property pair, e.g. `("has", "Fur")`.
pub type Property = (String, String);

/// `props(z)`: every property-carrying fact with `z` as
/// its first argument.
pub fn props(kb: &ComponentKb, entity: &str) -> HashSet<Property> {
    kb.find_by_arg0(entity)
        .into_iter()
        .filter(|f| !f.negated && is_property_operator(&f.operator) && f.args.len() == 2)
        .map(|f| (f.operator.clone(), f.args[1].clone()))
        .collect()
}

/// All distinct subjects appearing in a property-carrying fact, the
/// candidate pool for `similar`.
fn all_entities(kb: &ComponentKb) -> HashSet<String> {
    let mut out = HashSet::new();
    for operator in PROPERTY_RELATIONS {
        for fact in kb.find_by_operator(operator) {
            if !fact.negated {
                if let Some(subject) = fact.args.first() {
                    out.insert(subject.clone());
                }
            }
        }
    }
    out
}

#[derive(Debug, Clone)]
pub struct SimilarMatch {
    pub candidate: String,
    pub score: f64,
    pub shared: Vec<Property>,
}

/// `similar ?x ?y` (anchor x, solve y): rank every other entity by shared
/// property overlap, excluding zero-overlap candidates.
pub fn similar(kb: &ComponentKb, anchor: &str, top_k: usize) -> Vec<SimilarMatch> {
    let anchor_props = props(kb, anchor);
    let candidates: Vec<String> = all_entities(kb).into_iter().filter(|c| c != anchor).collect();
    let mut out: Vec<SimilarMatch> = candidates
        .into_par_iter()
        .filter_map(|candidate| {
            let candidate_props = props(kb, &candidate);
            let shared: Vec<Property> = anchor_props.intersection(&candidate_props).cloned().collect();
            if shared.is_empty() {
                return None;
            }
            let denom = anchor_props.len().max(candidate_props.len()) as f64;
            let score = shared.len() as f64 / denom;
            Some(SimilarMatch { candidate, score, shared })
        })
        .collect();
    out.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal).then(a.candidate.cmp(&b.candidate)));
    out.truncate(top_k);
    out
}

/// `induce args… ?p`: the intersection of `props` across every argument.
pub fn induce(kb: &ComponentKb, args: &[String]) -> Vec<Property> {
    let mut iter = args.iter();
    let first = match iter.next() {
        Some(a) => props(kb, a),
        None => return Vec::new(),
    };
    let common = iter.fold(first, |acc, next| {
        let next_props = props(kb, next);
        acc.intersection(&next_props).cloned().collect()
    });
    let mut out: Vec<Property> = common.into_iter().collect();
    out.sort();
    out
}

/// `bundle args… ?p`: the union of `props` across every argument.
pub fn bundle(kb: &ComponentKb, args: &[String]) -> Vec<Property> {
    let mut out: HashSet<Property> = HashSet::new();
    for arg in args {
        out.extend(props(kb, arg));
    }
    let mut out: Vec<Property> = out.into_iter().collect();
    out.sort();
    out
}

#[derive(Debug, Clone)]
pub struct DifferenceEntry {
    pub source: String,
    pub property: Property,
}

/// `difference A B ?p`: properties unique to `a`, then properties unique to
/// `b`, each tagged with the entity that has it.
pub fn difference(kb: &ComponentKb, a: &str, b: &str) -> Vec<DifferenceEntry> {
    let props_a = props(kb, a);
    let props_b = props(kb, b);
    let mut out = Vec::new();
    let mut only_a: Vec<Property> = props_a.difference(&props_b).cloned().collect();
    only_a.sort();
    for p in only_a {
        out.push(DifferenceEntry { source: a.to_string(), property: p });
    }
    let mut only_b: Vec<Property> = props_b.difference(&props_a).cloned().collect();
    only_b.sort();
    for p in only_b {
        out.push(DifferenceEntry { source: b.to_string(), property: p });
    }
    out
}

/// `analogy A B C ?D`: find relations connecting `A` to
/// `B`, then project the same relation from `C`; falls back to property
/// analogy when no direct relation links `A` and `B`.
pub fn analogy(kb: &ComponentKb, a: &str, b: &str, c: &str) -> Vec<String> {
    let mut relations: Vec<&str> = Vec::new();
    for fact in kb.find_by_arg0(a) {
        if !fact.negated && fact.args.len() == 2 && fact.args[1] == b {
            relations.push(fact.operator.as_str());
        }
    }

    if !relations.is_empty() {
        let mut out: HashSet<String> = HashSet::new();
        for relation in relations {
            for fact in kb.find_by_operator_and_arg0(relation, c) {
                if !fact.negated && fact.args.len() == 2 {
                    out.insert(fact.args[1].clone());
                }
            }
        }
        let mut out: Vec<String> = out.into_iter().collect();
        out.sort();
        return out;
    }

    let props_a = props(kb, a);
    if props_a.iter().any(|(_, v)| v == b) {
        let props_c = props(kb, c);
        let mut out: Vec<String> = props_c
            .difference(&props_a)
            .map(|(_, v)| v.clone())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        out.sort();
        return out;
    }

    Vec::new()
}

/// Relations the forward-chaining sweep saturates transitively
/// during `deduce`.
const SATURABLE_RELATIONS: &[&str] = &["isA", "causes"];

#[derive(Debug, Clone)]
pub struct DeducedFact {
    pub operator: String,
    pub args: Vec<String>,
    pub score: f64,
    pub chain: Vec<String>,
}

/// `deduce Source FilterPattern ?Conclusion`: forward-chain from `Source`
/// up to `depth` rounds, saturating `isA`/`causes` and applying single-leaf
/// rule conditions that unify against a known fact's arg0, scoring each
/// derived fact by `1/(depth+1)` with a boost when its operator matches
/// `filter_operator`. A documented simplification: rule
/// application only chains off facts whose subject is already known, not
/// full multi-conjunct conditions (see `DESIGN.md`).
pub fn deduce(
    kb: &ComponentKb,
    catalog: &Catalog,
    source: &str,
    filter_operator: Option<&str>,
    depth: u32,
    top_k: usize,
) -> Vec<DeducedFact> {
    let depth = depth.max(1);
    let mut derived: Vec<DeducedFact> = Vec::new();
    let mut known_subjects: HashSet<String> = HashSet::new();
    known_subjects.insert(source.to_string());

    let mut stats = ReasoningStats::new();
    for relation in SATURABLE_RELATIONS {
        if catalog.is_transitive(relation) {
            let result = transitive::reach(kb, catalog, relation, source, depth, &mut stats);
            for target in result.reached.iter() {
                let chain = result
                    .chains
                    .get(target)
                    .map(|hops| hops.iter().map(|h| format!("{}({},{})", relation, h.from, h.to)).collect())
                    .unwrap_or_default();
                let round = result.chains.get(target).map(|h| h.len() as u32).unwrap_or(1);
                let mut score = 1.0 / (round as f64 + 1.0);
                if filter_operator == Some(*relation) {
                    score += 0.5;
                }
                known_subjects.insert(target.clone());
                derived.push(DeducedFact {
                    operator: relation.to_string(),
                    args: vec![source.to_string(), target.clone()],
                    score,
                    chain,
                });
            }
        }
    }

    for round in 1..=depth {
        let mut new_subjects = Vec::new();
        for rule in kb.rules() {
            let crate::ast::Ast::Leaf(cond_leaf) = &rule.condition else { continue };
            let Some(subject_term) = cond_leaf.args.first() else { continue };
            let crate::ast::Ast::Leaf(concl_leaf) = &rule.conclusion else { continue };

            for subject in known_subjects.clone() {
                let matches_subject = match subject_term {
                    Term::Var(_) => true,
                    Term::Const(c) => c == &subject,
                };
                if !matches_subject {
                    continue;
                }
                let facts_about_subject = kb.find_by_operator_and_arg0(&cond_leaf.operator, &subject);
                if facts_about_subject.iter().any(|f| !f.negated) || cond_leaf.args.len() == 1 {
                    let mut args = vec![subject.clone()];
                    if concl_leaf.args.len() > 1 {
                        if let Some(extra) = concl_leaf.args.get(1).and_then(Term::as_const) {
                            args.push(extra.to_string());
                        }
                    }
                    let mut score = 1.0 / (round as f64 + 1.0);
                    if filter_operator == Some(concl_leaf.operator.as_str()) {
                        score += 0.5;
                    }
                    new_subjects.push(subject.clone());
                    derived.push(DeducedFact {
                        operator: concl_leaf.operator.clone(),
                        args,
                        score,
                        chain: vec![format!("rule#{} applied to {}", rule.id, subject)],
                    });
                }
            }
        }
        known_subjects.extend(new_subjects);
    }

    derived.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    derived.truncate(top_k);
    derived
}

/// The reserved meta-operator names.
pub const META_OPERATORS: &[&str] = &["similar", "induce", "bundle", "difference", "analogy", "deduce"];

pub fn is_meta_operator(operator: &str) -> bool {
    META_OPERATORS.contains(&operator)
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
        for (op, a, b) in [
            ("has", "Dog", "Fur"),
            ("can", "Dog", "Bark"),
            ("isA", "Dog", "Mammal"),
            ("has", "Cat", "Fur"),
            ("isA", "Cat", "Mammal"),
            ("has", "Car", "Wheels"),
        ] {
            let ast = LeafBuilder::new(op).arg(a).arg(b).build_ast();
            kb.ingest(&ctx, &mut vocab, ast, None, 20).unwrap();
        }
        let mut catalog = Catalog::new();
        catalog.declare("isA", OperatorEntry::relation(2).transitive());
        (kb, catalog)
    }

    #[test]
    fn similar_ranks_cat_above_car_for_dog() {
        let (kb, _catalog) = setup();
        let results = similar(&kb, "Dog", 5);
        assert_eq!(results[0].candidate, "Cat");
        assert!(results[0].score >= 2.0 / 3.0 - 1e-9);
        assert!(!results.iter().any(|m| m.candidate == "Car"));
    }

    #[test]
    fn induce_finds_shared_properties() {
        let (kb, _catalog) = setup();
        let common = induce(&kb, &["Dog".to_string(), "Cat".to_string()]);
        assert!(common.contains(&("has".to_string(), "Fur".to_string())));
        assert!(common.contains(&("isA".to_string(), "Mammal".to_string())));
    }

    #[test]
    fn difference_tags_each_unique_property_by_source() {
        let (kb, _catalog) = setup();
        let diff = difference(&kb, "Dog", "Cat");
        assert!(diff.iter().any(|e| e.source == "Dog" && e.property.0 == "can"));
    }
}
