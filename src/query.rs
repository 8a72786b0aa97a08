//! # Query Engine (L6)
//!
//! Hybrid backward chaining: direct KB lookup, transitive extension, rule
//! chaining via unification against a rule's conclusion, and a contrapositive
//! proof strategy for explicitly negated goals. Condition matching walks a
//! rule's condition tree; unification is first-order via
//! [`crate::unify::Substitution`].
//!
//! A condition leaf is matched only against KB facts
//! (direct + transitive) — it does not recursively invoke rule chaining, so
//! rule application is a single non-recursive step from a query's
//! perspective. This keeps proof search terminating without an explicit
//! per-goal visited set for the rule-chaining path; the transitive reasoner
//! below still guards its own BFS with a visited set.

use std::collections::{HashMap, HashSet};

use crate::ast::{Ast, Leaf, Term};
use crate::catalog::Catalog;
use crate::execution::{ExecutionConfig, QueryTimeout};
use crate::kb::{ComponentKb, Fact, FactId, Rule, RuleId};
use crate::statistics::ReasoningStats;
use crate::transitive::{self, Hop};
use crate::unify::Substitution;

/// A parsed goal: `{operator, args}` where each arg may be a constant, a
/// bound variable, or a hole the caller wants solved.
/// `negate` distinguishes a `Not(X)` goal, handled by the contrapositive
/// strategy.
#[derive(Debug, Clone)]
pub struct Goal {
    pub operator: String,
    pub args: Vec<Term>,
    pub negate: bool,
}

impl Goal {
    pub fn new(operator: impl Into<String>, args: Vec<Term>) -> Self {
        Goal {
            operator: operator.into(),
            args,
            negate: false,
        }
    }

    pub fn negated(mut self) -> Self {
        self.negate = true;
        self
    }

    fn as_leaf(&self) -> Leaf {
        Leaf::new(self.operator.clone(), self.args.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryMode {
    Query,
    Prove,
    Abduce,
    FindAll,
}

#[derive(Debug, Clone)]
pub struct QueryConfig {
    pub mode: QueryMode,
    pub execution: ExecutionConfig,
    pub closed_world: bool,
}

impl Default for QueryConfig {
    fn default() -> Self {
        QueryConfig {
            mode: QueryMode::Query,
            execution: ExecutionConfig::default(),
            closed_world: true,
        }
    }
}

#[derive(Debug, Clone)]
pub enum ProofKind {
    Direct { fact_id: FactId },
    Transitive { chain: Vec<Hop> },
    Rule { rule_id: RuleId },
    Contrapositive { rule_id: RuleId },
}

#[derive(Debug, Clone)]
pub struct Proof {
    pub kind: ProofKind,
    pub depth: u32,
    pub confidence: f64,
}

#[derive(Debug, Clone)]
pub struct CandidateMatch {
    pub substitution: Substitution,
    pub proof: Proof,
}

#[derive(Debug, Clone, Default)]
pub struct QueryResult {
    pub success: bool,
    pub bindings: std::collections::HashMap<String, String>,
    pub all_results: Vec<(std::collections::HashMap<String, String>, Proof)>,
    pub ambiguous: bool,
    pub confidence: f64,
    pub timed_out: bool,
    pub depth_exceeded: bool,
    pub reason: Option<String>,
    pub stats: ReasoningStats,
}

impl QueryResult {
    fn failure(reason: &str, stats: ReasoningStats) -> Self {
        QueryResult {
            reason: Some(reason.to_string()),
            stats,
            ..Default::default()
        }
    }
}

struct Engine<'a> {
    kb: &'a ComponentKb,
    catalog: &'a Catalog,
    config: &'a QueryConfig,
    timeout: QueryTimeout,
    stats: ReasoningStats,
    /// Set when a candidate was dropped purely because the negation index
    /// matched it (surfaced to callers as `reason: 'negation-blocks'`), so a
    /// resulting empty proof can be distinguished from plain absence of
    /// evidence.
    negation_blocked: bool,
}

/// Run one query to completion. Strategies are tried in
/// order and unioned: direct match, rule-derived match, contrapositive (for
/// negated goals). Meta-operators are dispatched by the caller before
/// reaching this function, since they never touch the proof machinery here.
pub fn query(kb: &ComponentKb, catalog: &Catalog, goal: &Goal, config: &QueryConfig) -> QueryResult {
    let mut engine = Engine {
        kb,
        catalog,
        config,
        timeout: config.execution.timeout_controller(),
        stats: ReasoningStats::new(),
        negation_blocked: false,
    };

    let mut candidates = Vec::new();

    if !goal.negate {
        candidates.extend(engine.direct_match(goal));
        if engine.timeout.check().is_err() {
            return engine.timeout_result(candidates);
        }
        candidates.extend(engine.rule_derived_match(goal));
        if engine.timeout.check().is_err() {
            return engine.timeout_result(candidates);
        }
    } else {
        candidates.extend(engine.contrapositive_match(goal));
    }

    engine.finish(goal, candidates)
}

impl<'a> Engine<'a> {
    fn timeout_result(&self, candidates: Vec<CandidateMatch>) -> QueryResult {
        let mut result = self.build_result(candidates);
        result.timed_out = true;
        result.reason = Some("timeout".to_string());
        result
    }

    fn finish(&mut self, goal: &Goal, candidates: Vec<CandidateMatch>) -> QueryResult {
        if candidates.is_empty() {
            let stats = self.stats.clone();
            let reason = if self.negation_blocked { "negation-blocks" } else { "no_proof" };
            return QueryResult::failure(reason, stats);
        }
        let _ = goal;
        self.build_result(candidates)
    }

    fn build_result(&self, mut candidates: Vec<CandidateMatch>) -> QueryResult {
        candidates.sort_by(|a, b| {
            a.proof
                .depth
                .cmp(&b.proof.depth)
                .then(b.proof.confidence.partial_cmp(&a.proof.confidence).unwrap_or(std::cmp::Ordering::Equal))
                .then(fact_id_of(&a.proof).cmp(&fact_id_of(&b.proof)))
        });

        let mut seen = HashSet::new();
        let mut all_results = Vec::new();
        for c in candidates {
            let key = c.substitution.canonical_key();
            if seen.insert(key) {
                let bindings = c
                    .substitution
                    .flattened()
                    .into_iter()
                    .collect::<std::collections::HashMap<_, _>>();
                all_results.push((bindings, c.proof));
            }
        }

        let success = !all_results.is_empty();
        let ambiguous = all_results.len() > 1;
        let confidence = all_results.first().map(|(_, p)| p.confidence).unwrap_or(0.0);
        let bindings = all_results.first().map(|(b, _)| b.clone()).unwrap_or_default();

        QueryResult {
            success,
            bindings,
            all_results,
            ambiguous,
            confidence,
            timed_out: false,
            depth_exceeded: self.stats.depth_exceeded,
            reason: if success { None } else { Some("unprovable".to_string()) },
            stats: self.stats.clone(),
        }
    }

    fn direct_match(&mut self, goal: &Goal) -> Vec<CandidateMatch> {
        let leaf = goal.as_leaf();
        let subst = Substitution::new();
        let mut out = Vec::new();

        for fact in self.facts_for(&leaf, &subst) {
            self.stats.record_facts_scanned(1);
            if fact.args.len() != leaf.args.len() {
                continue;
            }
            if fact.negated {
                if unify_leaf_against_values(&leaf, &subst, &fact.args).is_some() {
                    self.negation_blocked = true;
                }
                continue;
            }
            if let Some(s) = unify_leaf_against_values(&leaf, &subst, &fact.args) {
                if self.leaf_is_negated(&leaf, &s) {
                    self.negation_blocked = true;
                    continue;
                }
                out.push(CandidateMatch {
                    substitution: s,
                    proof: Proof {
                        kind: ProofKind::Direct { fact_id: fact.id },
                        depth: 0,
                        confidence: 1.0,
                    },
                });
            }
        }

        if self.catalog.is_transitive(&leaf.operator) && leaf.args.len() == 2 {
            let max_depth = self.config.execution.limits.transitive_max_depth;
            let arg0_const = leaf.args[0].as_const().map(str::to_string);
            let arg1_const = leaf.args[1].as_const().map(str::to_string);

            match (arg0_const, arg1_const) {
                (Some(from), _) => {
                    // Subject bound: walk forward and bind whichever
                    // position (object, possibly both) is a hole.
                    let result =
                        transitive::reach(self.kb, self.catalog, &leaf.operator, &from, max_depth, &mut self.stats);
                    for target in result.reached.iter() {
                        let instantiated = vec![from.clone(), target.clone()];
                        self.push_transitive_candidate(&leaf, &subst, instantiated, result.chains.get(target), &mut out);
                    }
                }
                (None, Some(to)) => {
                    // Object bound, subject a hole: walk the inverse edge
                    // set so every ancestor of `to` is found, not just the
                    // ones reachable by coincidentally scanning forward.
                    let result = transitive::reach_reverse(
                        self.kb,
                        self.catalog,
                        &leaf.operator,
                        &to,
                        max_depth,
                        &mut self.stats,
                    );
                    for source in result.reached.iter() {
                        let instantiated = vec![source.clone(), to.clone()];
                        self.push_transitive_candidate(&leaf, &subst, instantiated, result.chains.get(source), &mut out);
                    }
                }
                (None, None) => {
                    // Both positions holes: every declared subject of this
                    // relation is a potential anchor; forward-reach from
                    // each and bind every reachable pair.
                    let mut subjects: HashSet<String> = HashSet::new();
                    for fact in self.kb.find_by_operator(&leaf.operator) {
                        if !fact.negated {
                            if let Some(subj) = fact.args.first() {
                                subjects.insert(subj.clone());
                            }
                        }
                    }
                    for subject in subjects {
                        let result = transitive::reach(
                            self.kb,
                            self.catalog,
                            &leaf.operator,
                            &subject,
                            max_depth,
                            &mut self.stats,
                        );
                        for target in result.reached.iter() {
                            let instantiated = vec![subject.clone(), target.clone()];
                            self.push_transitive_candidate(&leaf, &subst, instantiated, result.chains.get(target), &mut out);
                        }
                    }
                }
            }
        }

        out
    }

    /// Unify `leaf` against a transitively-derived `(subject, object)` pair
    /// and, unless the negation index blocks it, append the candidate.
    fn push_transitive_candidate(
        &mut self,
        leaf: &Leaf,
        subst: &Substitution,
        instantiated: Vec<String>,
        chain: Option<&Vec<Hop>>,
        out: &mut Vec<CandidateMatch>,
    ) {
        if let Some(s) = unify_leaf_against_values(leaf, subst, &instantiated) {
            if self.leaf_is_negated(leaf, &s) {
                self.negation_blocked = true;
                return;
            }
            out.push(CandidateMatch {
                substitution: s,
                proof: Proof {
                    kind: ProofKind::Transitive {
                        chain: chain.cloned().unwrap_or_default(),
                    },
                    depth: 1,
                    confidence: 0.9,
                },
            });
        }
    }

    fn rule_derived_match(&mut self, goal: &Goal) -> Vec<CandidateMatch> {
        let mut out = Vec::new();
        for rule in self.kb.rules().to_vec() {
            self.stats.record_rule_tried();
            for leaf in collect_conclusion_leaves(&rule.conclusion) {
                if leaf.operator != goal.operator || leaf.args.len() != goal.args.len() {
                    continue;
                }
                let mut init = Substitution::new();
                let mut ok = true;
                for (g, l) in goal.args.iter().zip(leaf.args.iter()) {
                    if !init.unify_term_term(g, l) {
                        ok = false;
                        break;
                    }
                }
                if !ok {
                    continue;
                }
                if self.timeout.check().is_err() {
                    self.stats.timed_out = true;
                    return out;
                }
                let extensions = self.prove_condition(&rule.condition, &init, 1);
                for s in extensions {
                    let instantiated: Vec<Option<String>> =
                        goal.args.iter().map(|t| s.clone().resolve(t)).collect();
                    if instantiated.iter().any(Option::is_none) {
                        continue;
                    }
                    let instantiated: Vec<String> = instantiated.into_iter().map(|v| v.unwrap()).collect();
                    if self.kb.is_negated(&goal.operator, &instantiated) {
                        self.negation_blocked = true;
                        continue;
                    }
                    out.push(CandidateMatch {
                        substitution: s,
                        proof: Proof {
                            kind: ProofKind::Rule { rule_id: rule.id },
                            depth: 1,
                            confidence: 0.8,
                        },
                    });
                }
            }
        }
        out
    }

    /// Modus-tollens contrapositive: `X` unifies with one conjunct `Ci` of a
    /// rule's condition (a top-level `And`, or a bare single leaf treated as
    /// a one-conjunct conjunction); if the rule's conclusion can be shown
    /// false and every other conjunct holds, `Not(Ci')` follows. The dual
    /// case — a conjunctive conclusion with one
    /// known-false conjunct implying the antecedent is false — is not
    /// implemented; see `DESIGN.md`.
    fn contrapositive_match(&mut self, goal: &Goal) -> Vec<CandidateMatch> {
        let mut out = Vec::new();
        let x = Leaf::new(goal.operator.clone(), goal.args.clone());
        for rule in self.kb.rules().to_vec() {
            self.stats.record_rule_tried();
            let conjuncts: Vec<Ast> = match &rule.condition {
                Ast::And(parts) => parts.clone(),
                leaf @ Ast::Leaf(_) => vec![leaf.clone()],
                _ => continue,
            };
            let conjuncts = &conjuncts[..];
            for (i, conjunct) in conjuncts.iter().enumerate() {
                let Ast::Leaf(ci) = conjunct else { continue };
                if ci.operator != x.operator || ci.args.len() != x.args.len() {
                    continue;
                }
                let mut init = Substitution::new();
                let mut ok = true;
                for (a, b) in x.args.iter().zip(ci.args.iter()) {
                    if !init.unify_term_term(a, b) {
                        ok = false;
                        break;
                    }
                }
                if !ok {
                    continue;
                }

                let concl_disproved = self.concl_is_false(&rule.conclusion, &init);
                if !concl_disproved {
                    continue;
                }

                let mut subst = init;
                let mut all_others_hold = true;
                for (j, other) in conjuncts.iter().enumerate() {
                    if i == j {
                        continue;
                    }
                    let Ast::Leaf(oj) = other else {
                        all_others_hold = false;
                        break;
                    };
                    let matches = self.match_leaf_against_facts(oj, &subst, 1);
                    if let Some(first) = matches.into_iter().next() {
                        subst = first;
                    } else {
                        all_others_hold = false;
                        break;
                    }
                }

                if all_others_hold {
                    out.push(CandidateMatch {
                        substitution: subst,
                        proof: Proof {
                            kind: ProofKind::Contrapositive { rule_id: rule.id },
                            depth: 2,
                            confidence: 0.7,
                        },
                    });
                }
            }
        }
        out
    }

    /// Whether `concl` can be shown false under `subst`: a leaf is false
    /// when its negation is on record (or, under the closed-world
    /// assumption, when no fact supports it); `And` is false as soon as any
    /// conjunct is false; `Or` is false only when every disjunct is false;
    /// `Not(inner)` is false when `inner` itself is provable.
    fn concl_is_false(&mut self, concl: &Ast, subst: &Substitution) -> bool {
        match concl {
            Ast::Leaf(l) => {
                let instantiated: Vec<Option<String>> = l.args.iter().map(|t| subst.clone().resolve(t)).collect();
                if instantiated.iter().any(Option::is_none) {
                    return false;
                }
                let instantiated: Vec<String> = instantiated.into_iter().map(|v| v.unwrap()).collect();
                if self.kb.is_negated(&l.operator, &instantiated) {
                    return true;
                }
                self.config.closed_world && self.match_leaf_against_facts(l, subst, 1).is_empty()
            }
            Ast::And(parts) => parts.iter().any(|p| self.concl_is_false(p, subst)),
            Ast::Or(parts) => parts.iter().all(|p| self.concl_is_false(p, subst)),
            Ast::Not(inner) => !self.prove_condition(inner, subst, 1).is_empty(),
            Ast::Implies { concl, .. } => self.concl_is_false(concl, subst),
        }
    }

    fn prove_condition(&mut self, ast: &Ast, subst: &Substitution, depth: u32) -> Vec<Substitution> {
        if depth > self.config.execution.limits.max_depth {
            self.stats.depth_exceeded = true;
            return Vec::new();
        }
        self.stats.observe_depth(depth);
        match ast {
            Ast::Leaf(l) => self.match_leaf_against_facts(l, subst, depth),
            Ast::And(parts) => {
                let mut acc = vec![subst.clone()];
                for part in parts {
                    let part_candidates = self.prove_condition(part, subst, depth + 1);
                    if part_candidates.is_empty() {
                        return Vec::new();
                    }
                    let mut next = Vec::new();
                    for a in &acc {
                        for c in &part_candidates {
                            if a.compatible_with(c) {
                                next.push(a.merged_with(c));
                            }
                        }
                    }
                    acc = next;
                    if acc.is_empty() {
                        return Vec::new();
                    }
                }
                acc
            }
            Ast::Or(parts) => {
                let mut out = Vec::new();
                let mut seen = HashSet::new();
                for part in parts {
                    for c in self.prove_condition(part, subst, depth + 1) {
                        if seen.insert(c.canonical_key()) {
                            out.push(c);
                        }
                    }
                }
                out
            }
            Ast::Not(inner) => {
                let sub_proofs = self.prove_condition(inner, subst, depth + 1);
                let cwa_ok = sub_proofs.is_empty() && self.config.closed_world;
                let explicit_ok = self.explicit_negation_holds(inner, subst);
                if cwa_ok || explicit_ok {
                    vec![subst.clone()]
                } else {
                    Vec::new()
                }
            }
            Ast::Implies { concl, .. } => self.prove_condition(concl, subst, depth + 1),
        }
    }

    fn explicit_negation_holds(&mut self, ast: &Ast, subst: &Substitution) -> bool {
        if let Ast::Leaf(l) = ast {
            let instantiated: Vec<Option<String>> = l.args.iter().map(|t| subst.clone().resolve(t)).collect();
            if instantiated.iter().any(Option::is_none) {
                return false;
            }
            let instantiated: Vec<String> = instantiated.into_iter().map(|v| v.unwrap()).collect();
            self.kb.is_negated(&l.operator, &instantiated)
        } else {
            false
        }
    }

    /// Match `leaf` against direct facts and, for a transitively-declared
    /// operator, against the constant-to-constant-type fallback (the
    /// typed isA closure). A single match per fact is
    /// returned per branch; callers that only need the first successful
    /// substitution (the contrapositive path's "other conjuncts") can take
    /// the head of the result.
    fn match_leaf_against_facts(&mut self, leaf: &Leaf, subst: &Substitution, depth: u32) -> Vec<Substitution> {
        let mut out = Vec::new();
        for fact in self.facts_for(leaf, subst) {
            self.stats.record_facts_scanned(1);
            if fact.negated || fact.args.len() != leaf.args.len() {
                continue;
            }
            if let Some(s) = unify_leaf_against_values(leaf, subst, &fact.args) {
                out.push(s);
                continue;
            }
            if let Some(s) = self.unify_with_type_fallback(leaf, subst, &fact.args, depth) {
                out.push(s);
            }
        }
        out
    }

    /// When L's constant is a type and the fact's arg is
    /// not identical, additionally test `reachesTransitively('isA', factArg,
    /// L-constant)`. Applied to any mismatched constant position rather
    /// than only declared-typed operators, a documented simplification
    /// (see `DESIGN.md`).
    fn unify_with_type_fallback(&mut self, leaf: &Leaf, subst: &Substitution, values: &[String], _depth: u32) -> Option<Substitution> {
        let mut s = subst.clone();
        for (term, value) in leaf.args.iter().zip(values.iter()) {
            match term {
                Term::Var(v) => {
                    if !s.bind(v, value) {
                        return None;
                    }
                }
                Term::Const(c) if c == value => {}
                Term::Const(c) => {
                    let chain = transitive::reaches_transitively(
                        self.kb,
                        self.catalog,
                        "isA",
                        value,
                        c,
                        self.config.execution.limits.transitive_max_depth,
                        &mut self.stats,
                    );
                    chain.as_ref()?;
                }
            }
        }
        Some(s)
    }

    fn facts_for(&self, leaf: &Leaf, subst: &Substitution) -> Vec<&'a Fact> {
        let resolved_arg0 = leaf.args.first().and_then(|t| subst.clone().resolve(t));
        match resolved_arg0 {
            Some(arg0) => self.kb.find_by_operator_and_arg0(&leaf.operator, &arg0),
            None => self.kb.find_by_operator(&leaf.operator),
        }
    }

    /// Resolve `leaf`'s args under `subst` and check the negation index; an
    /// unresolved (still-unbound) arg never matches an explicit negation.
    fn leaf_is_negated(&self, leaf: &Leaf, subst: &Substitution) -> bool {
        let mut s = subst.clone();
        let resolved: Vec<Option<String>> = leaf.args.iter().map(|t| s.resolve(t)).collect();
        if resolved.iter().any(Option::is_none) {
            return false;
        }
        let args: Vec<String> = resolved.into_iter().map(|v| v.unwrap()).collect();
        self.kb.is_negated(&leaf.operator, &args)
    }
}

fn fact_id_of(proof: &Proof) -> FactId {
    match proof.kind {
        ProofKind::Direct { fact_id } => fact_id,
        _ => FactId::MAX,
    }
}

/// Positionally unify `leaf`'s pattern against a fact's concrete argument
/// values, cloning `subst` rather than mutating it in place.
fn unify_leaf_against_values(leaf: &Leaf, subst: &Substitution, values: &[String]) -> Option<Substitution> {
    let mut s = subst.clone();
    for (term, value) in leaf.args.iter().zip(values.iter()) {
        if !s.unify_term(term, value) {
            return None;
        }
    }
    Some(s)
}

/// Leaf nodes in `ast` that a goal's operator can chain to: every `Leaf`
/// reachable through `And`/`Or`, never one nested inside `Not` — a leaf
/// inside a compound And/Or conclusion is fair game, but never one inside
/// a Not.
fn collect_conclusion_leaves(ast: &Ast) -> Vec<&Leaf> {
    let mut out = Vec::new();
    collect_conclusion_leaves_into(ast, &mut out);
    out
}

fn collect_conclusion_leaves_into<'a>(ast: &'a Ast, out: &mut Vec<&'a Leaf>) {
    match ast {
        Ast::Leaf(l) => out.push(l),
        Ast::And(parts) | Ast::Or(parts) => {
            for p in parts {
                collect_conclusion_leaves_into(p, out);
            }
        }
        Ast::Not(_) => {}
        Ast::Implies { concl, .. } => collect_conclusion_leaves_into(concl, out),
    }
}

/// One candidate rule instantiation for `session.abduce`:
/// the rule whose conclusion matches the observation, the bindings that
/// make it match, and what fraction of its antecedent leaves are already
/// independently confirmed in the KB.
#[derive(Debug, Clone)]
pub struct Hypothesis {
    pub rule_id: RuleId,
    pub bindings: HashMap<String, String>,
    pub support: f64,
}

/// Rank candidate explanations for `observation`: every rule whose
/// conclusion unifies with it, scored by how much of its antecedent is
/// already independently supported by KB facts.
pub fn abduce(kb: &ComponentKb, catalog: &Catalog, observation: &Goal, config: &QueryConfig, top_k: usize) -> Vec<Hypothesis> {
    let mut engine = Engine {
        kb,
        catalog,
        config,
        timeout: config.execution.timeout_controller(),
        stats: ReasoningStats::new(),
        negation_blocked: false,
    };

    let mut out = Vec::new();
    for rule in kb.rules().to_vec() {
        for leaf in collect_conclusion_leaves(&rule.conclusion) {
            if leaf.operator != observation.operator || leaf.args.len() != observation.args.len() {
                continue;
            }
            let mut init = Substitution::new();
            let mut ok = true;
            for (g, l) in observation.args.iter().zip(leaf.args.iter()) {
                if !init.unify_term_term(g, l) {
                    ok = false;
                    break;
                }
            }
            if !ok {
                continue;
            }

            let leaves = collect_condition_leaves(&rule.condition);
            if leaves.is_empty() {
                continue;
            }
            let confirmed = leaves
                .iter()
                .filter(|cl| !engine.match_leaf_against_facts(cl, &init, 1).is_empty())
                .count();
            let support = confirmed as f64 / leaves.len() as f64;
            let bindings = init.flattened().into_iter().collect();
            out.push(Hypothesis { rule_id: rule.id, bindings, support });
        }
    }

    out.sort_by(|a, b| b.support.partial_cmp(&a.support).unwrap_or(std::cmp::Ordering::Equal).then(a.rule_id.cmp(&b.rule_id)));
    out.truncate(top_k);
    out
}

fn collect_condition_leaves(ast: &Ast) -> Vec<&Leaf> {
    match ast {
        Ast::Leaf(l) => vec![l],
        Ast::And(parts) | Ast::Or(parts) => parts.iter().flat_map(collect_condition_leaves).collect(),
        Ast::Not(inner) => collect_condition_leaves(inner),
        Ast::Implies { concl, .. } => collect_condition_leaves(concl),
    }
}
