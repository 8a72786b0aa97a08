//! # Component Knowledge Base (L4)
//!
//! The authoritative symbolic store for one session: an append-only arena
//! of `Fact`s and `Rule`s plus O(1) indices by operator, by first argument,
//! and by the `(operator, arg0)` pair. A `Not(base)` statement is stored as
//! a negated `Fact` and also recorded in the negation index; a ground
//! `Implies` is a degenerate fact; an `Implies` containing a variable is a
//! `Rule` and never appears in the operator indices.

use std::collections::{HashMap, HashSet};

use crate::ast::Ast;
use crate::bloom_filter::BloomFilter;
use crate::encode::encode_ast;
use crate::error::SysResult;
use crate::hdc::{HdcContext, Vector};
use crate::vocabulary::Vocabulary;

pub type FactId = u64;
pub type RuleId = u64;

/// A single row in the Component KB. Append-only: a
/// retracted fact is tombstoned, never removed, so ids stay monotone and
/// stable for anything that recorded them in a proof trail.
#[derive(Debug, Clone)]
pub struct Fact {
    pub id: FactId,
    pub name: Option<String>,
    pub operator: String,
    pub args: Vec<String>,
    pub vector: Vector,
    pub negated: bool,
    pub tombstoned: bool,
}

impl Fact {
    pub fn key(&self) -> (&str, &[String]) {
        (self.operator.as_str(), self.args.as_slice())
    }
}

/// A rule arena entry. `condition`/`conclusion` double as
/// the canonical AST used for encoding and the tree view the query engine
/// walks — naming the antecedent and consequent parts by role.
#[derive(Debug, Clone)]
pub struct Rule {
    pub id: RuleId,
    pub name: Option<String>,
    pub condition: Ast,
    pub conclusion: Ast,
    pub has_variables: bool,
}

/// Outcome of ingesting one parsed statement, for the caller (`Session::learn`)
/// to aggregate into a batch `LearnResult`.
#[derive(Debug, Clone)]
pub enum IngestOutcome {
    Fact(FactId),
    Rule(RuleId),
}

fn negation_key(operator: &str, args: &[String]) -> String {
    let mut key = String::with_capacity(operator.len() + args.iter().map(|a| a.len() + 1).sum::<usize>());
    key.push_str(operator);
    for a in args {
        key.push(':');
        key.push_str(a);
    }
    key
}

#[derive(Default)]
pub struct ComponentKb {
    facts: Vec<Fact>,
    rules: Vec<Rule>,
    by_operator: HashMap<String, Vec<FactId>>,
    by_arg0: HashMap<String, Vec<FactId>>,
    by_operator_and_arg0: HashMap<(String, String), Vec<FactId>>,
    by_id: HashMap<FactId, usize>,
    negation_keys: HashSet<String>,
    negation_bloom: BloomFilter,
    next_fact_id: FactId,
    next_rule_id: RuleId,
}

impl ComponentKb {
    pub fn new() -> Self {
        ComponentKb {
            negation_bloom: BloomFilter::new(1024, 0.01),
            ..Default::default()
        }
    }

    /// Ingest one already-parsed statement (classification
    /// rules): plain leaf/compound → `Fact`; `Not(base)` → negated `Fact`
    /// plus a negation-index entry; `Implies` with a variable → `Rule`;
    /// ground `Implies` → degenerate `Fact`.
    pub fn ingest(
        &mut self,
        ctx: &HdcContext,
        vocab: &mut Vocabulary,
        ast: Ast,
        name: Option<String>,
        position_count: usize,
    ) -> SysResult<IngestOutcome> {
        match &ast {
            Ast::Implies { .. } if ast.has_variables() => {
                let (cond, concl) = match ast {
                    Ast::Implies { cond, concl } => (*cond, *concl),
                    _ => unreachable!(),
                };
                let id = self.next_rule_id;
                self.next_rule_id += 1;
                self.rules.push(Rule {
                    id,
                    name,
                    has_variables: true,
                    condition: cond,
                    conclusion: concl,
                });
                Ok(IngestOutcome::Rule(id))
            }
            Ast::Not(inner) => {
                let (operator, args) = leaf_key(inner);
                let vector = encode_ast(ctx, vocab, &ast, position_count)?;
                let id = self.push_fact(operator.clone(), args.clone(), vector, name, true);
                let key = negation_key(&operator, &args);
                self.negation_bloom.insert(&key);
                self.negation_keys.insert(key);
                Ok(IngestOutcome::Fact(id))
            }
            _ => {
                let (operator, args) = leaf_key(&ast);
                let vector = encode_ast(ctx, vocab, &ast, position_count)?;
                let id = self.push_fact(operator, args, vector, name, false);
                Ok(IngestOutcome::Fact(id))
            }
        }
    }

    fn push_fact(&mut self, operator: String, args: Vec<String>, vector: Vector, name: Option<String>, negated: bool) -> FactId {
        let id = self.next_fact_id;
        self.next_fact_id += 1;
        self.by_operator.entry(operator.clone()).or_default().push(id);
        if let Some(arg0) = args.first() {
            self.by_arg0.entry(arg0.clone()).or_default().push(id);
            self.by_operator_and_arg0
                .entry((operator.clone(), arg0.clone()))
                .or_default()
                .push(id);
        }
        self.by_id.insert(id, self.facts.len());
        self.facts.push(Fact {
            id,
            name,
            operator,
            args,
            vector,
            negated,
            tombstoned: false,
        });
        id
    }

    /// Soft-delete: marks the fact tombstoned without reusing its id or
    /// compacting the arena.
    pub fn retract(&mut self, id: FactId) -> bool {
        if let Some(&idx) = self.by_id.get(&id) {
            self.facts[idx].tombstoned = true;
            true
        } else {
            false
        }
    }

    fn live<'a>(&'a self, ids: &'a [FactId]) -> impl Iterator<Item = &'a Fact> {
        ids.iter()
            .filter_map(move |id| self.by_id.get(id).map(|&idx| &self.facts[idx]))
            .filter(|f| !f.tombstoned)
    }

    pub fn find_by_operator(&self, operator: &str) -> Vec<&Fact> {
        match self.by_operator.get(operator) {
            Some(ids) => self.live(ids).collect(),
            None => Vec::new(),
        }
    }

    pub fn find_by_arg0(&self, arg0: &str) -> Vec<&Fact> {
        match self.by_arg0.get(arg0) {
            Some(ids) => self.live(ids).collect(),
            None => Vec::new(),
        }
    }

    pub fn find_by_operator_and_arg0(&self, operator: &str, arg0: &str) -> Vec<&Fact> {
        match self.by_operator_and_arg0.get(&(operator.to_string(), arg0.to_string())) {
            Some(ids) => self.live(ids).collect(),
            None => Vec::new(),
        }
    }

    /// `(operator, args)` membership in the negation index, Bloom-fronted
    /// for the fast-reject path.
    pub fn is_negated(&self, operator: &str, args: &[String]) -> bool {
        let key = negation_key(operator, args);
        if !self.negation_bloom.might_contain(&key) {
            return false;
        }
        self.negation_keys.contains(&key)
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn fact_count(&self) -> usize {
        self.facts.iter().filter(|f| !f.tombstoned).count()
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    pub fn get_fact(&self, id: FactId) -> Option<&Fact> {
        self.by_id.get(&id).map(|&idx| &self.facts[idx]).filter(|f| !f.tombstoned)
    }

    /// Every live (non-tombstoned) fact, in ascending id order, for bulk
    /// export.
    pub fn facts(&self) -> impl Iterator<Item = &Fact> {
        self.facts.iter().filter(|f| !f.tombstoned)
    }

    /// Re-insert a fact produced by an earlier `serializeKB` export,
    /// preserving its original id and updating the indices and negation set
    /// exactly as `ingest` would have.
    /// Callers restore facts in ascending id order so `next_fact_id` stays
    /// monotone.
    pub fn restore_fact(&mut self, id: FactId, name: Option<String>, operator: String, args: Vec<String>, vector: Vector, negated: bool) {
        self.by_operator.entry(operator.clone()).or_default().push(id);
        if let Some(arg0) = args.first() {
            self.by_arg0.entry(arg0.clone()).or_default().push(id);
            self.by_operator_and_arg0
                .entry((operator.clone(), arg0.clone()))
                .or_default()
                .push(id);
        }
        if negated {
            let key = negation_key(&operator, &args);
            self.negation_bloom.insert(&key);
            self.negation_keys.insert(key);
        }
        self.by_id.insert(id, self.facts.len());
        self.facts.push(Fact {
            id,
            name,
            operator,
            args,
            vector,
            negated,
            tombstoned: false,
        });
        self.next_fact_id = self.next_fact_id.max(id + 1);
    }
}

fn leaf_key(ast: &Ast) -> (String, Vec<String>) {
    match ast {
        Ast::Leaf(leaf) => (
            leaf.operator.clone(),
            leaf.args
                .iter()
                .map(|t| t.as_const().unwrap_or_default().to_string())
                .collect(),
        ),
        Ast::Not(inner) => leaf_key(inner),
        Ast::And(_) | Ast::Or(_) | Ast::Implies { .. } => (String::new(), Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::LeafBuilder;
    use crate::hdc::{DenseBinaryStrategy, StrategyRegistry};
    use std::sync::Arc;

    fn setup() -> (HdcContext, Vocabulary) {
        let reg = StrategyRegistry::new();
        reg.register(Arc::new(DenseBinaryStrategy::new()));
        let ctx = HdcContext::new(&reg, "dense-binary", 8192).unwrap();
        let mut vocab = Vocabulary::new("T", 8192);
        vocab.preload_core(&ctx, 20).unwrap();
        (ctx, vocab)
    }

    #[test]
    fn plain_leaf_is_indexed_by_operator_and_arg0() {
        let (ctx, mut vocab) = setup();
        let mut kb = ComponentKb::new();
        let ast = LeafBuilder::new("isA").arg("Socrates").arg("Human").build_ast();
        kb.ingest(&ctx, &mut vocab, ast, None, 20).unwrap();
        assert_eq!(kb.find_by_operator("isA").len(), 1);
        assert_eq!(kb.find_by_arg0("Socrates").len(), 1);
        assert_eq!(kb.find_by_operator_and_arg0("isA", "Socrates").len(), 1);
    }

    #[test]
    fn not_statement_marks_negated_and_indexes_negation() {
        let (ctx, mut vocab) = setup();
        let mut kb = ComponentKb::new();
        let ast = Ast::Not(Box::new(LeafBuilder::new("isA").arg("Tweety").arg("Flyer").build_ast()));
        kb.ingest(&ctx, &mut vocab, ast, None, 20).unwrap();
        assert!(kb.is_negated("isA", &["Tweety".to_string(), "Flyer".to_string()]));
        assert!(!kb.is_negated("isA", &["Tweety".to_string(), "Mammal".to_string()]));
    }

    #[test]
    fn implies_with_variable_becomes_a_rule_not_a_fact() {
        let (ctx, mut vocab) = setup();
        let mut kb = ComponentKb::new();
        let ast = Ast::Implies {
            cond: Box::new(LeafBuilder::new("isA").var("x").arg("Human").build_ast()),
            concl: Box::new(LeafBuilder::new("mortal").var("x").build_ast()),
        };
        let outcome = kb.ingest(&ctx, &mut vocab, ast, None, 20).unwrap();
        assert!(matches!(outcome, IngestOutcome::Rule(_)));
        assert_eq!(kb.rule_count(), 1);
        assert_eq!(kb.fact_count(), 0);
    }

    #[test]
    fn ground_implies_is_a_degenerate_fact() {
        let (ctx, mut vocab) = setup();
        let mut kb = ComponentKb::new();
        let ast = Ast::Implies {
            cond: Box::new(LeafBuilder::new("isA").arg("Socrates").arg("Human").build_ast()),
            concl: Box::new(LeafBuilder::new("mortal").arg("Socrates").build_ast()),
        };
        let outcome = kb.ingest(&ctx, &mut vocab, ast, None, 20).unwrap();
        assert!(matches!(outcome, IngestOutcome::Fact(_)));
        assert_eq!(kb.rule_count(), 0);
    }

    #[test]
    fn retract_tombstones_without_reusing_ids() {
        let (ctx, mut vocab) = setup();
        let mut kb = ComponentKb::new();
        let ast = LeafBuilder::new("isA").arg("Socrates").arg("Human").build_ast();
        let id = match kb.ingest(&ctx, &mut vocab, ast, None, 20).unwrap() {
            IngestOutcome::Fact(id) => id,
            _ => unreachable!(),
        };
        assert!(kb.retract(id));
        assert_eq!(kb.fact_count(), 0);
        assert!(kb.get_fact(id).is_none());

        let ast2 = LeafBuilder::new("isA").arg("Plato").arg("Human").build_ast();
        let id2 = match kb.ingest(&ctx, &mut vocab, ast2, None, 20).unwrap() {
            IngestOutcome::Fact(id) => id,
            _ => unreachable!(),
        };
        assert_eq!(id2, id + 1);
    }
}
