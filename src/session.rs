//! # Session
//!
//! The library's single entry point: owns one theory's `Vocabulary`,
//! `ComponentKb`, and operator `Catalog` behind an `HdcContext` bound at
//! construction. `learn` ingests DSL statements; `query`/`prove`/`abduce`/
//! `find_all` run the query engine or a meta-operator; `elaborate` renders a
//! recorded proof as text; `explain_config` reports the effective
//! configuration as a one-line self-description.

use std::sync::Arc;

use crate::ast::{Ast, Term};
use crate::catalog::{Catalog, OperatorEntry};
use crate::config::{ReasoningProfile, SessionOptions};
use crate::dsl;
use crate::error::{SysError, SysResult};
use crate::hdc::{DenseBinaryStrategy, HdcContext, StrategyRegistry};
use crate::kb::{ComponentKb, IngestOutcome};
use crate::meta_operators::{self, DeducedFact, DifferenceEntry, SimilarMatch};
use crate::query::{self, Goal, Hypothesis, Proof, QueryConfig, QueryResult};
use crate::vocabulary::Vocabulary;

/// Result of one `learn` call. Partial success is expected:
/// a malformed statement never aborts the rest of the batch.
#[derive(Debug, Clone, Default)]
pub struct LearnResult {
    pub success: bool,
    pub errors: Vec<(usize, String)>,
    pub facts_added: usize,
    pub rules_added: usize,
}

/// Outcome of `Session::query`/`find_all`, split by which proof strategy
/// answered it. The meta-operator shapes carry their own structured results
/// rather than being squeezed into the symbolic `QueryResult` shape.
#[derive(Debug, Clone)]
pub enum QueryOutcome {
    Symbolic(QueryResult),
    Similar(Vec<SimilarMatch>),
    Induce(Vec<(String, String)>),
    Bundle(Vec<(String, String)>),
    Difference(Vec<DifferenceEntry>),
    Analogy(Vec<String>),
    Deduce(Vec<DeducedFact>),
}

#[derive(Debug, Clone)]
pub struct ProofResult {
    pub valid: bool,
    pub proof: Option<Proof>,
    pub timed_out: bool,
    pub reason: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AbduceResult {
    pub hypotheses: Vec<Hypothesis>,
}

/// Default operator pack preloaded under `ReasoningProfile::TheoryDriven`
/// (the declared operator packs); `Bare` preloads nothing
/// beyond the reserved core markers `Vocabulary::preload_core` installs.
fn declare_default_pack(catalog: &mut Catalog) {
    catalog.declare("isA", OperatorEntry::relation(2).transitive());
    catalog.declare("causes", OperatorEntry::relation(2).transitive());
    for relation in ["has", "can", "likes", "knows", "owns", "uses"] {
        catalog.declare(relation, OperatorEntry::relation(2));
    }
}

pub struct Session {
    options: SessionOptions,
    ctx: HdcContext,
    vocabulary: Vocabulary,
    kb: ComponentKb,
    catalog: Catalog,
}

impl Session {
    /// Construct a session. Never reads the environment;
    /// callers that want `SYS2_*` overrides build `options` via
    /// `SessionOptions::from_env()` first.
    pub fn new(options: SessionOptions) -> SysResult<Self> {
        let registry = StrategyRegistry::new();
        registry.register(Arc::new(DenseBinaryStrategy::new()));
        let ctx = HdcContext::new(&registry, options.strategy.id(), options.geometry)?;

        let mut vocabulary = Vocabulary::new("default", options.geometry);
        let mut catalog = Catalog::new();

        if options.auto_load_core {
            vocabulary.preload_core(&ctx, crate::config::CORE_POSITION_COUNT)?;
            if options.reasoning_profile == ReasoningProfile::TheoryDriven {
                declare_default_pack(&mut catalog);
            }
        }

        Ok(Session {
            options,
            ctx,
            vocabulary,
            kb: ComponentKb::new(),
            catalog,
        })
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub fn kb(&self) -> &ComponentKb {
        &self.kb
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    fn query_config(&self) -> QueryConfig {
        QueryConfig {
            mode: query::QueryMode::Query,
            execution: crate::execution::ExecutionConfig::default()
                .with_timeout(std::time::Duration::from_millis(self.options.reasoning_timeout_ms as u64))
                .with_max_depth(self.options.max_proof_depth)
                .with_transitive_max_depth(self.options.transitive_depth),
            closed_world: self.options.closed_world_assumption,
        }
    }

    /// Ingest one or more DSL statements. Annotated
    /// statements (`@name ...`) bind a name for `$ref` composition and are
    /// never ingested on their own; only unannotated top-level statements
    /// become KB facts or rules (see `dsl` module doc and `DESIGN.md`).
    pub fn learn(&mut self, source: &str) -> LearnResult {
        let mut result = LearnResult { success: true, ..Default::default() };
        tracing::debug!(lines = source.lines().count(), "learn_started");

        for (index, parsed) in dsl::parse_program(source) {
            let stmt = match parsed {
                Ok(stmt) => stmt,
                Err(e) => {
                    result.success = false;
                    result.errors.push((index, e.to_string()));
                    continue;
                }
            };

            if stmt.annotation.is_some() {
                continue;
            }

            if let Err(e) = self.validate_operators(&stmt.ast) {
                result.success = false;
                result.errors.push((index, e.to_string()));
                continue;
            }

            if self.options.reject_contradictions {
                if let Some(e) = self.contradiction(&stmt.ast) {
                    result.success = false;
                    result.errors.push((index, e.to_string()));
                    continue;
                }
            }

            match self.kb.ingest(&self.ctx, &mut self.vocabulary, stmt.ast, None, crate::config::CORE_POSITION_COUNT) {
                Ok(IngestOutcome::Fact(_)) => result.facts_added += 1,
                Ok(IngestOutcome::Rule(_)) => result.rules_added += 1,
                Err(e) => {
                    result.success = false;
                    result.errors.push((index, e.to_string()));
                }
            }
        }

        tracing::info!(
            facts_added = result.facts_added,
            rules_added = result.rules_added,
            errors = result.errors.len(),
            "learn_finished"
        );
        result
    }

    /// Every leaf operator reachable in `ast` (both sides of an `Implies`,
    /// unlike `Ast::leaf_operators` which is scoped to a rule's conclusion
    /// for chaining purposes) must resolve against the catalog.
    fn validate_operators(&mut self, ast: &Ast) -> SysResult<()> {
        for (operator, arity) in leaf_operator_arities(ast) {
            self.catalog
                .resolve(operator, arity, self.options.auto_declare_unknown_operators)?;
        }
        Ok(())
    }

    /// The contradiction check, applied symmetrically: a
    /// positive statement conflicting with a stored negation, or a negation
    /// conflicting with a stored positive fact.
    fn contradiction(&self, ast: &Ast) -> Option<SysError> {
        match ast {
            Ast::Not(inner) => {
                let (operator, args) = ground_leaf(inner)?;
                let arg0 = args.first()?;
                let exists = self
                    .kb
                    .find_by_operator_and_arg0(&operator, arg0)
                    .into_iter()
                    .any(|f| !f.negated && f.args == args);
                exists.then(|| SysError::Contradiction { operator, args: args.join(",") })
            }
            _ => {
                let (operator, args) = ground_leaf(ast)?;
                self.kb
                    .is_negated(&operator, &args)
                    .then(|| SysError::Contradiction { operator, args: args.join(",") })
            }
        }
    }

    /// `session.query(goal)`: direct/rule/contrapositive
    /// strategies for a symbolic goal, or dispatch to a meta-operator.
    pub fn query(&self, goal: &str) -> SysResult<QueryOutcome> {
        self.run_query(goal)
    }

    /// `session.find_all`: identical strategy set to `query`, explicit
    /// `FindAll` mode for callers that want every distinct binding rather
    /// than just the best one.
    pub fn find_all(&self, goal: &str) -> SysResult<QueryOutcome> {
        self.run_query(goal)
    }

    fn run_query(&self, goal: &str) -> SysResult<QueryOutcome> {
        tracing::debug!(goal, "query_started");
        let parsed = parse_goal(goal)?;

        if !parsed.negate && meta_operators::is_meta_operator(&parsed.operator) {
            return Ok(self.dispatch_meta(&parsed));
        }

        let result = query::query(&self.kb, &self.catalog, &parsed, &self.query_config());
        Ok(QueryOutcome::Symbolic(result))
    }

    fn dispatch_meta(&self, goal: &Goal) -> QueryOutcome {
        let args: Vec<String> = goal.args.iter().filter_map(|t| t.as_const().map(str::to_string)).collect();
        match goal.operator.as_str() {
            "similar" => QueryOutcome::Similar(meta_operators::similar(&self.kb, args.first().map(String::as_str).unwrap_or(""), 10)),
            "induce" => QueryOutcome::Induce(meta_operators::induce(&self.kb, &args)),
            "bundle" => QueryOutcome::Bundle(meta_operators::bundle(&self.kb, &args)),
            "difference" => {
                let a = args.first().cloned().unwrap_or_default();
                let b = args.get(1).cloned().unwrap_or_default();
                QueryOutcome::Difference(meta_operators::difference(&self.kb, &a, &b))
            }
            "analogy" => {
                let a = args.first().cloned().unwrap_or_default();
                let b = args.get(1).cloned().unwrap_or_default();
                let c = args.get(2).cloned().unwrap_or_default();
                QueryOutcome::Analogy(meta_operators::analogy(&self.kb, &a, &b, &c))
            }
            "deduce" => {
                let source = args.first().cloned().unwrap_or_default();
                let filter = args.get(1).cloned();
                QueryOutcome::Deduce(meta_operators::deduce(
                    &self.kb,
                    &self.catalog,
                    &source,
                    filter.as_deref(),
                    self.options.transitive_depth,
                    10,
                ))
            }
            other => unreachable!("not a meta-operator: {other}"),
        }
    }

    /// `session.prove(goal)`: boolean outcome with a trace,
    /// for a purely symbolic goal (meta-operators are never a "proof").
    pub fn prove(&self, goal: &str) -> SysResult<ProofResult> {
        let parsed = parse_goal(goal)?;
        let result = query::query(&self.kb, &self.catalog, &parsed, &self.query_config());
        Ok(ProofResult {
            valid: result.success,
            proof: result.all_results.first().map(|(_, p)| p.clone()),
            timed_out: result.timed_out,
            reason: result.reason,
        })
    }

    /// `session.abduce(observation)`: rank rules whose
    /// conclusion explains `observation`.
    pub fn abduce(&self, observation: &str) -> SysResult<AbduceResult> {
        let parsed = parse_goal(observation)?;
        let hypotheses = query::abduce(&self.kb, &self.catalog, &parsed, &self.query_config(), 10);
        Ok(AbduceResult { hypotheses })
    }

    /// Attach a textual proof trail to a query outcome; the
    /// detailed natural-language rendering itself is left to an external
    /// collaborator, but the structural summary below is stable.
    pub fn elaborate(&self, outcome: &QueryOutcome) -> String {
        match outcome {
            QueryOutcome::Symbolic(result) => elaborate_symbolic(result),
            QueryOutcome::Similar(matches) => matches
                .iter()
                .map(|m| format!("{} (score {:.2}, shared {:?})", m.candidate, m.score, m.shared))
                .collect::<Vec<_>>()
                .join("\n"),
            QueryOutcome::Induce(props) | QueryOutcome::Bundle(props) => {
                props.iter().map(|(op, val)| format!("{op}({val})")).collect::<Vec<_>>().join("\n")
            }
            QueryOutcome::Difference(entries) => entries
                .iter()
                .map(|e| format!("{}: {}({})", e.source, e.property.0, e.property.1))
                .collect::<Vec<_>>()
                .join("\n"),
            QueryOutcome::Analogy(values) => values.join(", "),
            QueryOutcome::Deduce(facts) => facts
                .iter()
                .map(|f| format!("{}({}) score={:.2} via {:?}", f.operator, f.args.join(","), f.score, f.chain))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }

    /// A human-readable summary of the effective configuration, as a
    /// single `key=value ...` line suitable for a log line or REPL banner.
    pub fn explain_config(&self) -> String {
        format!(
            "strategy={} geometry={} closed_world={} reject_contradictions={} priority={:?} timeout_ms={} max_depth={} profile={:?} auto_declare_unknown_operators={} transitive_depth={} facts={} rules={} vocabulary={}",
            self.options.strategy.id(),
            self.options.geometry,
            self.options.closed_world_assumption,
            self.options.reject_contradictions,
            self.options.reasoning_priority,
            self.options.reasoning_timeout_ms,
            self.options.max_proof_depth,
            self.options.reasoning_profile,
            self.options.auto_declare_unknown_operators,
            self.options.transitive_depth,
            self.kb.fact_count(),
            self.kb.rule_count(),
            self.vocabulary.len(),
        )
    }
}

/// A `Session` is not thread-safe on its own: concurrent
/// `learn` calls, or reads mixed with writes, need external synchronization.
/// `SessionHandle` is that external lock: a `parking_lot::RwLock`-guarded
/// `Session` where a query holds a read guard for its duration and
/// `learn` takes a write guard.
#[derive(Clone)]
pub struct SessionHandle(Arc<parking_lot::RwLock<Session>>);

impl SessionHandle {
    pub fn new(session: Session) -> Self {
        SessionHandle(Arc::new(parking_lot::RwLock::new(session)))
    }

    pub fn learn(&self, source: &str) -> LearnResult {
        self.0.write().learn(source)
    }

    pub fn query(&self, goal: &str) -> SysResult<QueryOutcome> {
        self.0.read().query(goal)
    }

    pub fn prove(&self, goal: &str) -> SysResult<ProofResult> {
        self.0.read().prove(goal)
    }

    pub fn abduce(&self, observation: &str) -> SysResult<AbduceResult> {
        self.0.read().abduce(observation)
    }
}

fn elaborate_symbolic(result: &QueryResult) -> String {
    if !result.success {
        return format!("unprovable: {}", result.reason.clone().unwrap_or_default());
    }
    result
        .all_results
        .iter()
        .map(|(bindings, proof)| {
            let mut pairs: Vec<String> = bindings.iter().map(|(k, v)| format!("{k}={v}")).collect();
            pairs.sort();
            format!("{} via {:?} (depth {}, confidence {:.2})", pairs.join(","), proof.kind, proof.depth, proof.confidence)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// `(operator, constant_args)` for a ground leaf, or `None` for anything
/// with a variable or a non-leaf shape — a contradiction check only
/// applies to fully-instantiated statements.
fn ground_leaf(ast: &Ast) -> Option<(String, Vec<String>)> {
    match ast {
        Ast::Leaf(l) if !l.has_variables() => {
            Some((l.operator.clone(), l.args.iter().map(|t| t.as_const().unwrap().to_string()).collect()))
        }
        Ast::Implies { concl, .. } => ground_leaf(concl),
        _ => None,
    }
}

fn leaf_operator_arities(ast: &Ast) -> Vec<(&str, usize)> {
    match ast {
        Ast::Leaf(l) => vec![(l.operator.as_str(), l.arity())],
        Ast::And(parts) | Ast::Or(parts) => parts.iter().flat_map(leaf_operator_arities).collect(),
        Ast::Not(inner) => leaf_operator_arities(inner),
        Ast::Implies { cond, concl } => {
            let mut out = leaf_operator_arities(cond);
            out.extend(leaf_operator_arities(concl));
            out
        }
    }
}

/// A query goal is simpler than a full DSL statement: `("Not")? operator
/// arg*` with no annotations or `$refs` — the `query`/`prove`
/// surface works over already-composed goal strings, not the learn DSL.
fn parse_goal(source: &str) -> SysResult<Goal> {
    let tokens: Vec<&str> = source.split_whitespace().collect();
    if tokens.is_empty() {
        return Err(SysError::Parse { index: 0, message: "empty goal".to_string() });
    }
    let mut pos = 0;
    let negate = if tokens[0] == "Not" {
        pos += 1;
        true
    } else {
        false
    };
    if pos >= tokens.len() {
        return Err(SysError::Parse { index: 0, message: "goal has no operator".to_string() });
    }
    let operator = tokens[pos].to_string();
    pos += 1;
    let args = tokens[pos..]
        .iter()
        .map(|t| match t.strip_prefix('?') {
            Some(name) => Term::Var(name.to_string()),
            None => Term::Const(t.to_string()),
        })
        .collect();
    Ok(Goal { operator, args, negate })
}
