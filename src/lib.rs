//! # Hyperdimensional knowledge-reasoning engine
//!
//! A session-scoped symbolic/holographic reasoning kernel: statements are
//! parsed into a tagged-union AST, encoded into dense binary hypervectors
//! for approximate/holographic recall, and also stored symbolically in an
//! append-only Component Knowledge Base for exact backward-chaining proof
//! search.
//!
//! ## Pipeline
//!
//! ```text
//! DSL source text
//!     ↓
//! [dsl]                 → Ast (statement / rule)
//!     ↓
//! [ast] + [vocabulary]  → canonical Term/Leaf/Ast shapes, name→atom mapping
//!     ↓
//! [encode] + [hdc]      → dense binary Vector (L0-L3)
//!     ↓
//! [kb]                  → ComponentKb: Facts, Rules, indices, negation set
//!     ↓
//! [catalog] + [bloom_filter] + [statistics]  → operator metadata, fast-reject, counters
//!     ↓
//! [transitive] + [unify] → BFS closure, first-order substitution
//!     ↓
//! [query] + [meta_operators] → backward chaining, abduction, KB-wide aggregates
//!     ↓
//! [session]             → Session: learn / query / prove / abduce / findAll / elaborate
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sys2_core::{Session, SessionOptions};
//!
//! let mut session = Session::new(SessionOptions::default())?;
//! session.learn("isA Socrates Human\nisA Human Mammal");
//! let proof = session.prove("isA Socrates Mammal")?;
//! assert!(proof.valid);
//! ```
//!
//! ## Module organization
//!
//! | Module | Layer | Purpose |
//! |--------|-------|---------|
//! | `hdc` | L0-L1 | Dense binary vectors, strategy contract, per-session context |
//! | `vocabulary` | L2 | Name → atom mapping, reserved core atoms |
//! | `ast` | L3 | Tagged-union statement/rule AST |
//! | `encode` | L3 | Canonical statement → vector encoding |
//! | `bloom_filter` | L4 | Probabilistic fast-reject for the negation index |
//! | `statistics` | L4/L6 | Reasoning pass counters |
//! | `catalog` | L4 | Declared operator arities and semantic tags |
//! | `kb` | L4 | Component Knowledge Base: Facts, Rules, indices |
//! | `transitive` | L5 | Bounded BFS transitive closure |
//! | `unify` | L5 | First-order unification / substitution |
//! | `execution` | L5 | Cooperative timeout and depth/node budgets |
//! | `query` | L6 | Backward-chaining query engine, abduction |
//! | `meta_operators` | L7 | similar/induce/bundle/difference/analogy/deduce |
//! | `dsl` | L6 | Statement DSL parser |
//! | `session` | L8 | `Session`: the external interface |
//! | `config` | - | `SessionOptions`, file/env configuration |
//! | `error` | - | `SysError` taxonomy |

pub mod ast;
pub mod bloom_filter;
pub mod catalog;
pub mod config;
pub mod dsl;
pub mod encode;
pub mod error;
pub mod execution;
pub mod hdc;
pub mod kb;
pub mod meta_operators;
pub mod query;
pub mod session;
pub mod statistics;
pub mod transitive;
pub mod unify;
pub mod vocabulary;

pub use ast::{Ast, AstVisitor, Leaf, LeafBuilder, Term};
pub use catalog::{Catalog, OperatorEntry};
pub use config::{Config, LoggingConfig, ReasoningPriority, ReasoningProfile, SessionOptions, StrategyKind};
pub use error::{SysError, SysResult};
pub use hdc::{DenseBinaryStrategy, HdcContext, Strategy, StrategyRegistry, Vector};
pub use kb::{ComponentKb, Fact, FactId, IngestOutcome, Rule, RuleId};
pub use meta_operators::{DeducedFact, DifferenceEntry, Property, SimilarMatch};
pub use query::{Goal, Hypothesis, Proof, ProofKind, QueryConfig, QueryMode, QueryResult};
pub use session::{AbduceResult, LearnResult, ProofResult, QueryOutcome, Session, SessionHandle};
pub use vocabulary::Vocabulary;
