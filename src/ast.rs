//! # Statement AST (L3)
//!
//! The tagged union every DSL statement and rule pattern is parsed into.
//! `Term` distinguishes constants from variables; `Ast` is the recursive
//! compound tree — a single representation serves both the canonical
//! vector encoding and the condition-matching tree the query engine walks
//! (a rule's condition/conclusion are this same shape, named by role at
//! the `Rule` call site).

use std::collections::HashSet;

/// A single argument position: a bound constant or a logic variable.
/// Variable names carry their `?` sigil so printing round-trips; look it up
/// once at the parser boundary rather than re-stripping it everywhere.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Term {
    Const(String),
    Var(String),
}

impl Term {
    pub fn is_var(&self) -> bool {
        matches!(self, Term::Var(_))
    }

    pub fn as_var(&self) -> Option<&str> {
        match self {
            Term::Var(name) => Some(name),
            Term::Const(_) => None,
        }
    }

    pub fn as_const(&self) -> Option<&str> {
        match self {
            Term::Const(name) => Some(name),
            Term::Var(_) => None,
        }
    }
}

/// A leaf statement: `operator arg1 .. argk`, optionally named via `@name`
/// for later `$ref` lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct Leaf {
    pub operator: String,
    pub args: Vec<Term>,
    pub name: Option<String>,
}

impl Leaf {
    pub fn new(operator: impl Into<String>, args: Vec<Term>) -> Self {
        Leaf {
            operator: operator.into(),
            args,
            name: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn arity(&self) -> usize {
        self.args.len()
    }

    pub fn variables(&self) -> HashSet<&str> {
        self.args.iter().filter_map(Term::as_var).collect()
    }

    pub fn has_variables(&self) -> bool {
        self.args.iter().any(Term::is_var)
    }
}

/// The recursive compound tree. A bare `Leaf` is itself a well-formed `Ast`;
/// `And`/`Or`/`Not` compose leaves and other compounds; `Implies` is the
/// top of a rule statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Ast {
    Leaf(Leaf),
    And(Vec<Ast>),
    Or(Vec<Ast>),
    Not(Box<Ast>),
    Implies { cond: Box<Ast>, concl: Box<Ast> },
}

impl Ast {
    pub fn leaf(operator: impl Into<String>, args: Vec<Term>) -> Self {
        Ast::Leaf(Leaf::new(operator, args))
    }

    /// The outermost operator name, used when matching a compound
    /// conclusion's "possibly a leaf inside And/Or" rule-chaining shape.
    /// `None` for `And`/`Or`/`Implies`, which have no single operator.
    pub fn operator(&self) -> Option<&str> {
        match self {
            Ast::Leaf(l) => Some(&l.operator),
            Ast::Not(inner) => inner.operator(),
            Ast::And(_) | Ast::Or(_) | Ast::Implies { .. } => None,
        }
    }

    pub fn variables(&self) -> HashSet<&str> {
        let mut vars = HashSet::new();
        self.collect_variables(&mut vars);
        vars
    }

    fn collect_variables<'a>(&'a self, out: &mut HashSet<&'a str>) {
        match self {
            Ast::Leaf(l) => out.extend(l.variables()),
            Ast::And(parts) | Ast::Or(parts) => {
                for p in parts {
                    p.collect_variables(out);
                }
            }
            Ast::Not(inner) => inner.collect_variables(out),
            Ast::Implies { cond, concl } => {
                cond.collect_variables(out);
                concl.collect_variables(out);
            }
        }
    }

    pub fn has_variables(&self) -> bool {
        !self.variables().is_empty()
    }

    /// Every leaf operator name reachable in this tree, in traversal order
    /// with duplicates, used by the KB to index a compound conclusion under
    /// each operator it could satisfy.
    pub fn leaf_operators(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_leaf_operators(&mut out);
        out
    }

    fn collect_leaf_operators<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Ast::Leaf(l) => out.push(&l.operator),
            Ast::And(parts) | Ast::Or(parts) => {
                for p in parts {
                    p.collect_leaf_operators(out);
                }
            }
            // leaf operators inside a Not are never chained to.
            Ast::Not(_) => {}
            Ast::Implies { concl, .. } => concl.collect_leaf_operators(out),
        }
    }
}

/// Double dispatch over the four compound shapes, so the condition matcher
/// and the contrapositive prover can walk the same tree with different
/// interpretations instead of branching on a tag at every call site.
pub trait AstVisitor {
    type Output;

    fn visit_leaf(&mut self, leaf: &Leaf) -> Self::Output;
    fn visit_and(&mut self, parts: &[Ast]) -> Self::Output;
    fn visit_or(&mut self, parts: &[Ast]) -> Self::Output;
    fn visit_not(&mut self, part: &Ast) -> Self::Output;
}

pub fn walk<V: AstVisitor>(visitor: &mut V, ast: &Ast) -> V::Output {
    match ast {
        Ast::Leaf(l) => visitor.visit_leaf(l),
        Ast::And(parts) => visitor.visit_and(parts),
        Ast::Or(parts) => visitor.visit_or(parts),
        Ast::Not(part) => visitor.visit_not(part),
        Ast::Implies { concl, .. } => walk(visitor, concl),
    }
}

/// Fluent construction, mirroring a hand style used elsewhere in this
/// codebase for building test fixtures without threading `Vec<Term>`
/// literals through every call site.
#[derive(Debug, Clone)]
pub struct LeafBuilder {
    operator: String,
    args: Vec<Term>,
    name: Option<String>,
}

impl LeafBuilder {
    pub fn new(operator: impl Into<String>) -> Self {
        LeafBuilder {
            operator: operator.into(),
            args: Vec::new(),
            name: None,
        }
    }

    pub fn arg(mut self, name: impl Into<String>) -> Self {
        self.args.push(Term::Const(name.into()));
        self
    }

    pub fn var(mut self, name: impl Into<String>) -> Self {
        self.args.push(Term::Var(name.into()));
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn build(self) -> Leaf {
        Leaf {
            operator: self.operator,
            args: self.args,
            name: self.name,
        }
    }

    pub fn build_ast(self) -> Ast {
        Ast::Leaf(self.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaf_builder_produces_expected_shape() {
        let leaf = LeafBuilder::new("isA").arg("Socrates").arg("Human").build();
        assert_eq!(leaf.operator, "isA");
        assert_eq!(leaf.args, vec![Term::Const("Socrates".into()), Term::Const("Human".into())]);
        assert!(!leaf.has_variables());
    }

    #[test]
    fn variables_collected_from_nested_compound() {
        let ast = Ast::And(vec![
            LeafBuilder::new("isA").var("x").arg("Human").build_ast(),
            Ast::Not(Box::new(LeafBuilder::new("isA").var("x").arg("Robot").build_ast())),
        ]);
        let vars = ast.variables();
        assert_eq!(vars, HashSet::from(["x"]));
    }

    #[test]
    fn leaf_operators_skip_inside_not() {
        let ast = Ast::And(vec![
            LeafBuilder::new("mortal").var("x").build_ast(),
            Ast::Not(Box::new(LeafBuilder::new("immortal").var("x").build_ast())),
        ]);
        assert_eq!(ast.leaf_operators(), vec!["mortal"]);
    }

    #[test]
    fn implies_conclusion_drives_operator_lookup() {
        let rule = Ast::Implies {
            cond: Box::new(LeafBuilder::new("isA").var("x").arg("Human").build_ast()),
            concl: Box::new(LeafBuilder::new("mortal").var("x").build_ast()),
        };
        assert_eq!(rule.operator(), None);
        assert_eq!(rule.leaf_operators(), vec!["mortal"]);
    }

    struct CountLeaves(usize);
    impl AstVisitor for CountLeaves {
        type Output = ();
        fn visit_leaf(&mut self, _leaf: &Leaf) {
            self.0 += 1;
        }
        fn visit_and(&mut self, parts: &[Ast]) {
            for p in parts {
                walk(self, p);
            }
        }
        fn visit_or(&mut self, parts: &[Ast]) {
            for p in parts {
                walk(self, p);
            }
        }
        fn visit_not(&mut self, part: &Ast) {
            walk(self, part);
        }
    }

    #[test]
    fn visitor_counts_leaves_across_compound() {
        let ast = Ast::And(vec![
            LeafBuilder::new("a").build_ast(),
            Ast::Or(vec![LeafBuilder::new("b").build_ast(), LeafBuilder::new("c").build_ast()]),
        ]);
        let mut counter = CountLeaves(0);
        walk(&mut counter, &ast);
        assert_eq!(counter.0, 3);
    }
}
