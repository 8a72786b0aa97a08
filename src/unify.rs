//! First-order unification over variable names, no function symbols.
//!
//! A variable bound in one argument position must take the same value in
//! every other occurrence within the same proof branch. Binding a variable
//! to a variable merges their equivalence class via union-find, and the
//! lexicographically smaller name becomes the canonical representative.

use std::collections::HashMap;

use crate::ast::Term;

/// A partial binding built up while matching one proof branch. Cloned
/// cheaply between alternative branches since proof search explores many
/// candidate substitutions side by side.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Substitution {
    /// Union-find parent pointers, keyed by variable name (sans `?`).
    parent: HashMap<String, String>,
    /// Constant bound to each canonical representative, if any.
    bound: HashMap<String, String>,
}

impl Substitution {
    pub fn new() -> Self {
        Substitution::default()
    }

    fn find(&mut self, var: &str) -> String {
        let mut root = var.to_string();
        while let Some(next) = self.parent.get(&root) {
            if next == &root {
                break;
            }
            root = next.clone();
        }
        if root != var {
            self.parent.insert(var.to_string(), root.clone());
        } else {
            self.parent.entry(root.clone()).or_insert_with(|| root.clone());
        }
        root
    }

    /// `?x = ?x` is a no-op; otherwise merges the two equivalence classes
    /// picking the lexicographically smaller name as canonical, and checks
    /// that any existing bindings agree.
    pub fn union_vars(&mut self, a: &str, b: &str) -> bool {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return true;
        }
        let (canonical, other) = if ra < rb { (ra, rb) } else { (rb, ra) };
        let merged_binding = match (self.bound.get(&canonical), self.bound.get(&other)) {
            (Some(x), Some(y)) => {
                if x != y {
                    return false;
                }
                Some(x.clone())
            }
            (Some(x), None) => Some(x.clone()),
            (None, Some(y)) => Some(y.clone()),
            (None, None) => None,
        };
        self.parent.insert(other.clone(), canonical.clone());
        self.bound.remove(&other);
        if let Some(v) = merged_binding {
            self.bound.insert(canonical, v);
        }
        true
    }

    /// Bind variable `var` to constant `value`, failing if it is already
    /// bound to a different constant.
    pub fn bind(&mut self, var: &str, value: &str) -> bool {
        let root = self.find(var);
        match self.bound.get(&root) {
            Some(existing) => existing == value,
            None => {
                self.bound.insert(root, value.to_string());
                true
            }
        }
    }

    /// Resolve a pattern term against a concrete constant from a fact. A
    /// `Const` must match exactly (caller handles the typed-isA fallback);
    /// a `Var` is bound (or checked against its existing binding).
    pub fn unify_term(&mut self, pattern: &Term, value: &str) -> bool {
        match pattern {
            Term::Const(c) => c == value,
            Term::Var(v) => self.bind(v, value),
        }
    }

    /// Unify two variables appearing in the same position across two
    /// patterns (e.g. the shared `?x` linking a rule's condition and
    /// conclusion). `?x = ?x` is a no-op.
    pub fn unify_term_term(&mut self, a: &Term, b: &Term) -> bool {
        match (a, b) {
            (Term::Const(x), Term::Const(y)) => x == y,
            (Term::Var(x), Term::Var(y)) => self.union_vars(x, y),
            (Term::Var(v), Term::Const(c)) | (Term::Const(c), Term::Var(v)) => self.bind(v, c),
        }
    }

    /// The value bound to `var`, following the union-find chain, if any.
    pub fn value_of(&mut self, var: &str) -> Option<String> {
        let root = self.find(var);
        self.bound.get(&root).cloned()
    }

    /// Resolve a pattern term to a concrete string given the current
    /// bindings: constants resolve to themselves, bound variables resolve
    /// to their value, unbound variables resolve to `None`.
    pub fn resolve(&mut self, term: &Term) -> Option<String> {
        match term {
            Term::Const(c) => Some(c.clone()),
            Term::Var(v) => self.value_of(v),
        }
    }

    /// Two substitutions are compatible for a consistent-substitution join
    /// (`And` semantics) iff they agree on every variable bound in both.
    pub fn compatible_with(&self, other: &Substitution) -> bool {
        let mut merged = self.clone();
        for (var, value) in other.flattened() {
            if !merged.bind(&var, &value) {
                return false;
            }
        }
        true
    }

    /// Merge `other` into a fresh copy of `self`, assuming they are
    /// already known compatible.
    pub fn merged_with(&self, other: &Substitution) -> Substitution {
        let mut merged = self.clone();
        for (var, value) in other.flattened() {
            merged.bind(&var, &value);
        }
        merged
    }

    /// A canonical `var -> value` snapshot, each key its own root (duplicate
    /// keys from merged equivalence classes collapse automatically), sorted
    /// for deterministic comparison.
    pub fn flattened(&self) -> Vec<(String, String)> {
        let mut clone = self.clone();
        let vars: Vec<String> = clone.parent.keys().cloned().collect();
        let mut out = Vec::new();
        for var in vars {
            if let Some(value) = clone.value_of(&var) {
                out.push((var, value));
            }
        }
        out.sort();
        out.dedup();
        out
    }

    /// Deterministic string key for deduplicating equivalent proofs across
    /// strategies.
    pub fn canonical_key(&self) -> String {
        self.flattened()
            .into_iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn self_unification_is_a_no_op() {
        let mut s = Substitution::new();
        assert!(s.union_vars("x", "x"));
        assert!(s.flattened().is_empty());
    }

    #[test]
    fn binding_conflicting_constants_fails() {
        let mut s = Substitution::new();
        assert!(s.bind("x", "Socrates"));
        assert!(!s.bind("x", "Plato"));
    }

    #[test]
    fn var_var_merge_picks_lexicographically_smaller_canonical() {
        let mut s = Substitution::new();
        assert!(s.union_vars("y", "x"));
        assert!(s.bind("x", "Socrates"));
        assert_eq!(s.value_of("y"), Some("Socrates".to_string()));
    }

    #[test]
    fn merging_vars_with_conflicting_prior_bindings_fails() {
        let mut s = Substitution::new();
        s.bind("x", "Socrates");
        s.bind("y", "Plato");
        assert!(!s.union_vars("x", "y"));
    }

    #[test]
    fn compatible_substitutions_merge_cleanly() {
        let mut a = Substitution::new();
        a.bind("x", "Socrates");
        let mut b = Substitution::new();
        b.bind("y", "Human");
        assert!(a.compatible_with(&b));
        let merged = a.merged_with(&b);
        assert_eq!(merged.clone().value_of("x"), Some("Socrates".to_string()));
        assert_eq!(merged.clone().value_of("y"), Some("Human".to_string()));
    }

    #[test]
    fn incompatible_substitutions_are_rejected() {
        let mut a = Substitution::new();
        a.bind("x", "Socrates");
        let mut b = Substitution::new();
        b.bind("x", "Plato");
        assert!(!a.compatible_with(&b));
    }

    #[test]
    fn canonical_key_is_stable_regardless_of_insertion_order() {
        let mut a = Substitution::new();
        a.bind("x", "1");
        a.bind("y", "2");
        let mut b = Substitution::new();
        b.bind("y", "2");
        b.bind("x", "1");
        assert_eq!(a.canonical_key(), b.canonical_key());
    }
}
