//! Operator catalog: arity and semantic tags for declared operators/relations.
//!
//! Consulted by `learn` to reject statements using an undeclared operator,
//! or — under `SessionOptions::auto_declare_unknown_operators` — to promote
//! the operator to a declared relation on first use.

use std::collections::HashMap;

use crate::error::{SysError, SysResult};

/// Semantic tags attached to a declared operator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OperatorEntry {
    pub arity: usize,
    pub relation: bool,
    pub property: bool,
    pub transitive: bool,
    pub symmetric: bool,
    pub reflexive: bool,
}

impl OperatorEntry {
    pub fn relation(arity: usize) -> Self {
        OperatorEntry {
            arity,
            relation: true,
            ..Default::default()
        }
    }

    pub fn property(arity: usize) -> Self {
        OperatorEntry {
            arity,
            property: true,
            ..Default::default()
        }
    }

    pub fn transitive(mut self) -> Self {
        self.transitive = true;
        self
    }

    pub fn symmetric(mut self) -> Self {
        self.symmetric = true;
        self
    }

    pub fn reflexive(mut self) -> Self {
        self.reflexive = true;
        self
    }
}

/// A statically-or-dynamically declared set of operators — the core
/// operator catalog. Starts empty; a session typically seeds it
/// from a configured pack of definitions and then extends it via `learn`
/// when `auto_declare_unknown_operators` is set.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: HashMap<String, OperatorEntry>,
}

impl Catalog {
    pub fn new() -> Self {
        Catalog::default()
    }

    pub fn declare(&mut self, operator: impl Into<String>, entry: OperatorEntry) {
        self.entries.insert(operator.into(), entry);
    }

    pub fn get(&self, operator: &str) -> Option<&OperatorEntry> {
        self.entries.get(operator)
    }

    pub fn contains(&self, operator: &str) -> bool {
        self.entries.contains_key(operator)
    }

    pub fn is_transitive(&self, operator: &str) -> bool {
        self.entries.get(operator).map(|e| e.transitive).unwrap_or(false)
    }

    pub fn is_symmetric(&self, operator: &str) -> bool {
        self.entries.get(operator).map(|e| e.symmetric).unwrap_or(false)
    }

    pub fn is_reflexive(&self, operator: &str) -> bool {
        self.entries.get(operator).map(|e| e.reflexive).unwrap_or(false)
    }

    /// Validate `operator` used at `arity`, auto-declaring it as a plain
    /// relation of that arity when `auto_declare` is set and it is unseen
    /// when an unknown operator is encountered. Returns the resolved entry.
    pub fn resolve(&mut self, operator: &str, arity: usize, auto_declare: bool) -> SysResult<OperatorEntry> {
        if let Some(entry) = self.entries.get(operator) {
            return Ok(*entry);
        }
        if auto_declare {
            let entry = OperatorEntry::relation(arity);
            self.entries.insert(operator.to_string(), entry);
            return Ok(entry);
        }
        Err(SysError::UnknownOperator {
            operator: operator.to_string(),
        })
    }

    pub fn operators(&self) -> impl Iterator<Item = (&str, &OperatorEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_operator_without_auto_declare_errors() {
        let mut catalog = Catalog::new();
        assert!(catalog.resolve("foo", 2, false).is_err());
    }

    #[test]
    fn unknown_operator_with_auto_declare_registers_it() {
        let mut catalog = Catalog::new();
        let entry = catalog.resolve("foo", 2, true).unwrap();
        assert_eq!(entry.arity, 2);
        assert!(entry.relation);
        assert!(catalog.contains("foo"));
    }

    #[test]
    fn declared_operator_tags_are_queryable() {
        let mut catalog = Catalog::new();
        catalog.declare("isA", OperatorEntry::relation(2).transitive());
        assert!(catalog.is_transitive("isA"));
        assert!(!catalog.is_symmetric("isA"));
    }
}
