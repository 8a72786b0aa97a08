//! # Vocabulary (L2)
//!
//! Name → atom mapping scoped to one session theory, with per-atom semantic
//! flags and the reserved position/hole/marker families used by the
//! statement encoder.

use std::collections::HashMap;

use crate::error::SysResult;
use crate::hdc::{HdcContext, Vector};

/// Reserved theory id for core position/hole/marker atoms.
pub const CORE_THEORY: &str = "Core";

/// Reserved operator names — never user-declarable.
pub const RESERVED_OPERATORS: &[&str] = &["Implies", "And", "Or", "Not", "Exists", "ForAll"];

pub fn is_reserved_operator(name: &str) -> bool {
    RESERVED_OPERATORS.contains(&name)
}

/// Per-atom semantic flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AtomFlags {
    pub is_position: bool,
    pub is_operator: bool,
    pub is_relation: bool,
    pub transitive: bool,
    pub symmetric: bool,
    pub reflexive: bool,
}

/// A named vector plus its flags.
#[derive(Debug, Clone)]
pub struct Atom {
    pub name: String,
    pub vector: Vector,
    pub flags: AtomFlags,
}

/// Tags declared when registering an operator/relation in the core
/// operator catalog.
#[derive(Debug, Clone, Copy, Default)]
pub struct OperatorTags {
    pub relation: bool,
    pub property: bool,
    pub transitive: bool,
    pub symmetric: bool,
    pub reflexive: bool,
}

/// Name-keyed atom store for one session theory. Enumeration is by
/// insertion order so logs and `findAll` results are deterministic.
pub struct Vocabulary {
    theory_id: String,
    geometry: u32,
    order: Vec<String>,
    atoms: HashMap<String, Atom>,
}

impl Vocabulary {
    pub fn new(theory_id: impl Into<String>, geometry: u32) -> Self {
        Vocabulary {
            theory_id: theory_id.into(),
            geometry,
            order: Vec::new(),
            atoms: HashMap::new(),
        }
    }

    pub fn theory_id(&self) -> &str {
        &self.theory_id
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.atoms.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Atom> {
        self.atoms.get(name)
    }

    /// Insertion-order enumeration, for determinism in logs.
    pub fn iter(&self) -> impl Iterator<Item = &Atom> {
        self.order.iter().filter_map(move |n| self.atoms.get(n))
    }

    fn insert(&mut self, ctx: &HdcContext, name: &str, flags: AtomFlags) -> SysResult<&Atom> {
        if !self.atoms.contains_key(name) {
            let vector = ctx.create_from_name(name, &self.theory_id, Some(self.geometry))?;
            self.atoms.insert(
                name.to_string(),
                Atom {
                    name: name.to_string(),
                    vector,
                    flags,
                },
            );
            self.order.push(name.to_string());
        }
        Ok(self.atoms.get(name).expect("just inserted"))
    }

    /// Return the existing atom or materialize a new constant atom.
    /// Deterministic: a later session that materializes the same name
    /// produces identical bits.
    pub fn get_or_create(&mut self, ctx: &HdcContext, name: &str) -> SysResult<&Atom> {
        self.insert(ctx, name, AtomFlags::default())
    }

    /// Declare `name` as an operator/relation with the given tags,
    /// materializing it if unseen and upgrading its flags if it already
    /// exists as a plain constant.
    pub fn declare_operator(&mut self, ctx: &HdcContext, name: &str, tags: OperatorTags) -> SysResult<&Atom> {
        let flags = AtomFlags {
            is_position: false,
            is_operator: true,
            is_relation: tags.relation,
            transitive: tags.transitive,
            symmetric: tags.symmetric,
            reflexive: tags.reflexive,
        };
        if let Some(atom) = self.atoms.get_mut(name) {
            atom.flags.is_operator = true;
            atom.flags.is_relation |= tags.relation;
            atom.flags.transitive |= tags.transitive;
            atom.flags.symmetric |= tags.symmetric;
            atom.flags.reflexive |= tags.reflexive;
            return Ok(self.atoms.get(name).expect("just updated"));
        }
        self.insert(ctx, name, flags)
    }

    /// Preload the `N` reserved position atoms `Pos1..PosN` plus markers
    /// for the reserved compound operators. Idempotent.
    pub fn preload_core(&mut self, ctx: &HdcContext, position_count: usize) -> SysResult<()> {
        for i in 1..=position_count {
            let name = position_name(i);
            self.insert(
                ctx,
                &name,
                AtomFlags {
                    is_position: true,
                    ..Default::default()
                },
            )?;
        }
        for marker in RESERVED_OPERATORS {
            self.insert(
                ctx,
                marker,
                AtomFlags {
                    is_operator: true,
                    ..Default::default()
                },
            )?;
        }
        Ok(())
    }

    /// Look up position vector `Pos{i}` (1-indexed). Callers must have
    /// called `preload_core` with `i <= position_count` first.
    pub fn position(&self, i: usize) -> Option<&Atom> {
        self.atoms.get(&position_name(i))
    }

    /// The placeholder atom standing in for a variable at argument
    /// position `i` during rule-pattern encoding. Lazily materialized and
    /// cached like any other atom.
    pub fn hole_at(&mut self, ctx: &HdcContext, i: usize) -> SysResult<&Atom> {
        let name = hole_name(i);
        self.insert(ctx, &name, AtomFlags::default())
    }
}

fn position_name(i: usize) -> String {
    format!("__Pos{i}__")
}

fn hole_name(i: usize) -> String {
    format!("__Hole{i}__")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hdc::{DenseBinaryStrategy, StrategyRegistry};
    use std::sync::Arc;

    fn ctx() -> HdcContext {
        let reg = StrategyRegistry::new();
        reg.register(Arc::new(DenseBinaryStrategy::new()));
        HdcContext::new(&reg, "dense-binary", 4096).unwrap()
    }

    #[test]
    fn get_or_create_is_idempotent() {
        let ctx = ctx();
        let mut vocab = Vocabulary::new("T", 4096);
        let a = vocab.get_or_create(&ctx, "Socrates").unwrap().vector.clone();
        let b = vocab.get_or_create(&ctx, "Socrates").unwrap().vector.clone();
        assert!(a.equals(&b));
        assert_eq!(vocab.len(), 1);
    }

    #[test]
    fn preload_core_creates_20_positions_and_markers() {
        let ctx = ctx();
        let mut vocab = Vocabulary::new("T", 4096);
        vocab.preload_core(&ctx, 20).unwrap();
        assert!(vocab.position(1).is_some());
        assert!(vocab.position(20).is_some());
        assert!(vocab.get("Implies").unwrap().flags.is_operator);
        assert_eq!(vocab.len(), 20 + RESERVED_OPERATORS.len());
    }

    #[test]
    fn positions_are_mutually_quasi_orthogonal() {
        let ctx = ctx();
        let mut vocab = Vocabulary::new("T", 16_384);
        vocab.preload_core(&ctx, 20).unwrap();
        let p1 = vocab.position(1).unwrap().vector.clone();
        let p2 = vocab.position(2).unwrap().vector.clone();
        let sim = p1.similarity(&p2).unwrap();
        assert!((sim - 0.5).abs() < 0.05);
    }

    #[test]
    fn insertion_order_is_preserved() {
        let ctx = ctx();
        let mut vocab = Vocabulary::new("T", 4096);
        vocab.get_or_create(&ctx, "b").unwrap();
        vocab.get_or_create(&ctx, "a").unwrap();
        let names: Vec<&str> = vocab.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }
}
