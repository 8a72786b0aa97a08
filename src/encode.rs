//! # Statement Encoder (L4 of the vector pipeline)
//!
//! Turns an `Ast` into a canonical vector: `Op ⊕ (Pos1 ⊕ atomize(A1)) ⊕ …`.
//! Constants are looked up (or materialized) in the `Vocabulary`; variables
//! bind to the reserved `HoleAt(i)` placeholder so a rule pattern with free
//! variables still has a well-defined vector.

use crate::ast::{Ast, Leaf, Term};
use crate::error::{SysError, SysResult};
use crate::hdc::{HdcContext, Vector};
use crate::vocabulary::Vocabulary;

/// Encode a single leaf statement's arguments against `vocab`'s preloaded
/// position atoms. `position_count` bounds arity: it must not exceed N.
pub fn encode_leaf(ctx: &HdcContext, vocab: &mut Vocabulary, leaf: &Leaf, position_count: usize) -> SysResult<Vector> {
    if leaf.arity() > position_count {
        return Err(SysError::internal(format!(
            "operator {} has arity {} exceeding the {position_count} preloaded positions",
            leaf.operator,
            leaf.arity()
        )));
    }
    let op_atom = vocab.get_or_create(ctx, leaf.operator.trim())?.vector.clone();
    let mut acc = op_atom;
    for (i, term) in leaf.args.iter().enumerate() {
        let pos = vocab
            .position(i + 1)
            .ok_or_else(|| SysError::internal(format!("position atom Pos{} not preloaded", i + 1)))?
            .vector
            .clone();
        let arg_vector = atomize(ctx, vocab, term, i + 1)?;
        let tagged = ctx.bind(&pos, &arg_vector)?;
        acc = ctx.bind(&acc, &tagged)?;
    }
    Ok(acc)
}

/// Encode a full compound `Ast`, recursing through `And`/`Or`/`Not`/`Implies`
/// using the reserved marker atoms as the outer operator.
pub fn encode_ast(ctx: &HdcContext, vocab: &mut Vocabulary, ast: &Ast, position_count: usize) -> SysResult<Vector> {
    match ast {
        Ast::Leaf(leaf) => encode_leaf(ctx, vocab, leaf, position_count),
        Ast::Not(inner) => {
            let marker = vocab.get_or_create(ctx, "Not")?.vector.clone();
            let pos1 = vocab
                .position(1)
                .ok_or_else(|| SysError::internal("position atom Pos1 not preloaded"))?
                .vector
                .clone();
            let inner_vector = encode_ast(ctx, vocab, inner, position_count)?;
            let tagged = ctx.bind(&pos1, &inner_vector)?;
            ctx.bind(&marker, &tagged)
        }
        Ast::And(parts) => encode_compound(ctx, vocab, "And", parts, position_count),
        Ast::Or(parts) => encode_compound(ctx, vocab, "Or", parts, position_count),
        Ast::Implies { cond, concl } => {
            let marker = vocab.get_or_create(ctx, "Implies")?.vector.clone();
            let cond_vector = encode_ast(ctx, vocab, cond, position_count)?;
            let concl_vector = encode_ast(ctx, vocab, concl, position_count)?;
            let pos1 = vocab.position(1).ok_or_else(|| SysError::internal("Pos1 not preloaded"))?.vector.clone();
            let pos2 = vocab.position(2).ok_or_else(|| SysError::internal("Pos2 not preloaded"))?.vector.clone();
            let tagged_cond = ctx.bind(&pos1, &cond_vector)?;
            let tagged_concl = ctx.bind(&pos2, &concl_vector)?;
            let acc = ctx.bind(&marker, &tagged_cond)?;
            ctx.bind(&acc, &tagged_concl)
        }
    }
}

fn encode_compound(
    ctx: &HdcContext,
    vocab: &mut Vocabulary,
    marker_name: &str,
    parts: &[Ast],
    position_count: usize,
) -> SysResult<Vector> {
    if parts.len() > position_count {
        return Err(SysError::internal(format!(
            "compound {marker_name} has {} operands exceeding the {position_count} preloaded positions",
            parts.len()
        )));
    }
    let marker = vocab.get_or_create(ctx, marker_name)?.vector.clone();
    let mut acc = marker;
    for (i, part) in parts.iter().enumerate() {
        let pos = vocab
            .position(i + 1)
            .ok_or_else(|| SysError::internal(format!("position atom Pos{} not preloaded", i + 1)))?
            .vector
            .clone();
        let part_vector = encode_ast(ctx, vocab, part, position_count)?;
        let tagged = ctx.bind(&pos, &part_vector)?;
        acc = ctx.bind(&acc, &tagged)?;
    }
    Ok(acc)
}

fn atomize(ctx: &HdcContext, vocab: &mut Vocabulary, term: &Term, position: usize) -> SysResult<Vector> {
    match term {
        Term::Const(name) => Ok(vocab.get_or_create(ctx, name.trim())?.vector.clone()),
        Term::Var(_) => Ok(vocab.hole_at(ctx, position)?.vector.clone()),
    }
}

/// Trim the operator and every argument token in place, as a
/// canonical-metadata step. Applied once at parse time so every
/// downstream consumer sees normalized tokens.
pub fn canonicalize_leaf(leaf: &mut Leaf) {
    leaf.operator = leaf.operator.trim().to_string();
    for term in &mut leaf.args {
        match term {
            Term::Const(s) => *s = s.trim().to_string(),
            Term::Var(s) => *s = s.trim().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::LeafBuilder;
    use crate::hdc::{DenseBinaryStrategy, StrategyRegistry};
    use std::sync::Arc;

    fn ctx_and_vocab() -> (HdcContext, Vocabulary) {
        let reg = StrategyRegistry::new();
        reg.register(Arc::new(DenseBinaryStrategy::new()));
        let ctx = HdcContext::new(&reg, "dense-binary", 8192).unwrap();
        let mut vocab = Vocabulary::new("T", 8192);
        vocab.preload_core(&ctx, 20).unwrap();
        (ctx, vocab)
    }

    #[test]
    fn same_leaf_encodes_identically_twice() {
        let (ctx, mut vocab) = ctx_and_vocab();
        let leaf = LeafBuilder::new("isA").arg("Socrates").arg("Human").build();
        let a = encode_leaf(&ctx, &mut vocab, &leaf, 20).unwrap();
        let b = encode_leaf(&ctx, &mut vocab, &leaf, 20).unwrap();
        assert!(a.equals(&b));
    }

    #[test]
    fn arity_over_position_count_errors() {
        let (ctx, mut vocab) = ctx_and_vocab();
        let leaf = LeafBuilder::new("f").arg("a").arg("b").arg("c").build();
        assert!(encode_leaf(&ctx, &mut vocab, &leaf, 2).is_err());
    }

    #[test]
    fn variable_uses_hole_placeholder_not_a_named_atom() {
        let (ctx, mut vocab) = ctx_and_vocab();
        let leaf = LeafBuilder::new("isA").var("x").arg("Human").build();
        encode_leaf(&ctx, &mut vocab, &leaf, 20).unwrap();
        assert!(vocab.contains("__Hole1__"));
        assert!(!vocab.contains("x"));
    }

    #[test]
    fn not_and_plain_leaf_encode_differently() {
        let (ctx, mut vocab) = ctx_and_vocab();
        let leaf = LeafBuilder::new("isA").arg("Socrates").arg("Human").build_ast();
        let plain = encode_ast(&ctx, &mut vocab, &leaf, 20).unwrap();
        let negated = encode_ast(&ctx, &mut vocab, &Ast::Not(Box::new(leaf)), 20).unwrap();
        assert!(!plain.equals(&negated));
    }

    #[test]
    fn canonicalize_trims_operator_and_args() {
        let mut leaf = LeafBuilder::new(" isA ").arg(" Socrates ").build();
        canonicalize_leaf(&mut leaf);
        assert_eq!(leaf.operator, "isA");
        assert_eq!(leaf.args[0].as_const(), Some("Socrates"));
    }
}
