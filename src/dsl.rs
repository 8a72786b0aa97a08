//! # Statement DSL parser
//!
//! ```text
//! program    := statement (NEWLINE statement)*
//! statement  := (annotation)? operator arg*
//! annotation := "@" name (":" alias)?
//! operator   := ident                 // reserved: Implies, And, Or, Not, Exists, ForAll
//! arg        := ident                 // constant
//!            | "?" ident              // variable / hole
//!            | "$" name               // reference to a previously annotated statement
//! ```
//!
//! Comments run from an unescaped `#` to end of line. An annotated statement
//! (`@name ...`) is never ingested on its own — it only binds `name` to an
//! AST fragment for later `$name` composition. The leaf building blocks
//! carry `@name`, and the rule or negation that actually belongs in the KB
//! is the unannotated statement referencing them by `$name`.
//! `Exists`/`ForAll` are reserved but have no AST shape to parse into yet
//! and are rejected with a parse error.

use std::collections::HashMap;

use crate::ast::{Ast, Term};
use crate::error::SysError;

#[derive(Debug, Clone)]
pub struct ParsedStatement {
    pub annotation: Option<String>,
    pub ast: Ast,
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(i) => &line[..i],
        None => line,
    }
}

fn is_ident(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

enum RawArg<'a> {
    Ident(&'a str),
    Var(&'a str),
    Ref(&'a str),
}

fn parse_raw_arg(token: &str) -> Result<RawArg<'_>, SysError> {
    if let Some(rest) = token.strip_prefix('?') {
        if !is_ident(rest) {
            return Err(parse_err(0, format!("invalid variable name: {token}")));
        }
        Ok(RawArg::Var(rest))
    } else if let Some(rest) = token.strip_prefix('$') {
        if !is_ident(rest) {
            return Err(parse_err(0, format!("invalid reference name: {token}")));
        }
        Ok(RawArg::Ref(rest))
    } else {
        if !is_ident(token) {
            return Err(parse_err(0, format!("invalid identifier: {token}")));
        }
        Ok(RawArg::Ident(token))
    }
}

fn parse_err(index: usize, message: String) -> SysError {
    SysError::Parse { index, message }
}

/// Parse one already-comment-stripped, non-blank line into a statement,
/// resolving any `$ref` against `symbols` (statements annotated earlier in
/// the same program).
pub fn parse_statement(line: &str, index: usize, symbols: &HashMap<String, Ast>) -> Result<ParsedStatement, SysError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.is_empty() {
        return Err(parse_err(index, "empty statement".to_string()));
    }

    let mut pos = 0;
    let annotation = if let Some(rest) = tokens[0].strip_prefix('@') {
        pos += 1;
        let name = rest.split(':').next().unwrap_or(rest);
        if !is_ident(name) {
            return Err(parse_err(index, format!("invalid annotation name: {}", tokens[0])));
        }
        Some(name.to_string())
    } else {
        None
    };

    if pos >= tokens.len() {
        return Err(parse_err(index, "statement has no operator".to_string()));
    }
    let operator = tokens[pos];
    if !is_ident(operator) {
        return Err(parse_err(index, format!("invalid operator: {operator}")));
    }
    pos += 1;

    let arg_tokens = &tokens[pos..];

    let ast = match operator {
        "Exists" | "ForAll" => {
            return Err(parse_err(
                index,
                format!("operator {operator} is reserved but has no supported statement form"),
            ))
        }
        "Implies" => {
            let refs = resolve_refs(arg_tokens, symbols, index)?;
            if refs.len() != 2 {
                return Err(parse_err(index, "Implies takes exactly two $refs: cond, concl".to_string()));
            }
            Ast::Implies {
                cond: Box::new(refs[0].clone()),
                concl: Box::new(refs[1].clone()),
            }
        }
        "Not" => {
            let refs = resolve_refs(arg_tokens, symbols, index)?;
            if refs.len() != 1 {
                return Err(parse_err(index, "Not takes exactly one $ref".to_string()));
            }
            Ast::Not(Box::new(refs[0].clone()))
        }
        "And" => {
            let refs = resolve_refs(arg_tokens, symbols, index)?;
            if refs.is_empty() {
                return Err(parse_err(index, "And takes at least one $ref".to_string()));
            }
            Ast::And(refs)
        }
        "Or" => {
            let refs = resolve_refs(arg_tokens, symbols, index)?;
            if refs.is_empty() {
                return Err(parse_err(index, "Or takes at least one $ref".to_string()));
            }
            Ast::Or(refs)
        }
        _ => {
            let mut args = Vec::with_capacity(arg_tokens.len());
            for token in arg_tokens {
                match parse_raw_arg(token).map_err(|_| parse_err(index, format!("invalid argument: {token}")))? {
                    RawArg::Ident(name) => args.push(Term::Const(name.to_string())),
                    RawArg::Var(name) => args.push(Term::Var(name.to_string())),
                    RawArg::Ref(_) => {
                        return Err(parse_err(index, format!("operator {operator} does not take $refs")));
                    }
                }
            }
            Ast::leaf(operator, args)
        }
    };

    Ok(ParsedStatement { annotation, ast })
}

fn resolve_refs(tokens: &[&str], symbols: &HashMap<String, Ast>, index: usize) -> Result<Vec<Ast>, SysError> {
    let mut out = Vec::with_capacity(tokens.len());
    for token in tokens {
        match parse_raw_arg(token).map_err(|_| parse_err(index, format!("invalid argument: {token}")))? {
            RawArg::Ref(name) => match symbols.get(name) {
                Some(ast) => out.push(ast.clone()),
                None => return Err(parse_err(index, format!("unknown reference: ${name}"))),
            },
            _ => return Err(parse_err(index, format!("expected a $ref, got: {token}"))),
        }
    }
    Ok(out)
}

/// Parse a whole program, returning one `(index, result)` per non-blank,
/// non-comment line, indices matching the order `Session::learn` uses for
/// `LearnResult.errors`.
pub fn parse_program(source: &str) -> Vec<(usize, Result<ParsedStatement, SysError>)> {
    let mut symbols: HashMap<String, Ast> = HashMap::new();
    let mut out = Vec::new();
    let mut index = 0;
    for raw_line in source.lines() {
        let line = strip_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }
        let result = parse_statement(line, index, &symbols);
        if let Ok(stmt) = &result {
            if let Some(name) = &stmt.annotation {
                symbols.insert(name.clone(), stmt.ast.clone());
            }
        }
        out.push((index, result));
        index += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_plain_ground_fact() {
        let stmts = parse_program("isA Socrates Human");
        assert_eq!(stmts.len(), 1);
        let (_, result) = &stmts[0];
        let stmt = result.as_ref().unwrap();
        assert!(stmt.annotation.is_none());
        assert_eq!(stmt.ast, Ast::leaf("isA", vec![Term::Const("Socrates".into()), Term::Const("Human".into())]));
    }

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        let stmts = parse_program("# a comment\n\nisA Socrates Human  # trailing\n");
        assert_eq!(stmts.len(), 1);
    }

    #[test]
    fn builds_a_rule_from_annotated_refs() {
        let program = "\
@p1 has ?x Motive
@p2 has ?x Opportunity
@cond And $p1 $p2
@concl isSuspect ?x
Implies $cond $concl";
        let stmts = parse_program(program);
        let (_, last) = stmts.last().unwrap();
        let stmt = last.as_ref().unwrap();
        match &stmt.ast {
            Ast::Implies { cond, concl } => {
                assert!(matches!(**cond, Ast::And(_)));
                assert!(matches!(**concl, Ast::Leaf(_)));
            }
            other => panic!("expected Implies, got {other:?}"),
        }
    }

    #[test]
    fn not_ref_wraps_the_referenced_leaf() {
        let program = "@negFly can Opus Fly\nNot $negFly";
        let stmts = parse_program(program);
        let (_, last) = stmts.last().unwrap();
        let stmt = last.as_ref().unwrap();
        assert!(matches!(stmt.ast, Ast::Not(_)));
    }

    #[test]
    fn unknown_reference_is_a_parse_error() {
        let stmts = parse_program("Not $missing");
        let (_, result) = &stmts[0];
        assert!(result.is_err());
    }

    #[test]
    fn exists_is_rejected_as_unsupported() {
        let stmts = parse_program("Exists ?x");
        assert!(stmts[0].1.is_err());
    }
}
