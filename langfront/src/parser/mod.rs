//! # Shift-reduce parser driver
//!
//! Two stacks — a state stack and an AST-node stack — consulting the
//! ACTION/GOTO tables built by [`lr`](crate::lr), pulling one token of
//! lookahead at a time from a [`Scanner`] (spec §4.6). Grounded in
//! `original_source`'s `LRParser.cpp`.

use crate::ast::AstBuilder;
use crate::lr::{Action, ParseTables, END_OF_INPUT};
use crate::reader::Reader;
use crate::scanner::Scanner;
use crate::symbol::SymbolTable;
use crate::token::{Token, TokenKind};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("syntax error: unexpected {kind} {lexeme:?} at {line}:{column}")]
    Syntax {
        kind: String,
        lexeme: String,
        line: usize,
        column: usize,
    },
    #[error("parser internal error: no GOTO from state {state} on {symbol:?} after reducing production {production}")]
    Internal {
        state: usize,
        symbol: String,
        production: usize,
    },
}

/// Drives `tables` over tokens pulled from `scanner`, building an AST with
/// `builder`. Returns the root node on Accept.
pub fn parse<R, B>(
    tables: &ParseTables,
    scanner: &mut Scanner<R>,
    symbols: &mut dyn SymbolTable,
    builder: &mut B,
) -> Result<B::Node, ParseError>
where
    R: Reader,
    B: AstBuilder,
{
    let mut state_stack: Vec<usize> = vec![tables.start_state];
    let mut node_stack: Vec<B::Node> = Vec::new();
    let mut lookahead = scanner.next_token(symbols);

    loop {
        let state = *state_stack.last().expect("state stack is never empty");
        let symbol = token_symbol(&lookahead);
        let action = tables.action.get(&(state, symbol.clone())).cloned();
        log::trace!("state {state}, lookahead {symbol:?} -> {action:?}");

        match action {
            Some(Action::Shift(next_state)) => {
                log::trace!("shift {symbol:?}: state {state} -> {next_state}");
                state_stack.push(next_state);
                node_stack.push(builder.make_terminal(&symbol));
                lookahead = scanner.next_token(symbols);
            }
            Some(Action::Reduce(production_index)) => {
                let production = &tables.productions[production_index];
                log::trace!(
                    "reduce by production {production_index}: {} -> {:?}",
                    production.left,
                    production.right
                );
                let arity = production.right.len();
                let split = node_stack.len() - arity;
                let children = node_stack.split_off(split);
                state_stack.truncate(state_stack.len() - arity);

                let under = *state_stack.last().expect("state stack is never empty");
                let goto_state = *tables
                    .goto
                    .get(&(under, production.left.clone()))
                    .ok_or_else(|| ParseError::Internal {
                        state: under,
                        symbol: production.left.clone(),
                        production: production_index,
                    })?;
                log::trace!("goto: state {under} on {:?} -> {goto_state}", production.left);
                state_stack.push(goto_state);
                node_stack.push(builder.make_node(&production.left, production_index, children));
            }
            Some(Action::Accept) => {
                log::debug!("accept at state {state}");
                return Ok(node_stack
                    .pop()
                    .expect("accept implies exactly one node remains"));
            }
            None => {
                return Err(ParseError::Syntax {
                    kind: symbol,
                    lexeme: lookahead.lexeme.clone(),
                    line: lookahead.line,
                    column: lookahead.column,
                });
            }
        }
    }
}

fn token_symbol(token: &Token) -> String {
    match &token.kind {
        TokenKind::Named(name) => name.to_string(),
        TokenKind::Unknown => "<unknown>".to_string(),
        TokenKind::EndOfFile => END_OF_INPUT.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{AstNode, DefaultAstBuilder};
    use crate::grammar::{Grammar, Production};
    use crate::lr;
    use crate::reader::BufReader;
    use crate::scanner::Scanner;
    use crate::spec::TokenSpec;
    use crate::symbol::HashSymbolTable;

    fn expr_tables() -> ParseTables {
        let grammar = Grammar {
            terminals: vec!["id".into(), "+".into()],
            nonterminals: vec!["E".into(), "T".into()],
            start: "E".into(),
            productions: vec![
                Production {
                    left: "E".into(),
                    right: vec!["E".into(), "+".into(), "T".into()],
                },
                Production {
                    left: "E".into(),
                    right: vec!["T".into()],
                },
                Production {
                    left: "T".into(),
                    right: vec!["id".into()],
                },
            ],
        };
        lr::build(&grammar).unwrap()
    }

    fn expr_specs() -> Vec<TokenSpec> {
        vec![
            TokenSpec {
                name: "id".into(),
                regex: "[a-z]+".into(),
                ignore: false,
                priority: 10,
            },
            TokenSpec {
                name: "+".into(),
                regex: "\\+".into(),
                ignore: false,
                priority: 5,
            },
            TokenSpec {
                name: "WS".into(),
                regex: " +".into(),
                ignore: true,
                priority: 1,
            },
        ]
    }

    #[test]
    fn parses_id_plus_id_into_expected_tree() {
        let tables = expr_tables();
        let specs = expr_specs();
        let mut scanner = Scanner::new(BufReader::new("id + id"), &specs, None).unwrap();
        let mut symbols = HashSymbolTable::new();
        let mut builder = DefaultAstBuilder;

        let ast = parse(&tables, &mut scanner, &mut symbols, &mut builder).unwrap();
        assert_eq!(&*ast.symbol, "E");
        let leaves: Vec<&str> = ast.leaves().iter().map(|n| &*n.symbol).collect();
        assert_eq!(leaves, vec!["id", "+", "id"]);
    }

    #[test]
    fn two_adjacent_ids_is_a_syntax_error() {
        let tables = expr_tables();
        let specs = expr_specs();
        let mut scanner = Scanner::new(BufReader::new("id id"), &specs, None).unwrap();
        let mut symbols = HashSymbolTable::new();
        let mut builder = DefaultAstBuilder;

        let err = parse(&tables, &mut scanner, &mut symbols, &mut builder).unwrap_err();
        assert!(matches!(err, ParseError::Syntax { .. }));
    }

    #[test]
    fn leaf_sequence_matches_token_stream_minus_eof() {
        let tables = expr_tables();
        let specs = expr_specs();
        let mut scanner = Scanner::new(BufReader::new("id + id"), &specs, None).unwrap();
        let mut symbols = HashSymbolTable::new();
        let mut builder = DefaultAstBuilder;

        let ast: AstNode = parse(&tables, &mut scanner, &mut symbols, &mut builder).unwrap();
        let leaves: Vec<&str> = ast.leaves().iter().map(|n| &*n.symbol).collect();
        assert_eq!(leaves, vec!["id", "+", "id"]);
    }
}
