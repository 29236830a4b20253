//! # langfront
//!
//! `langfront` is a configurable compiler front-end library: from a
//! lexical rule file and a context-free grammar it builds a longest-match
//! scanner and a canonical LR(1) shift-reduce parser, then drives both over
//! an input source to produce an abstract syntax tree.
//!
//! ## Pipeline
//!
//! ```text
//! regex texts -> regex::Regex -> nfa::Nfa -> dfa::Dfa      (table-building)
//! grammar     -> lr::build                 -> ParseTables  (table-building)
//!
//! input file -> reader::Reader -> scanner::Scanner -> parser::parse -> ast::AstNode
//! ```
//!
//! Table-building (regex/NFA/DFA compilation, LR(1) table construction) is
//! entirely offline and happens before any byte of the input source is
//! read; every error from that stage is fatal and surfaces before parsing
//! begins.
//!
//! ## Example
//!
//! ```
//! use langfront::grammar;
//! use langfront::lr;
//! use langfront::scanner::Scanner;
//! use langfront::reader::BufReader;
//! use langfront::symbol::HashSymbolTable;
//! use langfront::ast::DefaultAstBuilder;
//! use langfront::spec::TokenSpec;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let grammar_src = "\
//! Terminals:\nid +\nNonTerminals:\nE T\nStart:\nE\nProductions:\nE : E + T\nE : T\nT : id\n";
//! let grammar = grammar::parse(grammar_src)?;
//! let tables = lr::build(&grammar)?;
//!
//! let specs = vec![
//!     TokenSpec { name: "id".into(), regex: "[a-z]+".into(), ignore: false, priority: 10 },
//!     TokenSpec { name: "+".into(), regex: "\\+".into(), ignore: false, priority: 5 },
//!     TokenSpec { name: "WS".into(), regex: " +".into(), ignore: true, priority: 1 },
//! ];
//! let mut scanner = Scanner::new(BufReader::new("id + id"), &specs, None)?;
//! let mut symbols = HashSymbolTable::new();
//! let mut builder = DefaultAstBuilder;
//!
//! let ast = langfront::parser::parse(&tables, &mut scanner, &mut symbols, &mut builder)?;
//! assert_eq!(&*ast.symbol, "E");
//! # Ok(())
//! # }
//! ```

pub mod ast;
pub mod dfa;
pub mod grammar;
pub mod lr;
pub mod nfa;
pub mod parser;
pub mod preprocessor;
pub mod reader;
pub mod regex;
pub mod scanner;
pub mod spec;
pub mod symbol;
pub mod token;


use thiserror::Error;

/// The union of every fatal error this crate can raise, across both the
/// offline table-building stage and the run-time scan/parse stage (spec
/// §7). Table-building errors (everything except [`Error::Parse`]) always
/// occur before a single byte of input is consumed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    RegexSyntax(#[from] regex::RegexError),
    #[error(transparent)]
    EmptyCharClass(#[from] nfa::NfaError),
    #[error(transparent)]
    SpecFormat(#[from] spec::SpecError),
    #[error(transparent)]
    GrammarFormat(#[from] grammar::GrammarError),
    /// Undeclared symbols, duplicate productions, and shift/reduce or
    /// reduce/reduce conflicts (spec's `GrammarSymbol` and `GrammarConflict`
    /// kinds, both raised by the same table-construction pass).
    #[error(transparent)]
    GrammarTable(#[from] lr::GrammarError),
    #[error(transparent)]
    Scanner(#[from] scanner::ScannerError),
    /// `ParserInternal` (missing GOTO) and `SyntaxError` (no ACTION cell),
    /// both raised by the shift-reduce driver.
    #[error(transparent)]
    Parse(#[from] parser::ParseError),
}
