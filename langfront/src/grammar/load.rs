//! File format (spec §6): four section headers on their own lines,
//! `Terminals:`, `NonTerminals:`, `Start:`, `Productions:`; each section's
//! non-comment lines apply until the next header. `#`-comments and blank
//! lines are ignored throughout, matching the token-spec file (grounded in
//! `original_source`'s `GrammarReader.cpp`). Missing `Start:` or
//! `Productions:` is fatal.

use crate::grammar::{Grammar, Production};
use nom::character::complete::space1;
use nom::multi::separated_list1;
use nom::IResult;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GrammarError {
    #[error("line {0}: unexpected line outside of any section: {1:?}")]
    OutsideSection(usize, String),
    #[error("line {0}: Start section must contain exactly one symbol: {1:?}")]
    MultiSymbolStart(usize, String),
    #[error("line {0}: production must contain ':': {1:?}")]
    MissingColon(usize, String),
    #[error("line {0}: production has empty left or right side: {1:?}")]
    EmptyProduction(usize, String),
    #[error("no Start symbol specified in grammar file")]
    NoStart,
    #[error("no productions found in grammar file")]
    NoProductions,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Terminals,
    NonTerminals,
    Start,
    Productions,
}

/// Parses a whole grammar file (spec §6).
pub fn parse(input: &str) -> Result<Grammar, GrammarError> {
    let mut grammar = Grammar {
        terminals: Vec::new(),
        nonterminals: Vec::new(),
        start: String::new(),
        productions: Vec::new(),
    };
    let mut section = Section::None;

    for (idx, raw_line) in input.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match line {
            "Terminals:" => {
                section = Section::Terminals;
                continue;
            }
            "NonTerminals:" => {
                section = Section::NonTerminals;
                continue;
            }
            "Start:" => {
                section = Section::Start;
                continue;
            }
            "Productions:" => {
                section = Section::Productions;
                continue;
            }
            _ => {}
        }
        match section {
            Section::Terminals => grammar.terminals.extend(symbol_list(line)),
            Section::NonTerminals => grammar.nonterminals.extend(symbol_list(line)),
            Section::Start => {
                if line.split_whitespace().count() != 1 {
                    return Err(GrammarError::MultiSymbolStart(line_no, line.to_string()));
                }
                grammar.start = line.to_string();
            }
            Section::Productions => {
                grammar.productions.push(parse_production(line, line_no)?);
            }
            Section::None => {
                return Err(GrammarError::OutsideSection(line_no, line.to_string()));
            }
        }
    }

    if grammar.start.is_empty() {
        return Err(GrammarError::NoStart);
    }
    if grammar.productions.is_empty() {
        return Err(GrammarError::NoProductions);
    }
    Ok(grammar)
}

fn symbol_list(line: &str) -> Vec<String> {
    symbols(line)
        .map(|(_, v)| v)
        .unwrap_or_default()
        .into_iter()
        .map(str::to_string)
        .collect()
}

fn symbols(input: &str) -> IResult<&str, Vec<&str>> {
    separated_list1(space1, nom::bytes::complete::is_not(" \t"))(input)
}

fn parse_production(line: &str, line_no: usize) -> Result<Production, GrammarError> {
    let colon = line
        .find(':')
        .ok_or_else(|| GrammarError::MissingColon(line_no, line.to_string()))?;
    let left = line[..colon].trim();
    let right = line[colon + 1..].trim();
    if left.is_empty() || right.is_empty() {
        return Err(GrammarError::EmptyProduction(line_no, line.to_string()));
    }
    Ok(Production {
        left: left.to_string(),
        right: right.split_whitespace().map(str::to_string).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "
Terminals:
id + $
NonTerminals:
E T
Start:
E
Productions:
E : E + T
E : T
T : id
";

    #[test]
    fn parses_full_grammar() {
        let g = parse(SAMPLE).unwrap();
        assert_eq!(g.terminals, vec!["id", "+", "$"]);
        assert_eq!(g.nonterminals, vec!["E", "T"]);
        assert_eq!(g.start, "E");
        assert_eq!(g.productions.len(), 3);
        assert_eq!(g.productions[0].left, "E");
        assert_eq!(g.productions[0].right, vec!["E", "+", "T"]);
    }

    #[test]
    fn missing_start_is_fatal() {
        let missing = "Terminals:\nid\nNonTerminals:\nE\nProductions:\nE : id\n";
        assert_eq!(parse(missing), Err(GrammarError::NoStart));
    }

    #[test]
    fn missing_productions_is_fatal() {
        let missing = "Terminals:\nid\nNonTerminals:\nE\nStart:\nE\n";
        assert_eq!(parse(missing), Err(GrammarError::NoProductions));
    }

    #[test]
    fn multi_symbol_start_is_rejected() {
        let bad = "Start:\nE T\nProductions:\nE : id\n";
        assert!(matches!(parse(bad), Err(GrammarError::MultiSymbolStart(_, _))));
    }

    #[test]
    fn production_without_colon_is_rejected() {
        let bad = "Start:\nE\nProductions:\nE id\n";
        assert!(matches!(parse(bad), Err(GrammarError::MissingColon(_, _))));
    }
}
