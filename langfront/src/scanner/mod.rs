//! # Scanner (longest-match driver)
//!
//! Drives a combined [`Dfa`] over a [`Reader`] to produce one [`Token`] per
//! call (spec §4.4). The scan loop only ever *peeks* ahead of the reader's
//! committed position; once the longest accepting prefix is known, exactly
//! that many bytes are consumed with `reader.next()`. This realizes the
//! lookahead-buffer resolution of the reader/rewind open question (spec
//! §9): nothing is ever read from the reader that isn't kept, so there is
//! no need for the reader itself to support rewinding.

use crate::dfa::Dfa;
use crate::nfa::{Nfa, NfaError};
use crate::reader::Reader;
use crate::regex::{Regex, RegexError};
use crate::symbol::SymbolTable;
use crate::token::{Token, TokenKind};
use std::rc::Rc;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScannerError {
    #[error("token {name:?}: {source}")]
    Regex { name: String, source: RegexError },
    #[error("token {name:?}: {source}")]
    Nfa { name: String, source: NfaError },
    #[error("token {name:?}: regex matches the empty string, which would stall the scanner")]
    EmptyMatch { name: String },
}

struct Rule {
    name: Rc<str>,
    ignore: bool,
}

/// A compiled scanner: one combined DFA plus the per-rule metadata needed
/// to turn a winning tag back into a [`Token`].
pub struct Scanner<R: Reader> {
    reader: R,
    dfa: Dfa,
    rules: Vec<Rule>,
    identifier_kind: Option<Rc<str>>,
}

impl<R: Reader> Scanner<R> {
    /// Compiles `specs` into a DFA and wraps `reader`. `identifier_kind`, if
    /// given, names the token-spec rule whose matches are interned into the
    /// symbol table (spec §6).
    pub fn new(
        reader: R,
        specs: &[crate::spec::TokenSpec],
        identifier_kind: Option<&str>,
    ) -> Result<Self, ScannerError> {
        let mut ordered: Vec<&crate::spec::TokenSpec> = specs.iter().collect();
        ordered.sort_by_key(|s| s.priority);

        let mut regexes = Vec::with_capacity(ordered.len());
        let mut rules = Vec::with_capacity(ordered.len());
        let mut tags = Vec::with_capacity(ordered.len());

        for (tag, spec) in ordered.into_iter().enumerate() {
            let regex = Regex::parse(&spec.regex).map_err(|source| ScannerError::Regex {
                name: spec.name.clone(),
                source,
            })?;
            let nfa = Nfa::from_regex(&regex).map_err(|source| ScannerError::Nfa {
                name: spec.name.clone(),
                source,
            })?;
            if nfa.accepts_empty() {
                return Err(ScannerError::EmptyMatch {
                    name: spec.name.clone(),
                });
            }
            regexes.push(regex);
            rules.push(Rule {
                name: Rc::from(spec.name.as_str()),
                ignore: spec.ignore,
            });
            tags.push(tag as u32);
        }

        let combined = Nfa::combine(&regexes, &tags).map_err(|source| ScannerError::Nfa {
            name: "<combined>".to_string(),
            source,
        })?;
        let dfa = Dfa::from_nfa(&combined);
        log::debug!(
            "compiled scanner: {} rules, {} dfa states",
            rules.len(),
            dfa.states.len()
        );

        Ok(Scanner {
            reader,
            dfa,
            rules,
            identifier_kind: identifier_kind.map(Rc::from),
        })
    }

    pub fn reader(&self) -> &R {
        &self.reader
    }

    /// Returns the next token, skipping over any matches of `ignore` rules
    /// (spec §4.4 step 5).
    pub fn next_token(&mut self, symbols: &mut dyn SymbolTable) -> Token {
        loop {
            if self.reader.at_end() {
                return Token::eof(self.reader.line(), self.reader.column());
            }
            let start_line = self.reader.line();
            let start_column = self.reader.column();

            let (lexeme, bookmark) = self.scan_longest();

            let Some((len, tag)) = bookmark else {
                let byte = self.reader.next().expect("checked at_end above");
                log::trace!("unknown byte {byte:#04x} at {start_line}:{start_column}");
                return Token::new(
                    TokenKind::Unknown,
                    String::from_utf8_lossy(&[byte]).into_owned(),
                    start_line,
                    start_column,
                );
            };

            for _ in 0..len {
                self.reader.next();
            }
            let rule = &self.rules[tag as usize];
            if rule.ignore {
                log::trace!("ignored {:?} at {start_line}:{start_column}", rule.name);
                continue;
            }

            let text = String::from_utf8_lossy(&lexeme[..len]).into_owned();
            log::trace!("token {:?} {text:?} at {start_line}:{start_column}", rule.name);
            let mut token = Token::new(
                TokenKind::Named(rule.name.clone()),
                text,
                start_line,
                start_column,
            );
            if self.identifier_kind.as_deref() == Some(&*rule.name) {
                token.symbol_id = Some(symbols.intern(&token.lexeme));
            }
            return token;
        }
    }

    /// Runs the DFA over peeked-ahead bytes without consuming any of them,
    /// returning the full run of matched bytes and the bookmark
    /// `(length, tag)` of the longest accepting prefix seen, if any (spec
    /// §4.4 steps 2-4).
    fn scan_longest(&self) -> (Vec<u8>, Option<(usize, i32)>) {
        let mut state = self.dfa.start;
        let mut offset = 0usize;
        let mut lexeme = Vec::new();
        let mut bookmark: Option<(usize, i32)> = None;

        while let Some(byte) = self.reader.peek(offset) {
            let next = self.dfa.states[state].transitions[byte as usize];
            if next == Dfa::DEAD {
                break;
            }
            state = next as usize;
            offset += 1;
            lexeme.push(byte);
            if self.dfa.states[state].accept {
                bookmark = Some((offset, self.dfa.states[state].tag));
            }
        }
        (lexeme, bookmark)
    }
}
