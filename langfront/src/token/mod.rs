//! Tokens produced by the [`scanner`](crate::scanner).

use std::fmt;
use std::rc::Rc;

/// The kind of a token: either the name of the token-spec rule that
/// matched, or one of the two sentinel kinds the scanner may also emit
/// (spec §3, §7).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Name of the matching rule from the token-spec file, e.g. `"IDENT"`.
    Named(Rc<str>),
    /// No rule matched the next byte; not fatal on its own (spec §7).
    Unknown,
    /// The input stream is exhausted.
    EndOfFile,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Named(name) => write!(f, "{name}"),
            TokenKind::Unknown => write!(f, "<unknown>"),
            TokenKind::EndOfFile => write!(f, "$"),
        }
    }
}

/// A single scanned token: its kind, lexeme text, the line/column of its
/// first byte, and an optional symbol-table id (set only for identifier
/// tokens, spec §4.4 step 6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub line: usize,
    pub column: usize,
    pub symbol_id: Option<usize>,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, line: usize, column: usize) -> Self {
        Token {
            kind,
            lexeme: lexeme.into(),
            line,
            column,
            symbol_id: None,
        }
    }

    pub fn eof(line: usize, column: usize) -> Self {
        Token::new(TokenKind::EndOfFile, "", line, column)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({:?}) at {}:{}",
            self.kind, self.lexeme, self.line, self.column
        )
    }
}
