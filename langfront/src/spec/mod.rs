//! # Token-spec loader
//!
//! Parses the lexical-rule file format from spec §6: one rule per line,
//! `#`-prefixed and blank lines ignored, fields `NAME REGEX IGNORE
//! PRIORITY`. `REGEX` is everything between the whitespace after `NAME`
//! and the whitespace before `IGNORE`; internal whitespace inside `REGEX`
//! is preserved literally, so field boundaries are found from the outside
//! in rather than by a single whitespace split. Grounded in
//! `original_source`'s `TokenSpecReader.cpp`.

use std::fmt;
use thiserror::Error;

/// One lexical rule: a name, a regex pattern, whether matches of this rule
/// are discarded by the scanner, and a priority (smaller = higher, spec
/// §4.3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSpec {
    pub name: String,
    pub regex: String,
    pub ignore: bool,
    pub priority: i64,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SpecError {
    #[error("malformed token-spec line {line}: {reason} ({text:?})")]
    Malformed {
        line: usize,
        reason: &'static str,
        text: String,
    },
}

/// Parses a whole token-spec file (spec §6).
pub fn parse(input: &str) -> Result<Vec<TokenSpec>, SpecError> {
    let mut specs = Vec::new();
    for (idx, raw_line) in input.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        specs.push(parse_line(line, idx + 1)?);
    }
    Ok(specs)
}

fn parse_line(line: &str, line_no: usize) -> Result<TokenSpec, SpecError> {
    let malformed = |reason: &'static str| SpecError::Malformed {
        line: line_no,
        reason,
        text: line.to_string(),
    };

    let ws = line
        .find(char::is_whitespace)
        .ok_or_else(|| malformed("expected at least 4 whitespace-separated fields"))?;
    let name = &line[..ws];
    let after_name = line[ws..].trim_start();

    let (rest, priority_tok) =
        rsplit_last_token(after_name).ok_or_else(|| malformed("missing PRIORITY field"))?;
    let (regex, ignore_tok) =
        rsplit_last_token(rest).ok_or_else(|| malformed("missing IGNORE field"))?;

    if regex.is_empty() {
        return Err(malformed("REGEX field is empty"));
    }

    let ignore = parse_ignore(ignore_tok).ok_or_else(|| malformed("IGNORE must be true|false|1|0"))?;
    let priority: i64 = priority_tok
        .parse()
        .map_err(|_| malformed("PRIORITY must be a signed decimal integer"))?;

    Ok(TokenSpec {
        name: name.to_string(),
        regex: regex.to_string(),
        ignore,
        priority,
    })
}

fn parse_ignore(tok: &str) -> Option<bool> {
    match tok {
        "true" | "True" | "1" => Some(true),
        "false" | "False" | "0" => Some(false),
        _ => None,
    }
}

/// Splits off the last whitespace-separated token from `s`, returning
/// `(everything_before_it, token)`. `everything_before_it` is not
/// re-trimmed, so internal whitespace runs are preserved for a caller that
/// wants to split off further trailing tokens.
fn rsplit_last_token(s: &str) -> Option<(&str, &str)> {
    let trimmed = s.trim_end();
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.rfind(char::is_whitespace) {
        Some(i) => Some((&trimmed[..i], &trimmed[i + 1..])),
        None => None,
    }
}

impl fmt::Display for TokenSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.name, self.regex, self.ignore, self.priority
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_spec() {
        let specs = parse("IDENT [a-zA-Z]+ false 10\nWS [ \\t\\r\\n]+ true 1\n").unwrap();
        assert_eq!(
            specs,
            vec![
                TokenSpec {
                    name: "IDENT".into(),
                    regex: "[a-zA-Z]+".into(),
                    ignore: false,
                    priority: 10
                },
                TokenSpec {
                    name: "WS".into(),
                    regex: "[ \\t\\r\\n]+".into(),
                    ignore: true,
                    priority: 1
                },
            ]
        );
    }

    #[test]
    fn skips_comments_and_blank_lines() {
        let specs = parse("# a comment\n\nIDENT [a-z]+ false 1\n").unwrap();
        assert_eq!(specs.len(), 1);
    }

    #[test]
    fn internal_whitespace_in_regex_is_preserved() {
        let specs = parse("KW a  b false 1\n").unwrap();
        assert_eq!(specs[0].regex, "a  b");
    }

    #[test]
    fn bad_ignore_flag_is_rejected() {
        assert!(parse("IDENT [a-z]+ maybe 1\n").is_err());
    }

    #[test]
    fn bad_priority_is_rejected() {
        assert!(parse("IDENT [a-z]+ true notanumber\n").is_err());
    }

    #[test]
    fn too_few_fields_is_rejected() {
        assert!(parse("IDENT\n").is_err());
    }
}
