use crate::regex::{ClassItem, Regex, RegexNode};
use thiserror::Error;

/// Failure modes of the regex parser, spec §4.1/§7: `RegexSyntax`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegexError {
    #[error("unclosed group starting near byte offset {0}")]
    UnclosedGroup(usize),
    #[error("unclosed character class starting near byte offset {0}")]
    UnclosedClass(usize),
    #[error("unexpected end of pattern after '\\'")]
    DanglingEscape,
    #[error("bad range in character class: '{0}'-'{1}' (start > end)")]
    BadRange(u8, u8),
    #[error("trailing input after top-level expression, starting at byte offset {0}")]
    TrailingInput(usize),
}

/// Parses `pattern` per the grammar in spec §4.1:
/// ```text
/// alt  := cat ('|' cat)*
/// cat  := rep rep*
/// rep  := base ('*' | '+' | '?')*
/// base := '(' alt ')' | '[' class ']' | '\' esc | literal | ε
/// ```
pub fn parse(pattern: &str) -> Result<Regex, RegexError> {
    let mut cursor = Cursor::new(pattern.as_bytes());
    let root = cursor.parse_alt()?;
    if !cursor.at_end() {
        return Err(RegexError::TrailingInput(cursor.pos));
    }
    Ok(Regex { root })
}

struct Cursor<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a [u8]) -> Self {
        Cursor { input, pos: 0 }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        Some(b)
    }

    fn eat(&mut self, b: u8) -> bool {
        if self.peek() == Some(b) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// `alt := cat ('|' cat)*`
    fn parse_alt(&mut self) -> Result<RegexNode, RegexError> {
        let mut node = self.parse_cat()?;
        while self.eat(b'|') {
            let rhs = self.parse_cat()?;
            node = RegexNode::Alt(Box::new(node), Box::new(rhs));
        }
        Ok(node)
    }

    /// `cat := rep rep*`, terminated by `|`, `)`, or end of input.
    fn parse_cat(&mut self) -> Result<RegexNode, RegexError> {
        let mut node = self.parse_rep()?;
        loop {
            match self.peek() {
                None | Some(b'|') | Some(b')') => break,
                _ => {
                    let rhs = self.parse_rep()?;
                    node = RegexNode::Concat(Box::new(node), Box::new(rhs));
                }
            }
        }
        Ok(node)
    }

    /// `rep := base ('*' | '+' | '?')*`, applied left-to-right so `a**`
    /// parses as `(a*)*`.
    fn parse_rep(&mut self) -> Result<RegexNode, RegexError> {
        let mut node = self.parse_base()?;
        loop {
            match self.peek() {
                Some(b'*') => {
                    self.pos += 1;
                    node = RegexNode::Star(Box::new(node));
                }
                Some(b'+') => {
                    self.pos += 1;
                    node = RegexNode::Plus(Box::new(node));
                }
                Some(b'?') => {
                    self.pos += 1;
                    node = RegexNode::Question(Box::new(node));
                }
                _ => break,
            }
        }
        Ok(node)
    }

    /// `base := '(' alt ')' | '[' class ']' | '\' esc | literal | ε`
    fn parse_base(&mut self) -> Result<RegexNode, RegexError> {
        match self.peek() {
            None | Some(b'|') | Some(b')') | Some(b'*') | Some(b'+') | Some(b'?') => {
                Ok(RegexNode::Epsilon)
            }
            Some(b'(') => {
                let start = self.pos;
                self.pos += 1;
                let inner = self.parse_alt()?;
                if !self.eat(b')') {
                    return Err(RegexError::UnclosedGroup(start));
                }
                Ok(inner)
            }
            Some(b'[') => {
                let start = self.pos;
                self.pos += 1;
                let items = self.parse_class()?;
                if !self.eat(b']') {
                    return Err(RegexError::UnclosedClass(start));
                }
                Ok(RegexNode::CharClass(items))
            }
            Some(b'\\') => {
                self.pos += 1;
                let b = self.parse_escape()?;
                Ok(RegexNode::Literal(b))
            }
            Some(b) => {
                self.pos += 1;
                Ok(RegexNode::Literal(b))
            }
        }
    }

    /// Contents between `[` and `]`. `\` escapes the next byte; `x-y`
    /// denotes an inclusive range, rejected here if `x > y`.
    fn parse_class(&mut self) -> Result<Vec<ClassItem>, RegexError> {
        let mut items = Vec::new();
        while let Some(b) = self.peek() {
            if b == b']' {
                break;
            }
            let lo = if b == b'\\' {
                self.pos += 1;
                self.parse_escape()?
            } else {
                self.pos += 1;
                b
            };
            if self.peek() == Some(b'-') && self.input.get(self.pos + 1) != Some(&b']') {
                self.pos += 1; // consume '-'
                let next = self.advance().ok_or(RegexError::DanglingEscape)?;
                let hi = if next == b'\\' {
                    self.parse_escape()?
                } else {
                    next
                };
                if lo > hi {
                    return Err(RegexError::BadRange(lo, hi));
                }
                items.push(ClassItem::Range(lo, hi));
            } else {
                items.push(ClassItem::Byte(lo));
            }
        }
        Ok(items)
    }

    /// Maps `n r t` to their C meanings; `\ | * + ? ( ) [ ]` to themselves;
    /// any other escaped byte is taken literally.
    fn parse_escape(&mut self) -> Result<u8, RegexError> {
        let b = self.advance().ok_or(RegexError::DanglingEscape)?;
        Ok(match b {
            b'n' => b'\n',
            b'r' => b'\r',
            b't' => b'\t',
            other => other,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regex::RegexNode::*;

    #[test]
    fn leading_alt_is_epsilon_alternative() {
        // pattern `|abc` parses to Alt(Epsilon, Concat(a, Concat(b, c)))
        let re = parse("|abc").unwrap();
        assert_eq!(
            re.root,
            Alt(
                Box::new(Epsilon),
                Box::new(Concat(
                    Box::new(Literal(b'a')),
                    Box::new(Concat(Box::new(Literal(b'b')), Box::new(Literal(b'c'))))
                ))
            )
        );
    }

    #[test]
    fn double_star_nests() {
        let re = parse("a**").unwrap();
        assert_eq!(re.root, Star(Box::new(Star(Box::new(Literal(b'a'))))));
    }

    #[test]
    fn char_class_range() {
        let re = parse("[a-z]").unwrap();
        assert_eq!(re.root, CharClass(vec![ClassItem::Range(b'a', b'z')]));
    }

    #[test]
    fn bad_range_is_rejected() {
        assert_eq!(parse("[z-a]"), Err(RegexError::BadRange(b'z', b'a')));
    }

    #[test]
    fn unclosed_group_fails() {
        assert!(matches!(parse("(ab"), Err(RegexError::UnclosedGroup(_))));
    }

    #[test]
    fn unclosed_class_fails() {
        assert!(matches!(parse("[ab"), Err(RegexError::UnclosedClass(_))));
    }

    #[test]
    fn trailing_input_fails() {
        assert!(matches!(parse("ab)"), Err(RegexError::TrailingInput(_))));
    }

    #[test]
    fn escapes_map_to_control_bytes() {
        let re = parse(r"\n\t\r").unwrap();
        assert_eq!(
            re.root,
            Concat(
                Box::new(Literal(b'\n')),
                Box::new(Concat(Box::new(Literal(b'\t')), Box::new(Literal(b'\r'))))
            )
        );
    }

    #[test]
    fn escaped_meta_is_literal() {
        let re = parse(r"\*").unwrap();
        assert_eq!(re.root, Literal(b'*'));
    }
}
