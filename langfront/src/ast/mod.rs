//! # AST builder
//!
//! Spec §3/§6: an AST node is a symbol name, a terminal/nonterminal flag,
//! and an ordered (possibly empty) list of children. The parser never
//! inspects node contents; it only calls the two [`AstBuilder`] operations
//! during shift and reduce.

use std::rc::Rc;

/// A node in the parse tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AstNode {
    pub symbol: Rc<str>,
    pub is_terminal: bool,
    pub children: Vec<AstNode>,
}

impl AstNode {
    pub fn terminal(symbol: impl Into<Rc<str>>) -> Self {
        AstNode {
            symbol: symbol.into(),
            is_terminal: true,
            children: Vec::new(),
        }
    }

    pub fn nonterminal(symbol: impl Into<Rc<str>>, children: Vec<AstNode>) -> Self {
        AstNode {
            symbol: symbol.into(),
            is_terminal: false,
            children,
        }
    }

    /// The leaf sequence of this tree in left-to-right order (spec §8).
    pub fn leaves(&self) -> Vec<&AstNode> {
        if self.is_terminal {
            vec![self]
        } else {
            self.children.iter().flat_map(AstNode::leaves).collect()
        }
    }
}

/// Called by the shift-reduce driver to materialize AST nodes (spec §6).
/// Node handles are opaque to the parser; here they are simply [`AstNode`]
/// values, since `langfront` has no separate arena allocator to hide behind
/// the trait.
pub trait AstBuilder {
    type Node;

    fn make_terminal(&mut self, symbol: &str) -> Self::Node;
    fn make_node(&mut self, lhs: &str, production_index: usize, children: Vec<Self::Node>) -> Self::Node;
}

/// The default [`AstBuilder`], producing plain [`AstNode`] trees and
/// ignoring the production index (available to callers who build a richer
/// builder keyed on it instead).
#[derive(Debug, Default)]
pub struct DefaultAstBuilder;

impl AstBuilder for DefaultAstBuilder {
    type Node = AstNode;

    fn make_terminal(&mut self, symbol: &str) -> AstNode {
        AstNode::terminal(symbol)
    }

    fn make_node(&mut self, lhs: &str, _production_index: usize, children: Vec<AstNode>) -> AstNode {
        AstNode::nonterminal(lhs, children)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaves_are_left_to_right() {
        let tree = AstNode::nonterminal(
            "E",
            vec![
                AstNode::nonterminal("T", vec![AstNode::terminal("id")]),
                AstNode::terminal("+"),
                AstNode::nonterminal("T", vec![AstNode::terminal("id")]),
            ],
        );
        let symbols: Vec<&str> = tree.leaves().iter().map(|n| &*n.symbol).collect();
        assert_eq!(symbols, vec!["id", "+", "id"]);
    }
}
