//! # Nondeterministic finite automaton (Thompson construction)
//!
//! An [`Nfa`] is a graph of states indexed `0..N`, operating over the byte
//! alphabet `0..=255` (spec §1 Non-goals: no Unicode beyond single bytes).
//! Each state holds a 256-entry table of byte transitions, a list of
//! epsilon-transition targets, an accept flag and an optional token tag.
//!
//! Single-regex NFAs (built by [`Nfa::from_regex`]) have exactly one accept
//! state, reachable through [`Nfa::accept_state`]. The combined NFA built by
//! [`Nfa::combine`] has no single accept state (`accept_state() == None`);
//! every accepting state instead carries the tag of the rule it represents,
//! and tag information is the sole recognition signal, per spec §4.2.

use crate::regex::{Regex, RegexNode};
use thiserror::Error;

/// One state of an [`Nfa`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NfaState {
    /// `transitions[b]` is the set of states reachable on byte `b`.
    pub transitions: Box<[Vec<usize>; 256]>,
    pub epsilon: Vec<usize>,
    pub accept: bool,
    /// Set only on accepting states of a combined NFA; identifies which
    /// rule (by its caller-supplied tag) accepts here. Lower tag = higher
    /// priority (spec §4.3).
    pub tag: Option<u32>,
}

impl NfaState {
    fn empty() -> Self {
        NfaState {
            transitions: Box::new(std::array::from_fn(|_| Vec::new())),
            epsilon: Vec::new(),
            accept: false,
            tag: None,
        }
    }
}

/// A Thompson-constructed NFA. `accept_state` is `Some` only for an NFA
/// built from a single regex; combined NFAs (spec §4.2) carry recognition
/// information purely via per-state tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nfa {
    pub states: Vec<NfaState>,
    pub start: usize,
    pub accept_state: Option<usize>,
}

/// Raised when a character class expands to zero bytes (spec §4.2).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NfaError {
    #[error("character class expands to zero bytes")]
    EmptyCharClass,
}

impl Nfa {
    /// Thompson-constructs an NFA for a single regex (spec §4.2).
    pub fn from_regex(regex: &Regex) -> Result<Nfa, NfaError> {
        let mut builder = Builder { states: Vec::new() };
        let (start, accept) = builder.build(regex.root())?;
        Ok(Nfa {
            states: builder.states,
            start,
            accept_state: Some(accept),
        })
    }

    /// Builds the combined NFA for `regexes`, tagging each sub-NFA's accept
    /// state with the corresponding entry of `tags` (spec §4.2). `regexes`
    /// and `tags` must have the same length.
    pub fn combine(regexes: &[Regex], tags: &[u32]) -> Result<Nfa, NfaError> {
        assert_eq!(regexes.len(), tags.len(), "one tag per regex");

        let mut states = Vec::new();
        let mut sub_starts = Vec::with_capacity(regexes.len());

        for (regex, &tag) in regexes.iter().zip(tags) {
            let mut builder = Builder { states: Vec::new() };
            let (sub_start, sub_accept) = builder.build(regex.root())?;
            let offset = states.len();
            let mut sub_states = builder.states;
            relocate(&mut sub_states, offset);
            states.append(&mut sub_states);
            let accept_idx = sub_accept + offset;
            states[accept_idx].tag = Some(tag);
            sub_starts.push(sub_start + offset);
        }

        let combined_start = states.len();
        states.push(NfaState::empty());
        for sub_start in sub_starts {
            states[combined_start].epsilon.push(sub_start);
        }

        Ok(Nfa {
            states,
            start: combined_start,
            accept_state: None,
        })
    }

    /// Epsilon-closure of `set`: every state reachable via zero or more
    /// epsilon transitions.
    pub fn epsilon_closure(&self, set: &[usize]) -> Vec<usize> {
        let mut closure: Vec<usize> = set.to_vec();
        let mut stack = set.to_vec();
        while let Some(s) = stack.pop() {
            for &next in &self.states[s].epsilon {
                if !closure.contains(&next) {
                    closure.push(next);
                    stack.push(next);
                }
            }
        }
        closure
    }

    /// Whether this NFA accepts the empty string. Used to reject token-spec
    /// rules whose regex matches empty (spec §8 boundary behaviors): such a
    /// rule would let the scanner's longest-match loop accept zero bytes and
    /// never make progress.
    pub fn accepts_empty(&self) -> bool {
        self.epsilon_closure(&[self.start])
            .iter()
            .any(|&s| self.states[s].accept)
    }

    /// States reachable from `set` on byte `b` (no epsilon-closure applied).
    pub fn step(&self, set: &[usize], b: u8) -> Vec<usize> {
        let mut result = Vec::new();
        for &s in set {
            for &next in &self.states[s].transitions[b as usize] {
                if !result.contains(&next) {
                    result.push(next);
                }
            }
        }
        result
    }
}

fn relocate(states: &mut [NfaState], offset: usize) {
    for state in states.iter_mut() {
        for targets in state.transitions.iter_mut() {
            for t in targets.iter_mut() {
                *t += offset;
            }
        }
        for e in state.epsilon.iter_mut() {
            *e += offset;
        }
    }
}

struct Builder {
    states: Vec<NfaState>,
}

impl Builder {
    fn add_state(&mut self) -> usize {
        self.states.push(NfaState::empty());
        self.states.len() - 1
    }

    /// Builds the fragment for `node`, returning `(start, accept)`. Exactly
    /// one state in the fragment carries `accept = true` when this returns.
    fn build(&mut self, node: &RegexNode) -> Result<(usize, usize), NfaError> {
        match node {
            RegexNode::Literal(b) => Ok(self.literal(*b)),
            RegexNode::Epsilon => Ok(self.epsilon()),
            RegexNode::CharClass(items) => self.char_class(items),
            RegexNode::Concat(l, r) => {
                let (l_start, l_accept) = self.build(l)?;
                let (r_start, r_accept) = self.build(r)?;
                Ok(self.concat(l_start, l_accept, r_start, r_accept))
            }
            RegexNode::Alt(l, r) => {
                let (l_start, l_accept) = self.build(l)?;
                let (r_start, r_accept) = self.build(r)?;
                Ok(self.alt(l_start, l_accept, r_start, r_accept))
            }
            RegexNode::Star(c) => {
                let (c_start, c_accept) = self.build(c)?;
                Ok(self.star(c_start, c_accept))
            }
            RegexNode::Plus(c) => {
                // Plus(C) = Concat(C, Star(C)): build C twice, independently,
                // since each fragment owns disjoint states (spec §4.2).
                let (c_start, c_accept) = self.build(c)?;
                let (c2_start, c2_accept) = self.build(c)?;
                let (star_start, star_accept) = self.star(c2_start, c2_accept);
                Ok(self.concat(c_start, c_accept, star_start, star_accept))
            }
            RegexNode::Question(c) => {
                let (eps_start, eps_accept) = self.epsilon();
                let (c_start, c_accept) = self.build(c)?;
                Ok(self.alt(eps_start, eps_accept, c_start, c_accept))
            }
        }
    }

    fn literal(&mut self, b: u8) -> (usize, usize) {
        let s0 = self.add_state();
        let s1 = self.add_state();
        self.states[s0].transitions[b as usize].push(s1);
        self.states[s1].accept = true;
        (s0, s1)
    }

    fn epsilon(&mut self) -> (usize, usize) {
        let s0 = self.add_state();
        let s1 = self.add_state();
        self.states[s0].epsilon.push(s1);
        self.states[s1].accept = true;
        (s0, s1)
    }

    fn char_class(&mut self, items: &[crate::regex::ClassItem]) -> Result<(usize, usize), NfaError> {
        let bytes: Vec<u8> = items.iter().flat_map(|i| i.bytes()).collect();
        let mut iter = bytes.into_iter();
        let first = iter.next().ok_or(NfaError::EmptyCharClass)?;
        let mut frag = self.literal(first);
        for b in iter {
            let next = self.literal(b);
            frag = self.alt(frag.0, frag.1, next.0, next.1);
        }
        Ok(frag)
    }

    fn concat(&mut self, l_start: usize, l_accept: usize, r_start: usize, r_accept: usize) -> (usize, usize) {
        self.states[l_accept].accept = false;
        self.states[l_accept].epsilon.push(r_start);
        (l_start, r_accept)
    }

    fn alt(&mut self, l_start: usize, l_accept: usize, r_start: usize, r_accept: usize) -> (usize, usize) {
        let start = self.add_state();
        let accept = self.add_state();
        self.states[start].epsilon.push(l_start);
        self.states[start].epsilon.push(r_start);
        self.states[l_accept].accept = false;
        self.states[l_accept].epsilon.push(accept);
        self.states[r_accept].accept = false;
        self.states[r_accept].epsilon.push(accept);
        self.states[accept].accept = true;
        (start, accept)
    }

    fn star(&mut self, c_start: usize, c_accept: usize) -> (usize, usize) {
        let start = self.add_state();
        let accept = self.add_state();
        self.states[start].epsilon.push(c_start);
        self.states[start].epsilon.push(accept);
        self.states[c_accept].accept = false;
        self.states[c_accept].epsilon.push(c_start);
        self.states[c_accept].epsilon.push(accept);
        self.states[accept].accept = true;
        (start, accept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regex::Regex;

    fn accepts(nfa: &Nfa, input: &[u8]) -> bool {
        let mut current = nfa.epsilon_closure(&[nfa.start]);
        for &b in input {
            let moved = nfa.step(&current, b);
            current = nfa.epsilon_closure(&moved);
            if current.is_empty() {
                return false;
            }
        }
        current.iter().any(|&s| nfa.states[s].accept)
    }

    #[test]
    fn literal_matches_only_itself() {
        let re = Regex::parse("ab").unwrap();
        let nfa = Nfa::from_regex(&re).unwrap();
        assert!(accepts(&nfa, b"ab"));
        assert!(!accepts(&nfa, b"a"));
        assert!(!accepts(&nfa, b"abc"));
    }

    #[test]
    fn star_matches_zero_or_more() {
        let re = Regex::parse("a*").unwrap();
        let nfa = Nfa::from_regex(&re).unwrap();
        assert!(accepts(&nfa, b""));
        assert!(accepts(&nfa, b"aaaa"));
        assert!(!accepts(&nfa, b"b"));
    }

    #[test]
    fn plus_requires_at_least_one() {
        let re = Regex::parse("a+").unwrap();
        let nfa = Nfa::from_regex(&re).unwrap();
        assert!(!accepts(&nfa, b""));
        assert!(accepts(&nfa, b"a"));
        assert!(accepts(&nfa, b"aaa"));
    }

    #[test]
    fn char_class_matches_any_member() {
        let re = Regex::parse("[a-c]").unwrap();
        let nfa = Nfa::from_regex(&re).unwrap();
        assert!(accepts(&nfa, b"a"));
        assert!(accepts(&nfa, b"b"));
        assert!(accepts(&nfa, b"c"));
        assert!(!accepts(&nfa, b"d"));
    }

    #[test]
    fn empty_char_class_is_rejected() {
        let re = Regex::parse("[]").unwrap();
        assert_eq!(Nfa::from_regex(&re), Err(NfaError::EmptyCharClass));
    }

    #[test]
    fn combined_nfa_tags_each_accept_with_its_rule() {
        let a = Regex::parse("a").unwrap();
        let b = Regex::parse("b").unwrap();
        let nfa = Nfa::combine(&[a, b], &[0, 1]).unwrap();
        assert!(nfa.accept_state.is_none());
        let accepting_tags: Vec<u32> = nfa
            .states
            .iter()
            .filter(|s| s.accept)
            .filter_map(|s| s.tag)
            .collect();
        assert_eq!(accepting_tags.len(), 2);
        assert!(accepting_tags.contains(&0));
        assert!(accepting_tags.contains(&1));
    }
}
