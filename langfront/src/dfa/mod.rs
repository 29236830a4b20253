//! # Deterministic finite automaton (subset construction)
//!
//! A [`Dfa`] is built from an [`Nfa`] by the standard subset construction
//! (spec §4.3). States are indexed `0..M`; each holds a dense 256-entry
//! table mapping a byte to either a target state or [`Dfa::DEAD`] (the
//! sentinel for "no transition" — the dead/sink case is never materialized
//! as a real state). A DFA state is accepting iff any member of its
//! underlying NFA-state subset is accepting; when several NFA accepts
//! coalesce into one DFA state, the **numerically smallest tag wins**,
//! encoding rule priority (longest-match, highest-priority law, spec §8).

use crate::nfa::Nfa;
use std::collections::HashMap;

/// One state of a [`Dfa`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DfaState {
    /// `transitions[b]` is the target state, or [`Dfa::DEAD`].
    pub transitions: Box<[i32; 256]>,
    pub accept: bool,
    /// Meaningful only when `accept` is true.
    pub tag: i32,
}

/// A deterministic finite automaton over bytes, produced by subset
/// construction from a combined [`Nfa`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dfa {
    pub states: Vec<DfaState>,
    pub start: usize,
}

impl Dfa {
    /// Sentinel denoting "no transition" in a [`DfaState`]'s transition
    /// table, and the sentinel tag on non-accepting states.
    pub const DEAD: i32 = -1;

    /// Builds a DFA from `nfa` by subset construction (spec §4.3). Subset
    /// identity is the sorted set of underlying NFA-state indices, keyed
    /// into a hash map so identical subsets collapse to one DFA state.
    pub fn from_nfa(nfa: &Nfa) -> Dfa {
        let start_set = sorted_closure(nfa, &[nfa.start]);
        let mut index: HashMap<Vec<usize>, usize> = HashMap::new();
        let mut states = Vec::new();

        index.insert(start_set.clone(), 0);
        states.push(make_state(nfa, &start_set));

        let mut worklist = vec![start_set];
        while let Some(current) = worklist.pop() {
            let current_id = index[&current];
            for byte in 0u16..256 {
                let byte = byte as u8;
                let moved = nfa.step(&current, byte);
                if moved.is_empty() {
                    continue;
                }
                let target_set = sorted_closure(nfa, &moved);
                if target_set.is_empty() {
                    continue;
                }
                let target_id = match index.get(&target_set) {
                    Some(&id) => id,
                    None => {
                        let id = states.len();
                        index.insert(target_set.clone(), id);
                        states.push(make_state(nfa, &target_set));
                        worklist.push(target_set);
                        id
                    }
                };
                states[current_id].transitions[byte as usize] = target_id as i32;
            }
        }

        Dfa { states, start: 0 }
    }

    /// Runs `input` through the DFA from the start state, returning the
    /// accept tag of the longest matched prefix and its length, or `None`
    /// if no prefix is ever accepted. Primarily a testing convenience; the
    /// scanner (spec §4.4) implements the real longest-match loop against a
    /// [`Reader`](crate::reader::Reader).
    pub fn longest_match(&self, input: &[u8]) -> Option<(i32, usize)> {
        let mut state = self.start;
        let mut best: Option<(i32, usize)> = if self.states[state].accept {
            Some((self.states[state].tag, 0))
        } else {
            None
        };
        for (i, &b) in input.iter().enumerate() {
            let next = self.states[state].transitions[b as usize];
            if next == Dfa::DEAD {
                break;
            }
            state = next as usize;
            if self.states[state].accept {
                best = Some((self.states[state].tag, i + 1));
            }
        }
        best
    }
}

fn sorted_closure(nfa: &Nfa, set: &[usize]) -> Vec<usize> {
    let mut closure = nfa.epsilon_closure(set);
    closure.sort_unstable();
    closure.dedup();
    closure
}

fn make_state(nfa: &Nfa, subset: &[usize]) -> DfaState {
    let mut accept = false;
    // Untagged accepts (a single-regex NFA built outside `combine`) all
    // share tag 0: there is only ever one rule to distinguish.
    let mut tag = 0i32;
    let mut tag_seen = false;
    for &s in subset {
        let state = &nfa.states[s];
        if state.accept {
            accept = true;
            if let Some(t) = state.tag {
                tag = if tag_seen { tag.min(t as i32) } else { t as i32 };
                tag_seen = true;
            }
        }
    }
    DfaState {
        transitions: Box::new([Dfa::DEAD; 256]),
        accept,
        tag: if accept { tag } else { Dfa::DEAD },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regex::Regex;

    #[test]
    fn dfa_accepts_same_language_as_nfa() {
        let re = Regex::parse("(ab)+c").unwrap();
        let nfa = Nfa::from_regex(&re).unwrap();
        let dfa = Dfa::from_nfa(&nfa);
        assert_eq!(dfa.longest_match(b"abc").map(|(_, n)| n), Some(3));
        assert_eq!(dfa.longest_match(b"ababc").map(|(_, n)| n), Some(5));
        assert_eq!(dfa.longest_match(b"c"), None);
    }

    #[test]
    fn combined_dfa_minimum_tag_wins_on_overlap() {
        // KEYWORD=if (tag 0, higher priority), IDENT=[a-z]+ (tag 1)
        let kw = Regex::parse("if").unwrap();
        let ident = Regex::parse("[a-z]+").unwrap();
        let nfa = Nfa::combine(&[kw, ident], &[0, 1]).unwrap();
        let dfa = Dfa::from_nfa(&nfa);
        // "if" matches both rules at length 2; tag 0 (KEYWORD) must win.
        assert_eq!(dfa.longest_match(b"if"), Some((0, 2)));
        // "ifx" only matches IDENT, and only the full 3 bytes (longest match).
        assert_eq!(dfa.longest_match(b"ifx"), Some((1, 3)));
    }

    #[test]
    fn subset_construction_is_idempotent_up_to_signature() {
        let re = Regex::parse("a(b|c)*d").unwrap();
        let nfa = Nfa::from_regex(&re).unwrap();
        let dfa1 = Dfa::from_nfa(&nfa);
        let dfa2 = Dfa::from_nfa(&nfa);
        assert_eq!(dfa1.states.len(), dfa2.states.len());
        assert_eq!(
            dfa1.states[dfa1.start].accept,
            dfa2.states[dfa2.start].accept
        );
        assert_eq!(dfa1.states[dfa1.start].tag, dfa2.states[dfa2.start].tag);
    }
}
