//! # Canonical LR(1) table constructor
//!
//! Builds ACTION/GOTO tables from a [`Grammar`] (spec §4.5). The grammar is
//! first augmented with `S' -> S` and `$`; FIRST sets are computed by
//! fixpoint; states are discovered by closure/goto from the initial item
//! set, canonicalized by a sorted-and-hashed serialization so that
//! structurally identical states collapse regardless of discovery order.
//! Lookaheads are merged per core during closure — this is what keeps the
//! canonical automaton's state count close to LALR's while remaining full
//! LR(1) (spec §4.5, §9). Grounded in `original_source`'s
//! `LR1TableBuilder.cpp`.

use crate::grammar::{Grammar, Production};
use std::collections::{BTreeSet, HashMap};
use thiserror::Error;

pub const END_OF_INPUT: &str = "$";
const AUGMENTED_START: &str = "S'";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GrammarError {
    #[error("symbol {0:?} used on a production's left-hand side is not declared a nonterminal")]
    UndeclaredLhs(String),
    #[error("symbol {0:?} used in a production's right-hand side is not declared")]
    UndeclaredSymbol(String),
    #[error("start symbol {0:?} is not declared as a nonterminal")]
    UndeclaredStart(String),
    #[error("grammar declares a symbol named {0:?}, which is reserved")]
    ReservedSymbol(String),
    #[error("duplicate production: {0:?} -> {1:?}")]
    DuplicateProduction(String, Vec<String>),
    #[error("conflict in state {state}, on symbol {symbol:?}: {existing} vs {incoming}")]
    Conflict {
        state: usize,
        symbol: String,
        existing: String,
        incoming: String,
    },
}

/// One action cell of the ACTION table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Shift(usize),
    Reduce(usize),
    Accept,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Shift(s) => write!(f, "Shift({s})"),
            Action::Reduce(p) => write!(f, "Reduce({p})"),
            Action::Accept => write!(f, "Accept"),
        }
    }
}

/// The compiled table set, plus the augmented production list the table
/// indices refer to (production 0 is `S' -> S`).
#[derive(Debug, Clone)]
pub struct ParseTables {
    pub productions: Vec<Production>,
    pub action: HashMap<(usize, String), Action>,
    pub goto: HashMap<(usize, String), usize>,
    pub start_state: usize,
}

/// Builds the canonical LR(1) tables for `grammar` (spec §4.5).
pub fn build(grammar: &Grammar) -> Result<ParseTables, GrammarError> {
    validate(grammar)?;
    log::debug!(
        "building LR(1) tables: {} productions, {} nonterminals",
        grammar.productions.len(),
        grammar.nonterminals.len()
    );

    let mut productions = vec![Production {
        left: AUGMENTED_START.to_string(),
        right: vec![grammar.start.clone()],
    }];
    productions.extend(grammar.productions.iter().cloned());

    let mut nonterminals = grammar.nonterminals.clone();
    nonterminals.push(AUGMENTED_START.to_string());

    let first = compute_first_sets(&nonterminals, &productions);

    let start_item = Item {
        production: 0,
        dot: 0,
        lookahead: END_OF_INPUT.to_string(),
    };
    let start_state = close(&[start_item], &productions, &nonterminals, &first);

    let mut states: Vec<State> = vec![start_state.clone()];
    let mut index: HashMap<String, usize> = HashMap::new();
    index.insert(serialize(&start_state), 0);

    let mut action: HashMap<(usize, String), Action> = HashMap::new();
    let mut goto: HashMap<(usize, String), usize> = HashMap::new();

    let mut worklist = vec![0usize];
    while let Some(state_id) = worklist.pop() {
        let mut symbols: Vec<String> = Vec::new();
        for item in &states[state_id].items {
            if let Some(sym) = symbol_after_dot(&productions[item.production], item.dot) {
                if !symbols.contains(&sym) {
                    symbols.push(sym);
                }
            }
        }

        for symbol in symbols {
            let moved: Vec<Item> = states[state_id]
                .items
                .iter()
                .filter(|item| symbol_after_dot(&productions[item.production], item.dot).as_deref() == Some(&symbol))
                .map(|item| Item {
                    production: item.production,
                    dot: item.dot + 1,
                    lookahead: item.lookahead.clone(),
                })
                .collect();
            let target_state = close(&moved, &productions, &nonterminals, &first);
            let key = serialize(&target_state);
            let target_id = match index.get(&key) {
                Some(&id) => id,
                None => {
                    let id = states.len();
                    log::trace!("discovered state {id} via goto on {symbol:?} from state {state_id}");
                    index.insert(key, id);
                    states.push(target_state);
                    worklist.push(id);
                    id
                }
            };

            let is_terminal = !nonterminals.contains(&symbol);
            if is_terminal {
                set_action(
                    &mut action,
                    state_id,
                    symbol.clone(),
                    Action::Shift(target_id),
                )?;
            } else {
                goto.insert((state_id, symbol.clone()), target_id);
            }
        }

        for item in &states[state_id].items {
            let production = &productions[item.production];
            if item.dot == production.right.len() {
                if item.production == 0 && item.lookahead == END_OF_INPUT {
                    set_action(&mut action, state_id, END_OF_INPUT.to_string(), Action::Accept)?;
                } else {
                    set_action(
                        &mut action,
                        state_id,
                        item.lookahead.clone(),
                        Action::Reduce(item.production),
                    )?;
                }
            }
        }
    }

    log::debug!(
        "LR(1) tables built: {} states, {} action cells, {} goto cells",
        states.len(),
        action.len(),
        goto.len()
    );
    Ok(ParseTables {
        productions,
        action,
        goto,
        start_state: 0,
    })
}

fn set_action(
    action: &mut HashMap<(usize, String), Action>,
    state: usize,
    symbol: String,
    incoming: Action,
) -> Result<(), GrammarError> {
    match action.get(&(state, symbol.clone())) {
        Some(existing) if *existing != incoming => {
            log::error!("conflict in state {state} on {symbol:?}: {existing} vs {incoming}");
            Err(GrammarError::Conflict {
                state,
                symbol,
                existing: existing.to_string(),
                incoming: incoming.to_string(),
            })
        }
        _ => {
            action.insert((state, symbol), incoming);
            Ok(())
        }
    }
}

fn validate(grammar: &Grammar) -> Result<(), GrammarError> {
    for reserved in [END_OF_INPUT, AUGMENTED_START] {
        if grammar.terminals.iter().any(|t| t == reserved) || grammar.nonterminals.iter().any(|n| n == reserved) {
            return Err(GrammarError::ReservedSymbol(reserved.to_string()));
        }
    }
    if !grammar.is_nonterminal(&grammar.start) {
        return Err(GrammarError::UndeclaredStart(grammar.start.clone()));
    }
    for production in &grammar.productions {
        if !grammar.is_nonterminal(&production.left) {
            return Err(GrammarError::UndeclaredLhs(production.left.clone()));
        }
        for symbol in &production.right {
            if !grammar.is_terminal(symbol) && !grammar.is_nonterminal(symbol) {
                return Err(GrammarError::UndeclaredSymbol(symbol.clone()));
            }
        }
    }
    for (i, a) in grammar.productions.iter().enumerate() {
        for b in &grammar.productions[i + 1..] {
            if a.left == b.left && a.right == b.right {
                return Err(GrammarError::DuplicateProduction(a.left.clone(), a.right.clone()));
            }
        }
    }
    Ok(())
}

/// `None` marks the nullable (empty-string) member of a FIRST set.
type FirstSet = BTreeSet<Option<String>>;

fn compute_first_sets(nonterminals: &[String], productions: &[Production]) -> HashMap<String, FirstSet> {
    let mut first: HashMap<String, FirstSet> = nonterminals
        .iter()
        .map(|nt| (nt.clone(), FirstSet::new()))
        .collect();

    let mut changed = true;
    while changed {
        changed = false;
        for production in productions {
            let mut nullable_prefix = true;
            for symbol in &production.right {
                if !nullable_prefix {
                    break;
                }
                if nonterminals.contains(symbol) {
                    let additions: Vec<Option<String>> = first
                        .get(symbol)
                        .map(|set| set.iter().filter(|s| s.is_some()).cloned().collect())
                        .unwrap_or_default();
                    let entry = first.entry(production.left.clone()).or_default();
                    for addition in additions {
                        if entry.insert(addition) {
                            changed = true;
                        }
                    }
                    let is_nullable = first.get(symbol).map(|s| s.contains(&None)).unwrap_or(false);
                    nullable_prefix = is_nullable;
                } else {
                    let entry = first.entry(production.left.clone()).or_default();
                    if entry.insert(Some(symbol.clone())) {
                        changed = true;
                    }
                    nullable_prefix = false;
                }
            }
            if nullable_prefix {
                let entry = first.entry(production.left.clone()).or_default();
                if entry.insert(None) {
                    changed = true;
                }
            }
        }
    }
    first
}

/// FIRST of a symbol sequence followed by a trailing lookahead terminal
/// (spec §4.5): accumulates FIRST of each prefix symbol while the prefix
/// stays nullable; folds in the trailing lookahead if the whole sequence is
/// nullable.
fn first_of_sequence(
    sequence: &[String],
    lookahead: &str,
    nonterminals: &[String],
    first: &HashMap<String, FirstSet>,
) -> BTreeSet<String> {
    let mut result = BTreeSet::new();
    let mut nullable_prefix = true;
    for symbol in sequence {
        if !nullable_prefix {
            break;
        }
        if nonterminals.contains(symbol) {
            if let Some(set) = first.get(symbol) {
                result.extend(set.iter().filter_map(|s| s.clone()));
                nullable_prefix = set.contains(&None);
            } else {
                nullable_prefix = false;
            }
        } else {
            result.insert(symbol.clone());
            nullable_prefix = false;
        }
    }
    if nullable_prefix {
        result.insert(lookahead.to_string());
    }
    result
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct Item {
    production: usize,
    dot: usize,
    lookahead: String,
}

#[derive(Debug, Clone)]
struct State {
    items: Vec<Item>,
}

fn symbol_after_dot(production: &Production, dot: usize) -> Option<String> {
    production.right.get(dot).cloned()
}

/// Closure of a kernel item set (spec §4.5): repeatedly expands items whose
/// dot precedes a nonterminal, merging lookaheads into the existing item
/// for that `(production, dot)` core rather than creating a duplicate.
fn close(
    kernel: &[Item],
    productions: &[Production],
    nonterminals: &[String],
    first: &HashMap<String, FirstSet>,
) -> State {
    // core -> set of lookaheads, insertion-ordered so serialization is stable.
    let mut cores: Vec<(usize, usize)> = Vec::new();
    let mut lookaheads: HashMap<(usize, usize), BTreeSet<String>> = HashMap::new();

    let mut worklist: Vec<Item> = Vec::new();
    for item in kernel {
        let core = (item.production, item.dot);
        if !lookaheads.contains_key(&core) {
            cores.push(core);
        }
        if lookaheads.entry(core).or_default().insert(item.lookahead.clone()) {
            worklist.push(item.clone());
        }
    }

    while let Some(item) = worklist.pop() {
        let production = &productions[item.production];
        let Some(symbol) = symbol_after_dot(production, item.dot) else {
            continue;
        };
        if !nonterminals.contains(&symbol) {
            continue;
        }
        let rest = &production.right[item.dot + 1..];
        let new_lookaheads = first_of_sequence(rest, &item.lookahead, nonterminals, first);

        for (prod_idx, candidate) in productions.iter().enumerate() {
            if candidate.left != symbol {
                continue;
            }
            let core = (prod_idx, 0);
            if !lookaheads.contains_key(&core) {
                cores.push(core);
            }
            let entry = lookaheads.entry(core).or_default();
            for la in &new_lookaheads {
                if entry.insert(la.clone()) {
                    worklist.push(Item {
                        production: prod_idx,
                        dot: 0,
                        lookahead: la.clone(),
                    });
                }
            }
        }
    }

    let mut items: Vec<Item> = cores
        .into_iter()
        .flat_map(|(production, dot)| {
            lookaheads[&(production, dot)]
                .iter()
                .map(move |la| Item {
                    production,
                    dot,
                    lookahead: la.clone(),
                })
        })
        .collect();
    items.sort();
    items.dedup();
    State { items }
}

/// Canonical string key for state deduplication: items sorted by
/// `(production, dot)` with lookaheads sorted lexicographically (spec
/// §4.5, §9).
fn serialize(state: &State) -> String {
    let mut items = state.items.clone();
    items.sort();
    items
        .iter()
        .map(|item| format!("{}.{}:{}", item.production, item.dot, item.lookahead))
        .collect::<Vec<_>>()
        .join("|")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::Production;

    fn expr_grammar() -> Grammar {
        Grammar {
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
        }
    }

    #[test]
    fn builds_tables_for_a_small_expression_grammar() {
        let tables = build(&expr_grammar()).unwrap();
        assert!(tables
            .action
            .values()
            .any(|a| matches!(a, Action::Shift(_))));
        assert!(tables
            .action
            .values()
            .any(|a| matches!(a, Action::Reduce(_))));
    }

    #[test]
    fn duplicate_productions_are_rejected() {
        let mut grammar = expr_grammar();
        grammar.productions.push(Production {
            left: "T".into(),
            right: vec!["id".into()],
        });
        assert!(matches!(
            build(&grammar),
            Err(GrammarError::DuplicateProduction(_, _))
        ));
    }

    #[test]
    fn undeclared_rhs_symbol_is_rejected() {
        let mut grammar = expr_grammar();
        grammar.productions.push(Production {
            left: "T".into(),
            right: vec!["bogus".into()],
        });
        assert!(matches!(
            build(&grammar),
            Err(GrammarError::UndeclaredSymbol(_))
        ));
    }

    #[test]
    fn reserved_symbol_name_is_rejected() {
        let mut grammar = expr_grammar();
        grammar.nonterminals.push("S'".into());
        assert!(matches!(build(&grammar), Err(GrammarError::ReservedSymbol(_))));
    }

    #[test]
    fn ambiguous_grammar_raises_conflict() {
        // Classic dangling-else-shaped shift/reduce conflict: E -> E + E
        // (left-recursive, ambiguous without precedence) conflicts with
        // itself on which side of "+" to reduce.
        let grammar = Grammar {
            terminals: vec!["id".into(), "+".into()],
            nonterminals: vec!["E".into()],
            start: "E".into(),
            productions: vec![
                Production {
                    left: "E".into(),
                    right: vec!["E".into(), "+".into(), "E".into()],
                },
                Production {
                    left: "E".into(),
                    right: vec!["id".into()],
                },
            ],
        };
        assert!(matches!(build(&grammar), Err(GrammarError::Conflict { .. })));
    }

    #[test]
    fn closure_is_idempotent() {
        let grammar = expr_grammar();
        let mut nonterminals = grammar.nonterminals.clone();
        nonterminals.push("S'".into());
        let mut productions = vec![Production {
            left: "S'".into(),
            right: vec!["E".into()],
        }];
        productions.extend(grammar.productions.clone());
        let first = compute_first_sets(&nonterminals, &productions);
        let kernel = vec![Item {
            production: 0,
            dot: 0,
            lookahead: "$".into(),
        }];
        let once = close(&kernel, &productions, &nonterminals, &first);
        let twice = close(&once.items.clone(), &productions, &nonterminals, &first);
        assert_eq!(serialize(&once), serialize(&twice));
    }
}
