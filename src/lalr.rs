//! Canonical LR(1) item-set collection with LALR-style core merging, plus
//! the transition graph over terminals and non-terminals.

use std::collections::BTreeSet;

use crate::first::FirstSets;
use crate::grammar::{Grammar, NonTerminalIdx, RuleIdx, SymbolIdx, Term, TermKind};
use crate::item::{Item, Merge};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StateIdx(pub usize);

impl StateIdx {
    pub fn as_usize(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub symbol: SymbolIdx,
    pub dest: StateIdx,
}

#[derive(Debug)]
pub struct State {
    pub items: Vec<Item>,
    pub transitions: Vec<Transition>,
}

/// The ordered canonical collection. A state's LR(0) core is fixed once the
/// state is appended; reprocessing only grows lookahead sets.
#[derive(Debug)]
pub struct Automaton {
    pub states: Vec<State>,
}

pub fn build_automaton(grammar: &Grammar, first_sets: &FirstSets) -> Automaton {
    AutomatonBuilder {
        grammar,
        first_sets,
        states: Vec::new(),
        unfinished: Vec::new(),
    }
    .build()
}

struct AutomatonBuilder<'a> {
    grammar: &'a Grammar,
    first_sets: &'a FirstSets,
    states: Vec<State>,
    unfinished: Vec<bool>,
}

impl<'a> AutomatonBuilder<'a> {
    fn build(mut self) -> Automaton {
        let mut initial = vec![Item::new(
            NonTerminalIdx(0),
            RuleIdx(0),
            0,
            BTreeSet::from([self.grammar.eos()]),
        )];
        self.close(&mut initial);
        self.states.push(State {
            items: initial,
            transitions: Vec::new(),
        });
        self.unfinished.push(true);
        while let Some(index) = self.unfinished.iter().position(|u| *u) {
            self.unfinished[index] = false;
            self.expand(index);
        }
        Automaton {
            states: self.states,
        }
    }

    /// Processes the outgoing transitions of one state. Items sharing the
    /// same next symbol are advanced together, so Goto runs once per
    /// distinct symbol; reduce items take no part.
    fn expand(&mut self, index: usize) {
        let items = self.states[index].items.clone();
        let mut processed: Vec<bool> = items
            .iter()
            .map(|item| item.is_reduce(self.grammar))
            .collect();
        while let Some(start) = processed.iter().position(|p| !p) {
            let Some(symbol) = items[start].next_symbol(self.grammar) else {
                processed[start] = true;
                continue;
            };
            let mut candidate: Vec<Item> = Vec::new();
            for i in start..items.len() {
                if processed[i] || items[i].next_symbol(self.grammar) != Some(symbol) {
                    continue;
                }
                items[i].advanced().merge_into(&mut candidate);
                processed[i] = true;
            }
            self.close(&mut candidate);
            let merge = self.merge_state(candidate);
            self.record_transition(index, symbol, StateIdx(merge.index));
            if merge.updated {
                // Lookahead growth must propagate through the state's
                // outgoing transitions.
                self.unfinished[merge.index] = true;
            }
        }
    }

    /// Looks the candidate up by LR(0)-core set equality. A match absorbs
    /// the candidate's lookaheads; otherwise the candidate becomes a new
    /// state.
    fn merge_state(&mut self, candidate: Vec<Item>) -> Merge {
        let position = self
            .states
            .iter()
            .position(|state| core_set_eq(&state.items, &candidate));
        match position {
            Some(index) => {
                let mut updated = false;
                let target = &mut self.states[index].items;
                for item in candidate {
                    updated |= item.merge_into(target).updated;
                }
                Merge { index, updated }
            }
            None => {
                self.states.push(State {
                    items: candidate,
                    transitions: Vec::new(),
                });
                self.unfinished.push(false);
                Merge {
                    index: self.states.len() - 1,
                    updated: true,
                }
            }
        }
    }

    /// At most one transition per (state, symbol); reprocessing a state
    /// revisits the same symbols.
    fn record_transition(&mut self, from: usize, symbol: SymbolIdx, dest: StateIdx) {
        let transitions = &mut self.states[from].transitions;
        if let Some(existing) = transitions.iter().find(|t| t.symbol == symbol) {
            debug_assert_eq!(existing.dest, dest);
            return;
        }
        transitions.push(Transition { symbol, dest });
    }

    /// Closure: for every item [A -> a . B b, la] and every rule of B,
    /// merge [B -> . g, FIRST(b la)]. Lookahead growth of an existing core
    /// re-enables its expansion.
    fn close(&self, item_set: &mut Vec<Item>) {
        let grammar = self.grammar;
        let mut finished = vec![false; item_set.len()];
        while let Some(index) = finished.iter().position(|f| !f) {
            finished[index] = true;
            let item = item_set[index].clone();
            let rule = item.rule_of(grammar);
            let Some(term) = rule.terms.get(item.dot) else {
                continue;
            };
            let TermKind::NonTerminal { idx: next_nt, .. } = term.kind else {
                continue;
            };
            let lookahead = self.first_of_suffix(&rule.terms[item.dot + 1..], &item.lookahead);
            for (rule_idx, _) in grammar.rule_indices(next_nt) {
                let merge = Item::new(next_nt, rule_idx, 0, lookahead.clone()).merge_into(item_set);
                if merge.index == finished.len() {
                    finished.push(false);
                } else if merge.updated {
                    finished[merge.index] = false;
                }
            }
        }
    }

    /// FIRST of a body suffix concatenated with the item's lookahead set.
    fn first_of_suffix(&self, suffix: &[Term], lookahead: &BTreeSet<usize>) -> BTreeSet<usize> {
        let mut first = BTreeSet::new();
        let mut all_nullable = true;
        for term in suffix {
            all_nullable = false;
            match term.kind {
                TermKind::Terminal(t) => {
                    first.insert(t.as_usize());
                    break;
                }
                TermKind::NonTerminal { idx, .. } => {
                    let set = self.first_sets.get(idx);
                    first.extend(set.terminals().iter().copied());
                    if set.has_empty() {
                        all_nullable = true;
                    }
                }
            }
            if !all_nullable {
                break;
            }
        }
        if all_nullable {
            first.extend(lookahead.iter().copied());
        }
        first
    }
}

fn core_set_eq(a: &[Item], b: &[Item]) -> bool {
    // Cores are unique within a set, so size plus containment is
    // permutation equality.
    a.len() == b.len() && b.iter().all(|ib| a.iter().any(|ia| ia.core_eq(ib)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::first::compute_first_sets;
    use crate::loader::parse_grammar;
    use crate::test_grammars;

    fn automaton_for(text: &str) -> (Grammar, Automaton) {
        let grammar = parse_grammar(text).unwrap();
        let first_sets = compute_first_sets(&grammar).unwrap();
        let automaton = build_automaton(&grammar, &first_sets);
        (grammar, automaton)
    }

    fn dest(automaton: &Automaton, state: usize, symbol: SymbolIdx) -> usize {
        automaton.states[state]
            .transitions
            .iter()
            .find(|t| t.symbol == symbol)
            .expect("missing transition")
            .dest
            .as_usize()
    }

    fn lookahead_of(state: &State, non_terminal: u32, rule: u32, dot: usize) -> Vec<usize> {
        state
            .items
            .iter()
            .find(|item| {
                item.non_terminal == NonTerminalIdx(non_terminal)
                    && item.rule == RuleIdx(rule)
                    && item.dot == dot
            })
            .expect("missing item")
            .lookahead
            .iter()
            .copied()
            .collect()
    }

    #[test]
    fn expression_grammar_states() {
        let (_, automaton) = automaton_for(test_grammars::EXPR);
        assert_eq!(automaton.states.len(), 6);

        let i0 = &automaton.states[0];
        assert_eq!(i0.items.len(), 4);
        assert_eq!(i0.transitions.len(), 3);

        // [S' -> . E, $], [E -> . E + T, +/$], [E -> . T, +/$],
        // [T -> . Identifier, +/$]
        assert_eq!(lookahead_of(i0, 0, 0, 0), [2]);
        assert_eq!(lookahead_of(i0, 1, 0, 0), [0, 2]);
        assert_eq!(lookahead_of(i0, 1, 1, 0), [0, 2]);
        assert_eq!(lookahead_of(i0, 2, 0, 0), [0, 2]);
    }

    #[test]
    fn expression_grammar_transition_graph() {
        let (_, automaton) = automaton_for(test_grammars::EXPR);
        let on_e = dest(&automaton, 0, SymbolIdx::NonTerminal(NonTerminalIdx(1)));
        let on_id = dest(
            &automaton,
            0,
            SymbolIdx::Terminal(crate::grammar::TokenTypeIdx(1)),
        );
        let on_plus = dest(
            &automaton,
            on_e,
            SymbolIdx::Terminal(crate::grammar::TokenTypeIdx(0)),
        );
        // Identifier after "E +" reaches the same state as Identifier at the
        // start: LALR merging by LR(0) core.
        let on_id_after_plus = dest(
            &automaton,
            on_plus,
            SymbolIdx::Terminal(crate::grammar::TokenTypeIdx(1)),
        );
        assert_eq!(on_id, on_id_after_plus);
    }

    #[test]
    fn single_rule_grammar_states() {
        let (_, automaton) = automaton_for(test_grammars::SINGLE);
        assert_eq!(automaton.states.len(), 3);
    }

    #[test]
    fn empty_alternative_states() {
        let (grammar, automaton) = automaton_for(test_grammars::EMPTY_ALT);
        assert_eq!(automaton.states.len(), 3);
        // I0 carries the reduce item for the empty alternative with the
        // end-of-stream lookahead.
        assert_eq!(lookahead_of(&automaton.states[0], 1, 1, 0), [grammar.eos()]);
    }

    #[test]
    fn transitions_are_unique_per_symbol() {
        for text in [
            test_grammars::EXPR,
            test_grammars::EMPTY_ALT,
            test_grammars::SINGLE,
            test_grammars::CHLORO,
        ] {
            let (_, automaton) = automaton_for(text);
            for state in &automaton.states {
                for (i, a) in state.transitions.iter().enumerate() {
                    for b in &state.transitions[i + 1..] {
                        assert_ne!(a.symbol, b.symbol);
                    }
                }
            }
        }
    }

    #[test]
    fn cores_are_unique_within_states() {
        let (_, automaton) = automaton_for(test_grammars::CHLORO);
        for state in &automaton.states {
            for (i, a) in state.items.iter().enumerate() {
                for b in &state.items[i + 1..] {
                    assert!(!a.core_eq(b));
                }
            }
        }
    }
}
