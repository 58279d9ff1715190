//! The shift/reduce/goto table, derived read-only from the item sets and
//! transitions.
//!
//! Reduce entries are written first, then shifts and gotos; any overwrite of
//! a non-error cell with a different action is a conflict. Conflicts are
//! collected into one report and raised together after both passes.

use std::fmt::Write as _;

use crate::error::Error;
use crate::grammar::{Grammar, NonTerminalIdx, SymbolIdx};
use crate::item::ItemSetDisplay;
use crate::lalr::{Automaton, StateIdx};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Error,
    Shift(StateIdx),
    /// Global rule id: non-terminal-major source order, 1-based, skipping
    /// the augmented rule.
    Reduce(usize),
    Accept,
}

/// One row per state. `actions` is indexed by token type, with the trailing
/// end-of-stream column at `grammar.eos()`; `goto` is indexed by
/// non-terminal.
#[derive(Debug, Clone)]
pub struct TableRow {
    pub actions: Vec<Action>,
    pub goto: Vec<Option<StateIdx>>,
}

pub fn build_table(grammar: &Grammar, automaton: &Automaton) -> Result<Vec<TableRow>, Error> {
    let mut rows = vec![
        TableRow {
            actions: vec![Action::Error; grammar.n_token_types() + 1],
            goto: vec![None; grammar.n_non_terminals()],
        };
        automaton.states.len()
    ];
    let rule_offsets = grammar.rule_offsets();
    let mut conflicts = String::new();

    fill_reduce(grammar, automaton, &rule_offsets, &mut rows, &mut conflicts);
    fill_shift(grammar, automaton, &mut rows, &mut conflicts);

    if conflicts.is_empty() {
        Ok(rows)
    } else {
        Err(Error::Conflicts(conflicts))
    }
}

fn fill_reduce(
    grammar: &Grammar,
    automaton: &Automaton,
    rule_offsets: &[usize],
    rows: &mut [TableRow],
    conflicts: &mut String,
) {
    for (state_idx, state) in automaton.states.iter().enumerate() {
        for item in &state.items {
            if !item.is_reduce(grammar) {
                continue;
            }
            let new_action = if item.non_terminal == NonTerminalIdx(0) {
                Action::Accept
            } else {
                Action::Reduce(rule_offsets[item.non_terminal.as_usize()] + item.rule.as_usize())
            };
            for &token in &item.lookahead {
                let cell = &mut rows[state_idx].actions[token];
                if *cell != Action::Error {
                    report_conflict(
                        conflicts,
                        "Reduce-reduce",
                        grammar,
                        automaton,
                        state_idx,
                        token,
                        *cell,
                        new_action,
                    );
                }
                *cell = new_action;
            }
        }
    }
}

fn fill_shift(
    grammar: &Grammar,
    automaton: &Automaton,
    rows: &mut [TableRow],
    conflicts: &mut String,
) {
    for (state_idx, state) in automaton.states.iter().enumerate() {
        for transition in &state.transitions {
            match transition.symbol {
                SymbolIdx::NonTerminal(nt) => {
                    rows[state_idx].goto[nt.as_usize()] = Some(transition.dest);
                }
                SymbolIdx::Terminal(token) => {
                    let new_action = Action::Shift(transition.dest);
                    let cell = &mut rows[state_idx].actions[token.as_usize()];
                    if *cell == new_action {
                        continue;
                    }
                    if *cell != Action::Error {
                        report_conflict(
                            conflicts,
                            "Shift-reduce",
                            grammar,
                            automaton,
                            state_idx,
                            token.as_usize(),
                            *cell,
                            new_action,
                        );
                    }
                    *cell = new_action;
                }
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn report_conflict(
    conflicts: &mut String,
    kind: &str,
    grammar: &Grammar,
    automaton: &Automaton,
    state_idx: usize,
    token: usize,
    existing: Action,
    new_action: Action,
) {
    let _ = write!(
        conflicts,
        "{kind} conflict in item set I{state_idx}:\n{items}when parsing token {token_name}, \
         conflicting actions are {a}, {b}\n\n",
        items = ItemSetDisplay {
            items: &automaton.states[state_idx].items,
            grammar,
        },
        token_name = grammar.token_name(token),
        a = action_code(existing),
        b = action_code(new_action),
    );
}

fn action_code(action: Action) -> String {
    match action {
        Action::Shift(state) => format!("s{}", state.as_usize()),
        Action::Reduce(rule) => format!("r{rule}"),
        Action::Accept => "accept".to_owned(),
        Action::Error => "e".to_owned(),
    }
}
