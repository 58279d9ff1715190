//! LR(1) items: an LR(0) core plus a lookahead set of terminal columns.

use std::collections::BTreeSet;
use std::fmt;

use itertools::Itertools as _;

use crate::grammar::{Grammar, NonTerminalIdx, Rule, RuleIdx, SymbolDisplay, SymbolIdx, Term};

/// Lookahead entries are token indices; the end-of-stream sentinel is
/// `grammar.eos()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub non_terminal: NonTerminalIdx,
    pub rule: RuleIdx,
    pub dot: usize,
    pub lookahead: BTreeSet<usize>,
}

/// Result of merging an item (or a whole candidate set) into an item set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Merge {
    pub index: usize,
    pub updated: bool,
}

impl Item {
    pub fn new(
        non_terminal: NonTerminalIdx,
        rule: RuleIdx,
        dot: usize,
        lookahead: BTreeSet<usize>,
    ) -> Item {
        Item {
            non_terminal,
            rule,
            dot,
            lookahead,
        }
    }

    /// Same LR(0) core: lookaheads are ignored.
    pub fn core_eq(&self, other: &Item) -> bool {
        self.non_terminal == other.non_terminal
            && self.rule == other.rule
            && self.dot == other.dot
    }

    pub fn rule_of<'g>(&self, grammar: &'g Grammar) -> &'g Rule {
        grammar.get_rule(self.non_terminal, self.rule)
    }

    pub fn next_term<'g>(&self, grammar: &'g Grammar) -> Option<&'g Term> {
        self.rule_of(grammar).terms.get(self.dot)
    }

    pub fn next_symbol(&self, grammar: &Grammar) -> Option<SymbolIdx> {
        self.next_term(grammar).map(Term::symbol_idx)
    }

    pub fn is_reduce(&self, grammar: &Grammar) -> bool {
        self.rule_of(grammar).terms.len() == self.dot
    }

    pub fn advanced(&self) -> Item {
        Item {
            non_terminal: self.non_terminal,
            rule: self.rule,
            dot: self.dot + 1,
            lookahead: self.lookahead.clone(),
        }
    }

    /// Inserts the item into a set that is unique by LR(0) core. An
    /// existing core absorbs the lookaheads; `updated` reports whether the
    /// set gained an item or a lookahead entry.
    pub fn merge_into(self, item_set: &mut Vec<Item>) -> Merge {
        match item_set.iter_mut().position(|it| it.core_eq(&self)) {
            Some(index) => {
                let target = &mut item_set[index];
                let before = target.lookahead.len();
                target.lookahead.extend(self.lookahead);
                Merge {
                    index,
                    updated: target.lookahead.len() != before,
                }
            }
            None => {
                item_set.push(self);
                Merge {
                    index: item_set.len() - 1,
                    updated: true,
                }
            }
        }
    }
}

pub struct ItemDisplay<'a, 'b> {
    pub item: &'a Item,
    pub grammar: &'b Grammar,
}

impl<'a, 'b> fmt::Display for ItemDisplay<'a, 'b> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let grammar = self.grammar;
        let rule = self.item.rule_of(grammar);
        write!(f, "{} ->", grammar.get_non_terminal(self.item.non_terminal).name)?;
        for (term_idx, term) in rule.terms.iter().enumerate() {
            if term_idx == self.item.dot {
                write!(f, " .")?;
            }
            write!(f, " {}", SymbolDisplay::new(&term.symbol_idx(), grammar))?;
        }
        if self.item.dot == rule.terms.len() {
            write!(f, " .")?;
        }
        write!(
            f,
            ", {}",
            self.item
                .lookahead
                .iter()
                .map(|token| grammar.token_name(*token))
                .join("/")
        )
    }
}

/// The pretty-printed form used in conflict reports: one indented item per
/// line.
pub struct ItemSetDisplay<'a, 'b> {
    pub items: &'a [Item],
    pub grammar: &'b Grammar,
}

impl<'a, 'b> fmt::Display for ItemSetDisplay<'a, 'b> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for item in self.items {
            writeln!(
                f,
                "  {}",
                ItemDisplay {
                    item,
                    grammar: self.grammar
                }
            )?;
        }
        Ok(())
    }
}
