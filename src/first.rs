//! FIRST sets, computed on a left-recursion-eliminated scratch copy of the
//! rules.
//!
//! The elimination exists only to make the recursive FIRST construction
//! terminate; its output is discarded and every later stage works on the
//! original grammar.

use crate::error::Error;
use crate::grammar::{Grammar, NonTerminalIdx, SymbolIdx};

use fxhash::FxHashSet;

#[derive(Debug, Clone, Default)]
pub struct FirstSet {
    empty: bool,
    terminals: FxHashSet<usize>,
}

impl FirstSet {
    pub fn terminals(&self) -> &FxHashSet<usize> {
        &self.terminals
    }

    pub fn has_empty(&self) -> bool {
        self.empty
    }

    /// Returns whether the terminal is new.
    fn add(&mut self, terminal: usize) -> bool {
        self.terminals.insert(terminal)
    }

    fn set_empty(&mut self) {
        self.empty = true;
    }
}

/// Maps non-terminals of the original grammar to their first sets.
#[derive(Debug)]
pub struct FirstSets(Vec<FirstSet>);

impl FirstSets {
    pub fn get(&self, non_terminal: NonTerminalIdx) -> &FirstSet {
        &self.0[non_terminal.as_usize()]
    }
}

pub fn compute_first_sets(grammar: &Grammar) -> Result<FirstSets, Error> {
    let mut computer = FirstComputer::from_grammar(grammar);
    computer.eliminate_left_recursion()?;
    computer.compute()?;
    Ok(computer.into_first_sets(grammar.n_non_terminals()))
}

/// Works on rules flattened into [`SymbolIdx`] form. Helper non-terminals
/// introduced by the elimination get indices past the original count.
struct FirstComputer {
    rules: Vec<Vec<Vec<SymbolIdx>>>,
    sets: Vec<FirstSet>,
    finished: Vec<bool>,
    traversal_stack: Vec<usize>,
}

fn nt_symbol(index: usize) -> SymbolIdx {
    SymbolIdx::NonTerminal(NonTerminalIdx::from_usize(index))
}

impl FirstComputer {
    fn from_grammar(grammar: &Grammar) -> Self {
        let rules = grammar
            .non_terminals
            .iter()
            .map(|nt| {
                nt.rules
                    .iter()
                    .map(|rule| rule.terms.iter().map(|term| term.symbol_idx()).collect())
                    .collect()
            })
            .collect();
        FirstComputer {
            rules,
            sets: Vec::new(),
            finished: Vec::new(),
            traversal_stack: Vec::new(),
        }
    }

    /// Direct elimination for one non-terminal: A -> A b | g becomes
    /// A -> g A' with A' -> b A' | epsilon.
    fn eliminate_direct(&mut self, index: usize) -> Result<(), Error> {
        let head = nt_symbol(index);
        if !self.rules[index]
            .iter()
            .any(|rule| rule.first() == Some(&head))
        {
            return Ok(());
        }
        let helper = nt_symbol(self.rules.len());
        let mut base_rules = Vec::new();
        let mut helper_rules = Vec::new();
        for mut rule in std::mem::take(&mut self.rules[index]) {
            if rule.first() == Some(&head) {
                if rule.len() == 1 {
                    return Err(Error::validation(format!(
                        "Self recursive production occurred during direct left recursion \
                         elimination of non-terminal #{index}"
                    )));
                }
                rule.remove(0);
                rule.push(helper);
                helper_rules.push(rule);
            } else {
                rule.push(helper);
                base_rules.push(rule);
            }
        }
        helper_rules.push(Vec::new()); // A' -> epsilon
        self.rules[index] = base_rules;
        self.rules.push(helper_rules);
        Ok(())
    }

    /// Indirect elimination: in index order, substitute the bodies of every
    /// earlier non-terminal into rules that mention it, then re-run direct
    /// elimination. Helpers appended along the way are swept too.
    fn eliminate_left_recursion(&mut self) -> Result<(), Error> {
        self.eliminate_direct(0)?;
        let mut index = 1;
        while index < self.rules.len() {
            for j in 0..index {
                let target = nt_symbol(j);
                if !self.rules[index].iter().any(|rule| rule.contains(&target)) {
                    continue;
                }
                let originals = std::mem::take(&mut self.rules[index]);
                let mut rebuilt = Vec::new();
                for rule in originals {
                    if !rule.contains(&target) {
                        rebuilt.push(rule);
                        continue;
                    }
                    for body in &self.rules[j] {
                        let mut new_rule = Vec::new();
                        for symbol in &rule {
                            if *symbol == target {
                                new_rule.extend(body.iter().copied());
                            } else {
                                new_rule.push(*symbol);
                            }
                        }
                        rebuilt.push(new_rule);
                    }
                }
                self.rules[index] = rebuilt;
            }
            self.eliminate_direct(index)?;
            index += 1;
        }
        Ok(())
    }

    fn compute(&mut self) -> Result<(), Error> {
        self.sets = vec![FirstSet::default(); self.rules.len()];
        self.finished = vec![false; self.rules.len()];
        for index in 0..self.rules.len() {
            if !self.finished[index] {
                self.first_of(index)?;
            }
        }
        Ok(())
    }

    fn first_of(&mut self, non_terminal: usize) -> Result<(), Error> {
        self.traversal_stack.push(non_terminal);
        let rules = self.rules[non_terminal].clone();
        for rule in &rules {
            if rule.is_empty() {
                self.sets[non_terminal].set_empty();
            }
            let mut all_epsilon = true;
            for symbol in rule {
                match *symbol {
                    SymbolIdx::Terminal(t) => {
                        self.sets[non_terminal].add(t.as_usize());
                        all_epsilon = false;
                        break;
                    }
                    SymbolIdx::NonTerminal(other) => {
                        let other = other.as_usize();
                        self.add_subset(non_terminal, other)?;
                        if !self.sets[other].has_empty() {
                            all_epsilon = false;
                            break;
                        }
                    }
                }
            }
            if all_epsilon {
                self.sets[non_terminal].set_empty();
            }
        }
        self.finished[non_terminal] = true;
        self.traversal_stack.pop();
        Ok(())
    }

    /// FIRST(nt) += FIRST(other) \ { epsilon }, computing FIRST(other)
    /// first when needed.
    fn add_subset(&mut self, non_terminal: usize, other: usize) -> Result<(), Error> {
        if other == non_terminal {
            return Err(Error::ResidualLeftRecursion);
        }
        if !self.finished[other] {
            if self.traversal_stack.contains(&other) {
                return Err(Error::FirstCycle);
            }
            self.first_of(other)?;
        }
        let terminals: Vec<usize> = self.sets[other].terminals.iter().copied().collect();
        for terminal in terminals {
            self.sets[non_terminal].add(terminal);
        }
        Ok(())
    }

    /// Drops the synthetic helpers, keeping only the original non-terminals.
    fn into_first_sets(mut self, original_count: usize) -> FirstSets {
        self.sets.truncate(original_count);
        FirstSets(self.sets)
    }
}
