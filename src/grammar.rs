//! Typed in-memory representation of grammars.

use std::fmt;

#[derive(Debug, PartialEq, Eq, Clone, Copy, PartialOrd, Ord, Hash)]
pub struct NonTerminalIdx(pub u32);

impl NonTerminalIdx {
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }

    pub fn from_usize(i: usize) -> Self {
        Self(u32::try_from(i).unwrap())
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, PartialOrd, Ord, Hash)]
pub struct TokenTypeIdx(pub u32);

impl TokenTypeIdx {
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }

    pub fn from_usize(i: usize) -> Self {
        Self(u32::try_from(i).unwrap())
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, PartialOrd, Ord, Hash)]
pub struct RuleIdx(pub u32);

impl RuleIdx {
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }

    pub fn from_usize(i: usize) -> Self {
        Self(u32::try_from(i).unwrap())
    }
}

/// A terminal category of the companion lexer.
///
/// With an enumerator the entry is matched on the enumerator value of a
/// shared payload enum; without one the terminal carries data of the type
/// named `type_name`.
#[derive(Debug, Clone)]
pub struct TokenType {
    pub type_name: String,
    pub enumerator: Option<String>,
}

impl TokenType {
    pub fn is_enum(&self) -> bool {
        self.enumerator.is_some()
    }
}

/// The flattened symbol identity used by first sets, item sets and the
/// table. Index 0 of the non-terminal space is the augmented start.
#[derive(Debug, PartialEq, Eq, Clone, Copy, PartialOrd, Ord, Hash)]
pub enum SymbolIdx {
    NonTerminal(NonTerminalIdx),
    Terminal(TokenTypeIdx),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TermKind {
    NonTerminal { idx: NonTerminalIdx, indirect: bool },
    Terminal(TokenTypeIdx),
}

/// One occurrence of a symbol in a rule body. The binder is the variable
/// name from the grammar file; enumerator-terminal occurrences have none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    pub binder: Option<String>,
    pub kind: TermKind,
}

impl Term {
    pub fn symbol_idx(&self) -> SymbolIdx {
        match self.kind {
            TermKind::NonTerminal { idx, .. } => SymbolIdx::NonTerminal(idx),
            TermKind::Terminal(idx) => SymbolIdx::Terminal(idx),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Rule {
    /// Alternative tag from `[Tag]`, when present.
    pub tag: Option<String>,
    pub terms: Vec<Term>,
}

#[derive(Debug, Clone)]
pub struct NonTerminal {
    pub name: String,
    // Indexed by `RuleIdx`
    pub rules: Vec<Rule>,
}

/// The grammar, immutable after loading. Non-terminal 0 is the synthetic
/// augmented start with the single rule S' -> S.
#[derive(Debug, Clone)]
pub struct Grammar {
    pub token_types: Vec<TokenType>,
    pub non_terminals: Vec<NonTerminal>,
}

impl Grammar {
    pub fn new() -> Self {
        Grammar {
            token_types: Vec::new(),
            non_terminals: Vec::new(),
        }
    }

    pub fn n_token_types(&self) -> usize {
        self.token_types.len()
    }

    pub fn n_non_terminals(&self) -> usize {
        self.non_terminals.len()
    }

    /// Column index of the synthetic end-of-stream terminal.
    pub fn eos(&self) -> usize {
        self.token_types.len()
    }

    pub fn add_token_type(&mut self, type_name: String, enumerator: Option<String>) -> TokenTypeIdx {
        let idx = TokenTypeIdx::from_usize(self.token_types.len());
        self.token_types.push(TokenType {
            type_name,
            enumerator,
        });
        idx
    }

    pub fn add_non_terminal(&mut self, name: String) -> NonTerminalIdx {
        let idx = NonTerminalIdx::from_usize(self.non_terminals.len());
        self.non_terminals.push(NonTerminal {
            name,
            rules: Vec::new(),
        });
        idx
    }

    pub fn add_rule(&mut self, non_terminal: NonTerminalIdx, rule: Rule) -> RuleIdx {
        let non_terminal = &mut self.non_terminals[non_terminal.as_usize()];
        let idx = RuleIdx::from_usize(non_terminal.rules.len());
        non_terminal.rules.push(rule);
        idx
    }

    pub fn get_non_terminal(&self, idx: NonTerminalIdx) -> &NonTerminal {
        &self.non_terminals[idx.as_usize()]
    }

    pub fn get_token_type(&self, idx: TokenTypeIdx) -> &TokenType {
        &self.token_types[idx.as_usize()]
    }

    pub fn get_rule(&self, nt_idx: NonTerminalIdx, rule_idx: RuleIdx) -> &Rule {
        &self.non_terminals[nt_idx.as_usize()].rules[rule_idx.as_usize()]
    }

    pub fn non_terminal_indices(&self) -> impl Iterator<Item = (NonTerminalIdx, &NonTerminal)> {
        self.non_terminals
            .iter()
            .enumerate()
            .map(|(i, nt)| (NonTerminalIdx::from_usize(i), nt))
    }

    pub fn rule_indices(
        &self,
        non_terminal: NonTerminalIdx,
    ) -> impl Iterator<Item = (RuleIdx, &Rule)> {
        self.non_terminals[non_terminal.as_usize()]
            .rules
            .iter()
            .enumerate()
            .map(|(i, r)| (RuleIdx::from_usize(i), r))
    }

    /// Human-readable name of a table column, `$` for the end-of-stream
    /// column, `Type.Enum` for discriminated-value terminals.
    pub fn token_name(&self, token: usize) -> String {
        if token == self.eos() {
            return "$".to_owned();
        }
        let token_type = &self.token_types[token];
        match &token_type.enumerator {
            Some(enumerator) => format!("{}.{}", token_type.type_name, enumerator),
            None => token_type.type_name.clone(),
        }
    }

    pub fn is_enum_term(&self, term: &Term) -> bool {
        match term.kind {
            TermKind::Terminal(t) => self.get_token_type(t).is_enum(),
            TermKind::NonTerminal { .. } => false,
        }
    }

    /// Terms of a rule that survive into the emitted AST (everything except
    /// enumerator-terminal occurrences, whose match result is the
    /// alternative itself).
    pub fn retained_terms<'g>(&'g self, rule: &'g Rule) -> impl Iterator<Item = &'g Term> {
        rule.terms.iter().filter(move |term| !self.is_enum_term(term))
    }

    /// The name an alternative contributes to its non-terminal's emitted
    /// enum: the explicit tag, or a derived default (the retained field's
    /// type for single-field alternatives, `Empty` for empty ones). `None`
    /// when a `[Tag]` would be required.
    pub fn alternative_name(&self, rule: &Rule) -> Option<String> {
        if let Some(tag) = &rule.tag {
            return Some(tag.clone());
        }
        let retained: Vec<&Term> = self.retained_terms(rule).collect();
        match retained.as_slice() {
            [] => Some("Empty".to_owned()),
            [term] => Some(match term.kind {
                TermKind::NonTerminal { idx, .. } => self.get_non_terminal(idx).name.clone(),
                TermKind::Terminal(t) => self.get_token_type(t).type_name.clone(),
            }),
            _ => None,
        }
    }

    /// Global rule id base per non-terminal: exclusive scan of rule counts
    /// in source order. The augmented rule occupies id 0, so the first real
    /// rule gets id 1.
    pub fn rule_offsets(&self) -> Vec<usize> {
        let mut offsets = Vec::with_capacity(self.non_terminals.len());
        let mut total = 0;
        for non_terminal in &self.non_terminals {
            offsets.push(total);
            total += non_terminal.rules.len();
        }
        offsets
    }
}

impl Default for Grammar {
    fn default() -> Self {
        Grammar::new()
    }
}

pub struct SymbolDisplay<'a, 'b> {
    symbol: &'a SymbolIdx,
    grammar: &'b Grammar,
}

impl<'a, 'b> SymbolDisplay<'a, 'b> {
    pub fn new(symbol: &'a SymbolIdx, grammar: &'b Grammar) -> Self {
        Self { symbol, grammar }
    }
}

impl<'a, 'b> fmt::Display for SymbolDisplay<'a, 'b> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.symbol {
            SymbolIdx::NonTerminal(nt) => {
                write!(f, "{}", self.grammar.get_non_terminal(*nt).name)
            }
            SymbolIdx::Terminal(t) => write!(f, "{}", self.grammar.token_name(t.as_usize())),
        }
    }
}

pub struct RuleDisplay<'a, 'b> {
    rule: &'a Rule,
    grammar: &'b Grammar,
}

impl<'a, 'b> RuleDisplay<'a, 'b> {
    pub fn new(rule: &'a Rule, grammar: &'b Grammar) -> Self {
        Self { rule, grammar }
    }
}

impl<'a, 'b> fmt::Display for RuleDisplay<'a, 'b> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (term_idx, term) in self.rule.terms.iter().enumerate() {
            if term_idx != 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", SymbolDisplay::new(&term.symbol_idx(), self.grammar))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::parse_grammar;
    use crate::test_grammars;

    #[test]
    fn token_names() {
        let grammar = parse_grammar(test_grammars::EXPR).unwrap();
        assert_eq!(grammar.token_name(0), "Symbol.Plus");
        assert_eq!(grammar.token_name(1), "Identifier");
        assert_eq!(grammar.token_name(grammar.eos()), "$");
    }

    #[test]
    fn rule_offsets_skip_nothing_and_start_after_the_augmented_rule() {
        let grammar = parse_grammar(test_grammars::EXPR).unwrap();
        // S' has one rule (id 0), E two (ids 1, 2), T one (id 3).
        assert_eq!(grammar.rule_offsets(), [0, 1, 3]);
    }

    #[test]
    fn alternative_names_prefer_tags_and_derive_defaults() {
        let grammar = parse_grammar(test_grammars::EXPR).unwrap();
        let e = &grammar.non_terminals[1];
        assert_eq!(grammar.alternative_name(&e.rules[0]).as_deref(), Some("BinOp"));
        assert_eq!(grammar.alternative_name(&e.rules[1]).as_deref(), Some("T"));

        let grammar = parse_grammar(test_grammars::EMPTY_ALT).unwrap();
        let s = &grammar.non_terminals[1];
        assert_eq!(grammar.alternative_name(&s.rules[1]).as_deref(), Some("Empty"));
    }

    #[test]
    fn untagged_multi_field_alternatives_have_no_name() {
        let grammar = parse_grammar(test_grammars::EXPR).unwrap();
        let untagged = Rule {
            tag: None,
            terms: grammar.non_terminals[1].rules[0].terms.clone(),
        };
        assert_eq!(grammar.alternative_name(&untagged), None);
    }

    #[test]
    fn rule_display_renders_symbols() {
        let grammar = parse_grammar(test_grammars::EXPR).unwrap();
        let rule = &grammar.non_terminals[1].rules[0];
        assert_eq!(
            RuleDisplay::new(rule, &grammar).to_string(),
            "E Symbol.Plus T"
        );
    }
}
