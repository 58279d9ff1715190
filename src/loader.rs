//! Conversion of the textual grammar description into a [`Grammar`].
//!
//! Three passes over the same symbol stream: the token-type list (terminated
//! by `$`), non-terminal discovery (every identifier followed by `:`), and
//! rule reading. The augmented rule S' -> S is prepended before validation.

use crate::error::Error;
use crate::grammar::{Grammar, NonTerminalIdx, Rule, Term, TermKind, TokenTypeIdx};

pub fn parse_grammar(text: &str) -> Result<Grammar, Error> {
    GrammarBuilder::new(text).build()
}

fn is_word(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}

fn is_identifier(symbol: &str) -> bool {
    is_word(symbol.as_bytes()[0])
}

/// Yields maximal identifier runs or single punctuation characters,
/// skipping whitespace. Copyable so callers can save and restore a
/// position.
#[derive(Clone, Copy)]
struct Scanner<'a> {
    rest: &'a str,
}

impl<'a> Scanner<'a> {
    fn new(text: &'a str) -> Self {
        Scanner { rest: text }
    }

    fn next_symbol(&mut self) -> Option<&'a str> {
        self.rest = self.rest.trim_start_matches(|c: char| c.is_ascii_whitespace());
        let first = self.rest.bytes().next()?;
        let len = if is_word(first) {
            self.rest.bytes().take_while(|b| is_word(*b)).count()
        } else {
            self.rest.chars().next().map(char::len_utf8).unwrap_or(0)
        };
        let (symbol, rest) = self.rest.split_at(len);
        self.rest = rest;
        Some(symbol)
    }
}

struct GrammarBuilder<'a> {
    scanner: Scanner<'a>,
    grammar: Grammar,
    current_head: Option<NonTerminalIdx>,
}

impl<'a> GrammarBuilder<'a> {
    fn new(text: &'a str) -> Self {
        GrammarBuilder {
            scanner: Scanner::new(text),
            grammar: Grammar::new(),
            current_head: None,
        }
    }

    fn build(mut self) -> Result<Grammar, Error> {
        self.read_token_type_list()?;
        self.extract_non_terminals()?;
        while self.read_rule_group()? {}
        self.finish()
    }

    fn expect_symbol(&mut self) -> Result<&'a str, Error> {
        self.scanner
            .next_symbol()
            .ok_or_else(|| Error::syntax("unexpected end of grammar"))
    }

    fn find_non_terminal(&self, name: &str) -> Option<NonTerminalIdx> {
        self.grammar
            .non_terminals
            .iter()
            .position(|nt| nt.name == name)
            .map(NonTerminalIdx::from_usize)
    }

    fn has_token_type(&self, name: &str) -> bool {
        self.grammar
            .token_types
            .iter()
            .any(|t| t.type_name == name)
    }

    fn find_payload_token(&self, name: &str) -> Option<TokenTypeIdx> {
        self.grammar
            .token_types
            .iter()
            .position(|t| t.type_name == name && t.enumerator.is_none())
            .map(TokenTypeIdx::from_usize)
    }

    fn find_enum_token(&self, name: &str, enumerator: &str) -> Option<TokenTypeIdx> {
        self.grammar
            .token_types
            .iter()
            .position(|t| {
                t.type_name == name && t.enumerator.as_deref() == Some(enumerator)
            })
            .map(TokenTypeIdx::from_usize)
    }

    fn read_token_type_list(&mut self) -> Result<(), Error> {
        loop {
            let symbol = self
                .scanner
                .next_symbol()
                .ok_or_else(|| Error::syntax("token type list not finished"))?;
            if symbol == "$" {
                return Ok(());
            }
            if !is_identifier(symbol) {
                return Err(Error::syntax(format!(
                    "unexpected symbol \"{symbol}\" in token type list"
                )));
            }
            if self.has_token_type(symbol) {
                return Err(Error::validation(format!(
                    "token type \"{symbol}\" declared twice; \
                     declare all enumerators of a type in one block"
                )));
            }
            let name = symbol.to_owned();
            match self.expect_symbol()? {
                "," => {
                    self.grammar.add_token_type(name, None);
                }
                "{" => {
                    self.read_enumerator_block(&name)?;
                    let after = self.expect_symbol()?;
                    if after != "," {
                        return Err(Error::syntax(format!(
                            "token type \"{name}\" must be terminated by a comma"
                        )));
                    }
                }
                other => {
                    return Err(Error::syntax(format!(
                        "expected \",\" or \"{{\" after token type \"{name}\", found \"{other}\""
                    )));
                }
            }
        }
    }

    fn read_enumerator_block(&mut self, name: &str) -> Result<(), Error> {
        loop {
            let enumerator = self.expect_symbol()?;
            if !is_identifier(enumerator) {
                return Err(Error::syntax(format!(
                    "expected an enumerator name under token type \"{name}\", found \"{enumerator}\""
                )));
            }
            if self.find_enum_token(name, enumerator).is_some() {
                return Err(Error::validation(format!(
                    "enumerator \"{enumerator}\" declared twice under token type \"{name}\""
                )));
            }
            self.grammar
                .add_token_type(name.to_owned(), Some(enumerator.to_owned()));
            match self.expect_symbol()? {
                "," => continue,
                "}" => return Ok(()),
                other => {
                    return Err(Error::syntax(format!(
                        "expected \",\" or \"}}\" in enumerator list of \"{name}\", found \"{other}\""
                    )));
                }
            }
        }
    }

    /// Every identifier immediately followed by `:` in the remaining text
    /// names a non-terminal. Index 0 is the augmented start placeholder.
    fn extract_non_terminals(&mut self) -> Result<(), Error> {
        self.grammar.add_non_terminal(String::new());
        let mut probe = self.scanner;
        let mut previous: Option<&str> = None;
        while let Some(symbol) = probe.next_symbol() {
            if symbol == ":" {
                if let Some(name) = previous.filter(|p| is_identifier(p)) {
                    if self.find_non_terminal(name).is_some() {
                        return Err(Error::validation(format!(
                            "non-terminal \"{name}\" declared twice"
                        )));
                    }
                    self.grammar.add_non_terminal(name.to_owned());
                }
            }
            previous = Some(symbol);
        }
        if self.grammar.n_non_terminals() == 1 {
            return Err(Error::validation("grammar declares no non-terminals"));
        }
        Ok(())
    }

    /// Reads one rule group head and all its alternatives. Returns false at
    /// end of input.
    fn read_rule_group(&mut self) -> Result<bool, Error> {
        let Some(first_symbol) = self.scanner.next_symbol() else {
            return Ok(false);
        };
        let head = if first_symbol == "|" {
            self.current_head
                .ok_or_else(|| Error::validation("Missing the first alternative"))?
        } else {
            let head = self.find_non_terminal(first_symbol).ok_or_else(|| {
                Error::syntax(format!(
                    "rule head \"{first_symbol}\" is not a declared non-terminal"
                ))
            })?;
            if self.expect_symbol()? != ":" {
                return Err(Error::syntax(format!(
                    "Non-terminal type name \"{first_symbol}\" must be followed by colon"
                )));
            }
            self.current_head = Some(head);
            head
        };
        loop {
            let (rule, terminator) = self.read_alternative()?;
            self.grammar.add_rule(head, rule);
            if terminator == ";" {
                return Ok(true);
            }
            // '|' inside the group: the next alternative follows directly.
        }
    }

    fn read_alternative(&mut self) -> Result<(Rule, &'a str), Error> {
        let mut rule = Rule {
            tag: None,
            terms: Vec::new(),
        };
        let restore_point = self.scanner;
        match self.scanner.next_symbol() {
            Some("[") => {
                let tag = self.expect_symbol()?;
                if !is_identifier(tag) {
                    return Err(Error::syntax(format!(
                        "expected an alternative tag name, found \"{tag}\""
                    )));
                }
                if self.expect_symbol()? != "]" {
                    return Err(Error::syntax(format!(
                        "Alternative type name \"{tag}\" should be enclosed by brackets"
                    )));
                }
                rule.tag = Some(tag.to_owned());
            }
            _ => self.scanner = restore_point,
        }
        loop {
            let symbol = self
                .scanner
                .next_symbol()
                .ok_or_else(|| Error::syntax("unexpected end of grammar inside a rule"))?;
            if symbol == ";" || symbol == "|" {
                return Ok((rule, symbol));
            }
            rule.terms.push(self.read_term(symbol)?);
        }
    }

    fn read_term(&mut self, type_name: &str) -> Result<Term, Error> {
        if let Some(nt) = self.find_non_terminal(type_name) {
            let mut next = self.expect_symbol()?;
            let mut indirect = false;
            if next == "*" {
                indirect = true;
                next = self.expect_symbol()?;
            }
            if next != "(" {
                return Err(Error::syntax(format!(
                    "Non-terminal type name \"{type_name}\" must be followed by parentheses \
                     enclosed variable name"
                )));
            }
            let binder = self.read_binder()?;
            return Ok(Term {
                binder: Some(binder),
                kind: TermKind::NonTerminal { idx: nt, indirect },
            });
        }
        if self.has_token_type(type_name) {
            let next = self.expect_symbol()?;
            if next == "." {
                let enumerator = self.expect_symbol()?;
                let token = self.find_enum_token(type_name, enumerator).ok_or_else(|| {
                    Error::validation(format!(
                        "Failed to find enumerator \"{enumerator}\" under token type \"{type_name}\""
                    ))
                })?;
                return Ok(Term {
                    binder: None,
                    kind: TermKind::Terminal(token),
                });
            }
            let token = self.find_payload_token(type_name).ok_or_else(|| {
                Error::validation(format!(
                    "token type \"{type_name}\" is enumerated and must be used as \
                     \"{type_name}.<enumerator>\""
                ))
            })?;
            if next != "(" {
                return Err(Error::syntax(format!(
                    "Terminal non-enum type name \"{type_name}\" must be followed by parentheses \
                     enclosed variable name"
                )));
            }
            let binder = self.read_binder()?;
            return Ok(Term {
                binder: Some(binder),
                kind: TermKind::Terminal(token),
            });
        }
        Err(Error::validation(format!(
            "Failed to find corresponding term type \"{type_name}\""
        )))
    }

    fn read_binder(&mut self) -> Result<String, Error> {
        let binder = self.expect_symbol()?;
        if !is_identifier(binder) {
            return Err(Error::syntax(format!(
                "expected a variable name, found \"{binder}\""
            )));
        }
        if self.expect_symbol()? != ")" {
            return Err(Error::syntax(format!(
                "Variable name \"{binder}\" must be enclosed by parentheses"
            )));
        }
        Ok(binder.to_owned())
    }

    fn finish(mut self) -> Result<Grammar, Error> {
        // The augmented rule S' -> S, at rule index 0 of non-terminal 0.
        self.grammar.non_terminals[0].rules.push(Rule {
            tag: None,
            terms: vec![Term {
                binder: None,
                kind: TermKind::NonTerminal {
                    idx: NonTerminalIdx(1),
                    indirect: false,
                },
            }],
        });
        self.validate()?;
        Ok(self.grammar)
    }

    fn validate(&self) -> Result<(), Error> {
        let grammar = &self.grammar;
        for non_terminal in &grammar.non_terminals[1..] {
            if non_terminal.rules.is_empty() {
                return Err(Error::validation(format!(
                    "non-terminal \"{}\" has no rules",
                    non_terminal.name
                )));
            }
        }
        self.check_reachability()?;
        self.check_alternative_names()
    }

    fn check_reachability(&self) -> Result<(), Error> {
        let grammar = &self.grammar;
        let mut reachable = vec![false; grammar.n_non_terminals()];
        reachable[0] = true;
        let mut work_list = vec![NonTerminalIdx(1)];
        reachable[1] = true;
        while let Some(nt) = work_list.pop() {
            for rule in &grammar.get_non_terminal(nt).rules {
                for term in &rule.terms {
                    if let TermKind::NonTerminal { idx, .. } = term.kind {
                        if !reachable[idx.as_usize()] {
                            reachable[idx.as_usize()] = true;
                            work_list.push(idx);
                        }
                    }
                }
            }
        }
        match reachable.iter().position(|r| !r) {
            Some(unreachable) => Err(Error::validation(format!(
                "non-terminal \"{}\" is not reachable from the start symbol",
                grammar.non_terminals[unreachable].name
            ))),
            None => Ok(()),
        }
    }

    /// Alternatives of a multi-rule non-terminal become enum variants; their
    /// names (explicit tags or derived defaults) must exist and be unique.
    fn check_alternative_names(&self) -> Result<(), Error> {
        let grammar = &self.grammar;
        for non_terminal in &grammar.non_terminals[1..] {
            if non_terminal.rules.len() < 2 {
                continue;
            }
            let mut names: Vec<String> = Vec::with_capacity(non_terminal.rules.len());
            for (rule_idx, rule) in non_terminal.rules.iter().enumerate() {
                let name = grammar.alternative_name(rule).ok_or_else(|| {
                    Error::validation(format!(
                        "alternative #{} of non-terminal \"{}\" must declare a [Tag] name",
                        rule_idx + 1,
                        non_terminal.name
                    ))
                })?;
                if names.contains(&name) {
                    return Err(Error::validation(format!(
                        "alternatives of non-terminal \"{}\" need distinct tags \
                         (\"{}\" appears twice)",
                        non_terminal.name, name
                    )));
                }
                names.push(name);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_grammars;

    #[test]
    fn scanner_symbols() {
        let mut scanner = Scanner::new("E : [BinOp] E*(expr) ;");
        let mut symbols = Vec::new();
        while let Some(symbol) = scanner.next_symbol() {
            symbols.push(symbol);
        }
        assert_eq!(
            symbols,
            ["E", ":", "[", "BinOp", "]", "E", "*", "(", "expr", ")", ";"]
        );
    }

    #[test]
    fn token_type_list() {
        let grammar = parse_grammar(test_grammars::EXPR).unwrap();
        assert_eq!(grammar.n_token_types(), 2);
        assert_eq!(grammar.token_types[0].type_name, "Symbol");
        assert_eq!(grammar.token_types[0].enumerator.as_deref(), Some("Plus"));
        assert_eq!(grammar.token_types[1].type_name, "Identifier");
        assert_eq!(grammar.token_types[1].enumerator, None);
        assert_eq!(grammar.eos(), 2);
    }

    #[test]
    fn non_terminal_discovery() {
        let grammar = parse_grammar(test_grammars::EXPR).unwrap();
        let names: Vec<&str> = grammar
            .non_terminals
            .iter()
            .map(|nt| nt.name.as_str())
            .collect();
        assert_eq!(names, ["", "E", "T"]);
    }

    #[test]
    fn augmented_rule() {
        let grammar = parse_grammar(test_grammars::EXPR).unwrap();
        let augmented = &grammar.non_terminals[0].rules;
        assert_eq!(augmented.len(), 1);
        assert_eq!(augmented[0].terms.len(), 1);
        assert_eq!(
            augmented[0].terms[0].kind,
            TermKind::NonTerminal {
                idx: NonTerminalIdx(1),
                indirect: false
            }
        );
    }

    #[test]
    fn rules_and_terms() {
        let grammar = parse_grammar(test_grammars::EXPR).unwrap();
        let e = &grammar.non_terminals[1];
        assert_eq!(e.rules.len(), 2);
        assert_eq!(e.rules[0].tag.as_deref(), Some("BinOp"));
        assert_eq!(e.rules[0].terms.len(), 3);
        assert_eq!(
            e.rules[0].terms[0].kind,
            TermKind::NonTerminal {
                idx: NonTerminalIdx(1),
                indirect: true
            }
        );
        assert_eq!(e.rules[0].terms[0].binder.as_deref(), Some("expr"));
        assert_eq!(e.rules[0].terms[1].kind, TermKind::Terminal(TokenTypeIdx(0)));
        assert_eq!(e.rules[0].terms[1].binder, None);
        assert_eq!(e.rules[1].tag, None);
        assert_eq!(e.rules[1].terms.len(), 1);
    }

    #[test]
    fn pipe_separated_alternatives() {
        // Both "; |" and "|" continue a rule group.
        let grammar = parse_grammar(test_grammars::EMPTY_ALT).unwrap();
        let s = &grammar.non_terminals[1];
        assert_eq!(s.rules.len(), 2);
        assert_eq!(s.rules[0].terms.len(), 1);
        assert!(s.rules[1].terms.is_empty());
    }

    #[test]
    fn unknown_term_type() {
        let err = parse_grammar("A, $ S : B(b) ;").unwrap_err();
        assert!(err
            .to_string()
            .contains("Failed to find corresponding term type \"B\""));
    }

    #[test]
    fn missing_colon() {
        let err = parse_grammar("A, $ S : A(a) ; T A(a) ;").unwrap_err();
        assert!(err.to_string().contains("is not a declared non-terminal"));
    }

    #[test]
    fn missing_parentheses() {
        let err = parse_grammar("A, $ S : A ;").unwrap_err();
        assert!(err.to_string().contains("must be followed by parentheses"));
    }

    #[test]
    fn unknown_enumerator() {
        let err = parse_grammar("Symbol{Plus}, $ S : Symbol.Minus ;").unwrap_err();
        assert!(err
            .to_string()
            .contains("Failed to find enumerator \"Minus\" under token type \"Symbol\""));
    }

    #[test]
    fn enumerated_type_without_enumerator() {
        let err = parse_grammar("Symbol{Plus}, $ S : Symbol(s) ;").unwrap_err();
        assert!(err.to_string().contains("is enumerated"));
    }

    #[test]
    fn missing_first_alternative() {
        let err = parse_grammar("A, $ | A(a) ; S : A(a) ;").unwrap_err();
        assert!(err.to_string().contains("Missing the first alternative"));
    }

    #[test]
    fn unterminated_token_type_list() {
        let err = parse_grammar("A, B,").unwrap_err();
        assert!(err.to_string().contains("token type list not finished"));
    }

    #[test]
    fn unterminated_rule() {
        let err = parse_grammar("A, $ S : A(a)").unwrap_err();
        assert!(err
            .to_string()
            .contains("unexpected end of grammar inside a rule"));
    }

    #[test]
    fn split_enumerator_block_rejected() {
        let err = parse_grammar("Symbol{Plus}, Symbol{Minus}, $ S : Symbol.Plus ;").unwrap_err();
        assert!(err.to_string().contains("declared twice"));
    }

    #[test]
    fn duplicate_alternative_tags() {
        let err =
            parse_grammar("A, B, $ S : [Same] A(a) B(b) ; | [Same] B(b) A(a) ;").unwrap_err();
        assert!(err.to_string().contains("distinct tags"));
    }

    #[test]
    fn multi_field_alternative_requires_tag() {
        let err = parse_grammar("A, B, $ S : A(a) B(b) ; | A(a) ;").unwrap_err();
        assert!(err.to_string().contains("must declare a [Tag] name"));
    }

    #[test]
    fn unreachable_non_terminal() {
        let err = parse_grammar("A, $ S : A(a) ; X : A(a) ;").unwrap_err();
        assert!(err.to_string().contains("not reachable"));
    }

    #[test]
    fn reachability_through_indirect_terms() {
        let grammar = parse_grammar(test_grammars::INDIRECT).unwrap();
        assert_eq!(grammar.n_non_terminals(), 3);
    }
}
