//! Emission of the two generated artifacts: typed AST declarations and a
//! table-driven parser whose dispatch is direct nested `match` selection.
//!
//! Both artifacts are built as strings first and written to disk in one
//! step, so a failed generation leaves no partial output. The generated
//! code expects the companion lexer at `crate::lexer`: a `Clone + Debug`
//! `Token` with a `value: TokenValue` payload enum (one variant per token
//! type name, wrapping the payload type of the same name; enumerator enums
//! are `Copy`) and a `position` with `line`/`column` fields.

use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;

use fxhash::FxHashSet;
use itertools::Itertools as _;

use crate::error::Error;
use crate::grammar::{Grammar, NonTerminal, Rule, Term, TermKind, TokenTypeIdx};
use crate::table::{Action, TableRow};

macro_rules! w {
    ($out:expr, $($arg:tt)*) => {{
        let _ = writeln!($out, $($arg)*);
    }};
}

/// The two artifacts, in memory.
#[derive(Debug)]
pub struct GeneratedCode {
    pub ast: String,
    pub parser: String,
}

impl GeneratedCode {
    /// Persists the artifacts as `<prefix>ast.rs` and `<prefix>parser.rs`.
    pub fn write_to(&self, prefix: &str) -> Result<(), Error> {
        write_file(PathBuf::from(format!("{prefix}ast.rs")), &self.ast)?;
        write_file(PathBuf::from(format!("{prefix}parser.rs")), &self.parser)
    }
}

fn write_file(path: PathBuf, contents: &str) -> Result<(), Error> {
    fs::write(&path, contents).map_err(|source| Error::Io {
        op: "write",
        path,
        source,
    })
}

pub fn generate(grammar: &Grammar, table: &[TableRow]) -> Result<GeneratedCode, Error> {
    let generator = CodeGenerator {
        grammar,
        table,
        categories: categories(grammar),
    };
    Ok(GeneratedCode {
        ast: generator.emit_ast()?,
        parser: generator.emit_parser(),
    })
}

/// One dispatch category of the generated `parse` loop: a payload token
/// type, or an enumerated type with all its members.
enum CategoryKind {
    Payload(TokenTypeIdx),
    Enum(Vec<TokenTypeIdx>),
}

struct Category {
    type_name: String,
    kind: CategoryKind,
}

fn categories(grammar: &Grammar) -> Vec<Category> {
    let mut categories: Vec<Category> = Vec::new();
    for (index, token_type) in grammar.token_types.iter().enumerate() {
        let index = TokenTypeIdx::from_usize(index);
        if token_type.is_enum() {
            // Enumerators of one type are declared in one block, so they
            // are contiguous.
            if let Some(Category {
                type_name,
                kind: CategoryKind::Enum(members),
            }) = categories.last_mut()
            {
                if *type_name == token_type.type_name {
                    members.push(index);
                    continue;
                }
            }
            categories.push(Category {
                type_name: token_type.type_name.clone(),
                kind: CategoryKind::Enum(vec![index]),
            });
        } else {
            categories.push(Category {
                type_name: token_type.type_name.clone(),
                kind: CategoryKind::Payload(index),
            });
        }
    }
    categories
}

fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;
    for ch in name.chars() {
        if ch.is_ascii_uppercase() {
            if prev_lower {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
            prev_lower = false;
        } else {
            prev_lower = ch.is_ascii_lowercase() || ch.is_ascii_digit();
            out.push(ch);
        }
    }
    out
}

/// Contains-by-value edges between the emitted AST types; indirect edges
/// are not part of the graph.
struct DependencyGraph {
    dependencies: Vec<FxHashSet<usize>>,
}

impl DependencyGraph {
    fn new(size: usize) -> Self {
        DependencyGraph {
            dependencies: vec![FxHashSet::default(); size],
        }
    }

    fn add(&mut self, root: usize, dependency: usize) {
        self.dependencies[root].insert(dependency);
    }

    /// Dependency-first order; `None` when the graph has a cycle.
    fn topological_order(&self) -> Option<Vec<usize>> {
        let size = self.dependencies.len();
        let mut remaining: Vec<usize> = self.dependencies.iter().map(|d| d.len()).collect();
        let mut order = Vec::with_capacity(size);
        for _ in 0..size {
            let next = remaining.iter().position(|count| *count == 0)?;
            remaining[next] = usize::MAX;
            order.push(next);
            for (index, dependencies) in self.dependencies.iter().enumerate() {
                if remaining[index] != usize::MAX && dependencies.contains(&next) {
                    remaining[index] -= 1;
                }
            }
        }
        Some(order)
    }
}

struct CodeGenerator<'a> {
    grammar: &'a Grammar,
    table: &'a [TableRow],
    categories: Vec<Category>,
}

impl<'a> CodeGenerator<'a> {
    /* AST declarations */

    fn struct_order(&self) -> Result<Vec<usize>, Error> {
        let mut graph = DependencyGraph::new(self.grammar.n_non_terminals());
        for (nt_idx, non_terminal) in self.grammar.non_terminal_indices() {
            for rule in &non_terminal.rules {
                for term in &rule.terms {
                    if let TermKind::NonTerminal {
                        idx,
                        indirect: false,
                    } = term.kind
                    {
                        if idx == nt_idx {
                            return Err(Error::AstCycle(format!(
                                "AST type \"{}\" contains itself by value; \
                                 mark the edge indirect with `*`",
                                non_terminal.name
                            )));
                        }
                        graph.add(nt_idx.as_usize(), idx.as_usize());
                    }
                }
            }
        }
        graph.topological_order().ok_or_else(|| {
            Error::AstCycle(
                "AST type dependency graph contains a cycle; \
                 mark an edge indirect with `*`"
                    .to_owned(),
            )
        })
    }

    fn term_type(&self, term: &Term) -> String {
        match term.kind {
            TermKind::Terminal(t) => {
                format!("lex::{}", self.grammar.get_token_type(t).type_name)
            }
            TermKind::NonTerminal { idx, indirect } => {
                let name = &self.grammar.get_non_terminal(idx).name;
                if indirect {
                    format!("Box<{name}>")
                } else {
                    name.clone()
                }
            }
        }
    }

    fn emit_ast(&self) -> Result<String, Error> {
        let grammar = self.grammar;
        let order = self.struct_order()?;
        let mut out = String::new();
        w!(out, "//! Abstract syntax tree of the generated parser.");
        w!(out, "//!");
        w!(out, "//! Generated by lalrgen; do not edit.");
        w!(out, "");
        w!(out, "use crate::lexer as lex;");
        for nt_index in order {
            if nt_index == 0 {
                continue;
            }
            let non_terminal = &grammar.non_terminals[nt_index];
            w!(out, "");
            w!(out, "#[derive(Debug)]");
            if non_terminal.rules.len() == 1 {
                self.emit_struct(&mut out, &non_terminal.name, &non_terminal.rules[0]);
            } else {
                self.emit_enum(&mut out, non_terminal)?;
            }
        }
        w!(out, "");
        w!(out, "/// One slot of the parse stack: a finished non-terminal or a");
        w!(out, "/// shifted token.");
        w!(out, "#[derive(Debug)]");
        w!(out, "pub enum Node {{");
        for non_terminal in &grammar.non_terminals[1..] {
            w!(out, "    {0}({0}),", non_terminal.name);
        }
        w!(out, "    Token(lex::Token),");
        w!(out, "}}");
        Ok(out)
    }

    fn emit_struct(&self, out: &mut String, name: &str, rule: &Rule) {
        let retained: Vec<&Term> = self.grammar.retained_terms(rule).collect();
        match retained.as_slice() {
            [] => w!(out, "pub struct {name};"),
            [term] => {
                w!(
                    out,
                    "pub struct {name} {{ pub {}: {} }}",
                    binder(term),
                    self.term_type(term)
                );
            }
            _ => {
                w!(out, "pub struct {name} {{");
                for term in retained {
                    w!(out, "    pub {}: {},", binder(term), self.term_type(term));
                }
                w!(out, "}}");
            }
        }
    }

    fn emit_enum(&self, out: &mut String, non_terminal: &NonTerminal) -> Result<(), Error> {
        w!(out, "pub enum {} {{", non_terminal.name);
        for rule in &non_terminal.rules {
            let variant = self.grammar.alternative_name(rule).ok_or_else(|| {
                Error::Validation(format!(
                    "alternative of non-terminal \"{}\" has no [Tag] name",
                    non_terminal.name
                ))
            })?;
            let retained: Vec<&Term> = self.grammar.retained_terms(rule).collect();
            match retained.as_slice() {
                [] => w!(out, "    {variant},"),
                [term] => w!(out, "    {variant}({}),", self.term_type(term)),
                _ => {
                    w!(out, "    {variant} {{");
                    for term in &retained {
                        w!(out, "        {}: {},", binder(term), self.term_type(term));
                    }
                    w!(out, "    }},");
                }
            }
        }
        w!(out, "}}");
        Ok(())
    }

    /* Parser source */

    fn emit_parser(&self) -> String {
        let grammar = self.grammar;
        let root = &grammar.non_terminals[1].name;
        let mut out = String::new();
        w!(out, "//! Table-driven parser generated by lalrgen; do not edit.");
        w!(out, "");
        w!(out, "use std::fmt;");
        w!(out, "");
        w!(out, "use crate::lexer as lex;");
        w!(out, "");
        w!(out, "use super::ast::*;");
        w!(out, "");
        w!(out, "/// Raised when the token stream does not match the grammar.");
        w!(out, "#[derive(Debug, Clone, PartialEq, Eq)]");
        w!(out, "pub struct ParseError {{");
        w!(out, "    pub line: usize,");
        w!(out, "    pub column: usize,");
        w!(out, "}}");
        w!(out, "");
        w!(out, "impl fmt::Display for ParseError {{");
        w!(out, "    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {{");
        w!(
            out,
            "        write!(f, \"Parsing error at line {{}}, column {{}}\", self.line, self.column)"
        );
        w!(out, "    }}");
        w!(out, "}}");
        w!(out, "");
        w!(out, "impl std::error::Error for ParseError {{}}");
        w!(out, "");
        w!(out, "pub struct Parser {{");
        w!(out, "    tokens: Vec<lex::Token>,");
        w!(out, "    pos: usize,");
        w!(out, "    states: Vec<usize>,");
        w!(out, "    nodes: Vec<Node>,");
        w!(out, "}}");
        w!(out, "");
        w!(out, "#[allow(dead_code, unreachable_patterns)]");
        w!(out, "impl Parser {{");
        w!(out, "    pub fn new(tokens: Vec<lex::Token>) -> Parser {{");
        w!(out, "        Parser {{");
        w!(out, "            tokens,");
        w!(out, "            pos: 0,");
        w!(out, "            states: vec![0],");
        w!(out, "            nodes: Vec::new(),");
        w!(out, "        }}");
        w!(out, "    }}");
        w!(out, "");
        w!(out, "    fn error<T>(&self) -> Result<T, ParseError> {{");
        w!(out, "        let (line, column) = self");
        w!(out, "            .tokens");
        w!(out, "            .get(self.pos)");
        w!(out, "            .or_else(|| self.tokens.last())");
        w!(
            out,
            "            .map(|token| (token.position.line, token.position.column))"
        );
        w!(out, "            .unwrap_or((0, 0));");
        w!(out, "        Err(ParseError {{ line, column }})");
        w!(out, "    }}");
        w!(out, "");
        w!(out, "    fn peek(&self) -> Option<&lex::TokenValue> {{");
        w!(out, "        self.tokens.get(self.pos).map(|token| &token.value)");
        w!(out, "    }}");
        w!(out, "");
        w!(out, "    fn shift(&mut self, state: usize) {{");
        w!(
            out,
            "        self.nodes.push(Node::Token(self.tokens[self.pos].clone()));"
        );
        w!(out, "        self.states.push(state);");
        w!(out, "        self.pos += 1;");
        w!(out, "    }}");
        self.emit_pop_helpers(&mut out);
        w!(out, "");
        w!(out, "    fn accept(&mut self) -> Result<{root}, ParseError> {{");
        w!(out, "        match self.nodes.pop() {{");
        w!(out, "            Some(Node::{root}(root)) => Ok(root),");
        w!(out, "            _ => self.error(),");
        w!(out, "        }}");
        w!(out, "    }}");
        self.emit_reduce(&mut out);
        self.emit_goto(&mut out);
        self.emit_parse(&mut out, root);
        w!(out, "}}");
        out
    }

    /// Monomorphic accessors popping one node and its state: the raw token,
    /// each popped non-terminal, and each popped payload terminal type.
    fn emit_pop_helpers(&self, out: &mut String) {
        let grammar = self.grammar;
        let mut pops_token = false;
        let mut popped_non_terminals: Vec<usize> = Vec::new();
        let mut popped_payloads: Vec<usize> = Vec::new();
        for non_terminal in &grammar.non_terminals[1..] {
            for rule in &non_terminal.rules {
                for term in &rule.terms {
                    match term.kind {
                        TermKind::Terminal(t) => {
                            pops_token = true;
                            let token_type = grammar.get_token_type(t);
                            if !token_type.is_enum() {
                                let index = t.as_usize();
                                if !popped_payloads.contains(&index) {
                                    popped_payloads.push(index);
                                }
                            }
                        }
                        TermKind::NonTerminal { idx, .. } => {
                            if !popped_non_terminals.contains(&idx.as_usize()) {
                                popped_non_terminals.push(idx.as_usize());
                            }
                        }
                    }
                }
            }
        }
        if pops_token {
            w!(out, "");
            w!(out, "    fn pop_token(&mut self) -> lex::Token {{");
            w!(out, "        self.states.pop();");
            w!(out, "        match self.nodes.pop() {{");
            w!(out, "            Some(Node::Token(token)) => token,");
            w!(
                out,
                "            _ => unreachable!(\"token expected on the node stack\"),"
            );
            w!(out, "        }}");
            w!(out, "    }}");
        }
        popped_non_terminals.sort_unstable();
        for index in popped_non_terminals {
            let name = &grammar.non_terminals[index].name;
            w!(out, "");
            w!(out, "    fn pop_{}(&mut self) -> {name} {{", snake_case(name));
            w!(out, "        self.states.pop();");
            w!(out, "        match self.nodes.pop() {{");
            w!(out, "            Some(Node::{name}(value)) => value,");
            w!(
                out,
                "            _ => unreachable!(\"{name} node expected on the node stack\"),"
            );
            w!(out, "        }}");
            w!(out, "    }}");
        }
        popped_payloads.sort_unstable();
        for index in popped_payloads {
            let name = &grammar.token_types[index].type_name;
            w!(out, "");
            w!(
                out,
                "    fn pop_{}_token(&mut self) -> lex::{name} {{",
                snake_case(name)
            );
            w!(out, "        match self.pop_token().value {{");
            w!(out, "            lex::TokenValue::{name}(value) => value,");
            w!(
                out,
                "            _ => unreachable!(\"{name} token expected on the node stack\"),"
            );
            w!(out, "        }}");
            w!(out, "    }}");
        }
    }

    fn emit_reduce(&self, out: &mut String) {
        let grammar = self.grammar;
        w!(out, "");
        w!(out, "    fn reduce(&mut self, rule: usize) -> Result<(), ParseError> {{");
        w!(out, "        match rule {{");
        let mut rule_id = 1;
        for non_terminal in &grammar.non_terminals[1..] {
            for rule in &non_terminal.rules {
                w!(out, "            {rule_id} => {{");
                // The body is popped right to left; every term releases one
                // node and one state.
                for term in rule.terms.iter().rev() {
                    match term.kind {
                        TermKind::Terminal(t) if grammar.get_token_type(t).is_enum() => {
                            w!(out, "                self.pop_token();");
                        }
                        TermKind::Terminal(t) => {
                            w!(
                                out,
                                "                let {} = self.pop_{}_token();",
                                binder(term),
                                snake_case(&grammar.get_token_type(t).type_name)
                            );
                        }
                        TermKind::NonTerminal { idx, indirect } => {
                            let pop = format!(
                                "self.pop_{}()",
                                snake_case(&grammar.get_non_terminal(idx).name)
                            );
                            if indirect {
                                w!(
                                    out,
                                    "                let {} = Box::new({pop});",
                                    binder(term)
                                );
                            } else {
                                w!(out, "                let {} = {pop};", binder(term));
                            }
                        }
                    }
                }
                w!(
                    out,
                    "                self.nodes.push(Node::{}({}));",
                    non_terminal.name,
                    self.construction(non_terminal, rule)
                );
                w!(out, "            }}");
                rule_id += 1;
            }
        }
        w!(out, "            _ => return self.error(),");
        w!(out, "        }}");
        w!(out, "        self.goto_state()");
        w!(out, "    }}");
    }

    /// The expression rebuilding one node from the popped binders.
    fn construction(&self, non_terminal: &NonTerminal, rule: &Rule) -> String {
        let grammar = self.grammar;
        let retained: Vec<&Term> = grammar.retained_terms(rule).collect();
        let fields = || retained.iter().map(|term| binder(term)).join(", ");
        if non_terminal.rules.len() == 1 {
            match retained.len() {
                0 => non_terminal.name.clone(),
                _ => format!("{} {{ {} }}", non_terminal.name, fields()),
            }
        } else {
            // Validated at load time; every alternative has a name here.
            let variant = grammar
                .alternative_name(rule)
                .unwrap_or_else(|| "Empty".to_owned());
            match retained.as_slice() {
                [] => format!("{}::{variant}", non_terminal.name),
                [term] => format!("{}::{variant}({})", non_terminal.name, binder(term)),
                _ => format!("{}::{variant} {{ {} }}", non_terminal.name, fields()),
            }
        }
    }

    fn emit_goto(&self, out: &mut String) {
        let grammar = self.grammar;
        w!(out, "");
        w!(out, "    fn goto_state(&mut self) -> Result<(), ParseError> {{");
        w!(out, "        let state = match self.states.last() {{");
        w!(out, "            Some(&state) => state,");
        w!(out, "            None => return self.error(),");
        w!(out, "        }};");
        w!(out, "        let next = match state {{");
        for (state_idx, row) in self.table.iter().enumerate() {
            if row.goto.iter().all(Option::is_none) {
                continue;
            }
            w!(out, "            {state_idx} => match self.nodes.last() {{");
            for (nt_index, dest) in row.goto.iter().enumerate() {
                let Some(dest) = dest else { continue };
                w!(
                    out,
                    "                Some(Node::{}(_)) => {},",
                    grammar.non_terminals[nt_index].name,
                    dest.as_usize()
                );
            }
            w!(out, "                _ => return self.error(),");
            w!(out, "            }},");
        }
        w!(out, "            _ => return self.error(),");
        w!(out, "        }};");
        w!(out, "        self.states.push(next);");
        w!(out, "        Ok(())");
        w!(out, "    }}");
    }

    fn emit_parse(&self, out: &mut String, root: &str) {
        let grammar = self.grammar;
        w!(out, "");
        w!(out, "    pub fn parse(mut self) -> Result<{root}, ParseError> {{");
        w!(out, "        loop {{");
        w!(out, "            let state = match self.states.last() {{");
        w!(out, "                Some(&state) => state,");
        w!(out, "                None => return self.error(),");
        w!(out, "            }};");
        w!(out, "            match state {{");
        for (state_idx, row) in self.table.iter().enumerate() {
            w!(out, "                {state_idx} => match self.peek() {{");
            for category in &self.categories {
                match &category.kind {
                    CategoryKind::Payload(token) => {
                        let Some(action) = action_expr(&row.actions[token.as_usize()]) else {
                            continue;
                        };
                        w!(
                            out,
                            "                    Some(&lex::TokenValue::{}(_)) => {action},",
                            category.type_name
                        );
                    }
                    CategoryKind::Enum(members) => {
                        let live: Vec<(&TokenTypeIdx, String)> = members
                            .iter()
                            .filter_map(|token| {
                                action_expr(&row.actions[token.as_usize()])
                                    .map(|action| (token, action))
                            })
                            .collect();
                        if live.is_empty() {
                            continue;
                        }
                        w!(
                            out,
                            "                    Some(&lex::TokenValue::{}(value)) => match value {{",
                            category.type_name
                        );
                        for (token, action) in live {
                            let token_type = grammar.get_token_type(*token);
                            let enumerator = token_type
                                .enumerator
                                .as_deref()
                                .unwrap_or_default();
                            w!(
                                out,
                                "                        lex::{}::{enumerator} => {action},",
                                category.type_name
                            );
                        }
                        w!(out, "                        _ => return self.error(),");
                        w!(out, "                    }},");
                    }
                }
            }
            if let Some(action) = action_expr(&row.actions[grammar.eos()]) {
                w!(out, "                    None => {action},");
            }
            w!(out, "                    _ => return self.error(),");
            w!(out, "                }},");
        }
        w!(out, "                _ => return self.error(),");
        w!(out, "            }}");
        w!(out, "        }}");
        w!(out, "    }}");
    }
}

fn binder(term: &Term) -> &str {
    term.binder.as_deref().unwrap_or("value")
}

fn action_expr(action: &Action) -> Option<String> {
    match action {
        Action::Error => None,
        Action::Shift(state) => Some(format!("self.shift({})", state.as_usize())),
        Action::Reduce(rule) => Some(format!("self.reduce({rule})?")),
        Action::Accept => Some("return self.accept()".to_owned()),
    }
}

#[cfg(test)]
mod tests {
    use crate::error::Error;
    use crate::generate;
    use crate::test_grammars;

    #[test]
    fn expression_ast_shapes() {
        let code = generate(test_grammars::EXPR).unwrap();
        assert!(code.ast.contains("pub struct T { pub id: lex::Identifier }"));
        assert!(code.ast.contains("pub enum E {"));
        assert!(code.ast.contains("    BinOp {"));
        assert!(code.ast.contains("        expr: Box<E>,"));
        assert!(code.ast.contains("        term: T,"));
        assert!(code.ast.contains("    T(T),"));
        // Dependency-first: T is declared before E.
        assert!(code.ast.find("pub struct T").unwrap() < code.ast.find("pub enum E").unwrap());
    }

    #[test]
    fn node_enum_lists_every_non_terminal() {
        let code = generate(test_grammars::EXPR).unwrap();
        assert!(code.ast.contains("pub enum Node {"));
        assert!(code.ast.contains("    E(E),"));
        assert!(code.ast.contains("    T(T),"));
        assert!(code.ast.contains("    Token(lex::Token),"));
    }

    #[test]
    fn expression_reduce_bodies() {
        let code = generate(test_grammars::EXPR).unwrap();
        assert!(code.parser.contains("let term = self.pop_t();"));
        assert!(code.parser.contains("self.pop_token();"));
        assert!(code.parser.contains("let expr = Box::new(self.pop_e());"));
        assert!(code
            .parser
            .contains("self.nodes.push(Node::E(E::BinOp { expr, term }));"));
        assert!(code.parser.contains("self.nodes.push(Node::E(E::T(term)));"));
        assert!(code.parser.contains("let id = self.pop_identifier_token();"));
        assert!(code.parser.contains("self.nodes.push(Node::T(T { id }));"));
    }

    #[test]
    fn parse_dispatch_is_nested_matches() {
        let code = generate(test_grammars::EXPR).unwrap();
        assert!(code
            .parser
            .contains("Some(&lex::TokenValue::Identifier(_)) => self.shift("));
        assert!(code
            .parser
            .contains("Some(&lex::TokenValue::Symbol(value)) => match value {"));
        assert!(code.parser.contains("lex::Symbol::Plus => self."));
        assert!(code.parser.contains("None => return self.accept(),"));
    }

    #[test]
    fn indirect_edge_is_boxed() {
        let code = generate(test_grammars::INDIRECT).unwrap();
        assert!(code.ast.contains("pub inner: Box<Inner>,"));
        assert!(code.ast.contains("    Outer(Outer),"));
        assert!(code.ast.contains("    Empty,"));
        assert!(code.ast.find("pub struct Outer").unwrap() < code.ast.find("pub enum Inner").unwrap());
        assert!(code.parser.contains("let inner = Box::new(self.pop_inner());"));
    }

    #[test]
    fn non_indirect_cycle_is_an_error() {
        let err = generate(test_grammars::INDIRECT_MISSING_STAR).unwrap_err();
        assert!(matches!(err, Error::AstCycle(_)));
        assert!(err.to_string().contains("mark an edge indirect"));
    }

    #[test]
    fn self_dependency_is_an_error() {
        let err = generate("A, $ S : [Cons] S(s) A(a) ; | A(a) ;").unwrap_err();
        assert!(matches!(err, Error::AstCycle(_)));
        assert!(err.to_string().contains("contains itself by value"));
    }

    #[test]
    fn empty_alternative_constructs_unit_variant() {
        let code = generate(test_grammars::EMPTY_ALT).unwrap();
        assert!(code.ast.contains("    Empty,"));
        assert!(code.parser.contains("self.nodes.push(Node::S(S::Empty));"));
    }

    #[test]
    fn unit_struct_for_all_enum_single_rule() {
        // A single rule whose only term is an enumerator match retains no
        // fields at all.
        let code = generate("Symbol{Semi}, $ S : Symbol.Semi ;").unwrap();
        assert!(code.ast.contains("pub struct S;"));
        assert!(code.parser.contains("self.nodes.push(Node::S(S));"));
    }

    #[test]
    fn chloro_generates() {
        let code = generate(test_grammars::CHLORO).unwrap();
        assert!(code.ast.contains("pub enum Item {"));
        assert!(code.ast.contains("    VarDecl(VarDecl),"));
        assert!(code.ast.contains("    FuncDecl(FuncDecl),"));
        assert!(code.ast.contains("pub body: Box<Items>,"));
        assert!(code.parser.contains("lex::Keyword::Def => self.shift("));
        assert!(code
            .parser
            .contains("let value = self.pop_integer_token();"));
    }
}
