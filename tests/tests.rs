use lalrgen::{generate, Error};

const EXPR: &str = "\
Symbol{Plus},
Identifier,
$
E : [BinOp] E*(expr) Symbol.Plus T(term) ; | T(term) ;
T : Identifier(id) ;
";

const CHLORO: &str = include_str!("../demos/chloro.grammar");

#[test]
fn expression_grammar_end_to_end() {
    let code = generate(EXPR).unwrap();

    assert!(code.ast.starts_with("//!"));
    assert!(code.ast.contains("use crate::lexer as lex;"));
    assert!(code.ast.contains("pub struct T { pub id: lex::Identifier }"));
    assert!(code.ast.contains("pub enum E {"));
    assert!(code.ast.contains("pub enum Node {"));

    assert!(code.parser.contains("pub struct Parser {"));
    assert!(code.parser.contains("pub fn parse(mut self) -> Result<E, ParseError> {"));
    assert!(code.parser.contains("fn reduce(&mut self, rule: usize) -> Result<(), ParseError> {"));
    assert!(code.parser.contains("fn goto_state(&mut self) -> Result<(), ParseError> {"));
    assert!(code.parser.contains("Parsing error at line"));
}

#[test]
fn demo_grammar_end_to_end() {
    let code = generate(CHLORO).unwrap();
    assert!(code.ast.contains("pub struct Script { pub items: Items }"));
    assert!(code.ast.contains("pub enum Items {"));
    assert!(code.ast.contains("rest: Box<Items>,"));
    assert!(code.parser.contains("lex::Symbol::LeftBrace => self.shift("));
}

#[test]
fn generation_is_deterministic() {
    let first = generate(CHLORO).unwrap();
    let second = generate(CHLORO).unwrap();
    assert_eq!(first.ast, second.ast);
    assert_eq!(first.parser, second.parser);

    let first = generate(EXPR).unwrap();
    let second = generate(EXPR).unwrap();
    assert_eq!(first.ast, second.ast);
    assert_eq!(first.parser, second.parser);
}

#[test]
fn conflicts_abort_generation_with_a_report() {
    let dangling_else = "\
If, Then, Else, Expr, $
S : [IfThen] If(i) Expr(e) Then(t) S(s) ;
  | [IfThenElse] If(i) Expr(e) Then(t) S(s) Else(el) S(s2) ;
  | Expr(e) ;
";
    let err = generate(dangling_else).unwrap_err();
    assert!(matches!(err, Error::Conflicts(_)));
    let report = err.to_string();
    assert!(report.contains("Shift-reduce conflict in item set I"));
    assert!(report.contains("when parsing token Else"));
    assert!(report.contains("conflicting actions are"));
}

#[test]
fn reduce_reduce_conflicts_are_reported() {
    let grammar = "\
A, $
S : X(x) | Y(y) ;
X : A(x) ;
Y : A(x) ;
";
    let err = generate(grammar).unwrap_err();
    let report = err.to_string();
    assert!(report.contains("Reduce-reduce conflict in item set I"));
    // Both candidate reductions are spelled out with their rule ids.
    assert!(report.contains("r3") || report.contains("r4"));
}

#[test]
fn syntax_errors_carry_the_offending_name() {
    let err = generate("A, $ S : Unknown(u) ;").unwrap_err();
    assert!(err
        .to_string()
        .contains("Failed to find corresponding term type \"Unknown\""));
}

#[test]
fn artifacts_are_written_side_by_side() {
    let code = generate(EXPR).unwrap();
    let dir = std::env::temp_dir().join(format!("lalrgen-test-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let prefix = format!("{}/expr_", dir.display());

    code.write_to(&prefix).unwrap();

    let ast = std::fs::read_to_string(dir.join("expr_ast.rs")).unwrap();
    let parser = std::fs::read_to_string(dir.join("expr_parser.rs")).unwrap();
    assert_eq!(ast, code.ast);
    assert_eq!(parser, code.parser);

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn write_failure_is_an_io_error() {
    let code = generate(EXPR).unwrap();
    let err = code
        .write_to("/nonexistent-directory-for-lalrgen/out_")
        .unwrap_err();
    assert!(matches!(err, Error::Io { .. }));
    assert!(err.to_string().contains("failed to write file"));
}
