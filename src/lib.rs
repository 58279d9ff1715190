//! An LALR(1) parser generator.
//!
//! The pipeline loads a declarative grammar file, computes FIRST sets over a
//! left-recursion-eliminated scratch copy of the rules, builds the canonical
//! LR(1) item-set collection with LALR-style core merging, derives the
//! shift/reduce/goto table (rejecting conflicted grammars with an aggregated
//! report), and emits two Rust source artifacts: typed AST declarations and
//! a table-driven parser dispatching through nested `match` expressions.

pub mod codegen;
pub mod error;
pub mod first;
pub mod grammar;
pub mod item;
pub mod lalr;
pub mod loader;
pub mod table;

#[cfg(test)]
mod test_grammars;

pub use codegen::GeneratedCode;
pub use error::Error;
pub use grammar::Grammar;

/// Runs the whole pipeline on a grammar file's contents.
pub fn generate(grammar_text: &str) -> Result<GeneratedCode, Error> {
    let grammar = loader::parse_grammar(grammar_text)?;
    let first_sets = first::compute_first_sets(&grammar)?;
    let automaton = lalr::build_automaton(&grammar, &first_sets);
    let table = table::build_table(&grammar, &automaton)?;
    codegen::generate(&grammar, &table)
}
