//! Hand-written lexer for the Chloro toy language.
//!
//! This is the companion tool of the generator: it produces the token
//! stream that parsers generated from `demos/chloro.grammar` consume, and
//! it is the reference implementation of the lexer contract those parsers
//! expect (`Token` with a tagged `value` payload and a line/column
//! `position`). It shares no code with the generator core.

use std::process::ExitCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    Equal,
    Semicolon,
    Colon,
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Int,
    Def,
    Return,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexError {
    IntegerLiteralTooBig,
    UnknownSequence,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Integer {
    pub value: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenValue {
    Symbol(Symbol),
    Keyword(Keyword),
    Identifier(Identifier),
    Integer(Integer),
    Error(LexError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub value: TokenValue,
    pub position: Position,
}

const SYMBOLS: [(u8, Symbol); 7] = [
    (b'=', Symbol::Equal),
    (b';', Symbol::Semicolon),
    (b':', Symbol::Colon),
    (b'(', Symbol::LeftParen),
    (b')', Symbol::RightParen),
    (b'{', Symbol::LeftBrace),
    (b'}', Symbol::RightBrace),
];

const KEYWORDS: [(&str, Keyword); 3] = [
    ("int", Keyword::Int),
    ("def", Keyword::Def),
    ("return", Keyword::Return),
];

fn is_identifier_first(byte: u8) -> bool {
    byte.is_ascii_alphabetic() || byte == b'_'
}

fn is_identifier_rest(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}

/// Unknown sequences end at the next whitespace or punctuation byte.
fn is_recover_point(byte: u8) -> bool {
    byte.is_ascii_whitespace() || byte.is_ascii_punctuation()
}

pub struct Lexer<'a> {
    script: &'a [u8],
    index: usize,
    position: Position,
    result: Vec<Token>,
}

impl<'a> Lexer<'a> {
    pub fn new(script: &'a str) -> Self {
        Lexer {
            script: script.as_bytes(),
            index: 0,
            position: Position { line: 1, column: 1 },
            result: Vec::new(),
        }
    }

    fn is_end(&self) -> bool {
        self.script.len() <= self.index
    }

    fn current(&self) -> u8 {
        self.script[self.index]
    }

    fn push(&mut self, value: TokenValue) {
        self.result.push(Token {
            value,
            position: self.position,
        });
    }

    fn skip_whitespace(&mut self) {
        while !self.is_end() {
            match self.current() {
                b' ' => self.position.column += 1,
                b'\t' => self.position.column += 4,
                _ => return,
            }
            self.index += 1;
        }
    }

    fn skip_newlines(&mut self) {
        while !self.is_end() {
            match self.current() {
                b'\n' => self.index += 1,
                b'\r' => {
                    self.index += 1;
                    if !self.is_end() && self.current() == b'\n' {
                        self.index += 1;
                    }
                }
                _ => return,
            }
            self.position.column = 1;
            self.position.line += 1;
        }
    }

    fn match_identifier_or_keyword(&mut self) {
        if self.is_end() || !is_identifier_first(self.current()) {
            return;
        }
        let start = self.index;
        self.index += 1;
        while !self.is_end() && is_identifier_rest(self.current()) {
            self.index += 1;
        }
        let length = self.index - start;
        let identifier = std::str::from_utf8(&self.script[start..self.index]).unwrap_or_default();
        match KEYWORDS.iter().find(|(text, _)| *text == identifier) {
            Some((_, keyword)) => self.push(TokenValue::Keyword(*keyword)),
            None => self.push(TokenValue::Identifier(Identifier {
                name: identifier.to_owned(),
            })),
        }
        self.position.column += length;
    }

    fn match_symbol(&mut self) {
        if self.is_end() {
            return;
        }
        let current = self.current();
        if let Some((_, symbol)) = SYMBOLS.iter().find(|(byte, _)| *byte == current) {
            self.push(TokenValue::Symbol(*symbol));
            self.index += 1;
            self.position.column += 1;
        }
    }

    fn match_integer_literal(&mut self) {
        if self.is_end() || !self.current().is_ascii_digit() {
            return;
        }
        let start = self.index;
        while !self.is_end() && self.current().is_ascii_digit() {
            self.index += 1;
        }
        let digits = std::str::from_utf8(&self.script[start..self.index]).unwrap_or_default();
        match digits.parse::<i32>() {
            Ok(value) => self.push(TokenValue::Integer(Integer { value })),
            Err(_) => self.push(TokenValue::Error(LexError::IntegerLiteralTooBig)),
        }
        self.position.column += self.index - start;
    }

    fn consume_error(&mut self) {
        let start = self.index;
        // Always make progress, even when the offending byte is itself a
        // recovery point.
        self.index += 1;
        while !self.is_end() && !is_recover_point(self.current()) {
            self.index += 1;
        }
        self.push(TokenValue::Error(LexError::UnknownSequence));
        self.position.column += self.index - start;
    }

    pub fn lex(mut self) -> Vec<Token> {
        let mut last_index = 0;
        while !self.is_end() {
            self.skip_whitespace();
            self.skip_newlines();
            self.match_identifier_or_keyword();
            self.match_symbol();
            self.match_integer_literal();
            if self.index == last_index {
                self.consume_error();
            }
            last_index = self.index;
        }
        self.result
    }
}

const SAMPLE: &str = "
global_var: int = 0;
def func(arg: int): int
{
    local_var: int = 1;
}
";

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    let source = match args.as_slice() {
        [_] => SAMPLE.to_owned(),
        [_, path] => match std::fs::read_to_string(path) {
            Ok(source) => source,
            Err(error) => {
                println!("failed to read file {path}: {error}");
                return ExitCode::from(1);
            }
        },
        _ => {
            println!("Usage: chlex [script-path]");
            return ExitCode::from(1);
        }
    };
    for token in Lexer::new(&source).lex() {
        println!(
            "{}:{}\t{:?}",
            token.position.line, token.position.column, token.value
        );
    }
    ExitCode::SUCCESS
}
