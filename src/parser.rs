//! Splitting program text into the token stream the interpreter runs.
use std::fmt;

use crate::ops::{Op, CONDITION_SEPARATOR};

/// Lines starting with this marker are skipped.
pub const COMMENT_MARKER: &str = "//";

/// A whitespace-delimited word of the source program.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Token<'a> {
    pub text: &'a str,
    /// 1-based line of the source program.
    pub line: usize,
}

impl<'a> Token<'a> {
    pub fn new(text: &'a str, line: usize) -> Self {
        Token { text, line }
    }

    /// The opcode if the whole token is a mnemonic.
    pub fn op(&self) -> Option<Op> {
        Op::from_mnemonic(self.text)
    }

    pub fn is_separator(&self) -> bool {
        self.text == CONDITION_SEPARATOR
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text)
    }
}

/// Splits the program into lines of tokens, dropping comments and blank lines.
///
/// The tokens of every line come out in reverse order. Literal decoding reverses
/// the decoded text again, so both halves are needed to recover the encoded value.
pub fn parse_lines(str: &str) -> Vec<Vec<Token<'_>>> {
    let mut lines = Vec::new();
    for (index, line) in str.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with(COMMENT_MARKER) {
            continue;
        }
        let mut tokens: Vec<Token> =
            line.split_whitespace().map(|word| Token::new(word, index + 1)).collect();
        tokens.reverse();
        lines.push(tokens);
    }
    lines
}

/// The flat token stream: [`parse_lines`] concatenated in source order.
pub fn parse_program(str: &str) -> Vec<Token<'_>> {
    parse_lines(str).into_iter().flatten().collect()
}
