//! Decoding of the literals, names and operators packed into a payload token.
use thiserror::Error;

use crate::{
    ops::{BinaryOp, Op, VARIABLE_SIGIL},
    value::apply_int,
    vm::OperationError,
};

/// An error found while decoding a payload token.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("`{text}` does not start any mnemonic")]
    UnknownMnemonic { text: String },
    #[error("Payload ended while reading {reading}")]
    UnexpectedEnd { reading: &'static str },
    #[error("Expected a digit, found `{found}`")]
    ExpectedDigit { found: char },
    #[error("Integer literal {digits} is out of range")]
    IntegerOutOfRange { digits: String },
    #[error("Folding the integer literal failed: {0}")]
    Folding(OperationError),
    #[error("Block mnemonic `{0}` inside a payload")]
    MisplacedControlFlow(Op),
}

/// A cursor over the characters of one payload token.
pub(crate) struct Decoder {
    chars: Vec<char>,
    pc: usize,
}

impl Decoder {
    pub fn new(text: &str) -> Self {
        Decoder { chars: text.chars().collect(), pc: 0 }
    }

    /// Index of the first unconsumed character.
    pub fn position(&self) -> usize {
        self.pc
    }

    pub fn is_done(&self) -> bool {
        self.pc >= self.chars.len()
    }

    fn peek(&self, reading: &'static str) -> Result<char, DecodeError> {
        self.chars.get(self.pc).copied().ok_or(DecodeError::UnexpectedEnd { reading })
    }

    /// Consumes characters until they spell a mnemonic.
    pub fn next_op(&mut self) -> Result<Op, DecodeError> {
        let mut text = String::new();
        loop {
            let Some(&c) = self.chars.get(self.pc) else {
                return Err(if text.is_empty() {
                    DecodeError::UnexpectedEnd { reading: "a mnemonic" }
                } else {
                    DecodeError::UnknownMnemonic { text }
                });
            };
            text.push(c);
            self.pc += 1;
            if let Some(op) = Op::from_mnemonic(&text) {
                return Ok(op);
            }
            if !Op::is_mnemonic_prefix(&text) {
                return Err(DecodeError::UnknownMnemonic { text });
            }
        }
    }

    /// Reads every other character until an uppercase letter or the start of a mnemonic.
    fn read_strided(&mut self, reading: &'static str) -> Result<String, DecodeError> {
        let mut s = String::new();
        loop {
            let c = self.peek(reading)?;
            if c.is_uppercase() || Op::starts_mnemonic(c) {
                return Ok(s);
            }
            s.push(c);
            self.pc += 2;
        }
    }

    /// Decodes the body of a `B` literal.
    pub fn read_text(&mut self) -> Result<String, DecodeError> {
        let s = self.read_strided("a text literal")?;
        Ok(s.chars().rev().collect())
    }

    /// Decodes the body of a `V` reference into a `$`-prefixed name.
    pub fn read_name(&mut self) -> Result<String, DecodeError> {
        let s = self.read_strided("a variable name")?;
        let mut name = String::with_capacity(s.len() + 1);
        name.push(VARIABLE_SIGIL);
        name.push_str(&s);
        Ok(name)
    }

    fn read_digits(&mut self) -> Result<i64, DecodeError> {
        let start = self.pc;
        while self.peek("an integer literal")?.is_ascii_digit() {
            self.pc += 1;
        }
        if start == self.pc {
            return Err(DecodeError::ExpectedDigit { found: self.chars[self.pc] });
        }
        let digits: String = self.chars[start..self.pc].iter().collect();
        digits.parse().map_err(|_| DecodeError::IntegerOutOfRange { digits })
    }

    /// Decodes the body of an `N` literal, folding its operators left to right.
    pub fn read_int(&mut self) -> Result<i64, DecodeError> {
        let mut lhs = self.read_digits()?;
        while let Some(op) = BinaryOp::from_int_operator(self.peek("an integer literal")?) {
            self.pc += 1;
            let rhs = self.read_digits()?;
            lhs = apply_int(op, lhs, rhs).map_err(DecodeError::Folding)?;
        }
        Ok(lhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_int(text: &str) -> Result<i64, DecodeError> {
        let mut d = Decoder::new(text);
        assert_eq!(d.next_op()?, Op::Int);
        d.read_int()
    }

    #[test]
    fn test_folds_left_to_right() {
        assert_eq!(decode_int("N3a2m4P"), Ok(20));
        assert_eq!(decode_int("N10s4s3P"), Ok(3));
        assert_eq!(decode_int("N7d2P"), Ok(3));
        assert_eq!(decode_int("N2s9d2P"), Ok(-4));
        assert_eq!(decode_int("N042P"), Ok(42));
    }

    #[test]
    fn test_int_stops_at_mnemonic() {
        let mut d = Decoder::new("N12a3TL");
        assert_eq!(d.next_op(), Ok(Op::Int));
        assert_eq!(d.read_int(), Ok(15));
        assert_eq!(d.position(), 5);
        assert_eq!(d.next_op(), Ok(Op::Less));
        assert!(d.is_done());
    }

    #[test]
    fn test_int_errors() {
        assert_eq!(decode_int("N12"), Err(DecodeError::UnexpectedEnd { reading: "an integer literal" }));
        assert_eq!(decode_int("NP"), Err(DecodeError::ExpectedDigit { found: 'P' }));
        assert_eq!(decode_int("N1aP"), Err(DecodeError::ExpectedDigit { found: 'P' }));
        assert_eq!(decode_int("N4d0P"), Err(DecodeError::Folding(OperationError::DivisionByZero)));
        assert!(matches!(decode_int("N99999999999999999999P"), Err(DecodeError::IntegerOutOfRange { .. })));
    }

    #[test]
    fn test_text_is_strided_and_reversed() {
        let mut d = Decoder::new("Bo-l-l-e-h-P");
        assert_eq!(d.next_op(), Ok(Op::Str));
        assert_eq!(d.read_text().as_deref(), Ok("hello"));
        assert_eq!(d.next_op(), Ok(Op::Print));
        assert!(d.is_done());
    }

    #[test]
    fn test_filler_may_be_anything() {
        let mut d = Decoder::new("BiXhQP");
        d.next_op().unwrap();
        assert_eq!(d.read_text().as_deref(), Ok("hi"));
    }

    #[test]
    fn test_text_stops_on_assign() {
        let mut d = Decoder::new("Bb.a.=");
        d.next_op().unwrap();
        assert_eq!(d.read_text().as_deref(), Ok("ab"));
        assert_eq!(d.next_op(), Ok(Op::Assign));
    }

    #[test]
    fn test_empty_text() {
        let mut d = Decoder::new("BP");
        d.next_op().unwrap();
        assert_eq!(d.read_text().as_deref(), Ok(""));
    }

    #[test]
    fn test_name_keeps_order() {
        let mut d = Decoder::new("Vc.n.t.=");
        assert_eq!(d.next_op(), Ok(Op::Var));
        assert_eq!(d.read_name().as_deref(), Ok("$cnt"));
        assert_eq!(d.position(), 7);
    }

    #[test]
    fn test_strided_scan_needs_terminator() {
        let mut d = Decoder::new("Va.");
        d.next_op().unwrap();
        assert_eq!(d.read_name(), Err(DecodeError::UnexpectedEnd { reading: "a variable name" }));
        let mut d = Decoder::new("Bab");
        d.next_op().unwrap();
        assert!(d.read_text().is_err());
    }

    #[test]
    fn test_multi_char_mnemonics() {
        for (text, op) in [("ADD", Op::Add), ("AND", Op::And), ("EN", Op::NotEqual), ("EG", Op::GreaterOrEqual), ("OR", Op::Or), ("HOB", Op::EndElse)] {
            let mut d = Decoder::new(text);
            assert_eq!(d.next_op(), Ok(op), "{text}");
        }
    }

    #[test]
    fn test_unknown_mnemonic() {
        assert_eq!(Decoder::new("X").next_op(), Err(DecodeError::UnknownMnemonic { text: "X".into() }));
        assert_eq!(Decoder::new("AX").next_op(), Err(DecodeError::UnknownMnemonic { text: "AX".into() }));
        assert_eq!(Decoder::new("LOO").next_op(), Err(DecodeError::UnknownMnemonic { text: "LOO".into() }));
        assert_eq!(Decoder::new("|").next_op(), Err(DecodeError::UnknownMnemonic { text: "|".into() }));
    }
}
