//! The instruction set and its mnemonic table.
use std::fmt;

/// Token that ends the condition of a `BOH` or `LOOP` block.
pub const CONDITION_SEPARATOR: &str = "|";

/// Prefix of every decoded variable name.
pub const VARIABLE_SIGIL: char = '$';

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Op {
    /// `B`: text literal.
    Str,
    /// `N`: integer literal, folded while decoding.
    Int,
    /// `P`: print the top of the stack.
    Print,
    /// `V`: variable reference.
    Var,
    /// `=`: bind a value to a variable.
    Assign,
    Add,
    Subtract,
    Multiply,
    Divide,
    Equal,
    NotEqual,
    Greater,
    GreaterOrEqual,
    Less,
    LessOrEqual,
    Or,
    And,
    If,
    Else,
    EndIf,
    EndElse,
    Loop,
    EndLoop,
}

/// A two-operand operation, as found in the operator table.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Equal,
    NotEqual,
    Greater,
    GreaterOrEqual,
    Less,
    LessOrEqual,
    Or,
    And,
}

impl Op {
    pub const ALL: [Op; 23] = [
        Op::Str,
        Op::Int,
        Op::Print,
        Op::Var,
        Op::Assign,
        Op::Add,
        Op::Subtract,
        Op::Multiply,
        Op::Divide,
        Op::Equal,
        Op::NotEqual,
        Op::Greater,
        Op::GreaterOrEqual,
        Op::Less,
        Op::LessOrEqual,
        Op::Or,
        Op::And,
        Op::If,
        Op::Else,
        Op::EndIf,
        Op::EndElse,
        Op::Loop,
        Op::EndLoop,
    ];

    pub fn mnemonic(self) -> &'static str {
        match self {
            Op::Str => "B",
            Op::Int => "N",
            Op::Print => "P",
            Op::Var => "V",
            Op::Assign => "=",
            Op::Add => "ADD",
            Op::Subtract => "SUB",
            Op::Multiply => "MUL",
            Op::Divide => "DIV",
            Op::Equal => "QE",
            Op::NotEqual => "EN",
            Op::Greater => "TG",
            Op::GreaterOrEqual => "EG",
            Op::Less => "TL",
            Op::LessOrEqual => "EL",
            Op::Or => "OR",
            Op::And => "AND",
            Op::If => "BOH",
            Op::Else => "OH",
            Op::EndIf => "HOB",
            Op::EndElse => "HO",
            Op::Loop => "LOOP",
            Op::EndLoop => "POOL",
        }
    }

    /// Looks up the opcode whose mnemonic is exactly `text`.
    pub fn from_mnemonic(text: &str) -> Option<Op> {
        Op::ALL.into_iter().find(|op| op.mnemonic() == text)
    }

    /// Whether some mnemonic begins with `prefix`.
    pub fn is_mnemonic_prefix(prefix: &str) -> bool {
        Op::ALL.iter().any(|op| op.mnemonic().starts_with(prefix))
    }

    /// Whether some mnemonic begins with the character `c`.
    pub fn starts_mnemonic(c: char) -> bool {
        Op::ALL.iter().any(|op| op.mnemonic().starts_with(c))
    }

    pub fn is_control_flow(self) -> bool {
        matches!(self, Op::If | Op::Else | Op::EndIf | Op::EndElse | Op::Loop | Op::EndLoop)
    }

    pub fn is_logical(self) -> bool {
        matches!(self, Op::Or | Op::And)
    }

    pub fn binary(self) -> Option<BinaryOp> {
        Some(match self {
            Op::Add => BinaryOp::Add,
            Op::Subtract => BinaryOp::Subtract,
            Op::Multiply => BinaryOp::Multiply,
            Op::Divide => BinaryOp::Divide,
            Op::Equal => BinaryOp::Equal,
            Op::NotEqual => BinaryOp::NotEqual,
            Op::Greater => BinaryOp::Greater,
            Op::GreaterOrEqual => BinaryOp::GreaterOrEqual,
            Op::Less => BinaryOp::Less,
            Op::LessOrEqual => BinaryOp::LessOrEqual,
            Op::Or => BinaryOp::Or,
            Op::And => BinaryOp::And,
            _ => return None,
        })
    }
}

impl BinaryOp {
    /// The one-letter operators allowed between the digit runs of an `N` literal.
    pub fn from_int_operator(c: char) -> Option<BinaryOp> {
        match c {
            'a' => Some(BinaryOp::Add),
            's' => Some(BinaryOp::Subtract),
            'm' => Some(BinaryOp::Multiply),
            'd' => Some(BinaryOp::Divide),
            _ => None,
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BinaryOp::Add => "ADD",
            BinaryOp::Subtract => "SUB",
            BinaryOp::Multiply => "MUL",
            BinaryOp::Divide => "DIV",
            BinaryOp::Equal => "QE",
            BinaryOp::NotEqual => "EN",
            BinaryOp::Greater => "TG",
            BinaryOp::GreaterOrEqual => "EG",
            BinaryOp::Less => "TL",
            BinaryOp::LessOrEqual => "EL",
            BinaryOp::Or => "OR",
            BinaryOp::And => "AND",
        };
        f.write_str(name)
    }
}
