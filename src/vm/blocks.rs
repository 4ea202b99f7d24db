//! Recovering `BOH`/`OH`/`HOB`/`HO` and `LOOP`/`POOL` blocks from the flat token stream.
use thiserror::Error;

use crate::{ops::Op, parser::Token};

/// A malformed block.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BlockError {
    #[error("Missing `|` after the condition")]
    MissingSeparator,
    #[error("Empty condition")]
    EmptyCondition,
    #[error("`{0}` has no right operand")]
    DanglingOperator(Op),
    #[error("Unexpected `{0}` in the condition, expected `OR` or `AND`")]
    TrailingCondition(String),
    #[error("No matching `{expected}`")]
    Unterminated { expected: Op },
    #[error("Found `{found}` where `{expected}` was expected")]
    Mismatched { expected: Op, found: Op },
    #[error("`{0}` without a matching opener")]
    Stray(Op),
}

/// An extracted `BOH` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Conditional<'p, 'a> {
    pub condition: &'p [Token<'a>],
    pub body: &'p [Token<'a>],
    pub alternate: Option<&'p [Token<'a>]>,
    /// Index of the first token after the block.
    pub next: usize,
}

/// An extracted `LOOP` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Loop<'p, 'a> {
    pub condition: &'p [Token<'a>],
    pub body: &'p [Token<'a>],
    pub next: usize,
}

/// Splits off the condition starting at `p`. Returns it with the index after the separator.
fn extract_condition<'p, 'a>(
    tokens: &'p [Token<'a>],
    p: usize,
) -> Result<(&'p [Token<'a>], usize), BlockError> {
    let len = tokens[p..]
        .iter()
        .position(Token::is_separator)
        .ok_or(BlockError::MissingSeparator)?;
    let condition = &tokens[p..p + len];
    validate_condition(condition)?;
    Ok((condition, p + len + 1))
}

/// A condition alternates operands and `OR`/`AND` tokens, starting and ending with an operand.
fn validate_condition(condition: &[Token]) -> Result<(), BlockError> {
    if condition.is_empty() {
        return Err(BlockError::EmptyCondition);
    }
    for (i, token) in condition.iter().enumerate().skip(1).step_by(2) {
        match token.op() {
            Some(op) if op.is_logical() => {
                if i + 1 >= condition.len() {
                    return Err(BlockError::DanglingOperator(op));
                }
            }
            _ => return Err(BlockError::TrailingCondition(token.text.to_owned())),
        }
    }
    Ok(())
}

/// Depth-tracked scan from `start`. Stops at the first of `terminals` seen at depth 1 and
/// returns its index.
fn scan_body(
    tokens: &[Token],
    start: usize,
    opener: Op,
    closers: &[Op],
    terminals: &[Op],
    expected: Op,
) -> Result<usize, BlockError> {
    let mut depth = 1usize;
    for (i, token) in tokens.iter().enumerate().skip(start) {
        let Some(op) = token.op() else { continue };
        if depth == 1 {
            if terminals.contains(&op) {
                return Ok(i);
            }
            if closers.contains(&op) {
                return Err(BlockError::Mismatched { expected, found: op });
            }
        }
        if op == opener {
            depth += 1;
        } else if closers.contains(&op) {
            depth -= 1;
        }
    }
    Err(BlockError::Unterminated { expected })
}

/// Extracts the `BOH` block whose condition starts at `p`, just after the `BOH` token.
pub(crate) fn extract_if<'p, 'a>(
    tokens: &'p [Token<'a>],
    p: usize,
) -> Result<Conditional<'p, 'a>, BlockError> {
    let (condition, body_start) = extract_condition(tokens, p)?;

    // A nested if/else closes with `HO`, so both closers unwind depth.
    let closers = [Op::EndIf, Op::EndElse];
    let end = scan_body(tokens, body_start, Op::If, &closers, &[Op::Else, Op::EndIf], Op::EndIf)?;
    let body = &tokens[body_start..end];

    if tokens[end].op() == Some(Op::EndIf) {
        return Ok(Conditional { condition, body, alternate: None, next: end + 1 });
    }

    let alternate_start = end + 1;
    let alternate_end =
        scan_body(tokens, alternate_start, Op::If, &closers, &[Op::EndElse], Op::EndElse)?;
    Ok(Conditional {
        condition,
        body,
        alternate: Some(&tokens[alternate_start..alternate_end]),
        next: alternate_end + 1,
    })
}

/// Extracts the `LOOP` block whose condition starts at `p`, just after the `LOOP` token.
pub(crate) fn extract_loop<'p, 'a>(
    tokens: &'p [Token<'a>],
    p: usize,
) -> Result<Loop<'p, 'a>, BlockError> {
    let (condition, body_start) = extract_condition(tokens, p)?;
    let end = scan_body(tokens, body_start, Op::Loop, &[Op::EndLoop], &[Op::EndLoop], Op::EndLoop)?;
    Ok(Loop { condition, body: &tokens[body_start..end], next: end + 1 })
}
