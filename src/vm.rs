//! Functions for executing hoblang programs.
use std::{collections::BTreeMap, io::Write};

use rustc_hash::FxHashMap as HashMap;
use thiserror::Error;
use tracing::{debug, trace};

use crate::{
    config::get_config,
    ops::{BinaryOp, Op},
    parser::{parse_program, Token},
    value::{self, Value},
};

pub use self::{blocks::BlockError, decoder::DecodeError};
use self::decoder::Decoder;


mod blocks;
mod decoder;

/// An error that can occur during the execution of a single instruction.
#[derive(Error, Debug, Clone, PartialEq, Eq, Hash)]
pub enum OperationError {
    #[error("Removing from an empty stack")]
    PopFailed,
    #[error("Adding to a full stack")]
    PushFailed,
    #[error("Variable {name} has no value")]
    UnboundVariable { name: String },
    #[error("Assignment target is a {kind}, not a variable")]
    NotAVariable { kind: &'static str },
    #[error("Cannot apply {op} to {lhs} and {rhs}")]
    TypeMismatch { op: BinaryOp, lhs: &'static str, rhs: &'static str },
    #[error("Integer overflow")]
    IntegerOverflow,
    #[error("Division by zero")]
    DivisionByZero,
    #[error("Text would be longer than {limit} bytes")]
    TextTooLong { limit: usize },
}

/// An error that happened while running a hoblang program.
#[derive(Debug, Error)]
pub enum RunError {
    /// A payload token could not be decoded.
    #[error("Line {line}: cannot decode `{token}` at character {position}: {error}")]
    DecodeFailed {
        line: usize,
        token: String,
        /// Character index within the token where decoding of the failing part started.
        position: usize,
        error: DecodeError,
    },
    /// A `BOH` or `LOOP` block is unbalanced or its condition is malformed.
    #[error("Line {line}: malformed block at `{token}`: {error}")]
    MalformedBlock { line: usize, token: String, error: BlockError },
    /// A specific instruction failed.
    #[error("Line {line}: instruction {instruction} in `{token}` failed (instruction counter {instruction_counter}): {error}")]
    InstructionFailed {
        instruction: Op,
        line: usize,
        token: String,
        /// The number of instructions which have been run before this one.
        instruction_counter: u64,
        error: OperationError,
    },
    /// Blocks are nested deeper than [`VMOptions`] allow.
    #[error("Line {line}: blocks nested deeper than {limit}")]
    NestingTooDeep { line: usize, limit: usize },
    /// The program executed more instructions than the limit specified within [`VMOptions`].
    #[error("The program ran for too long ({instruction_counter} instructions had been run).")]
    RunTooLong { instruction_counter: u64 },
    /// Writing to the output sink failed.
    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

/// Options for the hoblang interpreter.
#[derive(Debug, Clone)]
pub struct VMOptions {
    /// The maximum size of the operand stack.
    pub max_stack_size: usize,
    /// How deep `BOH`/`LOOP` bodies and condition operands may nest.
    pub max_nesting_depth: usize,
    /// The maximum number of instructions to run, if this is reached,
    /// the program will stop with an error.
    ///
    /// Set to [`u64::MAX`] to disable this limit.
    pub max_op_count: u64,
    /// The maximum length in bytes of a text built by `ADD` or `MUL`.
    pub max_text_len: usize,
}

impl VMOptions {
    pub fn new(max_stack_size: usize, max_nesting_depth: usize, max_op_count: u64, max_text_len: usize) -> Self {
        Self { max_stack_size, max_nesting_depth, max_op_count, max_text_len }
    }
}

impl Default for VMOptions {
    fn default() -> Self {
        let conf = get_config();
        Self {
            max_stack_size: conf.max_stack_size,
            max_nesting_depth: conf.max_nesting_depth,
            max_op_count: conf.max_op_count,
            max_text_len: conf.max_text_len,
        }
    }
}

/// The succesful result of running a hoblang program.
#[derive(Debug, Clone, PartialEq)]
pub struct RunResult {
    /// The operand stack left after the program has finished.
    pub stack: Vec<Value>,
    /// Every variable the program mentioned, with its final value if it ever got one.
    pub variables: BTreeMap<String, Option<Value>>,
    /// The number of instructions which have been run.
    pub instruction_counter: u64,
}

/// The state of one program run.
struct State<'o, W: Write> {
    stack: Vec<Value>,
    variables: HashMap<String, Option<Value>>,
    output: &'o mut W,
    options: VMOptions,
    instructions_run: u64,
}

impl<'o, W: Write> State<'o, W> {
    fn new(output: &'o mut W, options: VMOptions) -> Self {
        State {
            stack: Vec::new(),
            variables: HashMap::default(),
            output,
            options,
            instructions_run: 0,
        }
    }

    fn push(&mut self, value: Value) -> Result<(), OperationError> {
        if self.stack.len() >= self.options.max_stack_size {
            return Err(OperationError::PushFailed);
        }
        self.stack.push(value);
        Ok(())
    }

    /// Pops the top as is; a variable stays a variable.
    fn pop_raw(&mut self) -> Result<Value, OperationError> {
        self.stack.pop().ok_or(OperationError::PopFailed)
    }

    /// Pops the top, replacing a variable with its bound value.
    fn pop(&mut self) -> Result<Value, OperationError> {
        let value = self.pop_raw()?;
        self.resolve(value)
    }

    fn resolve(&self, value: Value) -> Result<Value, OperationError> {
        match value {
            Value::Var(name) => match self.variables.get(&name) {
                Some(Some(bound)) => Ok(bound.clone()),
                _ => Err(OperationError::UnboundVariable { name }),
            },
            value => Ok(value),
        }
    }

    fn assign(&mut self) -> Result<(), OperationError> {
        let name = match self.pop_raw()? {
            Value::Var(name) => name,
            other => return Err(OperationError::NotAVariable { kind: other.kind() }),
        };
        let value = self.pop()?;
        self.variables.insert(name, Some(value));
        Ok(())
    }

    fn binary(&mut self, op: BinaryOp) -> Result<(), OperationError> {
        let rhs = self.pop()?;
        let lhs = self.pop()?;
        let result = value::apply(op, lhs, rhs, self.options.max_text_len)?;
        self.push(result)
    }

    fn count_instruction(&mut self) -> Result<(), RunError> {
        if self.instructions_run >= self.options.max_op_count {
            return Err(RunError::RunTooLong { instruction_counter: self.instructions_run });
        }
        self.instructions_run += 1;
        Ok(())
    }

    fn instruction_failed(&self, instruction: Op, token: &Token, error: OperationError) -> RunError {
        RunError::InstructionFailed {
            instruction,
            line: token.line,
            token: token.text.to_owned(),
            instruction_counter: self.instructions_run,
            error,
        }
    }

    /// Runs a token sequence. `depth` is the block nesting level of `code`.
    fn run_block(&mut self, code: &[Token], depth: usize) -> Result<(), RunError> {
        let mut lc = 0;
        while lc < code.len() {
            let token = &code[lc];
            let malformed = |error| RunError::MalformedBlock {
                line: token.line,
                token: token.text.to_owned(),
                error,
            };

            match token.op() {
                Some(Op::If) => {
                    let block = blocks::extract_if(code, lc + 1).map_err(malformed)?;
                    let inner = self.enter(token, depth)?;
                    if self.run_condition(Op::If, token, block.condition, inner)? {
                        debug!(line = token.line, "BOH: taking the main branch");
                        self.run_block(block.body, inner)?;
                    } else if let Some(alternate) = block.alternate {
                        debug!(line = token.line, "BOH: taking the OH branch");
                        self.run_block(alternate, inner)?;
                    } else {
                        debug!(line = token.line, "BOH: skipped");
                    }
                    lc = block.next;
                }
                Some(Op::Loop) => {
                    let block = blocks::extract_loop(code, lc + 1).map_err(malformed)?;
                    let inner = self.enter(token, depth)?;
                    let mut iterations = 0u64;
                    while self.run_condition(Op::Loop, token, block.condition, inner)? {
                        self.run_block(block.body, inner)?;
                        iterations += 1;
                    }
                    debug!(line = token.line, iterations, "LOOP finished");
                    lc = block.next;
                }
                Some(op @ (Op::Else | Op::EndIf | Op::EndElse | Op::EndLoop)) => {
                    return Err(malformed(BlockError::Stray(op)));
                }
                _ => {
                    self.run_line(token)?;
                    lc += 1;
                }
            }
        }
        Ok(())
    }

    /// Checks the nesting limit before running the bodies of the block opened by `token`.
    fn enter(&self, token: &Token, depth: usize) -> Result<usize, RunError> {
        let inner = depth + 1;
        if inner > self.options.max_nesting_depth {
            return Err(RunError::NestingTooDeep {
                line: token.line,
                limit: self.options.max_nesting_depth,
            });
        }
        Ok(inner)
    }

    /// Evaluates the condition of the `BOH` or `LOOP` block opened by `opener`.
    ///
    /// Every operand runs as its own one-token program, so `OR` and `AND` never short-circuit.
    fn run_condition(
        &mut self,
        block_op: Op,
        opener: &Token,
        condition: &[Token],
        depth: usize,
    ) -> Result<bool, RunError> {
        let (first, rest) = condition.split_first().ok_or_else(|| RunError::MalformedBlock {
            line: opener.line,
            token: opener.text.to_owned(),
            error: BlockError::EmptyCondition,
        })?;
        self.run_block(std::slice::from_ref(first), depth)?;

        for pair in rest.chunks(2) {
            let (operator, op) = match (pair, pair[0].op()) {
                ([operator, _], Some(op)) if op.is_logical() => (operator, op),
                _ => {
                    return Err(RunError::MalformedBlock {
                        line: pair[0].line,
                        token: pair[0].text.to_owned(),
                        error: BlockError::TrailingCondition(pair[0].text.to_owned()),
                    })
                }
            };
            self.run_block(&pair[1..], depth)?;
            self.count_instruction()?;
            if let Some(binary) = op.binary() {
                self.binary(binary).map_err(|e| self.instruction_failed(op, operator, e))?;
            }
        }

        let outcome = self.pop().map_err(|e| self.instruction_failed(block_op, opener, e))?;
        Ok(outcome.is_truthy())
    }

    /// Decodes and executes one payload token.
    fn run_line(&mut self, token: &Token) -> Result<(), RunError> {
        trace!(line = token.line, token = token.text, "running");
        let mut decoder = Decoder::new(token.text);

        while !decoder.is_done() {
            let position = decoder.position();
            let decode_failed = |error| RunError::DecodeFailed {
                line: token.line,
                token: token.text.to_owned(),
                position,
                error,
            };

            let op = decoder.next_op().map_err(decode_failed)?;
            self.count_instruction()?;

            let result = match op {
                Op::Str => {
                    let text = decoder.read_text().map_err(decode_failed)?;
                    self.push(Value::Text(text))
                }
                Op::Int => {
                    let n = decoder.read_int().map_err(decode_failed)?;
                    self.push(Value::Int(n))
                }
                Op::Var => {
                    let name = decoder.read_name().map_err(decode_failed)?;
                    self.variables.entry(name.clone()).or_insert(None);
                    self.push(Value::Var(name))
                }
                Op::Assign => self.assign(),
                Op::Print => {
                    let value = self.pop().map_err(|e| self.instruction_failed(op, token, e))?;
                    write!(self.output, "{value}")?;
                    Ok(())
                }
                op if op.is_control_flow() => {
                    return Err(decode_failed(DecodeError::MisplacedControlFlow(op)));
                }
                op => match op.binary() {
                    Some(binary) => self.binary(binary),
                    None => unreachable!("{op} is neither a literal nor a binary operator"),
                },
            };
            result.map_err(|e| self.instruction_failed(op, token, e))?;
        }
        Ok(())
    }
}

impl<W: Write> From<State<'_, W>> for RunResult {
    fn from(s: State<W>) -> Self {
        RunResult {
            stack: s.stack,
            variables: s.variables.into_iter().collect(),
            instruction_counter: s.instructions_run,
        }
    }
}

/// Run a hoblang token stream, writing everything it prints to `output`.
///
/// # Example
/// ```
/// use hoblang::parser::parse_program;
/// use hoblang::vm::{run, VMOptions};
///
/// let program = parse_program("N3a2m4P");
/// let mut output = Vec::new();
/// let result = run(&program, VMOptions::default(), &mut output);
/// assert!(result.is_ok());
/// assert_eq!(output, b"20");
/// ```
pub fn run<W: Write>(program: &[Token], options: VMOptions, output: &mut W) -> Result<RunResult, RunError> {
    let mut s = State::new(output, options);
    s.run_block(program, 0)?;
    Ok(s.into())
}

/// Parse and run hoblang source text.
pub fn run_source<W: Write>(source: &str, options: VMOptions, output: &mut W) -> Result<RunResult, RunError> {
    run(&parse_program(source), options, output)
}
