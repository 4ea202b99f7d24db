use hoblang::{ops::Op, vm::{BlockError, DecodeError, OperationError, RunError}};
use hoblang_fuzz::{block_words_are_known, check};

#[test]
fn block_words() {
    assert!(block_words_are_known());
}

#[test]
fn regression_separator_only() {
    assert!(matches!(
        check("| BOH\n"),
        Err(RunError::MalformedBlock { error: BlockError::EmptyCondition, .. })
    ));
}

#[test]
fn regression_opener_at_end_of_stream() {
    assert!(matches!(check("BOH\n"), Err(RunError::MalformedBlock { error: BlockError::MissingSeparator, .. })));
    assert!(matches!(check("LOOP\n"), Err(RunError::MalformedBlock { error: BlockError::MissingSeparator, .. })));
}

#[test]
fn regression_dangling_logical_operator() {
    assert!(matches!(
        check("| OR N1P LOOP\nPOOL\n"),
        Err(RunError::MalformedBlock { error: BlockError::DanglingOperator(Op::Or), .. })
    ));
}

#[test]
fn regression_stride_past_end() {
    assert!(matches!(
        check("Bx\n"),
        Err(RunError::DecodeFailed { error: DecodeError::UnexpectedEnd { .. }, .. })
    ));
    assert!(matches!(
        check("Vx.x\n"),
        Err(RunError::DecodeFailed { error: DecodeError::UnexpectedEnd { .. }, .. })
    ));
    assert!(matches!(
        check("| N1 LOOP\nPOOL\n"),
        Err(RunError::DecodeFailed { error: DecodeError::UnexpectedEnd { .. }, .. })
    ));
}

#[test]
fn regression_infinite_loop_hits_op_limit() {
    assert!(matches!(check("| N1N1QE LOOP\nPOOL\n"), Err(RunError::RunTooLong { .. })));
}

#[test]
fn regression_min_divided_by_minus_one() {
    assert!(matches!(
        check("N0N9223372036854775807SUBN1SUBN0N1SUBDIV\n"),
        Err(RunError::InstructionFailed { error: OperationError::IntegerOverflow, .. })
    ));
}

#[test]
fn regression_text_repeat() {
    assert!(check("Ba.N1000MULP\n").is_ok());
}

#[test]
fn regression_huge_text_repeat() {
    assert!(matches!(
        check("Bb.a.N9223372036854775807MULP\n"),
        Err(RunError::InstructionFailed { error: OperationError::TextTooLong { .. }, .. })
    ));
    assert!(matches!(
        check("Ba.N1000000MULP\n"),
        Err(RunError::InstructionFailed { error: OperationError::TextTooLong { .. }, .. })
    ));
}
