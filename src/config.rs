use std::{str::FromStr, sync::LazyLock};

use tracing::warn;

/// Interpreter limits, read once from `HOBLANG_*` environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct InterpreterConfig {
    pub max_stack_size: usize,
    pub max_nesting_depth: usize,
    /// `u64::MAX` means no limit.
    pub max_op_count: u64,
    pub max_text_len: usize,
}

/// Block nesting the evaluator can recurse through on a 2 MiB thread stack.
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 128;

fn parse_env_opt<T>(key: &str) -> Option<T>
where
    T: FromStr, <T as FromStr>::Err: std::fmt::Display
{
    let val = std::env::var(key).ok()?;
    let val = val.trim();
    if val.is_empty() {
        return None;
    }
    match val.parse::<T>() {
        Ok(v) => Some(v),
        Err(err) => {
            warn!("Ignoring env var {key} with value {val}: {err}");
            None
        }
    }
}

fn parse_env<T>(key: &str, default: T) -> T
where
    T: FromStr, <T as FromStr>::Err: std::fmt::Display
{
    parse_env_opt(key).unwrap_or(default)
}

fn create_config() -> InterpreterConfig {
    InterpreterConfig {
        max_stack_size: parse_env("HOBLANG_MAX_STACK_SIZE", 2097152),
        max_nesting_depth: parse_env("HOBLANG_MAX_NESTING_DEPTH", DEFAULT_MAX_NESTING_DEPTH),
        max_op_count: parse_env("HOBLANG_MAX_OP_COUNT", u64::MAX),
        max_text_len: parse_env("HOBLANG_MAX_TEXT_LENGTH", 16 * 1024 * 1024),
    }
}

static CELL: LazyLock<InterpreterConfig> = LazyLock::new(create_config);

pub fn get_config() -> &'static InterpreterConfig {
    &CELL
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env() {
        std::env::set_var("HOBLANG_TEST_PARSE_ENV_OK", " 42 ");
        std::env::set_var("HOBLANG_TEST_PARSE_ENV_BAD", "lots");
        std::env::set_var("HOBLANG_TEST_PARSE_ENV_EMPTY", "");
        assert_eq!(parse_env("HOBLANG_TEST_PARSE_ENV_OK", 1usize), 42);
        assert_eq!(parse_env("HOBLANG_TEST_PARSE_ENV_BAD", 1usize), 1);
        assert_eq!(parse_env("HOBLANG_TEST_PARSE_ENV_EMPTY", 7u64), 7);
        assert_eq!(parse_env("HOBLANG_TEST_PARSE_ENV_MISSING", 9u64), 9);
    }
}
