use arbitrary::Arbitrary;
use hoblang::{ops::Op, vm::{run_source, RunError, RunResult, VMOptions}};

/// Payload fragments a generated token is glued together from.
pub const FRAGMENTS: &[&str] = &[
    "B", "N", "P", "V", "=", "ADD", "SUB", "MUL", "DIV", "QE", "EN", "TG", "EG", "TL", "EL",
    "OR", "AND", "0", "1", "7", "42", "a", "s", "m", "d", "x.", "y.", ".",
];

/// Whole-token words: block mnemonics and the condition separator.
pub const BLOCK_WORDS: &[&str] = &["BOH", "OH", "HOB", "HO", "LOOP", "POOL", "|", "OR", "AND"];

pub enum Word {
    Payload(Vec<&'static str>),
    Block(&'static str),
}

impl<'a> Arbitrary<'a> for Word {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        if u.ratio(1, 4)? {
            return Ok(Word::Block(BLOCK_WORDS[u.choose_index(BLOCK_WORDS.len())?]));
        }
        let len = u.int_in_range(1..=6)?;
        let mut parts = Vec::with_capacity(len);
        for _ in 0..len {
            parts.push(FRAGMENTS[u.choose_index(FRAGMENTS.len())?]);
        }
        Ok(Word::Payload(parts))
    }
}

#[derive(Arbitrary)]
pub struct FuzzProgram {
    pub lines: Vec<Vec<Word>>,
}

impl FuzzProgram {
    pub fn source(&self) -> String {
        let mut source = String::new();
        for line in &self.lines {
            let words: Vec<String> = line
                .iter()
                .map(|word| match word {
                    Word::Payload(parts) => parts.concat(),
                    Word::Block(text) => text.to_string(),
                })
                .collect();
            source.push_str(&words.join(" "));
            source.push('\n');
        }
        source
    }
}

/// Runs `source` with limits small enough for fuzzing. Any error is fine, a panic is not.
pub fn check(source: &str) -> Result<RunResult, RunError> {
    let options = VMOptions::new(10_000, 64, 100_000, 1 << 16);
    let mut output = Vec::new();
    let result = run_source(source, options, &mut output);
    if let Err(RunError::DecodeFailed { token, position, .. }) = &result {
        assert!(*position < token.chars().count(), "decode error past the end of {token}");
    }
    if let Ok(r) = &result {
        assert!(r.instruction_counter <= 100_000);
        assert!(r.variables.keys().all(|name| name.starts_with('$')));
    }
    result
}

/// Every block mnemonic round-trips through the opcode table.
pub fn block_words_are_known() -> bool {
    BLOCK_WORDS.iter().filter(|w| **w != "|").all(|w| Op::from_mnemonic(w).is_some())
}
