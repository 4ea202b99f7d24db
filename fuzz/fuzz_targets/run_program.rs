#![no_main]

use libfuzzer_sys::fuzz_target;
use hoblang_fuzz::{check, FuzzProgram};

fuzz_target!(|data: FuzzProgram| {
    if data.lines.is_empty() { return }

    let _ = check(&data.source());
});
