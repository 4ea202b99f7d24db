//! # hoblang
//! A stack-based esoteric language whose programs hide their literals between filler
//! characters.
//! ## Introduction
//! A hoblang program is a list of whitespace-separated tokens. The tokens of every line
//! are executed right to left. A token is either a block mnemonic (`BOH`, `OH`, `HOB`,
//! `HO`, `LOOP`, `POOL`, or the `|` that ends a condition) or a *payload*: a run of
//! instructions packed together without spaces, such as `N3a2m4P` (push `3 + 2`, times
//! `4`, then print it).
//!
//! Text literals (`B`) and variable names (`V`) are written with a filler character after
//! every real one, and text is written backwards, so `Bi.h.P` prints `hi`. Integer literals
//! (`N`) may chain the one-letter operators `a`, `s`, `m` and `d`, folded left to right
//! as soon as the literal is read.
//!
//! There is no compile step: [`vm::run`] walks the token stream directly, finding the
//! extent of each `BOH ... HOB`, `BOH ... OH ... HO` and `LOOP ... POOL` block when it
//! reaches it.
//!
//! ```
//! use hoblang::vm::{run_source, VMOptions};
//!
//! let program = "
//! N0Vc.=
//! | Vc.N3TL LOOP
//! Vc.P
//! Vc.N1ADDVc.=
//! POOL
//! ";
//! let mut output = Vec::new();
//! run_source(program, VMOptions::default(), &mut output).unwrap();
//! assert_eq!(output, b"012");
//! ```
pub mod config;
pub mod ops;
pub mod parser;
pub mod value;
pub mod vm;
