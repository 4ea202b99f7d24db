use clap::Parser;
use hoblang::parser::{self, Token};
use hoblang::vm::VMOptions;
use std::io::Write;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Run a hoblang program.
#[derive(Parser, Debug)]
#[command()]
struct Args {
    /// File containing a hoblang program.
    #[arg()]
    file: String,
    /// Maximum stack size.
    #[arg(long, short = 'm')]
    max_stack_size: Option<usize>,
    /// Maximum nesting depth of BOH and LOOP blocks.
    #[arg(long, short = 'd')]
    max_depth: Option<usize>,
    /// A limit for the number of executed operations.
    /// If the limit is reached, the program will be stopped with an error.
    #[arg(long, short = 'l')]
    op_limit: Option<u64>,
    /// Maximum length in bytes of a text built by ADD or MUL.
    #[arg(long)]
    max_text_len: Option<usize>,
    /// Print statistics after running the program.
    #[arg(long, short = 's')]
    stats: bool,
    /// Print the token stream, one token per line, instead of running the program.
    #[arg(long, short = 't')]
    tokens: bool,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_tokens(tokens: &[Token]) -> Result<(), anyhow::Error> {
    let mut out = std::io::stdout().lock();
    for token in tokens {
        writeln!(out, "{:>5}  {}", token.line, token)?;
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let args = Args::parse();

    let source = std::fs::read_to_string(&args.file)?;
    let tokens = parser::parse_program(&source);
    info!(file = %args.file, tokens = tokens.len(), "program loaded");

    if args.tokens {
        return print_tokens(&tokens);
    }

    let defaults = VMOptions::default();
    let options = VMOptions::new(
        args.max_stack_size.unwrap_or(defaults.max_stack_size),
        args.max_depth.unwrap_or(defaults.max_nesting_depth),
        args.op_limit.unwrap_or(defaults.max_op_count),
        args.max_text_len.unwrap_or(defaults.max_text_len),
    );

    let mut out = std::io::BufWriter::new(std::io::stdout().lock());
    let start_time = std::time::Instant::now();
    let result = hoblang::vm::run(&tokens, options, &mut out);
    let elapsed = start_time.elapsed();
    out.flush()?;
    let result = result?;

    if args.stats {
        print_stats(result.instruction_counter, elapsed);
    }

    Ok(())
}

fn print_stats(instruction_counter: u64, elapsed: Duration) {
    let instructions_per_second = instruction_counter as f64 / elapsed.as_secs_f64();
    eprintln!("Execution time: {:?}", elapsed);
    eprintln!(
        "Instructions executed: {} ({}/s)",
        instruction_counter,
        match instructions_per_second {
            n if n >= 1_000_000.0 => format!("{:.1}M", n / 1_000_000.0),
            n if n >= 1_000.0 => format!("{:.1}k", n / 1_000.0),
            n => format!("{:.1}", n),
        }
    );
}
