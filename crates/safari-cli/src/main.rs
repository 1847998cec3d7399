mod repl;

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use miette::{NamedSource, Report};
use safari_lang::syntax::printer;
use safari_lang::{Error, Interpreter, InterpreterOptions, parse, tokenize};

use crate::repl::{ReplConfig, ReplSession};

/// Safari - run Safari Zone scripts
#[derive(Parser, Debug)]
#[command(name = "safari", version)]
#[command(about = "Run Safari Zone scripts, or start a REPL", long_about = None)]
struct Args {
    /// Script to run (`-` reads stdin). Starts the REPL when omitted.
    file: Option<PathBuf>,

    /// Print the token stream instead of running
    #[arg(long)]
    dump_tokens: bool,

    /// Print the parsed AST instead of running
    #[arg(long)]
    dump_ast: bool,

    /// Abort after this many executed statements
    #[arg(long, value_name = "N")]
    max_steps: Option<u64>,

    /// Maximum nesting of user function calls
    #[arg(long, value_name = "N", default_value_t = 200)]
    max_depth: usize,

    /// Do not load or save REPL history
    #[arg(long)]
    no_history: bool,
}

impl Args {
    fn interpreter_options(&self) -> InterpreterOptions {
        InterpreterOptions { max_call_depth: self.max_depth, max_steps: self.max_steps }
    }
}

fn init_logging() {
    use tracing_subscriber::{EnvFilter, fmt};

    // SAFARI_LOG wins over RUST_LOG; default to warnings only
    let filter = EnvFilter::try_from_env("SAFARI_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Render a pipeline error against its source text on stderr.
pub(crate) fn report(name: &str, source: &str, err: Error) {
    let report = Report::new(err).with_source_code(NamedSource::new(name, source.to_string()));
    eprintln!("{report:?}");
}

fn read_source(path: &Path) -> io::Result<(String, String)> {
    if path.as_os_str() == "-" {
        let mut source = String::new();
        io::stdin().read_to_string(&mut source)?;
        Ok(("<stdin>".to_string(), source))
    } else {
        Ok((path.display().to_string(), fs::read_to_string(path)?))
    }
}

fn execute(source: &str, args: &Args) -> Result<(), Error> {
    let tokens = tokenize(source)?;
    if args.dump_tokens {
        for t in &tokens {
            println!("{:>4}:{:<4} {:<24} {:?}", t.line, t.column, t.kind.describe(), t.lexeme);
        }
    }

    let program = parse(tokens)?;
    if args.dump_ast {
        println!("{}", printer::format_program(&program));
    }
    if args.dump_tokens || args.dump_ast {
        return Ok(());
    }

    let mut interpreter = Interpreter::with_options(io::stdout(), args.interpreter_options());
    interpreter.evaluate(&program)?;
    Ok(())
}

fn run_file(path: &Path, args: &Args) -> ExitCode {
    let (name, source) = match read_source(path) {
        Ok(read) => read,
        Err(e) => {
            eprintln!("safari: cannot read {}: {e}", path.display());
            return ExitCode::FAILURE;
        }
    };
    tracing::debug!(file = %name, bytes = source.len(), "running script");

    match execute(&source, args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(&name, &source, e);
            ExitCode::FAILURE
        }
    }
}

fn run_repl(args: &Args) -> ExitCode {
    let mut config = ReplConfig { options: args.interpreter_options(), ..ReplConfig::default() };
    if args.no_history {
        config.history_file = None;
    }

    let result = ReplSession::new(config).and_then(|mut session| session.run());
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("safari: {e}");
            ExitCode::FAILURE
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging();

    match &args.file {
        Some(path) => run_file(path, &args),
        None => run_repl(&args),
    }
}
