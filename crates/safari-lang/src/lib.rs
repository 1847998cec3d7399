pub mod syntax;
pub mod runtime;
pub mod objects;
pub mod error;

pub use error::{Error, LexError, LexErrorKind, ParseError, ParseErrorKind, RuntimeError, RuntimeErrorKind};
pub use syntax::ast::Program;
pub use syntax::token::{Token, TokenKind};
pub use runtime::interpreter::{Interpreter, InterpreterOptions};
pub use runtime::value::Value;

use std::io::{self, Write};

// ─── Public API ───────────────────────────────────────────────────────────────

/// Scan source text into tokens, ending with a single `Eof`.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    syntax::lexer::Lexer::new(source).tokenize()
}

/// Parse a token stream into a program. Stops at the first error.
pub fn parse(tokens: Vec<Token>) -> Result<Program, ParseError> {
    syntax::parser::Parser::new(tokens).parse()
}

/// Execute a program in a fresh interpreter writing to stdout.
pub fn evaluate(program: &Program) -> Result<(), RuntimeError> {
    Interpreter::stdout().evaluate(program)
}

/// Tokenize, parse and evaluate `source`, writing output to stdout.
pub fn run(source: &str) -> Result<(), Error> {
    run_with_output(source, &mut io::stdout())
}

/// Like [`run`], but program output goes to `out`.
pub fn run_with_output<W: Write>(source: &str, out: &mut W) -> Result<(), Error> {
    let program = parse(tokenize(source)?)?;
    Interpreter::new(out).evaluate(&program)?;
    Ok(())
}

// ─── Stack growth ─────────────────────────────────────────────────────────────

const STACK_RED_ZONE: usize = 128 * 1024;
const STACK_GROW_SIZE: usize = 4 * 1024 * 1024;

/// Run `f`, first moving to a fresh stack segment if less than
/// `STACK_RED_ZONE` bytes remain. Wraps the recursive parser and evaluator
/// entry points so nesting depth is bounded by their own limits, not by the
/// size of the host thread's stack.
pub(crate) fn with_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, f)
}
