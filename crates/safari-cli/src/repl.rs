//! Interactive REPL.
//!
//! Lines are accumulated until braces balance, then the whole chunk goes
//! through the pipeline against one persistent interpreter, so bindings
//! survive between inputs and across errors.

use std::io;
use std::path::PathBuf;

use rustyline::{DefaultEditor, error::ReadlineError};
use safari_lang::syntax::printer;
use safari_lang::{Error, Interpreter, InterpreterOptions, Value, parse, tokenize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReplError {
    #[error("readline error: {0}")]
    Readline(#[from] ReadlineError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone)]
pub struct ReplConfig {
    pub prompt: String,
    /// Shown while a chunk has unclosed braces.
    pub continuation_prompt: String,
    /// `None` disables history persistence.
    pub history_file: Option<PathBuf>,
    pub options: InterpreterOptions,
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self {
            prompt: "safari> ".to_string(),
            continuation_prompt: "...... ".to_string(),
            history_file: dirs::home_dir().map(|home| home.join(".safari_history")),
            options: InterpreterOptions::default(),
        }
    }
}

const HELP: &str = "\
Commands:
  :help   show this message
  :quit   leave the REPL (Ctrl+D works too)
  :env    list global bindings
  :ast    toggle printing the AST of each input";

enum Command {
    Continue,
    Quit,
}

pub struct ReplSession {
    editor: DefaultEditor,
    interpreter: Interpreter<io::Stdout>,
    config: ReplConfig,
    show_ast: bool,
}

impl ReplSession {
    pub fn new(config: ReplConfig) -> Result<Self, ReplError> {
        let mut editor = DefaultEditor::new()?;
        if let Some(path) = &config.history_file {
            // missing on first run
            let _ = editor.load_history(path);
        }
        let interpreter = Interpreter::with_options(io::stdout(), config.options.clone());
        Ok(Self { editor, interpreter, config, show_ast: false })
    }

    pub fn run(&mut self) -> Result<(), ReplError> {
        println!("Safari REPL - :help for commands, Ctrl+D to exit");

        while let Some(chunk) = self.read_chunk()? {
            let input = chunk.trim();
            if input.is_empty() {
                continue;
            }
            if let Some(cmd) = input.strip_prefix(':') {
                match self.command(cmd) {
                    Command::Quit => break,
                    Command::Continue => continue,
                }
            }
            if let Err(e) = self.eval_source(&chunk) {
                crate::report("<repl>", &chunk, e);
            }
        }

        self.save_history()
    }

    /// Read lines until braces balance. `None` on end of input.
    fn read_chunk(&mut self) -> Result<Option<String>, ReplError> {
        let mut chunk = String::new();

        loop {
            let prompt = if chunk.is_empty() { &self.config.prompt } else { &self.config.continuation_prompt };
            match self.editor.readline(prompt) {
                Ok(line) => {
                    if !chunk.is_empty() {
                        chunk.push('\n');
                    }
                    chunk.push_str(&line);

                    if is_complete(&chunk) {
                        if !chunk.trim().is_empty() {
                            self.editor.add_history_entry(chunk.as_str())?;
                        }
                        return Ok(Some(chunk));
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    // drop the partial chunk and start over
                    println!("^C");
                    return Ok(Some(String::new()));
                }
                Err(ReadlineError::Eof) => return Ok(None),
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn eval_source(&mut self, source: &str) -> Result<(), Error> {
        let program = parse(tokenize(source)?)?;
        if self.show_ast {
            println!("{}", printer::format_program(&program));
        }
        self.interpreter.evaluate(&program)?;
        Ok(())
    }

    fn command(&mut self, cmd: &str) -> Command {
        match cmd.trim() {
            "help" | "h" => println!("{HELP}"),
            "quit" | "q" => return Command::Quit,
            "env" => {
                for (name, value) in self.interpreter.globals().bindings() {
                    if !matches!(value, Value::Native(_)) {
                        println!("{name} = {value}");
                    }
                }
            }
            "ast" => {
                self.show_ast = !self.show_ast;
                println!("AST echo {}", if self.show_ast { "on" } else { "off" });
            }
            other => println!("unknown command `:{other}`; try :help"),
        }
        Command::Continue
    }

    fn save_history(&mut self) -> Result<(), ReplError> {
        if let Some(path) = &self.config.history_file {
            self.editor.save_history(path)?;
        }
        Ok(())
    }
}

/// Whether `input` has no unclosed `{`, string or block comment.
/// Braces inside strings and comments do not count.
pub fn is_complete(input: &str) -> bool {
    let mut depth: i64 = 0;
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                let mut closed = false;
                while let Some(c) = chars.next() {
                    match c {
                        '\\' => { chars.next(); }
                        '"' => { closed = true; break; }
                        _ => {}
                    }
                }
                if !closed {
                    return false;
                }
            }
            '/' if chars.peek() == Some(&'/') => {
                for c in chars.by_ref() {
                    if c == '\n' { break; }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut closed = false;
                while let Some(c) = chars.next() {
                    if c == '*' && chars.peek() == Some(&'/') {
                        chars.next();
                        closed = true;
                        break;
                    }
                }
                if !closed {
                    return false;
                }
            }
            '{' => depth += 1,
            '}' => depth -= 1,
            _ => {}
        }
    }

    // a surplus `}` is complete: let the parser report it
    depth <= 0
}
