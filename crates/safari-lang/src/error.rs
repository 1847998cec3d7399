//! Error tiers for the three pipeline stages.
//!
//! Every error carries its source position (line, column and byte offset) so
//! a host can point at the offending text. Codes are prefixed by phase:
//! L = scanner, P = parser, R = evaluator.

use std::fmt;

use miette::{Diagnostic, LabeledSpan};
use thiserror::Error;

use crate::syntax::ast::Span;
use crate::syntax::token::Token;

fn single_label(label: &str, offset: usize, len: usize) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
    let span = LabeledSpan::new(Some(label.to_string()), offset, len.max(1));
    Some(Box::new(std::iter::once(span)))
}

// ─── Scanner ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexErrorKind {
    UnexpectedCharacter,
    UnterminatedString,
    UnterminatedComment,
    InvalidNumber,
    InvalidEscape,
}

impl LexErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnexpectedCharacter => "L001",
            Self::UnterminatedString  => "L002",
            Self::UnterminatedComment => "L003",
            Self::InvalidNumber       => "L004",
            Self::InvalidEscape       => "L005",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::UnexpectedCharacter => "not valid here",
            Self::UnterminatedString  => "string starts here",
            Self::UnterminatedComment => "comment starts here",
            Self::InvalidNumber       => "malformed number",
            Self::InvalidEscape       => "unknown escape",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("[{}] {line}:{column}: {message}", .kind.code())]
pub struct LexError {
    pub kind: LexErrorKind,
    pub line: usize,
    pub column: usize,
    pub offset: usize,
    pub len: usize,
    pub message: String,
}

impl LexError {
    pub fn new(kind: LexErrorKind, line: usize, column: usize, offset: usize, len: usize, message: impl Into<String>) -> Self {
        Self { kind, line, column, offset, len, message: message.into() }
    }
}

impl Diagnostic for LexError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(self.kind.code()))
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        single_label(self.kind.label(), self.offset, self.len)
    }
}

// ─── Parser ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    UnexpectedToken,
    ExpectedToken,
    InvalidAssignmentTarget,
    IllegalExitOutsideControlBlock,
    UnexpectedStandaloneIdentifier,
    NestingTooDeep,
}

impl ParseErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnexpectedToken                => "P001",
            Self::ExpectedToken                  => "P002",
            Self::InvalidAssignmentTarget        => "P003",
            Self::IllegalExitOutsideControlBlock => "P004",
            Self::UnexpectedStandaloneIdentifier => "P005",
            Self::NestingTooDeep                 => "P006",
        }
    }

    fn help(&self) -> Option<&'static str> {
        match self {
            Self::InvalidAssignmentTarget => Some("only variables and `.` properties can be assigned"),
            Self::IllegalExitOutsideControlBlock => Some("`run` must appear inside an `if` or `repeat` block"),
            Self::UnexpectedStandaloneIdentifier => Some("a bare name does nothing; did you mean to call or print it?"),
            Self::NestingTooDeep => Some("pull inner parts out into variables or functions"),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("[{}] {}:{}: {message}", .kind.code(), .token.line, .token.column)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    /// The token at which parsing failed.
    pub token: Token,
    pub message: String,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, token: Token, message: impl Into<String>) -> Self {
        Self { kind, token, message: message.into() }
    }

    pub fn line(&self) -> usize { self.token.line }
}

impl Diagnostic for ParseError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(self.kind.code()))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.kind.help().map(|h| Box::new(h) as Box<dyn fmt::Display + 'a>)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        single_label("here", self.token.offset, self.token.len())
    }
}

// ─── Evaluator ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeErrorKind {
    UndefinedVariable,
    UnknownProperty,
    ReadOnlyProperty,
    UnknownMethod,
    TypeMismatch,
    DivisionByZero,
    ArityMismatch,
    InvalidAssignmentTarget,
    NotCallable,
    NotAnObject,
    NotFound,
    InvalidArgument,
    Overflow,
    ExitOutsideLoop,
    StackOverflow,
    StepLimitExceeded,
    Io,
}

impl RuntimeErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            Self::UndefinedVariable       => "R001",
            Self::UnknownProperty         => "R002",
            Self::ReadOnlyProperty        => "R003",
            Self::UnknownMethod           => "R004",
            Self::TypeMismatch            => "R005",
            Self::DivisionByZero          => "R006",
            Self::ArityMismatch           => "R007",
            Self::InvalidAssignmentTarget => "R008",
            Self::NotCallable             => "R009",
            Self::NotAnObject             => "R010",
            Self::NotFound                => "R011",
            Self::InvalidArgument         => "R012",
            Self::Overflow                => "R013",
            Self::ExitOutsideLoop         => "R014",
            Self::StackOverflow           => "R015",
            Self::StepLimitExceeded       => "R016",
            Self::Io                      => "R017",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("[{}] line {}: {message}", .kind.code(), .span.line)]
pub struct RuntimeError {
    pub kind: RuntimeErrorKind,
    pub span: Span,
    pub message: String,
}

impl RuntimeError {
    pub fn new(kind: RuntimeErrorKind, span: &Span, message: impl Into<String>) -> Self {
        Self { kind, span: span.clone(), message: message.into() }
    }

    pub fn line(&self) -> usize { self.span.line }
}

impl Diagnostic for RuntimeError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(self.kind.code()))
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        single_label("while evaluating this", self.span.offset, self.span.len)
    }
}

// ─── Umbrella ────────────────────────────────────────────────────────────────

/// Any failure of the full source → output pipeline.
#[derive(Debug, Clone, PartialEq, Error, Diagnostic)]
pub enum Error {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Runtime(#[from] RuntimeError),
}

impl Error {
    pub fn line(&self) -> usize {
        match self {
            Self::Lex(e)     => e.line,
            Self::Parse(e)   => e.line(),
            Self::Runtime(e) => e.line(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::token::TokenKind;

    #[test]
    fn codes_are_phase_prefixed() {
        assert_eq!(LexErrorKind::UnterminatedComment.code(), "L003");
        assert_eq!(ParseErrorKind::IllegalExitOutsideControlBlock.code(), "P004");
        assert_eq!(RuntimeErrorKind::DivisionByZero.code(), "R006");
    }

    #[test]
    fn display_includes_position() {
        let e = LexError::new(LexErrorKind::UnexpectedCharacter, 3, 7, 20, 1, "unexpected character `$`");
        assert_eq!(e.to_string(), "[L001] 3:7: unexpected character `$`");

        let tok = Token::new(TokenKind::Run, "run", 2, 1, 10);
        let e = ParseError::new(ParseErrorKind::IllegalExitOutsideControlBlock, tok, "`run` outside of a control block");
        assert_eq!(e.to_string(), "[P004] 2:1: `run` outside of a control block");
    }

    #[test]
    fn umbrella_reports_line() {
        let span = Span::new(4, 2, 30, 3);
        let e: Error = RuntimeError::new(RuntimeErrorKind::NotFound, &span, "missing").into();
        assert_eq!(e.line(), 4);
    }
}
