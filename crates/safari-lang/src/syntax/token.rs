use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    Int(i64),
    Decimal(f64),
    Str(String),
    Bool(bool),
    Null,
    Ident(String),

    // Keywords
    Var,
    Print,
    If,
    Else,
    Repeat,
    Define,
    ThrowBall,
    Run,
    And,
    Or,
    Not,

    // Operators
    Plus,       // +
    Minus,      // -
    Star,       // *
    Slash,      // /
    Percent,    // %
    Eq,         // =
    EqEq,       // ==
    BangEq,     // !=
    Lt,         // <
    LtEq,       // <=
    Gt,         // >
    GtEq,       // >=
    Arrow,      // ->

    // Punctuation
    Comma,      // ,
    Semicolon,  // ;
    Dot,        // .
    LParen,     // (
    RParen,     // )
    LBrace,     // {
    RBrace,     // }
    LBracket,   // [
    RBracket,   // ]

    Eof,
}

impl TokenKind {
    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            Self::Var | Self::Print | Self::If | Self::Else | Self::Repeat | Self::Define
            | Self::ThrowBall | Self::Run | Self::And | Self::Or | Self::Not
        )
    }

    /// Human-readable form used in parser diagnostics.
    pub fn describe(&self) -> String {
        match self {
            Self::Int(n)     => format!("integer `{n}`"),
            Self::Decimal(d) => format!("decimal `{d}`"),
            Self::Str(s)     => format!("string \"{s}\""),
            Self::Bool(b)    => format!("`{b}`"),
            Self::Null       => "`null`".into(),
            Self::Ident(s)   => format!("identifier `{s}`"),
            Self::Eof        => "end of input".into(),
            kw if kw.is_keyword() => format!("keyword `{}`", kw.symbol()),
            other            => format!("`{}`", other.symbol()),
        }
    }

    fn symbol(&self) -> &'static str {
        match self {
            Self::Var       => "var",
            Self::Print     => "print",
            Self::If        => "if",
            Self::Else      => "else",
            Self::Repeat    => "repeat",
            Self::Define    => "define",
            Self::ThrowBall => "throwBall",
            Self::Run       => "run",
            Self::And       => "and",
            Self::Or        => "or",
            Self::Not       => "not",
            Self::Plus      => "+",
            Self::Minus     => "-",
            Self::Star      => "*",
            Self::Slash     => "/",
            Self::Percent   => "%",
            Self::Eq        => "=",
            Self::EqEq      => "==",
            Self::BangEq    => "!=",
            Self::Lt        => "<",
            Self::LtEq      => "<=",
            Self::Gt        => ">",
            Self::GtEq      => ">=",
            Self::Arrow     => "->",
            Self::Comma     => ",",
            Self::Semicolon => ";",
            Self::Dot       => ".",
            Self::LParen    => "(",
            Self::RParen    => ")",
            Self::LBrace    => "{",
            Self::RBrace    => "}",
            Self::LBracket  => "[",
            Self::RBracket  => "]",
            _               => "",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

/// Maps an identifier string to its keyword token, or returns `Ident`.
pub fn keyword_or_ident(s: String) -> TokenKind {
    match s.as_str() {
        "var"       => TokenKind::Var,
        "print"     => TokenKind::Print,
        "if"        => TokenKind::If,
        "else"      => TokenKind::Else,
        "repeat"    => TokenKind::Repeat,
        "define"    => TokenKind::Define,
        "throwBall" => TokenKind::ThrowBall,
        "run"       => TokenKind::Run,
        "and"       => TokenKind::And,
        "or"        => TokenKind::Or,
        "not"       => TokenKind::Not,
        "true"      => TokenKind::Bool(true),
        "false"     => TokenKind::Bool(false),
        "null"      => TokenKind::Null,
        _           => TokenKind::Ident(s),
    }
}

// ─────────────────────────────────────────────────────────────────────────────

/// Literal payload shared by tokens and `Expr::Literal`.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Decimal(f64),
    Str(String),
    Bool(bool),
    Null,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Exact source text, escapes and quotes included.
    pub lexeme: String,
    pub line: usize,
    pub column: usize,
    /// Byte offset of the first character.
    pub offset: usize,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, line: usize, column: usize, offset: usize) -> Self {
        Self { kind, lexeme: lexeme.into(), line, column, offset }
    }

    pub fn literal(&self) -> Option<Literal> {
        match &self.kind {
            TokenKind::Int(n)     => Some(Literal::Int(*n)),
            TokenKind::Decimal(d) => Some(Literal::Decimal(*d)),
            TokenKind::Str(s)     => Some(Literal::Str(s.clone())),
            TokenKind::Bool(b)    => Some(Literal::Bool(*b)),
            TokenKind::Null       => Some(Literal::Null),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.lexeme.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lexeme.is_empty()
    }
}
