use std::rc::Rc;

pub use crate::syntax::token::Literal;
use crate::syntax::token::Token;

/// Source location attached to every node for error reporting.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Span {
    pub line: usize,
    pub column: usize,
    /// Byte offset into the source text.
    pub offset: usize,
    /// Byte length of the originating token.
    pub len: usize,
}

impl Span {
    pub fn new(line: usize, column: usize, offset: usize, len: usize) -> Self {
        Self { line, column, offset, len }
    }
}

impl From<&Token> for Span {
    fn from(tok: &Token) -> Self {
        Span::new(tok.line, tok.column, tok.offset, tok.len())
    }
}

// ─── Top level ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

// ─── Statements ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `expr;`
    Expr(Expr),
    /// `var x = expr;` or `var x;`
    Var(VarDecl),
    /// `print expr;`
    Print(Expr, Span),
    /// `if cond { } else { }`
    If(IfStmt),
    /// `{ ... }`
    Block(Vec<Stmt>, Span),
    /// `repeat count { }`
    Repeat(RepeatStmt),
    /// `define name(a, b) { }`
    Define(FnDef),
    /// `throwBall(zone, pokemon);`
    ThrowBall(ThrowBall),
    /// `run;`
    Run(Span),
}

impl Stmt {
    pub fn span(&self) -> &Span {
        match self {
            Stmt::Expr(e)         => e.span(),
            Stmt::Var(v)          => &v.span,
            Stmt::Print(_, s)     => s,
            Stmt::If(i)           => &i.span,
            Stmt::Block(_, s)     => s,
            Stmt::Repeat(r)       => &r.span,
            Stmt::Define(f)       => &f.span,
            Stmt::ThrowBall(t)    => &t.span,
            Stmt::Run(s)          => s,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub name: String,
    pub initializer: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub condition: Expr,
    pub then_block: Vec<Stmt>,
    /// Either a braced block or a single chained `if`.
    pub else_block: Option<Vec<Stmt>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RepeatStmt {
    pub count: Expr,
    pub body: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FnDef {
    pub name: String,
    pub params: Vec<String>,
    /// Shared with every function value created from this definition.
    pub body: Rc<Vec<Stmt>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThrowBall {
    pub zone: Expr,
    pub target: Expr,
    pub span: Span,
}

// ─── Expressions ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Literal, Span),

    /// `[a, b, c]`
    List(Vec<Expr>, Span),

    Variable(String, Span),

    /// `-x`, `not x`
    Unary {
        op: UnOp,
        operand: Box<Expr>,
        span: Span,
    },

    /// `a + b`, `a == b`, etc.
    Binary {
        left: Box<Expr>,
        op: BinOp,
        right: Box<Expr>,
        span: Span,
    },

    /// `a and b`, `a or b` (short-circuiting)
    Logical {
        left: Box<Expr>,
        op: LogicalOp,
        right: Box<Expr>,
        span: Span,
    },

    /// `x = v` or `obj.prop = v`
    Assign {
        target: Box<Expr>,
        value: Box<Expr>,
        span: Span,
    },

    /// `callee(args)`
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
        span: Span,
    },

    /// `expr.name`
    Property {
        object: Box<Expr>,
        name: String,
        span: Span,
    },

    /// `expr->name(args, key=val)` or `expr->name`
    MethodCall {
        object: Box<Expr>,
        method: String,
        args: Vec<Expr>,
        named_args: Vec<(String, Expr)>,
        span: Span,
    },
}

impl Expr {
    pub fn span(&self) -> &Span {
        match self {
            Expr::Literal(_, s)             => s,
            Expr::List(_, s)                => s,
            Expr::Variable(_, s)            => s,
            Expr::Unary { span, .. }        => span,
            Expr::Binary { span, .. }       => span,
            Expr::Logical { span, .. }      => span,
            Expr::Assign { span, .. }       => span,
            Expr::Call { span, .. }         => span,
            Expr::Property { span, .. }     => span,
            Expr::MethodCall { span, .. }   => span,
        }
    }
}

// ─── Operators ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOp {
    Add, Sub, Mul, Div, Mod,
    Eq, NotEq,
    Lt, LtEq, Gt, GtEq,
}

impl BinOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinOp::Add   => "+",  BinOp::Sub   => "-",
            BinOp::Mul   => "*",  BinOp::Div   => "/",  BinOp::Mod => "%",
            BinOp::Eq    => "==", BinOp::NotEq => "!=",
            BinOp::Lt    => "<",  BinOp::LtEq  => "<=",
            BinOp::Gt    => ">",  BinOp::GtEq  => ">=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg,
    Not,
}
