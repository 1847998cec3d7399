use std::rc::Rc;

use crate::syntax::ast::*;
use crate::error::{ParseError, ParseErrorKind};
use crate::syntax::token::{Token, TokenKind};

/// Deepest expression or block nesting accepted before giving up.
pub const MAX_NESTING: usize = 256;

/// Recursive-descent parser. Fails fast on the first error.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    /// Number of `if` / `repeat` bodies currently open. `run` needs it > 0.
    control_depth: usize,
    /// Open expressions, unary operators and blocks, capped at `MAX_NESTING`.
    nesting: usize,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        // Guarantee the stream is terminated so `peek` never runs off the end.
        if !matches!(tokens.last().map(|t| &t.kind), Some(TokenKind::Eof)) {
            let (line, column, offset) = tokens.last()
                .map(|t| (t.line, t.column + t.len(), t.offset + t.len()))
                .unwrap_or((1, 1, 0));
            tokens.push(Token::new(TokenKind::Eof, "", line, column, offset));
        }
        Self { tokens, pos: 0, control_depth: 0, nesting: 0 }
    }

    pub fn parse(mut self) -> Result<Program, ParseError> {
        let mut statements = Vec::new();
        while !self.is_at_end() {
            statements.push(self.parse_stmt()?);
        }
        tracing::debug!(count = statements.len(), "parsed program");
        Ok(Program { statements })
    }

    // ─── Statements ──────────────────────────────────────────────────────────

    fn parse_stmt(&mut self) -> Result<Stmt, ParseError> {
        match self.peek_kind() {
            TokenKind::Var       => self.parse_var(),
            TokenKind::Print     => self.parse_print(),
            TokenKind::If        => self.parse_if(),
            TokenKind::Repeat    => self.parse_repeat(),
            TokenKind::Define    => self.parse_define(),
            TokenKind::ThrowBall => self.parse_throw_ball(),
            TokenKind::Run       => self.parse_run(),
            TokenKind::LBrace    => {
                let span = self.span();
                Ok(Stmt::Block(self.parse_block()?, span))
            }
            _ => self.parse_expr_stmt(),
        }
    }

    fn parse_block(&mut self) -> Result<Vec<Stmt>, ParseError> {
        self.nested(|p| {
            p.expect(TokenKind::LBrace)?;
            let mut stmts = Vec::new();
            while !p.check(TokenKind::RBrace) && !p.is_at_end() {
                stmts.push(p.parse_stmt()?);
            }
            p.expect(TokenKind::RBrace)?;
            Ok(stmts)
        })
    }

    /// Parse a block counted as a control body for `run` legality.
    fn parse_control_block(&mut self) -> Result<Vec<Stmt>, ParseError> {
        self.control_depth += 1;
        let block = self.parse_block();
        self.control_depth -= 1;
        block
    }

    fn parse_var(&mut self) -> Result<Stmt, ParseError> {
        let span = self.span();
        self.expect(TokenKind::Var)?;
        let name = self.expect_ident()?;
        let initializer = if self.matches(TokenKind::Eq) {
            Some(self.parse_expr()?)
        } else {
            None
        };
        self.expect(TokenKind::Semicolon)?;
        Ok(Stmt::Var(VarDecl { name, initializer, span }))
    }

    fn parse_print(&mut self) -> Result<Stmt, ParseError> {
        let span = self.span();
        self.expect(TokenKind::Print)?;
        let value = self.parse_expr()?;
        self.expect(TokenKind::Semicolon)?;
        Ok(Stmt::Print(value, span))
    }

    fn parse_if(&mut self) -> Result<Stmt, ParseError> {
        let span = self.span();
        self.expect(TokenKind::If)?;
        let condition = self.parse_expr()?;
        let then_block = self.parse_control_block()?;
        let else_block = if self.matches(TokenKind::Else) {
            if self.check(TokenKind::If) {
                // `else if` chains nest a single if statement
                Some(vec![self.parse_if()?])
            } else {
                Some(self.parse_control_block()?)
            }
        } else {
            None
        };
        Ok(Stmt::If(IfStmt { condition, then_block, else_block, span }))
    }

    fn parse_repeat(&mut self) -> Result<Stmt, ParseError> {
        let span = self.span();
        self.expect(TokenKind::Repeat)?;
        let count = self.parse_expr()?;
        let body = self.parse_control_block()?;
        Ok(Stmt::Repeat(RepeatStmt { count, body, span }))
    }

    fn parse_define(&mut self) -> Result<Stmt, ParseError> {
        let span = self.span();
        self.expect(TokenKind::Define)?;
        let name = self.expect_ident()?;
        self.expect(TokenKind::LParen)?;
        let mut params = Vec::new();
        while !self.check(TokenKind::RParen) && !self.is_at_end() {
            params.push(self.expect_ident()?);
            if !self.matches(TokenKind::Comma) { break; }
        }
        self.expect(TokenKind::RParen)?;

        // A function body starts a fresh control context: an enclosing loop
        // at the definition site does not make `run` legal inside the body.
        let outer_depth = std::mem::replace(&mut self.control_depth, 0);
        let body = self.parse_block();
        self.control_depth = outer_depth;

        Ok(Stmt::Define(FnDef { name, params, body: Rc::new(body?), span }))
    }

    fn parse_throw_ball(&mut self) -> Result<Stmt, ParseError> {
        let span = self.span();
        self.expect(TokenKind::ThrowBall)?;
        self.expect(TokenKind::LParen)?;
        let zone = self.parse_expr()?;
        self.expect(TokenKind::Comma)?;
        let target = self.parse_expr()?;
        self.expect(TokenKind::RParen)?;
        self.expect(TokenKind::Semicolon)?;
        Ok(Stmt::ThrowBall(ThrowBall { zone, target, span }))
    }

    fn parse_run(&mut self) -> Result<Stmt, ParseError> {
        let tok = self.peek().clone();
        if self.control_depth == 0 {
            return Err(ParseError::new(
                ParseErrorKind::IllegalExitOutsideControlBlock,
                tok,
                "`run` is only allowed inside an `if` or `repeat` block",
            ));
        }
        self.advance();
        self.expect(TokenKind::Semicolon)?;
        Ok(Stmt::Run(Span::from(&tok)))
    }

    fn parse_expr_stmt(&mut self) -> Result<Stmt, ParseError> {
        let first = self.peek().clone();
        let expr = self.parse_expr()?;
        // `(x);` is grouped, not bare
        let bare = matches!(first.kind, TokenKind::Ident(_));
        if let (true, Expr::Variable(name, _)) = (bare, &expr) {
            return Err(ParseError::new(
                ParseErrorKind::UnexpectedStandaloneIdentifier,
                first,
                format!("standalone identifier `{name}` is not a statement"),
            ));
        }
        self.expect(TokenKind::Semicolon)?;
        Ok(Stmt::Expr(expr))
    }

    // ─── Expressions (precedence climbing) ───────────────────────────────────

    pub(crate) fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.nested(Self::parse_assignment)
    }

    fn parse_assignment(&mut self) -> Result<Expr, ParseError> {
        let target = self.parse_or()?;
        if self.check(TokenKind::Eq) {
            let eq = self.advance();
            let value = self.parse_expr()?;
            return match target {
                Expr::Variable(..) | Expr::Property { .. } => Ok(Expr::Assign {
                    target: Box::new(target),
                    value: Box::new(value),
                    span: Span::from(&eq),
                }),
                _ => Err(ParseError::new(
                    ParseErrorKind::InvalidAssignmentTarget,
                    eq,
                    "invalid assignment target",
                )),
            };
        }
        Ok(target)
    }

    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_and()?;
        while self.check(TokenKind::Or) {
            let span = Span::from(&self.advance());
            let right = self.parse_and()?;
            left = Expr::Logical { left: Box::new(left), op: LogicalOp::Or, right: Box::new(right), span };
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_equality()?;
        while self.check(TokenKind::And) {
            let span = Span::from(&self.advance());
            let right = self.parse_equality()?;
            left = Expr::Logical { left: Box::new(left), op: LogicalOp::And, right: Box::new(right), span };
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_comparison()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::EqEq   => BinOp::Eq,
                TokenKind::BangEq => BinOp::NotEq,
                _ => break,
            };
            let span = Span::from(&self.advance());
            let right = self.parse_comparison()?;
            left = Expr::Binary { left: Box::new(left), op, right: Box::new(right), span };
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_addition()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Lt   => BinOp::Lt,
                TokenKind::LtEq => BinOp::LtEq,
                TokenKind::Gt   => BinOp::Gt,
                TokenKind::GtEq => BinOp::GtEq,
                _ => break,
            };
            let span = Span::from(&self.advance());
            let right = self.parse_addition()?;
            left = Expr::Binary { left: Box::new(left), op, right: Box::new(right), span };
        }
        Ok(left)
    }

    fn parse_addition(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_multiplication()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Plus  => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            let span = Span::from(&self.advance());
            let right = self.parse_multiplication()?;
            left = Expr::Binary { left: Box::new(left), op, right: Box::new(right), span };
        }
        Ok(left)
    }

    fn parse_multiplication(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Star    => BinOp::Mul,
                TokenKind::Slash   => BinOp::Div,
                TokenKind::Percent => BinOp::Mod,
                _ => break,
            };
            let span = Span::from(&self.advance());
            let right = self.parse_unary()?;
            left = Expr::Binary { left: Box::new(left), op, right: Box::new(right), span };
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let span = self.span();
        if self.matches(TokenKind::Minus) {
            let operand = self.nested(Self::parse_unary)?;
            return Ok(Expr::Unary { op: UnOp::Neg, operand: Box::new(operand), span });
        }
        if self.matches(TokenKind::Not) {
            let operand = self.nested(Self::parse_unary)?;
            return Ok(Expr::Unary { op: UnOp::Not, operand: Box::new(operand), span });
        }
        self.parse_suffix()
    }

    /// Greedy suffix chain: `.name`, `->name(args)`, `(args)` in any order.
    fn parse_suffix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;

        loop {
            match self.peek_kind() {
                // property access: expr.name
                TokenKind::Dot => {
                    self.advance();
                    let span = self.span();
                    let name = self.expect_ident()?;
                    expr = Expr::Property { object: Box::new(expr), name, span };
                }

                // method call: expr->name or expr->name(args, key=val)
                TokenKind::Arrow => {
                    self.advance();
                    let span = self.span();
                    let method = self.expect_ident()?;
                    let (args, named_args) = if self.matches(TokenKind::LParen) {
                        let list = self.parse_method_args()?;
                        self.expect(TokenKind::RParen)?;
                        list
                    } else {
                        (Vec::new(), Vec::new())
                    };
                    expr = Expr::MethodCall { object: Box::new(expr), method, args, named_args, span };
                }

                // plain call: expr(args)
                TokenKind::LParen => {
                    let span = expr.span().clone();
                    self.advance();
                    let args = self.parse_arg_list()?;
                    self.expect(TokenKind::RParen)?;
                    expr = Expr::Call { callee: Box::new(expr), args, span };
                }

                _ => break,
            }
        }

        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let tok = self.peek().clone();
        let span = Span::from(&tok);

        if let Some(lit) = tok.literal() {
            self.advance();
            return Ok(Expr::Literal(lit, span));
        }

        match tok.kind {
            TokenKind::Ident(name) => {
                self.advance();
                Ok(Expr::Variable(name, span))
            }

            // grouped expression
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                Ok(expr)
            }

            // list literal
            TokenKind::LBracket => {
                self.advance();
                let mut items = Vec::new();
                while !self.check(TokenKind::RBracket) && !self.is_at_end() {
                    items.push(self.parse_expr()?);
                    if !self.matches(TokenKind::Comma) { break; }
                }
                self.expect(TokenKind::RBracket)?;
                Ok(Expr::List(items, span))
            }

            _ => Err(self.unexpected("expression")),
        }
    }

    // ─── Argument lists ──────────────────────────────────────────────────────

    /// Parse a plain positional arg list (no named args).
    fn parse_arg_list(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut args = Vec::new();
        while !self.check(TokenKind::RParen) && !self.is_at_end() {
            args.push(self.parse_expr()?);
            if !self.matches(TokenKind::Comma) { break; }
        }
        Ok(args)
    }

    /// Parse positional + named args: `team->filter(nature="Calm", level=5)`.
    fn parse_method_args(&mut self) -> Result<(Vec<Expr>, Vec<(String, Expr)>), ParseError> {
        let mut args = Vec::new();
        let mut named = Vec::new();

        while !self.check(TokenKind::RParen) && !self.is_at_end() {
            // named arg: ident `=` expr
            if matches!(self.peek_kind(), TokenKind::Ident(_)) && self.peek_next_is(TokenKind::Eq) {
                let name = self.expect_ident()?;
                self.expect(TokenKind::Eq)?;
                let val = self.parse_expr()?;
                named.push((name, val));
            } else {
                args.push(self.parse_expr()?);
            }
            if !self.matches(TokenKind::Comma) { break; }
        }
        Ok((args, named))
    }

    /// Run `f` one nesting level deeper.
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T, ParseError>) -> Result<T, ParseError> {
        if self.nesting >= MAX_NESTING {
            let tok = self.peek().clone();
            return Err(ParseError::new(
                ParseErrorKind::NestingTooDeep,
                tok,
                format!("expression or block nested more than {MAX_NESTING} levels deep"),
            ));
        }
        self.nesting += 1;
        let result = crate::with_stack(|| f(self));
        self.nesting -= 1;
        result
    }

    // ─── Token primitives ────────────────────────────────────────────────────

    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn peek_kind(&self) -> TokenKind {
        self.tokens[self.pos].kind.clone()
    }

    fn peek_next_is(&self, kind: TokenKind) -> bool {
        self.tokens.get(self.pos + 1).is_some_and(|t| t.kind == kind)
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() { self.pos += 1; }
        tok
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.tokens[self.pos].kind == kind
    }

    fn matches(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) { self.advance(); true } else { false }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        if self.check(kind.clone()) {
            Ok(self.advance())
        } else {
            let tok = self.peek().clone();
            let message = format!("expected {}, found {}", kind, tok.kind);
            Err(ParseError::new(ParseErrorKind::ExpectedToken, tok, message))
        }
    }

    fn expect_ident(&mut self) -> Result<String, ParseError> {
        if let TokenKind::Ident(s) = self.peek_kind() {
            self.advance();
            Ok(s)
        } else {
            let tok = self.peek().clone();
            let message = format!("expected identifier, found {}", tok.kind);
            Err(ParseError::new(ParseErrorKind::ExpectedToken, tok, message))
        }
    }

    fn is_at_end(&self) -> bool {
        matches!(self.tokens[self.pos].kind, TokenKind::Eof)
    }

    fn span(&self) -> Span {
        Span::from(self.peek())
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        let tok = self.peek().clone();
        let message = format!("expected {}, found {}", expected, tok.kind);
        ParseError::new(ParseErrorKind::UnexpectedToken, tok, message)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
