//! Tree-walking interpreter. Executes a `Program` against a persistent global
//! frame, writing `print` and `throwBall` output to the configured sink.
//!
//! `run` is not a value: it travels up the statement path as `Flow::Exit`
//! until the nearest `repeat` absorbs it.

use std::io::{self, Write};
use std::mem;
use std::rc::Rc;

use crate::error::{RuntimeError, RuntimeErrorKind};
use crate::objects::Object;
use crate::runtime::env::Environment;
use crate::runtime::natives;
use crate::runtime::value::{Function, Value, values_equal};
use crate::syntax::ast::{BinOp, Expr, LogicalOp, Program, Span, Stmt, UnOp};

// ─── Options ──────────────────────────────────────────────────────────────────

/// Host-imposed limits on a single `evaluate` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterpreterOptions {
    /// Nested user function calls allowed before `StackOverflow`.
    pub max_call_depth: usize,
    /// Statements allowed per `evaluate` before `StepLimitExceeded`.
    pub max_steps: Option<u64>,
}

impl Default for InterpreterOptions {
    fn default() -> Self {
        Self { max_call_depth: 200, max_steps: None }
    }
}

// ─── Control flow ─────────────────────────────────────────────────────────────

/// Why statement execution stopped early.
#[derive(Debug)]
enum Flow {
    /// `run` executed; carries its location for the escape diagnostic.
    Exit(Span),
    Error(RuntimeError),
}

impl From<RuntimeError> for Flow {
    fn from(e: RuntimeError) -> Self { Flow::Error(e) }
}

type Exec<T> = Result<T, Flow>;

fn exit_outside_loop(span: &Span) -> RuntimeError {
    RuntimeError::new(
        RuntimeErrorKind::ExitOutsideLoop,
        span,
        "`run` reached the edge of a function or the program without an enclosing `repeat`",
    )
}

/// Collapse a statement result at a boundary where `run` may not cross.
fn settle<T>(result: Exec<T>) -> Result<T, RuntimeError> {
    match result {
        Ok(v) => Ok(v),
        Err(Flow::Exit(span)) => Err(exit_outside_loop(&span)),
        Err(Flow::Error(e)) => Err(e),
    }
}

// ─── Interpreter ──────────────────────────────────────────────────────────────

pub struct Interpreter<W: Write> {
    out: W,
    globals: Environment,
    /// Current frame register. Swapped on block and call entry, restored on exit.
    env: Environment,
    options: InterpreterOptions,
    call_depth: usize,
    steps: u64,
}

impl Interpreter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> Interpreter<W> {
    pub fn new(out: W) -> Self {
        Self::with_options(out, InterpreterOptions::default())
    }

    pub fn with_options(out: W, options: InterpreterOptions) -> Self {
        let globals = Environment::global();
        natives::install(&globals);
        Self { out, env: globals.clone(), globals, options, call_depth: 0, steps: 0 }
    }

    pub fn globals(&self) -> &Environment {
        &self.globals
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Run every top-level statement in order. The first error aborts the
    /// program; bindings made by statements that completed are kept.
    pub fn evaluate(&mut self, program: &Program) -> Result<(), RuntimeError> {
        self.env = self.globals.clone();
        self.call_depth = 0;
        self.steps = 0;

        for stmt in &program.statements {
            let result = settle(self.exec_stmt(stmt));
            if result.is_err() {
                // unwinding may leave the register anywhere
                self.env = self.globals.clone();
            }
            result?;
        }
        tracing::debug!(statements = program.statements.len(), steps = self.steps, "evaluated program");
        Ok(())
    }

    fn err(&self, kind: RuntimeErrorKind, span: &Span, msg: impl Into<String>) -> RuntimeError {
        RuntimeError::new(kind, span, msg)
    }

    fn write_line(&mut self, text: &str, span: &Span) -> Result<(), RuntimeError> {
        writeln!(self.out, "{text}")
            .map_err(|e| self.err(RuntimeErrorKind::Io, span, format!("failed to write output: {e}")))
    }

    fn tick(&mut self, span: &Span) -> Result<(), RuntimeError> {
        self.steps += 1;
        match self.options.max_steps {
            Some(limit) if self.steps > limit => Err(self.err(
                RuntimeErrorKind::StepLimitExceeded,
                span,
                format!("step budget of {limit} exhausted"),
            )),
            _ => Ok(()),
        }
    }

    // ─── Statement executor ───────────────────────────────────────────────────

    /// Execute a statement, yielding its value: expression statements give
    /// their value, `if` gives its taken branch's value, the rest give null.
    fn exec_stmt(&mut self, stmt: &Stmt) -> Exec<Value> {
        crate::with_stack(|| self.exec_stmt_inner(stmt))
    }

    fn exec_stmt_inner(&mut self, stmt: &Stmt) -> Exec<Value> {
        self.tick(stmt.span())?;

        match stmt {
            Stmt::Expr(e) => Ok(self.eval_expr(e)?),

            Stmt::Var(v) => {
                let val = match &v.initializer {
                    Some(init) => self.eval_expr(init)?,
                    None => Value::Null,
                };
                self.env.define(&v.name, val);
                Ok(Value::Null)
            }

            Stmt::Print(e, span) => {
                let val = self.eval_expr(e)?;
                self.write_line(&val.to_string(), span)?;
                Ok(Value::Null)
            }

            Stmt::If(i) => {
                if self.eval_expr(&i.condition)?.is_truthy() {
                    self.exec_block(&i.then_block)
                } else if let Some(block) = &i.else_block {
                    self.exec_block(block)
                } else {
                    Ok(Value::Null)
                }
            }

            Stmt::Block(stmts, _) => {
                self.exec_block(stmts)?;
                Ok(Value::Null)
            }

            Stmt::Repeat(r) => {
                let count = match self.eval_expr(&r.count)? {
                    Value::Int(n) => n,
                    other => return Err(self.err(
                        RuntimeErrorKind::TypeMismatch,
                        r.count.span(),
                        format!("`repeat` count must be an int, got {}", other.type_name()),
                    ).into()),
                };
                for i in 0..count.max(0) {
                    match self.exec_block(&r.body) {
                        Ok(_) => {}
                        Err(Flow::Exit(_)) => {
                            tracing::trace!(iteration = i, line = r.span.line, "run: leaving repeat");
                            break;
                        }
                        Err(e) => return Err(e),
                    }
                }
                Ok(Value::Null)
            }

            Stmt::Define(f) => {
                let func = Function {
                    name: f.name.clone(),
                    params: f.params.clone(),
                    body: f.body.clone(),
                    closure: self.env.clone(),
                };
                self.env.define(&f.name, Value::Function(Rc::new(func)));
                Ok(Value::Null)
            }

            Stmt::ThrowBall(t) => {
                let zone = match self.eval_expr(&t.zone)? {
                    Value::Object(Object::Zone(z)) => z,
                    other => return Err(self.err(
                        RuntimeErrorKind::TypeMismatch,
                        &t.span,
                        format!("`throwBall` expects a SafariZone, got {}", other.type_name()),
                    ).into()),
                };
                let target = match self.eval_expr(&t.target)? {
                    Value::Object(Object::Pokemon(p)) => p,
                    other => return Err(self.err(
                        RuntimeErrorKind::TypeMismatch,
                        &t.span,
                        format!("`throwBall` expects a Pokemon, got {}", other.type_name()),
                    ).into()),
                };

                let outcome = zone.borrow_mut().throw_ball(&target);
                let name = target.borrow().name.clone();
                tracing::debug!(pokemon = %name, ?outcome, "throwBall");
                for line in outcome.messages(&name) {
                    self.write_line(&line, &t.span)?;
                }
                Ok(Value::Null)
            }

            Stmt::Run(span) => Err(Flow::Exit(span.clone())),
        }
    }

    /// Run `stmts` in a fresh child of the current frame.
    fn exec_block(&mut self, stmts: &[Stmt]) -> Exec<Value> {
        let frame = self.env.child();
        self.exec_in(stmts, frame)
    }

    /// Run `stmts` with `frame` as the current frame, restoring the caller's
    /// frame afterwards whether or not execution succeeded.
    fn exec_in(&mut self, stmts: &[Stmt], frame: Environment) -> Exec<Value> {
        let saved = mem::replace(&mut self.env, frame);
        let result = self.exec_seq(stmts);
        mem::replace(&mut self.env, saved).release();
        result
    }

    fn exec_seq(&mut self, stmts: &[Stmt]) -> Exec<Value> {
        let mut last = Value::Null;
        for stmt in stmts {
            last = self.exec_stmt(stmt)?;
        }
        Ok(last)
    }

    // ─── Expression evaluator ─────────────────────────────────────────────────

    pub fn eval_expr(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        crate::with_stack(|| self.eval_expr_inner(expr))
    }

    fn eval_expr_inner(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Literal(lit, _) => Ok(Value::from(lit.clone())),

            Expr::List(items, _) => {
                let vals = items.iter().map(|e| self.eval_expr(e)).collect::<Result<Vec<_>, _>>()?;
                Ok(Value::list(vals))
            }

            Expr::Variable(name, span) => self.env.get(name).ok_or_else(|| self.err(
                RuntimeErrorKind::UndefinedVariable,
                span,
                format!("undefined variable `{name}`"),
            )),

            Expr::Unary { op, operand, span } => {
                let v = self.eval_expr(operand)?;
                eval_unop(*op, v, span)
            }

            Expr::Binary { left, op, right, span } => {
                let l = self.eval_expr(left)?;
                let r = self.eval_expr(right)?;
                eval_binop(*op, l, r, span)
            }

            Expr::Logical { left, op, right, .. } => {
                let l = self.eval_expr(left)?.is_truthy();
                let decided = match op {
                    LogicalOp::And => !l,
                    LogicalOp::Or  => l,
                };
                if decided {
                    return Ok(Value::Bool(l));
                }
                Ok(Value::Bool(self.eval_expr(right)?.is_truthy()))
            }

            Expr::Assign { target, value, span } => {
                let val = self.eval_expr(value)?;
                match target.as_ref() {
                    Expr::Variable(name, _) => {
                        if self.env.set(name, val.clone()) {
                            tracing::warn!(name = %name, line = span.line, "assignment created implicit global");
                        }
                    }
                    Expr::Property { object, name, span } => {
                        let obj = self.eval_object(object, span)?;
                        obj.set_property(name, val.clone(), span)?;
                    }
                    _ => return Err(self.err(
                        RuntimeErrorKind::InvalidAssignmentTarget,
                        span,
                        "only variables and properties can be assigned",
                    )),
                }
                Ok(val)
            }

            Expr::Call { callee, args, span } => {
                let callee_val = self.eval_expr(callee)?;
                let arg_vals = args.iter().map(|a| self.eval_expr(a)).collect::<Result<Vec<_>, _>>()?;
                match callee_val {
                    Value::Function(f) => self.call_function(&f, arg_vals, span),
                    Value::Native(n)   => n.call(&arg_vals, span),
                    other => Err(self.err(
                        RuntimeErrorKind::NotCallable,
                        span,
                        format!("{} is not callable", other.type_name()),
                    )),
                }
            }

            Expr::Property { object, name, span } => {
                let obj = self.eval_object(object, span)?;
                obj.get_property(name, span)
            }

            Expr::MethodCall { object, method, args, named_args, span } => {
                let obj = self.eval_object(object, span)?;
                let arg_vals = args.iter().map(|a| self.eval_expr(a)).collect::<Result<Vec<_>, _>>()?;
                let named = named_args.iter()
                    .map(|(k, v)| self.eval_expr(v).map(|val| (k.clone(), val)))
                    .collect::<Result<Vec<_>, _>>()?;
                obj.call_method(method, &arg_vals, &named, span)
            }
        }
    }

    /// Evaluate the receiver of `.` or `->`.
    fn eval_object(&mut self, expr: &Expr, span: &Span) -> Result<Object, RuntimeError> {
        match self.eval_expr(expr)? {
            Value::Object(o) => Ok(o),
            other => Err(self.err(
                RuntimeErrorKind::NotAnObject,
                span,
                format!("{} has no properties or methods", other.type_name()),
            )),
        }
    }

    // ─── Calls ────────────────────────────────────────────────────────────────

    fn call_function(&mut self, f: &Rc<Function>, args: Vec<Value>, span: &Span) -> Result<Value, RuntimeError> {
        if f.params.len() != args.len() {
            return Err(self.err(
                RuntimeErrorKind::ArityMismatch,
                span,
                format!("`{}` expects {} argument(s), got {}", f.name, f.params.len(), args.len()),
            ));
        }
        if self.call_depth >= self.options.max_call_depth {
            return Err(self.err(
                RuntimeErrorKind::StackOverflow,
                span,
                format!("call depth exceeded {} in `{}`", self.options.max_call_depth, f.name),
            ));
        }

        // Parented to the defining frame, not the caller's.
        let frame = f.closure.child();
        for (param, arg) in f.params.iter().zip(args) {
            frame.define(param, arg);
        }

        self.call_depth += 1;
        tracing::trace!(function = %f.name, depth = self.call_depth, "call");
        let result = self.exec_in(&f.body, frame);
        self.call_depth -= 1;

        settle(result)
    }
}

// ─── Binary / unary operators ─────────────────────────────────────────────────

fn overflow(op: &str, span: &Span) -> RuntimeError {
    RuntimeError::new(RuntimeErrorKind::Overflow, span, format!("integer overflow in `{op}`"))
}

fn division_by_zero(op: &str, span: &Span) -> RuntimeError {
    RuntimeError::new(RuntimeErrorKind::DivisionByZero, span, format!("division by zero in `{op}`"))
}

fn operand_mismatch(op: BinOp, l: &Value, r: &Value, span: &Span) -> RuntimeError {
    RuntimeError::new(
        RuntimeErrorKind::TypeMismatch,
        span,
        format!("cannot apply `{}` to {} and {}", op.symbol(), l.type_name(), r.type_name()),
    )
}

fn as_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Int(n) => Some(*n as f64),
        Value::Decimal(d) => Some(*d),
        _ => None,
    }
}

fn eval_binop(op: BinOp, l: Value, r: Value, span: &Span) -> Result<Value, RuntimeError> {
    let sym = op.symbol();
    match op {
        BinOp::Eq    => return Ok(Value::Bool(values_equal(&l, &r))),
        BinOp::NotEq => return Ok(Value::Bool(!values_equal(&l, &r))),
        BinOp::Add if matches!(l, Value::Str(_)) || matches!(r, Value::Str(_)) => {
            return Ok(Value::Str(format!("{l}{r}")));
        }
        _ => {}
    }

    // int ⊕ int stays integral
    if let (Value::Int(a), Value::Int(b)) = (&l, &r) {
        let (a, b) = (*a, *b);
        return match op {
            BinOp::Add  => a.checked_add(b).map(Value::Int).ok_or_else(|| overflow(sym, span)),
            BinOp::Sub  => a.checked_sub(b).map(Value::Int).ok_or_else(|| overflow(sym, span)),
            BinOp::Mul  => a.checked_mul(b).map(Value::Int).ok_or_else(|| overflow(sym, span)),
            BinOp::Div | BinOp::Mod if b == 0 => Err(division_by_zero(sym, span)),
            BinOp::Div  => a.checked_div(b).map(Value::Int).ok_or_else(|| overflow(sym, span)),
            BinOp::Mod  => a.checked_rem(b).map(Value::Int).ok_or_else(|| overflow(sym, span)),
            BinOp::Lt   => Ok(Value::Bool(a < b)),
            BinOp::LtEq => Ok(Value::Bool(a <= b)),
            BinOp::Gt   => Ok(Value::Bool(a > b)),
            BinOp::GtEq => Ok(Value::Bool(a >= b)),
            BinOp::Eq | BinOp::NotEq => unreachable!("handled above"),
        };
    }

    // otherwise promote to decimal
    let (Some(a), Some(b)) = (as_f64(&l), as_f64(&r)) else {
        return Err(operand_mismatch(op, &l, &r, span));
    };
    match op {
        BinOp::Add  => Ok(Value::Decimal(a + b)),
        BinOp::Sub  => Ok(Value::Decimal(a - b)),
        BinOp::Mul  => Ok(Value::Decimal(a * b)),
        BinOp::Div if b == 0.0 => Err(division_by_zero(sym, span)),
        BinOp::Div  => Ok(Value::Decimal(a / b)),
        BinOp::Mod  => Err(operand_mismatch(op, &l, &r, span)),
        BinOp::Lt   => Ok(Value::Bool(a < b)),
        BinOp::LtEq => Ok(Value::Bool(a <= b)),
        BinOp::Gt   => Ok(Value::Bool(a > b)),
        BinOp::GtEq => Ok(Value::Bool(a >= b)),
        BinOp::Eq | BinOp::NotEq => unreachable!("handled above"),
    }
}

fn eval_unop(op: UnOp, v: Value, span: &Span) -> Result<Value, RuntimeError> {
    match op {
        UnOp::Neg => match v {
            Value::Int(n)     => n.checked_neg().map(Value::Int).ok_or_else(|| overflow("-", span)),
            Value::Decimal(d) => Ok(Value::Decimal(-d)),
            other => Err(RuntimeError::new(
                RuntimeErrorKind::TypeMismatch,
                span,
                format!("unary `-` needs a number, got {}", other.type_name()),
            )),
        },
        UnOp::Not => Ok(Value::Bool(!v.is_truthy())),
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{lexer::Lexer, parser::Parser};
    use pretty_assertions::assert_eq;

    fn program(src: &str) -> Program {
        let tokens = Lexer::new(src).tokenize().expect("lex failed");
        Parser::new(tokens).parse().expect("parse failed")
    }

    fn eval_with(src: &str, options: InterpreterOptions) -> (Result<(), RuntimeError>, String) {
        let mut interp = Interpreter::with_options(Vec::new(), options);
        let result = interp.evaluate(&program(src));
        (result, String::from_utf8(interp.into_output()).unwrap())
    }

    fn output(src: &str) -> String {
        let (result, out) = eval_with(src, InterpreterOptions::default());
        result.expect("runtime error");
        out
    }

    fn error(src: &str) -> RuntimeError {
        eval_with(src, InterpreterOptions::default()).0.expect_err("expected runtime error")
    }

    fn span() -> Span { Span::default() }

    #[test]
    fn int_arithmetic() {
        assert_eq!(output("print 1 + 2 * 3;"), "7\n");
        assert_eq!(output("print 7 / 2; print -7 / 2; print 7 % 3;"), "3\n-3\n1\n");
    }

    #[test]
    fn decimal_promotion() {
        assert!(matches!(eval_binop(BinOp::Add, Value::Int(1), Value::Decimal(0.5), &span()), Ok(Value::Decimal(d)) if d == 1.5));
        assert!(matches!(eval_binop(BinOp::Div, Value::Decimal(1.0), Value::Int(4), &span()), Ok(Value::Decimal(d)) if d == 0.25));
        assert!(matches!(eval_binop(BinOp::Lt, Value::Int(1), Value::Decimal(1.5), &span()), Ok(Value::Bool(true))));
    }

    #[test]
    fn zero_divisors() {
        for (op, l, r) in [
            (BinOp::Div, Value::Int(5), Value::Int(0)),
            (BinOp::Mod, Value::Int(5), Value::Int(0)),
            (BinOp::Div, Value::Decimal(5.0), Value::Decimal(0.0)),
            (BinOp::Div, Value::Int(5), Value::Decimal(0.0)),
        ] {
            let err = eval_binop(op, l, r, &span()).unwrap_err();
            assert_eq!(err.kind, RuntimeErrorKind::DivisionByZero);
        }
    }

    #[test]
    fn modulo_needs_ints() {
        let err = eval_binop(BinOp::Mod, Value::Decimal(5.5), Value::Int(2), &span()).unwrap_err();
        assert_eq!(err.kind, RuntimeErrorKind::TypeMismatch);
    }

    #[test]
    fn overflow_is_reported() {
        let err = eval_binop(BinOp::Mul, Value::Int(i64::MAX), Value::Int(2), &span()).unwrap_err();
        assert_eq!(err.kind, RuntimeErrorKind::Overflow);
        let err = eval_binop(BinOp::Div, Value::Int(i64::MIN), Value::Int(-1), &span()).unwrap_err();
        assert_eq!(err.kind, RuntimeErrorKind::Overflow);
        let err = eval_unop(UnOp::Neg, Value::Int(i64::MIN), &span()).unwrap_err();
        assert_eq!(err.kind, RuntimeErrorKind::Overflow);
    }

    #[test]
    fn string_concatenation() {
        assert_eq!(output("print \"lv.\" + 5;"), "lv.5\n");
        assert_eq!(output("print 2.5 + \"x\";"), "2.5x\n");
        assert_eq!(output("print \"a\" + null;"), "anull\n");
    }

    #[test]
    fn comparisons_need_numbers() {
        let err = eval_binop(BinOp::Lt, Value::Str("a".into()), Value::Str("b".into()), &span()).unwrap_err();
        assert_eq!(err.kind, RuntimeErrorKind::TypeMismatch);
        let err = eval_binop(BinOp::Sub, Value::Str("a".into()), Value::Int(1), &span()).unwrap_err();
        assert_eq!(err.kind, RuntimeErrorKind::TypeMismatch);
    }

    #[test]
    fn equality_never_fails() {
        assert_eq!(output("print 1 == \"1\"; print null != false; print [1, 2] == [1, 2];"), "false\ntrue\ntrue\n");
    }

    #[test]
    fn logic_short_circuits() {
        // the right operand would fail if evaluated
        assert_eq!(output("print false and missing; print true or missing;"), "false\ntrue\n");
        assert_eq!(output("print null or 0; print not null;"), "true\ntrue\n");
    }

    #[test]
    fn repeat_and_run() {
        let src = "var n = 0; repeat 10 { n = n + 1; if n == 3 { run; } } print n;";
        assert_eq!(output(src), "3\n");
    }

    #[test]
    fn run_leaves_only_the_innermost_repeat() {
        let src = "var total = 0;\nrepeat 3 {\n  repeat 5 { total = total + 1; run; }\n  total = total + 10;\n}\nprint total;";
        assert_eq!(output(src), "33\n");
    }

    #[test]
    fn repeat_count_is_evaluated_once() {
        let src = "var n = 3; var hits = 0; repeat n { n = n + 1; hits = hits + 1; } print hits;";
        assert_eq!(output(src), "3\n");
        assert_eq!(output("repeat -2 { print 1; } print 0;"), "0\n");
    }

    #[test]
    fn repeat_count_must_be_int() {
        assert_eq!(error("repeat 2.5 { }").kind, RuntimeErrorKind::TypeMismatch);
    }

    #[test]
    fn run_outside_repeat_is_runtime_error() {
        let err = error("if true {\n  run;\n}");
        assert_eq!(err.kind, RuntimeErrorKind::ExitOutsideLoop);
        assert_eq!(err.line(), 2);
    }

    #[test]
    fn run_does_not_cross_function_boundary() {
        let src = "define f() { if true { run; } }\nrepeat 3 { f(); }";
        assert_eq!(error(src).kind, RuntimeErrorKind::ExitOutsideLoop);
    }

    #[test]
    fn blocks_scope_their_declarations() {
        assert_eq!(output("var a = 1; { var a = 2; print a; } print a;"), "2\n1\n");
        assert_eq!(error("{ var hidden = 1; } print hidden;").kind, RuntimeErrorKind::UndefinedVariable);
    }

    #[test]
    fn functions_return_last_value() {
        assert_eq!(output("define add(a, b) { a + b; } print add(2, 3);"), "5\n");
        assert_eq!(output("define pick(x) { if x { 1; } else { 2; } } print pick(false);"), "2\n");
        assert_eq!(output("define nothing() { var x = 1; } print nothing();"), "null\n");
    }

    #[test]
    fn arity_is_checked() {
        assert_eq!(error("define f(a) { print a; } f(1, 2);").kind, RuntimeErrorKind::ArityMismatch);
    }

    #[test]
    fn closures_use_defining_frame() {
        let src = "\
            var counter;\n\
            define makeCounter() {\n\
              var count = 0;\n\
              define next() { count = count + 1; }\n\
              counter = next;\n\
            }\n\
            makeCounter();\n\
            counter(); counter();\n\
            print counter();";
        assert_eq!(output(src), "3\n");
    }

    #[test]
    fn recursion_and_depth_limit() {
        let src = "define fact(n) { if n <= 1 { 1; } else { n * fact(n - 1); } } print fact(10);";
        assert_eq!(output(src), "3628800\n");

        let options = InterpreterOptions { max_call_depth: 16, max_steps: None };
        let (result, _) = eval_with("define f() { f(); } f();", options);
        assert_eq!(result.unwrap_err().kind, RuntimeErrorKind::StackOverflow);
    }

    #[test]
    fn step_budget() {
        let options = InterpreterOptions { max_call_depth: 200, max_steps: Some(50) };
        let (result, out) = eval_with("repeat 1000 { print 1; }", options);
        assert_eq!(result.unwrap_err().kind, RuntimeErrorKind::StepLimitExceeded);
        assert!(out.lines().count() < 50);
    }

    #[test]
    fn call_errors() {
        assert_eq!(error("var x = 3; x();").kind, RuntimeErrorKind::NotCallable);
        assert_eq!(error("var x = 3; print x.size;").kind, RuntimeErrorKind::NotAnObject);
        assert_eq!(error("print \"s\"->len;").kind, RuntimeErrorKind::NotAnObject);
    }

    #[test]
    fn implicit_global_assignment() {
        assert_eq!(output("define f() { created = 7; } f(); print created;"), "7\n");
    }

    #[test]
    fn register_restored_after_error() {
        let mut interp = Interpreter::new(Vec::new());
        interp.evaluate(&program("var kept = 1;")).unwrap();
        let err = interp.evaluate(&program("define f() { var inner = 2; missing + 1; } print f();"));
        assert!(err.is_err());
        interp.evaluate(&program("print kept;")).unwrap();
        assert!(interp.env.ptr_eq(interp.globals()));
        assert!(interp.globals().get("inner").is_none());
        assert_eq!(String::from_utf8(interp.into_output()).unwrap(), "1\n");
    }

    #[test]
    fn throw_ball_output() {
        let src = "\
            var zone = SafariZone(1, 5);\n\
            var p = Pokemon(\"Pikachu\", 5);\n\
            zone->addPokemon(p);\n\
            throwBall(zone, p);\n\
            throwBall(zone, p);\n\
            print len(zone.pokemon);";
        assert_eq!(
            output(src),
            "You threw a Safari Ball at Pikachu!\nGotcha! Pikachu was caught!\nPikachu has already been caught!\n0\n"
        );
    }

    #[test]
    fn throw_ball_checks_types() {
        assert_eq!(error("throwBall(Team(), Pokemon(\"A\", 1));").kind, RuntimeErrorKind::TypeMismatch);
        assert_eq!(error("throwBall(SafariZone(1, 1), 3);").kind, RuntimeErrorKind::TypeMismatch);
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
        fn flush(&mut self) -> io::Result<()> { Ok(()) }
    }

    #[test]
    fn write_failure_is_io_error() {
        let mut interp = Interpreter::new(BrokenPipe);
        let err = interp.evaluate(&program("print 1;")).unwrap_err();
        assert_eq!(err.kind, RuntimeErrorKind::Io);
    }
}
