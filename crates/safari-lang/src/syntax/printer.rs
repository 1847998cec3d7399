//! S-expression rendering of the AST, used by `--dump-ast` and the REPL's
//! `:ast` echo. Expressions print on one line; blocks break one statement
//! per line, indented two spaces per level.

use crate::syntax::ast::*;

pub fn format_program(program: &Program) -> String {
    program.statements.iter()
        .map(|s| format_stmt(s, 0))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_stmt(stmt: &Stmt, indent: usize) -> String {
    match stmt {
        Stmt::Expr(e) => format_expr(e),

        Stmt::Var(v) => match &v.initializer {
            Some(init) => format!("(var {} {})", v.name, format_expr(init)),
            None       => format!("(var {})", v.name),
        },

        Stmt::Print(e, _) => format!("(print {})", format_expr(e)),

        Stmt::If(i) => {
            let mut out = format!(
                "(if {} {}",
                format_expr(&i.condition),
                format_block(&i.then_block, indent + 2),
            );
            if let Some(else_block) = &i.else_block {
                out.push_str(&format!(" {}", format_block(else_block, indent + 2)));
            }
            out.push(')');
            out
        }

        Stmt::Block(stmts, _) => format_block(stmts, indent),

        Stmt::Repeat(r) => format!(
            "(repeat {} {})", format_expr(&r.count), format_block(&r.body, indent + 2),
        ),

        Stmt::Define(f) => format!(
            "(define {} ({}) {})", f.name, f.params.join(" "), format_block(&f.body, indent + 2),
        ),

        Stmt::ThrowBall(t) => format!("(throwBall {} {})", format_expr(&t.zone), format_expr(&t.target)),

        Stmt::Run(_) => "(run)".to_string(),
    }
}

fn format_block(stmts: &[Stmt], indent: usize) -> String {
    if stmts.is_empty() {
        return "(block)".to_string();
    }
    let pad = " ".repeat(indent);
    let body: Vec<String> = stmts.iter()
        .map(|s| format!("{pad}{}", format_stmt(s, indent)))
        .collect();
    format!("(block\n{})", body.join("\n"))
}

pub fn format_expr(expr: &Expr) -> String {
    match expr {
        Expr::Literal(lit, _) => format_literal(lit),

        Expr::List(items, _) if items.is_empty() => "(list)".to_string(),
        Expr::List(items, _) => format!("(list {})", join_exprs(items)),

        Expr::Variable(name, _) => name.clone(),

        Expr::Unary { op, operand, .. } => {
            let op = match op { UnOp::Neg => "-", UnOp::Not => "not" };
            format!("({op} {})", format_expr(operand))
        }

        Expr::Binary { left, op, right, .. } => {
            format!("({} {} {})", op.symbol(), format_expr(left), format_expr(right))
        }

        Expr::Logical { left, op, right, .. } => {
            let op = match op { LogicalOp::And => "and", LogicalOp::Or => "or" };
            format!("({op} {} {})", format_expr(left), format_expr(right))
        }

        Expr::Assign { target, value, .. } => {
            format!("(= {} {})", format_expr(target), format_expr(value))
        }

        Expr::Call { callee, args, .. } if args.is_empty() => format!("(call {})", format_expr(callee)),
        Expr::Call { callee, args, .. } => format!("(call {} {})", format_expr(callee), join_exprs(args)),

        Expr::Property { object, name, .. } => format!("(. {} {name})", format_expr(object)),

        Expr::MethodCall { object, method, args, named_args, .. } => {
            let mut parts = vec![format_expr(object), method.clone()];
            parts.extend(args.iter().map(format_expr));
            parts.extend(named_args.iter().map(|(k, v)| format!("{k}={}", format_expr(v))));
            format!("(-> {})", parts.join(" "))
        }
    }
}

fn format_literal(lit: &Literal) -> String {
    match lit {
        Literal::Int(n)     => n.to_string(),
        Literal::Decimal(d) => format!("{d:?}"),
        Literal::Str(s)     => format!("{s:?}"),
        Literal::Bool(b)    => b.to_string(),
        Literal::Null       => "null".to_string(),
    }
}

fn join_exprs(exprs: &[Expr]) -> String {
    exprs.iter().map(format_expr).collect::<Vec<_>>().join(" ")
}
