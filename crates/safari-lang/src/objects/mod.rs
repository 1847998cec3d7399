//! Built-in object kinds: Safari zone, team and Pokémon.
//!
//! The set is closed. Each kind implements [`Builtin`], and [`Object`] is the
//! tagged handle the evaluator stores inside values. Every handle is an
//! `Rc<RefCell<_>>`, so a Pokémon held by a team, a zone and a variable is one
//! shared instance.

pub mod pokemon;
pub mod team;
pub mod zone;

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::error::{RuntimeError, RuntimeErrorKind};
use crate::runtime::value::Value;
use crate::syntax::ast::Span;

pub use pokemon::Pokemon;
pub use team::Team;
pub use zone::{ThrowOutcome, Zone};

/// Capability contract shared by the three object kinds.
pub trait Builtin {
    fn type_name(&self) -> &'static str;

    fn get_property(&self, name: &str, span: &Span) -> Result<Value, RuntimeError>;

    fn set_property(&mut self, name: &str, value: Value, span: &Span) -> Result<(), RuntimeError>;

    fn call_method(
        &mut self,
        name: &str,
        args: &[Value],
        named: &[(String, Value)],
        span: &Span,
    ) -> Result<Value, RuntimeError>;
}

// ─── Handle ──────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub enum Object {
    Zone(Rc<RefCell<Zone>>),
    Team(Rc<RefCell<Team>>),
    Pokemon(Rc<RefCell<Pokemon>>),
}

impl Object {
    pub fn zone(zone: Zone) -> Self { Object::Zone(Rc::new(RefCell::new(zone))) }
    pub fn team(team: Team) -> Self { Object::Team(Rc::new(RefCell::new(team))) }
    pub fn pokemon(p: Pokemon) -> Self { Object::Pokemon(Rc::new(RefCell::new(p))) }

    pub fn type_name(&self) -> &'static str {
        match self {
            Object::Zone(_)    => "SafariZone",
            Object::Team(_)    => "Team",
            Object::Pokemon(_) => "Pokemon",
        }
    }

    pub fn get_property(&self, name: &str, span: &Span) -> Result<Value, RuntimeError> {
        match self {
            Object::Zone(z)    => z.borrow().get_property(name, span),
            Object::Team(t)    => t.borrow().get_property(name, span),
            Object::Pokemon(p) => p.borrow().get_property(name, span),
        }
    }

    pub fn set_property(&self, name: &str, value: Value, span: &Span) -> Result<(), RuntimeError> {
        match self {
            Object::Zone(z)    => z.borrow_mut().set_property(name, value, span),
            Object::Team(t)    => t.borrow_mut().set_property(name, value, span),
            Object::Pokemon(p) => p.borrow_mut().set_property(name, value, span),
        }
    }

    pub fn call_method(
        &self,
        name: &str,
        args: &[Value],
        named: &[(String, Value)],
        span: &Span,
    ) -> Result<Value, RuntimeError> {
        match self {
            Object::Zone(z)    => z.borrow_mut().call_method(name, args, named, span),
            Object::Team(t)    => t.borrow_mut().call_method(name, args, named, span),
            Object::Pokemon(p) => p.borrow_mut().call_method(name, args, named, span),
        }
    }

    pub fn ptr_eq(&self, other: &Object) -> bool {
        match (self, other) {
            (Object::Zone(a),    Object::Zone(b))    => Rc::ptr_eq(a, b),
            (Object::Team(a),    Object::Team(b))    => Rc::ptr_eq(a, b),
            (Object::Pokemon(a), Object::Pokemon(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Object::Zone(z) => {
                let z = z.borrow();
                write!(f, "<SafariZone balls={} turns={}>", z.balls, z.turns)
            }
            Object::Team(t) => write!(f, "<Team size={}>", t.borrow().len()),
            Object::Pokemon(p) => {
                let p = p.borrow();
                write!(f, "<Pokemon {} lv.{}>", p.name, p.level)
            }
        }
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

// ─── Argument helpers ────────────────────────────────────────────────────────

pub(crate) fn check_argc(name: &str, args: &[Value], n: usize, span: &Span) -> Result<(), RuntimeError> {
    if args.len() != n {
        Err(RuntimeError::new(
            RuntimeErrorKind::ArityMismatch,
            span,
            format!("`{name}` expects {n} argument(s), got {}", args.len()),
        ))
    } else {
        Ok(())
    }
}

pub(crate) fn reject_named(name: &str, named: &[(String, Value)], span: &Span) -> Result<(), RuntimeError> {
    match named.first() {
        Some((key, _)) => Err(RuntimeError::new(
            RuntimeErrorKind::InvalidArgument,
            span,
            format!("`{name}` does not take named arguments (got `{key}=`)"),
        )),
        None => Ok(()),
    }
}

pub(crate) fn as_int(v: &Value, what: &str, span: &Span) -> Result<i64, RuntimeError> {
    match v {
        Value::Int(n) => Ok(*n),
        other => Err(type_mismatch(what, "int", other, span)),
    }
}

pub(crate) fn as_str<'v>(v: &'v Value, what: &str, span: &Span) -> Result<&'v str, RuntimeError> {
    match v {
        Value::Str(s) => Ok(s),
        other => Err(type_mismatch(what, "string", other, span)),
    }
}

pub(crate) fn as_pokemon(v: &Value, what: &str, span: &Span) -> Result<Rc<RefCell<Pokemon>>, RuntimeError> {
    match v {
        Value::Object(Object::Pokemon(p)) => Ok(p.clone()),
        other => Err(type_mismatch(what, "Pokemon", other, span)),
    }
}

pub(crate) fn type_mismatch(what: &str, expected: &str, got: &Value, span: &Span) -> RuntimeError {
    RuntimeError::new(
        RuntimeErrorKind::TypeMismatch,
        span,
        format!("{what} expects {expected}, got {}", got.type_name()),
    )
}

pub(crate) fn unknown_property(type_name: &str, name: &str, span: &Span) -> RuntimeError {
    RuntimeError::new(
        RuntimeErrorKind::UnknownProperty,
        span,
        format!("`{type_name}` has no property `{name}`"),
    )
}

pub(crate) fn read_only(type_name: &str, name: &str, span: &Span) -> RuntimeError {
    RuntimeError::new(
        RuntimeErrorKind::ReadOnlyProperty,
        span,
        format!("`{type_name}.{name}` is read-only"),
    )
}

pub(crate) fn unknown_method(type_name: &str, name: &str, span: &Span) -> RuntimeError {
    RuntimeError::new(
        RuntimeErrorKind::UnknownMethod,
        span,
        format!("`{type_name}` has no method `{name}`"),
    )
}

/// Roster snapshot as a fresh list value sharing the Pokémon instances.
pub(crate) fn roster_list(roster: &[Rc<RefCell<Pokemon>>]) -> Value {
    Value::list(roster.iter().map(|p| Value::Object(Object::Pokemon(p.clone()))).collect())
}
