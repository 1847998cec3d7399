use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::objects::Object;
use crate::runtime::env::Environment;
use crate::runtime::natives::NativeFn;
use crate::syntax::ast::{Literal, Stmt};

#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Decimal(f64),
    Str(String),
    List(Rc<RefCell<Vec<Value>>>),
    Object(Object),
    Function(Rc<Function>),
    Native(NativeFn),
}

/// A user-defined function together with the frame it was defined in.
pub struct Function {
    pub name: String,
    pub params: Vec<String>,
    pub body: Rc<Vec<Stmt>>,
    pub closure: Environment,
}

// The closure frame usually contains the function itself.
impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl Value {
    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Rc::new(RefCell::new(items)))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null        => "null",
            Value::Bool(_)     => "bool",
            Value::Int(_)      => "int",
            Value::Decimal(_)  => "decimal",
            Value::Str(_)      => "string",
            Value::List(_)     => "list",
            Value::Object(o)   => o.type_name(),
            Value::Function(_) => "function",
            Value::Native(_)   => "native function",
        }
    }

    /// `null` and `false` are falsy; every other value is truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Null | Value::Bool(false))
    }

    /// Integer view used by coercing writes: decimals truncate toward zero.
    pub fn coerce_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::Decimal(d) if d.is_finite() && *d >= i64::MIN as f64 && *d < i64::MAX as f64 => {
                Some(d.trunc() as i64)
            }
            _ => None,
        }
    }

    /// String view used by coercing writes.
    pub fn coerce_string(&self) -> Option<String> {
        match self {
            Value::Str(s) => Some(s.clone()),
            Value::Int(_) | Value::Decimal(_) | Value::Bool(_) => Some(self.to_string()),
            _ => None,
        }
    }
}

impl From<Literal> for Value {
    fn from(lit: Literal) -> Self {
        match lit {
            Literal::Int(n)     => Value::Int(n),
            Literal::Decimal(d) => Value::Decimal(d),
            Literal::Str(s)     => Value::Str(s),
            Literal::Bool(b)    => Value::Bool(b),
            Literal::Null       => Value::Null,
        }
    }
}

/// Structural equality. Ints and decimals compare numerically; objects and
/// functions compare by identity.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null,       Value::Null)       => true,
        (Value::Bool(x),    Value::Bool(y))    => x == y,
        (Value::Int(x),     Value::Int(y))     => x == y,
        (Value::Decimal(x), Value::Decimal(y)) => x == y,
        (Value::Int(x),     Value::Decimal(y)) => (*x as f64) == *y,
        (Value::Decimal(x), Value::Int(y))     => *x == (*y as f64),
        (Value::Str(x),     Value::Str(y))     => x == y,
        (Value::List(x),    Value::List(y))    => {
            if Rc::ptr_eq(x, y) { return true; }
            let (x, y) = (x.borrow(), y.borrow());
            x.len() == y.len() && x.iter().zip(y.iter()).all(|(a, b)| values_equal(a, b))
        }
        (Value::Object(x),   Value::Object(y))   => x.ptr_eq(y),
        (Value::Function(x), Value::Function(y)) => Rc::ptr_eq(x, y),
        (Value::Native(x),   Value::Native(y))   => x == y,
        _ => false,
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null        => f.write_str("null"),
            Value::Bool(b)     => write!(f, "{b}"),
            Value::Int(n)      => write!(f, "{n}"),
            Value::Decimal(d)  => write!(f, "{d}"),
            Value::Str(s)      => f.write_str(s),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.borrow().iter().enumerate() {
                    if i > 0 { f.write_str(", ")?; }
                    match item {
                        Value::Str(s) => write!(f, "{s:?}")?,
                        other         => write!(f, "{other}")?,
                    }
                }
                f.write_str("]")
            }
            Value::Object(o)    => write!(f, "{o}"),
            Value::Function(fv) => write!(f, "<fn {}>", fv.name),
            Value::Native(n)    => write!(f, "<native {}>", n.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthiness() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(Value::Bool(true).is_truthy());
        assert!(Value::Int(0).is_truthy());
        assert!(Value::Str(String::new()).is_truthy());
        assert!(Value::list(vec![]).is_truthy());
    }

    #[test]
    fn numeric_equality_crosses_int_and_decimal() {
        assert!(values_equal(&Value::Int(3), &Value::Decimal(3.0)));
        assert!(!values_equal(&Value::Int(3), &Value::Decimal(3.5)));
        assert!(!values_equal(&Value::Int(1), &Value::Bool(true)));
        assert!(!values_equal(&Value::Null, &Value::Int(0)));
    }

    #[test]
    fn lists_compare_element_wise() {
        let a = Value::list(vec![Value::Int(1), Value::Str("a".into())]);
        let b = Value::list(vec![Value::Int(1), Value::Str("a".into())]);
        let c = Value::list(vec![Value::Int(1)]);
        assert!(values_equal(&a, &b));
        assert!(!values_equal(&a, &c));
    }

    #[test]
    fn display_forms() {
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(Value::Decimal(2.5).to_string(), "2.5");
        assert_eq!(Value::Str("raw".into()).to_string(), "raw");
        let list = Value::list(vec![Value::Int(1), Value::Str("b".into()), Value::Null]);
        assert_eq!(list.to_string(), "[1, \"b\", null]");
        assert_eq!(Value::Native(NativeFn::Len).to_string(), "<native len>");
    }

    #[test]
    fn coercions() {
        assert_eq!(Value::Decimal(7.9).coerce_int(), Some(7));
        assert_eq!(Value::Decimal(-7.9).coerce_int(), Some(-7));
        assert_eq!(Value::Decimal(f64::NAN).coerce_int(), None);
        assert_eq!(Value::Str("5".into()).coerce_int(), None);
        assert_eq!(Value::Bool(true).coerce_string().as_deref(), Some("true"));
        assert_eq!(Value::Null.coerce_string(), None);
    }
}
