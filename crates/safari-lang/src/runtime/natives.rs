//! Always-available native functions, bound in every global frame.
//! Includes the object constructors and `len`.

use crate::error::{RuntimeError, RuntimeErrorKind};
use crate::objects::{Object, Pokemon, Team, Zone, as_str, check_argc, type_mismatch};
use crate::runtime::env::Environment;
use crate::runtime::value::Value;
use crate::syntax::ast::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeFn {
    SafariZone,
    Team,
    Pokemon,
    Len,
}

impl NativeFn {
    pub const ALL: [NativeFn; 4] = [NativeFn::SafariZone, NativeFn::Team, NativeFn::Pokemon, NativeFn::Len];

    pub fn name(&self) -> &'static str {
        match self {
            NativeFn::SafariZone => "SafariZone",
            NativeFn::Team       => "Team",
            NativeFn::Pokemon    => "Pokemon",
            NativeFn::Len        => "len",
        }
    }

    pub fn call(&self, args: &[Value], span: &Span) -> Result<Value, RuntimeError> {
        match self {
            NativeFn::SafariZone => {
                check_argc("SafariZone", args, 2, span)?;
                let balls = non_negative("SafariZone", "balls", &args[0], span)?;
                let turns = non_negative("SafariZone", "turns", &args[1], span)?;
                Ok(Value::Object(Object::zone(Zone::new(balls, turns))))
            }

            NativeFn::Team => {
                check_argc("Team", args, 0, span)?;
                Ok(Value::Object(Object::team(Team::new())))
            }

            NativeFn::Pokemon => {
                if !(2..=5).contains(&args.len()) {
                    return Err(RuntimeError::new(
                        RuntimeErrorKind::ArityMismatch,
                        span,
                        format!("`Pokemon` expects 2 to 5 arguments, got {}", args.len()),
                    ));
                }
                let name = as_str(&args[0], "`Pokemon` name", span)?;
                let mut p = Pokemon::new(name, int_arg("Pokemon", "level", &args[1], span)?);
                if let Some(v) = args.get(2) {
                    p.nature = as_str(v, "`Pokemon` nature", span)?.to_string();
                }
                if let Some(v) = args.get(3) {
                    p.behavior = as_str(v, "`Pokemon` behavior", span)?.to_string();
                }
                if let Some(v) = args.get(4) {
                    p.friendliness = int_arg("Pokemon", "friendliness", v, span)?;
                }
                Ok(Value::Object(Object::pokemon(p)))
            }

            NativeFn::Len => {
                check_argc("len", args, 1, span)?;
                match &args[0] {
                    Value::List(items) => Ok(Value::Int(items.borrow().len() as i64)),
                    Value::Str(s)      => Ok(Value::Int(s.chars().count() as i64)),
                    other => Err(type_mismatch("`len`", "list or string", other, span)),
                }
            }
        }
    }
}

/// Bind every native under its name.
pub fn install(env: &Environment) {
    for native in NativeFn::ALL {
        env.define(native.name(), Value::Native(native));
    }
}

fn int_arg(func: &str, param: &str, v: &Value, span: &Span) -> Result<i64, RuntimeError> {
    v.coerce_int().ok_or_else(|| type_mismatch(&format!("`{func}` {param}"), "int", v, span))
}

fn non_negative(func: &str, param: &str, v: &Value, span: &Span) -> Result<i64, RuntimeError> {
    let n = int_arg(func, param, v, span)?;
    if n < 0 {
        return Err(RuntimeError::new(
            RuntimeErrorKind::InvalidArgument,
            span,
            format!("`{func}` {param} cannot be negative (got {n})"),
        ));
    }
    Ok(n)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(native: NativeFn, args: &[Value]) -> Result<Value, RuntimeError> {
        native.call(args, &Span::default())
    }

    #[test]
    fn install_binds_all_names() {
        let env = Environment::global();
        install(&env);
        for name in ["SafariZone", "Team", "Pokemon", "len"] {
            assert!(matches!(env.get(name), Some(Value::Native(_))), "{name}");
        }
    }

    #[test]
    fn zone_constructor() {
        let v = call(NativeFn::SafariZone, &[Value::Int(10), Value::Int(20)]).unwrap();
        assert_eq!(v.to_string(), "<SafariZone balls=10 turns=20>");
        let err = call(NativeFn::SafariZone, &[Value::Int(-1), Value::Int(20)]).unwrap_err();
        assert_eq!(err.kind, RuntimeErrorKind::InvalidArgument);
        let err = call(NativeFn::SafariZone, &[Value::Int(1)]).unwrap_err();
        assert_eq!(err.kind, RuntimeErrorKind::ArityMismatch);
    }

    #[test]
    fn pokemon_constructor_defaults_and_overrides() {
        let v = call(NativeFn::Pokemon, &[Value::Str("Pikachu".into()), Value::Int(5)]).unwrap();
        let Value::Object(Object::Pokemon(p)) = v else { panic!("expected Pokemon") };
        assert_eq!(*p.borrow(), Pokemon::new("Pikachu", 5));

        let v = call(NativeFn::Pokemon, &[
            Value::Str("Onix".into()),
            Value::Int(12),
            Value::Str("Bold".into()),
            Value::Str("angry".into()),
            Value::Int(5),
        ]).unwrap();
        let Value::Object(Object::Pokemon(p)) = v else { panic!("expected Pokemon") };
        let p = p.borrow();
        assert_eq!((p.nature.as_str(), p.behavior.as_str(), p.friendliness), ("Bold", "angry", 5));
    }

    #[test]
    fn pokemon_constructor_type_errors() {
        let err = call(NativeFn::Pokemon, &[Value::Int(1), Value::Int(5)]).unwrap_err();
        assert_eq!(err.kind, RuntimeErrorKind::TypeMismatch);
        let err = call(NativeFn::Pokemon, &[Value::Str("A".into())]).unwrap_err();
        assert_eq!(err.kind, RuntimeErrorKind::ArityMismatch);
    }

    #[test]
    fn len_of_list_and_string() {
        let list = Value::list(vec![Value::Int(1), Value::Int(2)]);
        assert!(matches!(call(NativeFn::Len, &[list]), Ok(Value::Int(2))));
        assert!(matches!(call(NativeFn::Len, &[Value::Str("héllo".into())]), Ok(Value::Int(5))));
        let err = call(NativeFn::Len, &[Value::Int(3)]).unwrap_err();
        assert_eq!(err.kind, RuntimeErrorKind::TypeMismatch);
    }
}
