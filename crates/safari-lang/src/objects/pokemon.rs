use crate::error::RuntimeError;
use crate::objects::{Builtin, check_argc, read_only, reject_named, type_mismatch, unknown_method, unknown_property};
use crate::runtime::value::Value;
use crate::syntax::ast::Span;

pub const DEFAULT_NATURE: &str = "Hardy";
pub const DEFAULT_BEHAVIOR: &str = "calm";
pub const DEFAULT_FRIENDLINESS: i64 = 50;

/// Attribute names readable on a Pokémon, in display order.
pub const PROPERTIES: &[&str] = &["name", "level", "nature", "behavior", "friendliness", "captured"];

#[derive(Debug, Clone, PartialEq)]
pub struct Pokemon {
    pub name: String,
    pub level: i64,
    pub nature: String,
    pub behavior: String,
    pub friendliness: i64,
    pub captured: bool,
}

impl Pokemon {
    pub fn new(name: impl Into<String>, level: i64) -> Self {
        Self {
            name: name.into(),
            level,
            nature: DEFAULT_NATURE.to_string(),
            behavior: DEFAULT_BEHAVIOR.to_string(),
            friendliness: DEFAULT_FRIENDLINESS,
            captured: false,
        }
    }

    /// A throw succeeds when the Pokémon is at least as friendly as it is strong.
    pub fn is_catchable(&self) -> bool {
        self.friendliness >= self.level
    }

    pub fn describe(&self) -> String {
        format!(
            "{} (lv.{}, {} nature, {}, friendliness {}, {})",
            self.name,
            self.level,
            self.nature,
            self.behavior,
            self.friendliness,
            if self.captured { "caught" } else { "wild" },
        )
    }
}

impl Builtin for Pokemon {
    fn type_name(&self) -> &'static str { "Pokemon" }

    fn get_property(&self, name: &str, span: &Span) -> Result<Value, RuntimeError> {
        match name {
            "name"         => Ok(Value::Str(self.name.clone())),
            "level"        => Ok(Value::Int(self.level)),
            "nature"       => Ok(Value::Str(self.nature.clone())),
            "behavior"     => Ok(Value::Str(self.behavior.clone())),
            "friendliness" => Ok(Value::Int(self.friendliness)),
            "captured"     => Ok(Value::Bool(self.captured)),
            _ => Err(unknown_property(self.type_name(), name, span)),
        }
    }

    fn set_property(&mut self, name: &str, value: Value, span: &Span) -> Result<(), RuntimeError> {
        let what = format!("`Pokemon.{name}`");
        match name {
            "name" => return Err(read_only(self.type_name(), name, span)),
            "level" | "friendliness" => {
                let n = value.coerce_int().ok_or_else(|| type_mismatch(&what, "int", &value, span))?;
                if name == "level" { self.level = n } else { self.friendliness = n }
            }
            "nature" | "behavior" => {
                let s = value.coerce_string().ok_or_else(|| type_mismatch(&what, "string", &value, span))?;
                if name == "nature" { self.nature = s } else { self.behavior = s }
            }
            "captured" => match value {
                Value::Bool(b) => self.captured = b,
                other => return Err(type_mismatch(&what, "bool", &other, span)),
            },
            _ => return Err(unknown_property(self.type_name(), name, span)),
        }
        Ok(())
    }

    fn call_method(
        &mut self,
        name: &str,
        args: &[Value],
        named: &[(String, Value)],
        span: &Span,
    ) -> Result<Value, RuntimeError> {
        match name {
            "describe" => {
                check_argc(name, args, 0, span)?;
                reject_named(name, named, span)?;
                Ok(Value::Str(self.describe()))
            }
            _ => Err(unknown_method(self.type_name(), name, span)),
        }
    }
}
