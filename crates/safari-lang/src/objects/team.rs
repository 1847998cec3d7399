use std::cell::RefCell;
use std::rc::Rc;

use crate::error::{RuntimeError, RuntimeErrorKind};
use crate::objects::pokemon::{self, Pokemon};
use crate::objects::{
    Builtin, Object, as_pokemon, as_str, check_argc, read_only, reject_named, roster_list,
    unknown_method, unknown_property,
};
use crate::runtime::value::{Value, values_equal};
use crate::syntax::ast::Span;

/// The player's roster. Pokémon are identified by name (case-sensitive).
#[derive(Debug, Default)]
pub struct Team {
    roster: Vec<Rc<RefCell<Pokemon>>>,
}

impl Team {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn len(&self) -> usize {
        self.roster.len()
    }

    pub fn add(&mut self, p: Rc<RefCell<Pokemon>>) {
        self.roster.push(p);
    }

    /// Remove every member with this name. Absence is not an error.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.roster.len();
        self.roster.retain(|p| p.borrow().name != name);
        self.roster.len() != before
    }

    pub fn find(&self, name: &str) -> Option<Rc<RefCell<Pokemon>>> {
        self.roster.iter().find(|p| p.borrow().name == name).cloned()
    }

    /// Members whose attributes equal every criterion. The roster is untouched.
    pub fn filter(&self, criteria: &[(String, Value)], span: &Span) -> Result<Vec<Rc<RefCell<Pokemon>>>, RuntimeError> {
        if criteria.is_empty() {
            return Err(RuntimeError::new(
                RuntimeErrorKind::InvalidArgument,
                span,
                "`filter` needs at least one `attribute=value` criterion",
            ));
        }
        if let Some((attr, _)) = criteria.iter().find(|(attr, _)| !pokemon::PROPERTIES.contains(&attr.as_str())) {
            return Err(unknown_property("Pokemon", attr, span));
        }

        let mut matches = Vec::new();
        for p in &self.roster {
            let member = p.borrow();
            let mut keep = true;
            for (attr, wanted) in criteria {
                if !values_equal(&member.get_property(attr, span)?, wanted) {
                    keep = false;
                    break;
                }
            }
            if keep {
                matches.push(p.clone());
            }
        }
        Ok(matches)
    }
}

impl Builtin for Team {
    fn type_name(&self) -> &'static str { "Team" }

    fn get_property(&self, name: &str, span: &Span) -> Result<Value, RuntimeError> {
        match name {
            "pokemon" => Ok(roster_list(&self.roster)),
            "size"    => Ok(Value::Int(self.len() as i64)),
            _ => Err(unknown_property(self.type_name(), name, span)),
        }
    }

    fn set_property(&mut self, name: &str, _value: Value, span: &Span) -> Result<(), RuntimeError> {
        match name {
            "pokemon" | "size" => Err(read_only(self.type_name(), name, span)),
            _ => Err(unknown_property(self.type_name(), name, span)),
        }
    }

    fn call_method(
        &mut self,
        name: &str,
        args: &[Value],
        named: &[(String, Value)],
        span: &Span,
    ) -> Result<Value, RuntimeError> {
        match name {
            "add" => {
                check_argc(name, args, 1, span)?;
                reject_named(name, named, span)?;
                let p = as_pokemon(&args[0], "`Team->add`", span)?;
                self.add(p);
                Ok(Value::Int(self.len() as i64))
            }
            "remove" => {
                check_argc(name, args, 1, span)?;
                reject_named(name, named, span)?;
                let target = as_str(&args[0], "`Team->remove`", span)?;
                Ok(Value::Bool(self.remove(target)))
            }
            "find" => {
                check_argc(name, args, 1, span)?;
                reject_named(name, named, span)?;
                let target = as_str(&args[0], "`Team->find`", span)?;
                self.find(target)
                    .map(|p| Value::Object(Object::Pokemon(p)))
                    .ok_or_else(|| RuntimeError::new(
                        RuntimeErrorKind::NotFound,
                        span,
                        format!("no Pokemon named \"{target}\" in the team"),
                    ))
            }
            "filter" => {
                check_argc(name, args, 0, span)?;
                Ok(roster_list(&self.filter(named, span)?))
            }
            _ => Err(unknown_method(self.type_name(), name, span)),
        }
    }
}
