use std::cell::RefCell;
use std::rc::Rc;

use crate::error::{RuntimeError, RuntimeErrorKind};
use crate::objects::pokemon::Pokemon;
use crate::objects::{
    Builtin, as_int, as_pokemon, check_argc, read_only, reject_named, roster_list, type_mismatch,
    unknown_method, unknown_property,
};
use crate::runtime::value::Value;
use crate::syntax::ast::Span;

/// A Safari zone: a ball/turn budget and the wild Pokémon still roaming it.
#[derive(Debug)]
pub struct Zone {
    pub balls: i64,
    pub turns: i64,
    wild: Vec<Rc<RefCell<Pokemon>>>,
}

/// Result of a single `throwBall`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrowOutcome {
    AlreadyCaught,
    NoBalls,
    GameOver,
    Caught,
    BrokeFree,
}

impl ThrowOutcome {
    /// Status lines printed for this outcome.
    pub fn messages(&self, name: &str) -> Vec<String> {
        match self {
            ThrowOutcome::AlreadyCaught => vec![format!("{name} has already been caught!")],
            ThrowOutcome::NoBalls       => vec!["You have no Safari Balls left!".to_string()],
            ThrowOutcome::GameOver      => vec!["The Safari Game is over!".to_string()],
            ThrowOutcome::Caught => vec![
                format!("You threw a Safari Ball at {name}!"),
                format!("Gotcha! {name} was caught!"),
            ],
            ThrowOutcome::BrokeFree => vec![
                format!("You threw a Safari Ball at {name}!"),
                format!("Oh no! {name} broke free!"),
            ],
        }
    }
}

impl Zone {
    pub fn new(balls: i64, turns: i64) -> Self {
        Self { balls, turns, wild: Vec::new() }
    }

    pub fn add_pokemon(&mut self, p: Rc<RefCell<Pokemon>>) {
        self.wild.push(p);
    }

    pub fn wild(&self) -> &[Rc<RefCell<Pokemon>>] {
        &self.wild
    }

    /// Throw one Safari Ball at `target`. A throw costs one ball and one turn;
    /// a caught Pokémon leaves the zone.
    pub fn throw_ball(&mut self, target: &Rc<RefCell<Pokemon>>) -> ThrowOutcome {
        if target.borrow().captured {
            return ThrowOutcome::AlreadyCaught;
        }
        if self.balls <= 0 {
            return ThrowOutcome::NoBalls;
        }
        if self.turns <= 0 {
            return ThrowOutcome::GameOver;
        }

        self.balls -= 1;
        self.turns -= 1;

        let mut p = target.borrow_mut();
        if p.is_catchable() {
            p.captured = true;
            self.wild.retain(|w| !Rc::ptr_eq(w, target));
            ThrowOutcome::Caught
        } else {
            ThrowOutcome::BrokeFree
        }
    }

    fn add_to_counter(counter: &mut i64, method: &str, args: &[Value], span: &Span) -> Result<Value, RuntimeError> {
        check_argc(method, args, 1, span)?;
        let amount = as_int(&args[0], &format!("`SafariZone->{method}`"), span)?;
        if amount < 0 {
            return Err(RuntimeError::new(
                RuntimeErrorKind::InvalidArgument,
                span,
                format!("`{method}` needs a non-negative amount, got {amount}"),
            ));
        }
        *counter = counter.checked_add(amount).ok_or_else(|| RuntimeError::new(
            RuntimeErrorKind::Overflow,
            span,
            format!("`{method}` overflowed the counter"),
        ))?;
        Ok(Value::Int(*counter))
    }
}

/// Counter writes truncate decimals and refuse negative results.
fn counter_value(name: &str, value: &Value, span: &Span) -> Result<i64, RuntimeError> {
    let n = value.coerce_int()
        .ok_or_else(|| type_mismatch(&format!("`SafariZone.{name}`"), "int", value, span))?;
    if n < 0 {
        return Err(RuntimeError::new(
            RuntimeErrorKind::InvalidArgument,
            span,
            format!("`SafariZone.{name}` cannot be negative (got {n})"),
        ));
    }
    Ok(n)
}

impl Builtin for Zone {
    fn type_name(&self) -> &'static str { "SafariZone" }

    fn get_property(&self, name: &str, span: &Span) -> Result<Value, RuntimeError> {
        match name {
            "balls"   => Ok(Value::Int(self.balls)),
            "turns"   => Ok(Value::Int(self.turns)),
            "pokemon" => Ok(roster_list(&self.wild)),
            _ => Err(unknown_property(self.type_name(), name, span)),
        }
    }

    fn set_property(&mut self, name: &str, value: Value, span: &Span) -> Result<(), RuntimeError> {
        match name {
            "balls"   => self.balls = counter_value(name, &value, span)?,
            "turns"   => self.turns = counter_value(name, &value, span)?,
            "pokemon" => return Err(read_only(self.type_name(), name, span)),
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
        reject_named(name, named, span)?;
        match name {
            "addBalls" => Zone::add_to_counter(&mut self.balls, name, args, span),
            "addTurns" => Zone::add_to_counter(&mut self.turns, name, args, span),
            "addPokemon" => {
                check_argc(name, args, 1, span)?;
                let p = as_pokemon(&args[0], "`SafariZone->addPokemon`", span)?;
                self.add_pokemon(p);
                Ok(Value::Int(self.wild.len() as i64))
            }
            _ => Err(unknown_method(self.type_name(), name, span)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span() -> Span { Span::default() }

    fn wild(name: &str, level: i64, friendliness: i64) -> Rc<RefCell<Pokemon>> {
        let mut p = Pokemon::new(name, level);
        p.friendliness = friendliness;
        Rc::new(RefCell::new(p))
    }

    #[test]
    fn counters_are_settable() {
        let mut zone = Zone::new(10, 20);
        zone.set_property("balls", Value::Int(9), &span()).unwrap();
        zone.set_property("turns", Value::Decimal(4.7), &span()).unwrap();
        assert_eq!((zone.balls, zone.turns), (9, 4));
    }

    #[test]
    fn negative_counter_is_rejected() {
        let mut zone = Zone::new(10, 20);
        let err = zone.set_property("balls", Value::Int(-1), &span()).unwrap_err();
        assert_eq!(err.kind, RuntimeErrorKind::InvalidArgument);
        let err = zone.set_property("balls", Value::Str("lots".into()), &span()).unwrap_err();
        assert_eq!(err.kind, RuntimeErrorKind::TypeMismatch);
        assert_eq!(zone.balls, 10);
    }

    #[test]
    fn pokemon_property_is_read_only() {
        let mut zone = Zone::new(1, 1);
        let err = zone.set_property("pokemon", Value::list(vec![]), &span()).unwrap_err();
        assert_eq!(err.kind, RuntimeErrorKind::ReadOnlyProperty);
    }

    #[test]
    fn add_methods_return_new_count() {
        let mut zone = Zone::new(1, 2);
        let v = zone.call_method("addBalls", &[Value::Int(4)], &[], &span()).unwrap();
        assert!(matches!(v, Value::Int(5)));
        let v = zone.call_method("addTurns", &[Value::Int(0)], &[], &span()).unwrap();
        assert!(matches!(v, Value::Int(2)));
    }

    #[test]
    fn add_methods_validate_amount() {
        let mut zone = Zone::new(i64::MAX, 0);
        let err = zone.call_method("addTurns", &[Value::Int(-3)], &[], &span()).unwrap_err();
        assert_eq!(err.kind, RuntimeErrorKind::InvalidArgument);
        let err = zone.call_method("addBalls", &[Value::Int(1)], &[], &span()).unwrap_err();
        assert_eq!(err.kind, RuntimeErrorKind::Overflow);
        let err = zone.call_method("addBalls", &[], &[], &span()).unwrap_err();
        assert_eq!(err.kind, RuntimeErrorKind::ArityMismatch);
        assert_eq!(zone.balls, i64::MAX);
    }

    #[test]
    fn successful_throw_catches_and_removes() {
        let mut zone = Zone::new(2, 2);
        let p = wild("Pikachu", 5, 50);
        zone.add_pokemon(p.clone());
        assert_eq!(zone.throw_ball(&p), ThrowOutcome::Caught);
        assert!(p.borrow().captured);
        assert!(zone.wild().is_empty());
        assert_eq!((zone.balls, zone.turns), (1, 1));
        assert_eq!(zone.throw_ball(&p), ThrowOutcome::AlreadyCaught);
        assert_eq!((zone.balls, zone.turns), (1, 1));
    }

    #[test]
    fn failed_throw_still_costs() {
        let mut zone = Zone::new(1, 5);
        let p = wild("Onix", 30, 10);
        zone.add_pokemon(p.clone());
        assert_eq!(zone.throw_ball(&p), ThrowOutcome::BrokeFree);
        assert_eq!(zone.wild().len(), 1);
        assert_eq!(zone.throw_ball(&p), ThrowOutcome::NoBalls);
        assert_eq!((zone.balls, zone.turns), (0, 4));
    }

    #[test]
    fn no_turns_ends_the_game() {
        let mut zone = Zone::new(3, 0);
        let p = wild("Abra", 1, 99);
        assert_eq!(zone.throw_ball(&p), ThrowOutcome::GameOver);
        assert!(!p.borrow().captured);
    }

    #[test]
    fn outcome_messages() {
        assert_eq!(
            ThrowOutcome::Caught.messages("Pikachu"),
            vec!["You threw a Safari Ball at Pikachu!", "Gotcha! Pikachu was caught!"]
        );
        assert_eq!(ThrowOutcome::NoBalls.messages("x"), vec!["You have no Safari Balls left!"]);
    }
}
