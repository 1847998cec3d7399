//! Lexical environment chain.
//!
//! Frames are reference counted so a function value can keep its defining
//! frame alive after the block that created it has returned.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::mem;
use std::rc::Rc;

use crate::runtime::value::Value;

#[derive(Clone)]
pub struct Environment {
    frame: Rc<RefCell<Frame>>,
}

struct Frame {
    vars: HashMap<String, Value>,
    parent: Option<Environment>,
}

impl Environment {
    /// A parentless frame. Each interpreter owns exactly one.
    pub fn global() -> Self {
        Self { frame: Rc::new(RefCell::new(Frame { vars: HashMap::new(), parent: None })) }
    }

    pub fn child(&self) -> Self {
        Self {
            frame: Rc::new(RefCell::new(Frame { vars: HashMap::new(), parent: Some(self.clone()) })),
        }
    }

    /// Insert or overwrite in this frame only.
    pub fn define(&self, name: &str, value: Value) {
        self.frame.borrow_mut().vars.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        let frame = self.frame.borrow();
        match frame.vars.get(name) {
            Some(v) => Some(v.clone()),
            None => frame.parent.as_ref().and_then(|p| p.get(name)),
        }
    }

    /// Update the nearest existing binding. Returns `false` if there is none.
    pub fn assign(&self, name: &str, value: Value) -> bool {
        let mut frame = self.frame.borrow_mut();
        if let Some(slot) = frame.vars.get_mut(name) {
            *slot = value;
            return true;
        }
        match &frame.parent {
            Some(parent) => parent.assign(name, value),
            None => false,
        }
    }

    /// Assign, creating the binding in the global frame when no frame has it.
    /// Returns `true` if a new global was created.
    pub fn set(&self, name: &str, value: Value) -> bool {
        if self.assign(name, value.clone()) {
            return false;
        }
        self.root().define(name, value);
        true
    }

    pub fn root(&self) -> Environment {
        let mut env = self.clone();
        loop {
            let parent = env.frame.borrow().parent.clone();
            match parent {
                Some(p) => env = p,
                None => return env,
            }
        }
    }

    /// Bindings of this frame, sorted by name.
    pub fn bindings(&self) -> Vec<(String, Value)> {
        let mut out: Vec<_> = self.frame.borrow().vars.iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }

    pub fn ptr_eq(&self, other: &Environment) -> bool {
        Rc::ptr_eq(&self.frame, &other.frame)
    }

    /// Leave a frame. A function `define`d here captures the frame it is
    /// stored in, so the two keep each other alive; when nothing else holds
    /// the frame its bindings are dropped to break that cycle.
    pub fn release(self) {
        let own_closures = self.frame.borrow().vars.values()
            .filter(|v| matches!(v, Value::Function(f) if Rc::strong_count(f) == 1 && f.closure.ptr_eq(&self)))
            .count();
        if Rc::strong_count(&self.frame) == 1 + own_closures {
            let vars = mem::take(&mut self.frame.borrow_mut().vars);
            drop(vars);
        }
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let frame = self.frame.borrow();
        let mut names: Vec<_> = frame.vars.keys().collect();
        names.sort();
        f.debug_struct("Environment")
            .field("names", &names)
            .field("global", &frame.parent.is_none())
            .finish()
    }
}
