use std::{cell::RefCell, rc::Rc};

use indexmap::IndexMap;

use crate::value::Value;

pub type EnvironmentRef = Rc<RefCell<Environment>>;

/// A scope of name bindings with an optional enclosing scope. Lookup walks
/// outward; writes always land in the innermost scope, so `let` shadows
/// rather than mutates an outer binding.
#[derive(Debug, Default)]
pub struct Environment {
    outer: Option<EnvironmentRef>,
    bindings: IndexMap<String, Value>,
}

impl Environment {
    pub fn new() -> EnvironmentRef {
        Rc::new(RefCell::new(Self::default()))
    }

    pub fn enclosing(outer: EnvironmentRef) -> EnvironmentRef {
        Rc::new(RefCell::new(Self {
            outer: Some(outer),
            bindings: IndexMap::new(),
        }))
    }

    pub fn set(&mut self, name: String, value: Value) {
        self.bindings.insert(name, value);
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.bindings.get(name) {
            return Some(value.clone());
        }
        self.outer.as_ref().and_then(|outer| outer.borrow().get(name))
    }
}
