//! Lexical environments: a chain of scope frames.
//!
//! Each [`Env`] is a handle to a shared, mutable [`Frame`] — cloning an
//! `Env` is cheap (an `Rc` bump) and gives every clone a view onto the
//! same bindings, which is exactly what's needed when a closure-free
//! interpreter still wants several live references to "the current
//! block's scope" (the evaluator, and nothing else, ever holds one).
//!
//! Lookup (`get`) and mutation of an existing binding (`assign`) walk
//! outward through `parent` until a frame defines the name or the chain
//! runs out. `define` always writes into the frame it's called on —
//! never the enclosing one — which is what gives inner declarations
//! their shadowing behavior: a `block`'s `int x;` never touches an outer
//! `x`, but `x = 1;` inside that same block does, because `assign` keeps
//! climbing past frames that don't already bind the name.

use std::cell::RefCell;
use std::rc::Rc;

use pebble_util::Symbol;
use rustc_hash::FxHashMap;

use crate::value::Value;

struct Frame {
    bindings: FxHashMap<Symbol, Value>,
    parent: Option<Env>,
}

#[derive(Clone)]
pub struct Env(Rc<RefCell<Frame>>);

impl Env {
    /// A fresh scope with no parent — used once per run, for globals.
    pub fn root() -> Self {
        Env(Rc::new(RefCell::new(Frame {
            bindings: FxHashMap::default(),
            parent: None,
        })))
    }

    /// A fresh scope nested inside `self`.
    pub fn child(&self) -> Self {
        Env(Rc::new(RefCell::new(Frame {
            bindings: FxHashMap::default(),
            parent: Some(self.clone()),
        })))
    }

    /// Binds `name` in this frame, shadowing any outer binding of the
    /// same name for the rest of this scope's lifetime.
    pub fn define(&self, name: Symbol, value: Value) {
        self.0.borrow_mut().bindings.insert(name, value);
    }

    /// Looks up `name`, walking outward through enclosing frames.
    pub fn get(&self, name: Symbol) -> Option<Value> {
        let frame = self.0.borrow();
        if let Some(value) = frame.bindings.get(&name) {
            return Some(value.clone());
        }
        frame.parent.as_ref()?.get(name)
    }

    /// Assigns to the nearest existing binding of `name`, walking outward.
    /// Returns `false` if no frame in the chain defines `name` — the
    /// caller reports this as an undefined-variable runtime error.
    pub fn assign(&self, name: Symbol, value: Value) -> bool {
        let mut frame = self.0.borrow_mut();
        if frame.bindings.contains_key(&name) {
            frame.bindings.insert(name, value);
            return true;
        }
        let parent = frame.parent.clone();
        drop(frame);
        match parent {
            Some(parent) => parent.assign(name, value),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pebble_util::Interner;

    #[test]
    fn inner_define_shadows_without_mutating_outer() {
        let mut interner = Interner::new();
        let x = interner.intern("x");

        let outer = Env::root();
        outer.define(x, Value::Int(1));

        let inner = outer.child();
        inner.define(x, Value::Int(2));

        assert_eq!(inner.get(x), Some(Value::Int(2)));
        assert_eq!(outer.get(x), Some(Value::Int(1)));
    }

    #[test]
    fn assign_climbs_to_the_owning_frame() {
        let mut interner = Interner::new();
        let x = interner.intern("x");

        let outer = Env::root();
        outer.define(x, Value::Int(1));
        let inner = outer.child();

        assert!(inner.assign(x, Value::Int(9)));
        assert_eq!(outer.get(x), Some(Value::Int(9)));
    }

    #[test]
    fn assign_to_unbound_name_fails() {
        let mut interner = Interner::new();
        let x = interner.intern("x");
        let env = Env::root();
        assert!(!env.assign(x, Value::Int(1)));
    }
}
