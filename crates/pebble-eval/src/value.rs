//! Runtime values.
//!
//! A [`Value`] is what the evaluator actually passes around — distinct
//! from [`pebble_par::ast::LiteralValue`], which only knows how to spell
//! a constant in source text. Strings are `Rc<str>` rather than interned
//! symbols: unlike identifiers, runtime strings are built by
//! concatenation and slicing at every call, so there's no fixed table to
//! intern them into. Arrays are `Rc<RefCell<Vec<Value>>>` so that
//! passing an array into a function shares the same backing storage —
//! mutating it through one name is visible through every other name
//! bound to the same array.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use pebble_par::ast::Type;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Str(Rc<str>),
    Bool(bool),
    Array(Rc<RefCell<Vec<Value>>>),
    /// The result of a call to a `void` function, or a `return;` with no
    /// expression. Never produced by a literal, never stored in a
    /// variable — only ever the right-hand side of a discarded
    /// expression statement.
    Absent,
}

impl Value {
    pub fn new_array(elements: Vec<Value>) -> Value {
        Value::Array(Rc::new(RefCell::new(elements)))
    }

    /// The zero value for a declared-but-uninitialized binding of `ty`.
    pub fn default_for(ty: Type) -> Value {
        match ty {
            Type::Int => Value::Int(0),
            Type::String => Value::Str(Rc::from("")),
            Type::Bool => Value::Bool(false),
            Type::Void => Value::Absent,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Str(_) => "string",
            Value::Bool(_) => "bool",
            Value::Array(_) => "array",
            Value::Absent => "void",
        }
    }

    pub fn as_array(&self) -> Option<&Rc<RefCell<Vec<Value>>>> {
        match self {
            Value::Array(cell) => Some(cell),
            _ => None,
        }
    }

    /// General truthiness for `&&`, `||`, and unary `!`: nonzero integers,
    /// nonempty strings, and `true` are truthy. Arrays and `Absent` have
    /// no truth value.
    pub fn truthy(&self) -> Option<bool> {
        match self {
            Value::Int(n) => Some(*n != 0),
            Value::Str(s) => Some(!s.is_empty()),
            Value::Bool(b) => Some(*b),
            Value::Array(_) | Value::Absent => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::Bool(b) => write!(f, "{}", if *b { "true" } else { "false" }),
            Value::Array(cell) => {
                write!(f, "[")?;
                for (i, elem) in cell.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{elem}")?;
                }
                write!(f, "]")
            }
            Value::Absent => Ok(()),
        }
    }
}
