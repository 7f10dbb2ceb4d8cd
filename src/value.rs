//! Runtime value model.
//!
//! A closed union: every evaluation site matches exhaustively, there are
//! no dynamic downcasts. `Display` is the `stringify` contract used by
//! `print` and the REPL.

use crate::callable::LoxFunction;
use crate::class::{Instance, LoxClass};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Signature of a native (host-provided) function.
pub type NativeFn = fn(&[Value]) -> Result<Value, String>;

#[derive(Debug, Clone)]
pub enum Value {
    Nil,

    Bool(bool),

    Number(f64),

    String(String),

    NativeFunction {
        name: String,
        arity: usize,
        func: NativeFn,
    },

    Function(Rc<LoxFunction>),

    Class(Rc<LoxClass>),

    Instance(Rc<RefCell<Instance>>),
}

impl PartialEq for Value {
    /// `nil == nil` is true; same-typed primitives (Bool, Number,
    /// String) compare by value; everything else — cross-type pairs,
    /// and functions, classes, or instances even against themselves —
    /// compares false. No coercion, no identity comparison.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),

            Value::Bool(b) => write!(f, "{}", b),

            // Integral doubles lose the trailing ".0": 3.0 → "3".
            Value::Number(n) => {
                if n.fract() == 0.0 && n.is_finite() {
                    write!(f, "{:.0}", n)
                } else {
                    write!(f, "{}", n)
                }
            }

            Value::String(s) => write!(f, "{}", s),

            Value::NativeFunction { .. } => write!(f, "<native fn>"),

            Value::Function(fun) => write!(f, "<fn {}>", fun.name()),

            Value::Class(class) => write!(f, "{}", class.name()),

            Value::Instance(instance) => write!(f, "{} instance", instance.borrow().class_name()),
        }
    }
}
