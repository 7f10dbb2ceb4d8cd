//! User-defined function values and the native `clock`.
//!
//! A `LoxFunction` pairs a shared declaration with the environment that
//! was current at its point of declaration. Calls always parent the new
//! frame at that captured closure — never at the caller's environment —
//! which is what makes scoping lexical rather than dynamic.

use crate::ast::FunctionDecl;
use crate::class::Instance;
use crate::environment::Environment;
use crate::error::RuntimeError;
use crate::interpreter::{Interpreter, Interrupt};
use crate::value::Value;
use log::debug;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Clone)]
pub struct LoxFunction {
    declaration: Rc<FunctionDecl>,
    closure: Rc<RefCell<Environment>>,
    is_initializer: bool,
}

impl LoxFunction {
    pub fn new(
        declaration: Rc<FunctionDecl>,
        closure: Rc<RefCell<Environment>>,
        is_initializer: bool,
    ) -> Self {
        Self {
            declaration,
            closure,
            is_initializer,
        }
    }

    pub fn name(&self) -> &str {
        &self.declaration.name.lexeme
    }

    pub fn arity(&self) -> usize {
        self.declaration.params.len()
    }

    /// Produce a copy of this function whose closure is a fresh one-entry
    /// environment defining `this` — how a method remembers its receiver
    /// once it has been pulled off an instance.
    pub fn bind(&self, instance: Rc<RefCell<Instance>>) -> LoxFunction {
        let environment = Rc::new(RefCell::new(Environment::with_enclosing(Rc::clone(
            &self.closure,
        ))));

        environment
            .borrow_mut()
            .define("this", Value::Instance(instance));

        LoxFunction::new(Rc::clone(&self.declaration), environment, self.is_initializer)
    }

    /// Invoke the function: one fresh environment parented at the
    /// captured closure, parameters bound positionally, body run as a
    /// block. Falling off the end yields `nil`; a return signal yields
    /// its payload; an initializer yields `this` in both cases, even for
    /// an explicit bare `return;`.
    pub fn call(
        &self,
        interpreter: &mut Interpreter,
        arguments: &[Value],
    ) -> Result<Value, RuntimeError> {
        debug!("Calling <fn {}>", self.name());

        let environment = Rc::new(RefCell::new(Environment::with_enclosing(Rc::clone(
            &self.closure,
        ))));

        for (param, argument) in self.declaration.params.iter().zip(arguments.iter()) {
            environment
                .borrow_mut()
                .define(&param.lexeme, argument.clone());
        }

        match interpreter.execute_block(&self.declaration.body, environment) {
            Ok(()) => {
                if self.is_initializer {
                    self.this_value()
                } else {
                    Ok(Value::Nil)
                }
            }

            Err(Interrupt::Return(value)) => {
                if self.is_initializer {
                    self.this_value()
                } else {
                    Ok(value)
                }
            }

            Err(Interrupt::Fault(fault)) => Err(fault),
        }
    }

    /// For initializers, `this` sits in the bound closure itself.
    fn this_value(&self) -> Result<Value, RuntimeError> {
        Environment::get_at(&self.closure, 0, "this", self.declaration.name.line)
    }
}

impl fmt::Debug for LoxFunction {
    // Closures alias the environment graph; printing just the name keeps
    // Debug from chasing reference cycles.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<fn {}>", self.name())
    }
}

/// Native `clock`: arity 0, seconds since the Unix epoch as a Number.
pub fn clock(_args: &[Value]) -> Result<Value, String> {
    let timestamp: f64 = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| format!("Clock error: {}", e))?
        .as_secs_f64();

    Ok(Value::Number(timestamp))
}
