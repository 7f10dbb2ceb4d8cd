//! Class and instance values.
//!
//! A class is a callable (its constructor); calling it allocates an
//! instance and, when an `init` method exists, runs it bound to the new
//! instance. Classes are single-level: method lookup never chains to a
//! superclass.

use crate::callable::LoxFunction;
use crate::error::RuntimeError;
use crate::interpreter::Interpreter;
use crate::token::Token;
use crate::value::Value;
use log::debug;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

pub struct LoxClass {
    name: String,
    methods: HashMap<String, LoxFunction>,
}

impl LoxClass {
    pub fn new(name: String, methods: HashMap<String, LoxFunction>) -> Self {
        Self { name, methods }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn find_method(&self, name: &str) -> Option<&LoxFunction> {
        self.methods.get(name)
    }

    /// Constructor arity is `init`'s arity, or 0 without one.
    pub fn arity(&self) -> usize {
        self.find_method("init").map_or(0, LoxFunction::arity)
    }

    /// Construct an instance. `init`'s own return value is discarded —
    /// construction always yields the instance.
    pub fn call(
        class: &Rc<LoxClass>,
        interpreter: &mut Interpreter,
        arguments: &[Value],
    ) -> Result<Value, RuntimeError> {
        debug!("Constructing {} instance", class.name);

        let instance = Rc::new(RefCell::new(Instance::new(Rc::clone(class))));

        if let Some(initializer) = class.find_method("init") {
            initializer
                .bind(Rc::clone(&instance))
                .call(interpreter, arguments)?;
        }

        Ok(Value::Instance(instance))
    }
}

impl fmt::Debug for LoxClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<class {}>", self.name)
    }
}

/// An object: a class reference plus a field map. Fields need no
/// declaration — they spring into existence on first assignment.
pub struct Instance {
    class: Rc<LoxClass>,
    fields: HashMap<String, Value>,
}

impl Instance {
    pub fn new(class: Rc<LoxClass>) -> Self {
        Self {
            class,
            fields: HashMap::new(),
        }
    }

    pub fn class_name(&self) -> &str {
        &self.class.name
    }

    /// Property read: fields shadow methods; a method is bound to its
    /// receiver on demand.
    pub fn get(instance: &Rc<RefCell<Instance>>, name: &Token) -> Result<Value, RuntimeError> {
        if let Some(value) = instance.borrow().fields.get(&name.lexeme) {
            return Ok(value.clone());
        }

        let method: Option<LoxFunction> = instance
            .borrow()
            .class
            .find_method(&name.lexeme)
            .cloned();

        if let Some(method) = method {
            return Ok(Value::Function(Rc::new(method.bind(Rc::clone(instance)))));
        }

        Err(RuntimeError::UndefinedProperty {
            name: name.lexeme.clone(),
            line: name.line,
        })
    }

    /// Property write: unconditional upsert.
    pub fn set(&mut self, name: &Token, value: Value) {
        self.fields.insert(name.lexeme.clone(), value);
    }
}

impl fmt::Debug for Instance {
    // Fields can hold the instance itself; printing just the class name
    // keeps Debug acyclic.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} instance", self.class.name)
    }
}
