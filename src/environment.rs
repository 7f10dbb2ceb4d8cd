//! Chained name→value scopes.
//!
//! An `Environment` is created per block, per function call, and per
//! method binding. It is shared between the interpreter's current-scope
//! pointer and every closure that captured it, so the chain lives behind
//! `Rc<RefCell<...>>`: a scope stays alive as long as any closure or
//! active call frame still references it, which can be strictly longer
//! than its block's lexical extent.

use crate::error::RuntimeError;
use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug, Default)]
pub struct Environment {
    values: HashMap<String, Value>,
    enclosing: Option<Rc<RefCell<Environment>>>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: None,
        }
    }

    pub fn with_enclosing(enclosing: Rc<RefCell<Environment>>) -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    /// Insert or overwrite in this scope unconditionally. Redefinition is
    /// legal here; parameter binding and class forward declaration rely
    /// on it.
    pub fn define(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    /// Look `name` up, walking parent links until found or the root is
    /// exhausted.
    pub fn get(&self, name: &str, line: usize) -> Result<Value, RuntimeError> {
        if let Some(value) = self.values.get(name) {
            Ok(value.clone())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow().get(name, line)
        } else {
            Err(RuntimeError::UndefinedVariable {
                name: name.to_string(),
                line,
            })
        }
    }

    /// Assign to an existing binding, walking parent links.
    pub fn assign(&mut self, name: &str, value: Value, line: usize) -> Result<(), RuntimeError> {
        if self.values.contains_key(name) {
            self.values.insert(name.to_string(), value);
            Ok(())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow_mut().assign(name, value, line)
        } else {
            Err(RuntimeError::UndefinedVariable {
                name: name.to_string(),
                line,
            })
        }
    }

    /// Read directly from the scope `distance` ancestors up, skipping the
    /// chain walk. The resolver guarantees the binding exists there.
    pub fn get_at(
        env: &Rc<RefCell<Environment>>,
        distance: usize,
        name: &str,
        line: usize,
    ) -> Result<Value, RuntimeError> {
        let ancestor = Self::ancestor(env, distance)?;
        let value = ancestor.borrow().values.get(name).cloned();

        value.ok_or_else(|| RuntimeError::UndefinedVariable {
            name: name.to_string(),
            line,
        })
    }

    /// Write directly into the scope `distance` ancestors up.
    pub fn assign_at(
        env: &Rc<RefCell<Environment>>,
        distance: usize,
        name: &str,
        value: Value,
    ) -> Result<(), RuntimeError> {
        let ancestor = Self::ancestor(env, distance)?;
        ancestor.borrow_mut().values.insert(name.to_string(), value);

        Ok(())
    }

    /// Walk exactly `distance` parent links. A missing ancestor means the
    /// resolver and the runtime chain disagree about scope shape, which
    /// is an internal-consistency failure, not a user error.
    fn ancestor(
        env: &Rc<RefCell<Environment>>,
        distance: usize,
    ) -> Result<Rc<RefCell<Environment>>, RuntimeError> {
        let mut current = Rc::clone(env);

        for _ in 0..distance {
            let next = current.borrow().enclosing.clone();

            current = next.ok_or_else(|| {
                RuntimeError::Internal(format!("No enclosing scope at distance {}.", distance))
            })?;
        }

        Ok(current)
    }
}
