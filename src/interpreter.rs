//! Tree-walking evaluator.
//!
//! Executes statements and evaluates expressions against the environment
//! chain. The only non-local control transfer is the `return` signal,
//! modeled as [`Interrupt::Return`] — an arm disjoint from real faults so
//! call sites never confuse "the function returned" with "something went
//! wrong". The current-environment pointer is swapped behind a drop
//! guard, so every exit path out of a block (normal, return unwind, or
//! fault) restores the enclosing scope.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write;
use std::rc::Rc;

use log::{debug, info};

use crate::ast::{Expr, ExprId, LiteralValue, Stmt};
use crate::callable::{clock, LoxFunction};
use crate::class::{Instance, LoxClass};
use crate::environment::Environment;
use crate::error::RuntimeError;
use crate::token::{Token, TokenKind};
use crate::value::Value;

/// Non-local exit from statement execution: either the `return` signal
/// unwinding to the nearest call frame, or a genuine runtime fault.
#[derive(Debug)]
pub enum Interrupt {
    /// A `return` statement fired; carries the returned value.
    Return(Value),

    /// A runtime fault; aborts the rest of the run.
    Fault(RuntimeError),
}

impl From<RuntimeError> for Interrupt {
    fn from(fault: RuntimeError) -> Self {
        Interrupt::Fault(fault)
    }
}

/// Result alias for execution/evaluation.
pub type Exec<T> = Result<T, Interrupt>;

pub struct Interpreter {
    globals: Rc<RefCell<Environment>>,
    environment: Rc<RefCell<Environment>>,
    /// Resolver output: lexical distance per variable-reference node.
    locals: HashMap<ExprId, usize>,
    /// Where `print` writes; stdout normally, a capture buffer in tests.
    output: Rc<RefCell<dyn Write>>,
}

impl Interpreter {
    /// Interpreter printing to standard output.
    pub fn new() -> Self {
        Self::with_output(Rc::new(RefCell::new(std::io::stdout())))
    }

    /// Interpreter printing to an arbitrary sink.
    pub fn with_output(output: Rc<RefCell<dyn Write>>) -> Self {
        info!("Initializing interpreter");

        let globals = Rc::new(RefCell::new(Environment::new()));

        globals.borrow_mut().define(
            "clock",
            Value::NativeFunction {
                name: "clock".to_string(),
                arity: 0,
                func: clock,
            },
        );

        Self {
            environment: Rc::clone(&globals),
            globals,
            locals: HashMap::new(),
            output,
        }
    }

    /// Record the lexical distance for a variable-reference node. Called
    /// by the resolver; absence of an entry means "assume global".
    pub fn resolve_local(&mut self, id: ExprId, depth: usize) {
        self.locals.insert(id, depth);
    }

    /// Execute a program. The first fault aborts the remaining
    /// statements; a stray top-level return signal would mean the
    /// resolver let one through, which is an internal failure.
    pub fn interpret(&mut self, statements: &[Stmt]) -> Result<(), RuntimeError> {
        debug!("Interpreting {} statement(s)", statements.len());

        for statement in statements {
            match self.execute(statement) {
                Ok(()) => {}

                Err(Interrupt::Fault(fault)) => return Err(fault),

                Err(Interrupt::Return(_)) => {
                    return Err(RuntimeError::Internal(
                        "Return signal escaped to top level.".to_string(),
                    ));
                }
            }
        }

        Ok(())
    }

    // ───────────────────────── statements ─────────────────────────

    pub fn execute(&mut self, stmt: &Stmt) -> Exec<()> {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;

                Ok(())
            }

            Stmt::Print(expr) => {
                let value = self.evaluate(expr)?;

                let _ = writeln!(self.output.borrow_mut(), "{}", value);

                Ok(())
            }

            Stmt::Var { name, initializer } => {
                let value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                self.environment.borrow_mut().define(&name.lexeme, value);

                Ok(())
            }

            Stmt::Block(statements) => {
                let environment = Rc::new(RefCell::new(Environment::with_enclosing(Rc::clone(
                    &self.environment,
                ))));

                self.execute_block(statements, environment)
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if is_truthy(&self.evaluate(condition)?) {
                    self.execute(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch)
                } else {
                    Ok(())
                }
            }

            Stmt::While { condition, body } => {
                while is_truthy(&self.evaluate(condition)?) {
                    self.execute(body)?;
                }

                Ok(())
            }

            Stmt::Function(declaration) => {
                debug!("Defining <fn {}>", declaration.name.lexeme);

                // Capture the environment current at declaration time.
                let function = LoxFunction::new(
                    Rc::clone(declaration),
                    Rc::clone(&self.environment),
                    false,
                );

                self.environment
                    .borrow_mut()
                    .define(&declaration.name.lexeme, Value::Function(Rc::new(function)));

                Ok(())
            }

            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                Err(Interrupt::Return(value))
            }

            Stmt::Class { name, methods } => {
                debug!("Defining class {}", name.lexeme);

                // Two-step define/assign lets methods refer to the class
                // by name.
                self.environment
                    .borrow_mut()
                    .define(&name.lexeme, Value::Nil);

                let mut method_map: HashMap<String, LoxFunction> = HashMap::new();

                for declaration in methods {
                    let is_initializer = declaration.name.lexeme == "init";

                    let method = LoxFunction::new(
                        Rc::clone(declaration),
                        Rc::clone(&self.environment),
                        is_initializer,
                    );

                    method_map.insert(declaration.name.lexeme.clone(), method);
                }

                let class = Value::Class(Rc::new(LoxClass::new(name.lexeme.clone(), method_map)));

                self.environment
                    .borrow_mut()
                    .assign(&name.lexeme, class, name.line)
                    .map_err(Interrupt::Fault)?;

                Ok(())
            }
        }
    }

    /// Run `statements` with `environment` as the current scope. The
    /// guard restores the previous scope on every exit path, including
    /// the early `?` exits taken by return signals and faults.
    pub fn execute_block(
        &mut self,
        statements: &[Stmt],
        environment: Rc<RefCell<Environment>>,
    ) -> Exec<()> {
        let mut guard = ScopeGuard::enter(self, environment);

        for statement in statements {
            guard.interpreter.execute(statement)?;
        }

        Ok(())
    }

    // ───────────────────────── expressions ────────────────────────

    pub fn evaluate(&mut self, expr: &Expr) -> Exec<Value> {
        match expr {
            Expr::Literal(literal) => Ok(match literal {
                LiteralValue::Number(n) => Value::Number(*n),
                LiteralValue::Str(s) => Value::String(s.clone()),
                LiteralValue::True => Value::Bool(true),
                LiteralValue::False => Value::Bool(false),
                LiteralValue::Nil => Value::Nil,
            }),

            Expr::Grouping(inner) => self.evaluate(inner),

            Expr::Unary { operator, right } => self.evaluate_unary(operator, right),

            Expr::Binary {
                left,
                operator,
                right,
            } => self.evaluate_binary(left, operator, right),

            Expr::Logical {
                left,
                operator,
                right,
            } => {
                // Short-circuit, yielding the operand value itself.
                let left = self.evaluate(left)?;

                if operator.kind == TokenKind::OR {
                    if is_truthy(&left) {
                        return Ok(left);
                    }
                } else if !is_truthy(&left) {
                    return Ok(left);
                }

                self.evaluate(right)
            }

            Expr::Variable { id, name } => self.look_up_variable(name, *id).map_err(Into::into),

            Expr::This { id, keyword } => self.look_up_variable(keyword, *id).map_err(Into::into),

            Expr::Assign { id, name, value } => {
                let value = self.evaluate(value)?;

                match self.locals.get(id) {
                    Some(&distance) => Environment::assign_at(
                        &self.environment,
                        distance,
                        &name.lexeme,
                        value.clone(),
                    )
                    .map_err(Interrupt::Fault)?,

                    None => self
                        .globals
                        .borrow_mut()
                        .assign(&name.lexeme, value.clone(), name.line)
                        .map_err(Interrupt::Fault)?,
                }

                Ok(value)
            }

            Expr::Call {
                callee,
                paren,
                arguments,
            } => {
                let callee = self.evaluate(callee)?;

                let mut args: Vec<Value> = Vec::with_capacity(arguments.len());

                for argument in arguments {
                    args.push(self.evaluate(argument)?);
                }

                self.invoke_callable(&callee, paren, &args)
            }

            Expr::Get { object, name } => match self.evaluate(object)? {
                Value::Instance(instance) => {
                    Instance::get(&instance, name).map_err(Into::into)
                }

                _ => Err(RuntimeError::NotAnInstance { line: name.line }.into()),
            },

            Expr::Set {
                object,
                name,
                value,
            } => match self.evaluate(object)? {
                Value::Instance(instance) => {
                    let value = self.evaluate(value)?;

                    instance.borrow_mut().set(name, value.clone());

                    Ok(value)
                }

                _ => Err(RuntimeError::NoFields { line: name.line }.into()),
            },
        }
    }

    fn evaluate_unary(&mut self, operator: &Token, right: &Expr) -> Exec<Value> {
        let right = self.evaluate(right)?;

        match operator.kind {
            TokenKind::MINUS => match right {
                Value::Number(n) => Ok(Value::Number(-n)),

                _ => Err(RuntimeError::type_mismatch(operator, "Operand must be a number.").into()),
            },

            TokenKind::BANG => Ok(Value::Bool(!is_truthy(&right))),

            _ => Err(RuntimeError::Internal(format!(
                "Invalid unary operator '{}'.",
                operator.lexeme
            ))
            .into()),
        }
    }

    fn evaluate_binary(&mut self, left: &Expr, operator: &Token, right: &Expr) -> Exec<Value> {
        let left = self.evaluate(left)?;
        let right = self.evaluate(right)?;

        match operator.kind {
            // '+' is overloaded: numbers add, strings concatenate, any
            // other combination is a type fault.
            TokenKind::PLUS => match (left, right) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),

                (Value::String(a), Value::String(b)) => Ok(Value::String(a + &b)),

                _ => Err(RuntimeError::type_mismatch(
                    operator,
                    "Operands must be two numbers or two strings.",
                )
                .into()),
            },

            // Arithmetic and relational operators share one operand
            // check; a non-number on either side faults with the same
            // per-operand message the unary minus uses.
            TokenKind::MINUS => {
                let (a, b) = numeric_operands(operator, left, right)?;
                Ok(Value::Number(a - b))
            }

            TokenKind::STAR => {
                let (a, b) = numeric_operands(operator, left, right)?;
                Ok(Value::Number(a * b))
            }

            TokenKind::SLASH => {
                let (a, b) = numeric_operands(operator, left, right)?;
                Ok(Value::Number(a / b))
            }

            TokenKind::GREATER => {
                let (a, b) = numeric_operands(operator, left, right)?;
                Ok(Value::Bool(a > b))
            }

            TokenKind::GREATER_EQUAL => {
                let (a, b) = numeric_operands(operator, left, right)?;
                Ok(Value::Bool(a >= b))
            }

            TokenKind::LESS => {
                let (a, b) = numeric_operands(operator, left, right)?;
                Ok(Value::Bool(a < b))
            }

            TokenKind::LESS_EQUAL => {
                let (a, b) = numeric_operands(operator, left, right)?;
                Ok(Value::Bool(a <= b))
            }

            TokenKind::EQUAL_EQUAL => Ok(Value::Bool(is_equal(&left, &right))),

            TokenKind::BANG_EQUAL => Ok(Value::Bool(!is_equal(&left, &right))),

            _ => Err(RuntimeError::Internal(format!(
                "Invalid binary operator '{}'.",
                operator.lexeme
            ))
            .into()),
        }
    }

    /// Dispatch a call: native functions, user functions, and classes
    /// (as constructors). Argument count must match the arity exactly.
    fn invoke_callable(&mut self, callee: &Value, paren: &Token, args: &[Value]) -> Exec<Value> {
        match callee {
            Value::NativeFunction { name, arity, func } => {
                check_arity(*arity, args.len(), paren)?;

                debug!("Calling native fn '{}'", name);

                func(args)
                    .map_err(|message| RuntimeError::Internal(message).into())
            }

            Value::Function(function) => {
                check_arity(function.arity(), args.len(), paren)?;

                function.call(self, args).map_err(Into::into)
            }

            Value::Class(class) => {
                check_arity(class.arity(), args.len(), paren)?;

                LoxClass::call(class, self, args).map_err(Into::into)
            }

            _ => Err(RuntimeError::NotCallable { line: paren.line }.into()),
        }
    }

    /// Distance-annotated references index the Nth ancestor directly;
    /// unresolved references fall back to the globals.
    fn look_up_variable(&self, name: &Token, id: ExprId) -> Result<Value, RuntimeError> {
        match self.locals.get(&id) {
            Some(&distance) => {
                Environment::get_at(&self.environment, distance, &name.lexeme, name.line)
            }

            None => self.globals.borrow().get(&name.lexeme, name.line),
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

/// Swaps the interpreter's current environment and guarantees the old
/// one is restored when dropped, however the enclosing block exits.
struct ScopeGuard<'a> {
    interpreter: &'a mut Interpreter,
    previous: Rc<RefCell<Environment>>,
}

impl<'a> ScopeGuard<'a> {
    fn enter(interpreter: &'a mut Interpreter, environment: Rc<RefCell<Environment>>) -> Self {
        let previous = std::mem::replace(&mut interpreter.environment, environment);

        Self {
            interpreter,
            previous,
        }
    }
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        self.interpreter.environment = Rc::clone(&self.previous);
    }
}

/// `nil` and `false` are falsy; everything else — including `0` and the
/// empty string — is truthy.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Nil => false,
        Value::Bool(b) => *b,
        _ => true,
    }
}

/// Value equality per the language: delegates to `Value`'s `PartialEq`
/// (same-typed primitives by value, everything else false).
fn is_equal(left: &Value, right: &Value) -> bool {
    left == right
}

fn numeric_operands(
    operator: &Token,
    left: Value,
    right: Value,
) -> Result<(f64, f64), Interrupt> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok((a, b)),

        _ => Err(RuntimeError::type_mismatch(operator, "Operand must be a number.").into()),
    }
}

fn check_arity(expected: usize, actual: usize, paren: &Token) -> Result<(), Interrupt> {
    if expected != actual {
        return Err(RuntimeError::ArityMismatch {
            expected,
            actual,
            line: paren.line,
        }
        .into());
    }

    Ok(())
}
