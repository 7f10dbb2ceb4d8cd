//! Static resolution pass.
//!
//! One AST walk that does three things:
//! 1. Builds lexical scopes (a stack of `HashMap<String, bool>` tracking
//!    declared vs defined names).
//! 2. Reports static errors — redeclaration in the same scope, reading a
//!    local in its own initializer, `return` outside a function, `this`
//!    outside a class — without stopping: siblings keep resolving.
//! 3. Records, for every variable-reference node, its lexical distance
//!    (scopes between use and declaration) into the interpreter, so the
//!    runtime can index the right ancestor scope directly instead of
//!    searching the chain. References with no match are left for the
//!    globals at runtime.

use crate::ast::{Expr, FunctionDecl, Stmt};
use crate::diagnostics::Diagnostics;
use crate::error::LoxError;
use crate::interpreter::Interpreter;
use crate::token::Token;
use log::{debug, info};
use std::collections::HashMap;

/// Are we inside a function or method body? Validates `return`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum FunctionType {
    None,
    Function,
    Method,
}

/// Are we inside a class body? Validates `this`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum ClassType {
    None,
    Class,
}

pub struct Resolver<'i, 'd> {
    interpreter: &'i mut Interpreter,
    diagnostics: &'d mut Diagnostics,
    scopes: Vec<HashMap<String, bool>>, // false = declared, true = defined
    current_function: FunctionType,
    current_class: ClassType,
}

impl<'i, 'd> Resolver<'i, 'd> {
    pub fn new(interpreter: &'i mut Interpreter, diagnostics: &'d mut Diagnostics) -> Self {
        info!("Resolver instantiated");

        Resolver {
            interpreter,
            diagnostics,
            scopes: Vec::new(),
            current_function: FunctionType::None,
            current_class: ClassType::None,
        }
    }

    /// Walk all top-level statements. Errors go to the diagnostics sink;
    /// the pass always completes.
    pub fn resolve(&mut self, statements: &[Stmt]) {
        info!("Resolving {} statement(s)", statements.len());

        for statement in statements {
            self.resolve_stmt(statement);
        }
    }

    // ───────────────────────── statements ─────────────────────────

    fn resolve_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Block(statements) => {
                self.begin_scope();

                for statement in statements {
                    self.resolve_stmt(statement);
                }

                self.end_scope();
            }

            Stmt::Var { name, initializer } => {
                // declare → resolve initializer → define, so the
                // initializer cannot observe the name it defines.
                self.declare(name);

                if let Some(expr) = initializer {
                    self.resolve_expr(expr);
                }

                self.define(name);
            }

            Stmt::Function(declaration) => {
                // The name is visible inside its own body (recursion).
                self.declare(&declaration.name);
                self.define(&declaration.name);

                self.resolve_function(declaration, FunctionType::Function);
            }

            Stmt::Class { name, methods } => {
                let enclosing_class = self.current_class;
                self.current_class = ClassType::Class;

                self.declare(name);
                self.define(name);

                // A synthetic scope defining `this` wraps the methods,
                // separate from the surrounding scope.
                self.begin_scope();

                if let Some(scope) = self.scopes.last_mut() {
                    scope.insert("this".to_string(), true);
                }

                for method in methods {
                    self.resolve_function(method, FunctionType::Method);
                }

                self.end_scope();

                self.current_class = enclosing_class;
            }

            Stmt::Expression(expr) | Stmt::Print(expr) => {
                self.resolve_expr(expr);
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.resolve_expr(condition);
                self.resolve_stmt(then_branch);

                if let Some(else_branch) = else_branch {
                    self.resolve_stmt(else_branch);
                }
            }

            Stmt::While { condition, body } => {
                self.resolve_expr(condition);
                self.resolve_stmt(body);
            }

            Stmt::Return { keyword, value } => {
                if self.current_function == FunctionType::None {
                    self.diagnostics.report(&LoxError::resolve(
                        keyword,
                        "Can't return from top-level code.",
                    ));
                }

                if let Some(expr) = value {
                    self.resolve_expr(expr);
                }
            }
        }
    }

    // ───────────────────────── expressions ────────────────────────

    fn resolve_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Literal(_) => {}

            Expr::Grouping(inner) => {
                self.resolve_expr(inner);
            }

            Expr::Unary { right, .. } => {
                self.resolve_expr(right);
            }

            Expr::Binary { left, right, .. } | Expr::Logical { left, right, .. } => {
                self.resolve_expr(left);
                self.resolve_expr(right);
            }

            Expr::Variable { id, name } => {
                // Reading a name that is declared but not yet defined in
                // the innermost scope means `var a = a;`.
                if let Some(scope) = self.scopes.last() {
                    if scope.get(name.lexeme.as_str()) == Some(&false) {
                        self.diagnostics.report(&LoxError::resolve(
                            name,
                            "Can't read local variable in its own initializer.",
                        ));
                    }
                }

                self.resolve_local(*id, name);
            }

            Expr::Assign { id, name, value } => {
                self.resolve_expr(value);
                self.resolve_local(*id, name);
            }

            Expr::Call {
                callee, arguments, ..
            } => {
                self.resolve_expr(callee);

                for argument in arguments {
                    self.resolve_expr(argument);
                }
            }

            Expr::Get { object, .. } => {
                self.resolve_expr(object);
            }

            Expr::Set { object, value, .. } => {
                self.resolve_expr(value);
                self.resolve_expr(object);
            }

            Expr::This { id, keyword } => {
                if self.current_class == ClassType::None {
                    self.diagnostics.report(&LoxError::resolve(
                        keyword,
                        "Can't use 'this' outside of a class.",
                    ));

                    return;
                }

                self.resolve_local(*id, keyword);
            }
        }
    }

    // ─────────────────────── function helper ──────────────────────

    /// Fresh scope for a function's parameters and body; tracks the
    /// function kind so nested `return`s validate correctly.
    fn resolve_function(&mut self, declaration: &FunctionDecl, kind: FunctionType) {
        let enclosing = self.current_function;
        self.current_function = kind;

        self.begin_scope();

        for param in &declaration.params {
            self.declare(param);
            self.define(param);
        }

        for statement in &declaration.body {
            self.resolve_stmt(statement);
        }

        self.end_scope();

        self.current_function = enclosing;
    }

    // ─────────────────────── scope management ─────────────────────

    #[inline]
    fn begin_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    #[inline]
    fn end_scope(&mut self) {
        self.scopes.pop();
    }

    /// Mark `name` as present-but-uninitialized in the innermost scope.
    /// Redeclaring within the same scope is reported, not fatal.
    fn declare(&mut self, name: &Token) {
        if let Some(scope) = self.scopes.last_mut() {
            if scope.contains_key(name.lexeme.as_str()) {
                self.diagnostics.report(&LoxError::resolve(
                    name,
                    "Already a variable with this name in this scope.",
                ));
            }

            scope.insert(name.lexeme.clone(), false);
        }
    }

    /// Mark `name` as fully initialized.
    fn define(&mut self, name: &Token) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.lexeme.clone(), true);
        }
    }

    /// Search scopes innermost→outermost; the first match fixes the
    /// distance for this node. No match means the reference resolves
    /// dynamically against the globals.
    fn resolve_local(&mut self, id: crate::ast::ExprId, name: &Token) {
        for (depth, scope) in self.scopes.iter().rev().enumerate() {
            if scope.contains_key(name.lexeme.as_str()) {
                debug!("Resolved '{}' at depth {}", name.lexeme, depth);

                self.interpreter.resolve_local(id, depth);

                return;
            }
        }

        debug!("Resolved '{}' as global", name.lexeme);
    }
}
