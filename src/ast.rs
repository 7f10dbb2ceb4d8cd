//! Expression and statement trees.
//!
//! Closed tagged enums consumed by exhaustive `match` in the resolver and
//! interpreter. Nodes own their tokens; interior nodes are boxed. `for`
//! loops never appear here — the parser desugars them into `Block` /
//! `While` at parse time.

use crate::token::Token;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Identity of a variable-reference node (`Variable`, `Assign`, `This`).
///
/// The resolver's distance table is keyed by node identity, not structural
/// equality: two syntactically identical references at different source
/// positions must be distinct keys. Ids come from a process-wide counter
/// so nodes from successive REPL lines never collide in a long-lived
/// interpreter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExprId(usize);

impl ExprId {
    pub fn next() -> Self {
        static NEXT: AtomicUsize = AtomicUsize::new(0);

        ExprId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// A literal constant appearing directly in the source. The parser copies
/// the value out of the token at parse time, so literal leaves carry no
/// token reference.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    /// Numeric literal, IEEE-754 `f64`. `"3"` parses as `3.0`.
    Number(f64),

    /// String literal without surrounding quotes.
    Str(String),

    True,

    False,

    /// The `nil` literal.
    Nil,
}

/// Expression node.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A literal constant: number, string, `true`, `false`, or `nil`.
    Literal(LiteralValue),

    /// Prefix unary operator: `!ready`, `-42`.
    Unary {
        /// The operator token (`!` or `-`).
        operator: Token,
        right: Box<Expr>,
    },

    /// Infix binary operator: `a + b`, `x <= y`.
    Binary {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },

    /// Parenthesized sub-expression.
    Grouping(Box<Expr>),

    /// Variable access.
    Variable { id: ExprId, name: Token },

    /// Assignment: `name = value`.
    Assign {
        id: ExprId,
        name: Token,
        value: Box<Expr>,
    },

    /// Short-circuiting `and` / `or`.
    Logical {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },

    /// Call expression: `callee(arguments...)`.
    Call {
        callee: Box<Expr>,
        /// The closing `)` token, kept for error reporting.
        paren: Token,
        arguments: Vec<Expr>,
    },

    /// Property access: `object.name`.
    Get { object: Box<Expr>, name: Token },

    /// Property assignment: `object.name = value`.
    Set {
        object: Box<Expr>,
        name: Token,
        value: Box<Expr>,
    },

    /// The `this` keyword inside a method.
    This { id: ExprId, keyword: Token },
}

/// A function (or method) declaration, shared between its `Stmt` node and
/// any runtime function values that capture it.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: Token,

    /// Parameter name tokens (at most 255).
    pub params: Vec<Token>,

    /// Body executed when the function is called.
    pub body: Vec<Stmt>,
}

/// Statement node. A program is a `Vec<Stmt>`.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// Stand-alone expression terminated by a semicolon.
    Expression(Expr),

    /// `print` statement.
    Print(Expr),

    /// `var name ( = initializer )? ;` — absent initializer means `nil`.
    Var {
        name: Token,
        initializer: Option<Expr>,
    },

    /// Braced scope of declarations/statements.
    Block(Vec<Stmt>),

    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },

    While {
        condition: Expr,
        body: Box<Stmt>,
    },

    /// Function declaration; becomes a first-class callable value.
    Function(Rc<FunctionDecl>),

    /// `return` inside a function body. Absent value means `nil`.
    Return {
        /// The `return` keyword token, for error locations.
        keyword: Token,
        value: Option<Expr>,
    },

    /// Class declaration. Bodies contain only method declarations; fields
    /// are created dynamically by assignment at runtime.
    Class {
        name: Token,
        methods: Vec<Rc<FunctionDecl>>,
    },
}
