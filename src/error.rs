//! Centralised error hierarchy.
//!
//! Static errors (scanner, parser, resolver) are [`LoxError`] variants
//! carrying line and location information; runtime faults are the typed
//! [`RuntimeError`] enum. Neither prints anything itself — reporting is
//! the job of [`crate::diagnostics::Diagnostics`].

use crate::token::{Token, TokenKind};
use std::io;
use thiserror::Error;

/// Static-phase error type. Lex errors carry only a line; parse and
/// resolve errors also carry a location fragment derived from the
/// offending token (` at 'lexeme'`, or ` at end` for EOF).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoxError {
    /// Lexical (scanner) error.
    #[error("[line {line}] Error: {message}")]
    Lex { message: String, line: usize },

    /// Syntactic (parser) error.
    #[error("[line {line}] Error{location}: {message}")]
    Parse {
        message: String,
        location: String,
        line: usize,
    },

    /// Static-analysis (resolver) error.
    #[error("[line {line}] Error{location}: {message}")]
    Resolve {
        message: String,
        location: String,
        line: usize,
    },

    /// Wrapper around `std::io::Error`, enabling `?` on I/O ops.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl LoxError {
    /// Constructor for the scanner.
    pub fn lex<S: Into<String>>(line: usize, msg: S) -> Self {
        LoxError::Lex {
            message: msg.into(),
            line,
        }
    }

    /// Constructor for the parser, locating the error at `token`.
    pub fn parse<S: Into<String>>(token: &Token, msg: S) -> Self {
        LoxError::Parse {
            message: msg.into(),
            location: locate(token),
            line: token.line,
        }
    }

    /// Constructor for the resolver, locating the error at `token`.
    pub fn resolve<S: Into<String>>(token: &Token, msg: S) -> Self {
        LoxError::Resolve {
            message: msg.into(),
            location: locate(token),
            line: token.line,
        }
    }
}

fn locate(token: &Token) -> String {
    if token.kind == TokenKind::EOF {
        " at end".to_string()
    } else {
        format!(" at '{}'", token.lexeme)
    }
}

/// Typed runtime fault. Each variant carries the line of the offending
/// token; `Internal` covers consistency failures (e.g. a resolver
/// distance pointing past the environment chain) with a bare message.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RuntimeError {
    #[error("Undefined variable '{name}'.\n[line {line}]")]
    UndefinedVariable { name: String, line: usize },

    #[error("Undefined property '{name}'.\n[line {line}]")]
    UndefinedProperty { name: String, line: usize },

    /// Operand type violation; the message names the expectation
    /// (`Operand must be a number.`, `Operands must be two numbers or
    /// two strings.`).
    #[error("{message}\n[line {line}]")]
    TypeMismatch { message: String, line: usize },

    #[error("Can only call functions and classes.\n[line {line}]")]
    NotCallable { line: usize },

    #[error("Expected {expected} arguments but got {actual}.\n[line {line}]")]
    ArityMismatch {
        expected: usize,
        actual: usize,
        line: usize,
    },

    /// Property read on something that is not an instance.
    #[error("Only instances have properties.\n[line {line}]")]
    NotAnInstance { line: usize },

    /// Property write on something that is not an instance.
    #[error("Only instances have fields.\n[line {line}]")]
    NoFields { line: usize },

    #[error("{0}")]
    Internal(String),
}

impl RuntimeError {
    pub fn type_mismatch<S: Into<String>>(token: &Token, msg: S) -> Self {
        RuntimeError::TypeMismatch {
            message: msg.into(),
            line: token.line,
        }
    }
}

/// Crate-wide `Result` alias for the static phases.
pub type Result<T> = std::result::Result<T, LoxError>;
