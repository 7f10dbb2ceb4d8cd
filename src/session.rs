//! Pipeline driver: one `Session` owns an interpreter and a diagnostics
//! context and runs source units through scan → parse → resolve →
//! interpret. The interpreter persists across `run` calls, so a REPL
//! keeps its globals and definitions from line to line.

use crate::diagnostics::Diagnostics;
use crate::interpreter::Interpreter;
use crate::parser::Parser;
use crate::resolver::Resolver;
use crate::scanner::Scanner;
use crate::token::Token;
use log::{debug, info};
use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

pub struct Session {
    interpreter: Interpreter,
    diagnostics: Diagnostics,
}

impl Session {
    /// Session writing program output and diagnostics to stdout.
    pub fn new() -> Self {
        Self {
            interpreter: Interpreter::new(),
            diagnostics: Diagnostics::new(),
        }
    }

    /// Session writing everything to the given sink (shared by `print`
    /// output and error reports, like a terminal).
    pub fn with_output(output: Rc<RefCell<dyn Write>>) -> Self {
        Self {
            interpreter: Interpreter::with_output(Rc::clone(&output)),
            diagnostics: Diagnostics::with_output(output),
        }
    }

    /// Execute one source unit front to back. Lexical and syntax errors
    /// are all reported before the run aborts; resolution errors gate
    /// interpretation the same way; a runtime fault stops the remaining
    /// statements and sets the (separate) runtime flag.
    pub fn run(&mut self, source: &str) {
        info!("Running {} byte(s) of source", source.len());

        // Scan everything: an error token is reported and scanning
        // continues, so one run surfaces every lexical error.
        let mut tokens: Vec<Token> = Vec::new();

        for item in Scanner::new(source.as_bytes()) {
            match item {
                Ok(token) => tokens.push(token),
                Err(e) => self.diagnostics.report(&e),
            }
        }

        debug!("Scanned {} token(s)", tokens.len());

        // Parse with per-statement recovery; errors land in diagnostics.
        let statements = Parser::new(&tokens, &mut self.diagnostics).parse();

        if self.diagnostics.had_error() {
            debug!("Static errors during scan/parse; skipping execution");
            return;
        }

        Resolver::new(&mut self.interpreter, &mut self.diagnostics).resolve(&statements);

        if self.diagnostics.had_error() {
            debug!("Static errors during resolution; skipping execution");
            return;
        }

        if let Err(fault) = self.interpreter.interpret(&statements) {
            self.diagnostics.report_runtime(&fault);
        }
    }

    pub fn had_error(&self) -> bool {
        self.diagnostics.had_error()
    }

    pub fn had_runtime_error(&self) -> bool {
        self.diagnostics.had_runtime_error()
    }

    /// Forget static errors between REPL lines.
    pub fn reset_static_error(&mut self) {
        self.diagnostics.reset_static_error();
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
