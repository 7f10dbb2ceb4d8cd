//! Per-run diagnostics context.
//!
//! One `Diagnostics` value is threaded through the scanner driver, the
//! parser, the resolver, and the interpreter's fault reporting. It owns
//! the two phase-gating flags: `had_error` decides whether the resolver
//! and interpreter run at all for a source unit, and `had_runtime_error`
//! is kept separate so a REPL can keep accepting input after a fault.
//! The static flag is reset between REPL lines; no process-wide state.

use crate::error::{LoxError, RuntimeError};
use log::debug;
use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

pub struct Diagnostics {
    output: Rc<RefCell<dyn Write>>,
    had_error: bool,
    had_runtime_error: bool,
}

impl Diagnostics {
    /// Diagnostics writing to standard output.
    pub fn new() -> Self {
        Self::with_output(Rc::new(RefCell::new(std::io::stdout())))
    }

    /// Diagnostics writing to an arbitrary sink (shared with the
    /// interpreter's `print` output in tests).
    pub fn with_output(output: Rc<RefCell<dyn Write>>) -> Self {
        Self {
            output,
            had_error: false,
            had_runtime_error: false,
        }
    }

    /// Report a static (lex, parse, or resolve) error and set the flag
    /// that gates the later phases.
    pub fn report(&mut self, error: &LoxError) {
        debug!("Static error: {}", error);

        let _ = writeln!(self.output.borrow_mut(), "{}", error);
        self.had_error = true;
    }

    /// Report a runtime fault. Sets the runtime flag only; the static
    /// flag stays untouched.
    pub fn report_runtime(&mut self, error: &RuntimeError) {
        debug!("Runtime fault: {}", error);

        let _ = writeln!(self.output.borrow_mut(), "{}", error);
        self.had_runtime_error = true;
    }

    pub fn had_error(&self) -> bool {
        self.had_error
    }

    pub fn had_runtime_error(&self) -> bool {
        self.had_runtime_error
    }

    /// Clear the static flag so one bad REPL line does not poison the
    /// next. The runtime flag is deliberately left alone.
    pub fn reset_static_error(&mut self) {
        self.had_error = false;
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new()
    }
}
