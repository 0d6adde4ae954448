//! The read, eval, print, collect cycle.
use std::error::Error;
use std::fmt;

use crate::heap::CellRef;
use crate::port::{Port, StringPort};
use crate::reader::{read, ReaderError};
use crate::vm::{ExecutionError, Lisp};

#[cfg(test)]
mod test;

#[derive(Debug, PartialEq)]
pub enum InterpreterError {
    Reader(ReaderError),
    Exec(ExecutionError),
    /// No form in the source
    Eof,
}

impl InterpreterError {
    /// Nothing more can be read or evaluated after these
    pub fn is_fatal(&self) -> bool {
        match *self {
            InterpreterError::Exec(ref e) => e.is_fatal(),
            InterpreterError::Reader(ReaderError::Port(_))
            | InterpreterError::Reader(ReaderError::OutOfMemory) => true,
            _ => false,
        }
    }
}

impl fmt::Display for InterpreterError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            InterpreterError::Reader(ref e) => write!(fmt, "parse error: {}", e),
            InterpreterError::Exec(ref e) => write!(fmt, "{}", e),
            InterpreterError::Eof => fmt.write_str("no input"),
        }
    }
}

impl Error for InterpreterError {}

/// Reads and evaluates one top-level form. `None` once the port is exhausted.
fn step<P: Port + ?Sized>(
    lisp: &mut Lisp,
    port: &mut P,
) -> Option<Result<CellRef, InterpreterError>> {
    let form = match read(port, lisp.heap_mut()) {
        Ok(Some(form)) => form,
        Ok(None) => return None,
        Err(e) => return Some(Err(InterpreterError::Reader(e))),
    };

    let result = lisp.eval(form, None);
    if result == Err(ExecutionError::Abort) {
        info!("evaluation aborted");
        lisp.clear_interrupt();
    }
    Some(result.map_err(InterpreterError::Exec))
}

/// Runs every form in `port`, handing each outcome to `callback` before the
/// heap is collected. The callback returns `false` to stop.
pub fn interpret<P, F>(lisp: &mut Lisp, port: &mut P, mut callback: F)
where
    P: Port + ?Sized,
    F: FnMut(&Lisp, Result<CellRef, InterpreterError>) -> bool,
{
    while let Some(outcome) = step(lisp, port) {
        let should_continue = callback(lisp, outcome);
        lisp.collect(None);

        if !should_continue {
            break;
        }
    }
}

/// Evaluates `source` up to its first error and returns the last value, printed.
pub fn evaluate(lisp: &mut Lisp, source: &str) -> Result<String, InterpreterError> {
    let mut port = StringPort::new(source);
    let mut last = Err(InterpreterError::Eof);

    interpret(lisp, &mut port, |lisp, outcome| {
        let should_continue = outcome.is_ok();
        last = outcome.map(|value| lisp.display(value).to_string());
        should_continue
    });

    last
}

/// Line-at-a-time input. A form left open at the end of a line waits for
/// the next one.
#[derive(Debug, Default)]
pub struct Session {
    pending: String,
}

impl Session {
    pub fn new() -> Session {
        Session::default()
    }

    /// True while an unterminated form is waiting for more input
    pub fn is_pending(&self) -> bool {
        !self.pending.trim().is_empty()
    }

    /// Drops a half-read form.
    pub fn reset(&mut self) {
        self.pending.clear();
    }

    /// Evaluates every complete form in the pending input plus `line`.
    /// Returns `false` when the callback asked to stop.
    pub fn feed<F>(&mut self, lisp: &mut Lisp, line: &str, mut callback: F) -> bool
    where
        F: FnMut(&Lisp, Result<CellRef, InterpreterError>) -> bool,
    {
        self.pending.push_str(line);
        self.pending.push('\n');

        let mut port = StringPort::new(&self.pending);
        loop {
            let start = port.position();
            let outcome = match step(lisp, &mut port) {
                Some(Err(InterpreterError::Reader(ref e))) if e.is_incomplete() => {
                    self.pending = port.input_from(start);
                    return true;
                }
                Some(outcome) => outcome,
                None => break,
            };

            let should_continue = callback(lisp, outcome);
            lisp.collect(None);

            if !should_continue {
                self.pending.clear();
                return false;
            }
        }

        self.pending.clear();
        true
    }
}
