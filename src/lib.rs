//! A small Lisp: tagged cells in a collected arena, a reader, frame based
//! environments and a tree-walking evaluator.
#[macro_use]
extern crate log;

#[macro_use]
mod helpers;

pub mod config;
pub mod heap;
pub mod interpreter;
pub mod port;
pub mod printer;
pub mod reader;
pub mod vm;

pub use crate::config::Config;
pub use crate::heap::{Cell, CellRef, Heap, OutOfMemory};
pub use crate::vm::{Diagnostic, DiagnosticKind, ExecutionError, Lisp};
