//! The interpreter context: heap, singletons, global frame, signal flag and
//! the diagnostics recorded by recoverable errors.
use std::error::Error;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::Config;
use crate::heap::{Cell, CellRef, GcStats, Heap, NativeFn, OutOfMemory, Primitive};
use crate::port::{Port, StdPort};
use crate::printer::Printed;

mod apply;
mod environment;
mod eval;
mod stdlib;


/// Conditions that unwind evaluation to the top level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionError {
    /// The signal flag was raised
    Abort,
    StackOverflow,
    OutOfMemory,
    /// A cell with no evaluation rule reached the evaluator
    UnimplementedType(&'static str),
}

impl ExecutionError {
    /// No safe continuation exists after these
    pub fn is_fatal(&self) -> bool {
        match *self {
            ExecutionError::OutOfMemory | ExecutionError::UnimplementedType(_) => true,
            ExecutionError::Abort | ExecutionError::StackOverflow => false,
        }
    }
}

impl fmt::Display for ExecutionError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ExecutionError::Abort => fmt.write_str("aborted"),
            ExecutionError::StackOverflow => fmt.write_str("recursion depth exceeded"),
            ExecutionError::OutOfMemory => write!(fmt, "{}", OutOfMemory),
            ExecutionError::UnimplementedType(name) => {
                write!(fmt, "cannot evaluate a {} cell", name)
            }
        }
    }
}

impl Error for ExecutionError {}

impl From<OutOfMemory> for ExecutionError {
    fn from(_: OutOfMemory) -> ExecutionError {
        ExecutionError::OutOfMemory
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    UnboundSymbol,
    ArityMismatch,
    TypeMismatch,
    DivisionByZero,
    /// Float arithmetic with no numeric result, such as `inf - inf`
    NotANumber,
}

/// A recoverable error. Evaluation went on with Nil in place of a value.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "{:?}: {}", self.kind, self.message)
    }
}

pub struct Lisp {
    heap: Heap,
    nil: CellRef,
    tee: CellRef,
    global: CellRef,
    signal: Arc<AtomicBool>,
    diagnostics: Vec<Diagnostic>,
    depth: usize,
    max_depth: usize,
    output: Box<dyn Port>,
}

impl Lisp {
    pub fn new() -> Result<Lisp, ExecutionError> {
        Lisp::with_config(&Config::default())
    }

    /// Allocates the singletons and the global frame, then registers the
    /// primitive library.
    pub fn with_config(config: &Config) -> Result<Lisp, ExecutionError> {
        let mut heap = Heap::new(config.max_cells);
        let nil = heap.allocate(Cell::Nil)?;
        let tee = heap.allocate(Cell::Tee)?;
        let global = heap.list(Vec::new())?;

        let mut lisp = Lisp {
            heap,
            nil,
            tee,
            global,
            signal: Arc::new(AtomicBool::new(false)),
            diagnostics: Vec::new(),
            depth: 0,
            max_depth: config.max_depth,
            output: Box::new(StdPort::stdio()),
        };

        let name = lisp.heap.symbol("nil")?;
        lisp.extend(name, nil, global)?;
        let name = lisp.heap.symbol("t")?;
        lisp.extend(name, tee, global)?;

        for &(name, fun) in stdlib::STDLIB.iter() {
            lisp.register(name, fun)?;
        }

        info!("{} primitives registered, {} cells live", stdlib::STDLIB.len(), lisp.heap.len());
        Ok(lisp)
    }

    /// Binds `name` to a new primitive in the global frame.
    pub fn register(&mut self, name: &str, fun: NativeFn) -> Result<CellRef, ExecutionError> {
        let primitive = self.heap.allocate(Cell::Primitive(Primitive {
            name: name.to_owned(),
            fun,
        }))?;
        let symbol = self.heap.symbol(name)?;
        self.define_global(symbol, primitive)?;
        Ok(primitive)
    }

    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    pub fn heap_mut(&mut self) -> &mut Heap {
        &mut self.heap
    }

    pub fn nil(&self) -> CellRef {
        self.nil
    }

    pub fn tee(&self) -> CellRef {
        self.tee
    }

    pub fn global(&self) -> CellRef {
        self.global
    }

    pub fn boolean(&self, b: bool) -> CellRef {
        if b {
            self.tee
        } else {
            self.nil
        }
    }

    pub fn display(&self, cell: CellRef) -> Printed {
        Printed(&self.heap, cell)
    }

    /// Flag checked by the evaluator before every list form. Safe to raise
    /// from another thread or a signal handler.
    pub fn signal(&self) -> Arc<AtomicBool> {
        self.signal.clone()
    }

    pub fn interrupt(&self) {
        self.signal.store(true, Ordering::SeqCst);
    }

    pub fn clear_interrupt(&self) {
        self.signal.store(false, Ordering::SeqCst);
    }

    fn interrupted(&self) -> bool {
        self.signal.load(Ordering::SeqCst)
    }

    /// Port the `print` primitive writes to. Standard output by default.
    pub fn output(&mut self) -> &mut dyn Port {
        &mut *self.output
    }

    pub fn set_output(&mut self, port: Box<dyn Port>) -> Box<dyn Port> {
        ::std::mem::replace(&mut self.output, port)
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        ::std::mem::replace(&mut self.diagnostics, Vec::new())
    }

    /// Records a recoverable error and hands back Nil for the caller to return.
    pub fn recoverable(&mut self, kind: DiagnosticKind, message: String) -> CellRef {
        warn!("{:?}: {}", kind, message);
        self.diagnostics.push(Diagnostic { kind, message });
        self.nil
    }

    /// Mark and sweep from the global frame, the singletons and `local`.
    pub fn collect(&mut self, local: Option<CellRef>) -> GcStats {
        let roots = [self.global, self.nil, self.tee];
        self.heap.collect(roots.iter().cloned().chain(local))
    }
}
