use std::fmt::{Debug, Formatter, Result as FmtResult};

use super::CellRef;
use crate::vm::{ExecutionError, Lisp};

/// Native procedure: evaluated operands and the active local frame.
pub type NativeFn = fn(&mut Lisp, &[CellRef], Option<CellRef>) -> Result<CellRef, ExecutionError>;

/// Lisp values
#[derive(Debug, Clone)]
pub enum Cell {
    /// The empty value, also "false"
    Nil,
    /// The canonical true value
    Tee,
    /// A 64-bit signed integer
    Integer(i64),
    /// A 64-bit float
    Float(f64),
    /// A string (`"foo"`)
    String(String),
    /// A symbol. Never interned: compare by content
    Symbol(String),
    /// An ordered sequence of cells
    List(Vec<CellRef>),
    /// A user procedure built by `lambda`
    Procedure(Procedure),
    /// A natively implemented procedure
    Primitive(Primitive),
    /// A file handle
    File(String),
    /// An error marker
    Error(String),
}

#[derive(Debug, Clone)]
pub struct Procedure {
    pub formals: CellRef,
    pub body: CellRef,
    /// Copy of the defining frame's binding pairs at `lambda` time
    pub captured: Box<[CellRef]>,
}

#[derive(Clone)]
pub struct Primitive {
    pub name: String,
    pub fun: NativeFn,
}

impl Debug for Primitive {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "Primitive({})", self.name)
    }
}

macro_rules! simple_type {
    ($name:ident, $var:pat) => {
        pub fn $name(&self) -> bool {
            match *self {
                $var => true,
                _ => false,
            }
        }
    };
    ($name:ident, $var:pat, $var2:pat) => {
        pub fn $name(&self) -> bool {
            match *self {
                $var | $var2 => true,
                _ => false,
            }
        }
    };
}

impl Cell {
    simple_type!(is_nil, Cell::Nil);
    simple_type!(is_symbol, Cell::Symbol(..));
    simple_type!(is_string, Cell::String(..));
    simple_type!(is_number, Cell::Integer(..), Cell::Float(..));

    pub fn symbol(&self) -> Option<&str> {
        match *self {
            Cell::Symbol(ref s) => Some(s),
            _ => None,
        }
    }

    pub fn list(&self) -> Option<&[CellRef]> {
        match *self {
            Cell::List(ref elements) => Some(elements),
            _ => None,
        }
    }

    /// Name of the variant, used in diagnostics and by `eqt`
    pub fn type_name(&self) -> &'static str {
        match *self {
            Cell::Nil => "nil",
            Cell::Tee => "t",
            Cell::Integer(_) => "integer",
            Cell::Float(_) => "float",
            Cell::String(_) => "string",
            Cell::Symbol(_) => "symbol",
            Cell::List(_) => "list",
            Cell::Procedure(_) => "procedure",
            Cell::Primitive(_) => "primitive",
            Cell::File(_) => "file",
            Cell::Error(_) => "error",
        }
    }

    /// Pushes every cell this one refers to. Atoms refer to nothing.
    pub(super) fn trace(&self, out: &mut Vec<CellRef>) {
        match *self {
            Cell::List(ref elements) => out.extend_from_slice(elements),
            Cell::Procedure(Procedure {
                formals,
                body,
                ref captured,
            }) => {
                out.push(formals);
                out.push(body);
                out.extend_from_slice(captured);
            }
            Cell::Nil
            | Cell::Tee
            | Cell::Integer(_)
            | Cell::Float(_)
            | Cell::String(_)
            | Cell::Symbol(_)
            | Cell::Primitive(_)
            | Cell::File(_)
            | Cell::Error(_) => {}
        }
    }
}
