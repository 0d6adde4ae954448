//! Textual form of cells. Atoms and lists print so the reader gets them back.
use std::fmt::{self, Display, Formatter, Write};

use crate::heap::{Cell, CellRef, Heap};
use crate::port::{Port, PortError};
use crate::reader::SYMBOL_ESCAPES;

/// A cell paired with the heap it lives in, for `{}` formatting.
pub struct Printed<'a>(pub &'a Heap, pub CellRef);

impl<'a> Display for Printed<'a> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let Printed(heap, cell) = *self;

        match heap[cell] {
            Cell::Nil => f.write_str("nil"),
            Cell::Tee => f.write_str("t"),
            Cell::Integer(n) => write!(f, "{}", n),
            // Overflows to infinity when read back
            Cell::Float(x) if x == f64::INFINITY => f.write_str("1e999"),
            Cell::Float(x) if x == f64::NEG_INFINITY => f.write_str("-1e999"),
            Cell::Float(x) => write!(f, "{:?}", x),
            Cell::String(ref s) => {
                f.write_char('"')?;
                for c in s.chars() {
                    match c {
                        '"' => f.write_str("\\\"")?,
                        '\\' => f.write_str("\\\\")?,
                        '\n' => f.write_str("\\n")?,
                        c => f.write_char(c)?,
                    }
                }
                f.write_char('"')
            }
            Cell::Symbol(ref s) => {
                for c in s.chars() {
                    if SYMBOL_ESCAPES.contains(&c) {
                        f.write_char('\\')?;
                    }
                    f.write_char(c)?;
                }
                Ok(())
            }
            Cell::List(ref elements) => {
                f.write_char('(')?;
                for (i, &element) in elements.iter().enumerate() {
                    if i > 0 {
                        f.write_char(' ')?;
                    }
                    write!(f, "{}", Printed(heap, element))?;
                }
                f.write_char(')')
            }
            Cell::Procedure(_) => f.write_str("<procedure>"),
            Cell::Primitive(ref p) => write!(f, "<primitive {}>", p.name),
            Cell::File(ref name) => write!(f, "<file {}>", name),
            Cell::Error(ref message) => write!(f, "<error {}>", message),
        }
    }
}

/// Writes the printed form of `cell` to `port`, without a trailing newline.
pub fn print<P: Port + ?Sized>(port: &mut P, heap: &Heap, cell: CellRef) -> Result<(), PortError> {
    port.write_str(&Printed(heap, cell).to_string())
}
