//! Convert characters into cell trees, one s-expression per call
use std::error::Error;
use std::fmt;

use fallible_iterator::FallibleIterator;

use crate::heap::{Cell, CellRef, Heap, OutOfMemory};
use crate::port::{Port, PortError};

mod number;


#[derive(Debug, PartialEq)]
pub enum ReaderError {
    /// End of stream inside a list or a string
    UnexpectedEof,
    UnmatchedClose,
    InvalidEscape(char),
    /// A bare `"` in the middle of a symbol
    UnexpectedQuote,
    /// Lists nested deeper than `MAX_NESTING`. The rest of the form is skipped.
    TooDeep,
    Port(PortError),
    OutOfMemory,
}

impl ReaderError {
    /// True when more input could complete the form
    pub fn is_incomplete(&self) -> bool {
        *self == ReaderError::UnexpectedEof
    }
}

impl fmt::Display for ReaderError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ReaderError::UnexpectedEof => fmt.write_str("unexpected end of input"),
            ReaderError::UnmatchedClose => fmt.write_str("unmatched ')'"),
            ReaderError::InvalidEscape(c) => write!(fmt, "invalid escape '\\{}'", c),
            ReaderError::UnexpectedQuote => fmt.write_str("unescaped '\"' in symbol"),
            ReaderError::TooDeep => write!(fmt, "lists nested deeper than {}", MAX_NESTING),
            ReaderError::Port(ref e) => write!(fmt, "{}", e),
            ReaderError::OutOfMemory => write!(fmt, "{}", OutOfMemory),
        }
    }
}

impl Error for ReaderError {}

impl From<PortError> for ReaderError {
    fn from(e: PortError) -> ReaderError {
        ReaderError::Port(e)
    }
}

impl From<OutOfMemory> for ReaderError {
    fn from(_: OutOfMemory) -> ReaderError {
        ReaderError::OutOfMemory
    }
}

/// Reads the next form. `Ok(None)` once the stream is exhausted between forms.
///
/// A failed read hands back no tree; cells allocated on the way are left
/// unreachable for the collector.
pub fn read<P: Port + ?Sized>(
    port: &mut P,
    heap: &mut Heap,
) -> Result<Option<CellRef>, ReaderError> {
    match skip_whitespace(port)? {
        Some(c) => parse_form(c, port, heap, 0).map(Some),
        None => Ok(None),
    }
}

/// Every form left in a port
pub struct Forms<'a, P: Port + ?Sized> {
    port: &'a mut P,
    heap: &'a mut Heap,
}

impl<'a, P: Port + ?Sized> Forms<'a, P> {
    pub fn new(port: &'a mut P, heap: &'a mut Heap) -> Forms<'a, P> {
        Forms { port, heap }
    }

    pub fn heap(&self) -> &Heap {
        self.heap
    }
}

impl<'a, P: Port + ?Sized> FallibleIterator for Forms<'a, P> {
    type Item = CellRef;
    type Error = ReaderError;

    fn next(&mut self) -> Result<Option<CellRef>, ReaderError> {
        read(self.port, self.heap)
    }
}

fn skip_comment<P: Port + ?Sized>(port: &mut P) -> Result<(), ReaderError> {
    while let Some(c) = port.read_char()? {
        if c == '\n' {
            break;
        }
    }
    Ok(())
}

// First character that isn't whitespace or part of a comment
fn skip_whitespace<P: Port + ?Sized>(port: &mut P) -> Result<Option<char>, ReaderError> {
    while let Some(c) = port.read_char()? {
        match c {
            '#' => skip_comment(port)?,
            c if c.is_whitespace() => {}
            c => return Ok(Some(c)),
        }
    }
    Ok(None)
}

fn parse_form<P: Port + ?Sized>(
    first: char,
    port: &mut P,
    heap: &mut Heap,
    depth: usize,
) -> Result<CellRef, ReaderError> {
    match first {
        '(' if depth >= MAX_NESTING => {
            skip_open_lists(port, 1)?;
            Err(ReaderError::TooDeep)
        }
        '(' => parse_list(port, heap, depth + 1),
        ')' => Err(ReaderError::UnmatchedClose),
        '"' => parse_string(port, heap),
        c => {
            port.unread_char(c)?;
            parse_atom(port, heap)
        }
    }
}

// Assumes the opening paren has been consumed
fn parse_list<P: Port + ?Sized>(
    port: &mut P,
    heap: &mut Heap,
    depth: usize,
) -> Result<CellRef, ReaderError> {
    let mut elements = Vec::new();

    loop {
        match skip_whitespace(port)? {
            None => return Err(ReaderError::UnexpectedEof),
            Some(')') => return Ok(heap.list(elements)?),
            Some(c) => match parse_form(c, port, heap, depth) {
                Ok(element) => elements.push(element),
                Err(ReaderError::TooDeep) => {
                    skip_open_lists(port, 1)?;
                    return Err(ReaderError::TooDeep);
                }
                Err(e) => return Err(e),
            },
        }
    }
}

// Consumes input until `open` lists are closed, stepping over strings,
// escapes and comments. Stops quietly at the end of the stream.
fn skip_open_lists<P: Port + ?Sized>(port: &mut P, mut open: usize) -> Result<(), ReaderError> {
    let mut in_string = false;

    while open > 0 {
        let c = match port.read_char()? {
            Some(c) => c,
            None => break,
        };
        match c {
            '\\' => {
                port.read_char()?;
            }
            '"' => in_string = !in_string,
            _ if in_string => {}
            '#' => skip_comment(port)?,
            '(' => open += 1,
            ')' => open -= 1,
            _ => {}
        }
    }
    Ok(())
}

// Assumes the opening quote has been consumed
fn parse_string<P: Port + ?Sized>(port: &mut P, heap: &mut Heap) -> Result<CellRef, ReaderError> {
    let mut buffer = String::new();

    loop {
        match port.read_char()?.ok_or(ReaderError::UnexpectedEof)? {
            '"' => return Ok(heap.allocate(Cell::String(buffer))?),
            '\\' => match port.read_char()?.ok_or(ReaderError::UnexpectedEof)? {
                '"' => buffer.push('"'),
                '\\' => buffer.push('\\'),
                'n' => buffer.push('\n'),
                c => return Err(ReaderError::InvalidEscape(c)),
            },
            c => buffer.push(c),
        }
    }
}

/// Deepest list nesting the reader accepts
pub const MAX_NESTING: usize = 512;

/// Characters a symbol can only carry escaped
pub(crate) const SYMBOL_ESCAPES: &[char] = &['(', ')', '"', '\\', '#'];

// A symbol or a number, ended by whitespace, a paren, a comment or the stream
fn parse_atom<P: Port + ?Sized>(port: &mut P, heap: &mut Heap) -> Result<CellRef, ReaderError> {
    let mut buffer = String::new();
    let mut escaped = false;

    while let Some(c) = port.read_char()? {
        match c {
            '(' | ')' => {
                port.unread_char(c)?;
                break;
            }
            '#' => {
                skip_comment(port)?;
                break;
            }
            '"' => return Err(ReaderError::UnexpectedQuote),
            '\\' => match port.read_char()?.ok_or(ReaderError::UnexpectedEof)? {
                e if SYMBOL_ESCAPES.contains(&e) => {
                    escaped = true;
                    buffer.push(e);
                }
                e => return Err(ReaderError::InvalidEscape(e)),
            },
            c if c.is_whitespace() => break,
            c => buffer.push(c),
        }
    }

    let cell = if escaped {
        None
    } else {
        number::parse(&buffer)
    };

    Ok(heap.allocate(cell.unwrap_or(Cell::Symbol(buffer)))?)
}
