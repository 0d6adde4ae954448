//! Primitive procedures bound in every global frame.
use std::cmp::Ordering;
use std::mem::discriminant;

use super::{ExecutionError, Lisp};
use crate::heap::{Cell, CellRef, NativeFn};
use crate::port::{Port, PortError};
use crate::printer::Printed;

type PrimitiveResult = Result<CellRef, ExecutionError>;

pub(super) const STDLIB: &[(&str, NativeFn)] = &[
    ("+", add),
    ("-", sub),
    ("*", mul),
    ("/", div),
    ("mod", modulo),
    ("=", num_eq),
    ("<", less),
    (">", greater),
    ("eq", eq),
    ("eqt", eqt),
    ("car", car),
    ("cdr", cdr),
    ("cons", cons),
    ("list", list),
    ("nth", nth),
    ("length", length),
    ("reverse", reverse),
    ("scar", scar),
    ("scdr", scdr),
    ("scons", scons),
    ("print", print),
];

#[derive(Debug, Clone, Copy, PartialEq)]
enum Number {
    Integer(i64),
    Float(f64),
}

impl Number {
    fn from_cell(cell: &Cell) -> Option<Number> {
        match *cell {
            Cell::Integer(n) => Some(Number::Integer(n)),
            Cell::Float(x) => Some(Number::Float(x)),
            _ => None,
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            Number::Integer(n) => n as f64,
            Number::Float(x) => x,
        }
    }

    fn compare(self, other: Number) -> Option<Ordering> {
        match (self, other) {
            (Number::Integer(a), Number::Integer(b)) => Some(a.cmp(&b)),
            (a, b) => a.as_f64().partial_cmp(&b.as_f64()),
        }
    }

    fn allocate(self, lisp: &mut Lisp) -> PrimitiveResult {
        Ok(match self {
            Number::Integer(n) => lisp.heap_mut().integer(n)?,
            Number::Float(x) => lisp.heap_mut().float(x)?,
        })
    }
}

#[derive(Debug, Clone, Copy)]
enum Arithmetic {
    Add,
    Sub,
    Mul,
    Div,
}

impl Arithmetic {
    /// `None` on a zero divisor. Integers wrap, mixed operands become floats.
    fn combine(self, a: Number, b: Number) -> Option<Number> {
        use self::Arithmetic::*;

        match (a, b) {
            (Number::Integer(x), Number::Integer(y)) => Some(Number::Integer(match self {
                Add => x.wrapping_add(y),
                Sub => x.wrapping_sub(y),
                Mul => x.wrapping_mul(y),
                Div if y == 0 => return None,
                Div => x.wrapping_div(y),
            })),
            (a, b) => {
                let (x, y) = (a.as_f64(), b.as_f64());
                Some(Number::Float(match self {
                    Add => x + y,
                    Sub => x - y,
                    Mul => x * y,
                    Div if y == 0.0 => return None,
                    Div => x / y,
                }))
            }
        }
    }
}

fn number(lisp: &Lisp, cell: CellRef) -> Option<Number> {
    Number::from_cell(&lisp.heap()[cell])
}

fn arithmetic(lisp: &mut Lisp, name: &str, args: &[CellRef], op: Arithmetic) -> PrimitiveResult {
    argc!(lisp, name, args, 1, ..);

    let mut acc = operand!(lisp, name, number(lisp, args[0]), args[0], "a number");
    for &arg in &args[1..] {
        let n = operand!(lisp, name, number(lisp, arg), arg, "a number");
        acc = match op.combine(acc, n) {
            Some(Number::Float(x)) if x.is_nan() => {
                recover!(lisp, NotANumber, "{}: no numeric result", name)
            }
            Some(result) => result,
            None => recover!(lisp, DivisionByZero, "{}: division by zero", name),
        };
    }

    acc.allocate(lisp)
}

fn add(lisp: &mut Lisp, args: &[CellRef], _: Option<CellRef>) -> PrimitiveResult {
    arithmetic(lisp, "+", args, Arithmetic::Add)
}

fn sub(lisp: &mut Lisp, args: &[CellRef], _: Option<CellRef>) -> PrimitiveResult {
    arithmetic(lisp, "-", args, Arithmetic::Sub)
}

fn mul(lisp: &mut Lisp, args: &[CellRef], _: Option<CellRef>) -> PrimitiveResult {
    arithmetic(lisp, "*", args, Arithmetic::Mul)
}

fn div(lisp: &mut Lisp, args: &[CellRef], _: Option<CellRef>) -> PrimitiveResult {
    arithmetic(lisp, "/", args, Arithmetic::Div)
}

fn modulo(lisp: &mut Lisp, args: &[CellRef], _: Option<CellRef>) -> PrimitiveResult {
    argc!(lisp, "mod", args, 2);

    let integer = |lisp: &Lisp, cell: CellRef| match lisp.heap()[cell] {
        Cell::Integer(n) => Some(n),
        _ => None,
    };
    let a = operand!(lisp, "mod", integer(lisp, args[0]), args[0], "an integer");
    let b = operand!(lisp, "mod", integer(lisp, args[1]), args[1], "an integer");
    if b == 0 {
        recover!(lisp, DivisionByZero, "mod: division by zero");
    }

    Ok(lisp.heap_mut().integer(a.wrapping_rem(b))?)
}

// True when every adjacent pair of operands is ordered as `expected`
fn chain(lisp: &mut Lisp, name: &str, args: &[CellRef], expected: Ordering) -> PrimitiveResult {
    argc!(lisp, name, args, 1, ..);

    let mut numbers = Vec::with_capacity(args.len());
    for &arg in args {
        numbers.push(operand!(lisp, name, number(lisp, arg), arg, "a number"));
    }

    let holds = numbers.windows(2).all(|w| w[0].compare(w[1]) == Some(expected));
    Ok(lisp.boolean(holds))
}

fn num_eq(lisp: &mut Lisp, args: &[CellRef], _: Option<CellRef>) -> PrimitiveResult {
    chain(lisp, "=", args, Ordering::Equal)
}

fn less(lisp: &mut Lisp, args: &[CellRef], _: Option<CellRef>) -> PrimitiveResult {
    chain(lisp, "<", args, Ordering::Less)
}

fn greater(lisp: &mut Lisp, args: &[CellRef], _: Option<CellRef>) -> PrimitiveResult {
    chain(lisp, ">", args, Ordering::Greater)
}

fn eq(lisp: &mut Lisp, args: &[CellRef], _: Option<CellRef>) -> PrimitiveResult {
    argc!(lisp, "eq", args, 2);
    let same = lisp.heap().equal(args[0], args[1]);
    Ok(lisp.boolean(same))
}

fn eqt(lisp: &mut Lisp, args: &[CellRef], _: Option<CellRef>) -> PrimitiveResult {
    argc!(lisp, "eqt", args, 1, ..);
    let heap = lisp.heap();
    let first = discriminant(&heap[args[0]]);
    let same = args[1..].iter().all(|&arg| discriminant(&heap[arg]) == first);
    Ok(lisp.boolean(same))
}

// Nil stands in for the empty list
fn elements(lisp: &Lisp, cell: CellRef) -> Option<Vec<CellRef>> {
    match lisp.heap()[cell] {
        Cell::List(ref elements) => Some(elements.clone()),
        Cell::Nil => Some(Vec::new()),
        _ => None,
    }
}

fn string(lisp: &Lisp, cell: CellRef) -> Option<String> {
    match lisp.heap()[cell] {
        Cell::String(ref s) => Some(s.clone()),
        _ => None,
    }
}

/// Fresh list, or Nil when there is nothing to put in it
fn list_or_nil(lisp: &mut Lisp, elements: Vec<CellRef>) -> PrimitiveResult {
    if elements.is_empty() {
        Ok(lisp.nil())
    } else {
        Ok(lisp.heap_mut().list(elements)?)
    }
}

fn car(lisp: &mut Lisp, args: &[CellRef], _: Option<CellRef>) -> PrimitiveResult {
    argc!(lisp, "car", args, 1);
    let elements = operand!(lisp, "car", elements(lisp, args[0]), args[0], "a list");
    Ok(elements.first().cloned().unwrap_or_else(|| lisp.nil()))
}

fn cdr(lisp: &mut Lisp, args: &[CellRef], _: Option<CellRef>) -> PrimitiveResult {
    argc!(lisp, "cdr", args, 1);
    let elements = operand!(lisp, "cdr", elements(lisp, args[0]), args[0], "a list");
    if elements.len() <= 1 {
        return Ok(lisp.nil());
    }
    Ok(lisp.heap_mut().list(elements[1..].to_vec())?)
}

// Copies the tail's elements so the result never aliases it
fn cons(lisp: &mut Lisp, args: &[CellRef], _: Option<CellRef>) -> PrimitiveResult {
    argc!(lisp, "cons", args, 2);

    let mut result = vec![args[0]];
    match lisp.heap()[args[1]] {
        Cell::List(ref tail) => result.extend_from_slice(tail),
        Cell::Nil => {}
        _ => result.push(args[1]),
    }

    Ok(lisp.heap_mut().list(result)?)
}

fn list(lisp: &mut Lisp, args: &[CellRef], _: Option<CellRef>) -> PrimitiveResult {
    list_or_nil(lisp, args.to_vec())
}

/// Position `index` in a sequence of `len`, negative counting from the end
fn position(index: i64, len: usize) -> Option<usize> {
    let len = len as i64;
    let index = if index < 0 { index + len } else { index };
    if index >= 0 && index < len {
        Some(index as usize)
    } else {
        None
    }
}

fn nth(lisp: &mut Lisp, args: &[CellRef], _: Option<CellRef>) -> PrimitiveResult {
    argc!(lisp, "nth", args, 2);

    let index = match lisp.heap()[args[0]] {
        Cell::Integer(n) => Some(n),
        _ => None,
    };
    let index = operand!(lisp, "nth", index, args[0], "an integer");

    if let Some(s) = string(lisp, args[1]) {
        let chars: Vec<char> = s.chars().collect();
        return match position(index, chars.len()) {
            Some(i) => Ok(lisp.heap_mut().string(&chars[i].to_string())?),
            None => Ok(lisp.nil()),
        };
    }

    let elements = operand!(lisp, "nth", elements(lisp, args[1]), args[1], "a list or a string");
    Ok(position(index, elements.len()).map_or(lisp.nil(), |i| elements[i]))
}

fn length(lisp: &mut Lisp, args: &[CellRef], _: Option<CellRef>) -> PrimitiveResult {
    argc!(lisp, "length", args, 1);

    let len = match lisp.heap()[args[0]] {
        Cell::List(ref elements) => Some(elements.len()),
        Cell::String(ref s) => Some(s.chars().count()),
        Cell::Nil => Some(0),
        _ => None,
    };
    let len = operand!(lisp, "length", len, args[0], "a list or a string");

    Ok(lisp.heap_mut().integer(len as i64)?)
}

fn reverse(lisp: &mut Lisp, args: &[CellRef], _: Option<CellRef>) -> PrimitiveResult {
    argc!(lisp, "reverse", args, 1);

    if let Some(s) = string(lisp, args[0]) {
        let reversed: String = s.chars().rev().collect();
        return Ok(lisp.heap_mut().string(&reversed)?);
    }

    let mut elements =
        operand!(lisp, "reverse", elements(lisp, args[0]), args[0], "a list or a string");
    elements.reverse();
    list_or_nil(lisp, elements)
}

fn scar(lisp: &mut Lisp, args: &[CellRef], _: Option<CellRef>) -> PrimitiveResult {
    argc!(lisp, "scar", args, 1);
    let s = operand!(lisp, "scar", string(lisp, args[0]), args[0], "a string");

    match s.chars().next() {
        Some(c) => Ok(lisp.heap_mut().string(&c.to_string())?),
        None => Ok(lisp.nil()),
    }
}

fn scdr(lisp: &mut Lisp, args: &[CellRef], _: Option<CellRef>) -> PrimitiveResult {
    argc!(lisp, "scdr", args, 1);
    let s = operand!(lisp, "scdr", string(lisp, args[0]), args[0], "a string");

    let mut chars = s.chars();
    match (chars.next(), chars.as_str()) {
        (Some(_), rest) if !rest.is_empty() => Ok(lisp.heap_mut().string(rest)?),
        _ => Ok(lisp.nil()),
    }
}

fn scons(lisp: &mut Lisp, args: &[CellRef], _: Option<CellRef>) -> PrimitiveResult {
    argc!(lisp, "scons", args, 2);
    let mut a = operand!(lisp, "scons", string(lisp, args[0]), args[0], "a string");
    let b = operand!(lisp, "scons", string(lisp, args[1]), args[1], "a string");
    a.push_str(&b);
    Ok(lisp.heap_mut().string(&a)?)
}

fn write_line(port: &mut dyn Port, line: &str) -> Result<(), PortError> {
    port.write_str(line)?;
    port.flush()
}

fn print(lisp: &mut Lisp, args: &[CellRef], _: Option<CellRef>) -> PrimitiveResult {
    let mut line = args
        .iter()
        .map(|&arg| Printed(lisp.heap(), arg).to_string())
        .collect::<Vec<_>>()
        .join(" ");
    line.push('\n');

    if let Err(e) = write_line(lisp.output(), &line) {
        error!("print: {}", e);
    }

    Ok(args.last().cloned().unwrap_or_else(|| lisp.nil()))
}
