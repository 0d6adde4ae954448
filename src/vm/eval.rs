use super::{DiagnosticKind, ExecutionError, Lisp};
use crate::heap::{Cell, CellRef, Procedure};
use crate::printer::Printed;

pub const IF: &str = "if";
pub const BEGIN: &str = "begin";
pub const QUOTE: &str = "quote";
pub const SET: &str = "set";
pub const DEFINE: &str = "define";
pub const LAMBDA: &str = "lambda";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SpecialForm {
    If,
    Begin,
    Quote,
    Set,
    Define,
    Lambda,
}

impl SpecialForm {
    /// Matched by text alone: bindings of the same name never shadow a form.
    fn from_name(name: &str) -> Option<SpecialForm> {
        match name {
            IF => Some(SpecialForm::If),
            BEGIN => Some(SpecialForm::Begin),
            QUOTE => Some(SpecialForm::Quote),
            SET => Some(SpecialForm::Set),
            DEFINE => Some(SpecialForm::Define),
            LAMBDA => Some(SpecialForm::Lambda),
            _ => None,
        }
    }

    /// Operands expected after the keyword, `None` for any number
    fn arity(self) -> Option<usize> {
        match self {
            SpecialForm::If => Some(3),
            SpecialForm::Begin => None,
            SpecialForm::Quote => Some(1),
            SpecialForm::Set | SpecialForm::Define | SpecialForm::Lambda => Some(2),
        }
    }
}

impl Lisp {
    /// Evaluates `expr` with `local` as the innermost frame (`None` at top level).
    pub fn eval(
        &mut self,
        expr: CellRef,
        local: Option<CellRef>,
    ) -> Result<CellRef, ExecutionError> {
        if self.depth >= self.max_depth {
            return Err(ExecutionError::StackOverflow);
        }
        self.depth += 1;
        let result = self.eval_cell(expr, local);
        self.depth -= 1;
        result
    }

    fn eval_cell(
        &mut self,
        expr: CellRef,
        local: Option<CellRef>,
    ) -> Result<CellRef, ExecutionError> {
        if self.heap[expr].is_symbol() {
            return Ok(self.resolve(expr, local));
        }

        let elements = match self.heap[expr] {
            Cell::Nil
            | Cell::Tee
            | Cell::Integer(_)
            | Cell::Float(_)
            | Cell::String(_)
            | Cell::Procedure(_)
            | Cell::Primitive(_) => return Ok(expr),
            Cell::List(ref elements) if elements.is_empty() => return Ok(self.nil),
            Cell::List(ref elements) => elements.clone(),
            ref other => return Err(ExecutionError::UnimplementedType(other.type_name())),
        };

        if self.interrupted() {
            return Err(ExecutionError::Abort);
        }
        debug!("eval {}", Printed(&self.heap, expr));

        let form = self.heap[elements[0]].symbol().and_then(SpecialForm::from_name);
        match form {
            Some(form) => self.eval_special(form, expr, &elements[1..], local),
            None => self.eval_application(&elements, local),
        }
    }

    #[inline(never)]
    fn resolve(&mut self, symbol: CellRef, local: Option<CellRef>) -> CellRef {
        match self.lookup(symbol, local) {
            Some(value) => value,
            None => {
                let message = format!("unbound symbol '{}'", Printed(&self.heap, symbol));
                self.recoverable(DiagnosticKind::UnboundSymbol, message)
            }
        }
    }

    fn eval_special(
        &mut self,
        form: SpecialForm,
        expr: CellRef,
        operands: &[CellRef],
        local: Option<CellRef>,
    ) -> Result<CellRef, ExecutionError> {
        if let Some(n) = form.arity() {
            if operands.len() != n {
                return Ok(self.bad_operand_count(n, expr));
            }
        }

        match form {
            SpecialForm::If => {
                let test = self.eval(operands[0], local)?;
                let branch = if self.heap[test].is_nil() { operands[2] } else { operands[1] };
                self.eval(branch, local)
            }
            SpecialForm::Begin => {
                let mut last = self.nil;
                for &operand in operands {
                    last = self.eval(operand, local)?;
                }
                Ok(last)
            }
            SpecialForm::Quote => Ok(operands[0]),
            SpecialForm::Set => self.eval_set(expr, operands, local),
            SpecialForm::Define => {
                if !self.heap[operands[0]].is_symbol() {
                    return Ok(self.not_a_symbol(expr));
                }
                let value = self.eval(operands[1], local)?;
                self.define_global(operands[0], value)
            }
            SpecialForm::Lambda => self.eval_lambda(expr, operands, local),
        }
    }

    fn eval_set(
        &mut self,
        expr: CellRef,
        operands: &[CellRef],
        local: Option<CellRef>,
    ) -> Result<CellRef, ExecutionError> {
        let pair = match self.heap[operands[0]].symbol() {
            Some(name) => self.find_binding(name, local),
            None => return Ok(self.not_a_symbol(expr)),
        };
        let pair = match pair {
            Some(pair) => pair,
            None => return Ok(self.unbound_target(expr)),
        };
        let value = self.eval(operands[1], local)?;
        self.assign(pair, value);
        Ok(value)
    }

    fn eval_lambda(
        &mut self,
        expr: CellRef,
        operands: &[CellRef],
        local: Option<CellRef>,
    ) -> Result<CellRef, ExecutionError> {
        let valid_formals = match self.heap[operands[0]] {
            Cell::List(ref formals) => formals.iter().all(|&f| self.heap[f].is_symbol()),
            _ => false,
        };
        if !valid_formals {
            let message =
                format!("formals must be a list of symbols in {}", Printed(&self.heap, expr));
            return Ok(self.recoverable(DiagnosticKind::TypeMismatch, message));
        }

        let procedure = Procedure {
            formals: operands[0],
            body: operands[1],
            captured: self.snapshot(local),
        };
        Ok(self.heap.allocate(Cell::Procedure(procedure))?)
    }

    // Out of line, off the recursive path

    #[inline(never)]
    fn bad_operand_count(&mut self, expected: usize, expr: CellRef) -> CellRef {
        let message = format!("expected {} operands in {}", expected, Printed(&self.heap, expr));
        self.recoverable(DiagnosticKind::ArityMismatch, message)
    }

    #[inline(never)]
    fn unbound_target(&mut self, expr: CellRef) -> CellRef {
        let message = format!("cannot set undefined variable in {}", Printed(&self.heap, expr));
        self.recoverable(DiagnosticKind::UnboundSymbol, message)
    }

    #[inline(never)]
    fn not_a_symbol(&mut self, expr: CellRef) -> CellRef {
        let message = format!("expected a symbol in {}", Printed(&self.heap, expr));
        self.recoverable(DiagnosticKind::TypeMismatch, message)
    }

    // Head first, then every operand left to right
    fn eval_application(
        &mut self,
        elements: &[CellRef],
        local: Option<CellRef>,
    ) -> Result<CellRef, ExecutionError> {
        let callee = self.eval(elements[0], local)?;

        let mut args = Vec::with_capacity(elements.len() - 1);
        for &operand in &elements[1..] {
            args.push(self.eval(operand, local)?);
        }

        self.apply(callee, &args, local)
    }
}
