use super::{DiagnosticKind, ExecutionError, Lisp};
use crate::heap::{Cell, CellRef};
use crate::printer::Printed;

impl Lisp {
    /// Calls `callee` with already evaluated `args`.
    ///
    /// A procedure body runs in a fresh frame: the bindings captured at
    /// `lambda` time followed by one pair per formal parameter.
    pub fn apply(
        &mut self,
        callee: CellRef,
        args: &[CellRef],
        local: Option<CellRef>,
    ) -> Result<CellRef, ExecutionError> {
        let (formals, body, captured) = match self.heap[callee] {
            Cell::Primitive(ref primitive) => {
                debug!("apply <primitive {}> to {} operands", primitive.name, args.len());
                let fun = primitive.fun;
                return fun(self, args, local);
            }
            Cell::Procedure(ref procedure) => {
                (procedure.formals, procedure.body, procedure.captured.to_vec())
            }
            _ => return Ok(self.not_callable(callee)),
        };

        let names = self.heap[formals].list().map(|names| names.to_vec()).unwrap_or_default();
        if names.len() != args.len() {
            return Ok(self.wrong_argument_count(formals, names.len(), args.len()));
        }

        let frame = self.heap.list(captured)?;
        for (&name, &arg) in names.iter().zip(args) {
            self.extend(name, arg, frame)?;
        }

        debug!(
            "apply <procedure> in a frame of {} bindings",
            self.heap[frame].list().map_or(0, |b| b.len())
        );
        self.eval(body, Some(frame))
    }

    #[inline(never)]
    fn not_callable(&mut self, callee: CellRef) -> CellRef {
        let message = format!("{} is not callable", Printed(&self.heap, callee));
        self.recoverable(DiagnosticKind::TypeMismatch, message)
    }

    #[inline(never)]
    fn wrong_argument_count(&mut self, formals: CellRef, expected: usize, got: usize) -> CellRef {
        let message = format!(
            "procedure expects {} operands, got {}: {}",
            expected,
            got,
            Printed(&self.heap, formals)
        );
        self.recoverable(DiagnosticKind::ArityMismatch, message)
    }
}
