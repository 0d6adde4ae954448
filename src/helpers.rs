//
// Macros for primitives
//

/// Records a recoverable diagnostic and returns Nil from the enclosing primitive.
macro_rules! recover {
    ($lisp:expr, $kind:ident, $($arg:tt)+) => ({
        let message = format!($($arg)+);
        return Ok($lisp.recoverable($crate::vm::DiagnosticKind::$kind, message));
    });
}

macro_rules! argc {
    ($lisp:expr, $name:expr, $args:expr, $n:expr) => (
        if $args.len() != $n {
            recover!(
                $lisp,
                ArityMismatch,
                "{} expects {} operands, got {}",
                $name,
                $n,
                $args.len()
            );
        }
    );
    ($lisp:expr, $name:expr, $args:expr, $n:expr, ..) => (
        if $args.len() < $n {
            recover!(
                $lisp,
                ArityMismatch,
                "{} expects at least {} operands, got {}",
                $name,
                $n,
                $args.len()
            );
        }
    );
}

/// Unwraps an operand conversion or bails out with a TypeMismatch naming the operand.
macro_rules! operand {
    ($lisp:expr, $name:expr, $conversion:expr, $cell:expr, $expected:expr) => (
        match $conversion {
            Some(value) => value,
            None => {
                let printed = $crate::printer::Printed($lisp.heap(), $cell).to_string();
                recover!($lisp, TypeMismatch, "{}: expected {}, got {}", $name, $expected, printed);
            }
        }
    );
}
