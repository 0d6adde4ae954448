use super::{evaluate, interpret, InterpreterError, Session};
use crate::port::StringPort;
use crate::reader::ReaderError;
use crate::vm::{DiagnosticKind, ExecutionError, Lisp};

use self::DiagnosticKind::*;

macro_rules! with_std {
    ($code:expr) => {
        evaluate(&mut Lisp::new().expect("interpreter"), $code)
    };
}

macro_rules! ok {
    ($printed:expr) => {
        Ok($printed.to_string())
    };
}

macro_rules! rt_err {
    ($err:expr) => {
        Err(InterpreterError::Exec($err))
    };
}

// Value and diagnostic kinds of a single evaluation
macro_rules! with_diagnostics {
    ($code:expr) => {{
        let mut lisp = Lisp::new().expect("interpreter");
        let value = evaluate(&mut lisp, $code).expect("no unwinding");
        let kinds: Vec<DiagnosticKind> =
            lisp.take_diagnostics().into_iter().map(|d| d.kind).collect();
        (value, kinds)
    }};
}

fn outcomes(lisp: &mut Lisp, source: &str) -> Vec<Result<String, InterpreterError>> {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut port = StringPort::new(source);
    let mut seen = Vec::new();
    interpret(lisp, &mut port, |lisp, outcome| {
        seen.push(outcome.map(|value| lisp.display(value).to_string()));
        true
    });
    seen
}

#[test]
fn two_expressions() {
    assert_eq!(with_std!["1\n(quote b)"], ok!["b"]);
}

#[test]
fn no_forms() {
    assert_eq!(with_std![""], Err(InterpreterError::Eof));
    assert_eq!(with_std!["  # nothing here"], Err(InterpreterError::Eof));
}

#[test]
fn parse_error_stops_evaluate() {
    assert_eq!(with_std!["(a"], Err(InterpreterError::Reader(ReaderError::UnexpectedEof)));
    assert_eq!(with_std!["1 )"], Err(InterpreterError::Reader(ReaderError::UnmatchedClose)));
}

#[test]
fn stdlib_arithmetic() {
    assert_eq!(with_std!["(+ 1 2 3)"], ok!["6"]);
    assert_eq!(with_std!["(+ 1 2.5)"], ok!["3.5"]);
    assert_eq!(with_std!["(- 10 1 2)"], ok!["7"]);
    assert_eq!(with_std!["(- 5)"], ok!["5"]);
    assert_eq!(with_std!["(* 2 3 4)"], ok!["24"]);
    assert_eq!(with_std!["(/ 7 2)"], ok!["3"]);
    assert_eq!(with_std!["(/ 7.0 2)"], ok!["3.5"]);
    assert_eq!(with_std!["(mod 7 3)"], ok!["1"]);
    assert_eq!(with_std!["(+ 9223372036854775807 1)"], ok!["-9223372036854775808"]);
}

#[test]
fn stdlib_arithmetic_errors() {
    assert_eq!(with_diagnostics!["(/ 1 0)"], ("nil".to_string(), vec![DivisionByZero]));
    assert_eq!(with_diagnostics!["(/ 1.5 0.0)"], ("nil".to_string(), vec![DivisionByZero]));
    assert_eq!(with_diagnostics!["(mod 1 0)"], ("nil".to_string(), vec![DivisionByZero]));
    assert_eq!(with_diagnostics!["(mod 1.5 1)"], ("nil".to_string(), vec![TypeMismatch]));
    assert_eq!(with_diagnostics!["(+)"], ("nil".to_string(), vec![ArityMismatch]));
    assert_eq!(with_diagnostics!["(+ 1 \"a\")"], ("nil".to_string(), vec![TypeMismatch]));
    assert_eq!(with_diagnostics!["(mod 1)"], ("nil".to_string(), vec![ArityMismatch]));
    assert_eq!(with_diagnostics!["(- 1e999 1e999)"], ("nil".to_string(), vec![NotANumber]));
    assert_eq!(with_diagnostics!["(* 0 -1e999)"], ("nil".to_string(), vec![NotANumber]));
}

#[test]
fn overflowing_floats_print_readably() {
    assert_eq!(with_std!["(* 1e308 10.0)"], ok!["1e999"]);
    assert_eq!(with_std!["(- 0 1e999)"], ok!["-1e999"]);
    assert_eq!(with_std!["(eqt (quote 1e999) 1.0)"], ok!["t"]);
    assert_eq!(with_std!["(= 1e999 (* 1e308 10.0))"], ok!["t"]);
}

#[test]
fn stdlib_comparison() {
    assert_eq!(with_std!["(= 1 1 1)"], ok!["t"]);
    assert_eq!(with_std!["(= 1 1.0)"], ok!["t"]);
    assert_eq!(with_std!["(< 1 2 3)"], ok!["t"]);
    assert_eq!(with_std!["(< 1 3 2)"], ok!["nil"]);
    assert_eq!(with_std!["(> 3 2.5)"], ok!["t"]);
    assert_eq!(with_std!["(> 1)"], ok!["t"]);
}

#[test]
fn stdlib_equality() {
    assert_eq!(with_std!["(eq (list 1 (list 2)) (list 1 (list 2)))"], ok!["t"]);
    assert_eq!(with_std!["(eq \"a\" (quote a))"], ok!["nil"]);
    assert_eq!(with_std!["(eq (quote a) (quote a))"], ok!["t"]);
    assert_eq!(with_std!["(eqt 1 2 3)"], ok!["t"]);
    assert_eq!(with_std!["(eqt 1 2.0)"], ok!["nil"]);
    assert_eq!(with_diagnostics!["(eq 1)"], ("nil".to_string(), vec![ArityMismatch]));
}

#[test]
fn stdlib_lists() {
    assert_eq!(with_std!["(car (list 1 2 3))"], ok!["1"]);
    assert_eq!(with_std!["(car nil)"], ok!["nil"]);
    assert_eq!(with_std!["(cdr (list 1 2 3))"], ok!["(2 3)"]);
    assert_eq!(with_std!["(cdr (list 1))"], ok!["nil"]);
    assert_eq!(with_std!["(cons 1 (list 2 3))"], ok!["(1 2 3)"]);
    assert_eq!(with_std!["(cons 1 nil)"], ok!["(1)"]);
    assert_eq!(with_std!["(cons 1 2)"], ok!["(1 2)"]);
    assert_eq!(with_std!["(list)"], ok!["nil"]);
    assert_eq!(with_std!["(list 1 \"two\" (quote three))"], ok!["(1 \"two\" three)"]);
    assert_eq!(with_diagnostics!["(car 1)"], ("nil".to_string(), vec![TypeMismatch]));
    assert_eq!(with_diagnostics!["(cons 1)"], ("nil".to_string(), vec![ArityMismatch]));
}

#[test]
fn cons_copies_the_tail() {
    assert_eq!(with_std!["(define a (list 2 3)) (define b (cons 1 a)) a"], ok!["(2 3)"]);
    assert_eq!(with_std!["(define a (list 2 3)) (define b (cons 1 a)) b"], ok!["(1 2 3)"]);
}

#[test]
fn stdlib_sequences() {
    assert_eq!(with_std!["(nth 1 (list 4 5 6))"], ok!["5"]);
    assert_eq!(with_std!["(nth -1 (list 4 5 6))"], ok!["6"]);
    assert_eq!(with_std!["(nth 5 (list 1))"], ok!["nil"]);
    assert_eq!(with_std!["(nth 0 \"abc\")"], ok!["\"a\""]);
    assert_eq!(with_std!["(length (list 1 2))"], ok!["2"]);
    assert_eq!(with_std!["(length \"hello\")"], ok!["5"]);
    assert_eq!(with_std!["(length nil)"], ok!["0"]);
    assert_eq!(with_std!["(reverse (list 1 2 3))"], ok!["(3 2 1)"]);
    assert_eq!(with_std!["(reverse \"abc\")"], ok!["\"cba\""]);
    assert_eq!(with_diagnostics!["(nth \"0\" (list 1))"], ("nil".to_string(), vec![TypeMismatch]));
    assert_eq!(with_diagnostics!["(length 3)"], ("nil".to_string(), vec![TypeMismatch]));
}

#[test]
fn stdlib_strings() {
    assert_eq!(with_std!["(scar \"abc\")"], ok!["\"a\""]);
    assert_eq!(with_std!["(scar \"\")"], ok!["nil"]);
    assert_eq!(with_std!["(scdr \"abc\")"], ok!["\"bc\""]);
    assert_eq!(with_std!["(scdr \"a\")"], ok!["nil"]);
    assert_eq!(with_std!["(scons \"ab\" \"cd\")"], ok!["\"abcd\""]);
    assert_eq!(with_diagnostics!["(scar 1)"], ("nil".to_string(), vec![TypeMismatch]));
    assert_eq!(with_diagnostics!["(scons \"a\" 1)"], ("nil".to_string(), vec![TypeMismatch]));
}

#[test]
fn first_error_stops_evaluate() {
    let mut lisp = Lisp::new().unwrap();
    lisp.interrupt();
    assert_eq!(evaluate(&mut lisp, "(+ 1 2) 5"), rt_err![ExecutionError::Abort]);
    assert_eq!(evaluate(&mut lisp, "(+ 1 2)"), ok!["3"]);
}

#[test]
fn loop_continues_past_parse_errors() {
    let mut lisp = Lisp::new().unwrap();
    assert_eq!(
        outcomes(&mut lisp, ") 1 (+ 1 1) bad\\q 3"),
        vec![
            Err(InterpreterError::Reader(ReaderError::UnmatchedClose)),
            ok!["1"],
            ok!["2"],
            Err(InterpreterError::Reader(ReaderError::InvalidEscape('q'))),
            ok!["3"],
        ]
    );
}

#[test]
fn deeply_nested_source_is_a_parse_error() {
    let nested = format!("(quote {}1{})", "(".repeat(200_000), ")".repeat(200_000));
    assert_eq!(with_std![&nested], Err(InterpreterError::Reader(ReaderError::TooDeep)));

    let mut lisp = Lisp::new().unwrap();
    let source = format!("{} (+ 1 1)", nested);
    assert_eq!(
        outcomes(&mut lisp, &source),
        vec![Err(InterpreterError::Reader(ReaderError::TooDeep)), ok!["2"]]
    );
}

#[test]
fn loop_continues_past_recoverable_errors() {
    let mut lisp = Lisp::new().unwrap();
    assert_eq!(outcomes(&mut lisp, "(set y 1) (+ 2 3)"), vec![ok!["nil"], ok!["5"]]);
    assert_eq!(lisp.diagnostics().len(), 1);
}

#[test]
fn abort_is_reported_and_cleared() {
    let mut lisp = Lisp::new().unwrap();
    lisp.interrupt();
    assert_eq!(
        outcomes(&mut lisp, "(+ 1 2) (+ 3 4)"),
        vec![rt_err![ExecutionError::Abort], ok!["7"]]
    );
}

#[test]
fn callback_can_stop_the_loop() {
    let mut lisp = Lisp::new().unwrap();
    let mut port = StringPort::new("1 2 3");
    let mut count = 0;
    interpret(&mut lisp, &mut port, |_, _| {
        count += 1;
        false
    });
    assert_eq!(count, 1);
}

#[test]
fn heap_holds_only_reachable_cells_after_each_cycle() {
    let mut lisp = Lisp::new().unwrap();
    evaluate(&mut lisp, "(define keep (list 1 2))").unwrap();
    let baseline = lisp.heap().len();

    for _ in 0..20 {
        evaluate(&mut lisp, "(list (quote garbage) \"more\" (+ 1 2))").unwrap();
        assert_eq!(lisp.heap().len(), baseline);
    }

    let stats = lisp.collect(None);
    assert_eq!(stats.swept, 0);
    assert_eq!(stats.marked, baseline);
}

#[test]
fn session_waits_for_complete_forms() {
    let mut lisp = Lisp::new().unwrap();
    let mut session = Session::new();
    let mut seen = Vec::new();

    {
        let mut feed = |lisp: &mut Lisp, line: &str| {
            session.feed(lisp, line, |lisp, outcome| {
                seen.push(outcome.map(|value| lisp.display(value).to_string()));
                true
            })
        };

        assert!(feed(&mut lisp, "(define x"));
        assert!(feed(&mut lisp, "  5)"));
        assert!(feed(&mut lisp, "x (+ x"));
        assert!(feed(&mut lisp, "1)"));
        assert!(feed(&mut lisp, "\"a"));
        assert!(feed(&mut lisp, "b\""));
    }

    assert!(!session.is_pending());
    assert_eq!(seen, vec![ok!["5"], ok!["5"], ok!["6"], ok!["\"a\\nb\""]]);
}

#[test]
fn session_reset_drops_pending_input() {
    let mut lisp = Lisp::new().unwrap();
    let mut session = Session::new();
    session.feed(&mut lisp, "(list 1", |_, _| true);
    assert!(session.is_pending());
    session.reset();
    assert!(!session.is_pending());

    let mut last = None;
    session.feed(&mut lisp, "(+ 1 1)", |lisp, outcome| {
        last = outcome.ok().map(|value| lisp.display(value).to_string());
        true
    });
    assert_eq!(last, Some("2".to_string()));
}

#[test]
fn fatal_outcomes() {
    let err = InterpreterError::Reader(ReaderError::OutOfMemory);
    assert!(err.is_fatal());
    assert!(!InterpreterError::Reader(ReaderError::UnexpectedEof).is_fatal());
    assert!(!InterpreterError::Exec(ExecutionError::StackOverflow).is_fatal());
    assert!(InterpreterError::Exec(ExecutionError::OutOfMemory).is_fatal());
}
