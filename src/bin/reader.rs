extern crate cellisp;
extern crate env_logger;
extern crate fallible_iterator;

use fallible_iterator::FallibleIterator;

use cellisp::port::StdPort;
use cellisp::reader::{Forms, ReaderError};
use cellisp::{Cell, CellRef, Heap};

// Variant tree of a form, e.g. `List[Symbol("car"), Integer(1)]`
fn describe(heap: &Heap, cell: CellRef) -> String {
    match heap[cell] {
        Cell::List(ref elements) => {
            let inner: Vec<String> = elements.iter().map(|&e| describe(heap, e)).collect();
            format!("List[{}]", inner.join(", "))
        }
        ref atom => format!("{:?}", atom),
    }
}

fn main() {
    env_logger::init();

    let mut heap = Heap::default();
    let mut port = StdPort::stdio();
    let mut forms = Forms::new(&mut port, &mut heap);

    loop {
        match forms.next() {
            Ok(Some(form)) => println!("{}", describe(forms.heap(), form)),
            Ok(None) => break,
            Err(e) => {
                println!("Invalid datum: {}", e);
                match e {
                    ReaderError::UnmatchedClose
                    | ReaderError::InvalidEscape(_)
                    | ReaderError::UnexpectedQuote
                    | ReaderError::TooDeep => {}
                    _ => break,
                }
            }
        }
    }
}
