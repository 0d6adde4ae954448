extern crate cellisp;
extern crate env_logger;
extern crate libc;
#[macro_use]
extern crate log;
extern crate rustyline;

use std::env::args;
use std::fs::File;
use std::io::BufReader;
use std::process;

use cellisp::interpreter::{interpret, InterpreterError, Session};
use cellisp::port::StdPort;
use cellisp::{CellRef, Config, Lisp};

use rustyline::error::ReadlineError;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = Config::from_env();
    let mut lisp = match Lisp::with_config(&config) {
        Ok(lisp) => lisp,
        Err(e) => {
            error!("cannot start the interpreter: {}", e);
            process::exit(1);
        }
    };

    interrupt::install(lisp.signal());

    let status = match args().nth(1) {
        Some(file) => run_file(&mut lisp, &file),
        None => run_repl(&mut lisp, &config),
    };
    process::exit(status);
}

/// Ctrl-C raises the interpreter's signal flag, so a running form unwinds
/// with Abort instead of killing the process.
#[cfg(unix)]
mod interrupt {
    use std::mem::MaybeUninit;
    use std::ptr::null_mut;
    use std::sync::atomic::{AtomicBool, AtomicPtr, Ordering};
    use std::sync::Arc;

    use libc::*;

    static FLAG: AtomicPtr<AtomicBool> = AtomicPtr::new(null_mut());

    extern "C" fn sigint_handler(_sig: c_int) {
        let flag = FLAG.load(Ordering::SeqCst);
        if !flag.is_null() {
            unsafe { (*flag).store(true, Ordering::SeqCst) };
        }
    }

    // The flag is leaked: the handler may fire until the process exits
    pub fn install(signal: Arc<AtomicBool>) {
        FLAG.store(Arc::into_raw(signal) as *mut AtomicBool, Ordering::SeqCst);

        unsafe {
            let mut act: sigaction = MaybeUninit::<sigaction>::zeroed().assume_init();
            sigemptyset(&mut act.sa_mask);
            act.sa_sigaction = sigint_handler as sighandler_t;
            act.sa_flags = SA_RESTART;

            if sigaction(SIGINT, &act, null_mut()) < 0 {
                warn!("cannot catch SIGINT, Ctrl-C ends the process");
            }
        }
    }
}

#[cfg(not(unix))]
mod interrupt {
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;

    pub fn install(_signal: Arc<AtomicBool>) {}
}

// Prints a value or reports an error; false once nothing more can run
fn report(lisp: &Lisp, outcome: Result<CellRef, InterpreterError>, fatal: &mut bool) -> bool {
    match outcome {
        Ok(value) => {
            println!("{}", lisp.display(value));
            true
        }
        Err(ref e) if e.is_fatal() => {
            error!("fatal: {}", e);
            *fatal = true;
            false
        }
        Err(e) => {
            println!("Error: {}", e);
            true
        }
    }
}

fn run_file(lisp: &mut Lisp, file_path: &str) -> i32 {
    let file = match File::open(file_path) {
        Ok(file) => file,
        Err(e) => {
            error!("unable to open {}: {}", file_path, e);
            return 1;
        }
    };

    let mut port = StdPort::new(BufReader::new(file), Vec::new());
    let mut fatal = false;
    interpret(lisp, &mut port, |lisp, outcome| report(lisp, outcome, &mut fatal));

    if fatal {
        1
    } else {
        0
    }
}

fn run_repl(lisp: &mut Lisp, config: &Config) -> i32 {
    let mut rl = rustyline::Editor::<()>::new();
    let mut session = Session::new();
    let mut fatal = false;

    loop {
        let prompt = if session.is_pending() { "" } else { &config.prompt[..] };
        let line = match rl.readline(prompt) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                session.reset();
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(e) => {
                error!("{}", e);
                break;
            }
        };

        rl.add_history_entry(&line);
        // A Ctrl-C that landed between forms
        lisp.clear_interrupt();

        let keep_going =
            session.feed(lisp, &line, |lisp, outcome| report(lisp, outcome, &mut fatal));
        if !keep_going {
            break;
        }
    }

    if fatal {
        1
    } else {
        0
    }
}
