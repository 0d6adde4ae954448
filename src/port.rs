//! Character streams the reader pulls from and the printer writes to.
use std::error::Error;
use std::fmt;
use std::io::{self, BufRead, Write};

#[derive(Debug)]
pub enum PortError {
    /// A second `unread_char` before a read
    PushbackFull,
    /// The port can't be written to
    ReadOnly,
    Io(io::Error),
}

impl PartialEq for PortError {
    fn eq(&self, other: &PortError) -> bool {
        match (self, other) {
            (&PortError::PushbackFull, &PortError::PushbackFull)
            | (&PortError::ReadOnly, &PortError::ReadOnly) => true,
            (&PortError::Io(ref e), &PortError::Io(ref f)) => e.kind() == f.kind(),
            _ => false,
        }
    }
}

impl fmt::Display for PortError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            PortError::PushbackFull => fmt.write_str("pushback slot already in use"),
            PortError::ReadOnly => fmt.write_str("port is not writable"),
            PortError::Io(ref e) => write!(fmt, "I/O error: {}", e),
        }
    }
}

impl Error for PortError {}

impl From<io::Error> for PortError {
    fn from(e: io::Error) -> PortError {
        PortError::Io(e)
    }
}

pub trait Port {
    /// Next character, `None` at end of stream
    fn read_char(&mut self) -> Result<Option<char>, PortError>;

    /// Pushes one character back. Only one slot.
    fn unread_char(&mut self, c: char) -> Result<(), PortError>;

    fn write_char(&mut self, c: char) -> Result<(), PortError>;

    fn write_str(&mut self, s: &str) -> Result<(), PortError> {
        for c in s.chars() {
            self.write_char(c)?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), PortError> {
        Ok(())
    }

    /// Everything written so far, for ports that keep it in memory
    fn take_output(&mut self) -> Option<String> {
        None
    }
}

/// In-memory port: reads from a string, collects writes into another
#[derive(Debug, Default)]
pub struct StringPort {
    input: Vec<char>,
    index: usize,
    pushback: Option<char>,
    output: String,
}

impl StringPort {
    pub fn new(source: &str) -> StringPort {
        StringPort {
            input: source.chars().collect(),
            index: 0,
            pushback: None,
            output: String::new(),
        }
    }

    /// Characters consumed so far, not counting a pushed back one
    pub fn position(&self) -> usize {
        if self.pushback.is_some() {
            self.index - 1
        } else {
            self.index
        }
    }

    /// Input from character `start` onwards, read or not
    pub fn input_from(&self, start: usize) -> String {
        self.input[start.min(self.input.len())..].iter().collect()
    }
}

impl Port for StringPort {
    fn read_char(&mut self) -> Result<Option<char>, PortError> {
        if let Some(c) = self.pushback.take() {
            return Ok(Some(c));
        }
        let c = self.input.get(self.index).cloned();
        if c.is_some() {
            self.index += 1;
        }
        Ok(c)
    }

    fn unread_char(&mut self, c: char) -> Result<(), PortError> {
        if self.pushback.is_some() {
            return Err(PortError::PushbackFull);
        }
        self.pushback = Some(c);
        Ok(())
    }

    fn write_char(&mut self, c: char) -> Result<(), PortError> {
        self.output.push(c);
        Ok(())
    }

    fn take_output(&mut self) -> Option<String> {
        Some(::std::mem::replace(&mut self.output, String::new()))
    }
}

/// Port over a buffered reader and a writer (stdin/stdout by default)
pub struct StdPort<R, W> {
    reader: R,
    writer: W,
    line: Vec<char>,
    index: usize,
    pushback: Option<char>,
}

impl StdPort<io::BufReader<io::Stdin>, io::Stdout> {
    pub fn stdio() -> Self {
        StdPort::new(io::BufReader::new(io::stdin()), io::stdout())
    }
}

impl<R: BufRead, W: Write> StdPort<R, W> {
    pub fn new(reader: R, writer: W) -> StdPort<R, W> {
        StdPort {
            reader,
            writer,
            line: Vec::new(),
            index: 0,
            pushback: None,
        }
    }

    pub fn into_writer(self) -> W {
        self.writer
    }

    fn fill(&mut self) -> Result<bool, PortError> {
        let mut buffer = String::new();
        let n = self.reader.read_line(&mut buffer)?;
        self.line = buffer.chars().collect();
        self.index = 0;
        Ok(n > 0)
    }
}

impl<R: BufRead, W: Write> Port for StdPort<R, W> {
    fn read_char(&mut self) -> Result<Option<char>, PortError> {
        if let Some(c) = self.pushback.take() {
            return Ok(Some(c));
        }
        if self.index >= self.line.len() && !self.fill()? {
            return Ok(None);
        }
        let c = self.line[self.index];
        self.index += 1;
        Ok(Some(c))
    }

    fn unread_char(&mut self, c: char) -> Result<(), PortError> {
        if self.pushback.is_some() {
            return Err(PortError::PushbackFull);
        }
        self.pushback = Some(c);
        Ok(())
    }

    fn write_char(&mut self, c: char) -> Result<(), PortError> {
        let mut buffer = [0; 4];
        self.writer.write_all(c.encode_utf8(&mut buffer).as_bytes())?;
        Ok(())
    }

    fn write_str(&mut self, s: &str) -> Result<(), PortError> {
        self.writer.write_all(s.as_bytes())?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), PortError> {
        self.writer.flush()?;
        Ok(())
    }
}
