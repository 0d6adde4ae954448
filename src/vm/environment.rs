//! Frames are List cells of `(symbol value)` pairs, searched from the last
//! entry to the first so newer bindings shadow older ones.
use super::{ExecutionError, Lisp};
use crate::heap::{Cell, CellRef};

impl Lisp {
    /// Appends a `(symbol value)` pair to `frame`.
    pub fn extend(
        &mut self,
        symbol: CellRef,
        value: CellRef,
        frame: CellRef,
    ) -> Result<CellRef, ExecutionError> {
        let pair = self.heap.list(vec![symbol, value])?;
        match self.heap[frame] {
            Cell::List(ref mut bindings) => bindings.push(pair),
            ref other => panic!("frame is a {}, not a list", other.type_name()),
        }
        Ok(value)
    }

    fn find_in_frame(&self, name: &str, frame: CellRef) -> Option<CellRef> {
        let bindings = self.heap[frame].list()?;
        bindings.iter().rev().cloned().find(|&pair| {
            self.heap[pair]
                .list()
                .and_then(|pair| pair.first())
                .and_then(|&symbol| self.heap[symbol].symbol())
                == Some(name)
        })
    }

    /// The binding pair for `name`, local frame first, then global.
    pub fn find_binding(&self, name: &str, local: Option<CellRef>) -> Option<CellRef> {
        local
            .and_then(|frame| self.find_in_frame(name, frame))
            .or_else(|| self.find_in_frame(name, self.global))
    }

    /// Value bound to the symbol cell `symbol`, if any.
    pub fn lookup(&self, symbol: CellRef, local: Option<CellRef>) -> Option<CellRef> {
        let name = self.heap[symbol].symbol()?;
        self.find_binding(name, local).map(|pair| self.heap[pair].list().map_or(self.nil, |p| p[1]))
    }

    /// Overwrites the value slot of an existing pair.
    pub(super) fn assign(&mut self, pair: CellRef, value: CellRef) {
        if let Cell::List(ref mut slots) = self.heap[pair] {
            slots[1] = value;
        }
    }

    /// Updates the global binding in place, or adds one.
    pub fn define_global(
        &mut self,
        symbol: CellRef,
        value: CellRef,
    ) -> Result<CellRef, ExecutionError> {
        let existing = match self.heap[symbol].symbol() {
            Some(name) => self.find_in_frame(name, self.global),
            None => None,
        };

        match existing {
            Some(pair) => {
                self.assign(pair, value);
                Ok(value)
            }
            None => {
                let global = self.global;
                self.extend(symbol, value, global)
            }
        }
    }

    /// Copy of a frame's binding pairs. The pairs themselves are shared.
    pub(super) fn snapshot(&self, frame: Option<CellRef>) -> Box<[CellRef]> {
        frame
            .and_then(|frame| self.heap[frame].list())
            .map(|bindings| bindings.to_vec().into_boxed_slice())
            .unwrap_or_default()
    }
}
