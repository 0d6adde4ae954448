//! Cell arena. Every cell lives in a slot here until the collector sweeps it.
use std::error::Error;
use std::fmt;
use std::ops::{Index, IndexMut};

mod cell;
mod gc;

pub use self::cell::{Cell, NativeFn, Primitive, Procedure};
pub use self::gc::GcStats;

/// Default ceiling on live cells
pub const MAX_CELLS: usize = 1024 * 1024;

/// Handle to a slot. Stale once the slot has been swept.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRef {
    index: u32,
    generation: u32,
}

impl fmt::Debug for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "CellRef({}#{})", self.index, self.generation)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutOfMemory;

impl fmt::Display for OutOfMemory {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.write_str("out of memory: allocation ceiling reached")
    }
}

impl Error for OutOfMemory {}

struct Slot {
    generation: u32,
    cell: Option<Cell>,
}

pub struct Heap {
    slots: Vec<Slot>,
    free: Vec<u32>,
    marks: Vec<u64>,
    live: usize,
    ceiling: usize,
}

impl Default for Heap {
    fn default() -> Heap {
        Heap::new(MAX_CELLS)
    }
}

impl Heap {
    pub fn new(ceiling: usize) -> Heap {
        Heap {
            slots: Vec::new(),
            free: Vec::new(),
            marks: Vec::new(),
            live: 0,
            ceiling,
        }
    }

    /// Registers a new, unmarked cell.
    pub fn allocate(&mut self, cell: Cell) -> Result<CellRef, OutOfMemory> {
        if self.live >= self.ceiling {
            return Err(OutOfMemory);
        }
        self.live += 1;

        if let Some(index) = self.free.pop() {
            self.unmark(index);
            let slot = &mut self.slots[index as usize];
            slot.cell = Some(cell);
            return Ok(CellRef {
                index,
                generation: slot.generation,
            });
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            cell: Some(cell),
        });
        if self.marks.len() * 64 < self.slots.len() {
            self.marks.push(0);
        }
        Ok(CellRef {
            index,
            generation: 0,
        })
    }

    /// Frees the cell's buffers and retires the handle. Only the sweep calls this.
    fn release(&mut self, index: u32) {
        let slot = &mut self.slots[index as usize];
        if slot.cell.take().is_some() {
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(index);
            self.live -= 1;
        }
    }

    /// Number of registered cells
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn ceiling(&self) -> usize {
        self.ceiling
    }

    pub fn contains(&self, cell: CellRef) -> bool {
        self.slots
            .get(cell.index as usize)
            .map(|slot| slot.generation == cell.generation && slot.cell.is_some())
            .unwrap_or(false)
    }

    pub fn get(&self, cell: CellRef) -> Option<&Cell> {
        self.slots
            .get(cell.index as usize)
            .filter(|slot| slot.generation == cell.generation)
            .and_then(|slot| slot.cell.as_ref())
    }

    pub fn get_mut(&mut self, cell: CellRef) -> Option<&mut Cell> {
        self.slots
            .get_mut(cell.index as usize)
            .filter(|slot| slot.generation == cell.generation)
            .and_then(|slot| slot.cell.as_mut())
    }

    // Mark bits, one per slot

    fn is_marked(&self, index: u32) -> bool {
        self.marks[index as usize / 64] & (1u64 << (index % 64)) != 0
    }

    fn mark_bit(&mut self, index: u32) {
        self.marks[index as usize / 64] |= 1u64 << (index % 64);
    }

    fn unmark(&mut self, index: u32) {
        self.marks[index as usize / 64] &= !(1u64 << (index % 64));
    }

    /// Structural equality by content. Callables compare by identity.
    pub fn equal(&self, a: CellRef, b: CellRef) -> bool {
        if a == b {
            return true;
        }
        match (&self[a], &self[b]) {
            (&Cell::Nil, &Cell::Nil) | (&Cell::Tee, &Cell::Tee) => true,
            (&Cell::Integer(n), &Cell::Integer(m)) => n == m,
            (&Cell::Float(f), &Cell::Float(g)) => f == g,
            (&Cell::String(ref s), &Cell::String(ref t))
            | (&Cell::Symbol(ref s), &Cell::Symbol(ref t)) => s == t,
            (&Cell::List(ref xs), &Cell::List(ref ys)) => {
                xs.len() == ys.len() && xs.iter().zip(ys.iter()).all(|(&x, &y)| self.equal(x, y))
            }
            _ => false,
        }
    }

    pub fn symbol(&mut self, name: &str) -> Result<CellRef, OutOfMemory> {
        self.allocate(Cell::Symbol(name.to_owned()))
    }

    pub fn string(&mut self, s: &str) -> Result<CellRef, OutOfMemory> {
        self.allocate(Cell::String(s.to_owned()))
    }

    pub fn integer(&mut self, n: i64) -> Result<CellRef, OutOfMemory> {
        self.allocate(Cell::Integer(n))
    }

    pub fn float(&mut self, f: f64) -> Result<CellRef, OutOfMemory> {
        self.allocate(Cell::Float(f))
    }

    pub fn list(&mut self, elements: Vec<CellRef>) -> Result<CellRef, OutOfMemory> {
        self.allocate(Cell::List(elements))
    }
}

impl Index<CellRef> for Heap {
    type Output = Cell;

    fn index(&self, cell: CellRef) -> &Cell {
        match self.get(cell) {
            Some(c) => c,
            None => panic!("dangling {:?}", cell),
        }
    }
}

impl IndexMut<CellRef> for Heap {
    fn index_mut(&mut self, cell: CellRef) -> &mut Cell {
        match self.get_mut(cell) {
            Some(c) => c,
            None => panic!("dangling {:?}", cell),
        }
    }
}

#[cfg(test)]
mod test;
