//! Stop-the-world mark and sweep over the slot arena.
use super::{CellRef, Heap};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GcStats {
    pub marked: usize,
    pub swept: usize,
    pub live: usize,
}

impl Heap {
    /// Sets the mark bit of every cell reachable from `roots`.
    /// Marked cells are not revisited, so shared structure and cycles are fine.
    pub fn mark<I>(&mut self, roots: I) -> usize
    where
        I: IntoIterator<Item = CellRef>,
    {
        let mut worklist: Vec<CellRef> = roots.into_iter().collect();
        let mut children = Vec::new();
        let mut marked = 0;

        while let Some(cell) = worklist.pop() {
            if !self.contains(cell) {
                panic!("root set reaches dangling {:?}", cell);
            }
            if self.is_marked(cell.index) {
                continue;
            }
            self.mark_bit(cell.index);
            marked += 1;

            self[cell].trace(&mut children);
            worklist.extend(children.drain(..));
        }

        marked
    }

    /// Releases every unmarked cell and clears the survivors' marks.
    pub fn sweep(&mut self) -> usize {
        let mut swept = 0;

        for index in 0..self.slots.len() as u32 {
            if self.slots[index as usize].cell.is_none() {
                continue;
            }
            if self.is_marked(index) {
                self.unmark(index);
            } else {
                self.release(index);
                swept += 1;
            }
        }

        swept
    }

    pub fn collect<I>(&mut self, roots: I) -> GcStats
    where
        I: IntoIterator<Item = CellRef>,
    {
        let marked = self.mark(roots);
        let swept = self.sweep();
        let stats = GcStats {
            marked,
            swept,
            live: self.len(),
        };
        debug!("gc: {:?}", stats);
        stats
    }
}
