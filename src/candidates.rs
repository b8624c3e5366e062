//! This module contains [Candidates], the per-cell candidate store used by
//! the deductive solver.
//!
//! Each of the 81 cells holds an independent 9-bit mask stating which values
//! could still be placed there. The store enforces no cross-cell consistency
//! of its own. In the solver, keeping it coherent with the board it
//! annotates is the job of the
//! [strategies](crate::solver::strategy::Strategy), whose eliminations all
//! pass through [AnnotatedSudoku](crate::solver::AnnotatedSudoku) and its
//! contract checks.

use crate::Sudoku;
use crate::selection::{CELL_COUNT, HOUSE_SIZE, Selection};

/// The mask with all nine candidate bits set.
const ALL_CANDIDATES: u16 = (1 << HOUSE_SIZE) - 1;

fn value_mask(value: u8) -> u16 {
    assert!(value >= 1 && value <= 9, "value {} out of range", value);

    1 << (value - 1)
}

/// A store of candidate values for every cell of a board, represented as 81
/// bitmasks with one bit per value in `[1, 9]`.
///
/// All methods taking a cell index panic if it is not in the range `[0, 81)`,
/// and all methods taking a value panic if it is not in the range `[1, 9]`.
#[derive(Clone, Eq, Hash, PartialEq)]
pub struct Candidates {
    masks: [u16; CELL_COUNT]
}

impl Candidates {

    /// Creates a new candidate store in which every cell has all nine
    /// candidates.
    pub fn new() -> Candidates {
        Candidates {
            masks: [ALL_CANDIDATES; CELL_COUNT]
        }
    }

    /// Creates a new candidate store in which no cell has any candidates.
    pub fn none() -> Candidates {
        Candidates {
            masks: [0; CELL_COUNT]
        }
    }

    /// Creates a candidate store matching the given board: filled cells have
    /// no candidates, and each empty cell has exactly the values that do not
    /// yet appear in its row, column, or square.
    pub fn from_sudoku(sudoku: &Sudoku) -> Candidates {
        let mut result = Candidates::new();

        for index in 0..CELL_COUNT {
            if sudoku.get(index) != 0 {
                result.clear_at(index);
                continue;
            }

            for peer in &Selection::affected_by(index) {
                let value = sudoku.get(peer);

                if value != 0 {
                    result.remove_candidate(index, value);
                }
            }
        }

        result
    }

    /// Indicates whether `value` is currently a candidate of the cell at the
    /// given index.
    pub fn can_be(&self, index: usize, value: u8) -> bool {
        assert!(index < CELL_COUNT, "index {} out of range", index);

        self.masks[index] & value_mask(value) != 0
    }

    /// Adds `value` as a candidate of the cell at the given index. Returns
    /// `true` if the store changed, that is, the value was not a candidate
    /// before.
    pub fn add_candidate(&mut self, index: usize, value: u8) -> bool {
        assert!(index < CELL_COUNT, "index {} out of range", index);

        let mask = value_mask(value);

        if self.masks[index] & mask == 0 {
            self.masks[index] |= mask;
            true
        }
        else {
            false
        }
    }

    /// Removes `value` as a candidate of the cell at the given index. Returns
    /// `true` if the store changed, that is, the value was a candidate
    /// before.
    pub fn remove_candidate(&mut self, index: usize, value: u8) -> bool {
        assert!(index < CELL_COUNT, "index {} out of range", index);

        let mask = value_mask(value);

        if self.masks[index] & mask != 0 {
            self.masks[index] &= !mask;
            true
        }
        else {
            false
        }
    }

    /// Removes all candidates of the cell at the given index.
    pub fn clear_at(&mut self, index: usize) {
        assert!(index < CELL_COUNT, "index {} out of range", index);

        self.masks[index] = 0;
    }

    /// Restores all nine candidates of the cell at the given index.
    pub fn reset_at(&mut self, index: usize) {
        assert!(index < CELL_COUNT, "index {} out of range", index);

        self.masks[index] = ALL_CANDIDATES;
    }

    /// Gets the raw candidate bitmask of the cell at the given index. Bit `i`
    /// (starting at 0) represents value `i + 1`.
    pub fn mask(&self, index: usize) -> u16 {
        assert!(index < CELL_COUNT, "index {} out of range", index);

        self.masks[index]
    }

    /// Gets the number of candidates of the cell at the given index.
    pub fn count_at(&self, index: usize) -> usize {
        assert!(index < CELL_COUNT, "index {} out of range", index);

        self.masks[index].count_ones() as usize
    }

    /// Gets the selection of all cells that have at least one candidate.
    pub fn non_empty(&self) -> Selection {
        (0..CELL_COUNT)
            .filter(|&index| self.masks[index] != 0)
            .collect()
    }

    /// Returns an iterator over the candidate values of the cell at the
    /// given index, in ascending order.
    pub fn values_at(&self, index: usize) -> ValueIter {
        assert!(index < CELL_COUNT, "index {} out of range", index);

        ValueIter::from_mask(self.masks[index])
    }
}

impl Default for Candidates {
    fn default() -> Candidates {
        Candidates::new()
    }
}

/// An iterator over the values encoded in a candidate bitmask, in ascending
/// order.
#[derive(Clone, Copy)]
pub struct ValueIter(u16);

impl ValueIter {

    /// Creates an iterator over the values whose bits are set in the given
    /// mask. Bit `i` (starting at 0) represents value `i + 1`; bits beyond
    /// the ninth are ignored.
    pub fn from_mask(mask: u16) -> ValueIter {
        ValueIter(mask & ALL_CANDIDATES)
    }

    /// Creates an iterator that yields no values.
    pub fn empty() -> ValueIter {
        ValueIter(0)
    }
}

impl Iterator for ValueIter {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        if self.0 == 0 {
            None
        }
        else {
            let value = self.0.trailing_zeros() as u8 + 1;
            self.0 &= self.0 - 1;
            Some(value)
        }
    }
}
