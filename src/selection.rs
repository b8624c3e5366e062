//! This module contains the definition of [Selection], a set over the 81 cell
//! indices of a Sudoku board.
//!
//! Selections are the common currency of this crate: houses (rows, columns,
//! and squares) are selections, the board reports rule violations as a
//! selection, strategies justify their deductions with selections, and the
//! hole maker tracks the remaining filled cells in one. They are implemented
//! as a fixed-size bit vector, which makes all set algebra cheap.

use crate::{index_to_column, index_to_row, index_to_square, position_to_index};

use std::fmt::{self, Debug, Formatter};
use std::iter::FromIterator;

use rand::Rng;

/// The number of cells on a board, which is also the exclusive upper bound
/// for all indices stored in a [Selection].
pub const CELL_COUNT: usize = 81;

/// The number of cells in a house (row, column, or square), which is also the
/// exclusive upper bound for house arguments and cell values.
pub const HOUSE_SIZE: usize = 9;

// 81 bits split over two words: 64 in the first, 17 in the second.
const WORD_MASKS: [u64; 2] = [!0u64, (1u64 << 17) - 1];

fn split(index: usize) -> (usize, u64) {
    (index >> 6, 1u64 << (index & 63))
}

/// A set of cell indices in the range `[0, 81)`, implemented as a bit vector.
/// Binary set operations ([Selection::union], [Selection::intersection],
/// [Selection::difference], and [Selection::inverse]) are non-mutating and
/// return new selections, while [Selection::insert_all],
/// [Selection::remove_all], and [Selection::retain_all] modify the selection
/// in place.
///
/// Methods taking a single index panic if it is out of range, since a
/// hard-coded or computed index outside the board is a programming error. The
/// bulk operations instead silently skip out-of-range values, so that
/// arbitrary iterators can be drained into a selection.
#[derive(Clone, Eq, Hash, PartialEq)]
pub struct Selection {
    words: [u64; 2],
    len: usize
}

impl Selection {

    /// Creates a new, empty selection.
    pub fn new() -> Selection {
        Selection {
            words: [0; 2],
            len: 0
        }
    }

    /// Creates a selection containing only the given index.
    ///
    /// # Panics
    ///
    /// If `index` is not in the range `[0, 81)`.
    pub fn singleton(index: usize) -> Selection {
        let mut result = Selection::new();
        result.insert(index);
        result
    }

    /// Creates a selection containing all 81 cell indices.
    pub fn all() -> Selection {
        Selection {
            words: WORD_MASKS,
            len: CELL_COUNT
        }
    }

    /// Creates the selection of the 9 cells in the given row.
    ///
    /// # Panics
    ///
    /// If `row` is not in the range `[0, 9)`.
    pub fn row(row: usize) -> Selection {
        assert!(row < HOUSE_SIZE, "row {} out of range", row);

        let mut result = Selection::new();
        let base_index = row * 9;

        for column in 0..HOUSE_SIZE {
            result.insert(base_index + column);
        }

        result
    }

    /// Creates the selection of the 9 cells in the given column.
    ///
    /// # Panics
    ///
    /// If `column` is not in the range `[0, 9)`.
    pub fn column(column: usize) -> Selection {
        assert!(column < HOUSE_SIZE, "column {} out of range", column);

        let mut result = Selection::new();
        let mut index = column;

        while index < CELL_COUNT {
            result.insert(index);
            index += 9;
        }

        result
    }

    /// Creates the selection of the 9 cells in the given 3x3 square. Squares
    /// are numbered left-to-right, top-to-bottom, so square 0 is the top-left
    /// one and square 8 the bottom-right one.
    ///
    /// # Panics
    ///
    /// If `square` is not in the range `[0, 9)`.
    pub fn square(square: usize) -> Selection {
        const OFFSETS: [usize; 9] = [0, 1, 2, 9, 10, 11, 18, 19, 20];

        assert!(square < HOUSE_SIZE, "square {} out of range", square);

        let mut result = Selection::new();
        let base_index = (square / 3) * 27 + (square % 3) * 3;

        for &offset in OFFSETS.iter() {
            result.insert(base_index + offset);
        }

        result
    }

    /// Creates the selection of all cells that share a row, column, or square
    /// with the cell at the given index, *excluding* the index itself. The
    /// result always contains exactly 20 indices.
    ///
    /// # Panics
    ///
    /// If `index` is not in the range `[0, 81)`.
    pub fn affected_by(index: usize) -> Selection {
        let row = Selection::row(index_to_row(index));
        let column = Selection::column(index_to_column(index));
        let square = Selection::square(index_to_square(index));

        row.union(&column)
            .union(&square)
            .difference(&Selection::singleton(index))
    }

    /// Indicates whether the given index is a member of this selection.
    ///
    /// # Panics
    ///
    /// If `index` is not in the range `[0, 81)`.
    pub fn contains(&self, index: usize) -> bool {
        assert!(index < CELL_COUNT, "index {} out of range", index);

        let (word, mask) = split(index);
        self.words[word] & mask != 0
    }

    /// Inserts the given index into this selection. Returns `true` if the
    /// selection changed, that is, the index was not yet a member.
    ///
    /// # Panics
    ///
    /// If `index` is not in the range `[0, 81)`.
    pub fn insert(&mut self, index: usize) -> bool {
        assert!(index < CELL_COUNT, "index {} out of range", index);

        let (word, mask) = split(index);

        if self.words[word] & mask == 0 {
            self.words[word] |= mask;
            self.len += 1;
            true
        }
        else {
            false
        }
    }

    /// Removes the given index from this selection. Returns `true` if the
    /// selection changed, that is, the index was a member before.
    ///
    /// # Panics
    ///
    /// If `index` is not in the range `[0, 81)`.
    pub fn remove(&mut self, index: usize) -> bool {
        assert!(index < CELL_COUNT, "index {} out of range", index);

        let (word, mask) = split(index);

        if self.words[word] & mask != 0 {
            self.words[word] &= !mask;
            self.len -= 1;
            true
        }
        else {
            false
        }
    }

    /// Inserts all in-range indices yielded by the given iterator into this
    /// selection, silently skipping out-of-range values. This is the mutating
    /// equivalent of [Selection::union]. Returns `true` if the selection
    /// changed.
    pub fn insert_all(&mut self, indices: impl IntoIterator<Item = usize>)
            -> bool {
        let mut changed = false;

        for index in indices {
            if index < CELL_COUNT {
                changed |= self.insert(index);
            }
        }

        changed
    }

    /// Removes all in-range indices yielded by the given iterator from this
    /// selection, silently skipping out-of-range values. This is the mutating
    /// equivalent of [Selection::difference]. Returns `true` if the selection
    /// changed.
    pub fn remove_all(&mut self, indices: impl IntoIterator<Item = usize>)
            -> bool {
        let mut changed = false;

        for index in indices {
            if index < CELL_COUNT {
                changed |= self.remove(index);
            }
        }

        changed
    }

    /// Removes all members of this selection that are *not* yielded by the
    /// given iterator, silently skipping out-of-range values. This is the
    /// mutating equivalent of [Selection::intersection]. Returns `true` if
    /// the selection changed.
    pub fn retain_all(&mut self, indices: impl IntoIterator<Item = usize>)
            -> bool {
        let retained: Selection = indices.into_iter().collect();
        let mut changed = false;

        for index in 0..CELL_COUNT {
            if !retained.contains(index) {
                changed |= self.remove(index);
            }
        }

        changed
    }

    /// Computes the union of this selection and the other one. Neither input
    /// is modified.
    pub fn union(&self, other: &Selection) -> Selection {
        Selection::from_words([
            self.words[0] | other.words[0],
            self.words[1] | other.words[1]
        ])
    }

    /// Computes the intersection of this selection and the other one. Neither
    /// input is modified.
    pub fn intersection(&self, other: &Selection) -> Selection {
        Selection::from_words([
            self.words[0] & other.words[0],
            self.words[1] & other.words[1]
        ])
    }

    /// Computes the difference of this selection and the other one, that is,
    /// the selection of all indices present in this one but not in `other`.
    /// Neither input is modified.
    pub fn difference(&self, other: &Selection) -> Selection {
        Selection::from_words([
            self.words[0] & !other.words[0],
            self.words[1] & !other.words[1]
        ])
    }

    /// Computes the inverse of this selection, that is, the selection of all
    /// indices *not* present in this one. This selection is not modified.
    pub fn inverse(&self) -> Selection {
        Selection::from_words([
            !self.words[0] & WORD_MASKS[0],
            !self.words[1] & WORD_MASKS[1]
        ])
    }

    /// Picks a uniformly distributed random member of this selection using
    /// the given random number generator, or `None` if the selection is
    /// empty.
    pub fn random(&self, rng: &mut impl Rng) -> Option<usize> {
        if self.is_empty() {
            None
        }
        else {
            let chosen = rng.gen_range(0..self.len);
            self.iter().nth(chosen)
        }
    }

    /// Gets the number of indices contained in this selection.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Indicates whether this selection contains no indices.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Removes all indices from this selection.
    pub fn clear(&mut self) {
        self.words = [0; 2];
        self.len = 0;
    }

    /// Returns an iterator over the members of this selection in ascending
    /// index order.
    pub fn iter(&self) -> SelectionIter {
        SelectionIter {
            words: self.words
        }
    }

    fn from_words(words: [u64; 2]) -> Selection {
        let len =
            (words[0].count_ones() + words[1].count_ones()) as usize;

        Selection {
            words,
            len
        }
    }
}

impl Default for Selection {
    fn default() -> Selection {
        Selection::new()
    }
}

impl Debug for Selection {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl FromIterator<usize> for Selection {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Selection {
        let mut result = Selection::new();
        result.insert_all(iter);
        result
    }
}

/// An iterator over the members of a [Selection] in ascending index order.
/// Obtained via [Selection::iter].
pub struct SelectionIter {
    words: [u64; 2]
}

impl Iterator for SelectionIter {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.words[0] != 0 {
            let index = self.words[0].trailing_zeros() as usize;
            self.words[0] &= self.words[0] - 1;
            Some(index)
        }
        else if self.words[1] != 0 {
            let index = self.words[1].trailing_zeros() as usize;
            self.words[1] &= self.words[1] - 1;
            Some(index + 64)
        }
        else {
            None
        }
    }
}

impl<'a> IntoIterator for &'a Selection {
    type Item = usize;
    type IntoIter = SelectionIter;

    fn into_iter(self) -> SelectionIter {
        self.iter()
    }
}

/// Computes the mirror position used by
/// [Symmetry](crate::generator::Symmetry) modifiers: reflects `index` along
/// the vertical center line if `flip_x` is set and along the horizontal
/// center line if `flip_y` is set.
pub(crate) fn mirrored_index(index: usize, flip_x: bool, flip_y: bool)
        -> usize {
    let mut column = index_to_column(index);
    let mut row = index_to_row(index);

    if flip_x {
        column = 8 - column;
    }

    if flip_y {
        row = 8 - row;
    }

    position_to_index(column, row)
}

#[cfg(test)]
mod tests {

    use super::*;

    use rand::rngs::OsRng;

    #[test]
    fn rows_have_expected_indices() {
        for row in 0..9 {
            let selection = Selection::row(row);

            assert_eq!(9, selection.len());

            for column in 0..9 {
                assert!(selection.contains(row * 9 + column));
            }
        }

        let row_0: Vec<usize> = Selection::row(0).iter().collect();
        let row_8: Vec<usize> = Selection::row(8).iter().collect();

        assert_eq!((0..9).collect::<Vec<usize>>(), row_0);
        assert_eq!((72..81).collect::<Vec<usize>>(), row_8);
    }

    #[test]
    fn columns_have_expected_indices() {
        for column in 0..9 {
            let selection = Selection::column(column);

            assert_eq!(9, selection.len());

            for row in 0..9 {
                assert!(selection.contains(row * 9 + column));
            }
        }
    }

    #[test]
    fn squares_have_expected_indices() {
        for square in 0..9 {
            let selection = Selection::square(square);

            assert_eq!(9, selection.len());

            for index in &selection {
                assert_eq!(square, index_to_square(index));
            }
        }

        let square_4: Vec<usize> = Selection::square(4).iter().collect();

        assert_eq!(vec![30, 31, 32, 39, 40, 41, 48, 49, 50], square_4);
    }

    #[test]
    fn all_has_all_indices() {
        let all = Selection::all();

        assert_eq!(81, all.len());
        assert_eq!((0..81).collect::<Vec<usize>>(),
            all.iter().collect::<Vec<usize>>());
    }

    #[test]
    #[should_panic]
    fn row_rejects_out_of_range_argument() {
        Selection::row(9);
    }

    #[test]
    #[should_panic]
    fn column_rejects_out_of_range_argument() {
        Selection::column(9);
    }

    #[test]
    #[should_panic]
    fn square_rejects_out_of_range_argument() {
        Selection::square(9);
    }

    #[test]
    #[should_panic]
    fn affected_by_rejects_out_of_range_argument() {
        Selection::affected_by(81);
    }

    #[test]
    fn affected_by_excludes_index_and_has_20_members() {
        for index in 0..81 {
            let affected = Selection::affected_by(index);

            assert_eq!(20, affected.len());
            assert!(!affected.contains(index));
        }
    }

    #[test]
    fn affected_by_contains_peers_of_center_cell() {
        let affected = Selection::affected_by(40);

        // Row 4, column 4, and the center square all pass through index 40.

        for index in &Selection::row(4) {
            assert!(affected.contains(index) || index == 40);
        }

        for index in &Selection::column(4) {
            assert!(affected.contains(index) || index == 40);
        }

        for index in &Selection::square(4) {
            assert!(affected.contains(index) || index == 40);
        }
    }

    #[test]
    fn duplicate_insert_is_a_no_op() {
        let mut selection = Selection::new();

        assert!(selection.insert(17));
        assert!(!selection.insert(17));
        assert_eq!(1, selection.len());
    }

    #[test]
    fn absent_remove_is_a_no_op() {
        let mut selection = Selection::singleton(17);

        assert!(!selection.remove(18));
        assert!(selection.remove(17));
        assert!(!selection.remove(17));
        assert!(selection.is_empty());
    }

    #[test]
    fn clear_empties_the_selection() {
        let mut selection = Selection::row(3);
        selection.clear();

        assert!(selection.is_empty());

        for index in 27..36 {
            assert!(!selection.contains(index));
        }
    }

    #[test]
    fn bulk_operations_skip_out_of_range_indices() {
        let mut selection = Selection::new();

        assert!(selection.insert_all(vec![3, 81, 7, 1000]));
        assert_eq!(2, selection.len());

        assert!(!selection.remove_all(vec![81, 99]));
        assert!(selection.remove_all(vec![3, 81]));
        assert_eq!(1, selection.len());
    }

    #[test]
    fn retain_all_keeps_only_named_members() {
        let mut selection = Selection::row(0);
        selection.retain_all(vec![2, 4, 6, 81, 40]);

        assert_eq!(vec![2, 4, 6],
            selection.iter().collect::<Vec<usize>>());
    }

    #[test]
    fn set_algebra_is_non_mutating() {
        let row = Selection::row(0);
        let column = Selection::column(0);

        let union = row.union(&column);
        let intersection = row.intersection(&column);
        let difference = row.difference(&column);

        assert_eq!(17, union.len());
        assert_eq!(vec![0], intersection.iter().collect::<Vec<usize>>());
        assert_eq!(8, difference.len());
        assert!(!difference.contains(0));

        // The inputs are untouched.

        assert_eq!(Selection::row(0), row);
        assert_eq!(Selection::column(0), column);
    }

    #[test]
    fn inverse_complements_the_selection() {
        let selection = Selection::square(8);
        let inverse = selection.inverse();

        assert_eq!(72, inverse.len());

        for index in 0..81 {
            assert_ne!(selection.contains(index), inverse.contains(index));
        }

        assert_eq!(Selection::all(), selection.union(&inverse));
    }

    #[test]
    fn random_picks_members_only() {
        let selection = Selection::square(2);

        for _ in 0..100 {
            let picked = selection.random(&mut OsRng).unwrap();
            assert!(selection.contains(picked));
        }
    }

    #[test]
    fn random_on_empty_selection_is_none() {
        assert_eq!(None, Selection::new().random(&mut OsRng));
    }
}
