// Code lints

#![warn(trivial_casts)]
#![warn(trivial_numeric_casts)]
#![warn(unreachable_pub)]
#![warn(unused_import_braces)]
#![warn(unused_lifetimes)]
#![warn(unused_qualifications)]

// Doc lints

#![warn(missing_docs)]

//! This crate implements a classic 9x9 Sudoku engine built around human
//! solving techniques. It supports the following key features:
//!
//! * Parsing and printing Sudoku
//! * Tracking rule violations ("issues") on a board as it is edited
//! * Solving Sudoku deductively with an extensible set of strategies, each
//! tagged with a difficulty
//! * Grading Sudoku by the hardest strategy a deductive solution requires
//! * Generating Sudoku of a desired difficulty, with optional symmetry
//!
//! # Parsing and printing Sudoku
//!
//! See [Sudoku::parse] for the exact format of a Sudoku code. Codes can be
//! used to exchange Sudoku, while pretty prints can be used to display a
//! Sudoku in a clearer manner.
//!
//! ```
//! use sudoku_foundry::Sudoku;
//!
//! let sudoku = Sudoku::parse(
//!     "000000010400000000020000000000050407008000300001090000300400200050100000000806000"
//! ).unwrap();
//! println!("{}", sudoku);
//! ```
//!
//! # Solving and grading Sudoku
//!
//! A [StrategySolver](solver::StrategySolver) applies its strategies to a
//! board until none of them makes progress. If the board is solved at that
//! point, the hardest strategy that contributed determines the grade.
//!
//! ```
//! use sudoku_foundry::Sudoku;
//! use sudoku_foundry::solver::{Difficulty, StrategySolver};
//!
//! let sudoku = Sudoku::parse(
//!     "023456789456789123789123456231564897564897231897231564312645978645978312978312645"
//! ).unwrap();
//! let solver = StrategySolver::with_reference_strategies();
//!
//! assert!(solver.has_unique_solution(&sudoku));
//! assert_eq!(Difficulty::Easy, solver.grade(&sudoku));
//! ```
//!
//! # Generating Sudoku
//!
//! A [Generator](generator::Generator) produces a filled board and then digs
//! holes until the puzzle reaches a target difficulty while staying uniquely
//! solvable by the grading solver.
//!
//! ```
//! use sudoku_foundry::generator::Generator;
//! use sudoku_foundry::solver::Difficulty;
//!
//! let mut generator = Generator::new_default();
//! let sudoku = generator.generate(Difficulty::Easy).unwrap();
//!
//! assert!(sudoku.is_legal_state());
//! ```

pub mod candidates;
pub mod error;
pub mod generator;
pub mod selection;
pub mod solver;


#[cfg(test)]
mod scenario_tests;

use crate::error::{SudokuParseError, SudokuParseResult};
use crate::selection::{CELL_COUNT, HOUSE_SIZE, Selection};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde::de::{self, Visitor};

use std::fmt::{self, Display, Formatter};
use std::hash::{Hash, Hasher};

/// Gets the row (in `[0, 9)`, counted from the top) of the cell with the
/// given index.
pub fn index_to_row(index: usize) -> usize {
    assert!(index < CELL_COUNT, "index {} out of range", index);

    index / 9
}

/// Gets the column (in `[0, 9)`, counted from the left) of the cell with the
/// given index.
pub fn index_to_column(index: usize) -> usize {
    assert!(index < CELL_COUNT, "index {} out of range", index);

    index % 9
}

/// Gets the 3x3 square (in `[0, 9)`, counted left-to-right, top-to-bottom) of
/// the cell with the given index.
pub fn index_to_square(index: usize) -> usize {
    assert!(index < CELL_COUNT, "index {} out of range", index);

    (index / 27) * 3 + (index % 9) / 3
}

/// Gets the index of the cell at the given column and row.
pub fn position_to_index(column: usize, row: usize) -> usize {
    assert!(column < HOUSE_SIZE, "column {} out of range", column);
    assert!(row < HOUSE_SIZE, "row {} out of range", row);

    row * 9 + column
}

/// A classic 9x9 Sudoku board. Cells hold values in `[1, 9]` or 0 for empty.
/// The board may be in any state, including one that violates the Sudoku
/// rules; it continuously tracks the set of *issues*, that is, the cells
/// whose value also appears elsewhere in their row, column, or square.
///
/// Equality and hashing consider the cell values only, since the issues are
/// derived from them.
#[derive(Clone)]
pub struct Sudoku {
    cells: [u8; CELL_COUNT],
    issues: Selection
}

impl Sudoku {

    /// Creates a new, empty board without issues.
    pub fn new() -> Sudoku {
        Sudoku {
            cells: [0; CELL_COUNT],
            issues: Selection::new()
        }
    }

    /// Gets the value of the cell at the given index, where 0 indicates an
    /// empty cell.
    ///
    /// # Panics
    ///
    /// If `index` is not in the range `[0, 81)`.
    pub fn get(&self, index: usize) -> u8 {
        assert!(index < CELL_COUNT, "index {} out of range", index);

        self.cells[index]
    }

    /// Sets the value of the cell at the given index and updates the issues
    /// of all cells in the written cell's row, column, and square. Values
    /// greater than 9 are clamped to 0, so any `u8` clears the cell or
    /// writes a proper value.
    ///
    /// The update only rescans those three houses. A cell cleared by it can
    /// therefore lose its issue flag even though it still duplicates a value
    /// in one of its *other* houses; [Sudoku::regenerate_issues] restores
    /// such flags.
    ///
    /// # Panics
    ///
    /// If `index` is not in the range `[0, 81)`.
    pub fn set(&mut self, index: usize, value: u8) {
        assert!(index < CELL_COUNT, "index {} out of range", index);

        let value =
            if value > 9 {
                0
            }
            else {
                value
            };

        self.cells[index] = value;
        self.refresh_issues_around(index);
    }

    /// Writes `value` into every cell of the given selection at once, then
    /// regenerates all issues. Values greater than 9 are clamped to 0, as in
    /// [Sudoku::set].
    pub fn fill(&mut self, selection: &Selection, value: u8) {
        let value =
            if value > 9 {
                0
            }
            else {
                value
            };

        for index in selection {
            self.cells[index] = value;
        }

        self.regenerate_issues();
    }

    /// Gets the selection of cells within `selection` whose value equals
    /// `value`.
    pub fn indices_of(&self, value: u8, selection: &Selection) -> Selection {
        selection.iter()
            .filter(|&index| self.cells[index] == value)
            .collect()
    }

    /// Gets the selection of cells whose value also appears in another cell
    /// of the same row, column, or square. Empty cells are never issues.
    pub fn get_issues(&self) -> &Selection {
        &self.issues
    }

    /// Indicates whether the board currently satisfies the Sudoku rules,
    /// that is, has no issues. Empty cells are permitted.
    pub fn is_legal_state(&self) -> bool {
        self.issues.is_empty()
    }

    /// Indicates whether at least one cell of the board is empty.
    pub fn has_empty_cells(&self) -> bool {
        self.cells.iter().any(|&value| value == 0)
    }

    /// Indicates whether the board is completely filled and satisfies the
    /// Sudoku rules.
    pub fn is_solved(&self) -> bool {
        !self.has_empty_cells() && self.is_legal_state()
    }

    /// Gets the number of cells that currently hold a value.
    pub fn filled_count(&self) -> usize {
        self.cells.iter().filter(|&&value| value != 0).count()
    }

    /// Recomputes the issues of every cell from scratch.
    pub fn regenerate_issues(&mut self) {
        self.issues.clear();

        for house in 0..HOUSE_SIZE {
            self.refresh_issues_in(&Selection::row(house));
            self.refresh_issues_in(&Selection::column(house));
            self.refresh_issues_in(&Selection::square(house));
        }
    }

    // Recomputes the issues of all cells sharing a house with `index`. Only
    // those cells can have changed state after a write to `index`.
    fn refresh_issues_around(&mut self, index: usize) {
        let affected =
            Selection::affected_by(index).union(&Selection::singleton(index));

        for cell in &affected {
            self.issues.remove(cell);
        }

        self.refresh_issues_in(&Selection::row(index_to_row(index)));
        self.refresh_issues_in(&Selection::column(index_to_column(index)));
        self.refresh_issues_in(&Selection::square(index_to_square(index)));
    }

    // Marks all cells of the given house whose value appears more than once
    // in it. Never unmarks, so callers clear stale issues first.
    fn refresh_issues_in(&mut self, house: &Selection) {
        let mut counts = [0usize; HOUSE_SIZE];

        for index in house {
            let value = self.cells[index];

            if value != 0 {
                counts[value as usize - 1] += 1;
            }
        }

        for index in house {
            let value = self.cells[index];

            if value != 0 && counts[value as usize - 1] > 1 {
                self.issues.insert(index);
            }
        }
    }

    /// Parses a board from its 81-character code: one character per cell in
    /// row-major order, where the digits `1` to `9` denote filled cells and
    /// any other character denotes an empty cell. Leading and trailing
    /// whitespace around the code is ignored.
    ///
    /// # Errors
    ///
    /// If the trimmed code does not contain exactly 81 characters,
    /// `SudokuParseError::WrongLength` is raised.
    pub fn parse(code: &str) -> SudokuParseResult<Sudoku> {
        let code = code.trim();
        let char_count = code.chars().count();

        if char_count != CELL_COUNT {
            return Err(SudokuParseError::WrongLength(char_count));
        }

        let mut sudoku = Sudoku::new();

        for (index, c) in code.chars().enumerate() {
            if let Some(digit) = c.to_digit(10) {
                if digit >= 1 {
                    sudoku.cells[index] = digit as u8;
                }
            }
        }

        sudoku.regenerate_issues();
        Ok(sudoku)
    }

    /// Converts the board into its 81-character code, the inverse of
    /// [Sudoku::parse]. Empty cells are written as `0`.
    pub fn to_line_string(&self) -> String {
        self.cells.iter()
            .map(|&value| (b'0' + value) as char)
            .collect()
    }
}

impl Default for Sudoku {
    fn default() -> Sudoku {
        Sudoku::new()
    }
}

impl PartialEq for Sudoku {
    fn eq(&self, other: &Sudoku) -> bool {
        self.cells[..] == other.cells[..]
    }
}

impl Eq for Sudoku { }

impl Hash for Sudoku {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.cells.hash(state);
    }
}

fn to_char(value: u8) -> char {
    if value == 0 {
        ' '
    }
    else {
        (b'0' + value) as char
    }
}

fn line(start: char, thick_sep: char, thin_sep: char,
        segment: impl Fn(usize) -> char, pad: char, end: char,
        newline: bool) -> String {
    let mut result = String::new();

    for column in 0..HOUSE_SIZE {
        if column == 0 {
            result.push(start);
        }
        else if column % 3 == 0 {
            result.push(thick_sep);
        }
        else {
            result.push(thin_sep);
        }

        result.push(pad);
        result.push(segment(column));
        result.push(pad);
    }

    result.push(end);

    if newline {
        result.push('\n');
    }

    result
}

fn top_row() -> String {
    line('╔', '╦', '╤', |_| '═', '═', '╗', true)
}

fn thin_separator_line() -> String {
    line('╟', '╫', '┼', |_| '─', '─', '╢', true)
}

fn thick_separator_line() -> String {
    line('╠', '╬', '╪', |_| '═', '═', '╣', true)
}

fn bottom_row() -> String {
    line('╚', '╩', '╧', |_| '═', '═', '╝', false)
}

fn content_row(sudoku: &Sudoku, row: usize) -> String {
    line('║', '║', '│',
        |column| to_char(sudoku.get(position_to_index(column, row))), ' ',
        '║', true)
}

impl Display for Sudoku {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let thin_separator_line = thin_separator_line();
        let thick_separator_line = thick_separator_line();

        for row in 0..HOUSE_SIZE {
            if row == 0 {
                f.write_str(top_row().as_str())?;
            }
            else if row % 3 == 0 {
                f.write_str(thick_separator_line.as_str())?;
            }
            else {
                f.write_str(thin_separator_line.as_str())?;
            }

            f.write_str(content_row(self, row).as_str())?;
        }

        f.write_str(bottom_row().as_str())?;
        Ok(())
    }
}

impl fmt::Debug for Sudoku {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Sudoku({})", self.to_line_string())
    }
}

impl Serialize for Sudoku {
    fn serialize<S: Serializer>(&self, serializer: S)
            -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.to_line_string().as_str())
    }
}

struct SudokuVisitor;

impl<'de> Visitor<'de> for SudokuVisitor {
    type Value = Sudoku;

    fn expecting(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "an 81-character sudoku code")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Sudoku, E> {
        Sudoku::parse(v).map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for Sudoku {
    fn deserialize<D: Deserializer<'de>>(deserializer: D)
            -> Result<Sudoku, D::Error> {
        deserializer.deserialize_str(SudokuVisitor)
    }
}
