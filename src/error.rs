//! This module contains the error and result definitions used in this crate.
//!
//! Only *expected* failures are modeled here. Contract violations, such as
//! out-of-range indices or a strategy proposing a contradictory deduction,
//! are programming errors and raise panics with diagnostic context instead
//! (see the individual method documentation for the exact conditions).

use thiserror::Error;

/// Miscellaneous errors that can occur during puzzle generation. These are
/// expected, recoverable outcomes: a caller may retry with a different random
/// source or simply report the failure.
#[derive(Clone, Copy, Debug, Error, Eq, PartialEq)]
pub enum SudokuError {

    /// Indicates that the filled-grid generator exhausted its retry budget
    /// without assembling a rule-legal board. With a healthy random source
    /// this is extremely unlikely, but generation is a bounded process and
    /// therefore allowed to fail.
    #[error("no legal filled grid was produced within the attempt budget")]
    Unfillable,

    /// Indicates that repeated digging attempts failed to produce a puzzle
    /// that is uniquely solvable at no more than the requested difficulty.
    /// Like [SudokuError::Unfillable], this is a bounded-retry outcome and
    /// practically never occurs for reachable difficulty targets.
    #[error("no puzzle matching the difficulty target was produced within \
        the attempt budget")]
    TargetMissed
}

/// Syntactic sugar for `Result<V, SudokuError>`.
pub type SudokuResult<V> = Result<V, SudokuError>;

/// An enumeration of the errors that may occur when parsing a
/// [Sudoku](crate::Sudoku) from its 81-character line code.
#[derive(Clone, Copy, Debug, Error, Eq, PartialEq)]
pub enum SudokuParseError {

    /// Indicates that the code does not contain exactly 81 characters. The
    /// actual number of characters found is wrapped in this variant.
    #[error("a sudoku code must contain exactly 81 characters, found {0}")]
    WrongLength(usize)
}

/// Syntactic sugar for `Result<V, SudokuParseError>`.
pub type SudokuParseResult<V> = Result<V, SudokuParseError>;
