//! This module contains the [Strategy] trait and the reference strategies
//! shipped with this crate.
//!
//! A strategy encodes one human solving technique. It inspects a read-only
//! [SudokuView] and proposes [Action]s; it never mutates the board itself and
//! must only propose deductions that are *forced*, that is, hold in every
//! solution of the board. The [StrategySolver](crate::solver::StrategySolver)
//! relies on this soundness for grading and for its uniqueness check.
//!
//! Strategies may see stale candidates that an easier strategy has not
//! cleaned up yet. That is intentional: a technique like
//! [LastInCell] only becomes applicable once [LinearElimination] has done its
//! work, which is exactly what makes the two grade differently.

use crate::selection::{HOUSE_SIZE, Selection};
use crate::solver::{Action, Difficulty, Reason, Source, SudokuView};

/// A single human solving technique. Implementations inspect the given view
/// and return every action their technique justifies in the current state.
/// Proposing an action that turns out to be redundant is fine (it is dropped
/// silently), but proposing an *unsound* one violates the contracts of
/// [AnnotatedSudoku](crate::solver::AnnotatedSudoku) and panics.
pub trait Strategy {

    /// Proposes all actions this technique justifies on the given board.
    fn apply(&self, view: &SudokuView<'_>) -> Vec<Action>;

    /// The difficulty of this technique, used to order strategies in the
    /// solver and to grade puzzles.
    fn difficulty(&self) -> Difficulty;

    /// A short display name for this technique, used in action logs.
    fn name(&self) -> &'static str;

    /// The source tag attached to every action this strategy proposes.
    fn source(&self) -> Source {
        Source::new(self.name(), self.difficulty())
    }
}

// Squares first, then rows, then columns.
fn houses() -> impl Iterator<Item = Selection> {
    (0..HOUSE_SIZE).map(Selection::square)
        .chain((0..HOUSE_SIZE).map(Selection::row))
        .chain((0..HOUSE_SIZE).map(Selection::column))
}

/// The most basic technique: a placed value cannot recur in its row, column,
/// or square, so it is eliminated as a candidate from every empty peer of its
/// cell. Graded [Difficulty::Easy].
pub struct LinearElimination;

impl Strategy for LinearElimination {
    fn apply(&self, view: &SudokuView<'_>) -> Vec<Action> {
        let mut actions = Vec::new();

        for index in view.indices_of(0, &Selection::all()).inverse().iter() {
            let value = view.value(index);
            let affected = Selection::affected_by(index);

            for peer in &affected {
                if view.value(peer) == 0
                        && view.candidates(peer).any(|c| c == value) {
                    actions.push(Action::eliminate(peer, value,
                        self.source(),
                        Reason::from_cells(Selection::singleton(index))));
                }
            }
        }

        actions
    }

    fn difficulty(&self) -> Difficulty {
        Difficulty::Easy
    }

    fn name(&self) -> &'static str {
        "linear elimination"
    }
}

/// Finds values that fit in only one remaining cell of a house: if a value is
/// absent from a house and exactly one empty cell of that house still has it
/// as a candidate, that cell must hold it. Graded [Difficulty::Easy].
pub struct LastInHouse;

impl Strategy for LastInHouse {
    fn apply(&self, view: &SudokuView<'_>) -> Vec<Action> {
        let mut actions = Vec::new();

        for house in houses() {
            let placed = view.appearance_counts(&house);

            for value in 1..=9u8 {
                if placed[value as usize - 1] != 0 {
                    continue;
                }

                let candidate_cells: Selection = house.iter()
                    .filter(|&index| view.value(index) == 0
                        && view.candidates(index).any(|c| c == value))
                    .collect();

                if candidate_cells.len() == 1 {
                    let target = candidate_cells.iter().next().unwrap();
                    let reason = Reason::from_cells(
                        house.difference(&candidate_cells));

                    actions.push(Action::solve(target, value, self.source(),
                        reason));
                }
            }
        }

        actions
    }

    fn difficulty(&self) -> Difficulty {
        Difficulty::Easy
    }

    fn name(&self) -> &'static str {
        "last in house"
    }
}

/// Finds cells with a single remaining candidate and solves them with it.
/// Graded [Difficulty::Medium], since spotting such a cell requires tracking
/// its candidates rather than looking at placed values.
pub struct LastInCell;

impl Strategy for LastInCell {
    fn apply(&self, view: &SudokuView<'_>) -> Vec<Action> {
        let mut actions = Vec::new();

        for index in view.indices_of(0, &Selection::all()).iter() {
            if view.candidate_count(index) != 1 {
                continue;
            }

            let value = view.candidates(index).next().unwrap();
            let mut reason = Reason::new();
            reason.add_note(index, value);

            actions.push(Action::solve(index, value, self.source(), reason));
        }

        actions
    }

    fn difficulty(&self) -> Difficulty {
        Difficulty::Medium
    }

    fn name(&self) -> &'static str {
        "last in cell"
    }
}

/// Finds naked pairs: two empty cells of a house that share the same two
/// candidates and nothing else. Those two values must occupy those two cells
/// in some order, so they are eliminated from every other empty cell of the
/// house. Graded [Difficulty::Hard].
pub struct NakedPairs;

impl Strategy for NakedPairs {
    fn apply(&self, view: &SudokuView<'_>) -> Vec<Action> {
        let mut actions = Vec::new();

        for house in houses() {
            let pair_cells: Vec<(usize, u16)> = house.iter()
                .filter(|&index| view.candidate_count(index) == 2)
                .map(|index| (index, view.candidate_mask(index)))
                .collect();

            for (i, &(first, mask)) in pair_cells.iter().enumerate() {
                for &(second, other_mask) in pair_cells[i + 1..].iter() {
                    if mask != other_mask {
                        continue;
                    }

                    self.eliminate_pair(view, &house, first, second, mask,
                        &mut actions);
                }
            }
        }

        actions
    }

    fn difficulty(&self) -> Difficulty {
        Difficulty::Hard
    }

    fn name(&self) -> &'static str {
        "naked pairs"
    }
}

impl NakedPairs {
    fn eliminate_pair(&self, view: &SudokuView<'_>, house: &Selection,
            first: usize, second: usize, mask: u16,
            actions: &mut Vec<Action>) {
        let values: Vec<u8> =
            crate::candidates::ValueIter::from_mask(mask).collect();
        let mut reason = Reason::new();

        for &value in &values {
            reason.add_note(first, value);
            reason.add_note(second, value);
        }

        for other in house {
            if other == first || other == second || view.value(other) != 0 {
                continue;
            }

            for &value in &values {
                if view.candidates(other).any(|c| c == value) {
                    actions.push(Action::eliminate(other, value,
                        self.source(), reason.clone()));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    use crate::Sudoku;
    use crate::solver::{ActionKind, AnnotatedSudoku};

    fn annotated(code: &str) -> AnnotatedSudoku {
        AnnotatedSudoku::new(&Sudoku::parse(code).unwrap())
    }

    #[test]
    fn linear_elimination_strips_placed_values_from_empty_peers() {
        let mut working = annotated(
            &format!("5{}", "0".repeat(80)));
        let actions = LinearElimination.apply(&working.view());

        assert_eq!(20, working.apply(actions));

        for peer in &Selection::affected_by(0) {
            assert!(!working.view().candidates(peer).any(|v| v == 5));
        }
    }

    #[test]
    fn linear_elimination_converges_after_one_pass() {
        let mut working = annotated(
            &format!("5{}", "0".repeat(80)));

        working.apply(LinearElimination.apply(&working.view()));

        // Everything is stripped now, so a second pass proposes nothing.

        let actions = LinearElimination.apply(&working.view());

        assert!(actions.is_empty());
        assert_eq!(0, working.apply(actions));
    }

    #[test]
    fn last_in_house_solves_the_only_open_cell_of_a_row() {
        let mut working = annotated(
            &format!("023456789{}", "0".repeat(72)));
        let actions = LastInHouse.apply(&working.view());
        let solve = actions.iter()
            .find(|action| action.index() == 0)
            .unwrap();

        assert_eq!(ActionKind::Solve, solve.kind());
        assert_eq!(1, solve.value());
        assert_eq!(8, solve.reason().cells().len());
        assert!(working.apply(actions) >= 1);
        assert_eq!(1, working.sudoku().get(0));
    }

    #[test]
    fn last_in_house_skips_values_already_placed() {
        let working = annotated(
            &format!("123456789{}", "0".repeat(72)));
        let actions = LastInHouse.apply(&working.view());

        assert!(actions.iter().all(|action| action.index() >= 9));
    }

    #[test]
    fn last_in_cell_solves_single_candidate_cells() {
        // Cell 40 sees 1..=8 through its row and column, leaving only 9.

        let mut sudoku = Sudoku::new();

        for (offset, value) in [36, 37, 38, 39].iter().zip(1..=4u8) {
            sudoku.set(*offset, value);
        }

        for (offset, value) in [4, 13, 22, 31].iter().zip(5..=8u8) {
            sudoku.set(*offset, value);
        }

        let mut working = AnnotatedSudoku::new(&sudoku);

        working.apply(LinearElimination.apply(&working.view()));

        let actions = LastInCell.apply(&working.view());
        let solve = actions.iter()
            .find(|action| action.index() == 40)
            .unwrap();

        assert_eq!(9, solve.value());
        assert!(working.apply(actions) >= 1);
        assert_eq!(9, working.sudoku().get(40));
    }

    #[test]
    fn last_in_cell_ignores_cells_with_multiple_candidates() {
        let working = annotated(
            &format!("12{}", "0".repeat(79)));
        let actions = LastInCell.apply(&working.view());

        assert!(actions.is_empty());
    }

    #[test]
    fn naked_pairs_eliminates_shared_values_from_the_house() {
        // In row 0, cells 0 and 1 see 3..=9 through their columns, leaving
        // both with exactly the candidates {1, 2}.

        let mut sudoku = Sudoku::new();
        let column_0 = [3, 4, 5, 6, 7, 8, 9];
        let column_1 = [5, 6, 8, 9, 3, 4, 7];

        for (row, (&left, &right)) in
                (1..8).zip(column_0.iter().zip(column_1.iter())) {
            sudoku.set(row * 9, left);
            sudoku.set(row * 9 + 1, right);
        }

        assert!(sudoku.is_legal_state());

        let mut working = AnnotatedSudoku::new(&sudoku);

        working.apply(LinearElimination.apply(&working.view()));

        let view = working.view();

        assert_eq!(0b11, view.candidate_mask(0));
        assert_eq!(0b11, view.candidate_mask(1));

        let actions = NakedPairs.apply(&view);
        let row_targets: Vec<usize> = actions.iter()
            .map(|action| action.index())
            .filter(|&index| index < 9)
            .collect();

        assert!(!row_targets.is_empty());

        for action in &actions {
            assert_eq!(ActionKind::EliminateCandidate, action.kind());
            assert_ne!(0, action.index());
            assert_ne!(1, action.index());
            assert!(action.value() == 1 || action.value() == 2);
            assert_eq!(2, action.reason().cells().len());
        }
    }

    #[test]
    fn naked_pairs_finds_nothing_on_an_empty_board() {
        let working = AnnotatedSudoku::new(&Sudoku::new());

        assert!(NakedPairs.apply(&working.view()).is_empty());
    }

    #[test]
    fn reference_strategies_report_their_difficulties() {
        assert_eq!(Difficulty::Easy, LinearElimination.difficulty());
        assert_eq!(Difficulty::Easy, LastInHouse.difficulty());
        assert_eq!(Difficulty::Medium, LastInCell.difficulty());
        assert_eq!(Difficulty::Hard, NakedPairs.difficulty());
        assert_eq!("naked pairs", NakedPairs.source().name());
    }
}
