//! End-to-end tests that exercise the board, solver, and generator together
//! the way an embedding application would.

use crate::Sudoku;
use crate::generator::{
    FilledGenerator, Generator, HoleMaker, RandomHolePolicy
};
use crate::selection::Selection;
use crate::solver::{Difficulty, StrategySolver};

use rand::SeedableRng;

use rand_chacha::ChaCha8Rng;

fn seeded(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

#[test]
fn single_filled_row_is_legal_but_unsolved() {
    let mut sudoku = Sudoku::new();

    for (index, value) in (1..=9u8).enumerate() {
        sudoku.set(index, value);
    }

    assert!(sudoku.get_issues().is_empty());
    assert!(sudoku.is_legal_state());
    assert!(!sudoku.is_solved());
}

#[test]
fn duplicate_appears_and_disappears_with_its_cells() {
    let mut sudoku = Sudoku::new();
    sudoku.set(9, 6);
    sudoku.set(13, 6);

    assert!(sudoku.get_issues().contains(9));
    assert!(sudoku.get_issues().contains(13));

    sudoku.set(9, 0);

    assert!(sudoku.get_issues().is_empty());
}

#[test]
fn solved_board_needs_no_work_from_the_solver() {
    let mut generator = FilledGenerator::new(seeded(101));
    let sudoku = generator.generate().unwrap();
    let solver = StrategySolver::with_reference_strategies();

    assert!(sudoku.get_issues().is_empty());
    assert!(solver.has_unique_solution(&sudoku));
    assert_eq!(Some(sudoku.clone()), solver.get_solution(&sudoku));
    assert_eq!(Difficulty::Ungraded, solver.grade(&sudoku));
}

#[test]
fn easy_target_is_never_exceeded() {
    let mut generator = Generator::new(
        FilledGenerator::new(seeded(102)),
        HoleMaker::new(RandomHolePolicy::new(seeded(103)), Vec::new()),
        StrategySolver::with_reference_strategies());
    let (sudoku, grade) =
        generator.generate_graded(Difficulty::Easy).unwrap();
    let solver = StrategySolver::with_reference_strategies();

    assert_ne!(Difficulty::Ungraded, grade);
    assert!(grade <= Difficulty::Easy);
    assert!(solver.has_unique_solution(&sudoku));
}

#[test]
fn clearing_a_generated_board_leaves_a_clean_slate() {
    let mut generator = FilledGenerator::new(seeded(104));
    let mut sudoku = generator.generate().unwrap();

    assert!(sudoku.is_solved());

    sudoku.fill(&Selection::all(), 0);

    assert!(sudoku.get_issues().is_empty());
    assert_eq!(0, sudoku.filled_count());
    assert!(!sudoku.is_solved());
}

#[test]
fn grading_is_idempotent() {
    let mut generator = Generator::new(
        FilledGenerator::new(seeded(105)),
        HoleMaker::new(RandomHolePolicy::new(seeded(106)), Vec::new()),
        StrategySolver::with_reference_strategies());
    let sudoku = generator.generate(Difficulty::Any).unwrap();
    let solver = StrategySolver::with_reference_strategies();
    let original = sudoku.clone();

    assert_eq!(solver.grade(&sudoku), solver.grade(&sudoku));

    // Grading works on a clone and never touches the caller's board.

    assert_eq!(original, sudoku);
}

#[test]
fn generated_puzzles_survive_the_line_codec() {
    let mut generator = Generator::new(
        FilledGenerator::new(seeded(107)),
        HoleMaker::new(RandomHolePolicy::new(seeded(108)), Vec::new()),
        StrategySolver::with_reference_strategies());
    let sudoku = generator.generate(Difficulty::Any).unwrap();
    let restored = Sudoku::parse(sudoku.to_line_string().as_str()).unwrap();

    assert_eq!(sudoku, restored);
    assert_eq!(sudoku.get_issues(), restored.get_issues());
}
