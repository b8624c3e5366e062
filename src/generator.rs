//! This module contains the puzzle construction machinery: the
//! [FilledGenerator] that assembles random solved boards, the hole-digging
//! types ([HolePolicy], [Symmetry], and [HoleMaker]) that turn a solved board
//! into a puzzle, and the [Generator] that composes them with a grading
//! [StrategySolver] to hit a target [Difficulty].
//!
//! All randomness flows through explicit [Rng] handles owned by the
//! components that need them. For most cases, sensible defaults are provided
//! by [Generator::new_default].

use crate::Sudoku;
use crate::candidates::ValueIter;
use crate::error::{SudokuError, SudokuResult};
use crate::selection::{CELL_COUNT, HOUSE_SIZE, Selection, mirrored_index};
use crate::solver::{Difficulty, StrategySolver};

use log::{debug, info};

use rand::Rng;
use rand::rngs::ThreadRng;

use rand_distr::{Distribution, Normal};

use serde::{Deserialize, Serialize};

use std::f64::consts;

/// The number of times a [FilledGenerator] restarts from scratch before
/// giving up.
pub const FILL_ATTEMPTS: usize = 50;

/// The number of filled boards a [Generator] digs before concluding the
/// difficulty target cannot be met.
pub const DIG_ATTEMPTS: usize = 50;

/// Hole digging below this number of remaining filled cells is validated
/// against the grading solver; above it, removals are accepted blindly,
/// since boards with this many clues stay solvable.
pub const VALIDATED_REMAINING: usize = 50;

const ALL_OPTIONS: u16 = (1 << HOUSE_SIZE) - 1;

/// Generates random, fully filled, rule-legal boards by constraint
/// propagation: cells start with all nine values as options, committing a
/// cell to a value removes that option from every cell sharing a house with
/// it, and the generator always commits the most constrained cell next. A
/// cell left with a single option is committed automatically; a cell left
/// with none aborts the attempt, and the generator restarts from an empty
/// board, up to [FILL_ATTEMPTS] times.
pub struct FilledGenerator<R: Rng> {
    rng: R
}

impl FilledGenerator<ThreadRng> {

    /// Creates a new filled-board generator backed by the thread-local
    /// random number generator.
    pub fn new_default() -> FilledGenerator<ThreadRng> {
        FilledGenerator::new(rand::thread_rng())
    }
}

impl<R: Rng> FilledGenerator<R> {

    /// Creates a new filled-board generator backed by the given random
    /// number generator.
    pub fn new(rng: R) -> FilledGenerator<R> {
        FilledGenerator {
            rng
        }
    }

    /// Generates a random, fully filled, rule-legal board.
    ///
    /// # Errors
    ///
    /// If no attempt within the retry budget produces a board that passes
    /// the final legality check, `SudokuError::Unfillable` is raised.
    pub fn generate(&mut self) -> SudokuResult<Sudoku> {
        for attempt in 1..=FILL_ATTEMPTS {
            if let Some(sudoku) = self.try_collapse() {
                if sudoku.is_solved() {
                    debug!("assembled a filled board on attempt {}", attempt);
                    return Ok(sudoku);
                }
            }

            debug!("board fill attempt {} ran into a contradiction", attempt);
        }

        Err(SudokuError::Unfillable)
    }

    fn try_collapse(&mut self) -> Option<Sudoku> {
        let mut options = [ALL_OPTIONS; CELL_COUNT];
        let mut values = [0u8; CELL_COUNT];

        while let Some(index) = self.pick_next(&options, &values) {
            let mask = options[index];
            let choice = self.rng.gen_range(0..mask.count_ones() as usize);
            let value = ValueIter::from_mask(mask).nth(choice).unwrap();

            if !collapse(&mut options, &mut values, index, value) {
                return None;
            }
        }

        let mut sudoku = Sudoku::new();

        for (index, &value) in values.iter().enumerate() {
            sudoku.set(index, value);
        }

        Some(sudoku)
    }

    // Picks the uncommitted cell with the fewest remaining options, breaking
    // ties uniformly at random. None once every cell is committed.
    fn pick_next(&mut self, options: &[u16; CELL_COUNT],
            values: &[u8; CELL_COUNT]) -> Option<usize> {
        let mut best_count = usize::MAX;
        let mut best = Vec::new();

        for index in 0..CELL_COUNT {
            if values[index] != 0 {
                continue;
            }

            let count = options[index].count_ones() as usize;

            if count < best_count {
                best_count = count;
                best.clear();
                best.push(index);
            }
            else if count == best_count {
                best.push(index);
            }
        }

        if best.is_empty() {
            None
        }
        else {
            Some(best[self.rng.gen_range(0..best.len())])
        }
    }
}

// Commits `value` at `index` and cascades the removal of that option through
// all affected cells. Cells reduced to one option are committed in turn;
// returns false as soon as any cell is reduced to zero options.
fn collapse(options: &mut [u16; CELL_COUNT], values: &mut [u8; CELL_COUNT],
        index: usize, value: u8) -> bool {
    values[index] = value;
    options[index] = 0;

    let mut pending = vec![(index, value)];

    while let Some((committed, value)) = pending.pop() {
        let mask = 1u16 << (value - 1);

        for affected in &Selection::affected_by(committed) {
            if values[affected] != 0 || options[affected] & mask == 0 {
                continue;
            }

            options[affected] &= !mask;

            match options[affected].count_ones() {
                0 => return false,
                1 => {
                    let forced =
                        options[affected].trailing_zeros() as u8 + 1;

                    values[affected] = forced;
                    options[affected] = 0;
                    pending.push((affected, forced));
                },
                _ => { }
            }
        }
    }

    true
}

/// Selects the next cell to dig a hole at. Implementations own their random
/// source, so the same policy instance yields a reproducible dig order for a
/// reproducible seed.
pub trait HolePolicy {

    /// Proposes the next hole among the given remaining filled cells. An
    /// empty selection signals that the policy has no further proposal.
    fn next_hole(&mut self, remaining: &Selection) -> Selection;
}

/// A [HolePolicy] that picks a uniformly random remaining filled cell.
pub struct RandomHolePolicy<R: Rng> {
    rng: R
}

impl RandomHolePolicy<ThreadRng> {

    /// Creates a new random hole policy backed by the thread-local random
    /// number generator.
    pub fn new_default() -> RandomHolePolicy<ThreadRng> {
        RandomHolePolicy::new(rand::thread_rng())
    }
}

impl<R: Rng> RandomHolePolicy<R> {

    /// Creates a new random hole policy backed by the given random number
    /// generator.
    pub fn new(rng: R) -> RandomHolePolicy<R> {
        RandomHolePolicy {
            rng
        }
    }
}

impl<R: Rng> HolePolicy for RandomHolePolicy<R> {
    fn next_hole(&mut self, remaining: &Selection) -> Selection {
        remaining.random(&mut self.rng)
            .map(Selection::singleton)
            .unwrap_or_else(Selection::new)
    }
}

/// A [HolePolicy] that distributes holes evenly over the nine squares: it
/// cycles through the squares in order and picks a random remaining filled
/// cell of the current one. Squares with no remaining filled cells are
/// skipped; once every square is exhausted, the policy proposes nothing.
pub struct PerSquareHolePolicy<R: Rng> {
    rng: R,
    next_square: usize
}

impl PerSquareHolePolicy<ThreadRng> {

    /// Creates a new per-square hole policy backed by the thread-local
    /// random number generator.
    pub fn new_default() -> PerSquareHolePolicy<ThreadRng> {
        PerSquareHolePolicy::new(rand::thread_rng())
    }
}

impl<R: Rng> PerSquareHolePolicy<R> {

    /// Creates a new per-square hole policy backed by the given random
    /// number generator. The first proposal is drawn from square 0.
    pub fn new(rng: R) -> PerSquareHolePolicy<R> {
        PerSquareHolePolicy {
            rng,
            next_square: 0
        }
    }
}

impl<R: Rng> HolePolicy for PerSquareHolePolicy<R> {
    fn next_hole(&mut self, remaining: &Selection) -> Selection {
        for _ in 0..HOUSE_SIZE {
            let square = Selection::square(self.next_square);
            self.next_square = (self.next_square + 1) % HOUSE_SIZE;

            if let Some(index) =
                    remaining.intersection(&square).random(&mut self.rng) {
                return Selection::singleton(index);
            }
        }

        Selection::new()
    }
}

/// A [HolePolicy] that assigns each cell a priority via a caller-provided
/// weight function, perturbs the priorities with normally distributed noise,
/// and proposes the remaining filled cell with the lowest result. A constant
/// weight function degenerates into a random policy; a weight proportional
/// to the distance from the center digs the border first.
pub struct WeightedHolePolicy<R: Rng, W: Fn(usize) -> f64> {
    rng: R,
    weight: W,
    noise: Normal<f64>
}

impl<R: Rng, W: Fn(usize) -> f64> WeightedHolePolicy<R, W> {

    /// Creates a new weighted hole policy with the given random number
    /// generator and weight function.
    pub fn new(rng: R, weight: W) -> WeightedHolePolicy<R, W> {
        WeightedHolePolicy {
            rng,
            weight,
            noise: Normal::new(0.0, consts::FRAC_1_SQRT_2).unwrap()
        }
    }
}

impl<R: Rng, W: Fn(usize) -> f64> HolePolicy for WeightedHolePolicy<R, W> {
    fn next_hole(&mut self, remaining: &Selection) -> Selection {
        let mut best: Option<(usize, f64)> = None;

        for index in remaining {
            let priority =
                (self.weight)(index) + self.noise.sample(&mut self.rng);

            match best {
                Some((_, best_priority)) if best_priority <= priority => { },
                _ => best = Some((index, priority))
            }
        }

        best.map(|(index, _)| Selection::singleton(index))
            .unwrap_or_else(Selection::new)
    }
}

/// A mirror transformation applied to every hole a [HoleMaker] digs, so the
/// pattern of empty cells in the finished puzzle has the corresponding
/// symmetry.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Symmetry {

    /// Maps every cell to its image under a 180 degree rotation about the
    /// board center.
    Rotational180,

    /// Maps every cell to its reflection across the horizontal center line,
    /// that is, row `r` maps to row `8 - r`.
    Horizontal,

    /// Maps every cell to its reflection across the vertical center line,
    /// that is, column `c` maps to column `8 - c`.
    Vertical
}

impl Symmetry {

    /// Gets the index of the mirror image of the cell at the given index
    /// under this symmetry.
    ///
    /// # Panics
    ///
    /// If `index` is not in the range `[0, 81)`.
    pub fn mirror(&self, index: usize) -> usize {
        match self {
            Symmetry::Rotational180 => mirrored_index(index, true, true),
            Symmetry::Horizontal => mirrored_index(index, false, true),
            Symmetry::Vertical => mirrored_index(index, true, false)
        }
    }
}

/// Digs holes into a filled board until it cannot be emptied further without
/// losing unique solvability or overshooting a difficulty target. Holes are
/// proposed by a [HolePolicy] and expanded by any number of [Symmetry]
/// modifiers.
///
/// Digging proceeds in rounds of one policy hole plus its mirror images.
/// While at least [VALIDATED_REMAINING] cells remain filled, every hole is
/// accepted blindly; below that, each hole is individually validated by
/// grading the board without it and is restored if the board becomes
/// unsolvable for the grader or exceeds the target. Digging stops after the
/// first round in which no hole was usable, that is, actually removed a
/// value and survived validation.
pub struct HoleMaker<P: HolePolicy> {
    policy: P,
    symmetries: Vec<Symmetry>
}

impl<P: HolePolicy> HoleMaker<P> {

    /// Creates a new hole maker with the given policy and symmetry
    /// modifiers. An empty symmetry list yields plain one-hole rounds.
    pub fn new(policy: P, symmetries: Vec<Symmetry>) -> HoleMaker<P> {
        HoleMaker {
            policy,
            symmetries
        }
    }

    fn next_holes(&mut self, remaining: &Selection) -> Selection {
        let mut holes = self.policy.next_hole(remaining);

        for symmetry in &self.symmetries {
            let mirrored: Selection = holes.iter()
                .map(|index| symmetry.mirror(index))
                .collect();

            holes.insert_all(&mirrored);
        }

        holes
    }

    /// Digs holes into the given board until no further hole is usable, as
    /// described in the type-level documentation, and returns the grade of
    /// the resulting puzzle according to `solver`. A `target` of
    /// [Difficulty::Any] disables the difficulty ceiling and keeps only the
    /// unique-solvability validation.
    pub fn dig(&mut self, sudoku: &mut Sudoku, solver: &StrategySolver,
            target: Difficulty) -> Difficulty {
        let mut remaining = sudoku.indices_of(0, &Selection::all()).inverse();

        loop {
            let holes = self.next_holes(&remaining);
            let mut usable = 0;

            for hole in &holes {
                let value = sudoku.get(hole);

                if value == 0 {
                    continue;
                }

                sudoku.set(hole, 0);
                remaining.remove(hole);

                if remaining.len() < VALIDATED_REMAINING {
                    let grade = solver.grade(sudoku);

                    if grade == Difficulty::Ungraded || grade > target {
                        sudoku.set(hole, value);
                        remaining.insert(hole);
                        continue;
                    }
                }

                usable += 1;
            }

            if usable == 0 {
                break;
            }
        }

        solver.grade(sudoku)
    }
}

/// The complete puzzle generation pipeline: a [FilledGenerator] assembles a
/// solved board, a [HoleMaker] digs it into a puzzle, and a grading
/// [StrategySolver] validates difficulty and unique solvability along the
/// way. Should a dug puzzle end up missing the target regardless (possible
/// when digging stalls right at the validation threshold), the generator
/// discards it and starts over with a fresh filled board, up to
/// [DIG_ATTEMPTS] times.
pub struct Generator<R: Rng, P: HolePolicy> {
    filled: FilledGenerator<R>,
    hole_maker: HoleMaker<P>,
    grader: StrategySolver
}

impl Generator<ThreadRng, RandomHolePolicy<ThreadRng>> {

    /// Creates a generator with default components: thread-local randomness,
    /// a [RandomHolePolicy] without symmetries, and a grader equipped with
    /// the reference strategies.
    pub fn new_default() -> Generator<ThreadRng, RandomHolePolicy<ThreadRng>> {
        Generator::new(
            FilledGenerator::new_default(),
            HoleMaker::new(RandomHolePolicy::new_default(), Vec::new()),
            StrategySolver::with_reference_strategies())
    }
}

impl<R: Rng, P: HolePolicy> Generator<R, P> {

    /// Creates a generator from the given components.
    pub fn new(filled: FilledGenerator<R>, hole_maker: HoleMaker<P>,
            grader: StrategySolver) -> Generator<R, P> {
        Generator {
            filled,
            hole_maker,
            grader
        }
    }

    /// Generates a puzzle that is uniquely solvable by the grading solver
    /// and whose grade does not exceed `target`. See
    /// [Generator::generate_graded] for details and error conditions.
    ///
    /// # Panics
    ///
    /// If `target` is [Difficulty::Ungraded], which no puzzle can satisfy.
    pub fn generate(&mut self, target: Difficulty) -> SudokuResult<Sudoku> {
        self.generate_graded(target).map(|(sudoku, _)| sudoku)
    }

    /// Generates a puzzle that is uniquely solvable by the grading solver
    /// and whose grade does not exceed `target`, returning the puzzle
    /// together with its achieved grade. A `target` of [Difficulty::Any]
    /// requires unique solvability only.
    ///
    /// # Errors
    ///
    /// `SudokuError::Unfillable` if no filled board could be assembled, and
    /// `SudokuError::TargetMissed` if every dug puzzle within the attempt
    /// budget missed the target.
    ///
    /// # Panics
    ///
    /// If `target` is [Difficulty::Ungraded], which no puzzle can satisfy.
    pub fn generate_graded(&mut self, target: Difficulty)
            -> SudokuResult<(Sudoku, Difficulty)> {
        assert!(target != Difficulty::Ungraded,
            "no puzzle can meet an ungraded difficulty target");

        for _ in 0..DIG_ATTEMPTS {
            let mut sudoku = self.filled.generate()?;
            let grade = self.hole_maker.dig(&mut sudoku, &self.grader,
                target);

            if grade != Difficulty::Ungraded && grade <= target {
                info!("generated a puzzle graded {} with {} clues", grade,
                    sudoku.filled_count());
                return Ok((sudoku, grade));
            }

            debug!("discarded a puzzle graded {} for the {} target", grade,
                target);
        }

        Err(SudokuError::TargetMissed)
    }
}
