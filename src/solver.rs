//! This module contains the deductive solving and grading machinery.
//!
//! The central type is the [StrategySolver], which applies a set of
//! [strategies](strategy::Strategy) to an [AnnotatedSudoku] until none of
//! them makes progress. Each strategy is tagged with a [Difficulty], and the
//! hardest strategy that contributed to a solution determines the grade of
//! the puzzle. Every change a strategy makes is recorded as an [Action] in an
//! append-only log, together with a [Reason] naming the cells and candidate
//! notes that justify it.
//!
//! Strategies never mutate anything themselves. They inspect a read-only
//! [SudokuView] and propose actions, which the annotated board then applies
//! while enforcing its consistency contracts.

pub mod strategy;

use crate::Sudoku;
use crate::candidates::{Candidates, ValueIter};
use crate::selection::{CELL_COUNT, HOUSE_SIZE, Selection};

use log::debug;

use serde::{Deserialize, Serialize};

use std::fmt::{self, Display, Formatter};

use self::strategy::Strategy;

/// The difficulty scale for puzzles and strategies, totally ordered from
/// [Difficulty::Ungraded] (no information) to [Difficulty::Any] (accept
/// everything). The two extremes are markers rather than real grades:
/// `Ungraded` is the grade of a board the solver could not finish (or that
/// required no work at all), while `Any` is only meaningful as a generation
/// target that disables the difficulty ceiling.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq,
    PartialOrd, Serialize)]
pub enum Difficulty {

    /// No grade has been established.
    Ungraded,

    /// Solvable with the most basic techniques.
    Easy,

    /// Requires looking at individual cells rather than placed values.
    Medium,

    /// Requires reasoning about interactions between empty cells.
    Hard,

    /// Reserved for advanced techniques.
    Expert,

    /// Reserved for advanced techniques.
    Master,

    /// Reserved for advanced techniques.
    Extreme,

    /// Accepts every difficulty. Only sensible as a generation target.
    Any
}

impl Display for Difficulty {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name =
            match self {
                Difficulty::Ungraded => "ungraded",
                Difficulty::Easy => "easy",
                Difficulty::Medium => "medium",
                Difficulty::Hard => "hard",
                Difficulty::Expert => "expert",
                Difficulty::Master => "master",
                Difficulty::Extreme => "extreme",
                Difficulty::Any => "any"
            };

        f.write_str(name)
    }
}

/// Identifies the strategy that proposed an [Action]: its display name and
/// its difficulty. Stored by value in every action so the log stays readable
/// without a reference back to the strategy set.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Source {
    name: &'static str,
    difficulty: Difficulty
}

impl Source {

    /// Creates a new source from the given strategy name and difficulty.
    pub fn new(name: &'static str, difficulty: Difficulty) -> Source {
        Source {
            name,
            difficulty
        }
    }

    /// Gets the display name of the strategy that proposed the action.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Gets the difficulty of the strategy that proposed the action.
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }
}

/// The justification attached to every [Action]: the set of cells the
/// proposing strategy looked at, and optionally candidate notes within those
/// cells. A reason must name at least one cell or note, so an action can
/// always be explained to a user.
#[derive(Clone, Eq, PartialEq)]
pub struct Reason {
    cells: Selection,
    notes: Candidates
}

impl Reason {

    /// Creates a new, empty reason. At least one cell or note must be added
    /// before the reason can be used in an action.
    pub fn new() -> Reason {
        Reason {
            cells: Selection::new(),
            notes: Candidates::none()
        }
    }

    /// Creates a reason naming the given cells, without notes.
    pub fn from_cells(cells: Selection) -> Reason {
        Reason {
            cells,
            notes: Candidates::none()
        }
    }

    /// Adds the cell at the given index to this reason.
    pub fn add_cell(&mut self, index: usize) {
        self.cells.insert(index);
    }

    /// Adds a candidate note for `value` in the cell at the given index to
    /// this reason. The cell is also added to the named cells.
    pub fn add_note(&mut self, index: usize, value: u8) {
        self.cells.insert(index);
        self.notes.add_candidate(index, value);
    }

    /// Gets the cells this reason names.
    pub fn cells(&self) -> &Selection {
        &self.cells
    }

    /// Gets the candidate notes this reason names.
    pub fn notes(&self) -> &Candidates {
        &self.notes
    }

    /// Indicates whether this reason names neither cells nor notes.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl Default for Reason {
    fn default() -> Reason {
        Reason::new()
    }
}

impl fmt::Debug for Reason {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Reason({:?})", self.cells)
    }
}

/// The two kinds of change a strategy can propose.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ActionKind {

    /// Writes a value into an empty cell.
    Solve,

    /// Removes a candidate value from an empty cell.
    EliminateCandidate
}

/// A single deduction proposed by a strategy: solve a cell or eliminate a
/// candidate, at a given index with a given value, attributed to a [Source]
/// and justified by a non-empty [Reason].
#[derive(Clone, Debug)]
pub struct Action {
    kind: ActionKind,
    index: usize,
    value: u8,
    source: Source,
    reason: Reason
}

impl Action {

    /// Creates an action that writes `value` into the cell at the given
    /// index.
    ///
    /// # Panics
    ///
    /// If `index` is not in the range `[0, 81)`, `value` is not in the range
    /// `[1, 9]`, or `reason` is empty.
    pub fn solve(index: usize, value: u8, source: Source, reason: Reason)
            -> Action {
        Action::new(ActionKind::Solve, index, value, source, reason)
    }

    /// Creates an action that removes the candidate `value` from the cell at
    /// the given index.
    ///
    /// # Panics
    ///
    /// If `index` is not in the range `[0, 81)`, `value` is not in the range
    /// `[1, 9]`, or `reason` is empty.
    pub fn eliminate(index: usize, value: u8, source: Source, reason: Reason)
            -> Action {
        Action::new(ActionKind::EliminateCandidate, index, value, source,
            reason)
    }

    fn new(kind: ActionKind, index: usize, value: u8, source: Source,
            reason: Reason) -> Action {
        assert!(index < CELL_COUNT, "index {} out of range", index);
        assert!(value >= 1 && value <= 9, "value {} out of range", value);
        assert!(!reason.is_empty(), "an action requires a non-empty reason");

        Action {
            kind,
            index,
            value,
            source,
            reason
        }
    }

    /// Gets the kind of change this action proposes.
    pub fn kind(&self) -> ActionKind {
        self.kind
    }

    /// Gets the index of the cell this action targets.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Gets the value this action writes or eliminates.
    pub fn value(&self) -> u8 {
        self.value
    }

    /// Gets the source that proposed this action.
    pub fn source(&self) -> Source {
        self.source
    }

    /// Gets the reason justifying this action.
    pub fn reason(&self) -> &Reason {
        &self.reason
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let verb =
            match self.kind {
                ActionKind::Solve => "solve",
                ActionKind::EliminateCandidate => "eliminate"
            };

        write!(f, "{} {} at cell {} [{}, because of {:?}]", verb, self.value,
            self.index, self.source.name, self.reason.cells)
    }
}

/// A working copy of a [Sudoku] that the [StrategySolver] operates on: the
/// board itself, a [Candidates] store kept coherent with it, and the ordered
/// log of every [Action] applied so far. A snapshot of the original board is
/// retained purely for diagnostics.
///
/// Strategies interact with this type only through the read-only facade
/// obtained from [AnnotatedSudoku::view]; mutation goes through
/// [AnnotatedSudoku::apply], which enforces the consistency contracts below.
#[derive(Clone)]
pub struct AnnotatedSudoku {
    sudoku: Sudoku,
    candidates: Candidates,
    log: Vec<Action>,
    original: Sudoku
}

impl AnnotatedSudoku {

    /// Creates a working copy of the given board. Every cell starts with all
    /// nine candidates; the view hides the candidates of filled cells.
    /// Trimming the candidates of empty cells is strategy work, so every
    /// elimination down to the solution appears in the log.
    pub fn new(sudoku: &Sudoku) -> AnnotatedSudoku {
        AnnotatedSudoku {
            sudoku: sudoku.clone(),
            candidates: Candidates::new(),
            log: Vec::new(),
            original: sudoku.clone()
        }
    }

    /// Gets a read-only view of this working copy for strategies to inspect.
    pub fn view(&self) -> SudokuView<'_> {
        SudokuView {
            annotated: self
        }
    }

    /// Gets the board in its current state.
    pub fn sudoku(&self) -> &Sudoku {
        &self.sudoku
    }

    /// Gets the log of all actions applied so far, in application order.
    pub fn log(&self) -> &[Action] {
        &self.log
    }

    /// Applies all given actions in order and returns the number of actions
    /// that actually changed the working copy. Actions that change nothing
    /// (re-solving a cell with its current value, eliminating an absent
    /// candidate) are dropped and not logged.
    ///
    /// # Panics
    ///
    /// If an action violates a consistency contract: solving a cell that
    /// already holds a *different* value, eliminating a candidate from a
    /// filled cell, or eliminating the last candidate of an empty cell. All
    /// of these mean a strategy is unsound, so the panic message contains
    /// the original board and the complete action log for diagnosis.
    pub fn apply(&mut self, actions: Vec<Action>) -> usize {
        let mut changes = 0;

        for action in actions {
            let changed =
                match action.kind {
                    ActionKind::Solve => self.set_value(&action),
                    ActionKind::EliminateCandidate =>
                        self.remove_candidate(&action)
                };

            if changed {
                self.log.push(action);
                changes += 1;
            }
        }

        changes
    }

    fn set_value(&mut self, action: &Action) -> bool {
        let current = self.sudoku.get(action.index);

        if current == action.value {
            return false;
        }

        if current != 0 {
            self.contract_violation(format!(
                "cell {} already holds {}, cannot solve it with {}",
                action.index, current, action.value), action);
        }

        self.sudoku.set(action.index, action.value);

        true
    }

    fn remove_candidate(&mut self, action: &Action) -> bool {
        if self.sudoku.get(action.index) != 0 {
            self.contract_violation(format!(
                "cell {} is filled, cannot eliminate candidate {}",
                action.index, action.value), action);
        }

        if !self.candidates.can_be(action.index, action.value) {
            return false;
        }

        if self.candidates.count_at(action.index) == 1 {
            self.contract_violation(format!(
                "{} is the last candidate of cell {}", action.value,
                action.index), action);
        }

        self.candidates.remove_candidate(action.index, action.value)
    }

    fn contract_violation(&self, message: String, action: &Action) -> ! {
        let mut dump = String::new();

        for (i, logged) in self.log.iter().enumerate() {
            dump.push_str(format!("\n  {:3}: {}", i, logged).as_str());
        }

        panic!(
            "contract violation: {}\noffending action: {}\noriginal board: \
            {}\napplied actions:{}",
            message, action, self.original.to_line_string(), dump);
    }
}

/// A read-only facade over an [AnnotatedSudoku], the only interface
/// strategies get to inspect the board and its candidates.
#[derive(Clone, Copy)]
pub struct SudokuView<'a> {
    annotated: &'a AnnotatedSudoku
}

impl<'a> SudokuView<'a> {

    /// Gets the value of the cell at the given index, where 0 indicates an
    /// empty cell.
    pub fn value(&self, index: usize) -> u8 {
        self.annotated.sudoku.get(index)
    }

    /// Returns an iterator over the candidate values of the cell at the
    /// given index, in ascending order. Filled cells have no candidates.
    pub fn candidates(&self, index: usize) -> ValueIter {
        ValueIter::from_mask(self.candidate_mask(index))
    }

    /// Gets the raw candidate bitmask of the cell at the given index, where
    /// bit `i` (starting at 0) represents value `i + 1`. Filled cells have
    /// the empty mask.
    pub fn candidate_mask(&self, index: usize) -> u16 {
        if self.annotated.sudoku.get(index) != 0 {
            0
        }
        else {
            self.annotated.candidates.mask(index)
        }
    }

    /// Gets the number of candidates of the cell at the given index. Filled
    /// cells have none.
    pub fn candidate_count(&self, index: usize) -> usize {
        self.candidate_mask(index).count_ones() as usize
    }

    /// Counts, for each value, in how many cells of the given selection it
    /// is currently placed. Entry `i` of the result holds the count of value
    /// `i + 1`.
    pub fn appearance_counts(&self, selection: &Selection)
            -> [usize; HOUSE_SIZE] {
        let mut counts = [0; HOUSE_SIZE];

        for index in selection {
            let value = self.annotated.sudoku.get(index);

            if value != 0 {
                counts[value as usize - 1] += 1;
            }
        }

        counts
    }

    /// Gets the selection of cells within `selection` whose value equals
    /// `value`, with 0 selecting the empty cells.
    pub fn indices_of(&self, value: u8, selection: &Selection) -> Selection {
        self.annotated.sudoku.indices_of(value, selection)
    }
}

/// The deductive solving engine. It holds a set of [Strategy] implementations
/// sorted ascending by difficulty and applies them to a board in a
/// fixed-point loop: after any strategy changes the board, the loop restarts
/// from the easiest strategy, so harder techniques only run once the easy
/// ones are exhausted. The sort is stable, so strategies of equal difficulty
/// keep their insertion order.
///
/// Because every deduction is forced, a board the engine can finish has
/// exactly one solution. This makes [StrategySolver::has_unique_solution] a
/// sound, though deliberately incomplete, uniqueness check: it rejects some
/// uniquely solvable boards that are too hard for its strategy set, but never
/// accepts an ambiguous one.
pub struct StrategySolver {
    strategies: Vec<Box<dyn Strategy>>
}

impl StrategySolver {

    /// Creates a new solver from the given strategies, sorted ascending by
    /// difficulty with a stable sort.
    pub fn new(mut strategies: Vec<Box<dyn Strategy>>) -> StrategySolver {
        strategies.sort_by_key(|strategy| strategy.difficulty());

        StrategySolver {
            strategies
        }
    }

    /// Creates a solver equipped with the four reference strategies:
    /// [LinearElimination](strategy::LinearElimination) and
    /// [LastInHouse](strategy::LastInHouse) at easy,
    /// [LastInCell](strategy::LastInCell) at medium, and
    /// [NakedPairs](strategy::NakedPairs) at hard.
    pub fn with_reference_strategies() -> StrategySolver {
        StrategySolver::new(vec![
            Box::new(strategy::LinearElimination),
            Box::new(strategy::LastInHouse),
            Box::new(strategy::LastInCell),
            Box::new(strategy::NakedPairs)
        ])
    }

    /// Runs the fixed-point loop on a working copy of the given board and
    /// returns it, whether solved or stuck.
    pub fn run(&self, sudoku: &Sudoku) -> AnnotatedSudoku {
        let mut annotated = AnnotatedSudoku::new(sudoku);

        'fixed_point: loop {
            for strategy in &self.strategies {
                let actions = strategy.apply(&annotated.view());
                let changes = annotated.apply(actions);

                if changes > 0 {
                    debug!("{} applied {} changes", strategy.name(), changes);
                    continue 'fixed_point;
                }
            }

            break;
        }

        annotated
    }

    /// Grades the given board: the difficulty of the hardest strategy that
    /// contributed to solving it, or [Difficulty::Ungraded] if the engine
    /// cannot solve it. A board that is already solved also grades
    /// `Ungraded`, since no strategy is needed.
    pub fn grade(&self, sudoku: &Sudoku) -> Difficulty {
        let annotated = self.run(sudoku);

        if !annotated.sudoku.is_solved() {
            return Difficulty::Ungraded;
        }

        annotated.log.iter()
            .map(|action| action.source.difficulty)
            .max()
            .unwrap_or(Difficulty::Ungraded)
    }

    /// Indicates whether the given board has exactly one solution *as far as
    /// this engine can tell*: `true` means the strategies force a unique
    /// solution, `false` means the board is either ambiguous or too hard for
    /// them.
    pub fn has_unique_solution(&self, sudoku: &Sudoku) -> bool {
        self.run(sudoku).sudoku.is_solved()
    }

    /// Solves the given board deductively. Returns `None` if the strategies
    /// get stuck before the board is complete.
    pub fn get_solution(&self, sudoku: &Sudoku) -> Option<Sudoku> {
        let annotated = self.run(sudoku);

        if annotated.sudoku.is_solved() {
            Some(annotated.sudoku)
        }
        else {
            None
        }
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    fn example_source() -> Source {
        Source::new("test", Difficulty::Easy)
    }

    fn example_reason() -> Reason {
        Reason::from_cells(Selection::singleton(0))
    }

    #[test]
    fn difficulty_is_totally_ordered() {
        let ascending = [
            Difficulty::Ungraded,
            Difficulty::Easy,
            Difficulty::Medium,
            Difficulty::Hard,
            Difficulty::Expert,
            Difficulty::Master,
            Difficulty::Extreme,
            Difficulty::Any
        ];

        for window in ascending.windows(2) {
            assert!(window[0] < window[1]);
        }
    }

    #[test]
    #[should_panic]
    fn action_rejects_empty_reason() {
        Action::solve(0, 1, example_source(), Reason::new());
    }

    #[test]
    #[should_panic]
    fn action_rejects_out_of_range_value() {
        Action::solve(0, 10, example_source(), example_reason());
    }

    #[test]
    fn solve_action_updates_board_candidates_and_log() {
        let mut annotated = AnnotatedSudoku::new(&Sudoku::new());
        let action = Action::solve(40, 5, example_source(),
            example_reason());

        assert_eq!(1, annotated.apply(vec![action]));
        assert_eq!(5, annotated.sudoku().get(40));
        assert_eq!(0, annotated.view().candidate_count(40));
        assert_eq!(1, annotated.log().len());

        // The peers keep candidate 5 until a strategy eliminates it.

        for peer in &Selection::affected_by(40) {
            assert!(annotated.view().candidates(peer).any(|v| v == 5));
        }
    }

    #[test]
    fn redundant_actions_change_nothing_and_are_not_logged() {
        let mut sudoku = Sudoku::new();
        sudoku.set(40, 5);

        let mut annotated = AnnotatedSudoku::new(&sudoku);
        let resolve = Action::solve(40, 5, example_source(),
            example_reason());

        assert_eq!(0, annotated.apply(vec![resolve]));
        assert!(annotated.log().is_empty());

        let eliminate = Action::eliminate(41, 5, example_source(),
            example_reason());

        assert_eq!(1, annotated.apply(vec![eliminate.clone()]));
        assert_eq!(0, annotated.apply(vec![eliminate]));
        assert_eq!(1, annotated.log().len());
    }

    #[test]
    fn linear_eliminations_appear_in_the_action_log() {
        let mut sudoku = Sudoku::new();
        sudoku.set(40, 5);

        let solver = StrategySolver::with_reference_strategies();
        let annotated = solver.run(&sudoku);
        let eliminations: Vec<&Action> = annotated.log().iter()
            .filter(|action| action.source().name() == "linear elimination")
            .collect();

        assert_eq!(20, eliminations.len());

        for action in eliminations {
            assert_eq!(ActionKind::EliminateCandidate, action.kind());
            assert_eq!(5, action.value());
            assert!(Selection::affected_by(40).contains(action.index()));
        }
    }

    #[test]
    #[should_panic(expected = "contract violation")]
    fn solving_a_cell_with_a_different_value_panics() {
        let mut sudoku = Sudoku::new();
        sudoku.set(40, 5);

        let mut annotated = AnnotatedSudoku::new(&sudoku);
        let action = Action::solve(40, 6, example_source(),
            example_reason());

        annotated.apply(vec![action]);
    }

    #[test]
    #[should_panic(expected = "contract violation")]
    fn eliminating_from_a_filled_cell_panics() {
        let mut sudoku = Sudoku::new();
        sudoku.set(40, 5);

        let mut annotated = AnnotatedSudoku::new(&sudoku);
        let action = Action::eliminate(40, 3, example_source(),
            example_reason());

        annotated.apply(vec![action]);
    }

    #[test]
    #[should_panic(expected = "last candidate")]
    fn eliminating_the_last_candidate_panics() {
        let mut annotated = AnnotatedSudoku::new(&Sudoku::new());
        let source = example_source();

        let eliminations: Vec<Action> = (1..=9)
            .map(|value|
                Action::eliminate(0, value, source, example_reason()))
            .collect();

        annotated.apply(eliminations);
    }

    #[test]
    fn view_reports_appearance_counts() {
        let mut sudoku = Sudoku::new();
        sudoku.set(0, 3);
        sudoku.set(1, 3);
        sudoku.set(2, 7);

        let annotated = AnnotatedSudoku::new(&sudoku);
        let counts = annotated.view().appearance_counts(&Selection::row(0));

        assert_eq!(2, counts[2]);
        assert_eq!(1, counts[6]);
        assert_eq!(0, counts[0]);
    }

    #[test]
    fn filled_cells_expose_no_candidates_through_the_view() {
        let mut sudoku = Sudoku::new();
        sudoku.set(0, 1);

        let annotated = AnnotatedSudoku::new(&sudoku);
        let view = annotated.view();

        assert_eq!(0, view.candidate_mask(0));
        assert_eq!(0, view.candidate_count(0));
        assert_eq!(None, view.candidates(0).next());
    }

    #[test]
    fn solver_grades_an_already_solved_board_as_ungraded() {
        let solved = Sudoku::parse(
            "123456789456789123789123456231564897564897231897231564312645978645978312978312645"
        ).unwrap();
        let solver = StrategySolver::with_reference_strategies();

        assert_eq!(Difficulty::Ungraded, solver.grade(&solved));
        assert!(solver.has_unique_solution(&solved));
        assert_eq!(Some(solved.clone()), solver.get_solution(&solved));
    }

    #[test]
    fn solver_fills_a_single_missing_cell() {
        let sudoku = Sudoku::parse(
            "023456789456789123789123456231564897564897231897231564312645978645978312978312645"
        ).unwrap();
        let solver = StrategySolver::with_reference_strategies();
        let solution = solver.get_solution(&sudoku).unwrap();

        assert_eq!(1, solution.get(0));
        assert_eq!(Difficulty::Easy, solver.grade(&sudoku));
    }

    #[test]
    fn solver_reports_an_empty_board_as_not_unique() {
        let solver = StrategySolver::with_reference_strategies();

        assert!(!solver.has_unique_solution(&Sudoku::new()));
        assert_eq!(Difficulty::Ungraded, solver.grade(&Sudoku::new()));
        assert_eq!(None, solver.get_solution(&Sudoku::new()));
    }

    #[test]
    fn strategies_are_sorted_stably_by_difficulty() {
        let solver = StrategySolver::new(vec![
            Box::new(strategy::NakedPairs),
            Box::new(strategy::LastInHouse),
            Box::new(strategy::LinearElimination),
            Box::new(strategy::LastInCell)
        ]);
        let names: Vec<&'static str> = solver.strategies.iter()
            .map(|strategy| strategy.name())
            .collect();

        assert_eq!(
            vec![
                "last in house",
                "linear elimination",
                "last in cell",
                "naked pairs"
            ],
            names);
    }
}
