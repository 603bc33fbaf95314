use thiserror::Error;

pub mod board;
pub mod generator;
pub mod solver;

pub use board::{Board, LazyBoard};
pub use generator::BoardGenerator;
pub use solver::{SilentCallback, Solver, SolverCallback};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum CellState {
  Closed,
  Opened,
  Flagged,
}

/// A single board slot. `has_bomb` and `neighbor_bombs` are fixed at
/// generation time; `state` only changes through `Board` operations.
/// `speculative` is set while the cell's state stems from an unconfirmed
/// solver guess and is always false outside solver recursion.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Cell {
  pub has_bomb: bool,
  pub state: CellState,
  pub neighbor_bombs: u32,
  pub speculative: bool,
}

impl Cell {
  pub fn new(has_bomb: bool) -> Cell {
    Cell {
      has_bomb,
      state: CellState::Closed,
      neighbor_bombs: 0,
      speculative: false,
    }
  }

  pub fn opened(&self) -> bool {
    self.state == CellState::Opened
  }

  pub fn closed(&self) -> bool {
    self.state == CellState::Closed
  }

  pub fn flagged(&self) -> bool {
    self.state == CellState::Flagged
  }
}

impl Default for Cell {
  fn default() -> Cell {
    Cell::new(false)
  }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Direction {
  LeftUp,
  Up,
  RightUp,
  Left,
  Right,
  LeftDown,
  Down,
  RightDown,
}

pub static ALL_DIRECTIONS: [Direction; 8] = [
  Direction::LeftUp,
  Direction::Up,
  Direction::RightUp,
  Direction::Left,
  Direction::Right,
  Direction::LeftDown,
  Direction::Down,
  Direction::RightDown,
];

impl Direction {
  /// Offset in (column, row) steps.
  pub fn delta(self) -> (i32, i32) {
    match self {
      Direction::LeftUp => (-1, -1),
      Direction::Up => (0, -1),
      Direction::RightUp => (1, -1),
      Direction::Left => (-1, 0),
      Direction::Right => (1, 0),
      Direction::LeftDown => (-1, 1),
      Direction::Down => (0, 1),
      Direction::RightDown => (1, 1),
    }
  }
}

/// Rejected size/bomb combination at board construction.
#[derive(Clone, PartialEq, Eq, Error, Debug)]
#[error("invalid board configuration: {0}")]
pub struct InvalidConfiguration(pub String);

/// The solver's sole control-flow signal: either a speculative branch ran
/// into a contradiction or no deduction and no guess can make progress.
#[derive(Clone, PartialEq, Eq, Error, Debug)]
#[error("{0}")]
pub struct ReasoningError(pub String);
