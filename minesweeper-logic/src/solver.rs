use crate::{Board, CellState, ReasoningError};

/// Observer protocol for a running solve. `on_step` runs after every
/// deduction-or-speculation round; returning false aborts the solve.
pub trait SolverCallback {
  fn before_start(&mut self, board: &Board);
  fn on_step(&mut self, board: &Board, step: usize, nest_level: u32) -> bool;
}

/// Callback that observes nothing and never aborts.
pub struct SilentCallback;

impl SolverCallback for SilentCallback {
  fn before_start(&mut self, _board: &Board) {}

  fn on_step(&mut self, _board: &Board, _step: usize, _nest_level: u32) -> bool {
    true
  }
}

/// Clears a board by deduction alone, falling back to speculative guesses
/// that are rolled back on contradiction. Guesses operate on a private
/// clone of the board; the live board only changes once a guess chain is
/// confirmed.
pub struct Solver {
  nest_level: u32,
  first_move_done: bool,
}

impl Solver {
  /// Runs the solver to completion. `Ok(true)` means the board is cleared,
  /// `Ok(false)` that it failed or the callback aborted. An error at this
  /// level means the board cannot be solved without guessing.
  pub fn solve(board: &mut Board, callback: &mut dyn SolverCallback) -> Result<bool, ReasoningError> {
    Self::solve_nested(board, callback, 0)
  }

  /// Whether a copy of the board can be cleared by logic alone.
  pub fn is_solvable(board: &Board) -> bool {
    let mut board = board.clone();
    matches!(Self::solve(&mut board, &mut SilentCallback), Ok(true))
  }

  fn solve_nested(
    board: &mut Board,
    callback: &mut dyn SolverCallback,
    nest_level: u32,
  ) -> Result<bool, ReasoningError> {
    let mut solver = Solver {
      nest_level,
      first_move_done: nest_level > 0,
    };
    callback.before_start(board);
    let mut step = 0;
    loop {
      if board.cleared() {
        return Ok(true);
      }
      if board.failed() {
        return Ok(false);
      }
      solver.step(board, callback)?;
      if !callback.on_step(board, step, solver.nest_level) {
        return Ok(false);
      }
      step += 1;
    }
  }

  fn step(&mut self, board: &mut Board, callback: &mut dyn SolverCallback) -> Result<(), ReasoningError> {
    if !self.first_move_done {
      self.first_move_done = true;
      if self.open_first(board) {
        return Ok(());
      }
    }
    if self.deduce(board)? {
      return Ok(());
    }
    if self.speculate(board, callback) {
      return Ok(());
    }
    Err(ReasoningError("NO LOGIC".into()))
  }

  /// Bootstrap for boards that start fully closed: open the first closed
  /// cell so deduction has a hint to work from.
  fn open_first(&self, board: &mut Board) -> bool {
    if board.cells().any(|cell| cell.opened()) {
      return false;
    }
    match (0..board.total_cells()).find(|&i| board[i].closed()) {
      Some(index) => {
        board.open(index);
        true
      }
      None => false,
    }
  }

  /// One deduction: find an opened cell whose bomb/flag/closed arithmetic
  /// settles all of its closed neighbors, and apply it. Inside an active
  /// guess the changes only mark cell state speculatively; a real `open`
  /// happens solely outside speculation.
  fn deduce(&self, board: &mut Board) -> Result<bool, ReasoningError> {
    let speculating = self.nest_level > 0;
    for i in 0..board.total_cells() {
      let cell = board[i];
      if !cell.opened() || cell.speculative {
        continue;
      }

      let closed: Vec<usize> = board.neighbors(i).filter(|&n| board[n].closed()).collect();
      let flagged = board.neighbors(i).filter(|&n| board[n].flagged()).count() as u32;
      let bombs = cell.neighbor_bombs;

      if bombs < flagged {
        // only reachable beneath a wrong guess
        return Err(ReasoningError(format!(
          "cell {} has {} flagged neighbors but only {} bomb neighbors",
          i, flagged, bombs
        )));
      }

      if bombs == flagged && !closed.is_empty() {
        for n in closed {
          if speculating {
            board[n].state = CellState::Opened;
            board[n].speculative = true;
          } else {
            board.open(n);
          }
        }
        return Ok(true);
      }

      if bombs > flagged && closed.len() as u32 == bombs - flagged {
        for n in closed {
          board[n].state = CellState::Flagged;
          board[n].speculative = speculating;
        }
        return Ok(true);
      }
    }
    Ok(false)
  }

  /// Tentatively flag one closed frontier cell at a time on a clone of the
  /// board and recurse. The first guess whose branch resolves consistently
  /// is adopted into the live board; contradicted branches are discarded.
  fn speculate(&self, board: &mut Board, callback: &mut dyn SolverCallback) -> bool {
    for i in 0..board.total_cells() {
      if !board[i].closed() {
        continue;
      }
      let on_frontier = board.neighbors(i).any(|n| board[n].opened() && !board[n].speculative);
      if !on_frontier {
        continue;
      }

      let mut guess = board.clone();
      guess[i].state = CellState::Flagged;
      guess[i].speculative = true;
      match Self::solve_nested(&mut guess, callback, self.nest_level + 1) {
        Ok(true) => {
          erase_speculation(board, &mut guess);
          *board = guess;
          return true;
        }
        Ok(false) | Err(_) => (),
      }
    }
    false
  }
}

/// After a confirmed guess, drop the speculative markers that the adopted
/// clone introduced. Marks already present before the guess stay, they
/// belong to an enclosing speculation.
fn erase_speculation(base: &Board, adopted: &mut Board) {
  debug_assert_eq!(base.width(), adopted.width());
  debug_assert_eq!(base.height(), adopted.height());
  for i in 0..adopted.total_cells() {
    if !base[i].speculative && adopted[i].speculative {
      adopted[i].speculative = false;
    }
  }
}
