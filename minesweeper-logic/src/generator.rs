use crate::solver::Solver;
use crate::Board;

/// Builds candidate boards until one is clearable by logic alone.
///
/// The build closure owns size, bomb count and exclusions; the generator
/// only keeps asking for candidates and checking them with the solver.
pub struct BoardGenerator<'a> {
  on_attempt: Box<dyn FnMut(u32) + 'a>,
}

impl<'a> BoardGenerator<'a> {
  pub fn new() -> Self {
    Self {
      on_attempt: Box::new(|_| ()),
    }
  }

  /// The progress closure receives the attempt number after every
  /// candidate the solver rejected.
  pub fn with_progress(on_attempt: impl FnMut(u32) + 'a) -> Self {
    Self {
      on_attempt: Box::new(on_attempt),
    }
  }

  /// `None` once `max_attempts` candidates were rejected; `max_attempts`
  /// of zero never even invokes the build closure. Without a limit this
  /// loops until a solvable board shows up.
  pub fn generate(&mut self, mut build: impl FnMut() -> Board, max_attempts: Option<u32>) -> Option<Board> {
    let mut attempts = 0;
    loop {
      if let Some(max) = max_attempts {
        if attempts >= max {
          return None;
        }
      }
      attempts += 1;
      let board = build();
      if Solver::is_solvable(&board) {
        return Some(board);
      }
      (self.on_attempt)(attempts);
    }
  }
}

impl Default for BoardGenerator<'_> {
  fn default() -> Self {
    Self::new()
  }
}
