use core::fmt;
use std::collections::VecDeque;
use std::ops::{Index, IndexMut};

use rand::prelude::SliceRandom;
use rand::RngCore;

use crate::generator::BoardGenerator;
use crate::{Cell, CellState, Direction, InvalidConfiguration, ALL_DIRECTIONS};

/// Rectangular minesweeper grid in row-major order
/// (`index = column + row * width`).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Board {
  width: u32,
  height: u32,
  bombs: u32,
  cells: Vec<Cell>,
  failed: bool,
}

fn validate(width: u32, height: u32, bombs: u32, reserved: usize) -> Result<(), InvalidConfiguration> {
  if width == 0 || height == 0 {
    return Err(InvalidConfiguration(format!("board size {}x{} is empty", width, height)));
  }
  let total = width as usize * height as usize;
  if bombs as usize + reserved >= total {
    return Err(InvalidConfiguration(format!(
      "{} bombs do not fit on a {}x{} board with {} reserved cells",
      bombs, width, height, reserved
    )));
  }
  Ok(())
}

impl Board {
  pub fn new(width: u32, height: u32, bombs: u32) -> Result<Board, InvalidConfiguration> {
    Self::with_excludes(width, height, bombs, &[])
  }

  /// Random placement that keeps every index in `excludes` bomb-free.
  pub fn with_excludes(
    width: u32,
    height: u32,
    bombs: u32,
    excludes: &[usize],
  ) -> Result<Board, InvalidConfiguration> {
    Self::with_excludes_and_rng(width, height, bombs, excludes, &mut rand::thread_rng())
  }

  pub fn with_excludes_and_rng(
    width: u32,
    height: u32,
    bombs: u32,
    excludes: &[usize],
    rng: &mut dyn RngCore,
  ) -> Result<Board, InvalidConfiguration> {
    validate(width, height, bombs, excludes.len())?;
    Ok(Self::random(width, height, bombs, excludes, rng))
  }

  /// Deterministic construction from an explicit bomb set.
  pub fn from_layout(width: u32, height: u32, bomb_indices: &[usize]) -> Result<Board, InvalidConfiguration> {
    validate(width, height, bomb_indices.len() as u32, 0)?;
    let mut board = Board::empty(width, height, bomb_indices.len() as u32);
    for &index in bomb_indices {
      match board.cells.get_mut(index) {
        Some(cell) if !cell.has_bomb => cell.has_bomb = true,
        Some(_) => {
          return Err(InvalidConfiguration(format!("duplicate bomb index {}", index)));
        }
        None => {
          return Err(InvalidConfiguration(format!(
            "bomb index {} outside {}x{} board",
            index, width, height
          )));
        }
      }
    }
    board.count_neighbor_bombs();
    Ok(board)
  }

  /// All-closed board without any bombs placed yet. Callers validate first.
  pub(crate) fn empty(width: u32, height: u32, bombs: u32) -> Board {
    Board {
      width,
      height,
      bombs,
      cells: vec![Cell::default(); width as usize * height as usize],
      failed: false,
    }
  }

  pub(crate) fn random(
    width: u32,
    height: u32,
    bombs: u32,
    excludes: &[usize],
    rng: &mut dyn RngCore,
  ) -> Board {
    debug_assert!(validate(width, height, bombs, excludes.len()).is_ok());
    let mut board = Board::empty(width, height, bombs);
    board.place_bombs(excludes, rng);
    board.count_neighbor_bombs();
    board
  }

  fn place_bombs(&mut self, excludes: &[usize], rng: &mut dyn RngCore) {
    let mut candidates: Vec<usize> = (0..self.cells.len()).filter(|i| !excludes.contains(i)).collect();
    candidates.shuffle(rng);
    for &index in candidates.iter().take(self.bombs as usize) {
      self.cells[index].has_bomb = true;
    }
  }

  fn count_neighbor_bombs(&mut self) {
    for i in 0..self.cells.len() {
      let bombs = self.neighbors(i).filter(|&n| self.cells[n].has_bomb).count() as u32;
      self.cells[i].neighbor_bombs = bombs;
    }
  }

  pub fn width(&self) -> u32 {
    self.width
  }

  pub fn height(&self) -> u32 {
    self.height
  }

  pub fn bomb_count(&self) -> u32 {
    self.bombs
  }

  pub fn total_cells(&self) -> usize {
    self.cells.len()
  }

  pub fn cells(&self) -> impl Iterator<Item = &Cell> {
    self.cells.iter()
  }

  pub fn index_of(&self, column: u32, row: u32) -> usize {
    (column + row * self.width) as usize
  }

  pub fn point_of(&self, index: usize) -> (u32, u32) {
    (index as u32 % self.width, index as u32 / self.width)
  }

  /// Index of the adjacent cell, or `None` at the grid border.
  pub fn neighbor_index(&self, index: usize, direction: Direction) -> Option<usize> {
    let (column, row) = self.point_of(index);
    let (dx, dy) = direction.delta();
    let column = column as i64 + dx as i64;
    let row = row as i64 + dy as i64;
    if column < 0 || row < 0 || column >= self.width as i64 || row >= self.height as i64 {
      return None;
    }
    Some(self.index_of(column as u32, row as u32))
  }

  pub fn neighbors(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
    ALL_DIRECTIONS.iter().filter_map(move |&dir| self.neighbor_index(index, dir))
  }

  /// Opens a cell. A bomb only trips the board-level `failed` flag; the
  /// cell itself stays closed. A zero-count cell floods its neighborhood,
  /// stopping one layer into the numbered border. Flagged and already
  /// opened cells are untouched.
  pub fn open(&mut self, index: usize) {
    let cell = self[index];
    if cell.opened() || cell.flagged() {
      return;
    }
    if cell.has_bomb {
      self.failed = true;
      return;
    }

    let mut queue = VecDeque::new();
    queue.push_back(index);
    while let Some(index) = queue.pop_front() {
      let cell = self[index];
      if cell.opened() || cell.flagged() || cell.has_bomb {
        continue;
      }
      self.cells[index].state = CellState::Opened;
      if cell.neighbor_bombs == 0 {
        queue.extend(self.neighbors(index));
      }
    }
  }

  pub fn toggle_flag(&mut self, index: usize) {
    let cell = &mut self[index];
    cell.state = match cell.state {
      CellState::Opened => return,
      CellState::Closed => CellState::Flagged,
      CellState::Flagged => CellState::Closed,
    };
  }

  pub fn failed(&self) -> bool {
    self.failed
  }

  /// True once every safe cell is opened and no bomb ever was.
  pub fn cleared(&self) -> bool {
    !self.failed && self.cells.iter().all(|cell| cell.opened() != cell.has_bomb)
  }

  /// One character per cell, columns space-separated, rows on their own
  /// lines. With `disclose_bombs` the bomb layout and flag correctness
  /// become visible.
  pub fn render(&self, disclose_bombs: bool) -> String {
    let mut out = String::new();
    for (i, cell) in self.cells.iter().enumerate() {
      if i != 0 && i % self.width as usize == 0 {
        out.push('\n');
      }
      out.push(char_of_cell(cell, disclose_bombs));
      out.push(' ');
    }
    out
  }
}

fn char_of_cell(cell: &Cell, disclose_bombs: bool) -> char {
  if cell.flagged() {
    return if disclose_bombs && cell.has_bomb { 'f' } else { 'F' };
  }
  if disclose_bombs && cell.has_bomb {
    return '+';
  }
  if cell.opened() {
    return match cell.neighbor_bombs {
      0 => ' ',
      n => char::from_digit(n, 10).unwrap_or('?'),
    };
  }
  'O'
}

impl Index<usize> for Board {
  type Output = Cell;

  fn index(&self, index: usize) -> &Cell {
    let (width, height) = (self.width, self.height);
    self
      .cells
      .get(index)
      .unwrap_or_else(|| panic!("no cell {} on a {}x{} board", index, width, height))
  }
}

impl IndexMut<usize> for Board {
  fn index_mut(&mut self, index: usize) -> &mut Cell {
    let (width, height) = (self.width, self.height);
    self
      .cells
      .get_mut(index)
      .unwrap_or_else(|| panic!("no cell {} on a {}x{} board", index, width, height))
  }
}

impl fmt::Display for Board {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.render(true))
  }
}

impl fmt::Debug for Board {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    fmt::Display::fmt(self, f)
  }
}

/// A board that defers bomb placement to the first `open`, excluding the
/// opened index from the bomb pool. The first move can never detonate.
#[derive(Clone)]
pub struct LazyBoard {
  board: Board,
  placed: bool,
  solvable_only: bool,
}

impl LazyBoard {
  pub fn new(width: u32, height: u32, bombs: u32) -> Result<LazyBoard, InvalidConfiguration> {
    // one cell has to stay safe for the first open
    validate(width, height, bombs, 1)?;
    Ok(LazyBoard {
      board: Board::empty(width, height, bombs),
      placed: false,
      solvable_only: false,
    })
  }

  /// Like `new`, but the first open keeps regenerating layouts until the
  /// solver confirms the board is clearable by logic alone.
  pub fn new_solvable(width: u32, height: u32, bombs: u32) -> Result<LazyBoard, InvalidConfiguration> {
    let mut board = Self::new(width, height, bombs)?;
    board.solvable_only = true;
    Ok(board)
  }

  pub fn board(&self) -> &Board {
    &self.board
  }

  pub fn board_mut(&mut self) -> &mut Board {
    &mut self.board
  }

  pub fn placed(&self) -> bool {
    self.placed
  }

  pub fn open(&mut self, index: usize) {
    if !self.placed {
      self.placed = true;
      self.board = self.place(index);
    }
    self.board.open(index);
  }

  fn place(&self, exclude: usize) -> Board {
    let (width, height, bombs) = (self.board.width, self.board.height, self.board.bombs);
    if !self.solvable_only {
      return Board::random(width, height, bombs, &[exclude], &mut rand::thread_rng());
    }

    let mut generator = BoardGenerator::new();
    let board = generator.generate(
      || {
        let mut board = Board::random(width, height, bombs, &[exclude], &mut rand::thread_rng());
        board.open(exclude);
        board
      },
      None,
    );
    // unlimited attempts only ever stop on a solvable board
    board.expect("unlimited generation returned no board")
  }

  pub fn toggle_flag(&mut self, index: usize) {
    self.board.toggle_flag(index);
  }

  pub fn failed(&self) -> bool {
    self.board.failed()
  }

  pub fn cleared(&self) -> bool {
    self.board.cleared()
  }

  pub fn render(&self, disclose_bombs: bool) -> String {
    self.board.render(disclose_bombs)
  }
}

#[cfg(test)]
mod tests {
  use rand::rngs::StdRng;
  use rand::SeedableRng;

  use super::*;
  use crate::Direction::*;

  fn bombs_on(board: &Board) -> usize {
    board.cells().filter(|cell| cell.has_bomb).count()
  }

  #[test]
  fn rejects_impossible_configurations() {
    assert!(Board::new(0, 5, 0).is_err());
    assert!(Board::new(5, 0, 0).is_err());
    assert!(Board::new(3, 3, 9).is_err());
    assert!(Board::with_excludes(3, 3, 8, &[0]).is_err());
    assert!(Board::new(3, 3, 8).is_ok());
  }

  #[test]
  fn places_exactly_the_requested_bombs() {
    let mut rng = StdRng::seed_from_u64(7);
    for bombs in [0, 1, 11, 24] {
      let board = Board::with_excludes_and_rng(5, 5, bombs, &[], &mut rng).unwrap();
      assert_eq!(bombs_on(&board), bombs as usize);
      assert_eq!(board.bomb_count(), bombs);
    }
  }

  #[test]
  fn excluded_indices_stay_safe() {
    let mut rng = StdRng::seed_from_u64(3);
    let excludes = [0, 7, 24];
    for _ in 0..20 {
      let board = Board::with_excludes_and_rng(5, 5, 21, &excludes, &mut rng).unwrap();
      for &index in &excludes {
        assert!(!board[index].has_bomb);
      }
      assert_eq!(bombs_on(&board), 21);
    }
  }

  #[test]
  fn neighbor_counts_match_adjacency() {
    let mut rng = StdRng::seed_from_u64(11);
    let board = Board::with_excludes_and_rng(7, 4, 9, &[], &mut rng).unwrap();
    for i in 0..board.total_cells() {
      let expected = board.neighbors(i).filter(|&n| board[n].has_bomb).count() as u32;
      assert_eq!(board[i].neighbor_bombs, expected);
    }
  }

  #[test]
  fn neighbor_index_boundaries() {
    let board = Board::from_layout(3, 3, &[]).unwrap();
    // top-left corner
    assert_eq!(board.neighbor_index(0, LeftUp), None);
    assert_eq!(board.neighbor_index(0, Up), None);
    assert_eq!(board.neighbor_index(0, RightUp), None);
    assert_eq!(board.neighbor_index(0, Left), None);
    assert_eq!(board.neighbor_index(0, Right), Some(1));
    assert_eq!(board.neighbor_index(0, Down), Some(3));
    assert_eq!(board.neighbor_index(0, RightDown), Some(4));
    // right edge
    assert_eq!(board.neighbor_index(2, Right), None);
    assert_eq!(board.neighbor_index(2, RightUp), None);
    assert_eq!(board.neighbor_index(2, RightDown), None);
    assert_eq!(board.neighbor_index(2, Left), Some(1));
    assert_eq!(board.neighbor_index(2, LeftDown), Some(4));
    // bottom-right corner
    assert_eq!(board.neighbor_index(8, Down), None);
    assert_eq!(board.neighbor_index(8, LeftDown), None);
    assert_eq!(board.neighbor_index(8, RightDown), None);
    assert_eq!(board.neighbor_index(8, LeftUp), Some(4));
    // center sees all eight
    assert_eq!(board.neighbors(4).count(), 8);
  }

  #[test]
  fn point_mapping_is_row_major() {
    let board = Board::from_layout(4, 3, &[]).unwrap();
    assert_eq!(board.index_of(3, 2), 11);
    assert_eq!(board.point_of(11), (3, 2));
    for i in 0..board.total_cells() {
      let (column, row) = board.point_of(i);
      assert_eq!(board.index_of(column, row), i);
    }
  }

  #[test]
  fn opening_a_bomb_fails_the_board() {
    let mut board = Board::from_layout(2, 2, &[0]).unwrap();
    board.open(0);
    assert!(board.failed());
    assert!(!board[0].opened());
    assert!(!board.cleared());
    board.open(1);
    board.open(2);
    board.open(3);
    assert!(!board.cleared());
    assert!(board.failed());
  }

  #[test]
  fn flood_fill_opens_zero_region_and_numbered_border() {
    // bomb in the top-left corner of a 4x4 board
    let mut board = Board::from_layout(4, 4, &[0]).unwrap();
    board.open(15);
    for i in 1..16 {
      assert!(board[i].opened(), "cell {} should be open", i);
    }
    assert!(!board[0].opened());
    assert!(board.cleared());
    assert!(!board.failed());
  }

  #[test]
  fn flood_fill_respects_flags() {
    let mut board = Board::from_layout(3, 1, &[]).unwrap();
    board.toggle_flag(1);
    board.open(2);
    assert!(board[2].opened());
    assert!(board[1].flagged());
    assert!(!board[0].opened());
  }

  #[test]
  fn opening_flagged_or_opened_cells_is_a_noop() {
    let mut board = Board::from_layout(2, 1, &[0]).unwrap();
    board.toggle_flag(0);
    board.open(0);
    assert!(!board.failed());
    assert!(board[0].flagged());
    board.open(1);
    assert!(board[1].opened());
    board.open(1);
    assert!(board[1].opened());
    assert!(!board.failed());
  }

  #[test]
  fn toggle_flag_cycles_closed_cells_only() {
    let mut board = Board::from_layout(2, 1, &[]).unwrap();
    board.toggle_flag(0);
    assert!(board[0].flagged());
    board.toggle_flag(0);
    assert!(board[0].closed());
    board.open(1);
    board.toggle_flag(1);
    assert!(board[1].opened());
  }

  #[test]
  fn render_characters() {
    let mut board = Board::from_layout(3, 1, &[0]).unwrap();
    board.toggle_flag(0);
    board.toggle_flag(1);
    board.open(2);
    // flag on bomb vs flag on a safe cell, only told apart when disclosing
    assert_eq!(board.render(false), "F F   ");
    assert_eq!(board.render(true), "f F   ");

    let mut board = Board::from_layout(2, 2, &[3]).unwrap();
    board.open(0);
    assert_eq!(board.render(false), "1 O \nO O ");
    assert_eq!(board.render(true), "1 O \nO + ");

    let mut blank = Board::from_layout(2, 1, &[]).unwrap();
    blank.open(0);
    assert_eq!(blank.render(true), "    ");
  }

  #[test]
  fn lazy_board_reserves_a_safe_first_cell() {
    assert!(LazyBoard::new(3, 3, 8).is_err());
    let mut board = LazyBoard::new(3, 3, 7).unwrap();
    assert!(!board.placed());
    board.open(4);
    assert!(board.placed());
    assert!(!board.failed());
    assert!(!board.board()[4].has_bomb);
    assert!(board.board()[4].opened());
    assert_eq!(bombs_on(board.board()), 7);
  }

  #[test]
  fn lazy_board_later_opens_behave_eagerly() {
    let mut board = LazyBoard::new(2, 1, 0).unwrap();
    board.open(0);
    assert!(board.board()[1].opened());
    assert!(board.cleared());
  }

  #[test]
  fn lazy_solvable_board_is_playable_from_the_first_move() {
    let mut board = LazyBoard::new_solvable(2, 2, 1).unwrap();
    board.open(0);
    assert!(!board.failed());
    assert!(board.board()[0].opened());
    assert!(!board.board()[0].has_bomb);
    assert_eq!(bombs_on(board.board()), 1);
  }
}
