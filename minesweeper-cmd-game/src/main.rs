use minesweeper_logic::{Board, BoardGenerator, Solver, SolverCallback};

struct PrintSteps;

impl SolverCallback for PrintSteps {
  fn before_start(&mut self, _board: &Board) {}

  fn on_step(&mut self, board: &Board, step: usize, nest_level: u32) -> bool {
    if nest_level == 0 {
      println!("step {}:", step);
      println!("{}", board.render(false));
      println!();
    }
    true
  }
}

fn main() {
  let (width, height, bombs) = (9, 9, 10);
  let start = width as usize * height as usize / 2;

  let mut generator = BoardGenerator::with_progress(|attempt| {
    println!("attempt #{} needed guessing, retrying...", attempt);
  });
  let board = generator.generate(
    || {
      let mut board = Board::with_excludes(width, height, bombs, &[start]).expect("valid configuration");
      board.open(start);
      board
    },
    Some(1000),
  );

  let Some(mut board) = board else {
    println!("could not generate a logically solvable board");
    return;
  };

  println!("{}", board.render(false));
  println!();

  match Solver::solve(&mut board, &mut PrintSteps) {
    Ok(true) => {
      println!("{}", board.render(true));
      println!("Win!");
    }
    Ok(false) => println!("Failed."),
    Err(err) => println!("No logical move left: {}", err),
  }
}
