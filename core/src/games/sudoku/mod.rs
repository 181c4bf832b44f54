use ndarray::{Array2, s};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use crate::*;

pub use generator::*;

mod generator;

pub const SIZE: usize = 9;
const BOX: usize = 3;

/// 9x9 digits, `0` marks an empty cell.
pub type Grid = Array2<u8>;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SudokuConfig {
    pub removals: usize,
    /// Only remove cells while the puzzle keeps a single solution.
    pub unique: bool,
}

impl Default for SudokuConfig {
    fn default() -> Self {
        Self {
            removals: 40,
            unique: true,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum SudokuAction {
    Select(Coord2),
    /// Write a digit into the selected cell.
    Input(u8),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sudoku {
    solution: Grid,
    board: Grid,
    givens: Array2<bool>,
    selected: Option<Coord2>,
    mistakes: u32,
    status: Status,
}

impl Sudoku {
    pub fn new(config: SudokuConfig, seed: u64) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let solution = generate_solved(&mut rng);
        let puzzle = carve(&solution, config, &mut rng);
        Self::from_puzzle(puzzle, solution)
    }

    pub fn from_puzzle(puzzle: Grid, solution: Grid) -> Self {
        Self {
            givens: puzzle.mapv(|cell| cell != 0),
            board: puzzle,
            solution,
            selected: None,
            mistakes: 0,
            status: Status::Active,
        }
    }

    pub fn board(&self) -> &Grid {
        &self.board
    }

    pub fn is_given(&self, coords: Coord2) -> bool {
        self.givens[coords.to_nd_index()]
    }

    pub fn selected(&self) -> Option<Coord2> {
        self.selected
    }

    pub fn mistakes(&self) -> u32 {
        self.mistakes
    }

    fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        if in_bounds(coords, grid_size(&self.board)) {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    pub fn select(&mut self, coords: Coord2) -> Result<Transition> {
        check_active(self.status)?;
        let coords = self.validate_coords(coords)?;
        if self.is_given(coords) {
            return Err(GameError::NotSelectable);
        }
        self.selected = Some(coords);
        Ok(Transition::Changed)
    }

    /// Writes into the selected cell and clears the selection.
    pub fn input(&mut self, value: u8) -> Result<Transition> {
        check_active(self.status)?;
        let coords = self.selected.ok_or(GameError::NotSelectable)?;
        let transition = self.place_digit(coords, value)?;
        self.selected = None;
        Ok(transition)
    }

    pub fn place_digit(&mut self, coords: Coord2, value: u8) -> Result<Transition> {
        check_active(self.status)?;
        let coords = self.validate_coords(coords)?;
        if !(1..=9).contains(&value) {
            return Err(GameError::InvalidInput);
        }
        if self.is_given(coords) {
            return Err(GameError::NotSelectable);
        }

        self.board[coords.to_nd_index()] = value;
        if value != self.solution[coords.to_nd_index()] {
            self.mistakes += 1;
            log::debug!("Wrong digit {} on {:?}", value, coords);
        }

        if self.board == self.solution {
            log::debug!("Sudoku solved with {} mistakes", self.mistakes);
            self.status = Status::Won;
            Ok(Transition::Finished)
        } else {
            Ok(Transition::Changed)
        }
    }
}

impl Engine for Sudoku {
    type Action = SudokuAction;

    fn kind(&self) -> GameKind {
        GameKind::Sudoku
    }

    fn status(&self) -> Status {
        self.status
    }

    fn apply(&mut self, action: Self::Action) -> Result<Transition> {
        match action {
            SudokuAction::Select(coords) => self.select(coords),
            SudokuAction::Input(value) => self.input(value),
        }
    }

    fn summary(&self, elapsed_secs: u32) -> Summary {
        let bonus = 2 * 300u32.saturating_sub(elapsed_secs);
        let score = (1000 + bonus).saturating_sub(50 * self.mistakes);
        Summary {
            mistakes: Some(self.mistakes),
            ..Summary::solo(score, false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_blank() -> Sudoku {
        let solution = generate_solved(&mut SmallRng::seed_from_u64(5));
        let mut puzzle = solution.clone();
        puzzle[[4, 4]] = 0;
        Sudoku::from_puzzle(puzzle, solution)
    }

    #[test]
    fn givens_cannot_be_selected_or_overwritten() {
        let mut game = one_blank();
        assert_eq!(game.select((0, 0)), Err(GameError::NotSelectable));
        assert_eq!(game.place_digit((0, 0), 1), Err(GameError::NotSelectable));
    }

    #[test]
    fn digit_range_is_checked() {
        let mut game = one_blank();
        assert_eq!(game.place_digit((4, 4), 0), Err(GameError::InvalidInput));
        assert_eq!(game.place_digit((4, 4), 10), Err(GameError::InvalidInput));
        assert_eq!(game.mistakes(), 0);
    }

    #[test]
    fn wrong_digit_counts_mistake_and_clears_selection() {
        let mut game = one_blank();
        let right = game.solution[[4, 4]];
        let wrong = if right == 9 { 1 } else { right + 1 };

        game.select((4, 4)).unwrap();
        assert_eq!(game.input(wrong).unwrap(), Transition::Changed);
        assert_eq!(game.mistakes(), 1);
        assert_eq!(game.selected(), None);
        assert_eq!(game.input(right), Err(GameError::NotSelectable));

        game.select((4, 4)).unwrap();
        assert_eq!(game.input(right).unwrap(), Transition::Finished);
        assert_eq!(game.status(), Status::Won);
    }

    #[test]
    fn score_rewards_speed_and_penalizes_mistakes() {
        let mut game = one_blank();
        game.mistakes = 2;
        assert_eq!(game.summary(100).score, Some(1000 - 100 + 400));
        assert_eq!(game.summary(1000).score, Some(900));
        game.mistakes = 30;
        assert_eq!(game.summary(1000).score, Some(0));
    }

    #[test]
    fn new_game_blanks_forty_cells() {
        let game = Sudoku::new(SudokuConfig::default(), 8);
        assert_eq!(game.board().iter().filter(|&&cell| cell == 0).count(), 40);
    }
}
