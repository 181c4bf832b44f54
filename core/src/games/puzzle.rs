use rand::prelude::*;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use crate::*;

pub const SIZE: usize = 3;
const CELLS: usize = SIZE * SIZE;
const SOLVED: [u8; CELLS] = [0, 1, 2, 3, 4, 5, 6, 7, 8];

/// Slide the tile at `cell` into the blank.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PuzzleAction {
    pub cell: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlidingPuzzle {
    /// Row-major tiles, `0` is the blank.
    tiles: [u8; CELLS],
    moves: u32,
    status: Status,
}

impl SlidingPuzzle {
    pub fn new(seed: u64) -> Self {
        Self::from_tiles(shuffled(&mut SmallRng::seed_from_u64(seed)))
    }

    pub fn from_tiles(tiles: [u8; CELLS]) -> Self {
        Self {
            tiles,
            moves: 0,
            status: Status::Active,
        }
    }

    pub fn tiles(&self) -> &[u8; CELLS] {
        &self.tiles
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn blank(&self) -> usize {
        self.tiles.iter().position(|&tile| tile == 0).unwrap_or(0)
    }

    pub fn is_solved(&self) -> bool {
        self.tiles == SOLVED
    }

    pub fn slide(&mut self, cell: usize) -> Result<Transition> {
        check_active(self.status)?;
        if cell >= CELLS {
            return Err(GameError::InvalidCoords);
        }
        if !adjacent(cell, self.blank()) {
            return Err(GameError::IllegalMove);
        }

        let blank = self.blank();
        self.tiles.swap(cell, blank);
        self.moves += 1;

        if self.is_solved() {
            log::debug!("Puzzle solved in {} moves", self.moves);
            self.status = Status::Won;
            Ok(Transition::Finished)
        } else {
            Ok(Transition::Changed)
        }
    }
}

fn adjacent(a: usize, b: usize) -> bool {
    let (row_a, col_a) = (a / SIZE, a % SIZE);
    let (row_b, col_b) = (b / SIZE, b % SIZE);
    row_a.abs_diff(row_b) + col_a.abs_diff(col_b) == 1
}

/// Inversions among the numbered tiles, ignoring the blank.
pub fn inversions(tiles: &[u8]) -> usize {
    tiles
        .iter()
        .enumerate()
        .filter(|&(_, &tile)| tile != 0)
        .map(|(i, &tile)| {
            tiles[i + 1..]
                .iter()
                .filter(|&&later| later != 0 && later < tile)
                .count()
        })
        .sum()
}

pub fn is_solvable(tiles: &[u8]) -> bool {
    inversions(tiles) % 2 == 0
}

/// Fisher-Yates until the layout is solvable and not already solved.
pub fn shuffled<R: Rng>(rng: &mut R) -> [u8; CELLS] {
    loop {
        let mut tiles = SOLVED;
        tiles.shuffle(rng);
        if is_solvable(&tiles) && tiles != SOLVED {
            return tiles;
        }
    }
}

impl Engine for SlidingPuzzle {
    type Action = PuzzleAction;

    fn kind(&self) -> GameKind {
        GameKind::Puzzle
    }

    fn status(&self) -> Status {
        self.status
    }

    fn apply(&mut self, action: Self::Action) -> Result<Transition> {
        self.slide(action.cell)
    }

    fn summary(&self, elapsed_secs: u32) -> Summary {
        let score = 1000u32
            .saturating_sub(10 * self.moves)
            .saturating_sub(elapsed_secs / 10);
        Summary {
            moves: Some(self.moves),
            ..Summary::solo(score, false)
        }
    }
}
