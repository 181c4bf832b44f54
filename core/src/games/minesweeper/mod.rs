use core::ops::Index;
use std::collections::{BTreeSet, VecDeque};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

pub use generator::*;

mod generator;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Difficulty {
    /// `(rows, cols)`
    pub size: Coord2,
    pub mines: CellCount,
}

impl Difficulty {
    pub const fn new_unchecked(size: Coord2, mines: CellCount) -> Self {
        Self { size, mines }
    }

    pub fn new((rows, cols): Coord2, mines: CellCount) -> Self {
        let rows = rows.clamp(1, Coord::MAX);
        let cols = cols.clamp(1, Coord::MAX);
        let mines = mines.clamp(1, mult(rows, cols));
        Self::new_unchecked((rows, cols), mines)
    }

    pub const fn easy() -> Self {
        Self::new_unchecked((9, 9), 10)
    }

    pub const fn medium() -> Self {
        Self::new_unchecked((16, 16), 40)
    }

    pub const fn hard() -> Self {
        Self::new_unchecked((16, 30), 99)
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.size.0, self.size.1)
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self::easy()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Minefield {
    mines: Array2<bool>,
    count: CellCount,
}

impl Minefield {
    pub fn from_mine_mask(mines: Array2<bool>) -> Self {
        let count = mines.iter().filter(|&&is_mine| is_mine).count();
        Self {
            mines,
            count: count.try_into().unwrap_or(CellCount::MAX),
        }
    }

    pub fn from_mine_coords(size: Coord2, mine_coords: &[Coord2]) -> Result<Self> {
        let mut mines: Array2<bool> = Array2::default(size.to_nd_index());

        for &coords in mine_coords {
            if !in_bounds(coords, size) {
                return Err(GameError::InvalidCoords);
            }
            mines[coords.to_nd_index()] = true;
        }

        Ok(Self::from_mine_mask(mines))
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        if in_bounds(coords, self.size()) {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    pub fn size(&self) -> Coord2 {
        grid_size(&self.mines)
    }

    pub fn total_cells(&self) -> CellCount {
        self.mines.len().try_into().unwrap_or(CellCount::MAX)
    }

    pub fn safe_cell_count(&self) -> CellCount {
        self.total_cells() - self.count
    }

    pub fn mine_count(&self) -> CellCount {
        self.count
    }

    pub fn contains_mine(&self, coords: Coord2) -> bool {
        self[coords]
    }

    pub fn adjacent_mine_count(&self, coords: Coord2) -> u8 {
        // at most 8 neighbors, always fits
        self.iter_neighbors(coords).filter(|&pos| self[pos]).count() as u8
    }

    pub(crate) fn iter_neighbors(&self, coords: Coord2) -> NeighborIter {
        self.mines.iter_neighbors(coords)
    }
}

impl Index<Coord2> for Minefield {
    type Output = bool;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.mines[coords.to_nd_index()]
    }
}

/// Player-visible state of one cell.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellState {
    #[default]
    Hidden,
    Flagged,
    Revealed(u8),
    /// Shown after the game is lost.
    Mine,
}

/// Flattened view of a cell, mine included.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    pub is_mine: bool,
    pub is_revealed: bool,
    pub is_flagged: bool,
    pub neighbor_mines: u8,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "cell", rename_all = "camelCase")]
pub enum MinesweeperAction {
    Reveal(Coord2),
    ToggleFlag(Coord2),
    Chord(Coord2),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Minesweeper {
    minefield: Minefield,
    board: Array2<CellState>,
    revealed_count: CellCount,
    flagged_count: CellCount,
    status: Status,
    triggered_mine: Option<Coord2>,
}

impl Minesweeper {
    pub fn new(minefield: Minefield) -> Self {
        let size = minefield.size();
        Self {
            minefield,
            board: Array2::default(size.to_nd_index()),
            revealed_count: 0,
            flagged_count: 0,
            status: Status::Active,
            triggered_mine: None,
        }
    }

    pub fn random(difficulty: Difficulty, seed: u64) -> Self {
        Self::new(RandomMinefieldGenerator::new(seed).generate(difficulty))
    }

    pub fn size(&self) -> Coord2 {
        self.minefield.size()
    }

    pub fn total_mines(&self) -> CellCount {
        self.minefield.mine_count()
    }

    pub fn mines_left(&self) -> isize {
        (self.minefield.mine_count() as isize) - (self.flagged_count as isize)
    }

    pub fn revealed_count(&self) -> CellCount {
        self.revealed_count
    }

    pub fn flagged_count(&self) -> CellCount {
        self.flagged_count
    }

    pub fn state_at(&self, coords: Coord2) -> CellState {
        self.board[coords.to_nd_index()]
    }

    pub fn cell_at(&self, coords: Coord2) -> Cell {
        let state = self.state_at(coords);
        Cell {
            is_mine: self.minefield[coords],
            is_revealed: matches!(state, CellState::Revealed(_) | CellState::Mine),
            is_flagged: matches!(state, CellState::Flagged),
            neighbor_mines: self.minefield.adjacent_mine_count(coords),
        }
    }

    pub fn triggered_mine(&self) -> Option<Coord2> {
        self.triggered_mine
    }

    pub fn toggle_flag(&mut self, coords: Coord2) -> Result<Transition> {
        use CellState::*;

        let coords = self.minefield.validate_coords(coords)?;
        check_active(self.status)?;

        Ok(match self.board[coords.to_nd_index()] {
            Hidden => {
                self.board[coords.to_nd_index()] = Flagged;
                self.flagged_count = self.flagged_count.saturating_add(1);
                Transition::Changed
            }
            Flagged => {
                self.board[coords.to_nd_index()] = Hidden;
                self.flagged_count = self.flagged_count.saturating_sub(1);
                Transition::Changed
            }
            Revealed(_) | Mine => Transition::NoChange,
        })
    }

    pub fn reveal(&mut self, coords: Coord2) -> Result<Transition> {
        let coords = self.minefield.validate_coords(coords)?;
        check_active(self.status)?;

        if matches!(self.board[coords.to_nd_index()], CellState::Hidden) {
            Ok(self.reveal_single_cell(coords))
        } else {
            Ok(Transition::NoChange)
        }
    }

    /// Reveal every unflagged neighbor of a number whose flags are all placed.
    pub fn chord_reveal(&mut self, coords: Coord2) -> Result<Transition> {
        let coords = self.minefield.validate_coords(coords)?;
        check_active(self.status)?;

        Ok(match self.board[coords.to_nd_index()] {
            CellState::Revealed(count) if count > 0 && count == self.count_flagged_neighbors(coords) => {
                let neighbors: Vec<_> = self.minefield.iter_neighbors(coords).collect();
                neighbors
                    .into_iter()
                    .map(|neighbor| {
                        if self.status.is_finished() {
                            Transition::NoChange
                        } else {
                            self.reveal_single_cell(neighbor)
                        }
                    })
                    .fold(Transition::NoChange, core::ops::BitOr::bitor)
            }
            _ => Transition::NoChange,
        })
    }

    fn reveal_single_cell(&mut self, coords: Coord2) -> Transition {
        let cell_state = self.board[coords.to_nd_index()];
        let has_mine = self.minefield[coords];

        match (cell_state, has_mine) {
            (CellState::Hidden, true) => {
                log::debug!("Mine hit at {:?}", coords);
                self.triggered_mine = Some(coords);
                self.end_game(false);
                Transition::Finished
            }
            (CellState::Hidden, false) => {
                let adjacent_mines = self.minefield.adjacent_mine_count(coords);
                self.board[coords.to_nd_index()] = CellState::Revealed(adjacent_mines);
                self.revealed_count = self.revealed_count.saturating_add(1);
                log::trace!("Revealed {:?}, mine count: {}", coords, adjacent_mines);

                if adjacent_mines == 0 {
                    self.flood_from(coords);
                }

                if self.revealed_count == self.minefield.safe_cell_count() {
                    self.end_game(true);
                    Transition::Finished
                } else {
                    Transition::Changed
                }
            }
            _ => Transition::NoChange,
        }
    }

    /// Work-list flood fill through zero-count cells; depth does not grow with board size.
    fn flood_from(&mut self, origin: Coord2) {
        let mut visited = BTreeSet::from([origin]);
        let mut to_visit: VecDeque<_> = self
            .minefield
            .iter_neighbors(origin)
            .filter(|&pos| matches!(self.board[pos.to_nd_index()], CellState::Hidden))
            .collect();

        while let Some(visit_coords) = to_visit.pop_front() {
            if !visited.insert(visit_coords) {
                continue;
            }

            // flags stay put even when reachable
            if !matches!(self.board[visit_coords.to_nd_index()], CellState::Hidden) {
                continue;
            }

            let visit_adjacent_mines = self.minefield.adjacent_mine_count(visit_coords);
            self.board[visit_coords.to_nd_index()] = CellState::Revealed(visit_adjacent_mines);
            self.revealed_count = self.revealed_count.saturating_add(1);
            log::trace!(
                "Flood revealed {:?}, mine count: {}",
                visit_coords,
                visit_adjacent_mines
            );

            if visit_adjacent_mines == 0 {
                to_visit.extend(
                    self.minefield
                        .iter_neighbors(visit_coords)
                        .filter(|&pos| matches!(self.board[pos.to_nd_index()], CellState::Hidden))
                        .filter(|pos| !visited.contains(pos)),
                );
            }
        }
    }

    fn end_game(&mut self, won: bool) {
        if self.status.is_finished() {
            return;
        }

        self.status = if won { Status::Won } else { Status::Lost };
        if won {
            self.triggered_mine = None;
        } else {
            self.reveal_mines();
        }
        log::debug!("Minesweeper ended, won: {}", won);
    }

    fn reveal_mines(&mut self) {
        for (index, state) in self.board.indexed_iter_mut() {
            let coords = (index.0 as Coord, index.1 as Coord);
            if self.minefield[coords] {
                *state = CellState::Mine;
            }
        }
    }

    fn count_flagged_neighbors(&self, coords: Coord2) -> u8 {
        self.minefield
            .iter_neighbors(coords)
            .filter(|&pos| self.board[pos.to_nd_index()] == CellState::Flagged)
            .count() as u8
    }
}

impl Engine for Minesweeper {
    type Action = MinesweeperAction;

    fn kind(&self) -> GameKind {
        GameKind::Minesweeper
    }

    fn status(&self) -> Status {
        self.status
    }

    fn apply(&mut self, action: Self::Action) -> Result<Transition> {
        match action {
            MinesweeperAction::Reveal(coords) => self.reveal(coords),
            MinesweeperAction::ToggleFlag(coords) => self.toggle_flag(coords),
            MinesweeperAction::Chord(coords) => self.chord_reveal(coords),
        }
    }

    fn summary(&self, elapsed_secs: u32) -> Summary {
        let won = self.status == Status::Won;
        let score = if won {
            1000u32.saturating_sub(elapsed_secs).max(100)
        } else {
            0
        };
        Summary::solo(score, won)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(size: Coord2, mines: &[Coord2]) -> Minesweeper {
        Minesweeper::new(Minefield::from_mine_coords(size, mines).unwrap())
    }

    #[test]
    fn reveal_hits_mine_and_reveals_all_mines() {
        let mut game = engine((3, 3), &[(0, 0), (2, 2)]);

        let outcome = game.reveal((0, 0)).unwrap();

        assert_eq!(outcome, Transition::Finished);
        assert_eq!(game.status(), Status::Lost);
        assert_eq!(game.triggered_mine(), Some((0, 0)));
        assert!(game.cell_at((2, 2)).is_revealed);
        assert!(!game.cell_at((1, 1)).is_revealed);
    }

    #[test]
    fn zero_cell_on_empty_board_reveals_everything() {
        let mut game = Minesweeper::new(Minefield::from_mine_mask(Array2::default((5, 4))));

        assert_eq!(game.reveal((2, 2)).unwrap(), Transition::Finished);
        assert_eq!(game.status(), Status::Won);
        assert_eq!(game.revealed_count(), 20);
    }

    #[test]
    fn flood_fill_stops_at_numbers() {
        let mut game = engine((3, 3), &[(2, 2)]);

        assert_eq!(game.reveal((0, 0)).unwrap(), Transition::Finished);
        assert_eq!(game.state_at((0, 0)), CellState::Revealed(0));
        assert_eq!(game.state_at((1, 1)), CellState::Revealed(1));
        assert_eq!(game.state_at((2, 2)), CellState::Hidden);
    }

    #[test]
    fn flood_fill_skips_flags() {
        let mut game = engine((1, 5), &[(0, 4)]);
        game.toggle_flag((0, 1)).unwrap();

        assert_eq!(game.reveal((0, 0)).unwrap(), Transition::Changed);
        assert_eq!(game.state_at((0, 1)), CellState::Flagged);
        assert_eq!(game.state_at((0, 2)), CellState::Hidden);
        assert_eq!(game.revealed_count(), 1);
    }

    #[test]
    fn flagged_and_revealed_cells_ignore_reveal() {
        let mut game = engine((2, 2), &[(0, 0)]);
        game.toggle_flag((0, 0)).unwrap();
        assert_eq!(game.reveal((0, 0)).unwrap(), Transition::NoChange);
        assert_eq!(game.status(), Status::Active);

        game.reveal((1, 1)).unwrap();
        let before = game.clone();
        assert_eq!(game.reveal((1, 1)).unwrap(), Transition::NoChange);
        assert_eq!(game, before);
    }

    #[test]
    fn toggle_flag_tracks_counter() {
        let mut game = engine((2, 2), &[(0, 0)]);
        game.toggle_flag((1, 0)).unwrap();
        assert_eq!(game.flagged_count(), 1);
        assert_eq!(game.mines_left(), 0);
        game.toggle_flag((1, 0)).unwrap();
        assert_eq!(game.flagged_count(), 0);

        game.reveal((1, 1)).unwrap();
        assert_eq!(game.toggle_flag((1, 1)).unwrap(), Transition::NoChange);
    }

    #[test]
    fn chord_reveal_uses_flagged_neighbors() {
        let mut game = engine((3, 3), &[(1, 0), (1, 2)]);

        game.reveal((1, 1)).unwrap();
        game.toggle_flag((1, 0)).unwrap();
        game.toggle_flag((1, 2)).unwrap();

        assert_eq!(game.chord_reveal((1, 1)).unwrap(), Transition::Finished);
        assert_eq!(game.state_at((0, 1)), CellState::Revealed(2));
        assert_eq!(game.state_at((2, 1)), CellState::Revealed(2));
    }

    #[test]
    fn actions_after_end_are_rejected() {
        let mut game = engine((2, 1), &[(0, 0)]);
        assert_eq!(game.reveal((1, 0)).unwrap(), Transition::Finished);
        assert_eq!(game.reveal((0, 0)), Err(GameError::AlreadyEnded));
        assert_eq!(game.toggle_flag((0, 0)), Err(GameError::AlreadyEnded));
    }

    #[test]
    fn out_of_bounds_is_rejected() {
        let mut game = engine((2, 2), &[(0, 0)]);
        assert_eq!(game.reveal((5, 0)), Err(GameError::InvalidCoords));
    }

    #[test]
    fn winning_score_depends_on_time() {
        let mut game = engine((2, 1), &[(0, 0)]);
        game.reveal((1, 0)).unwrap();
        assert_eq!(game.summary(30).score, Some(970));
        assert_eq!(game.summary(5000).score, Some(100));
        assert_eq!(game.summary(30).winner, Some(0));
    }
}
