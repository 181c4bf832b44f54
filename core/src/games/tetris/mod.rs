use core::time::Duration;
use ndarray::{Array2, Axis};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use crate::*;

pub use piece::*;

mod piece;

pub const BOARD_WIDTH: Coord = 10;
pub const BOARD_HEIGHT: Coord = 20;
const LINE_SCORES: [u32; 5] = [0, 100, 300, 500, 800];

pub type Board = Array2<Option<PieceKind>>;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TetrisAction {
    Left,
    Right,
    SoftDrop,
    HardDrop,
    Rotate,
    TogglePause,
}

#[derive(Clone, Debug, Serialize)]
pub struct Tetris {
    board: Board,
    current: Piece,
    next: PieceKind,
    score: u32,
    level: u32,
    lines: u32,
    paused: bool,
    status: Status,
    #[serde(skip)]
    rng: SmallRng,
}

impl Tetris {
    pub fn new(seed: u64) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let current = PieceKind::random(&mut rng);
        let next = PieceKind::random(&mut rng);
        Self::with_pieces(empty_board(), current, next, rng)
    }

    /// Start from a prepared board, for puzzles and tests.
    pub fn with_board(board: Board, current: PieceKind, next: PieceKind, seed: u64) -> Self {
        Self::with_pieces(board, current, next, SmallRng::seed_from_u64(seed))
    }

    fn with_pieces(board: Board, current: PieceKind, next: PieceKind, rng: SmallRng) -> Self {
        let mut game = Self {
            board,
            current: Piece::spawn(current, BOARD_WIDTH.into()),
            next,
            score: 0,
            level: 1,
            lines: 0,
            paused: false,
            status: Status::Active,
            rng,
        };
        if !game.fits(&game.current) {
            game.status = Status::Lost;
        }
        game
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current(&self) -> &Piece {
        &self.current
    }

    pub fn next(&self) -> PieceKind {
        self.next
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn lines(&self) -> u32 {
        self.lines
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn gravity(&self) -> Duration {
        let millis = 1000u64.saturating_sub(u64::from(self.level - 1) * 100).max(100);
        Duration::from_millis(millis)
    }

    /// Where a hard drop would land the current piece.
    pub fn ghost(&self) -> Piece {
        let mut ghost = self.current.clone();
        loop {
            let lower = ghost.shifted(1, 0);
            if !self.fits(&lower) {
                return ghost;
            }
            ghost = lower;
        }
    }

    fn fits(&self, piece: &Piece) -> bool {
        piece.cells().all(|(row, col)| {
            if col < 0 || col >= BOARD_WIDTH.into() || row >= BOARD_HEIGHT.into() {
                return false;
            }
            row < 0 || self.board[[row as usize, col as usize]].is_none()
        })
    }

    fn check_playable(&self) -> Result<()> {
        check_active(self.status)?;
        if self.paused {
            return Err(GameError::Paused);
        }
        Ok(())
    }

    pub fn shift(&mut self, d_col: i16) -> Result<Transition> {
        self.check_playable()?;
        let moved = self.current.shifted(0, d_col);
        if self.fits(&moved) {
            self.current = moved;
            Ok(Transition::Changed)
        } else {
            Ok(Transition::NoChange)
        }
    }

    /// One row down; locks the piece when it cannot move.
    pub fn soft_drop(&mut self) -> Result<Transition> {
        self.check_playable()?;
        let moved = self.current.shifted(1, 0);
        if self.fits(&moved) {
            self.current = moved;
            Ok(Transition::Changed)
        } else {
            Ok(self.lock())
        }
    }

    pub fn hard_drop(&mut self) -> Result<Transition> {
        self.check_playable()?;
        self.current = self.ghost();
        Ok(self.lock())
    }

    pub fn rotate(&mut self) -> Result<Transition> {
        self.check_playable()?;
        let rotated = self.current.rotated_clockwise();
        let kicked = [0, -1, 1]
            .into_iter()
            .map(|kick| rotated.shifted(0, kick))
            .find(|candidate| self.fits(candidate));

        match kicked {
            Some(piece) => {
                self.current = piece;
                Ok(Transition::Changed)
            }
            None => Ok(Transition::NoChange),
        }
    }

    pub fn toggle_pause(&mut self) -> Result<Transition> {
        check_active(self.status)?;
        self.paused = !self.paused;
        Ok(Transition::Changed)
    }

    fn lock(&mut self) -> Transition {
        let kind = self.current.kind;
        for (row, col) in self.current.cells() {
            if row >= 0 {
                self.board[[row as usize, col as usize]] = Some(kind);
            }
        }

        let (board, cleared) = clear_lines(&self.board);
        self.board = board;
        if cleared > 0 {
            self.score += line_score(cleared, self.level);
            self.lines += cleared as u32;
            self.level = self.lines / 10 + 1;
            log::debug!(
                "Cleared {} lines, score {}, level {}",
                cleared,
                self.score,
                self.level
            );
        }

        let upcoming = PieceKind::random(&mut self.rng);
        self.current = Piece::spawn(core::mem::replace(&mut self.next, upcoming), BOARD_WIDTH.into());
        if self.fits(&self.current) {
            Transition::Changed
        } else {
            log::debug!("Tetris topped out, score {}", self.score);
            self.status = Status::Lost;
            Transition::Finished
        }
    }
}

pub fn empty_board() -> Board {
    Array2::default((BOARD_HEIGHT.into(), BOARD_WIDTH.into()))
}

/// Points for `lines` rows cleared together at `level`.
pub fn line_score(lines: usize, level: u32) -> u32 {
    LINE_SCORES.get(lines).copied().unwrap_or(LINE_SCORES[4]) * level
}

/// Builds a new board without the full rows, padded with empty rows on top.
pub fn clear_lines(board: &Board) -> (Board, usize) {
    let (rows, cols) = board.dim();
    let kept: Vec<_> = board
        .axis_iter(Axis(0))
        .filter(|row| row.iter().any(Option::is_none))
        .collect();
    let cleared = rows - kept.len();

    let mut next = Array2::default((rows, cols));
    for (index, row) in kept.into_iter().enumerate() {
        next.row_mut(cleared + index).assign(&row);
    }
    (next, cleared)
}

impl Engine for Tetris {
    type Action = TetrisAction;

    fn kind(&self) -> GameKind {
        GameKind::Tetris
    }

    fn status(&self) -> Status {
        self.status
    }

    fn apply(&mut self, action: Self::Action) -> Result<Transition> {
        match action {
            TetrisAction::Left => self.shift(-1),
            TetrisAction::Right => self.shift(1),
            TetrisAction::SoftDrop => self.soft_drop(),
            TetrisAction::HardDrop => self.hard_drop(),
            TetrisAction::Rotate => self.rotate(),
            TetrisAction::TogglePause => self.toggle_pause(),
        }
    }

    fn tick(&mut self) -> Result<Transition> {
        check_active(self.status)?;
        if self.paused {
            return Ok(Transition::NoChange);
        }
        self.soft_drop()
    }

    fn tick_period(&self) -> Option<Duration> {
        Some(self.gravity())
    }

    fn summary(&self, _elapsed_secs: u32) -> Summary {
        Summary::solo(self.score, false)
    }
}
