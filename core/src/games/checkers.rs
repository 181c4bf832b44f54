use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

pub const BOARD_SIZE: Coord = 8;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Side {
    Red,
    Black,
}

impl Side {
    pub const fn opponent(self) -> Self {
        match self {
            Self::Red => Self::Black,
            Self::Black => Self::Red,
        }
    }

    pub const fn seat(self) -> Seat {
        match self {
            Self::Red => 0,
            Self::Black => 1,
        }
    }

    const fn forward(self) -> i8 {
        match self {
            Self::Red => 1,
            Self::Black => -1,
        }
    }

    const fn crown_row(self) -> Coord {
        match self {
            Self::Red => BOARD_SIZE - 1,
            Self::Black => 0,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checker {
    pub color: Side,
    pub is_king: bool,
}

impl Checker {
    pub const fn man(color: Side) -> Self {
        Self {
            color,
            is_king: false,
        }
    }

    pub const fn king(color: Side) -> Self {
        Self {
            color,
            is_king: true,
        }
    }
}

pub type Board = Array2<Option<Checker>>;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "cell", rename_all = "camelCase")]
pub enum CheckersAction {
    Select(Coord2),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkers {
    board: Board,
    to_move: Side,
    selected: Option<Coord2>,
    status: Status,
    winner: Option<Side>,
}

impl Default for Checkers {
    fn default() -> Self {
        Self::new()
    }
}

impl Checkers {
    pub fn new() -> Self {
        Self::from_board(initial_board(), Side::Red)
    }

    pub fn from_board(board: Board, to_move: Side) -> Self {
        Self {
            board,
            to_move,
            selected: None,
            status: Status::Active,
            winner: None,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn to_move(&self) -> Side {
        self.to_move
    }

    pub fn selected(&self) -> Option<Coord2> {
        self.selected
    }

    pub fn winner(&self) -> Option<Side> {
        self.winner
    }

    pub fn piece_at(&self, coords: Coord2) -> Option<Checker> {
        self.board.get(coords.to_nd_index()).copied().flatten()
    }

    pub fn select(&mut self, coords: Coord2) -> Result<Transition> {
        check_active(self.status)?;
        if !in_bounds(coords, (BOARD_SIZE, BOARD_SIZE)) {
            return Err(GameError::InvalidCoords);
        }

        match self.selected {
            Some(from) => match self.move_piece(from, coords) {
                Err(GameError::IllegalMove) => {
                    self.selected = None;
                    Ok(Transition::Changed)
                }
                other => other,
            },
            None => match self.piece_at(coords) {
                Some(piece) if piece.color == self.to_move => {
                    self.selected = Some(coords);
                    Ok(Transition::Changed)
                }
                _ => Err(GameError::NotSelectable),
            },
        }
    }

    pub fn move_piece(&mut self, from: Coord2, to: Coord2) -> Result<Transition> {
        check_active(self.status)?;
        let bounds = (BOARD_SIZE, BOARD_SIZE);
        if !in_bounds(from, bounds) || !in_bounds(to, bounds) {
            return Err(GameError::InvalidCoords);
        }
        let piece = self.piece_at(from).ok_or(GameError::IllegalMove)?;
        if piece.color != self.to_move || !valid_moves(&self.board, from).contains(&to) {
            return Err(GameError::IllegalMove);
        }

        self.board[from.to_nd_index()] = None;
        if from.0.abs_diff(to.0) == 2 {
            let captured = ((from.0 + to.0) / 2, (from.1 + to.1) / 2);
            self.board[captured.to_nd_index()] = None;
            log::debug!("{:?} captured on {:?}", piece.color, captured);
        }
        self.board[to.to_nd_index()] = Some(if to.0 == piece.color.crown_row() {
            Checker::king(piece.color)
        } else {
            piece
        });

        self.selected = None;
        let mover = self.to_move;
        self.to_move = mover.opponent();

        if has_any_move(&self.board, self.to_move) {
            Ok(Transition::Changed)
        } else {
            log::debug!("Checkers won by {:?}", mover);
            self.winner = Some(mover);
            self.status = Status::Won;
            Ok(Transition::Finished)
        }
    }
}

pub fn initial_board() -> Board {
    let mut board: Board = Array2::default((BOARD_SIZE.into(), BOARD_SIZE.into()));
    for ((row, col), cell) in board.indexed_iter_mut() {
        if (row + col) % 2 == 1 {
            if row < 3 {
                *cell = Some(Checker::man(Side::Red));
            } else if row >= 5 {
                *cell = Some(Checker::man(Side::Black));
            }
        }
    }
    board
}

/// Simple steps and single jumps available to the piece on `from`.
pub fn valid_moves(board: &Board, from: Coord2) -> Vec<Coord2> {
    let Some(piece) = board.get(from.to_nd_index()).copied().flatten() else {
        return Vec::new();
    };
    let bounds = (BOARD_SIZE, BOARD_SIZE);
    let forward = piece.color.forward();
    let row_dirs: &[i8] = if piece.is_king { &[-1, 1] } else { core::slice::from_ref(&forward) };

    let mut moves = Vec::new();
    for &d_row in row_dirs {
        for d_col in [-1, 1] {
            let Some(step) = offset(from, (d_row, d_col), bounds) else {
                continue;
            };
            match board[step.to_nd_index()] {
                None => moves.push(step),
                Some(middle) if middle.color != piece.color => {
                    if let Some(landing) = offset(from, (2 * d_row, 2 * d_col), bounds) {
                        if board[landing.to_nd_index()].is_none() {
                            moves.push(landing);
                        }
                    }
                }
                Some(_) => {}
            }
        }
    }
    moves
}

pub fn has_any_move(board: &Board, side: Side) -> bool {
    board.indexed_iter().any(|((row, col), cell)| {
        matches!(cell, Some(piece) if piece.color == side)
            && !valid_moves(board, (row as Coord, col as Coord)).is_empty()
    })
}

impl Engine for Checkers {
    type Action = CheckersAction;

    fn kind(&self) -> GameKind {
        GameKind::Checkers
    }

    fn status(&self) -> Status {
        self.status
    }

    fn apply(&mut self, action: Self::Action) -> Result<Transition> {
        match action {
            CheckersAction::Select(coords) => self.select(coords),
        }
    }

    fn summary(&self, _elapsed_secs: u32) -> Summary {
        Summary::head_to_head(self.winner.map(Side::seat), 2)
    }
}
