use serde::{Deserialize, Serialize};

use crate::*;

const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    pub const fn seat(self) -> Seat {
        match self {
            Self::X => 0,
            Self::O => 1,
        }
    }

    pub const fn other(self) -> Self {
        match self {
            Self::X => Self::O,
            Self::O => Self::X,
        }
    }
}

/// Cell index in row-major order, `0..9`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicTacToeAction {
    pub cell: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicTacToe {
    board: [Option<Mark>; 9],
    to_move: Mark,
    status: Status,
    winner: Option<Mark>,
}

impl Default for TicTacToe {
    fn default() -> Self {
        Self::new()
    }
}

impl TicTacToe {
    pub fn new() -> Self {
        Self {
            board: [None; 9],
            to_move: Mark::X,
            status: Status::Active,
            winner: None,
        }
    }

    pub fn board(&self) -> &[Option<Mark>; 9] {
        &self.board
    }

    pub fn to_move(&self) -> Mark {
        self.to_move
    }

    pub fn winner(&self) -> Option<Mark> {
        self.winner
    }

    pub fn place(&mut self, cell: usize) -> Result<Transition> {
        check_active(self.status)?;
        let mark = self.to_move;
        let slot = self.board.get_mut(cell).ok_or(GameError::InvalidCoords)?;
        if slot.is_some() {
            return Err(GameError::IllegalMove);
        }
        *slot = Some(mark);

        if let Some(winner) = line_winner(&self.board) {
            log::debug!("Tic-tac-toe won by {:?}", winner);
            self.winner = Some(winner);
            self.status = Status::Won;
            return Ok(Transition::Finished);
        }

        if self.board.iter().all(Option::is_some) {
            log::debug!("Tic-tac-toe drawn");
            self.status = Status::Draw;
            return Ok(Transition::Finished);
        }

        self.to_move = mark.other();
        Ok(Transition::Changed)
    }
}

fn line_winner(board: &[Option<Mark>; 9]) -> Option<Mark> {
    LINES.iter().find_map(|&[a, b, c]| match (board[a], board[b], board[c]) {
        (Some(x), Some(y), Some(z)) if x == y && y == z => Some(x),
        _ => None,
    })
}

impl Engine for TicTacToe {
    type Action = TicTacToeAction;

    fn kind(&self) -> GameKind {
        GameKind::TicTacToe
    }

    fn status(&self) -> Status {
        self.status
    }

    fn apply(&mut self, action: Self::Action) -> Result<Transition> {
        self.place(action.cell)
    }

    fn summary(&self, _elapsed_secs: u32) -> Summary {
        Summary::head_to_head(self.winner.map(Mark::seat), 2)
    }
}
