use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

pub const BOARD_SIZE: Coord = 8;
const BACK_ROW: [PieceType; 8] = [
    PieceType::Rook,
    PieceType::Knight,
    PieceType::Bishop,
    PieceType::Queen,
    PieceType::King,
    PieceType::Bishop,
    PieceType::Knight,
    PieceType::Rook,
];

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub const fn opponent(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }

    pub const fn seat(self) -> Seat {
        match self {
            Self::White => 0,
            Self::Black => 1,
        }
    }

    const fn forward(self) -> i8 {
        match self {
            Self::White => -1,
            Self::Black => 1,
        }
    }

    const fn pawn_row(self) -> Coord {
        match self {
            Self::White => 6,
            Self::Black => 1,
        }
    }

    const fn last_row(self) -> Coord {
        match self {
            Self::White => 0,
            Self::Black => BOARD_SIZE - 1,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PieceType {
    Pawn,
    Rook,
    Knight,
    Bishop,
    Queen,
    King,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChessPiece {
    #[serde(rename = "type")]
    pub kind: PieceType,
    pub color: Color,
}

impl ChessPiece {
    pub const fn new(kind: PieceType, color: Color) -> Self {
        Self { kind, color }
    }
}

pub type Board = Array2<Option<ChessPiece>>;

/// When a game of chess ends.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MateRule {
    /// Any move that gives check wins on the spot.
    CheckEndsGame,
    /// Moves may not leave the own king in check; the game ends on checkmate or stalemate.
    #[default]
    Checkmate,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "cell", rename_all = "camelCase")]
pub enum ChessAction {
    Select(Coord2),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chess {
    board: Board,
    to_move: Color,
    selected: Option<Coord2>,
    status: Status,
    winner: Option<Color>,
    rule: MateRule,
}

impl Chess {
    pub fn new(rule: MateRule) -> Self {
        Self::from_board(initial_board(), Color::White, rule)
    }

    pub fn from_board(board: Board, to_move: Color, rule: MateRule) -> Self {
        Self {
            board,
            to_move,
            selected: None,
            status: Status::Active,
            winner: None,
            rule,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn to_move(&self) -> Color {
        self.to_move
    }

    pub fn selected(&self) -> Option<Coord2> {
        self.selected
    }

    pub fn winner(&self) -> Option<Color> {
        self.winner
    }

    pub fn piece_at(&self, coords: Coord2) -> Option<ChessPiece> {
        self.board.get(coords.to_nd_index()).copied().flatten()
    }

    /// Select an own piece, or move the selected one to `coords`.
    pub fn select(&mut self, coords: Coord2) -> Result<Transition> {
        check_active(self.status)?;
        if !in_bounds(coords, (BOARD_SIZE, BOARD_SIZE)) {
            return Err(GameError::InvalidCoords);
        }

        match self.selected {
            Some(from) => match self.move_piece(from, coords) {
                Ok(transition) => Ok(transition),
                Err(GameError::IllegalMove) => {
                    self.selected = None;
                    Ok(Transition::Changed)
                }
                Err(err) => Err(err),
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
        if piece.color != self.to_move || !is_legal_move(&self.board, from, to) {
            return Err(GameError::IllegalMove);
        }

        let next = moved(&self.board, from, to);
        if self.rule == MateRule::Checkmate && is_in_check(&next, piece.color) {
            return Err(GameError::IllegalMove);
        }

        self.board = next;
        self.selected = None;
        let mover = self.to_move;
        self.to_move = mover.opponent();
        log::debug!("{:?} {:?} {:?} -> {:?}", mover, piece.kind, from, to);

        let in_check = is_in_check(&self.board, self.to_move);
        match self.rule {
            MateRule::CheckEndsGame if in_check => self.finish(Some(mover)),
            MateRule::Checkmate if !has_any_move(&self.board, self.to_move) => {
                self.finish(in_check.then_some(mover))
            }
            _ => Ok(Transition::Changed),
        }
    }

    fn finish(&mut self, winner: Option<Color>) -> Result<Transition> {
        self.winner = winner;
        self.status = if winner.is_some() {
            Status::Won
        } else {
            Status::Draw
        };
        log::debug!("Chess ended, winner {:?}", winner);
        Ok(Transition::Finished)
    }
}

pub fn initial_board() -> Board {
    let mut board: Board = Array2::default((BOARD_SIZE.into(), BOARD_SIZE.into()));
    for (col, &kind) in BACK_ROW.iter().enumerate() {
        board[[0, col]] = Some(ChessPiece::new(kind, Color::Black));
        board[[1, col]] = Some(ChessPiece::new(PieceType::Pawn, Color::Black));
        board[[6, col]] = Some(ChessPiece::new(PieceType::Pawn, Color::White));
        board[[7, col]] = Some(ChessPiece::new(kind, Color::White));
    }
    board
}

/// Movement shape check for the piece on `from`; ignores whose turn it is and king safety.
pub fn is_legal_move(board: &Board, from: Coord2, to: Coord2) -> bool {
    let Some(piece) = board.get(from.to_nd_index()).copied().flatten() else {
        return false;
    };
    if from == to || board.get(to.to_nd_index()).is_none() {
        return false;
    }
    if let Some(target) = board[to.to_nd_index()] {
        if target.color == piece.color {
            return false;
        }
    }

    let d_row = i16::from(to.0) - i16::from(from.0);
    let d_col = i16::from(to.1) - i16::from(from.1);

    match piece.kind {
        PieceType::Pawn => is_pawn_move(board, piece.color, from, to, d_row, d_col),
        PieceType::Rook => (d_row == 0 || d_col == 0) && path_clear(board, from, to),
        PieceType::Bishop => d_row.abs() == d_col.abs() && path_clear(board, from, to),
        PieceType::Queen => {
            (d_row == 0 || d_col == 0 || d_row.abs() == d_col.abs()) && path_clear(board, from, to)
        }
        PieceType::Knight => matches!((d_row.abs(), d_col.abs()), (1, 2) | (2, 1)),
        PieceType::King => d_row.abs() <= 1 && d_col.abs() <= 1,
    }
}

fn is_pawn_move(board: &Board, color: Color, from: Coord2, to: Coord2, d_row: i16, d_col: i16) -> bool {
    let forward = i16::from(color.forward());
    let target = board[to.to_nd_index()];

    if d_col == 0 && target.is_none() {
        if d_row == forward {
            return true;
        }
        if from.0 == color.pawn_row() && d_row == 2 * forward {
            let between = (from.0.wrapping_add_signed(color.forward()), from.1);
            return board[between.to_nd_index()].is_none();
        }
        return false;
    }

    d_col.abs() == 1 && d_row == forward && target.is_some()
}

/// Every cell strictly between `from` and `to` on a straight or diagonal line is empty.
fn path_clear(board: &Board, from: Coord2, to: Coord2) -> bool {
    let step = (
        (i16::from(to.0) - i16::from(from.0)).signum() as i8,
        (i16::from(to.1) - i16::from(from.1)).signum() as i8,
    );
    let mut cursor = from;
    loop {
        let Some(next) = offset(cursor, step, (BOARD_SIZE, BOARD_SIZE)) else {
            return false;
        };
        if next == to {
            return true;
        }
        if board[next.to_nd_index()].is_some() {
            return false;
        }
        cursor = next;
    }
}

/// Board after relocating `from` to `to`, promoting pawns on the last row.
fn moved(board: &Board, from: Coord2, to: Coord2) -> Board {
    let mut next = board.clone();
    let piece = next[from.to_nd_index()].take().map(|piece| {
        if piece.kind == PieceType::Pawn && to.0 == piece.color.last_row() {
            ChessPiece::new(PieceType::Queen, piece.color)
        } else {
            piece
        }
    });
    next[to.to_nd_index()] = piece;
    next
}

fn squares() -> impl Iterator<Item = Coord2> {
    (0..BOARD_SIZE).flat_map(|row| (0..BOARD_SIZE).map(move |col| (row, col)))
}

pub fn is_in_check(board: &Board, color: Color) -> bool {
    let king = squares().find(|&coords| {
        board[coords.to_nd_index()] == Some(ChessPiece::new(PieceType::King, color))
    });
    let Some(king) = king else {
        return false;
    };

    squares().any(|coords| {
        matches!(board[coords.to_nd_index()], Some(piece) if piece.color != color)
            && is_legal_move(board, coords, king)
    })
}

/// Whether `color` has any move that does not leave its own king in check.
pub fn has_any_move(board: &Board, color: Color) -> bool {
    squares()
        .filter(|&from| matches!(board[from.to_nd_index()], Some(piece) if piece.color == color))
        .any(|from| {
            squares().any(|to| {
                is_legal_move(board, from, to) && !is_in_check(&moved(board, from, to), color)
            })
        })
}

impl Engine for Chess {
    type Action = ChessAction;

    fn kind(&self) -> GameKind {
        GameKind::Chess
    }

    fn status(&self) -> Status {
        self.status
    }

    fn apply(&mut self, action: Self::Action) -> Result<Transition> {
        match action {
            ChessAction::Select(coords) => self.select(coords),
        }
    }

    fn summary(&self, _elapsed_secs: u32) -> Summary {
        Summary::head_to_head(self.winner.map(Color::seat), 2)
    }
}
