use ndarray::{Array2, array, s};
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

impl PieceKind {
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
    ];

    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    /// Spawn orientation, `true` marks a filled cell.
    pub fn shape(self) -> Array2<bool> {
        let cells = match self {
            Self::I => array![[1, 1, 1, 1]],
            Self::O => array![[1, 1], [1, 1]],
            Self::T => array![[0, 1, 0], [1, 1, 1]],
            Self::S => array![[0, 1, 1], [1, 1, 0]],
            Self::Z => array![[1, 1, 0], [0, 1, 1]],
            Self::J => array![[1, 0, 0], [1, 1, 1]],
            Self::L => array![[0, 0, 1], [1, 1, 1]],
        };
        cells.mapv(|cell: u8| cell == 1)
    }
}

/// Falling piece. The origin is signed since cells may sit above the top row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
    pub kind: PieceKind,
    pub shape: Array2<bool>,
    /// `(row, col)` of the shape's top-left corner.
    pub origin: (i16, i16),
    /// Quarter turns applied, `0..4`.
    pub rotation: u8,
}

impl Piece {
    pub fn spawn(kind: PieceKind, board_width: i16) -> Self {
        Self {
            kind,
            shape: kind.shape(),
            origin: (0, board_width / 2 - 1),
            rotation: 0,
        }
    }

    pub fn shifted(&self, d_row: i16, d_col: i16) -> Self {
        Self {
            origin: (self.origin.0 + d_row, self.origin.1 + d_col),
            ..self.clone()
        }
    }

    pub fn rotated_clockwise(&self) -> Self {
        Self {
            shape: self.shape.t().slice(s![.., ..;-1]).to_owned(),
            rotation: (self.rotation + 1) % 4,
            ..self.clone()
        }
    }

    /// Board positions of every filled cell, including ones above the board.
    pub fn cells(&self) -> impl Iterator<Item = (i16, i16)> + '_ {
        let (row, col) = self.origin;
        self.shape
            .indexed_iter()
            .filter(|&(_, &filled)| filled)
            .map(move |((r, c), _)| (row + r as i16, col + c as i16))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotating_t_clockwise() {
        let piece = Piece::spawn(PieceKind::T, 10).rotated_clockwise();
        assert_eq!(
            piece.shape,
            array![[1, 0], [1, 1], [1, 0]].mapv(|cell: u8| cell == 1)
        );
        assert_eq!(piece.rotation, 1);
    }

    #[test]
    fn four_rotations_restore_shape() {
        for kind in PieceKind::ALL {
            let spawned = Piece::spawn(kind, 10);
            let mut piece = spawned.clone();
            for _ in 0..4 {
                piece = piece.rotated_clockwise();
            }
            assert_eq!(piece, spawned);
        }
    }

    #[test]
    fn every_piece_has_four_cells() {
        for kind in PieceKind::ALL {
            assert_eq!(Piece::spawn(kind, 10).cells().count(), 4);
        }
    }

    #[test]
    fn spawn_column_is_left_of_center() {
        assert_eq!(Piece::spawn(PieceKind::O, 10).origin, (0, 4));
    }
}
