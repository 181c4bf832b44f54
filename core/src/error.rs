use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Game already ended, no new moves are accepted")]
    AlreadyEnded,
    #[error("Move is not allowed by the rules")]
    IllegalMove,
    #[error("Cell cannot be selected")]
    NotSelectable,
    #[error("Input is not valid for this game")]
    InvalidInput,
    #[error("Game is paused")]
    Paused,
    #[error("Waiting for the previous move to resolve")]
    Pending,
    #[error("Action belongs to a different game")]
    ActionMismatch,
    #[error("Player list does not fit this game")]
    InvalidPlayers,
}

pub type Result<T> = core::result::Result<T, GameError>;
