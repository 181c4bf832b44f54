use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

pub use engine::*;
pub use error::*;
pub use games::*;
pub use registry::*;
pub use results::*;
pub use scheduler::*;
pub use session::*;
pub use types::*;

mod engine;
mod error;
pub mod games;
mod registry;
mod results;
mod scheduler;
mod session;
mod types;

/// Identifier of each game in the collection, also used as the stored `gameType`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameKind {
    TicTacToe,
    Snake,
    Tetris,
    Puzzle,
    Memory,
    Chess,
    Checkers,
    Sudoku,
    Breakout,
    Pong,
    Minesweeper,
    Hangman,
    Wordle,
    Flappy,
}

/// Catalogue entry shown on the game picker.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameInfo {
    #[serde(rename = "type")]
    pub kind: GameKind,
    pub name: &'static str,
    pub description: &'static str,
    pub min_players: usize,
    pub max_players: usize,
    pub is_multiplayer: bool,
    pub icon: &'static str,
}

impl GameInfo {
    pub fn route(&self) -> String {
        format!("/games/{}", self.kind.id())
    }

    pub fn accepts_players(&self, count: usize) -> bool {
        (self.min_players..=self.max_players).contains(&count)
    }
}

impl GameKind {
    pub const ALL: [GameKind; 14] = [
        GameKind::TicTacToe,
        GameKind::Snake,
        GameKind::Tetris,
        GameKind::Puzzle,
        GameKind::Memory,
        GameKind::Chess,
        GameKind::Checkers,
        GameKind::Sudoku,
        GameKind::Breakout,
        GameKind::Pong,
        GameKind::Minesweeper,
        GameKind::Hangman,
        GameKind::Wordle,
        GameKind::Flappy,
    ];

    pub const fn id(self) -> &'static str {
        match self {
            Self::TicTacToe => "tictactoe",
            Self::Snake => "snake",
            Self::Tetris => "tetris",
            Self::Puzzle => "puzzle",
            Self::Memory => "memory",
            Self::Chess => "chess",
            Self::Checkers => "checkers",
            Self::Sudoku => "sudoku",
            Self::Breakout => "breakout",
            Self::Pong => "pong",
            Self::Minesweeper => "minesweeper",
            Self::Hangman => "hangman",
            Self::Wordle => "wordle",
            Self::Flappy => "flappy",
        }
    }

    pub const fn info(self) -> GameInfo {
        const fn entry(
            kind: GameKind,
            name: &'static str,
            description: &'static str,
            (min_players, max_players): (usize, usize),
            icon: &'static str,
        ) -> GameInfo {
            GameInfo {
                kind,
                name,
                description,
                min_players,
                max_players,
                is_multiplayer: max_players > 1,
                icon,
            }
        }

        match self {
            Self::TicTacToe => entry(self, "Tic Tac Toe", "Classic X and O game for two players", (2, 2), "❌"),
            Self::Snake => entry(self, "Snake", "Grow your snake by eating food", (1, 1), "🐍"),
            Self::Tetris => entry(self, "Tetris", "Stack falling blocks to clear lines", (1, 1), "🧱"),
            Self::Puzzle => entry(self, "Sliding Puzzle", "Arrange tiles in correct order", (1, 1), "🧩"),
            Self::Memory => entry(self, "Memory Match", "Find matching pairs of cards", (1, 4), "🧠"),
            Self::Chess => entry(self, "Chess", "Strategic board game for two players", (2, 2), "♟️"),
            Self::Checkers => entry(self, "Checkers", "Classic checkers game with jumping moves", (2, 2), "🔴"),
            Self::Sudoku => entry(self, "Sudoku", "Fill the grid with numbers following rules", (1, 1), "🔢"),
            Self::Breakout => entry(self, "Breakout", "Break all the bricks with your paddle", (1, 1), "🏓"),
            Self::Pong => entry(self, "Pong", "Classic two-player paddle game", (2, 2), "🏓"),
            Self::Minesweeper => entry(self, "Minesweeper", "Find all mines without detonating them", (1, 1), "💣"),
            Self::Hangman => entry(self, "Hangman", "Guess the word before the hangman is complete", (1, 1), "🪢"),
            Self::Wordle => entry(self, "Wordle", "Guess the five-letter word in six tries", (1, 1), "📝"),
            Self::Flappy => entry(self, "Flappy Bird", "Navigate through pipes without hitting them", (1, 1), "🐦"),
        }
    }
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for GameKind {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.id() == s)
            .ok_or(GameError::InvalidInput)
    }
}
