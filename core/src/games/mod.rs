//! Rule engines, one module per game.
//!
//! Only the engine, its action and its configuration are re-exported; board helpers and
//! tuning constants stay under the game's module path.

pub use breakout::{Breakout, BreakoutAction};
pub use checkers::{Checkers, CheckersAction};
pub use chess::{Chess, ChessAction, MateRule};
pub use flappy::{Flappy, FlappyAction};
pub use hangman::{Category, Hangman, HangmanAction};
pub use memory::{MemoryAction, MemoryConfig, MemoryMatch};
pub use minesweeper::{Difficulty, Minesweeper, MinesweeperAction};
pub use pong::{Pong, PongAction, PongKeys};
pub use puzzle::{PuzzleAction, SlidingPuzzle};
pub use snake::{Snake, SnakeAction};
pub use sudoku::{Sudoku, SudokuAction, SudokuConfig};
pub use tetris::{Tetris, TetrisAction};
pub use tictactoe::{TicTacToe, TicTacToeAction};
pub use wordle::{Wordle, WordleAction};

pub mod breakout;
pub mod checkers;
pub mod chess;
pub mod flappy;
pub mod hangman;
pub mod memory;
pub mod minesweeper;
pub mod physics;
pub mod pong;
pub mod puzzle;
pub mod snake;
pub mod sudoku;
pub mod tetris;
pub mod tictactoe;
pub mod wordle;
