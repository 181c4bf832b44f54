use core::time::Duration;
use serde::{Deserialize, Serialize};

use crate::*;

/// Knobs used when building an engine, each game reads the ones it cares about.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameSetup {
    pub seed: u64,
    pub difficulty: Difficulty,
    pub mate_rule: MateRule,
    pub sudoku: SudokuConfig,
    pub category: Category,
}

impl GameSetup {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Default::default()
        }
    }
}

macro_rules! any_engine {
    ($($kind:ident($engine:ty, $action:ty)),* $(,)?) => {
        /// Any of the games, tagged by game id.
        #[derive(Clone, Debug, Serialize)]
        #[serde(tag = "game", content = "state", rename_all = "lowercase")]
        pub enum AnyEngine {
            $($kind($engine),)*
        }

        /// Action for any of the games, tagged by game id.
        #[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
        #[serde(tag = "game", content = "action", rename_all = "lowercase")]
        pub enum AnyAction {
            $($kind($action),)*
        }

        impl AnyAction {
            pub fn kind(&self) -> GameKind {
                match self {
                    $(Self::$kind(_) => GameKind::$kind,)*
                }
            }
        }

        $(
            impl From<$engine> for AnyEngine {
                fn from(engine: $engine) -> Self {
                    Self::$kind(engine)
                }
            }

            impl From<$action> for AnyAction {
                fn from(action: $action) -> Self {
                    Self::$kind(action)
                }
            }
        )*

        impl Engine for AnyEngine {
            type Action = AnyAction;

            fn kind(&self) -> GameKind {
                match self {
                    $(Self::$kind(engine) => engine.kind(),)*
                }
            }

            fn status(&self) -> Status {
                match self {
                    $(Self::$kind(engine) => engine.status(),)*
                }
            }

            fn apply(&mut self, action: AnyAction) -> Result<Transition> {
                match (self, action) {
                    $((Self::$kind(engine), AnyAction::$kind(action)) => engine.apply(action),)*
                    (engine, action) => {
                        log::debug!("{} action sent to {}", action.kind(), engine.kind());
                        Err(GameError::ActionMismatch)
                    }
                }
            }

            fn tick(&mut self) -> Result<Transition> {
                match self {
                    $(Self::$kind(engine) => engine.tick(),)*
                }
            }

            fn tick_period(&self) -> Option<Duration> {
                match self {
                    $(Self::$kind(engine) => engine.tick_period(),)*
                }
            }

            fn settle_delay(&self) -> Option<Duration> {
                match self {
                    $(Self::$kind(engine) => engine.settle_delay(),)*
                }
            }

            fn settle(&mut self) -> Result<Transition> {
                match self {
                    $(Self::$kind(engine) => engine.settle(),)*
                }
            }

            fn summary(&self, elapsed_secs: u32) -> Summary {
                match self {
                    $(Self::$kind(engine) => engine.summary(elapsed_secs),)*
                }
            }

            fn carry_over(&mut self, previous: &Self) {
                match (self, previous) {
                    $((Self::$kind(engine), Self::$kind(previous)) => engine.carry_over(previous),)*
                    _ => {}
                }
            }
        }
    };
}

any_engine! {
    TicTacToe(TicTacToe, TicTacToeAction),
    Snake(Snake, SnakeAction),
    Tetris(Tetris, TetrisAction),
    Puzzle(SlidingPuzzle, PuzzleAction),
    Memory(MemoryMatch, MemoryAction),
    Chess(Chess, ChessAction),
    Checkers(Checkers, CheckersAction),
    Sudoku(Sudoku, SudokuAction),
    Breakout(Breakout, BreakoutAction),
    Pong(Pong, PongAction),
    Minesweeper(Minesweeper, MinesweeperAction),
    Hangman(Hangman, HangmanAction),
    Wordle(Wordle, WordleAction),
    Flappy(Flappy, FlappyAction),
}

impl AnyEngine {
    /// Builds a fresh engine for `kind`, checking the seat count against the catalogue.
    pub fn new(kind: GameKind, setup: &GameSetup, players: usize) -> Result<Self> {
        if !kind.info().accepts_players(players) {
            return Err(GameError::InvalidPlayers);
        }

        let seed = setup.seed;
        log::debug!("Creating {} for {} players with seed {}", kind, players, seed);
        let engine = match kind {
            GameKind::TicTacToe => TicTacToe::new().into(),
            GameKind::Snake => Snake::new(seed).into(),
            GameKind::Tetris => Tetris::new(seed).into(),
            GameKind::Puzzle => SlidingPuzzle::new(seed).into(),
            GameKind::Memory => MemoryMatch::new(MemoryConfig::new(players), seed).into(),
            GameKind::Chess => Chess::new(setup.mate_rule).into(),
            GameKind::Checkers => Checkers::new().into(),
            GameKind::Sudoku => Sudoku::new(setup.sudoku, seed).into(),
            GameKind::Breakout => Breakout::new().into(),
            GameKind::Pong => Pong::new(seed).into(),
            GameKind::Minesweeper => Minesweeper::random(setup.difficulty, seed).into(),
            GameKind::Hangman => Hangman::new(setup.category, seed).into(),
            GameKind::Wordle => Wordle::new(seed).into(),
            GameKind::Flappy => Flappy::new(seed).into(),
        };
        Ok(engine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seats(kind: GameKind) -> usize {
        kind.info().min_players
    }

    #[test]
    fn factory_builds_every_kind() {
        let setup = GameSetup::with_seed(9);
        for kind in GameKind::ALL {
            let engine = AnyEngine::new(kind, &setup, seats(kind)).unwrap();
            assert_eq!(engine.kind(), kind);
            assert_eq!(engine.status(), Status::Active);
        }
    }

    #[test]
    fn factory_rejects_wrong_player_count() {
        let setup = GameSetup::default();
        assert_eq!(
            AnyEngine::new(GameKind::Chess, &setup, 1).err(),
            Some(GameError::InvalidPlayers)
        );
        assert_eq!(
            AnyEngine::new(GameKind::Memory, &setup, 5).err(),
            Some(GameError::InvalidPlayers)
        );
    }

    #[test]
    fn continuous_games_have_tick_period() {
        let setup = GameSetup::default();
        for kind in GameKind::ALL {
            let engine = AnyEngine::new(kind, &setup, seats(kind)).unwrap();
            let continuous = matches!(
                kind,
                GameKind::Snake
                    | GameKind::Tetris
                    | GameKind::Breakout
                    | GameKind::Pong
                    | GameKind::Flappy
            );
            assert_eq!(engine.tick_period().is_some(), continuous, "{kind}");
        }
    }

    #[test]
    fn mismatched_action_is_rejected() {
        let mut engine = AnyEngine::from(TicTacToe::new());
        let action = AnyAction::from(WordleAction::Enter);
        assert_eq!(engine.apply(action), Err(GameError::ActionMismatch));
        assert_eq!(engine.apply(TicTacToeAction { cell: 4 }.into()), Ok(Transition::Changed));
    }

    #[test]
    fn actions_use_game_ids_on_the_wire() {
        let action: AnyAction =
            serde_json::from_str(r#"{"game":"tictactoe","action":{"cell":4}}"#).unwrap();
        assert_eq!(action, AnyAction::TicTacToe(TicTacToeAction { cell: 4 }));

        let json = serde_json::to_string(&AnyAction::from(TetrisAction::HardDrop)).unwrap();
        assert_eq!(json, r#"{"game":"tetris","action":{"type":"hardDrop"}}"#);
    }
}
