use core::time::Duration;
use rand::prelude::*;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::*;

pub const BOARD_SIZE: Coord = 20;
pub const START: Coord2 = (10, 10);
pub const FIRST_FOOD: Coord2 = (5, 5);
pub const FOOD_POINTS: u32 = 10;
const TICK: Duration = Duration::from_millis(150);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// `(row, col)` displacement.
    pub const fn delta(self) -> (i8, i8) {
        match self {
            Self::Up => (-1, 0),
            Self::Down => (1, 0),
            Self::Left => (0, -1),
            Self::Right => (0, 1),
        }
    }

    pub const fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "direction", rename_all = "camelCase")]
pub enum SnakeAction {
    Turn(Direction),
    TogglePause,
}

#[derive(Clone, Debug, Serialize)]
pub struct Snake {
    /// Head first.
    body: VecDeque<Coord2>,
    heading: Direction,
    queued: Direction,
    food: Coord2,
    score: u32,
    paused: bool,
    status: Status,
    #[serde(skip)]
    rng: SmallRng,
}

impl Snake {
    pub fn new(seed: u64) -> Self {
        Self {
            body: VecDeque::from([START]),
            heading: Direction::Right,
            queued: Direction::Right,
            food: FIRST_FOOD,
            score: 0,
            paused: false,
            status: Status::Active,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn body(&self) -> impl Iterator<Item = Coord2> + '_ {
        self.body.iter().copied()
    }

    pub fn head(&self) -> Coord2 {
        self.body.front().copied().unwrap_or(START)
    }

    pub fn food(&self) -> Coord2 {
        self.food
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn heading(&self) -> Direction {
        self.heading
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Queue a turn for the next step. Turning back onto the neck is ignored.
    pub fn turn(&mut self, direction: Direction) -> Result<Transition> {
        check_active(self.status)?;
        if self.paused {
            return Err(GameError::Paused);
        }

        // compared with the direction actually moved, so two quick turns cannot reverse
        if direction == self.heading.opposite() || direction == self.queued {
            return Ok(Transition::NoChange);
        }
        self.queued = direction;
        Ok(Transition::Changed)
    }

    pub fn toggle_pause(&mut self) -> Result<Transition> {
        check_active(self.status)?;
        self.paused = !self.paused;
        Ok(Transition::Changed)
    }

    pub fn step(&mut self) -> Result<Transition> {
        check_active(self.status)?;
        if self.paused {
            return Ok(Transition::NoChange);
        }

        self.heading = self.queued;
        let Some(next) = offset(self.head(), self.heading.delta(), (BOARD_SIZE, BOARD_SIZE)) else {
            log::debug!("Snake hit the wall, score {}", self.score);
            self.status = Status::Lost;
            return Ok(Transition::Finished);
        };

        let eating = next == self.food;
        let tail = self.body.back().copied();
        let blocked = self
            .body
            .iter()
            .any(|&segment| segment == next && (eating || Some(segment) != tail));
        if blocked {
            log::debug!("Snake bit itself, score {}", self.score);
            self.status = Status::Lost;
            return Ok(Transition::Finished);
        }

        self.body.push_front(next);
        if eating {
            self.score += FOOD_POINTS;
            match self.place_food() {
                Some(food) => self.food = food,
                None => {
                    log::debug!("Snake filled the board");
                    self.status = Status::Won;
                    return Ok(Transition::Finished);
                }
            }
        } else {
            self.body.pop_back();
        }

        Ok(Transition::Changed)
    }

    fn place_food(&mut self) -> Option<Coord2> {
        let free: Vec<Coord2> = (0..BOARD_SIZE)
            .flat_map(|row| (0..BOARD_SIZE).map(move |col| (row, col)))
            .filter(|cell| !self.body.contains(cell))
            .collect();
        free.choose(&mut self.rng).copied()
    }
}

impl Engine for Snake {
    type Action = SnakeAction;

    fn kind(&self) -> GameKind {
        GameKind::Snake
    }

    fn status(&self) -> Status {
        self.status
    }

    fn apply(&mut self, action: Self::Action) -> Result<Transition> {
        match action {
            SnakeAction::Turn(direction) => self.turn(direction),
            SnakeAction::TogglePause => self.toggle_pause(),
        }
    }

    fn tick(&mut self) -> Result<Transition> {
        self.step()
    }

    fn tick_period(&self) -> Option<Duration> {
        Some(TICK)
    }

    fn summary(&self, _elapsed_secs: u32) -> Summary {
        Summary::solo(self.score, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moves_right_from_start() {
        let mut game = Snake::new(1);
        assert_eq!(game.step().unwrap(), Transition::Changed);
        assert_eq!(game.head(), (10, 11));
        assert_eq!(game.body().count(), 1);
    }

    #[test]
    fn reversal_is_ignored() {
        let mut game = Snake::new(1);
        assert_eq!(game.turn(Direction::Left).unwrap(), Transition::NoChange);
        game.step().unwrap();
        assert_eq!(game.heading(), Direction::Right);
    }

    #[test]
    fn quick_double_turn_cannot_reverse() {
        let mut game = Snake::new(1);
        game.turn(Direction::Up).unwrap();
        // still heading right until the next step
        assert_eq!(game.turn(Direction::Left).unwrap(), Transition::NoChange);
        game.step().unwrap();
        assert_eq!(game.head(), (9, 10));
    }

    #[test]
    fn eating_grows_and_scores() {
        let mut game = Snake::new(3);
        game.turn(Direction::Up).unwrap();
        for _ in 0..5 {
            game.step().unwrap();
        }
        game.turn(Direction::Left).unwrap();
        for _ in 0..5 {
            game.step().unwrap();
        }
        assert_eq!(game.head(), FIRST_FOOD);
        assert_eq!(game.score(), FOOD_POINTS);
        assert_eq!(game.body().count(), 2);
        assert!(!game.body().any(|segment| segment == game.food()));
    }

    #[test]
    fn wall_ends_game() {
        let mut game = Snake::new(1);
        for _ in 0..9 {
            assert_eq!(game.step().unwrap(), Transition::Changed);
        }
        assert_eq!(game.step().unwrap(), Transition::Finished);
        assert_eq!(game.status(), Status::Lost);
        assert_eq!(game.step(), Err(GameError::AlreadyEnded));
        assert_eq!(game.summary(3).winner, None);
    }

    #[test]
    fn pause_suspends_steps_and_turns() {
        let mut game = Snake::new(1);
        game.toggle_pause().unwrap();
        assert_eq!(game.step().unwrap(), Transition::NoChange);
        assert_eq!(game.head(), START);
        assert_eq!(game.turn(Direction::Up), Err(GameError::Paused));
        game.toggle_pause().unwrap();
        assert_eq!(game.step().unwrap(), Transition::Changed);
    }
}
