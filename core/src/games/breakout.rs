use core::time::Duration;
use serde::{Deserialize, Serialize};

use super::physics::*;
use crate::*;

pub const PADDLE_WIDTH: f32 = 100.0;
pub const PADDLE_HEIGHT: f32 = 20.0;
pub const PADDLE_Y: f32 = FIELD_HEIGHT - 40.0;
pub const BALL_RADIUS: f32 = 8.0;
pub const BRICK_ROWS: usize = 5;
pub const BRICK_COLS: usize = 10;
pub const BRICK_WIDTH: f32 = 80.0;
pub const BRICK_HEIGHT: f32 = 20.0;
pub const BRICK_PADDING: f32 = 2.0;
pub const BRICK_OFFSET_TOP: f32 = 50.0;
pub const BRICK_POINTS: u32 = 10;
pub const LIVES: u32 = 3;
const MAX_DEFLECTION: f32 = 4.0;
const LAUNCH: Vec2 = Vec2::new(4.0, -4.0);

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "x", rename_all = "camelCase")]
pub enum BreakoutAction {
    /// Center the paddle on `x`.
    MovePaddle(f32),
    TogglePause,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Brick {
    pub rect: Rect,
    pub is_destroyed: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Breakout {
    ball: Ball,
    paddle: Rect,
    bricks: Vec<Brick>,
    score: u32,
    lives: u32,
    paused: bool,
    status: Status,
}

impl Default for Breakout {
    fn default() -> Self {
        Self::new()
    }
}

impl Breakout {
    pub fn new() -> Self {
        Self {
            ball: launch(),
            paddle: Rect::new(
                (FIELD_WIDTH - PADDLE_WIDTH) / 2.0,
                PADDLE_Y,
                PADDLE_WIDTH,
                PADDLE_HEIGHT,
            ),
            bricks: wall(),
            score: 0,
            lives: LIVES,
            paused: false,
            status: Status::Active,
        }
    }

    pub fn ball(&self) -> &Ball {
        &self.ball
    }

    pub fn paddle(&self) -> &Rect {
        &self.paddle
    }

    pub fn bricks(&self) -> &[Brick] {
        &self.bricks
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn move_paddle(&mut self, center_x: f32) -> Result<Transition> {
        check_active(self.status)?;
        if self.paused {
            return Err(GameError::Paused);
        }
        if !center_x.is_finite() {
            return Err(GameError::InvalidInput);
        }
        let x = (center_x - self.paddle.width / 2.0).clamp(0.0, FIELD_WIDTH - self.paddle.width);
        let changed = x != self.paddle.x;
        self.paddle.x = x;
        Ok(Transition::from_changed(changed))
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

        self.ball.advance();
        let radius = self.ball.radius;

        if self.ball.pos.x <= radius {
            self.ball.vel.x = self.ball.vel.x.abs();
        } else if self.ball.pos.x >= FIELD_WIDTH - radius {
            self.ball.vel.x = -self.ball.vel.x.abs();
        }
        if self.ball.pos.y <= radius {
            self.ball.vel.y = self.ball.vel.y.abs();
        }

        if self.ball.vel.y > 0.0 && self.ball.hits(&self.paddle) {
            self.ball.vel.y = -self.ball.vel.y.abs();
            self.ball.vel.x =
                paddle_offset(self.ball.pos.x, self.paddle.x, self.paddle.width) * MAX_DEFLECTION;
        }

        // several bricks may break in one frame, the ball still bounces once
        let ball = self.ball;
        let mut bounced = false;
        for brick in self.bricks.iter_mut().filter(|brick| !brick.is_destroyed) {
            if ball.hits(&brick.rect) {
                brick.is_destroyed = true;
                self.score += BRICK_POINTS;
                bounced = true;
            }
        }
        if bounced {
            self.ball.vel.y = -self.ball.vel.y;
        }

        if self.bricks.iter().all(|brick| brick.is_destroyed) {
            log::debug!("Breakout cleared, score {}", self.score);
            self.status = Status::Won;
            return Ok(Transition::Finished);
        }

        if self.ball.pos.y >= FIELD_HEIGHT {
            self.lives -= 1;
            log::debug!("Ball lost, {} lives left", self.lives);
            if self.lives == 0 {
                self.status = Status::Lost;
                return Ok(Transition::Finished);
            }
            self.ball = launch();
        }

        Ok(Transition::Changed)
    }
}

fn launch() -> Ball {
    Ball {
        pos: Vec2::new(FIELD_WIDTH / 2.0, FIELD_HEIGHT - 100.0),
        vel: LAUNCH,
        radius: BALL_RADIUS,
    }
}

fn wall() -> Vec<Brick> {
    (0..BRICK_ROWS)
        .flat_map(|row| (0..BRICK_COLS).map(move |col| (row, col)))
        .map(|(row, col)| Brick {
            rect: Rect::new(
                col as f32 * (BRICK_WIDTH + BRICK_PADDING) + BRICK_PADDING,
                row as f32 * (BRICK_HEIGHT + BRICK_PADDING) + BRICK_PADDING + BRICK_OFFSET_TOP,
                BRICK_WIDTH,
                BRICK_HEIGHT,
            ),
            is_destroyed: false,
        })
        .collect()
}

impl Engine for Breakout {
    type Action = BreakoutAction;

    fn kind(&self) -> GameKind {
        GameKind::Breakout
    }

    fn status(&self) -> Status {
        self.status
    }

    fn apply(&mut self, action: Self::Action) -> Result<Transition> {
        match action {
            BreakoutAction::MovePaddle(x) => self.move_paddle(x),
            BreakoutAction::TogglePause => self.toggle_pause(),
        }
    }

    fn tick(&mut self) -> Result<Transition> {
        self.step()
    }

    fn tick_period(&self) -> Option<Duration> {
        Some(FRAME)
    }

    fn summary(&self, _elapsed_secs: u32) -> Summary {
        Summary::solo(self.score, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_full_wall() {
        let game = Breakout::new();
        assert_eq!(game.bricks().len(), 50);
        assert_eq!(game.bricks()[0].rect, Rect::new(2.0, 52.0, 80.0, 20.0));
        assert_eq!(game.bricks()[11].rect, Rect::new(84.0, 74.0, 80.0, 20.0));
        assert_eq!(game.lives(), 3);
    }

    #[test]
    fn paddle_is_clamped() {
        let mut game = Breakout::new();
        game.move_paddle(-50.0).unwrap();
        assert_eq!(game.paddle().x, 0.0);
        game.move_paddle(5000.0).unwrap();
        assert_eq!(game.paddle().x, 700.0);
        assert_eq!(game.move_paddle(f32::NAN), Err(GameError::InvalidInput));
    }

    #[test]
    fn brick_scores_once_and_bounces() {
        let mut game = Breakout::new();
        let target = game.bricks[45].rect;
        game.ball.pos = Vec2::new(target.x + 40.0, target.bottom() + 10.0);
        game.ball.vel = Vec2::new(0.0, -4.0);

        game.step().unwrap();
        assert!(game.bricks()[45].is_destroyed);
        assert_eq!(game.score(), BRICK_POINTS);
        assert!(game.ball().vel.y > 0.0);

        game.step().unwrap();
        assert_eq!(game.score(), BRICK_POINTS);
    }

    #[test]
    fn two_bricks_in_one_frame_bounce_once() {
        let mut game = Breakout::new();
        let left = game.bricks[45].rect;
        game.ball.pos = Vec2::new(left.right() + 1.0, left.bottom() + 8.0);
        game.ball.vel = Vec2::new(0.0, -4.0);

        game.step().unwrap();
        assert_eq!(game.score(), 2 * BRICK_POINTS);
        assert!(game.ball().vel.y > 0.0);
    }

    #[test]
    fn paddle_reaims_ball() {
        let mut game = Breakout::new();
        let paddle = *game.paddle();
        game.ball.pos = Vec2::new(paddle.x, paddle.y - 10.0);
        game.ball.vel = Vec2::new(0.0, 4.0);
        game.step().unwrap();
        assert_eq!(game.ball().vel, Vec2::new(-MAX_DEFLECTION, -4.0));
    }

    #[test]
    fn losing_last_life_ends_game() {
        let mut game = Breakout::new();
        game.lives = 1;
        game.ball.pos = Vec2::new(50.0, FIELD_HEIGHT - 2.0);
        game.ball.vel = Vec2::new(0.0, 4.0);
        assert_eq!(game.step().unwrap(), Transition::Finished);
        assert_eq!(game.status(), Status::Lost);
        assert_eq!(game.summary(0).winner, None);
    }

    #[test]
    fn missing_ball_costs_a_life_and_relaunches() {
        let mut game = Breakout::new();
        game.ball.pos = Vec2::new(50.0, FIELD_HEIGHT - 2.0);
        game.ball.vel = Vec2::new(0.0, 4.0);
        assert_eq!(game.step().unwrap(), Transition::Changed);
        assert_eq!(game.lives(), 2);
        assert_eq!(game.ball().pos, Vec2::new(400.0, 500.0));
    }
}
