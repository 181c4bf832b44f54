use bitflags::bitflags;
use core::time::Duration;
use rand::prelude::*;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use super::physics::*;
use crate::*;

pub const PADDLE_WIDTH: f32 = 15.0;
pub const PADDLE_HEIGHT: f32 = 100.0;
pub const PADDLE_SPEED: f32 = 8.0;
pub const BALL_RADIUS: f32 = 8.0;
pub const BALL_SPEED: f32 = 6.0;
const MAX_DEFLECTION: f32 = 3.0;
pub const WINNING_SCORE: u32 = 11;

bitflags! {
    /// Keys currently held down.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct PongKeys: u8 {
        const LEFT_UP = 0b0001;
        const LEFT_DOWN = 0b0010;
        const RIGHT_UP = 0b0100;
        const RIGHT_DOWN = 0b1000;
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "keys", rename_all = "camelCase")]
pub enum PongAction {
    Press(PongKeys),
    Release(PongKeys),
    TogglePause,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Paddle {
    pub rect: Rect,
    pub score: u32,
}

impl Paddle {
    fn at(x: f32) -> Self {
        Self {
            rect: Rect::new(x, (FIELD_HEIGHT - PADDLE_HEIGHT) / 2.0, PADDLE_WIDTH, PADDLE_HEIGHT),
            score: 0,
        }
    }

    fn steer(&mut self, up: bool, down: bool) {
        let mut y = self.rect.y;
        if up {
            y -= PADDLE_SPEED;
        }
        if down {
            y += PADDLE_SPEED;
        }
        self.rect.y = y.clamp(0.0, FIELD_HEIGHT - self.rect.height);
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct Pong {
    ball: Ball,
    left: Paddle,
    right: Paddle,
    keys: PongKeys,
    paused: bool,
    status: Status,
    winner: Option<Seat>,
    #[serde(skip)]
    rng: SmallRng,
}

impl Pong {
    pub fn new(seed: u64) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        Self {
            ball: serve(&mut rng),
            left: Paddle::at(20.0),
            right: Paddle::at(FIELD_WIDTH - 20.0 - PADDLE_WIDTH),
            keys: PongKeys::empty(),
            paused: false,
            status: Status::Active,
            winner: None,
            rng,
        }
    }

    pub fn ball(&self) -> &Ball {
        &self.ball
    }

    pub fn left(&self) -> &Paddle {
        &self.left
    }

    pub fn right(&self) -> &Paddle {
        &self.right
    }

    pub fn keys(&self) -> PongKeys {
        self.keys
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn press(&mut self, keys: PongKeys, held: bool) -> Result<Transition> {
        check_active(self.status)?;
        let before = self.keys;
        self.keys.set(keys, held);
        Ok(Transition::from_changed(before != self.keys))
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

        if self.ball.pos.y <= radius {
            self.ball.vel.y = self.ball.vel.y.abs();
        } else if self.ball.pos.y >= FIELD_HEIGHT - radius {
            self.ball.vel.y = -self.ball.vel.y.abs();
        }

        if self.ball.vel.x < 0.0 && self.ball.hits(&self.left.rect) {
            self.deflect(self.left.rect);
        } else if self.ball.vel.x > 0.0 && self.ball.hits(&self.right.rect) {
            self.deflect(self.right.rect);
        }

        let scorer = if self.ball.pos.x < 0.0 {
            Some(1)
        } else if self.ball.pos.x > FIELD_WIDTH {
            Some(0)
        } else {
            None
        };
        if let Some(seat) = scorer {
            let paddle = if seat == 0 { &mut self.left } else { &mut self.right };
            paddle.score += 1;
            log::debug!("Point for seat {}, now {}", seat, paddle.score);
            if paddle.score >= WINNING_SCORE {
                self.winner = Some(seat);
                self.status = Status::Won;
                return Ok(Transition::Finished);
            }
            self.ball = serve(&mut self.rng);
        }

        let keys = self.keys;
        self.left
            .steer(keys.contains(PongKeys::LEFT_UP), keys.contains(PongKeys::LEFT_DOWN));
        self.right
            .steer(keys.contains(PongKeys::RIGHT_UP), keys.contains(PongKeys::RIGHT_DOWN));

        Ok(Transition::Changed)
    }

    fn deflect(&mut self, paddle: Rect) {
        self.ball.vel.x = -self.ball.vel.x;
        self.ball.vel.y = paddle_offset(self.ball.pos.y, paddle.y, paddle.height) * MAX_DEFLECTION;
    }
}

/// Ball from the center in a random diagonal direction.
fn serve<R: Rng>(rng: &mut R) -> Ball {
    let mut sign = || if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
    Ball {
        pos: Vec2::new(FIELD_WIDTH / 2.0, FIELD_HEIGHT / 2.0),
        vel: Vec2::new(BALL_SPEED * sign(), BALL_SPEED * sign()),
        radius: BALL_RADIUS,
    }
}

impl Engine for Pong {
    type Action = PongAction;

    fn kind(&self) -> GameKind {
        GameKind::Pong
    }

    fn status(&self) -> Status {
        self.status
    }

    fn apply(&mut self, action: Self::Action) -> Result<Transition> {
        match action {
            PongAction::Press(keys) => self.press(keys, true),
            PongAction::Release(keys) => self.press(keys, false),
            PongAction::TogglePause => self.toggle_pause(),
        }
    }

    fn tick(&mut self) -> Result<Transition> {
        self.step()
    }

    fn tick_period(&self) -> Option<Duration> {
        Some(FRAME)
    }

    fn summary(&self, _elapsed_secs: u32) -> Summary {
        Summary::head_to_head(self.winner, 2)
    }
}
