use core::time::Duration;
use rand::prelude::*;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use super::physics::*;
use crate::*;

pub const BIRD_X: f32 = 150.0;
pub const BIRD_SIZE: f32 = 30.0;
pub const GRAVITY: f32 = 0.8;
pub const FLAP_VELOCITY: f32 = -15.0;
pub const PIPE_WIDTH: f32 = 80.0;
pub const PIPE_GAP: f32 = 200.0;
pub const PIPE_SPEED: f32 = 3.0;
pub const PIPE_SPACING: f32 = 300.0;
const MIN_TOP: f32 = 50.0;
const MAX_TOP: f32 = FIELD_HEIGHT - PIPE_GAP - 50.0;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FlappyAction {
    Flap,
    TogglePause,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bird {
    pub y: f32,
    pub velocity: f32,
}

impl Bird {
    pub fn rect(&self) -> Rect {
        Rect::new(BIRD_X, self.y, BIRD_SIZE, BIRD_SIZE)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pipe {
    pub x: f32,
    pub top_height: f32,
    pub passed: bool,
}

impl Pipe {
    pub fn top(&self) -> Rect {
        Rect::new(self.x, 0.0, PIPE_WIDTH, self.top_height)
    }

    pub fn bottom(&self) -> Rect {
        let y = self.top_height + PIPE_GAP;
        Rect::new(self.x, y, PIPE_WIDTH, FIELD_HEIGHT - y)
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct Flappy {
    bird: Bird,
    pipes: Vec<Pipe>,
    score: u32,
    /// Highest score reached in this session.
    best: u32,
    paused: bool,
    status: Status,
    #[serde(skip)]
    rng: SmallRng,
}

impl Flappy {
    pub fn new(seed: u64) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let first = Pipe {
            x: FIELD_WIDTH,
            top_height: rng.gen_range(MIN_TOP..MAX_TOP),
            passed: false,
        };
        Self {
            bird: Bird {
                y: FIELD_HEIGHT / 2.0,
                velocity: 0.0,
            },
            pipes: vec![first],
            score: 0,
            best: 0,
            paused: false,
            status: Status::Active,
            rng,
        }
    }

    pub fn bird(&self) -> &Bird {
        &self.bird
    }

    pub fn pipes(&self) -> &[Pipe] {
        &self.pipes
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn best(&self) -> u32 {
        self.best
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn flap(&mut self) -> Result<Transition> {
        check_active(self.status)?;
        if self.paused {
            return Err(GameError::Paused);
        }
        self.bird.velocity = FLAP_VELOCITY;
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

        self.bird.velocity += GRAVITY;
        self.bird.y += self.bird.velocity;

        for pipe in &mut self.pipes {
            pipe.x -= PIPE_SPEED;
        }
        self.pipes.retain(|pipe| pipe.x + PIPE_WIDTH > 0.0);

        let last_x = self.pipes.last().map(|pipe| pipe.x);
        if last_x.is_none_or(|x| x < FIELD_WIDTH - PIPE_SPACING) {
            let pipe = Pipe {
                x: last_x.map_or(FIELD_WIDTH, |x| x + PIPE_SPACING),
                top_height: self.rng.gen_range(MIN_TOP..MAX_TOP),
                passed: false,
            };
            self.pipes.push(pipe);
        }

        for pipe in self.pipes.iter_mut().filter(|pipe| !pipe.passed) {
            if pipe.x + PIPE_WIDTH < BIRD_X {
                pipe.passed = true;
                self.score += 1;
            }
        }

        let bird = self.bird.rect();
        let crashed = bird.y < 0.0
            || bird.bottom() > FIELD_HEIGHT
            || self
                .pipes
                .iter()
                .any(|pipe| bird.intersects(&pipe.top()) || bird.intersects(&pipe.bottom()));
        if crashed {
            log::debug!("Bird crashed with {} pipes passed", self.score);
            self.best = self.best.max(self.score);
            self.status = Status::Lost;
            return Ok(Transition::Finished);
        }

        Ok(Transition::Changed)
    }
}

impl Engine for Flappy {
    type Action = FlappyAction;

    fn kind(&self) -> GameKind {
        GameKind::Flappy
    }

    fn status(&self) -> Status {
        self.status
    }

    fn apply(&mut self, action: Self::Action) -> Result<Transition> {
        match action {
            FlappyAction::Flap => self.flap(),
            FlappyAction::TogglePause => self.toggle_pause(),
        }
    }

    fn tick(&mut self) -> Result<Transition> {
        self.step()
    }

    fn tick_period(&self) -> Option<Duration> {
        Some(FRAME)
    }

    fn summary(&self, _elapsed_secs: u32) -> Summary {
        Summary::solo(self.score, self.score > 0)
    }

    fn carry_over(&mut self, previous: &Self) {
        self.best = self.best.max(previous.best);
    }
}
