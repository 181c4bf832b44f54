//! Shared 2D geometry for the arcade games. Units are canvas pixels, y grows downwards.

use core::time::Duration;
use serde::{Deserialize, Serialize};

pub const FIELD_WIDTH: f32 = 800.0;
pub const FIELD_HEIGHT: f32 = 600.0;
/// Fixed physics step.
pub const FRAME: Duration = Duration::from_millis(16);

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl core::ops::Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Self) -> Self::Output {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl core::ops::AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

/// Axis-aligned rectangle anchored at its top-left corner.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
}

impl Ball {
    pub fn advance(&mut self) {
        self.pos += self.vel;
    }

    /// Circle-vs-rectangle overlap, using the closest point of `rect` to the center.
    pub fn hits(&self, rect: &Rect) -> bool {
        let closest_x = self.pos.x.clamp(rect.x, rect.right());
        let closest_y = self.pos.y.clamp(rect.y, rect.bottom());
        let (dx, dy) = (self.pos.x - closest_x, self.pos.y - closest_y);
        dx * dx + dy * dy <= self.radius * self.radius
    }
}

/// Where `at` lies along a paddle spanning `start..start + length`, from `-1` to `1`.
pub fn paddle_offset(at: f32, start: f32, length: f32) -> f32 {
    ((at - start) / length * 2.0 - 1.0).clamp(-1.0, 1.0)
}
