use core::ops::BitOr;
use core::time::Duration;
use serde::{Deserialize, Serialize};

use crate::*;

/// Index of a participant within the session's player list.
pub type Seat = usize;

/// Lifecycle of every engine.
///
/// Valid transitions:
/// - Active -> Won
/// - Active -> Lost
/// - Active -> Draw
///
/// Two-player games report `Won` together with the winning seat in [`Summary`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Active,
    Won,
    Lost,
    Draw,
}

impl Status {
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost | Self::Draw)
    }
}

impl Default for Status {
    fn default() -> Self {
        Self::Active
    }
}

/// Outcome of feeding one action or tick into an engine.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Transition {
    NoChange,
    Changed,
    Finished,
}

impl Transition {
    /// Whether this outcome could have caused an update to the game
    pub const fn has_update(self) -> bool {
        match self {
            Self::NoChange => false,
            Self::Changed => true,
            Self::Finished => true,
        }
    }

    pub const fn from_changed(changed: bool) -> Self {
        if changed { Self::Changed } else { Self::NoChange }
    }
}

/// Used to merge outcomes of compound steps
impl BitOr for Transition {
    type Output = Transition;

    fn bitor(self, rhs: Self) -> Self::Output {
        use Transition::*;
        match (self, rhs) {
            (Finished, _) => Finished,
            (_, Finished) => Finished,
            (Changed, _) => Changed,
            (_, Changed) => Changed,
            (NoChange, NoChange) => NoChange,
        }
    }
}

/// Game-specific outcome used to build a [`GameResult`](crate::GameResult).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    /// Winning seat, `None` for draws and for single-player games that do not name a winner.
    pub winner: Option<Seat>,
    /// Points earned in this game, one entry per seat.
    pub points: Vec<u32>,
    pub score: Option<u32>,
    pub moves: Option<u32>,
    pub mistakes: Option<u32>,
}

impl Summary {
    /// Two-player convention: the winner earns one point.
    pub fn head_to_head(winner: Option<Seat>, seats: usize) -> Self {
        Self {
            winner,
            points: (0..seats).map(|seat| u32::from(winner == Some(seat))).collect(),
            ..Default::default()
        }
    }

    /// Single-player convention: the game score is the player's points.
    pub fn solo(score: u32, winner: bool) -> Self {
        Self {
            winner: winner.then_some(0),
            points: vec![score],
            score: Some(score),
            ..Default::default()
        }
    }
}

/// Uniform contract implemented by every game.
///
/// An `Err` from [`Engine::apply`], [`Engine::tick`] or [`Engine::settle`] always leaves the
/// engine untouched.
pub trait Engine {
    type Action;

    fn kind(&self) -> GameKind;

    fn status(&self) -> Status;

    fn apply(&mut self, action: Self::Action) -> Result<Transition>;

    /// Advance a continuous game by one fixed step.
    fn tick(&mut self) -> Result<Transition> {
        Ok(Transition::NoChange)
    }

    /// Cadence for [`Engine::tick`], `None` for turn-based games.
    fn tick_period(&self) -> Option<Duration> {
        None
    }

    /// Delay after which [`Engine::settle`] must be called, when the engine is waiting on one.
    fn settle_delay(&self) -> Option<Duration> {
        None
    }

    fn settle(&mut self) -> Result<Transition> {
        Ok(Transition::NoChange)
    }

    fn is_terminal(&self) -> bool {
        self.status().is_finished()
    }

    fn summary(&self, elapsed_secs: u32) -> Summary;

    /// Called when `self` replaces `previous` in the same session.
    fn carry_over(&mut self, _previous: &Self) {}
}

pub(crate) fn check_active(status: Status) -> Result<()> {
    if status.is_finished() {
        Err(GameError::AlreadyEnded)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finished_dominates_merge() {
        use Transition::*;
        assert_eq!(NoChange | Changed, Changed);
        assert_eq!(Changed | Finished, Finished);
        assert_eq!(NoChange | NoChange, NoChange);
    }

    #[test]
    fn head_to_head_awards_single_point() {
        let summary = Summary::head_to_head(Some(1), 2);
        assert_eq!(summary.points, vec![0, 1]);
        assert_eq!(Summary::head_to_head(None, 2).points, vec![0, 0]);
    }
}
