use core::time::Duration;
use rand::prelude::*;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use crate::*;

pub const CARD_VALUES: [&str; 12] = [
    "🐶", "🐱", "🐭", "🐹", "🐰", "🦊", "🐻", "🐼", "🐨", "🐯", "🦁", "🐮",
];
const RESOLVE_DELAY: Duration = Duration::from_millis(1000);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryConfig {
    pub players: usize,
    pub pairs: usize,
}

impl MemoryConfig {
    pub const fn new(players: usize) -> Self {
        Self { players, pairs: 8 }
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self::new(1)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub value: &'static str,
    pub is_flipped: bool,
    pub is_matched: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryAction {
    pub card: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MemoryMatch {
    cards: Vec<Card>,
    /// Face-up cards waiting to be resolved, at most two.
    flipped: Vec<usize>,
    current: Seat,
    scores: Vec<u32>,
    status: Status,
}

impl MemoryMatch {
    pub fn new(config: MemoryConfig, seed: u64) -> Self {
        let pairs = config.pairs.clamp(1, CARD_VALUES.len());
        let mut values: Vec<_> = CARD_VALUES[..pairs]
            .iter()
            .chain(CARD_VALUES[..pairs].iter())
            .copied()
            .collect();
        values.shuffle(&mut SmallRng::seed_from_u64(seed));
        Self::from_values(&values, config.players)
    }

    pub fn from_values(values: &[&'static str], players: usize) -> Self {
        Self {
            cards: values
                .iter()
                .map(|&value| Card {
                    value,
                    is_flipped: false,
                    is_matched: false,
                })
                .collect(),
            flipped: Vec::with_capacity(2),
            current: 0,
            scores: vec![0; players.max(1)],
            status: Status::Active,
        }
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn current_player(&self) -> Seat {
        self.current
    }

    pub fn scores(&self) -> &[u32] {
        &self.scores
    }

    pub fn is_pending(&self) -> bool {
        self.flipped.len() == 2
    }

    pub fn flip(&mut self, index: usize) -> Result<Transition> {
        check_active(self.status)?;
        if self.is_pending() {
            return Err(GameError::Pending);
        }
        let card = self.cards.get_mut(index).ok_or(GameError::InvalidCoords)?;
        if card.is_flipped || card.is_matched {
            return Err(GameError::NotSelectable);
        }

        card.is_flipped = true;
        self.flipped.push(index);
        Ok(Transition::Changed)
    }

    /// Resolve the two face-up cards once the reveal delay has passed.
    pub fn resolve(&mut self) -> Result<Transition> {
        check_active(self.status)?;
        let [first, second] = self.flipped[..] else {
            return Ok(Transition::NoChange);
        };
        self.flipped.clear();

        if self.cards[first].value == self.cards[second].value {
            self.cards[first].is_matched = true;
            self.cards[second].is_matched = true;
            self.scores[self.current] += 1;
            log::debug!("Player {} matched {}", self.current, self.cards[first].value);

            if self.cards.iter().all(|card| card.is_matched) {
                self.status = Status::Won;
                return Ok(Transition::Finished);
            }
        } else {
            self.cards[first].is_flipped = false;
            self.cards[second].is_flipped = false;
            self.current = (self.current + 1) % self.scores.len();
        }
        Ok(Transition::Changed)
    }

    /// First highest scorer, if anyone scored.
    pub fn winner(&self) -> Option<Seat> {
        let best = self.scores.iter().copied().max().filter(|&best| best > 0)?;
        self.scores.iter().position(|&score| score == best)
    }
}

impl Engine for MemoryMatch {
    type Action = MemoryAction;

    fn kind(&self) -> GameKind {
        GameKind::Memory
    }

    fn status(&self) -> Status {
        self.status
    }

    fn apply(&mut self, action: Self::Action) -> Result<Transition> {
        self.flip(action.card)
    }

    fn settle_delay(&self) -> Option<Duration> {
        self.is_pending().then_some(RESOLVE_DELAY)
    }

    fn settle(&mut self) -> Result<Transition> {
        self.resolve()
    }

    fn summary(&self, _elapsed_secs: u32) -> Summary {
        Summary {
            winner: self.winner(),
            points: self.scores.clone(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_game(players: usize) -> MemoryMatch {
        MemoryMatch::from_values(&["a", "b", "a", "b"], players)
    }

    #[test]
    fn shuffled_deck_has_pairs() {
        let game = MemoryMatch::new(MemoryConfig::default(), 4);
        assert_eq!(game.cards().len(), 16);
        for value in &CARD_VALUES[..8] {
            assert_eq!(game.cards().iter().filter(|card| card.value == *value).count(), 2);
        }
    }

    #[test]
    fn flips_are_rejected_while_pending() {
        let mut game = small_game(2);
        game.flip(0).unwrap();
        game.flip(1).unwrap();
        assert_eq!(game.settle_delay(), Some(RESOLVE_DELAY));
        assert_eq!(game.flip(2), Err(GameError::Pending));
        assert!(!game.cards()[2].is_flipped);
    }

    #[test]
    fn miss_passes_turn() {
        let mut game = small_game(2);
        game.flip(0).unwrap();
        game.flip(1).unwrap();
        assert_eq!(game.resolve().unwrap(), Transition::Changed);
        assert_eq!(game.current_player(), 1);
        assert!(game.cards().iter().all(|card| !card.is_flipped));
        assert_eq!(game.settle_delay(), None);
    }

    #[test]
    fn match_keeps_turn_and_scores() {
        let mut game = small_game(2);
        game.flip(0).unwrap();
        game.flip(2).unwrap();
        game.resolve().unwrap();
        assert_eq!(game.current_player(), 0);
        assert_eq!(game.scores(), &[1, 0]);

        game.flip(1).unwrap();
        game.flip(3).unwrap();
        assert_eq!(game.resolve().unwrap(), Transition::Finished);
        assert_eq!(game.summary(0).winner, Some(0));
        assert_eq!(game.summary(0).points, vec![2, 0]);
    }

    #[test]
    fn tie_goes_to_first_top_scorer() {
        let mut game = MemoryMatch::from_values(&["a", "b", "a", "b", "c", "d", "c", "d"], 2);
        game.flip(0).unwrap();
        game.flip(2).unwrap();
        game.resolve().unwrap();
        game.flip(1).unwrap();
        game.flip(4).unwrap();
        game.resolve().unwrap();
        game.flip(1).unwrap();
        game.flip(3).unwrap();
        game.resolve().unwrap();
        assert_eq!(game.scores(), &[1, 1]);
        assert_eq!(game.winner(), Some(0));
    }

    #[test]
    fn matched_card_cannot_be_flipped() {
        let mut game = small_game(1);
        game.flip(0).unwrap();
        assert_eq!(game.flip(0), Err(GameError::NotSelectable));
        game.flip(2).unwrap();
        game.resolve().unwrap();
        assert_eq!(game.flip(2), Err(GameError::NotSelectable));
    }
}
