use rand::prelude::*;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::*;

pub const WORD_LENGTH: usize = 5;
pub const MAX_GUESSES: usize = 6;

pub const WORDS: [&str; 32] = [
    "APPLE", "BEACH", "CHAIR", "DREAM", "EARTH", "FLAME", "GRAPE", "HOUSE", "IMAGE", "JUICE",
    "KNIFE", "LEMON", "MUSIC", "NIGHT", "OCEAN", "PEACE", "QUEEN", "RADIO", "SMILE", "TABLE",
    "UNITY", "VOICE", "WATER", "YOUTH", "ZEBRA", "BRAIN", "CLOUD", "DANCE", "EAGLE", "FROST",
    "GREEN", "HEART",
];

/// Ordered from least to most informative, so the keyboard keeps the best status seen.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LetterStatus {
    Absent,
    Present,
    Correct,
}

pub type Word = [u8; WORD_LENGTH];

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "letter", rename_all = "camelCase")]
pub enum WordleAction {
    Letter(char),
    Enter,
    Backspace,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Guess {
    pub word: String,
    pub statuses: [LetterStatus; WORD_LENGTH],
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wordle {
    target: Word,
    guesses: Vec<Guess>,
    current: String,
    keyboard: BTreeMap<char, LetterStatus>,
    status: Status,
}

/// Two passes: exact matches first, then present letters limited to what the target has left.
pub fn score_guess(guess: &Word, target: &Word) -> [LetterStatus; WORD_LENGTH] {
    let mut statuses = [LetterStatus::Absent; WORD_LENGTH];
    let mut remaining = [0u8; 26];

    for i in 0..WORD_LENGTH {
        if guess[i] == target[i] {
            statuses[i] = LetterStatus::Correct;
        } else {
            remaining[usize::from(target[i] - b'A')] += 1;
        }
    }

    for i in 0..WORD_LENGTH {
        if statuses[i] == LetterStatus::Correct {
            continue;
        }
        let left = &mut remaining[usize::from(guess[i] - b'A')];
        if *left > 0 {
            *left -= 1;
            statuses[i] = LetterStatus::Present;
        }
    }
    statuses
}

fn to_word(text: &str) -> Option<Word> {
    let bytes = text.as_bytes();
    if bytes.iter().all(u8::is_ascii_uppercase) {
        bytes.try_into().ok()
    } else {
        None
    }
}

impl Wordle {
    pub fn new(seed: u64) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let target = WORDS
            .choose(&mut rng)
            .and_then(|word| to_word(word))
            .unwrap_or(*b"APPLE");
        Self::from_word(target)
    }

    pub fn with_target(target: &str) -> Result<Self> {
        let target = to_word(&target.to_ascii_uppercase()).ok_or(GameError::InvalidInput)?;
        Ok(Self::from_word(target))
    }

    fn from_word(target: Word) -> Self {
        Self {
            target,
            guesses: Vec::with_capacity(MAX_GUESSES),
            current: String::with_capacity(WORD_LENGTH),
            keyboard: BTreeMap::new(),
            status: Status::Active,
        }
    }

    pub fn guesses(&self) -> &[Guess] {
        &self.guesses
    }

    pub fn current(&self) -> &str {
        &self.current
    }

    pub fn key_status(&self, letter: char) -> Option<LetterStatus> {
        self.keyboard.get(&letter.to_ascii_uppercase()).copied()
    }

    /// Revealed only once the game is over.
    pub fn target(&self) -> Option<String> {
        self.status
            .is_finished()
            .then(|| self.target.iter().map(|&b| char::from(b)).collect())
    }

    pub fn type_letter(&mut self, letter: char) -> Result<Transition> {
        check_active(self.status)?;
        if !letter.is_ascii_alphabetic() {
            return Err(GameError::InvalidInput);
        }
        if self.current.len() >= WORD_LENGTH {
            return Ok(Transition::NoChange);
        }
        self.current.push(letter.to_ascii_uppercase());
        Ok(Transition::Changed)
    }

    pub fn backspace(&mut self) -> Result<Transition> {
        check_active(self.status)?;
        Ok(Transition::from_changed(self.current.pop().is_some()))
    }

    /// Submits the current row; incomplete rows are ignored.
    pub fn enter(&mut self) -> Result<Transition> {
        check_active(self.status)?;
        let Some(word) = to_word(&self.current) else {
            return Ok(Transition::NoChange);
        };

        let statuses = score_guess(&word, &self.target);
        for (&letter, &status) in word.iter().zip(&statuses) {
            let best = self.keyboard.entry(char::from(letter)).or_insert(status);
            *best = (*best).max(status);
        }
        self.guesses.push(Guess {
            word: core::mem::take(&mut self.current),
            statuses,
        });

        if word == self.target {
            log::debug!("Wordle solved in {} guesses", self.guesses.len());
            self.status = Status::Won;
            Ok(Transition::Finished)
        } else if self.guesses.len() >= MAX_GUESSES {
            log::debug!("Wordle out of guesses");
            self.status = Status::Lost;
            Ok(Transition::Finished)
        } else {
            Ok(Transition::Changed)
        }
    }
}

impl Engine for Wordle {
    type Action = WordleAction;

    fn kind(&self) -> GameKind {
        GameKind::Wordle
    }

    fn status(&self) -> Status {
        self.status
    }

    fn apply(&mut self, action: Self::Action) -> Result<Transition> {
        match action {
            WordleAction::Letter(letter) => self.type_letter(letter),
            WordleAction::Enter => self.enter(),
            WordleAction::Backspace => self.backspace(),
        }
    }

    fn summary(&self, elapsed_secs: u32) -> Summary {
        let won = self.status == Status::Won;
        let guesses = self.guesses.len() as u32;
        let score = if won {
            1000u32
                .saturating_sub(2 * elapsed_secs)
                .saturating_sub(100 * guesses)
                .max(100)
        } else {
            0
        };
        Summary {
            moves: Some(guesses),
            ..Summary::solo(score, won)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use LetterStatus::*;

    fn word(text: &str) -> Word {
        to_word(text).unwrap()
    }

    fn type_word(game: &mut Wordle, text: &str) {
        for letter in text.chars() {
            game.type_letter(letter).unwrap();
        }
    }

    #[test]
    fn duplicate_letters_are_credited_once() {
        assert_eq!(
            score_guess(&word("LLAMA"), &word("APPLE")),
            [Present, Absent, Present, Absent, Absent]
        );
        assert_eq!(
            score_guess(&word("PAPER"), &word("APPLE")),
            [Present, Present, Correct, Present, Absent]
        );
    }

    #[test]
    fn exact_match_takes_precedence() {
        assert_eq!(
            score_guess(&word("EERIE"), &word("APPLE")),
            [Absent, Absent, Absent, Absent, Correct]
        );
    }

    #[test]
    fn random_target_comes_from_word_list() {
        let game = Wordle::new(3);
        let target: String = game.target.iter().map(|&b| char::from(b)).collect();
        assert!(WORDS.contains(&target.as_str()));
        assert_eq!(game.target(), None);
    }

    #[test]
    fn enter_needs_full_row() {
        let mut game = Wordle::with_target("APPLE").unwrap();
        type_word(&mut game, "APP");
        assert_eq!(game.enter().unwrap(), Transition::NoChange);
        assert!(game.guesses().is_empty());

        type_word(&mut game, "LEX");
        assert_eq!(game.current(), "APPLE");
        assert_eq!(game.backspace().unwrap(), Transition::Changed);
        assert_eq!(game.current(), "APPL");
    }

    #[test]
    fn keyboard_keeps_best_status() {
        let mut game = Wordle::with_target("APPLE").unwrap();
        type_word(&mut game, "PAPER");
        game.enter().unwrap();
        assert_eq!(game.key_status('p'), Some(Correct));
        assert_eq!(game.key_status('R'), Some(Absent));
        assert_eq!(game.key_status('Z'), None);
    }

    #[test]
    fn solving_scores_by_guesses() {
        let mut game = Wordle::with_target("heart").unwrap();
        type_word(&mut game, "EARTH");
        game.enter().unwrap();
        type_word(&mut game, "HEART");
        assert_eq!(game.enter().unwrap(), Transition::Finished);
        assert_eq!(game.target().as_deref(), Some("HEART"));

        let summary = game.summary(10);
        assert_eq!(summary.score, Some(1000 - 20 - 200));
        assert_eq!(summary.moves, Some(2));
        assert_eq!(summary.winner, Some(0));
    }

    #[test]
    fn six_misses_lose() {
        let mut game = Wordle::with_target("APPLE").unwrap();
        for _ in 0..5 {
            type_word(&mut game, "BEACH");
            assert_eq!(game.enter().unwrap(), Transition::Changed);
        }
        type_word(&mut game, "BEACH");
        assert_eq!(game.enter().unwrap(), Transition::Finished);
        assert_eq!(game.status(), Status::Lost);
        assert_eq!(game.type_letter('A'), Err(GameError::AlreadyEnded));
        assert_eq!(game.summary(5).score, Some(0));
    }
}
