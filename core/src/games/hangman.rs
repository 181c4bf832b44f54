use rand::prelude::*;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::*;

pub const MAX_WRONG_GUESSES: u32 = 6;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    #[default]
    Animals,
    Countries,
    Food,
    Sports,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Animals,
        Category::Countries,
        Category::Food,
        Category::Sports,
    ];

    pub const fn words(self) -> &'static [&'static str] {
        match self {
            Self::Animals => &[
                "ELEPHANT", "GIRAFFE", "KANGAROO", "PENGUIN", "DOLPHIN", "BUTTERFLY", "RHINOCEROS",
                "OSTRICH",
            ],
            Self::Countries => &[
                "CANADA", "BRAZIL", "AUSTRALIA", "JAPAN", "EGYPT", "SWEDEN", "MEXICO", "INDIA",
            ],
            Self::Food => &[
                "PIZZA", "SUSHI", "PASTA", "BURGER", "SALAD", "SANDWICH", "CURRY", "TACOS",
            ],
            Self::Sports => &[
                "FOOTBALL",
                "BASKETBALL",
                "TENNIS",
                "SWIMMING",
                "VOLLEYBALL",
                "BASEBALL",
                "SOCCER",
                "HOCKEY",
            ],
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "letter", rename_all = "camelCase")]
pub enum HangmanAction {
    Guess(char),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hangman {
    category: Category,
    word: String,
    guessed: BTreeSet<char>,
    wrong_guesses: u32,
    status: Status,
}

impl Hangman {
    pub fn new(category: Category, seed: u64) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let word = category.words().choose(&mut rng).copied().unwrap_or("HANGMAN");
        Self::with_word(category, word)
    }

    pub fn with_word(category: Category, word: &str) -> Self {
        Self {
            category,
            word: word.to_ascii_uppercase(),
            guessed: BTreeSet::new(),
            wrong_guesses: 0,
            status: Status::Active,
        }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn wrong_guesses(&self) -> u32 {
        self.wrong_guesses
    }

    pub fn guessed(&self) -> impl Iterator<Item = char> + '_ {
        self.guessed.iter().copied()
    }

    /// The word with unguessed letters hidden as `_`.
    pub fn masked(&self) -> String {
        self.word
            .chars()
            .map(|letter| if self.guessed.contains(&letter) { letter } else { '_' })
            .collect()
    }

    /// Revealed only once the game is over.
    pub fn word(&self) -> Option<&str> {
        self.status.is_finished().then_some(self.word.as_str())
    }

    pub fn guess(&mut self, letter: char) -> Result<Transition> {
        check_active(self.status)?;
        if !letter.is_ascii_alphabetic() {
            return Err(GameError::InvalidInput);
        }
        let letter = letter.to_ascii_uppercase();
        if !self.guessed.insert(letter) {
            return Ok(Transition::NoChange);
        }

        if !self.word.contains(letter) {
            self.wrong_guesses += 1;
            if self.wrong_guesses >= MAX_WRONG_GUESSES {
                log::debug!("Hangman lost on {}", self.word);
                self.status = Status::Lost;
                return Ok(Transition::Finished);
            }
        } else if self.word.chars().all(|c| self.guessed.contains(&c)) {
            log::debug!("Hangman won with {} wrong guesses", self.wrong_guesses);
            self.status = Status::Won;
            return Ok(Transition::Finished);
        }
        Ok(Transition::Changed)
    }
}

impl Engine for Hangman {
    type Action = HangmanAction;

    fn kind(&self) -> GameKind {
        GameKind::Hangman
    }

    fn status(&self) -> Status {
        self.status
    }

    fn apply(&mut self, action: Self::Action) -> Result<Transition> {
        match action {
            HangmanAction::Guess(letter) => self.guess(letter),
        }
    }

    fn summary(&self, elapsed_secs: u32) -> Summary {
        let won = self.status == Status::Won;
        let score = if won {
            1000u32
                .saturating_sub(2 * elapsed_secs)
                .saturating_sub(50 * self.wrong_guesses)
                .max(100)
        } else {
            0
        };
        Summary {
            mistakes: Some(self.wrong_guesses),
            ..Summary::solo(score, won)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_word_comes_from_category() {
        for category in Category::ALL {
            let game = Hangman::new(category, 12);
            assert!(category.words().contains(&game.word.as_str()));
        }
    }

    #[test]
    fn guessing_all_letters_wins() {
        let mut game = Hangman::with_word(Category::Food, "PASTA");
        assert_eq!(game.guess('p').unwrap(), Transition::Changed);
        assert_eq!(game.masked(), "P____");
        game.guess('A').unwrap();
        game.guess('S').unwrap();
        assert_eq!(game.guess('T').unwrap(), Transition::Finished);
        assert_eq!(game.status(), Status::Won);
        assert_eq!(game.word(), Some("PASTA"));
    }

    #[test]
    fn repeated_letter_is_ignored() {
        let mut game = Hangman::with_word(Category::Food, "PASTA");
        game.guess('Z').unwrap();
        assert_eq!(game.guess('z').unwrap(), Transition::NoChange);
        assert_eq!(game.wrong_guesses(), 1);
    }

    #[test]
    fn sixth_miss_loses() {
        let mut game = Hangman::with_word(Category::Food, "PASTA");
        for letter in ['B', 'C', 'D', 'E', 'F'] {
            assert_eq!(game.guess(letter).unwrap(), Transition::Changed);
        }
        assert_eq!(game.word(), None);
        assert_eq!(game.guess('G').unwrap(), Transition::Finished);
        assert_eq!(game.status(), Status::Lost);
        assert_eq!(game.guess('P'), Err(GameError::AlreadyEnded));

        let summary = game.summary(10);
        assert_eq!(summary.score, Some(0));
        assert_eq!(summary.mistakes, Some(6));
    }

    #[test]
    fn non_letters_are_rejected() {
        let mut game = Hangman::with_word(Category::Food, "PASTA");
        assert_eq!(game.guess('3'), Err(GameError::InvalidInput));
    }

    #[test]
    fn winning_score_floors_at_hundred() {
        let mut game = Hangman::with_word(Category::Food, "PIZZA");
        game.guess('Q').unwrap();
        for letter in ['P', 'I', 'Z', 'A'] {
            game.guess(letter).unwrap();
        }
        assert_eq!(game.summary(20).score, Some(1000 - 40 - 50));
        assert_eq!(game.summary(600).score, Some(100));
        assert_eq!(game.summary(20).winner, Some(0));
    }
}
