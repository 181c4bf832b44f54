use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::*;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub score: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_winner: Option<bool>,
}

impl Player {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            score: 0,
            is_winner: None,
        }
    }
}

/// Immutable record of one finished game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameResult {
    pub id: String,
    pub game_type: GameKind,
    pub players: Vec<Player>,
    pub winner: Option<Player>,
    pub timestamp: DateTime<Utc>,
    /// Whole seconds between start and end.
    #[serde(default)]
    pub duration: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moves: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mistakes: Option<u32>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameHistory {
    pub results: Vec<GameResult>,
    pub total_games: usize,
    pub total_players: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStats {
    pub player_id: String,
    pub player_name: String,
    pub games_played: u32,
    pub games_won: u32,
    pub games_lost: u32,
    pub total_score: u32,
    pub average_score: f64,
    /// Percentage in `0.0..=100.0`.
    pub win_rate: f64,
    pub favorite_game: GameKind,
}

impl GameHistory {
    /// Parses a stored history, an unreadable one counts as empty.
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str::<Self>(json) {
            Ok(mut history) => {
                history.recount();
                history
            }
            Err(err) => {
                log::warn!("Discarding unreadable game history: {}", err);
                Self::default()
            }
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn push(&mut self, result: GameResult) {
        self.results.push(result);
        self.recount();
    }

    fn recount(&mut self) {
        self.total_games = self.results.len();
        self.total_players = self
            .results
            .iter()
            .flat_map(|result| &result.players)
            .map(|player| player.id.as_str())
            .collect::<BTreeSet<_>>()
            .len();
    }

    /// Newest first.
    pub fn recent(&self) -> Vec<&GameResult> {
        let mut results: Vec<_> = self.results.iter().collect();
        results.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        results
    }

    pub fn total_play_minutes(&self) -> u32 {
        let seconds: u32 = self.results.iter().map(|result| result.duration).sum();
        (seconds + 30) / 60
    }

    /// Per player totals, most active players first.
    pub fn player_stats(&self) -> Vec<PlayerStats> {
        let mut order: Vec<&str> = Vec::new();
        let mut stats: BTreeMap<&str, (PlayerStats, Vec<(GameKind, u32)>)> = BTreeMap::new();

        for result in &self.results {
            for player in &result.players {
                let (stat, played) = stats.entry(player.id.as_str()).or_insert_with(|| {
                    order.push(player.id.as_str());
                    let stat = PlayerStats {
                        player_id: player.id.clone(),
                        player_name: player.name.clone(),
                        games_played: 0,
                        games_won: 0,
                        games_lost: 0,
                        total_score: 0,
                        average_score: 0.0,
                        win_rate: 0.0,
                        favorite_game: result.game_type,
                    };
                    (stat, Vec::new())
                });

                stat.games_played += 1;
                stat.total_score += player.score;
                if result.winner.as_ref().is_some_and(|winner| winner.id == player.id) {
                    stat.games_won += 1;
                } else {
                    stat.games_lost += 1;
                }

                match played.iter_mut().find(|(kind, _)| *kind == result.game_type) {
                    Some((_, count)) => *count += 1,
                    None => played.push((result.game_type, 1)),
                }
            }
        }

        let mut sorted: Vec<PlayerStats> = order
            .into_iter()
            .filter_map(|id| stats.remove(id))
            .map(|(mut stat, played)| {
                let games = f64::from(stat.games_played);
                stat.average_score = f64::from(stat.total_score) / games;
                stat.win_rate = f64::from(stat.games_won) / games * 100.0;
                // first most played wins ties
                if let Some(&(kind, _)) = played.iter().rev().max_by_key(|(_, count)| *count) {
                    stat.favorite_game = kind;
                }
                stat
            })
            .collect();
        sorted.sort_by(|a, b| b.games_played.cmp(&a.games_played));
        sorted
    }
}

/// Destination for finished game records.
pub trait ResultSink {
    fn add_result(&mut self, result: GameResult);

    fn history(&self) -> GameHistory;

    /// Removes the history together with the saved player names.
    fn clear(&mut self);

    fn player_names(&self) -> Vec<String>;

    fn save_player_names(&mut self, names: &[String]);
}

/// Result log kept in memory, used natively and in tests.
#[derive(Clone, Debug, Default)]
pub struct MemoryResultLog {
    history: GameHistory,
    player_names: Vec<String>,
}

impl MemoryResultLog {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResultSink for MemoryResultLog {
    fn add_result(&mut self, result: GameResult) {
        log::debug!("Recording {} result {}", result.game_type, result.id);
        self.history.push(result);
    }

    fn history(&self) -> GameHistory {
        self.history.clone()
    }

    fn clear(&mut self) {
        self.history = GameHistory::default();
        self.player_names.clear();
    }

    fn player_names(&self) -> Vec<String> {
        self.player_names.clone()
    }

    fn save_player_names(&mut self, names: &[String]) {
        self.player_names = names.to_vec();
    }
}
