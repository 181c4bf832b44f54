use gamehub_core::{GameHistory, GameResult, ResultSink};
use gloo::storage::{LocalStorage, Storage};

pub const HISTORY_KEY: &str = "game_hub_history";
pub const PLAYER_NAMES_KEY: &str = "game_hub_player_names";

/// Result log persisted in the browser's local storage.
#[derive(Copy, Clone, Debug, Default)]
pub struct LocalResultLog;

impl ResultSink for LocalResultLog {
    fn add_result(&mut self, result: GameResult) {
        let mut history = self.history();
        history.push(result);
        if let Err(err) = LocalStorage::set(HISTORY_KEY, &history) {
            log::error!("Could not save game history to local storage: {:?}", err);
        }
    }

    fn history(&self) -> GameHistory {
        match LocalStorage::raw().get_item(HISTORY_KEY) {
            Ok(Some(json)) => GameHistory::from_json(&json),
            Ok(None) => GameHistory::default(),
            Err(err) => {
                log::error!("Could not read game history: {:?}", err);
                GameHistory::default()
            }
        }
    }

    fn clear(&mut self) {
        LocalStorage::delete(HISTORY_KEY);
        LocalStorage::delete(PLAYER_NAMES_KEY);
    }

    fn player_names(&self) -> Vec<String> {
        LocalStorage::get(PLAYER_NAMES_KEY).unwrap_or_else(|err| {
            log::debug!("No saved player names: {:?}", err);
            Vec::new()
        })
    }

    fn save_player_names(&mut self, names: &[String]) {
        if let Err(err) = LocalStorage::set(PLAYER_NAMES_KEY, names) {
            log::error!("Could not save player names: {:?}", err);
        }
    }
}
