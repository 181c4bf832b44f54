//! Test suite for the Web and headless browsers.

#![cfg(target_arch = "wasm32")]

use core::time::Duration;
use gamehub_core::{GameHistory, GameKind, GameResult, Player, ResultSink, Scheduler};
use gamehub_web::{Arcade, IntervalScheduler, LocalResultLog};
use gloo::storage::{LocalStorage, Storage};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn record(id: &str) -> GameResult {
    GameResult {
        id: id.to_string(),
        game_type: GameKind::Hangman,
        players: vec![Player::new("1", "Ann")],
        winner: None,
        timestamp: chrono::DateTime::default(),
        duration: 61,
        score: Some(0),
        moves: None,
        mistakes: Some(6),
    }
}

#[wasm_bindgen_test]
fn local_log_appends_and_clears() {
    let mut log = LocalResultLog;
    log.clear();
    log.add_result(record("1"));
    log.add_result(record("2"));
    log.save_player_names(&["Ann".to_string()]);

    let history = log.history();
    assert_eq!(history.total_games, 2);
    assert_eq!(history.total_players, 1);
    assert_eq!(history.results[1], record("2"));
    assert_eq!(log.player_names(), vec!["Ann".to_string()]);

    log.clear();
    assert_eq!(log.history(), GameHistory::default());
    assert!(log.player_names().is_empty());
}

#[wasm_bindgen_test]
fn corrupt_storage_reads_as_empty() {
    LocalStorage::raw()
        .set_item("game_hub_history", "{\"results\": [")
        .unwrap();
    assert_eq!(LocalResultLog.history(), GameHistory::default());
    LocalResultLog.clear();
}

#[wasm_bindgen_test]
fn interval_scheduler_stops_everything() {
    let mut scheduler = IntervalScheduler::default();
    assert!(!scheduler.is_running());
    scheduler.start(Duration::from_millis(50), std::rc::Rc::new(|| {}));
    scheduler.defer(Duration::from_secs(10), std::rc::Rc::new(|| {}));
    assert!(scheduler.is_running());
    scheduler.stop();
    assert!(!scheduler.is_running());
    assert!(scheduler.now().timestamp() > 0);
}

#[wasm_bindgen_test]
fn rejected_setup_keeps_saved_names() {
    let mut log = LocalResultLog;
    log.clear();
    log.save_player_names(&["Ann".to_string(), "Bo".to_string()]);

    assert!(Arcade::new(r#"{"game":"tictactoe","players":["Cy","  "]}"#).is_err());
    assert_eq!(log.player_names(), vec!["Ann".to_string(), "Bo".to_string()]);

    let arcade = Arcade::new(r#"{"game":"tictactoe","players":["Cy","Di"],"seed":1}"#);
    assert!(arcade.is_ok());
    assert_eq!(log.player_names(), vec!["Cy".to_string(), "Di".to_string()]);
    log.clear();
}
