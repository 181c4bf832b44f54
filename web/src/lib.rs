use clap::Parser;
use core::cell::{Cell, RefCell};
use gamehub_core::{AnyAction, AnyEngine, GameInfo, GameKind, GameSetup, Player, ResultSink, Session, Transition};
use serde::Deserialize;
use std::rc::Rc;
use wasm_bindgen::prelude::*;

pub use scheduler::IntervalScheduler;
pub use storage::LocalResultLog;

mod scheduler;
mod storage;
mod utils;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    /// Force a seed instead of random
    #[arg(short, long)]
    seed: Option<u64>,
}

thread_local! {
    static FORCED_SEED: Cell<Option<u64>> = const { Cell::new(None) };
}

#[wasm_bindgen(start)]
pub fn run_app() {
    use gloo::utils::window;

    #[cfg(feature = "console_error_panic_hook")]
    {
        console_error_panic_hook::set_once();
    }

    let location_hash = window().location().hash().unwrap_or_default();
    let args = match Args::try_parse_from(location_hash.split(['#', '&'])) {
        Ok(args) => args,
        Err(err) => {
            gloo::console::warn!(format!("Ignoring location arguments: {}", err));
            Args {
                verbose: Default::default(),
                seed: None,
            }
        }
    };
    if let Some(log_level) = args.verbose.log_level() {
        if let Err(err) = console_log::init_with_level(log_level) {
            gloo::console::error!(format!("Error initializing logger: {}", err));
        }
    }
    log::debug!("seed: {:?}", args.seed);
    FORCED_SEED.with(|seed| seed.set(args.seed));

    log::debug!("App started");
}

fn next_seed() -> u64 {
    FORCED_SEED
        .with(Cell::get)
        .unwrap_or_else(utils::js_random_seed)
}

/// Options accepted by [`Arcade::new`], as JSON.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewGame {
    game: GameKind,
    players: Vec<String>,
    /// Random unless given here or forced from the location hash.
    #[serde(default)]
    seed: Option<u64>,
    #[serde(flatten)]
    setup: GameSetup,
}

type WebSession = Session<AnyEngine, IntervalScheduler, LocalResultLog>;

/// One running game, as seen from JavaScript.
///
/// Continuous games tick on their own; the page reads [`Arcade::state`] on every frame.
#[wasm_bindgen]
pub struct Arcade {
    session: Rc<RefCell<WebSession>>,
    setup: GameSetup,
}

#[wasm_bindgen]
impl Arcade {
    /// `options` looks like `{"game":"chess","players":["Ann","Bo"],"mateRule":"checkEndsGame"}`.
    #[wasm_bindgen(constructor)]
    pub fn new(options: &str) -> Result<Arcade, JsError> {
        let NewGame {
            game,
            players,
            seed,
            mut setup,
        } = serde_json::from_str(options)?;
        setup.seed = seed.unwrap_or_else(next_seed);

        let players: Vec<Player> = players
            .into_iter()
            .enumerate()
            .map(|(index, name)| Player::new((index + 1).to_string(), name.trim()))
            .collect();
        let engine = AnyEngine::new(game, &setup, players.len())?;
        let names: Vec<String> = players.iter().map(|player| player.name.clone()).collect();

        let session = Session::shared(engine, players, IntervalScheduler::default(), LocalResultLog)?;
        session.try_borrow_mut()?.sink_mut().save_player_names(&names);
        Ok(Arcade { session, setup })
    }

    /// Applies one action, `{"game":"tetris","action":{"type":"rotate"}}`.
    ///
    /// Returns whether anything changed; rejected moves return `false`.
    pub fn apply(&self, action: &str) -> Result<bool, JsError> {
        let action: AnyAction = serde_json::from_str(action)?;
        let mut session = self.session.try_borrow_mut()?;
        Ok(session.apply(action).is_ok_and(Transition::has_update))
    }

    /// Current engine state as JSON.
    pub fn state(&self) -> Result<String, JsError> {
        let session = self.session.try_borrow()?;
        Ok(serde_json::to_string(session.engine())?)
    }

    pub fn players(&self) -> Result<String, JsError> {
        let session = self.session.try_borrow()?;
        Ok(serde_json::to_string(session.players())?)
    }

    #[wasm_bindgen(js_name = elapsedSecs)]
    pub fn elapsed_secs(&self) -> Result<u32, JsError> {
        Ok(self.session.try_borrow()?.elapsed_secs())
    }

    #[wasm_bindgen(js_name = isFinished)]
    pub fn is_finished(&self) -> Result<bool, JsError> {
        Ok(self.session.try_borrow()?.result().is_some())
    }

    /// The stored record once the game has ended.
    pub fn result(&self) -> Result<Option<String>, JsError> {
        let session = self.session.try_borrow()?;
        session
            .result()
            .map(serde_json::to_string)
            .transpose()
            .map_err(JsError::from)
    }

    /// Same game and players, new board.
    pub fn restart(&mut self) -> Result<(), JsError> {
        self.setup.seed = next_seed();
        self.session.try_borrow_mut()?.restart(&self.setup)?;
        Ok(())
    }

    /// Stops the game loop, for when the page navigates away.
    pub fn leave(&self) -> Result<(), JsError> {
        self.session.try_borrow_mut()?.halt();
        Ok(())
    }
}

#[wasm_bindgen]
pub fn catalogue() -> Result<String, JsError> {
    let games: Vec<GameInfo> = GameKind::ALL.into_iter().map(GameKind::info).collect();
    Ok(serde_json::to_string(&games)?)
}

#[wasm_bindgen]
pub fn history() -> Result<String, JsError> {
    Ok(LocalResultLog.history().to_json()?)
}

#[wasm_bindgen(js_name = playerStats)]
pub fn player_stats() -> Result<String, JsError> {
    Ok(serde_json::to_string(&LocalResultLog.history().player_stats())?)
}

#[wasm_bindgen(js_name = totalPlayMinutes)]
pub fn total_play_minutes() -> u32 {
    LocalResultLog.history().total_play_minutes()
}

#[wasm_bindgen(js_name = playerNames)]
pub fn player_names() -> Result<String, JsError> {
    Ok(serde_json::to_string(&LocalResultLog.player_names())?)
}

#[wasm_bindgen(js_name = clearHistory)]
pub fn clear_history() {
    LocalResultLog.clear();
}
