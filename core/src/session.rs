use core::cell::RefCell;
use core::time::Duration;
use std::collections::BTreeSet;
use std::rc::{Rc, Weak};

use chrono::{DateTime, Utc};

use crate::*;

/// Callbacks the scheduler fires back into the session.
#[derive(Clone)]
pub struct LoopHooks {
    pub tick: Callback,
    pub settle: Callback,
}

impl Default for LoopHooks {
    fn default() -> Self {
        Self::new(|| {}, || {})
    }
}

impl LoopHooks {
    pub fn new(tick: impl Fn() + 'static, settle: impl Fn() + 'static) -> Self {
        Self {
            tick: Rc::new(tick),
            settle: Rc::new(settle),
        }
    }

    /// Hooks that drive a shared session, doing nothing once it is gone.
    pub fn driving<E, K, S>(session: &Weak<RefCell<Session<E, K, S>>>) -> Self
    where
        E: Engine + 'static,
        K: Scheduler + 'static,
        S: ResultSink + 'static,
    {
        let tick_target = session.clone();
        let settle_target = session.clone();
        Self::new(
            move || with_session(&tick_target, |session| session.tick()),
            move || with_session(&settle_target, |session| session.settle()),
        )
    }
}

fn with_session<E, K, S>(
    session: &Weak<RefCell<Session<E, K, S>>>,
    step: impl FnOnce(&mut Session<E, K, S>) -> Result<Transition>,
) where
    E: Engine,
    K: Scheduler,
    S: ResultSink,
{
    let Some(session) = session.upgrade() else {
        return;
    };
    match session.try_borrow_mut() {
        Ok(mut session) => {
            if let Err(err) = step(&mut session) {
                log::trace!("Scheduled step ignored: {}", err);
            }
        }
        Err(_) => log::warn!("Session busy, skipping scheduled step"),
    };
}

/// One game in progress: engine, players, timers, and the sink receiving its result.
pub struct Session<E, K, S>
where
    E: Engine,
    K: Scheduler,
    S: ResultSink,
{
    engine: E,
    players: Vec<Player>,
    scheduler: K,
    sink: S,
    hooks: LoopHooks,
    started_at: DateTime<Utc>,
    period: Option<Duration>,
    result: Option<GameResult>,
}

fn check_players(kind: GameKind, players: &[Player]) -> Result<()> {
    let ids: BTreeSet<&str> = players.iter().map(|player| player.id.as_str()).collect();
    let valid = kind.info().accepts_players(players.len())
        && ids.len() == players.len()
        && players.iter().all(|player| !player.name.trim().is_empty());
    if valid {
        Ok(())
    } else {
        Err(GameError::InvalidPlayers)
    }
}

impl<E, K, S> Session<E, K, S>
where
    E: Engine,
    K: Scheduler,
    S: ResultSink,
{
    pub fn new(engine: E, players: Vec<Player>, scheduler: K, sink: S, hooks: LoopHooks) -> Result<Self> {
        check_players(engine.kind(), &players)?;
        Ok(Self::started(engine, players, scheduler, sink, hooks))
    }

    /// Session behind `Rc<RefCell<_>>` whose timers call back into it.
    pub fn shared(engine: E, players: Vec<Player>, scheduler: K, sink: S) -> Result<Rc<RefCell<Self>>>
    where
        E: 'static,
        K: 'static,
        S: 'static,
    {
        check_players(engine.kind(), &players)?;
        Ok(Rc::new_cyclic(|session| {
            let hooks = LoopHooks::driving(session);
            RefCell::new(Self::started(engine, players, scheduler, sink, hooks))
        }))
    }

    fn started(engine: E, players: Vec<Player>, scheduler: K, sink: S, hooks: LoopHooks) -> Self {
        let mut session = Self {
            engine,
            players,
            started_at: scheduler.now(),
            scheduler,
            sink,
            hooks,
            period: None,
            result: None,
        };
        for player in &mut session.players {
            player.is_winner = None;
        }
        log::debug!("Starting {} with {} players", session.kind(), session.players.len());
        session.sync_loop();
        session
    }

    pub fn kind(&self) -> GameKind {
        self.engine.kind()
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn scheduler(&self) -> &K {
        &self.scheduler
    }

    /// The record written when the game ended.
    pub fn result(&self) -> Option<&GameResult> {
        self.result.as_ref()
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Whole seconds since the start, frozen once the game has ended.
    pub fn elapsed_secs(&self) -> u32 {
        match &self.result {
            Some(result) => result.duration,
            None => whole_seconds(self.started_at, self.scheduler.now()),
        }
    }

    pub fn apply(&mut self, action: E::Action) -> Result<Transition> {
        let transition = self.engine.apply(action).inspect_err(|err| {
            log::debug!("{} action rejected: {}", self.engine.kind(), err);
        })?;
        Ok(self.after(transition))
    }

    pub fn tick(&mut self) -> Result<Transition> {
        let transition = self.engine.tick()?;
        Ok(self.after(transition))
    }

    pub fn settle(&mut self) -> Result<Transition> {
        let transition = self.engine.settle()?;
        Ok(self.after(transition))
    }

    fn after(&mut self, transition: Transition) -> Transition {
        if self.engine.is_terminal() {
            self.finish();
        } else {
            if transition.has_update() {
                if let Some(delay) = self.engine.settle_delay() {
                    self.scheduler.defer(delay, self.hooks.settle.clone());
                }
            }
            self.sync_loop();
        }
        transition
    }

    /// Keeps the tick loop in step with the engine's cadence.
    fn sync_loop(&mut self) {
        let period = self.engine.tick_period();
        if period == self.period {
            return;
        }
        match period {
            Some(period) => {
                log::trace!("Tick period now {:?}", period);
                self.scheduler.start(period, self.hooks.tick.clone());
                self.period = Some(period);
            }
            None => self.halt(),
        }
    }

    /// Cancels every timer owned by this session.
    pub fn halt(&mut self) {
        self.scheduler.stop();
        self.period = None;
    }

    fn finish(&mut self) {
        self.halt();
        if self.result.is_some() {
            return;
        }

        let ended_at = self.scheduler.now();
        let duration = whole_seconds(self.started_at, ended_at);
        let summary = self.engine.summary(duration);

        for (seat, player) in self.players.iter_mut().enumerate() {
            player.score += summary.points.get(seat).copied().unwrap_or(0);
            player.is_winner = Some(summary.winner == Some(seat));
        }
        let winner = summary.winner.and_then(|seat| self.players.get(seat).cloned());

        let result = GameResult {
            id: ended_at.timestamp_millis().to_string(),
            game_type: self.engine.kind(),
            players: self.players.clone(),
            winner,
            timestamp: ended_at,
            duration,
            score: summary.score,
            moves: summary.moves,
            mistakes: summary.mistakes,
        };
        log::debug!(
            "{} finished after {}s, winner {:?}",
            result.game_type,
            duration,
            result.winner.as_ref().map(|player| &player.name)
        );
        self.sink.add_result(result.clone());
        self.result = Some(result);
    }

    /// Starts `engine` as a fresh game for the same players, keeping their running scores.
    pub fn reset(&mut self, mut engine: E) -> Result<()> {
        check_players(engine.kind(), &self.players)?;
        engine.carry_over(&self.engine);
        self.halt();
        self.engine = engine;
        self.result = None;
        self.started_at = self.scheduler.now();
        for player in &mut self.players {
            player.is_winner = None;
        }
        log::debug!("Restarting {}", self.kind());
        self.sync_loop();
        Ok(())
    }
}

impl<K, S> Session<AnyEngine, K, S>
where
    K: Scheduler,
    S: ResultSink,
{
    /// Fresh game of the same kind built from `setup`.
    pub fn restart(&mut self, setup: &GameSetup) -> Result<()> {
        let engine = AnyEngine::new(self.kind(), setup, self.players.len())?;
        self.reset(engine)
    }
}

impl<E, K, S> Drop for Session<E, K, S>
where
    E: Engine,
    K: Scheduler,
    S: ResultSink,
{
    fn drop(&mut self) {
        self.halt();
    }
}

fn whole_seconds(from: DateTime<Utc>, to: DateTime<Utc>) -> u32 {
    let millis = (to - from).num_milliseconds().max(0);
    ((millis + 500) / 1000).try_into().unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> Vec<Player> {
        vec![Player::new("1", "Ann"), Player::new("2", "Bo")]
    }

    fn session<E: Engine>(engine: E, players: Vec<Player>) -> Session<E, ManualScheduler, MemoryResultLog> {
        Session::new(
            engine,
            players,
            ManualScheduler::default(),
            MemoryResultLog::new(),
            LoopHooks::default(),
        )
        .unwrap()
    }

    #[test]
    fn players_are_validated() {
        let new = |players| {
            Session::new(
                TicTacToe::new(),
                players,
                ManualScheduler::default(),
                MemoryResultLog::new(),
                LoopHooks::default(),
            )
            .err()
        };
        assert_eq!(new(vec![Player::new("1", "Ann")]), Some(GameError::InvalidPlayers));
        assert_eq!(
            new(vec![Player::new("1", "Ann"), Player::new("2", "  ")]),
            Some(GameError::InvalidPlayers)
        );
        assert_eq!(
            new(vec![Player::new("1", "Ann"), Player::new("1", "Bo")]),
            Some(GameError::InvalidPlayers)
        );
        assert_eq!(new(pair()), None);
    }

    #[test]
    fn draw_records_no_winner() {
        let mut session = session(TicTacToe::new(), pair());
        for cell in [0, 1, 2, 4, 3, 5, 7, 6, 8] {
            session.apply(TicTacToeAction { cell }).unwrap();
        }
        assert_eq!(session.engine().status(), Status::Draw);

        let result = session.result().unwrap();
        assert_eq!(result.winner, None);
        assert!(result.players.iter().all(|player| player.is_winner == Some(false)));
        assert_eq!(session.sink().history().total_games, 1);
    }

    #[test]
    fn continuous_game_starts_and_stops_loop() {
        let mut session = session(Snake::new(1), vec![Player::new("1", "Ann")]);
        assert!(session.scheduler().is_running());
        session.halt();
        assert!(!session.scheduler().is_running());
    }

    #[test]
    fn turn_based_game_has_no_loop() {
        let session = session(Chess::new(MateRule::Checkmate), pair());
        assert!(!session.scheduler().is_running());
    }

    #[test]
    fn reset_keeps_running_scores() {
        let mut session = session(TicTacToe::new(), pair());
        for cell in [0, 4, 1, 3, 2] {
            session.apply(TicTacToeAction { cell }).unwrap();
        }
        assert_eq!(session.players()[0].score, 1);

        session.reset(TicTacToe::new()).unwrap();
        assert!(session.result().is_none());
        assert_eq!(session.players()[0].score, 1);
        assert_eq!(session.players()[0].is_winner, None);
        assert_eq!(session.apply(TicTacToeAction { cell: 4 }), Ok(Transition::Changed));
    }

    #[test]
    fn whole_seconds_round_and_clamp() {
        let start = DateTime::<Utc>::default();
        let later = |millis| start + chrono::TimeDelta::milliseconds(millis);
        assert_eq!(whole_seconds(start, later(1499)), 1);
        assert_eq!(whole_seconds(start, later(1500)), 2);
        assert_eq!(whole_seconds(later(10), start), 0);
    }
}
