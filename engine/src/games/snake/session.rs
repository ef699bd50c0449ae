use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::clock::{Clock, SystemClock};
use crate::games::SessionRng;
use crate::high_score::HighScoreStore;
use crate::log;
use crate::settings::SnakeSessionSettings;
use super::events::{GameEvent, GameEventSink, OutputGuard};
use super::game_state::{SnakeGameState, TickOutcome};
use super::power_up::{ActiveEffects, PowerUp};
use super::types::{Difficulty, Direction, EndReason, Point};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum SessionState {
    NotStarted,
    Running,
    Over,
    /// Halted from outside before the run ended; only `restart` leaves it.
    Stopped,
}

/// Everything a renderer needs, copied out between ticks.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub snake: Vec<Point>,
    pub food: Point,
    pub power_up: Option<PowerUp>,
    pub score: u32,
    pub high_score: u32,
    pub difficulty: Difficulty,
    pub active_effects: ActiveEffects,
    pub state: SessionState,
    pub end_reason: Option<EndReason>,
    pub tick: u64,
}

/// Owns one player's game: board, score, per-difficulty high scores and the
/// NotStarted → Running → Over lifecycle, plus `Stopped` when halted early.
pub struct SessionController {
    settings: SnakeSessionSettings,
    game_state: SnakeGameState,
    rng: SessionRng,
    clock: Box<dyn Clock>,
    store: Box<dyn HighScoreStore>,
    sink: Arc<dyn GameEventSink>,
    output: Option<OutputGuard>,
    state: SessionState,
    difficulty: Difficulty,
    score: u32,
    high_scores: HashMap<Difficulty, u32>,
    end_reason: Option<EndReason>,
    tick: u64,
}

impl SessionController {
    /// Reads every difficulty's high score once; unreadable entries count as 0.
    pub fn new(
        settings: SnakeSessionSettings,
        store: Box<dyn HighScoreStore>,
        sink: Arc<dyn GameEventSink>,
    ) -> Self {
        let high_scores = Difficulty::ALL
            .into_iter()
            .map(|difficulty| (difficulty, load_high_score(store.as_ref(), difficulty)))
            .collect();

        Self {
            game_state: SnakeGameState::new(&settings),
            difficulty: settings.starting_difficulty,
            settings,
            rng: SessionRng::from_random(),
            clock: Box::new(SystemClock),
            store,
            sink,
            output: None,
            state: SessionState::NotStarted,
            score: 0,
            high_scores,
            end_reason: None,
            tick: 0,
        }
    }

    pub fn with_rng(mut self, rng: SessionRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn high_score(&self) -> u32 {
        self.high_scores.get(&self.difficulty).copied().unwrap_or(0)
    }

    pub fn game_state(&self) -> &SnakeGameState {
        &self.game_state
    }

    #[cfg(test)]
    pub(crate) fn game_state_mut(&mut self) -> &mut SnakeGameState {
        &mut self.game_state
    }

    /// Only honoured before the first run starts.
    pub fn set_difficulty(&mut self, difficulty: Difficulty) -> bool {
        if self.state != SessionState::NotStarted {
            return false;
        }
        if self.difficulty != difficulty {
            log!("Difficulty set to {}", difficulty);
        }
        self.difficulty = difficulty;
        true
    }

    pub fn start(&mut self) -> bool {
        if self.state != SessionState::NotStarted {
            return false;
        }
        self.enter_running();
        log!("Session started on {}", self.difficulty);
        true
    }

    /// A direction press: starts a fresh session and is then applied as a
    /// heading request. Ignored once the run is over.
    pub fn handle_input(&mut self, direction: Direction) -> bool {
        match self.state {
            SessionState::NotStarted => {
                self.start();
                self.game_state.set_snake_direction(direction)
            }
            SessionState::Running => self.game_state.set_snake_direction(direction),
            SessionState::Over | SessionState::Stopped => false,
        }
    }

    /// Resets the board and score and goes straight to `Running`.
    pub fn restart(&mut self) {
        self.game_state.reset();
        self.score = 0;
        self.end_reason = None;
        self.tick = 0;
        self.enter_running();
        log!("Session restarted on {}", self.difficulty);
    }

    /// Halts a running session and releases the output resource. The
    /// abandoned score is not persisted. Returns whether a run was halted.
    pub fn stop(&mut self) -> bool {
        self.output = None;
        if self.state != SessionState::Running {
            return false;
        }
        self.state = SessionState::Stopped;
        log!("Session stopped on {} with score {}", self.difficulty, self.score);
        true
    }

    pub fn tick_interval(&self) -> Duration {
        self.settings
            .tick_interval(self.difficulty, &self.game_state.effects)
    }

    /// Advances one tick while running; `None` in any other state.
    pub fn tick(&mut self) -> Option<TickOutcome> {
        if self.state != SessionState::Running {
            return None;
        }

        self.tick += 1;
        let outcome = self.game_state.update(&mut self.rng, self.clock.now_ms());

        match outcome {
            TickOutcome::Moved => self.sink.notify(GameEvent::Moved),
            TickOutcome::AteFood { score_delta, .. } => {
                self.score += score_delta;
                self.sink.notify(GameEvent::AteFood { score_delta });
            }
            TickOutcome::AtePowerUp(kind) => self.sink.notify(GameEvent::AtePowerUp(kind)),
            TickOutcome::Died(reason) => self.finish(EndReason::Died(reason)),
            TickOutcome::BoardFull { score_delta } => {
                self.score += score_delta;
                self.sink.notify(GameEvent::AteFood { score_delta });
                self.finish(EndReason::BoardFull);
            }
        }

        Some(outcome)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            snake: self.game_state.snake.segments().copied().collect(),
            food: self.game_state.food,
            power_up: self.game_state.power_up().copied(),
            score: self.score,
            high_score: self.high_score(),
            difficulty: self.difficulty,
            active_effects: self.game_state.effects,
            state: self.state,
            end_reason: self.end_reason,
            tick: self.tick,
        }
    }

    fn enter_running(&mut self) {
        self.state = SessionState::Running;
        if self.output.is_none() {
            self.output = Some(OutputGuard::acquire(self.sink.clone(), self.difficulty));
        }
    }

    fn finish(&mut self, reason: EndReason) {
        self.state = SessionState::Over;
        self.end_reason = Some(reason);
        self.output = None;
        self.sink.notify(GameEvent::GameOver {
            reason,
            score: self.score,
        });
        log!(
            "Session over ({:?}) on {} with score {}",
            reason,
            self.difficulty,
            self.score
        );

        if self.score > self.high_score() {
            self.high_scores.insert(self.difficulty, self.score);
            if let Err(e) = self
                .store
                .save(&self.difficulty.high_score_key(), self.score)
            {
                log!("Failed to persist high score: {}", e);
            }
        }
    }
}

fn load_high_score(store: &dyn HighScoreStore, difficulty: Difficulty) -> u32 {
    match store.load(&difficulty.high_score_key()) {
        Ok(score) => score.unwrap_or(0),
        Err(e) => {
            log!("Failed to load {} high score: {}", difficulty, e);
            0
        }
    }
}
