//! Session runner
//!
//! Owns one `GameState` plus the injected save store. The sim never touches
//! storage; the runner watches for the finish event and persists the best
//! score at that boundary.

use crate::save::{SaveStore, StorageBackend};
use crate::sim::{GameEvent, GameMode, GamePhase, GameState, tick};

pub struct Session<B: StorageBackend> {
    pub state: GameState,
    store: SaveStore<B>,
}

impl<B: StorageBackend> Session<B> {
    pub fn new(mode: GameMode, seed: u64, store: SaveStore<B>) -> Self {
        log::info!(
            "session start: mode={} duration={}s seed={seed}",
            mode.as_str(),
            mode.duration_secs()
        );
        Self {
            state: GameState::new(mode, seed),
            store,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.state.phase == GamePhase::Finished
    }

    /// Advance one timestep and hand back the events it produced
    pub fn advance(&mut self, dt: f32) -> Vec<GameEvent> {
        tick(&mut self.state, dt);
        let events = self.state.drain_events();
        for ev in &events {
            if let GameEvent::SessionFinished { mode, score } = ev {
                self.store.set_best(*mode, *score);
                log::info!(
                    "session finished: mode={} score={score} best={}",
                    mode.as_str(),
                    self.store.get_best(*mode)
                );
            }
        }
        events
    }

    pub fn best(&self, mode: GameMode) -> i64 {
        self.store.get_best(mode)
    }
}
