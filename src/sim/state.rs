//! Game state and core simulation types
//!
//! All per-session state lives here. Input handlers mutate buffered state
//! (swipe direction, bomb hold) immediately; the tick reads it. Everything
//! the presentation layer needs comes out as `GameEvent`s.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::bomb::{Bomb, BombRelease};
use super::gauge::{GaugeConfig, TimedGauge};
use super::swipe::SwipeTracker;
use crate::consts::*;

/// Selectable game modes, each with a fixed countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    Morning,
    Night,
    /// Morning + night combined
    Day,
}

impl GameMode {
    pub fn duration_secs(&self) -> i32 {
        match self {
            GameMode::Morning => 120,
            GameMode::Night => 60,
            GameMode::Day => 180,
        }
    }

    /// Night commute is denser
    pub fn spawn_interval_ms(&self) -> f64 {
        match self {
            GameMode::Night => SPAWN_INTERVAL_NIGHT_MS,
            _ => SPAWN_INTERVAL_MS,
        }
    }

    /// Key used in the save record
    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Morning => "morning",
            GameMode::Night => "night",
            GameMode::Day => "day",
        }
    }
}

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Running,
    Finished,
}

/// Enemy color variant; rush recolors live enemies retroactively
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyTint {
    Normal,
    Rush,
}

/// Enemy lifecycle before resolution. Resolution removes the enemy from the
/// live set, so an enemy cannot be scored twice.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EnemyPhase {
    Falling,
    /// Entered counter range at the recorded time (set once)
    Armed { armed_at_ms: f64 },
}

/// A falling enemy entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub lane: usize,
    pub pos: Vec2,
    /// Units per second, straight down
    pub fall_speed: f32,
    pub phase: EnemyPhase,
    pub tint: EnemyTint,
}

/// How an enemy left the live set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveCause {
    UltKill,
    CounterKill,
    BombKill,
    Missed,
    Passed,
}

/// Emitted by the sim for the presentation layer to observe. The sim never
/// renders; explosions, tweens, shake and floating text all hang off these.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    LaneChanged { from: usize, to: usize },
    EnemySpawned { id: u32, lane: usize, tint: EnemyTint },
    EnemyResolved { id: u32, cause: ResolveCause, pos: Vec2, tint: EnemyTint },
    ScoreDelta { delta: i64, pos: Vec2 },
    CountdownTick { remain_secs: i32 },
    UltStarted,
    UltEnded,
    RushStarted,
    RushEnded,
    BombChargeStarted,
    BombFired,
    CameraShake,
    ScreenFlash,
    SessionFinished { mode: GameMode, score: i64 },
}

/// Complete session state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    rng: Pcg32,
    pub mode: GameMode,
    pub phase: GamePhase,
    /// Simulation clock, milliseconds since session start
    pub now_ms: f64,
    /// Countdown seconds remaining
    pub remain_secs: i32,
    /// Current lane index, 0..=2
    pub lane: usize,
    pub score: i64,
    pub swipe: SwipeTracker,
    pub ult: TimedGauge,
    pub erg: TimedGauge,
    pub bomb: Bomb,
    pub enemies: Vec<Enemy>,
    /// Absolute fire-no-earlier-than timestamps
    pub(crate) next_spawn_at_ms: f64,
    pub(crate) next_rush_spawn_at_ms: Option<f64>,
    pub(crate) next_countdown_at_ms: f64,
    /// Pending events, drained by the embedder each frame
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    pub fn new(mode: GameMode, seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            mode,
            phase: GamePhase::Running,
            now_ms: 0.0,
            remain_secs: mode.duration_secs(),
            lane: 1,
            score: 0,
            swipe: SwipeTracker::new(),
            ult: TimedGauge::new(GaugeConfig {
                duration_ms: ULT_DURATION_MS,
                cooldown_ms: 0.0,
                decay_per_sec: 0.0,
            }),
            erg: TimedGauge::new(GaugeConfig {
                duration_ms: RUSH_DURATION_MS,
                cooldown_ms: RUSH_COOLDOWN_MS,
                decay_per_sec: ERG_DECAY_PER_SEC,
            }),
            bomb: Bomb::new(),
            enemies: Vec::new(),
            next_spawn_at_ms: mode.spawn_interval_ms(),
            next_rush_spawn_at_ms: None,
            next_countdown_at_ms: 1_000.0,
            events: Vec::new(),
            next_id: 1,
        }
    }

    pub fn player_pos(&self) -> Vec2 {
        Vec2::new(LANE_XS[self.lane], PLAYER_Y)
    }

    pub fn is_rush(&self) -> bool {
        self.erg.is_active()
    }

    pub fn is_ult(&self) -> bool {
        self.ult.is_active()
    }

    /// Take the pending events for presentation
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    // ── Lane track ──────────────────────────────────────────────

    /// Move one lane left (-1) or right (1), clamped at the track edges.
    /// Reports a transition only when the index actually changes.
    pub fn move_lane(&mut self, dir: i32) {
        let next = (self.lane as i32 + dir.signum()).clamp(0, LANE_XS.len() as i32 - 1) as usize;
        if next != self.lane {
            self.events.push(GameEvent::LaneChanged {
                from: self.lane,
                to: next,
            });
            self.lane = next;
        }
    }

    // ── Input plumbing ──────────────────────────────────────────

    pub fn pointer_down(&mut self, pos: Vec2) {
        self.swipe.pointer_down(pos);
    }

    pub fn pointer_move(&mut self, pos: Vec2) {
        if let Some(dir) = self.swipe.pointer_move(pos, self.now_ms) {
            self.move_lane(dir);
        }
    }

    pub fn pointer_up(&mut self, pos: Vec2) {
        self.swipe.pointer_up(pos, self.now_ms);
    }

    /// Discrete left/right key press
    pub fn press_key(&mut self, dir: i32) {
        self.move_lane(dir);
        self.swipe.set_key_dir(dir, self.now_ms);
    }

    /// Bomb hold began (button or key, shared state)
    pub fn bomb_press(&mut self) {
        if self.bomb.start_hold(self.now_ms) {
            self.events.push(GameEvent::BombChargeStarted);
        }
    }

    /// Bomb hold released; fires if the charge completed
    pub fn bomb_release(&mut self) {
        if self.bomb.release(self.now_ms) == BombRelease::Fired {
            self.fire_bomb();
        }
    }

    /// Pointer slid off the bomb control mid-hold
    pub fn bomb_pointer_out(&mut self) {
        self.bomb.cancel_hold();
    }

    // ── Score ledger ────────────────────────────────────────────

    /// Signed, unbounded below. Every delta is reported at the player's
    /// position for floating-text feedback.
    pub fn add_score(&mut self, delta: i64) {
        self.score += delta;
        self.events.push(GameEvent::ScoreDelta {
            delta,
            pos: self.player_pos() - Vec2::new(0.0, 40.0),
        });
    }

    // ── Enemies ─────────────────────────────────────────────────

    /// Inject one enemy into a random lane above the field
    pub fn spawn_enemy(&mut self, rush_spawned: bool) {
        let lane = self.rng.random_range(0..LANE_XS.len());
        let fall_speed = if rush_spawned {
            self.rng.random_range(RUSH_FALL_SPEED_MIN..=RUSH_FALL_SPEED_MAX)
        } else {
            self.rng.random_range(FALL_SPEED_MIN..=FALL_SPEED_MAX)
        };
        let tint = if self.is_rush() || rush_spawned {
            EnemyTint::Rush
        } else {
            EnemyTint::Normal
        };
        let id = self.next_entity_id();
        self.enemies.push(Enemy {
            id,
            lane,
            pos: Vec2::new(LANE_XS[lane], SPAWN_Y),
            fall_speed,
            phase: EnemyPhase::Falling,
            tint,
        });
        self.events.push(GameEvent::EnemySpawned { id, lane, tint });
    }

    /// Recolor all live enemies (rush start/end)
    pub fn retint_all(&mut self, tint: EnemyTint) {
        for e in &mut self.enemies {
            e.tint = tint;
        }
    }

    /// Detonation: clear every live enemy, +1 each
    pub fn fire_bomb(&mut self) {
        self.events.push(GameEvent::ScreenFlash);
        self.events.push(GameEvent::CameraShake);
        self.events.push(GameEvent::BombFired);
        self.blast_all();
        self.bomb.fired(self.now_ms);
    }

    /// Defeat-and-score every live enemy with the bomb treatment. Also used
    /// by the after-blast window scan in the tick.
    pub fn blast_all(&mut self) {
        for e in std::mem::take(&mut self.enemies) {
            self.score += SCORE_BOMB_KILL;
            self.events.push(GameEvent::ScoreDelta {
                delta: SCORE_BOMB_KILL,
                pos: self.player_pos() - Vec2::new(0.0, 40.0),
            });
            self.events.push(GameEvent::EnemyResolved {
                id: e.id,
                cause: ResolveCause::BombKill,
                pos: e.pos,
                tint: e.tint,
            });
        }
    }

    /// End the session and report the final score
    pub(crate) fn finish(&mut self) {
        self.phase = GamePhase::Finished;
        self.events.push(GameEvent::SessionFinished {
            mode: self.mode,
            score: self.score,
        });
    }
}
