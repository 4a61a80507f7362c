//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Absolute timestamps for every timer (no scheduled callbacks)
//! - No rendering or platform dependencies

pub mod bomb;
pub mod gauge;
pub mod state;
pub mod swipe;
pub mod tick;

pub use bomb::{Bomb, BombRelease};
pub use gauge::{GaugeConfig, TimedGauge};
pub use state::{
    Enemy, EnemyPhase, EnemyTint, GameEvent, GameMode, GamePhase, GameState, ResolveCause,
};
pub use swipe::SwipeTracker;
pub use tick::tick;
