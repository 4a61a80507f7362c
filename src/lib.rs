//! Commute Rush - a three-lane dodge-and-counter arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (lanes, enemies, gauges, bomb, scoring)
//! - `save`: Best-score persistence with merge-on-load defaults
//! - `app`: Session runner wiring the sim to a save store

pub mod app;
pub mod save;
pub mod sim;

pub use save::{SaveData, SaveStore};
pub use sim::{GameMode, GameState};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Play field dimensions (portrait phone layout)
    pub const FIELD_WIDTH: f32 = 360.0;
    pub const FIELD_HEIGHT: f32 = 640.0;

    /// Fixed lane x-coordinates
    pub const LANE_XS: [f32; 3] = [90.0, 180.0, 270.0];
    /// Player vertical position (fixed)
    pub const PLAYER_Y: f32 = FIELD_HEIGHT - 106.0;

    /// Enemies spawn this far above the field top
    pub const SPAWN_Y: f32 = -20.0;
    /// Enemies are gone once this far past the field bottom
    pub const DESPAWN_MARGIN: f32 = 20.0;

    /// Contact distance to the player (hit or ultimate kill)
    pub const CONTACT_RADIUS: f32 = 22.0;
    /// Distance at which an enemy becomes counterable
    pub const COUNTER_ARM_RADIUS: f32 = 30.0;
    /// Counter must land within this many ms of arming AND of the last swipe
    pub const COUNTER_WINDOW_MS: f64 = 120.0;
    /// Maximum angle between swipe and enemy approach (inclusive)
    pub const COUNTER_MAX_ANGLE_DEG: f32 = 35.0;

    /// Horizontal displacement that commits a swipe to a lane move
    pub const SWIPE_MOVE_THRESHOLD: f32 = 14.0;
    /// Horizontal displacement must exceed vertical by this factor to move
    pub const SWIPE_AXIS_RATIO: f32 = 1.2;
    /// Total displacement that records a counter-only flick on release
    pub const SWIPE_FLICK_THRESHOLD: f32 = 6.0;

    /// Ultimate: gauge gain per successful counter
    pub const ULT_GAIN: f32 = 25.0;
    pub const ULT_DURATION_MS: f64 = 10_000.0;

    /// Erg/Rush: gauge gain per missed-contact hit
    pub const ERG_GAIN: f32 = 33.0;
    /// Erg decays at this many percentage points per second
    pub const ERG_DECAY_PER_SEC: f32 = 6.0;
    pub const RUSH_DURATION_MS: f64 = 6_000.0;
    /// Post-rush lock during which erg neither accumulates nor decays
    pub const RUSH_COOLDOWN_MS: f64 = 1_000.0;

    /// Bomb: minimum hold before release fires
    pub const BOMB_CHARGE_MS: f64 = 400.0;
    pub const BOMB_COOLDOWN_MS: f64 = 10_000.0;
    /// After firing, newly spawned enemies are caught for this long
    pub const BOMB_BLAST_WINDOW_MS: f64 = 220.0;

    /// Base spawn interval (Night mode runs denser)
    pub const SPAWN_INTERVAL_MS: f64 = 900.0;
    pub const SPAWN_INTERVAL_NIGHT_MS: f64 = 750.0;
    /// Extra spawn source active only during rush
    pub const RUSH_SPAWN_INTERVAL_MS: f64 = 350.0;

    /// Fall speed ranges (units/second), inclusive
    pub const FALL_SPEED_MIN: f32 = 170.0;
    pub const FALL_SPEED_MAX: f32 = 230.0;
    pub const RUSH_FALL_SPEED_MIN: f32 = 200.0;
    pub const RUSH_FALL_SPEED_MAX: f32 = 260.0;

    /// Scoring weights
    pub const SCORE_ULT_KILL: i64 = 3;
    pub const SCORE_COUNTER: i64 = 3;
    pub const SCORE_COUNTER_RUSH: i64 = 1;
    pub const SCORE_BOMB_KILL: i64 = 1;
    pub const SCORE_MISS: i64 = -1;
    pub const SCORE_PASS: i64 = 1;
}

/// Angle between two non-zero vectors, in degrees
#[inline]
pub fn angle_between_deg(a: Vec2, b: Vec2) -> f32 {
    let dot = a
        .normalize_or_zero()
        .dot(b.normalize_or_zero())
        .clamp(-1.0, 1.0);
    dot.acos().to_degrees()
}
