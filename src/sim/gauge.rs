//! Timed percentage gauge
//!
//! One abstraction behind both the Ultimate and the Erg/Rush meters:
//! accumulate toward 100, activate on reaching it, expire after a fixed
//! active window, then optionally lock accumulation for a cooldown.

use serde::{Deserialize, Serialize};

/// Static parameters of a gauge
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GaugeConfig {
    /// How long the gauge stays active once filled
    pub duration_ms: f64,
    /// Lock applied after the active window ends (0 = none)
    pub cooldown_ms: f64,
    /// Passive decay while inactive and unlocked, percentage points/second
    pub decay_per_sec: f32,
}

/// A 0..100 meter with a timed active window
///
/// The stored value is only meaningful while inactive; while active, the
/// render fraction is derived from the remaining time instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimedGauge {
    cfg: GaugeConfig,
    value: f32,
    active: bool,
    ends_at_ms: f64,
    lock_until_ms: f64,
}

impl TimedGauge {
    pub fn new(cfg: GaugeConfig) -> Self {
        Self {
            cfg,
            value: 0.0,
            active: false,
            ends_at_ms: 0.0,
            lock_until_ms: 0.0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Stored percentage (pinned at 100 while active)
    pub fn value(&self) -> f32 {
        if self.active { 100.0 } else { self.value }
    }

    pub fn is_locked(&self, now_ms: f64) -> bool {
        now_ms < self.lock_until_ms
    }

    /// Whether `add` would currently have any effect
    pub fn can_accumulate(&self, now_ms: f64) -> bool {
        !self.active && !self.is_locked(now_ms)
    }

    /// Accumulate toward 100. Returns true if this crossed the threshold
    /// and activated the gauge. No-op while active or locked.
    pub fn add(&mut self, amount: f32, now_ms: f64) -> bool {
        if !self.can_accumulate(now_ms) {
            return false;
        }
        self.value = (self.value + amount).clamp(0.0, 100.0);
        if self.value >= 100.0 {
            self.active = true;
            self.ends_at_ms = now_ms + self.cfg.duration_ms;
            self.value = 100.0;
            return true;
        }
        false
    }

    /// Passive decay toward 0 (inactive, unlocked only)
    pub fn decay(&mut self, dt: f32, now_ms: f64) {
        if self.active || self.is_locked(now_ms) || self.value <= 0.0 {
            return;
        }
        self.value = (self.value - self.cfg.decay_per_sec * dt).max(0.0);
    }

    /// Expire the active window if its end has passed. Returns true on the
    /// tick where deactivation happens; the value resets to 0 and the
    /// cooldown lock starts.
    pub fn expire(&mut self, now_ms: f64) -> bool {
        if !self.active || now_ms < self.ends_at_ms {
            return false;
        }
        self.active = false;
        self.value = 0.0;
        if self.cfg.cooldown_ms > 0.0 {
            self.lock_until_ms = now_ms + self.cfg.cooldown_ms;
        }
        true
    }

    /// Render fraction in 0..1: remaining active time while active,
    /// stored percentage otherwise.
    pub fn fraction(&self, now_ms: f64) -> f32 {
        if self.active {
            let left = (self.ends_at_ms - now_ms).max(0.0);
            (left / self.cfg.duration_ms) as f32
        } else {
            (self.value / 100.0).clamp(0.0, 1.0)
        }
    }
}
