//! Bomb charge/cooldown state
//!
//! Hold-to-charge, one-shot area clear: Idle -> Charging -> (Idle | Fired)
//! -> Cooldown -> Idle. Both trigger sources (on-screen button hold and
//! keyboard hold) share this state, so neither can double-fire.
//!
//! The actual enemy clear lives in the tick; this type only owns the
//! timestamps. Charge and cooldown display fractions are pure functions of
//! them.

use serde::{Deserialize, Serialize};

use crate::consts::{BOMB_BLAST_WINDOW_MS, BOMB_CHARGE_MS, BOMB_COOLDOWN_MS};

/// Outcome of releasing a hold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BombRelease {
    /// No hold in progress, or released during cooldown
    Ignored,
    /// Released before the charge threshold
    Canceled,
    /// Charge complete: detonate now
    Fired,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Bomb {
    cooldown_until_ms: f64,
    /// Present while charging: the timestamp the hold began
    hold_started_ms: Option<f64>,
    blast_window_until_ms: f64,
}

impl Bomb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_ready(&self, now_ms: f64) -> bool {
        now_ms >= self.cooldown_until_ms
    }

    pub fn is_charging(&self) -> bool {
        self.hold_started_ms.is_some()
    }

    /// Enemies present while this is true are caught by the blast
    pub fn in_blast_window(&self, now_ms: f64) -> bool {
        now_ms < self.blast_window_until_ms
    }

    /// Begin a hold. Rejected (false) during cooldown or if already holding.
    pub fn start_hold(&mut self, now_ms: f64) -> bool {
        if !self.is_ready(now_ms) || self.is_charging() {
            return false;
        }
        self.hold_started_ms = Some(now_ms);
        true
    }

    /// Release the hold. `Fired` only when the hold lasted the full charge
    /// threshold; the caller performs the clear and must call `fired`.
    pub fn release(&mut self, now_ms: f64) -> BombRelease {
        if !self.is_ready(now_ms) {
            self.hold_started_ms = None;
            return BombRelease::Ignored;
        }
        let Some(started) = self.hold_started_ms.take() else {
            return BombRelease::Ignored;
        };
        if now_ms - started >= BOMB_CHARGE_MS {
            BombRelease::Fired
        } else {
            BombRelease::Canceled
        }
    }

    /// Pointer left the control mid-hold: drop the charge silently
    pub fn cancel_hold(&mut self) {
        self.hold_started_ms = None;
    }

    /// Record a detonation: start the cooldown and open the after-blast
    /// window that also catches enemies spawned right after the clear.
    pub fn fired(&mut self, now_ms: f64) {
        self.cooldown_until_ms = now_ms + BOMB_COOLDOWN_MS;
        self.blast_window_until_ms = now_ms + BOMB_BLAST_WINDOW_MS;
    }

    /// Charge progress 0..1 (0 when not charging)
    pub fn charge_fraction(&self, now_ms: f64) -> f32 {
        match self.hold_started_ms {
            Some(started) if self.is_ready(now_ms) => {
                (((now_ms - started) / BOMB_CHARGE_MS).clamp(0.0, 1.0)) as f32
            }
            _ => 0.0,
        }
    }

    /// Remaining cooldown 0..1 (0 when ready)
    pub fn cooldown_fraction(&self, now_ms: f64) -> f32 {
        if self.is_ready(now_ms) {
            return 0.0;
        }
        (((self.cooldown_until_ms - now_ms) / BOMB_COOLDOWN_MS).clamp(0.0, 1.0)) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_hold_cancels() {
        let mut b = Bomb::new();
        assert!(b.start_hold(1_000.0));
        assert_eq!(b.release(1_399.0), BombRelease::Canceled);
        assert!(b.is_ready(1_399.0));
    }

    #[test]
    fn test_full_hold_fires_and_cools_down() {
        let mut b = Bomb::new();
        assert!(b.start_hold(1_000.0));
        assert_eq!(b.release(1_400.0), BombRelease::Fired);
        b.fired(1_400.0);
        assert!(!b.is_ready(11_399.0));
        assert!(b.is_ready(11_400.0));
        assert!(b.in_blast_window(1_619.0));
        assert!(!b.in_blast_window(1_620.0));
    }

    #[test]
    fn test_hold_rejected_during_cooldown() {
        let mut b = Bomb::new();
        b.start_hold(0.0);
        b.release(400.0);
        b.fired(400.0);
        assert!(!b.start_hold(5_000.0));
        assert_eq!(b.release(5_000.0), BombRelease::Ignored);
    }

    #[test]
    fn test_release_without_hold_is_ignored() {
        let mut b = Bomb::new();
        assert_eq!(b.release(100.0), BombRelease::Ignored);
    }

    #[test]
    fn test_second_source_cannot_double_charge() {
        let mut b = Bomb::new();
        assert!(b.start_hold(0.0));
        // Keyboard tries to start while the button is already held
        assert!(!b.start_hold(200.0));
        // Release still measures from the original hold start
        assert_eq!(b.release(450.0), BombRelease::Fired);
    }

    #[test]
    fn test_pointer_out_cancels() {
        let mut b = Bomb::new();
        b.start_hold(0.0);
        b.cancel_hold();
        assert_eq!(b.release(500.0), BombRelease::Ignored);
    }

    #[test]
    fn test_fractions() {
        let mut b = Bomb::new();
        b.start_hold(0.0);
        assert!((b.charge_fraction(200.0) - 0.5).abs() < 1e-6);
        b.release(400.0);
        b.fired(400.0);
        assert!((b.cooldown_fraction(5_400.0) - 0.5).abs() < 1e-6);
        assert_eq!(b.cooldown_fraction(10_400.0), 0.0);
    }
}
