//! Swipe and counter-direction detection
//!
//! Converts a pointer event stream into an immediate lane-move decision and
//! a remembered "last swipe direction" used for counter-attack angle checks.
//! Direction capture is decoupled from the move threshold: a flick too small
//! or too vertical to change lanes still records a counter direction on
//! release.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{SWIPE_AXIS_RATIO, SWIPE_FLICK_THRESHOLD, SWIPE_MOVE_THRESHOLD};

/// Per-gesture state machine: Idle -> Tracking -> (Consumed | Idle)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SwipeTracker {
    /// Gesture start, present while tracking
    start: Option<Vec2>,
    /// A committed swipe already moved the lane this gesture
    consumed: bool,
    last_dir: Vec2,
    last_at_ms: f64,
}

impl SwipeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last recorded swipe direction (normalized) and its timestamp
    pub fn last_dir(&self) -> Vec2 {
        self.last_dir
    }

    pub fn last_at_ms(&self) -> f64 {
        self.last_at_ms
    }

    pub fn pointer_down(&mut self, pos: Vec2) {
        self.start = Some(pos);
        self.consumed = false;
    }

    /// Returns a lane-move direction (-1 or 1) when the gesture commits to
    /// a horizontal swipe. At most one move per gesture.
    pub fn pointer_move(&mut self, pos: Vec2, now_ms: f64) -> Option<i32> {
        let start = self.start?;
        if self.consumed {
            return None;
        }
        let v = pos - start;
        if v.x.abs() > SWIPE_MOVE_THRESHOLD && v.x.abs() > v.y.abs() * SWIPE_AXIS_RATIO {
            self.last_dir = v.normalize();
            self.last_at_ms = now_ms;
            self.consumed = true;
            return Some(if v.x > 0.0 { 1 } else { -1 });
        }
        None
    }

    /// End the gesture. A release past the flick threshold records the
    /// counter direction even if no lane move happened.
    pub fn pointer_up(&mut self, pos: Vec2, now_ms: f64) {
        if let Some(start) = self.start.take() {
            let v = pos - start;
            if v.length() > SWIPE_FLICK_THRESHOLD {
                self.last_dir = v.normalize();
                self.last_at_ms = now_ms;
            }
        }
        self.consumed = false;
    }

    /// Keyboard bypasses the gesture machine entirely
    pub fn set_key_dir(&mut self, dir: i32, now_ms: f64) {
        self.last_dir = Vec2::new(dir.signum() as f32, 0.0);
        self.last_at_ms = now_ms;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_horizontal_swipe_moves_once() {
        let mut sw = SwipeTracker::new();
        sw.pointer_down(Vec2::new(100.0, 300.0));
        // Below threshold
        assert_eq!(sw.pointer_move(Vec2::new(110.0, 300.0), 10.0), None);
        // Crosses threshold
        assert_eq!(sw.pointer_move(Vec2::new(120.0, 302.0), 20.0), Some(1));
        // Consumed: further motion does not move again
        assert_eq!(sw.pointer_move(Vec2::new(200.0, 300.0), 30.0), None);
        assert_eq!(sw.last_at_ms(), 20.0);
    }

    #[test]
    fn test_vertical_drag_does_not_move() {
        let mut sw = SwipeTracker::new();
        sw.pointer_down(Vec2::new(100.0, 300.0));
        // dx=16 but dy=15: fails the 1.2x dominance test
        assert_eq!(sw.pointer_move(Vec2::new(116.0, 315.0), 10.0), None);
    }

    #[test]
    fn test_flick_records_direction_without_move() {
        let mut sw = SwipeTracker::new();
        sw.pointer_down(Vec2::new(100.0, 300.0));
        sw.pointer_up(Vec2::new(104.0, 290.0), 50.0);
        // 10.8 units total, mostly vertical: no move, but direction recorded
        assert_eq!(sw.last_at_ms(), 50.0);
        assert!(sw.last_dir().y < 0.0);
    }

    #[test]
    fn test_tiny_release_keeps_previous_direction() {
        let mut sw = SwipeTracker::new();
        sw.set_key_dir(-1, 5.0);
        sw.pointer_down(Vec2::new(100.0, 300.0));
        sw.pointer_up(Vec2::new(102.0, 301.0), 50.0);
        assert_eq!(sw.last_at_ms(), 5.0);
        assert_eq!(sw.last_dir(), Vec2::new(-1.0, 0.0));
    }

    #[test]
    fn test_release_overwrites_consumed_direction() {
        let mut sw = SwipeTracker::new();
        sw.pointer_down(Vec2::new(100.0, 300.0));
        assert_eq!(sw.pointer_move(Vec2::new(130.0, 300.0), 10.0), Some(1));
        // Finger curls downward before release; release direction wins
        sw.pointer_up(Vec2::new(130.0, 340.0), 60.0);
        assert_eq!(sw.last_at_ms(), 60.0);
        assert!(sw.last_dir().y > 0.0);
    }

    #[test]
    fn test_key_sets_unit_vector() {
        let mut sw = SwipeTracker::new();
        sw.set_key_dir(1, 123.0);
        assert_eq!(sw.last_dir(), Vec2::new(1.0, 0.0));
        assert_eq!(sw.last_at_ms(), 123.0);
    }
}
