//! Fixed timestep simulation tick
//!
//! One call advances the whole session by `dt`. Update order is fixed and
//! must stay fixed: clock, due spawns, after-blast scan, ultimate expiry,
//! erg decay and rush expiry, per-enemy resolution, countdown. The
//! after-blast scan runs before enemy resolution so enemies spawned earlier
//! in the same tick are still caught by an open blast window.

use crate::angle_between_deg;
use crate::consts::*;

use super::state::{EnemyPhase, EnemyTint, GameEvent, GamePhase, GameState, ResolveCause};

/// Tolerance on the inclusive counter-angle boundary
const ANGLE_EPS_DEG: f32 = 1e-3;

/// Advance the session by one timestep (seconds)
pub fn tick(state: &mut GameState, dt: f32) {
    if state.phase == GamePhase::Finished {
        return;
    }

    state.now_ms += dt as f64 * 1_000.0;
    let now = state.now_ms;

    // Due spawns. Absolute timestamps, so a long frame catches up instead
    // of drifting.
    while now >= state.next_spawn_at_ms {
        state.spawn_enemy(false);
        state.next_spawn_at_ms += state.mode.spawn_interval_ms();
    }
    if state.is_rush() {
        while let Some(at) = state.next_rush_spawn_at_ms {
            if now < at {
                break;
            }
            state.spawn_enemy(true);
            state.next_rush_spawn_at_ms = Some(at + RUSH_SPAWN_INTERVAL_MS);
        }
    }

    // After-blast window: everything live right now goes up too, including
    // enemies spawned since the detonation.
    if state.bomb.in_blast_window(now) {
        state.blast_all();
    }

    // Ultimate expiry
    if state.ult.expire(now) {
        state.events.push(GameEvent::UltEnded);
    }

    // Erg decay, then rush expiry
    state.erg.decay(dt, now);
    if state.erg.expire(now) {
        state.next_rush_spawn_at_ms = None;
        state.retint_all(EnemyTint::Normal);
        state.events.push(GameEvent::RushEnded);
    }

    resolve_enemies(state, dt);

    // 1 Hz countdown
    while state.phase == GamePhase::Running && now >= state.next_countdown_at_ms {
        state.remain_secs -= 1;
        state.next_countdown_at_ms += 1_000.0;
        state.events.push(GameEvent::CountdownTick {
            remain_secs: state.remain_secs,
        });
        if state.remain_secs <= 0 {
            state.finish();
        }
    }
}

/// Advance and resolve every live enemy. Branch order per enemy, first
/// match wins: ultimate contact, counter, missed contact, off-screen pass.
fn resolve_enemies(state: &mut GameState, dt: f32) {
    let player = state.player_pos();
    let mut i = 0;
    while i < state.enemies.len() {
        let e_pos = {
            let e = &mut state.enemies[i];
            e.pos.y += e.fall_speed * dt;
            e.pos
        };
        let d = e_pos.distance(player);
        let now = state.now_ms;

        // Ultimate contact: invulnerable and offensive
        if state.is_ult() && d < CONTACT_RADIUS {
            let e = state.enemies.remove(i);
            state.add_score(SCORE_ULT_KILL);
            state.events.push(GameEvent::EnemyResolved {
                id: e.id,
                cause: ResolveCause::UltKill,
                pos: e.pos,
                tint: e.tint,
            });
            continue;
        }

        // Counter arming, once only
        if d <= COUNTER_ARM_RADIUS {
            if let EnemyPhase::Falling = state.enemies[i].phase {
                state.enemies[i].phase = EnemyPhase::Armed { armed_at_ms: now };
            }
        }

        // Counter: recent arm, recent swipe, matching angle
        if let EnemyPhase::Armed { armed_at_ms } = state.enemies[i].phase {
            if now - armed_at_ms <= COUNTER_WINDOW_MS
                && now - state.swipe.last_at_ms() <= COUNTER_WINDOW_MS
            {
                let angle = angle_between_deg(state.swipe.last_dir(), e_pos - player);
                if angle <= COUNTER_MAX_ANGLE_DEG + ANGLE_EPS_DEG {
                    let rush = state.is_rush();
                    let e = state.enemies.remove(i);
                    state.add_score(if rush { SCORE_COUNTER_RUSH } else { SCORE_COUNTER });
                    state.events.push(GameEvent::EnemyResolved {
                        id: e.id,
                        cause: ResolveCause::CounterKill,
                        pos: e.pos,
                        tint: e.tint,
                    });
                    // Counters feed the ultimate only outside rush and ult
                    if !state.is_ult() && !rush && state.ult.add(ULT_GAIN, now) {
                        state.events.push(GameEvent::UltStarted);
                        state.events.push(GameEvent::ScreenFlash);
                    }
                    continue;
                }
            }
        }

        // Missed contact: take the hit
        if d < CONTACT_RADIUS {
            let e = state.enemies.remove(i);
            state.add_score(SCORE_MISS);
            state.events.push(GameEvent::CameraShake);
            state.events.push(GameEvent::EnemyResolved {
                id: e.id,
                cause: ResolveCause::Missed,
                pos: e.pos,
                tint: e.tint,
            });
            // Hits charge the erg meter, never during ult or rush
            if !state.is_ult() && !state.is_rush() && state.erg.add(ERG_GAIN, now) {
                start_rush(state);
            }
            continue;
        }

        // Off-screen pass: dodged
        if e_pos.y > FIELD_HEIGHT + DESPAWN_MARGIN {
            let rush = state.is_rush();
            let e = state.enemies.remove(i);
            if !rush {
                state.add_score(SCORE_PASS);
            }
            state.events.push(GameEvent::EnemyResolved {
                id: e.id,
                cause: ResolveCause::Passed,
                pos: e.pos,
                tint: e.tint,
            });
            continue;
        }

        i += 1;
    }
}

fn start_rush(state: &mut GameState) {
    state.next_rush_spawn_at_ms = Some(state.now_ms + RUSH_SPAWN_INTERVAL_MS);
    state.retint_all(EnemyTint::Rush);
    state.events.push(GameEvent::RushStarted);
    state.events.push(GameEvent::ScreenFlash);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{Enemy, GameMode};
    use glam::Vec2;

    /// Enemy pinned in place (no fall) at an offset from the player
    fn push_enemy_at(state: &mut GameState, offset: Vec2) -> u32 {
        let id = state.next_entity_id();
        let pos = state.player_pos() + offset;
        state.enemies.push(Enemy {
            id,
            lane: state.lane,
            pos,
            fall_speed: 0.0,
            phase: EnemyPhase::Falling,
            tint: EnemyTint::Normal,
        });
        id
    }

    /// Flick from the player position at `angle_deg` off straight-up
    fn flick_at_angle(state: &mut GameState, angle_deg: f32) {
        let origin = state.player_pos();
        let rad = angle_deg.to_radians();
        let dir = Vec2::new(rad.sin(), -rad.cos());
        state.pointer_down(origin);
        state.pointer_up(origin + dir * 20.0);
    }

    fn resolved_causes(events: &[GameEvent]) -> Vec<ResolveCause> {
        events
            .iter()
            .filter_map(|e| match e {
                GameEvent::EnemyResolved { cause, .. } => Some(*cause),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_counter_at_35_degrees_succeeds() {
        let mut state = GameState::new(GameMode::Morning, 1);
        push_enemy_at(&mut state, Vec2::new(0.0, -28.0));
        flick_at_angle(&mut state, 35.0);
        tick(&mut state, SIM_DT);
        assert!(state.enemies.is_empty());
        assert_eq!(state.score, SCORE_COUNTER);
        assert_eq!(resolved_causes(&state.events), vec![ResolveCause::CounterKill]);
        assert_eq!(state.ult.value(), ULT_GAIN);
    }

    #[test]
    fn test_counter_past_35_degrees_fails() {
        let mut state = GameState::new(GameMode::Morning, 1);
        push_enemy_at(&mut state, Vec2::new(0.0, -28.0));
        flick_at_angle(&mut state, 35.01);
        tick(&mut state, SIM_DT);
        // Armed but not countered; too far out for contact
        assert_eq!(state.enemies.len(), 1);
        assert_eq!(state.score, 0);
        assert!(matches!(state.enemies[0].phase, EnemyPhase::Armed { .. }));
    }

    #[test]
    fn test_stale_swipe_cannot_counter() {
        let mut state = GameState::new(GameMode::Morning, 1);
        flick_at_angle(&mut state, 0.0);
        state.now_ms = 500.0; // Swipe is now 500ms old
        push_enemy_at(&mut state, Vec2::new(0.0, -28.0));
        tick(&mut state, SIM_DT);
        assert_eq!(state.enemies.len(), 1);
    }

    #[test]
    fn test_four_counters_activate_ult_then_contact_kills() {
        let mut state = GameState::new(GameMode::Morning, 1);
        for i in 0..4 {
            state.now_ms = i as f64 * 300.0;
            push_enemy_at(&mut state, Vec2::new(0.0, -28.0));
            flick_at_angle(&mut state, 0.0);
            tick(&mut state, SIM_DT);
        }
        assert!(state.is_ult());
        assert_eq!(state.score, 4 * SCORE_COUNTER);
        assert!(state.events.contains(&GameEvent::UltStarted));
        state.drain_events();

        // Contact while ultimate is active kills the enemy instead
        push_enemy_at(&mut state, Vec2::ZERO);
        tick(&mut state, SIM_DT);
        assert!(state.enemies.is_empty());
        assert_eq!(state.score, 4 * SCORE_COUNTER + SCORE_ULT_KILL);
        assert_eq!(resolved_causes(&state.events), vec![ResolveCause::UltKill]);
        // And the hit charged no erg
        assert_eq!(state.erg.value(), 0.0);
    }

    #[test]
    fn test_missed_contact_scores_and_charges_erg() {
        let mut state = GameState::new(GameMode::Morning, 1);
        push_enemy_at(&mut state, Vec2::ZERO);
        tick(&mut state, SIM_DT);
        assert!(state.enemies.is_empty());
        assert_eq!(state.score, SCORE_MISS);
        assert_eq!(state.erg.value(), ERG_GAIN);
        assert!(state.events.contains(&GameEvent::CameraShake));
    }

    #[test]
    fn test_offscreen_pass_scores_plus_one() {
        let mut state = GameState::new(GameMode::Morning, 1);
        let id = state.next_entity_id();
        state.enemies.push(Enemy {
            id,
            lane: 0,
            pos: Vec2::new(LANE_XS[0], FIELD_HEIGHT + DESPAWN_MARGIN + 5.0),
            fall_speed: 0.0,
            phase: EnemyPhase::Falling,
            tint: EnemyTint::Normal,
        });
        tick(&mut state, SIM_DT);
        assert!(state.enemies.is_empty());
        assert_eq!(state.score, SCORE_PASS);
        assert_eq!(resolved_causes(&state.events), vec![ResolveCause::Passed]);
    }

    #[test]
    fn test_rush_lifecycle() {
        let mut state = GameState::new(GameMode::Night, 3);

        // Four hits fill the erg meter
        for _ in 0..4 {
            push_enemy_at(&mut state, Vec2::ZERO);
            tick(&mut state, SIM_DT);
        }
        assert!(state.is_rush());
        assert!(state.events.contains(&GameEvent::RushStarted));
        assert!(state.next_rush_spawn_at_ms.is_some());
        state.drain_events();

        // Off-screen pass awards nothing during rush
        let before = state.score;
        let id = state.next_entity_id();
        state.enemies.push(Enemy {
            id,
            lane: 0,
            pos: Vec2::new(LANE_XS[0], FIELD_HEIGHT + DESPAWN_MARGIN + 5.0),
            fall_speed: 0.0,
            phase: EnemyPhase::Falling,
            tint: EnemyTint::Rush,
        });
        tick(&mut state, SIM_DT);
        assert_eq!(state.score, before);

        // Counter awards +1 during rush and feeds no ult
        let before = state.score;
        push_enemy_at(&mut state, Vec2::new(0.0, -28.0));
        flick_at_angle(&mut state, 0.0);
        tick(&mut state, SIM_DT);
        assert_eq!(state.score, before + SCORE_COUNTER_RUSH);
        assert_eq!(state.ult.value(), 0.0);

        // Rush ends; stray enemies retint and the extra spawner stops
        state.now_ms += RUSH_DURATION_MS + 100.0;
        tick(&mut state, SIM_DT);
        assert!(!state.is_rush());
        assert!(state.events.contains(&GameEvent::RushEnded));
        assert!(state.next_rush_spawn_at_ms.is_none());
        assert!(state.enemies.iter().all(|e| e.tint == EnemyTint::Normal));
        state.enemies.clear();
        state.drain_events();

        // Within the post-rush lock a hit charges nothing
        push_enemy_at(&mut state, Vec2::ZERO);
        tick(&mut state, SIM_DT);
        assert_eq!(state.erg.value(), 0.0);
        assert!(!state.is_rush());
    }

    #[test]
    fn test_bomb_clears_and_after_blast_catches_new_spawn() {
        let mut state = GameState::new(GameMode::Morning, 5);
        push_enemy_at(&mut state, Vec2::new(0.0, -300.0));
        push_enemy_at(&mut state, Vec2::new(-90.0, -400.0));

        state.bomb_press();
        assert!(state.events.contains(&GameEvent::BombChargeStarted));
        state.now_ms = 450.0;
        state.bomb_release();
        assert!(state.events.contains(&GameEvent::BombFired));
        assert!(state.enemies.is_empty());
        assert_eq!(state.score, 2 * SCORE_BOMB_KILL);
        state.drain_events();

        // A spawn due inside the blast window dies in the same tick
        state.next_spawn_at_ms = 455.0;
        tick(&mut state, SIM_DT);
        assert!(state.enemies.is_empty());
        assert_eq!(state.score, 3 * SCORE_BOMB_KILL);
        assert_eq!(resolved_causes(&state.events), vec![ResolveCause::BombKill]);
    }

    #[test]
    fn test_bomb_short_hold_does_not_fire() {
        let mut state = GameState::new(GameMode::Morning, 5);
        push_enemy_at(&mut state, Vec2::new(0.0, -300.0));
        state.bomb_press();
        state.now_ms = 399.0;
        state.bomb_release();
        assert_eq!(state.enemies.len(), 1);
        assert_eq!(state.score, 0);
    }

    #[test]
    fn test_bomb_rejected_during_cooldown() {
        let mut state = GameState::new(GameMode::Morning, 5);
        state.bomb_press();
        state.now_ms = 400.0;
        state.bomb_release();
        state.drain_events();

        state.now_ms = 5_000.0;
        state.bomb_press();
        assert!(!state.bomb.is_charging());
        assert!(state.events.is_empty());
        state.now_ms = 6_000.0;
        push_enemy_at(&mut state, Vec2::new(0.0, -300.0));
        state.bomb_release();
        assert_eq!(state.enemies.len(), 1);
    }

    #[test]
    fn test_countdown_finishes_session() {
        let mut state = GameState::new(GameMode::Night, 11);
        assert_eq!(state.remain_secs, 60);
        let max_ticks = 61 * 120;
        for _ in 0..max_ticks {
            tick(&mut state, SIM_DT);
            if state.phase == GamePhase::Finished {
                break;
            }
            state.drain_events();
        }
        assert_eq!(state.phase, GamePhase::Finished);
        assert_eq!(state.remain_secs, 0);
        assert!((state.now_ms - 60_000.0).abs() < 20.0);
        let final_score = state.score;
        assert!(state.events.iter().any(|e| matches!(
            e,
            GameEvent::SessionFinished { mode: GameMode::Night, score } if *score == final_score
        )));

        // Finished sessions no longer advance
        let now = state.now_ms;
        tick(&mut state, SIM_DT);
        assert_eq!(state.now_ms, now);
    }

    #[test]
    fn test_determinism() {
        let mut a = GameState::new(GameMode::Night, 99_999);
        let mut b = GameState::new(GameMode::Night, 99_999);
        for i in 0..1_200u32 {
            if i == 120 {
                a.press_key(-1);
                b.press_key(-1);
            }
            if i == 480 {
                a.press_key(1);
                b.press_key(1);
            }
            tick(&mut a, SIM_DT);
            tick(&mut b, SIM_DT);
            a.drain_events();
            b.drain_events();
        }
        assert_eq!(a.score, b.score);
        assert_eq!(a.enemies.len(), b.enemies.len());
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }
}
