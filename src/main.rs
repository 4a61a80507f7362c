//! Commute Rush entry point
//!
//! Headless demo runner: plays a zero-input session at a fixed timestep,
//! logging the events a presentation layer would animate, then reports the
//! final and best scores.

use std::time::{SystemTime, UNIX_EPOCH};

use commute_rush::app::Session;
use commute_rush::consts::SIM_DT;
use commute_rush::save::{FileBackend, SaveStore};
use commute_rush::sim::{GameEvent, GameMode};

fn parse_mode(arg: &str) -> Option<GameMode> {
    match arg {
        "morning" => Some(GameMode::Morning),
        "night" => Some(GameMode::Night),
        "day" => Some(GameMode::Day),
        _ => None,
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let mode = match args.next() {
        Some(arg) => match parse_mode(&arg) {
            Some(mode) => mode,
            None => {
                eprintln!("usage: commute-rush [morning|night|day] [seed]");
                std::process::exit(2);
            }
        },
        None => GameMode::Night,
    };
    let seed = args
        .next()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or(0)
        });

    let store = SaveStore::new(FileBackend::default());
    let mut session = Session::new(mode, seed, store);

    while !session.is_finished() {
        for ev in session.advance(SIM_DT) {
            match ev {
                GameEvent::EnemyResolved { cause, .. } => log::debug!("enemy resolved: {cause:?}"),
                GameEvent::UltStarted => log::info!("ultimate activated"),
                GameEvent::UltEnded => log::info!("ultimate ended"),
                GameEvent::RushStarted => log::info!("rush started"),
                GameEvent::RushEnded => log::info!("rush ended"),
                GameEvent::BombFired => log::info!("bomb fired"),
                GameEvent::CountdownTick { remain_secs } if remain_secs % 10 == 0 => {
                    log::info!("{remain_secs}s left, score {}", session.state.score);
                }
                _ => {}
            }
        }
    }

    println!(
        "mode={} seed={seed} score={} best={}",
        mode.as_str(),
        session.state.score,
        session.best(mode)
    );
}
