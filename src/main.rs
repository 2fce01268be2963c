//! Lane Racer entry point
//!
//! The browser build is driven from JS through `lane_racer::web`. The native
//! binary runs a headless race with a simple autopilot, which is handy for
//! eyeballing balance changes from the terminal.
//!
//! Usage: lane-racer [vehicle] [track] [level] [seed]

#[cfg(not(target_arch = "wasm32"))]
mod autopilot {
    use lane_racer::consts::*;
    use lane_racer::sim::{ControlInput, RaceState};

    /// How far ahead (in track units) the autopilot looks for traffic
    const LOOKAHEAD: f32 = 160.0;

    fn lane_blocked(state: &RaceState, lane: u8) -> bool {
        let y = state.player.pos.y;
        state
            .traffic
            .iter()
            .any(|car| car.lane == lane && car.pos.y < y + COLLISION_RADIUS && car.pos.y > y - LOOKAHEAD)
    }

    /// Keep the throttle down, dodge into a clear lane, brake if boxed in
    pub fn drive(state: &RaceState) -> ControlInput {
        let lane = state.player.lane;
        let mut input = ControlInput {
            accelerate: true,
            ..Default::default()
        };

        if lane_blocked(state, lane) {
            if lane > 0 && !lane_blocked(state, lane - 1) {
                input.steer_left = true;
            } else if lane < LANES - 1 && !lane_blocked(state, lane + 1) {
                input.steer_right = true;
            } else {
                input.accelerate = false;
                input.brake = true;
            }
        } else if state.time_remaining <= 10 {
            input.nitro = true;
        }
        input
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use lane_racer::consts::SIM_DT;
    use lane_racer::notify;
    use lane_racer::session::{EventLog, SessionPhase};
    use lane_racer::{HighScores, RaceConfig, RaceSession};

    env_logger::init();
    log::info!("Lane Racer (native) starting...");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let vehicle = args.first().map(String::as_str).unwrap_or("sports");
    let track = args.get(1).map(String::as_str).unwrap_or("city");
    let level = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(1);
    let seed = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(12345);

    let config = match RaceConfig::from_catalog(vehicle, track, level, seed) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(2);
        }
    };

    println!("{}", notify::race_started(&config.vehicle).description);
    let mut session = RaceSession::new(config, EventLog::default());
    while session.phase() == SessionPhase::Racing {
        let input = autopilot::drive(session.state());
        session.advance(SIM_DT, &input);
    }

    let state = session.state();
    let collisions = session
        .observer()
        .events
        .iter()
        .filter(|e| matches!(e, lane_racer::sim::RaceEvent::CollisionOccurred { .. }))
        .count();
    println!(
        "ticks: {}  lives: {}  collisions: {}  time left: {}s",
        state.time_ticks, state.lives, collisions, state.time_remaining
    );

    if let Some(result) = state.result() {
        let note = notify::race_over(result.score, result.completed);
        println!("{}: {}", note.title, note.description);

        let now_ms = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as f64)
            .unwrap_or(0.0);
        let mut scores = HighScores::load();
        if let Some(rank) = scores.add_result(&result, now_ms) {
            scores.save();
            println!("Leaderboard rank #{rank}");
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is lane_racer::web::wasm_start, this is just to satisfy the compiler
}
