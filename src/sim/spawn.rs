//! Stochastic generators for traffic, power-ups and weather
//!
//! All draws go through the race RNG so a race replays identically from its seed.

use glam::Vec2;
use rand::Rng;

use super::state::{PowerUp, PowerUpKind, TrafficUnit, VehicleProfile, Weather};
use crate::consts::*;
use crate::lane_center_x;

/// One entry of the traffic palette
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrafficKind {
    pub glyph: &'static str,
    pub color: &'static str,
    pub aggressive: bool,
}

/// Traffic drawn uniformly at spawn time
pub const TRAFFIC_PALETTE: [TrafficKind; 7] = [
    TrafficKind { glyph: "🚗", color: "#ff6b6b", aggressive: false }, // sedan
    TrafficKind { glyph: "🚙", color: "#4ecdc4", aggressive: false }, // SUV
    TrafficKind { glyph: "🚐", color: "#45b7d1", aggressive: false }, // van
    TrafficKind { glyph: "🏎️", color: "#96ceb4", aggressive: true }, // race car
    TrafficKind { glyph: "🚚", color: "#feca57", aggressive: false }, // lorry
    TrafficKind { glyph: "🏍️", color: "#e74c3c", aggressive: true }, // motorbike
    TrafficKind { glyph: "🚓", color: "#3498db", aggressive: true }, // police
];

/// Cruising speed ranges (units/tick)
pub const AGGRESSIVE_SPEED: std::ops::Range<f32> = 50.0..90.0;
pub const NORMAL_SPEED: std::ops::Range<f32> = 40.0..70.0;
/// Nominal top speed range stamped on traffic profiles
pub const TRAFFIC_TOP_SPEED: std::ops::Range<f32> = 60.0..100.0;

/// Per-tick traffic spawn probability at a given difficulty
pub fn traffic_spawn_chance(difficulty: f32) -> f64 {
    (TRAFFIC_SPAWN_CHANCE * difficulty as f64).clamp(0.0, 1.0)
}

fn random_lane<R: Rng + ?Sized>(rng: &mut R) -> u8 {
    rng.random_range(0..LANES)
}

/// Build a traffic unit above the visible track in a random lane
pub fn spawn_traffic<R: Rng + ?Sized>(rng: &mut R, id: u32) -> TrafficUnit {
    let lane = random_lane(rng);
    let kind = TRAFFIC_PALETTE[rng.random_range(0..TRAFFIC_PALETTE.len())];
    let top_speed = rng.random_range(TRAFFIC_TOP_SPEED);
    let speed = if kind.aggressive {
        rng.random_range(AGGRESSIVE_SPEED)
    } else {
        rng.random_range(NORMAL_SPEED)
    };

    TrafficUnit {
        id,
        profile: VehicleProfile {
            id: format!("npc-{id}"),
            name: "NPC Car".to_string(),
            color: kind.color.to_string(),
            max_speed: top_speed,
            acceleration: 5.0,
            handling: 5,
            glyph: kind.glyph.to_string(),
        },
        pos: Vec2::new(lane_center_x(lane), TRAFFIC_SPAWN_Y),
        speed,
        lane,
        is_player: false,
        aggressive: kind.aggressive,
    }
}

/// Build a power-up above the visible track in a random lane
pub fn spawn_power_up<R: Rng + ?Sized>(rng: &mut R, id: u32) -> PowerUp {
    let lane = random_lane(rng);
    let kind = PowerUpKind::ALL[rng.random_range(0..PowerUpKind::ALL.len())];
    PowerUp {
        id,
        kind,
        pos: Vec2::new(lane_center_x(lane), POWERUP_SPAWN_Y),
        collected: false,
    }
}

/// Pick a weather mode uniformly (may repeat the current one)
pub fn roll_weather<R: Rng + ?Sized>(rng: &mut R) -> Weather {
    Weather::ALL[rng.random_range(0..Weather::ALL.len())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_traffic_spawns_in_lane_above_track() {
        let mut rng = Pcg32::seed_from_u64(1);
        for id in 0..200 {
            let car = spawn_traffic(&mut rng, id);
            assert!(car.lane < LANES);
            assert_eq!(car.pos.x, lane_center_x(car.lane));
            assert_eq!(car.pos.y, TRAFFIC_SPAWN_Y);
            assert!(!car.is_player);
            let range = if car.aggressive { AGGRESSIVE_SPEED } else { NORMAL_SPEED };
            assert!(range.contains(&car.speed), "speed {} outside {:?}", car.speed, range);
        }
    }

    #[test]
    fn test_palette_coverage() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut seen_lanes = [false; LANES as usize];
        let mut aggressive = 0;
        for id in 0..500 {
            let car = spawn_traffic(&mut rng, id);
            seen_lanes[car.lane as usize] = true;
            if car.aggressive {
                aggressive += 1;
            }
        }
        assert!(seen_lanes.iter().all(|&s| s));
        // 3 of 7 kinds are aggressive
        assert!((150..290).contains(&aggressive), "aggressive count {aggressive}");
    }

    #[test]
    fn test_power_up_spawn() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut kinds = Vec::new();
        for id in 0..100 {
            let p = spawn_power_up(&mut rng, id);
            assert!(!p.collected);
            assert_eq!(p.pos.y, POWERUP_SPAWN_Y);
            if !kinds.contains(&p.kind) {
                kinds.push(p.kind);
            }
        }
        assert_eq!(kinds.len(), 3);
    }

    #[test]
    fn test_spawn_chance_scales_and_clamps() {
        assert!((traffic_spawn_chance(1.0) - 0.02).abs() < 1e-9);
        assert!((traffic_spawn_chance(2.5) - 0.05).abs() < 1e-6);
        assert_eq!(traffic_spawn_chance(100.0), 1.0);
    }
}
