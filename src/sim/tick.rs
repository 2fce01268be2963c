//! Per-frame race update
//!
//! One call advances the race by one fixed step. The step is cadence-agnostic;
//! the host decides how often to call it (nominally 60 Hz).

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::{first_collision, in_pickup_range};
use super::spawn::{roll_weather, spawn_power_up, spawn_traffic, traffic_spawn_chance};
use super::state::{PowerUpKind, RaceEnd, RaceEvent, RaceState};
use crate::consts::*;

/// Nitro below this is treated as empty (f32 drift from repeated 0.1 steps)
const NITRO_EPSILON: f32 = 1e-4;

/// Control snapshot for a single tick, sampled by the input layer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlInput {
    pub accelerate: bool,
    pub brake: bool,
    pub steer_left: bool,
    pub steer_right: bool,
    pub nitro: bool,
    /// Pause request (handled by the session, ignored by the step itself)
    #[serde(default)]
    pub pause: bool,
}

/// Result of a pure tick
#[derive(Debug, Clone)]
pub struct TickOutput {
    pub state: RaceState,
    pub events: Vec<RaceEvent>,
}

/// Advance a race by one step, returning the new state and what happened.
///
/// A stopped race is returned unchanged with no events.
pub fn tick(state: &RaceState, input: &ControlInput) -> TickOutput {
    let mut next = state.clone();
    let events = step(&mut next, input);
    TickOutput { state: next, events }
}

/// In-place form of [`tick`], used by the session which owns the canonical state
pub fn step(state: &mut RaceState, input: &ControlInput) -> Vec<RaceEvent> {
    let mut events = Vec::new();
    if !state.running {
        return events;
    }

    let multiplier = speed_multiplier(state, input, &mut events);
    update_speed(state, input, multiplier);

    // Lane changes are instant; x snaps to the lane centre
    if input.steer_left {
        state.player.steer_left();
    }
    if input.steer_right {
        state.player.steer_right();
    }

    let player_speed = state.player.speed;
    state.scroll_offset += player_speed * SCROLL_FACTOR;

    spawn_entities(state, &mut events);

    // Traffic scrolls relative to the player; power-ups sit still on the road
    for car in state.traffic.iter_mut() {
        car.pos.y += (player_speed - car.speed) * SCROLL_FACTOR;
    }
    state
        .traffic
        .retain(|car| car.pos.y < TRACK_HEIGHT + TRAFFIC_DESPAWN_MARGIN);

    for power_up in state.power_ups.iter_mut() {
        power_up.pos.y += player_speed * SCROLL_FACTOR;
    }
    state
        .power_ups
        .retain(|p| p.pos.y < TRACK_HEIGHT + POWERUP_DESPAWN_MARGIN);

    collect_power_ups(state, &mut events);

    if resolve_collisions(state, &mut events) {
        // Out of lives: nothing else happens this tick
        state.time_ticks += 1;
        return events;
    }

    // Score: base points from speed, scaled by the survived-tick combo
    let base_points = (player_speed * SCROLL_FACTOR).floor().max(0.0) as u64;
    state.combo = state.combo.saturating_add(1);
    state.score += base_points * (1 + state.combo_multiplier() as u64);

    if state.rng.random_bool(WEATHER_CHANGE_CHANCE) {
        let weather = roll_weather(&mut state.rng);
        if weather != state.weather {
            log::info!("Weather changed: {} -> {}", state.weather.as_str(), weather.as_str());
            state.weather = weather;
            events.push(RaceEvent::WeatherChanged { weather });
        }
    }

    state.time_ticks += 1;
    events
}

/// Consume boost/nitro for this tick and return the combined speed multiplier
fn speed_multiplier(state: &mut RaceState, input: &ControlInput, events: &mut Vec<RaceEvent>) -> f32 {
    let mut multiplier = 1.0;

    if state.boost_ticks > 0 {
        multiplier = BOOST_MULTIPLIER;
        state.boost_ticks -= 1;
        if state.boost_ticks == 0 {
            events.push(RaceEvent::BoostExpired);
        }
    }

    // Nitro overrides boost rather than stacking with it
    if input.nitro && state.nitro > 0.0 {
        multiplier = NITRO_MULTIPLIER;
        state.nitro -= NITRO_DRAIN_PER_TICK;
        if state.nitro <= NITRO_EPSILON {
            state.nitro = 0.0;
            events.push(RaceEvent::NitroDepleted);
        }
    }

    multiplier * state.weather.speed_factor()
}

fn update_speed(state: &mut RaceState, input: &ControlInput, multiplier: f32) {
    let max_speed = state.effective_max_speed(multiplier);
    let accel = state.player.profile.acceleration;
    let car = &mut state.player;

    if input.accelerate && car.speed < max_speed {
        car.speed += accel * ACCEL_FACTOR * multiplier;
    } else if input.brake {
        car.speed = (car.speed - BRAKE_DECEL).max(0.0);
    } else {
        car.speed = (car.speed - COAST_DECEL).max(COAST_FLOOR);
    }

    // Losing a multiplier drops the car straight to the new ceiling
    car.speed = car.speed.min(max_speed).max(0.0);
}

fn spawn_entities(state: &mut RaceState, events: &mut Vec<RaceEvent>) {
    if state.rng.random_bool(traffic_spawn_chance(state.difficulty)) {
        let id = state.next_entity_id();
        let car = spawn_traffic(&mut state.rng, id);
        log::debug!("Traffic {} spawned in lane {} at speed {:.1}", id, car.lane, car.speed);
        events.push(RaceEvent::TrafficSpawned { id, lane: car.lane });
        state.traffic.push(car);
    }

    if state.rng.random_bool(POWERUP_SPAWN_CHANCE) {
        let id = state.next_entity_id();
        let power_up = spawn_power_up(&mut state.rng, id);
        let lane = ((power_up.pos.x / LANE_WIDTH) as u8).min(LANES - 1);
        log::debug!("Power-up {} ({}) spawned in lane {}", id, power_up.kind.as_str(), lane);
        events.push(RaceEvent::PowerUpSpawned {
            id,
            kind: power_up.kind,
            lane,
        });
        state.power_ups.push(power_up);
    }
}

fn collect_power_ups(state: &mut RaceState, events: &mut Vec<RaceEvent>) {
    let mut bonus = 0;
    for power_up in state.power_ups.iter_mut() {
        if power_up.collected || !in_pickup_range(&state.player, power_up) {
            continue;
        }
        power_up.collected = true;
        match power_up.kind {
            PowerUpKind::Boost => state.boost_ticks = BOOST_DURATION_TICKS,
            PowerUpKind::Shield => state.shield_ticks = SHIELD_DURATION_TICKS,
            PowerUpKind::Points => bonus += POINTS_BONUS,
        }
        events.push(RaceEvent::PowerUpCollected { kind: power_up.kind });
    }
    state.score += bonus;
    state.power_ups.retain(|p| !p.collected);
}

/// Returns true if the race ended this tick
fn resolve_collisions(state: &mut RaceState, events: &mut Vec<RaceEvent>) -> bool {
    // Shield grants full immunity and drains whether or not anything is hit
    if state.shield_ticks > 0 {
        state.shield_ticks -= 1;
        if state.shield_ticks == 0 {
            events.push(RaceEvent::ShieldExpired);
        }
        return false;
    }

    // At most one collision per tick
    let Some(index) = first_collision(&state.player, &state.traffic) else {
        return false;
    };

    let car = state.traffic.remove(index);
    state.lives = state.lives.saturating_sub(1);
    state.combo = 0;
    log::debug!("Collision with traffic {}, {} lives left", car.id, state.lives);
    events.push(RaceEvent::CollisionOccurred {
        lives_remaining: state.lives,
    });

    if state.lives == 0 && state.finish(RaceEnd::LivesExhausted) {
        log::info!("Out of lives at tick {} with score {}", state.time_ticks, state.score);
        events.push(RaceEvent::LivesExhausted);
        return true;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use crate::config::RaceConfig;
    use crate::sim::state::{PowerUp, TrafficUnit, Weather};
    use glam::Vec2;

    fn new_race(seed: u64) -> RaceState {
        let config = RaceConfig::new(catalog::find_vehicle("sports").unwrap(), 1, 60, seed).unwrap();
        RaceState::new(&config)
    }

    fn traffic_on_player(state: &mut RaceState) -> u32 {
        let id = state.next_entity_id();
        let mut car = TrafficUnit::player(id, catalog::find_vehicle("truck").unwrap());
        car.is_player = false;
        // Same speed as the player so it doesn't scroll away this tick
        car.speed = state.player.speed;
        car.pos = state.player.pos;
        state.traffic.push(car);
        id
    }

    fn accelerate() -> ControlInput {
        ControlInput {
            accelerate: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_accelerate_from_standstill() {
        let state = new_race(1);
        let out = tick(&state, &accelerate());
        // 0 + 8 * 0.5 * 1
        assert_eq!(out.state.player.speed, 4.0);
        assert_eq!(out.state.time_ticks, 1);
        // Input state is untouched
        assert_eq!(state.player.speed, 0.0);
    }

    #[test]
    fn test_coast_floor_and_brake() {
        let mut state = new_race(1);
        let out = tick(&state, &ControlInput::default());
        assert_eq!(out.state.player.speed, COAST_FLOOR);

        state.player.speed = 100.0;
        let brake = ControlInput {
            brake: true,
            ..Default::default()
        };
        let out = tick(&state, &brake);
        assert_eq!(out.state.player.speed, 85.0);

        state.player.speed = 10.0;
        let out = tick(&state, &brake);
        assert_eq!(out.state.player.speed, 0.0);
    }

    #[test]
    fn test_speed_capped_at_effective_max() {
        let mut state = new_race(1);
        state.player.speed = 199.0;
        let out = tick(&state, &accelerate());
        assert_eq!(out.state.player.speed, 200.0);

        // Rain lowers the ceiling to 160
        state.weather = Weather::Rain;
        state.player.speed = 190.0;
        let out = tick(&state, &accelerate());
        assert!(out.state.player.speed <= 160.0);

        // Fog: 200 * 0.9
        state.weather = Weather::Fog;
        state.player.speed = 199.0;
        let out = tick(&state, &accelerate());
        assert!((out.state.player.speed - 180.0).abs() < 1e-3);
    }

    #[test]
    fn test_weather_changes_over_a_long_race() {
        let mut state = new_race(31);
        let mut seen = vec![state.weather];
        let mut changes = 0;
        for _ in 0..50_000 {
            // Keep the road clear so the race can't end
            state.traffic.clear();
            let before = state.weather;
            for event in step(&mut state, &ControlInput::default()) {
                if let RaceEvent::WeatherChanged { weather } = event {
                    assert_ne!(weather, before);
                    assert_eq!(weather, state.weather);
                    changes += 1;
                    if !seen.contains(&weather) {
                        seen.push(weather);
                    }
                }
            }
        }
        assert!(state.running);
        // ~33 expected at 0.001 per tick with a 2-in-3 chance of a new mode
        assert!((10..80).contains(&changes), "weather changes {changes}");
        assert_eq!(seen.len(), Weather::ALL.len());
    }

    fn spawned_traffic(level: u32, ticks: u32) -> usize {
        let vehicle = catalog::find_vehicle("sports").unwrap();
        let mut state = RaceState::new(&RaceConfig::new(vehicle, level, 60, 77).unwrap());
        let mut spawned = 0;
        for _ in 0..ticks {
            state.traffic.clear();
            for event in step(&mut state, &ControlInput::default()) {
                if let RaceEvent::TrafficSpawned { lane, .. } = event {
                    assert!(lane < LANES);
                    spawned += 1;
                }
            }
        }
        spawned
    }

    #[test]
    fn test_traffic_spawn_rate_follows_difficulty() {
        // 0.02 per tick at level 1: ~200 in 10k ticks
        let easy = spawned_traffic(1, 10_000);
        assert!((120..290).contains(&easy), "level 1 spawned {easy}");
        // Level 4 is 1.9x: ~380
        let hard = spawned_traffic(4, 10_000);
        assert!((290..480).contains(&hard), "level 4 spawned {hard}");
    }

    #[test]
    fn test_expiry_events_come_before_spawns() {
        let mut state = new_race(1);
        state.boost_ticks = 1;
        state.nitro = NITRO_DRAIN_PER_TICK;
        let nitro = ControlInput {
            nitro: true,
            ..Default::default()
        };
        // Force a traffic spawn on the same tick
        state.difficulty = 1000.0;
        let out = tick(&state, &nitro);
        assert_eq!(out.events[0], RaceEvent::BoostExpired);
        assert_eq!(out.events[1], RaceEvent::NitroDepleted);
        assert!(matches!(out.events[2], RaceEvent::TrafficSpawned { .. }));
    }

    #[test]
    fn test_boost_and_nitro_multipliers() {
        let mut state = new_race(1);
        state.boost_ticks = 2;
        let out = tick(&state, &accelerate());
        assert_eq!(out.state.player.speed, 6.0); // 8 * 0.5 * 1.5
        assert_eq!(out.state.boost_ticks, 1);

        let nitro = ControlInput {
            accelerate: true,
            nitro: true,
            ..Default::default()
        };
        let out = tick(&state, &nitro);
        assert_eq!(out.state.player.speed, 8.0); // nitro overrides boost
        assert_eq!(out.state.boost_ticks, 1); // boost still drains
        assert!((out.state.nitro - 2.9).abs() < 1e-5);
    }

    #[test]
    fn test_nitro_runs_dry() {
        let mut state = new_race(1);
        let nitro = ControlInput {
            nitro: true,
            ..Default::default()
        };
        let mut depleted = 0;
        for _ in 0..40 {
            let events = step(&mut state, &nitro);
            depleted += events.iter().filter(|e| **e == RaceEvent::NitroDepleted).count();
            assert!(state.nitro >= 0.0);
            if !state.running {
                break;
            }
        }
        assert_eq!(state.nitro, 0.0);
        assert_eq!(depleted, 1);
    }

    #[test]
    fn test_lane_change_snaps_x() {
        let state = new_race(1);
        let left = ControlInput {
            steer_left: true,
            ..Default::default()
        };
        let out = tick(&state, &left);
        assert_eq!(out.state.player.lane, 0);
        assert_eq!(out.state.player.pos.x, 100.0);
        let out = tick(&out.state, &left);
        assert_eq!(out.state.player.lane, 0);
    }

    #[test]
    fn test_shield_blocks_collision() {
        let mut state = new_race(5);
        state.shield_ticks = 1;
        let id = traffic_on_player(&mut state);

        let out = tick(&state, &ControlInput::default());
        assert_eq!(out.state.shield_ticks, 0);
        assert_eq!(out.state.lives, 3);
        assert!(out.state.traffic.iter().any(|c| c.id == id));
        assert!(out.events.contains(&RaceEvent::ShieldExpired));
    }

    #[test]
    fn test_collision_costs_a_life() {
        let mut state = new_race(5);
        state.combo = 250;
        let id = traffic_on_player(&mut state);
        traffic_on_player(&mut state);

        let out = tick(&state, &ControlInput::default());
        assert_eq!(out.state.lives, 2);
        // Only the first colliding car is removed
        assert!(!out.state.traffic.iter().any(|c| c.id == id));
        assert_eq!(out.state.traffic.iter().filter(|c| c.pos.y > 400.0).count(), 1);
        // Combo reset, then this tick's survival counts
        assert_eq!(out.state.combo, 1);
        assert!(out.events.contains(&RaceEvent::CollisionOccurred { lives_remaining: 2 }));
    }

    #[test]
    fn test_last_life_ends_race() {
        let mut state = new_race(5);
        state.lives = 1;
        state.score = 1234;
        traffic_on_player(&mut state);

        let out = tick(&state, &accelerate());
        assert_eq!(out.state.lives, 0);
        assert!(!out.state.running);
        assert_eq!(out.state.end, Some(RaceEnd::LivesExhausted));
        // Scoring skipped on the fatal tick
        assert_eq!(out.state.score, 1234);
        assert_eq!(out.events.last(), Some(&RaceEvent::LivesExhausted));

        // Further ticks are no-ops
        let after = tick(&out.state, &accelerate());
        assert_eq!(after.state, out.state);
        assert!(after.events.is_empty());
    }

    #[test]
    fn test_power_up_collection() {
        let mut state = new_race(9);
        for kind in PowerUpKind::ALL {
            let id = state.next_entity_id();
            state.power_ups.push(PowerUp {
                id,
                kind,
                pos: state.player.pos,
                collected: false,
            });
        }
        // Standing start: coasting speed 20 moves power-ups 2 units, still in range
        let out = tick(&state, &ControlInput::default());
        assert_eq!(out.state.boost_ticks, BOOST_DURATION_TICKS);
        // Shield drained by one in the collision step of the same tick
        assert_eq!(out.state.shield_ticks, SHIELD_DURATION_TICKS - 1);
        assert!(out.state.score >= POINTS_BONUS);
        assert!(out.state.power_ups.iter().all(|p| p.pos.y < 0.0));
        let collected = out
            .events
            .iter()
            .filter(|e| matches!(e, RaceEvent::PowerUpCollected { .. }))
            .count();
        assert_eq!(collected, 3);
    }

    #[test]
    fn test_offscreen_entities_removed() {
        let mut state = new_race(11);
        state.player.speed = 100.0;
        let id = state.next_entity_id();
        state.power_ups.push(PowerUp {
            id,
            kind: PowerUpKind::Points,
            pos: Vec2::new(100.0, TRACK_HEIGHT + 49.0),
            collected: false,
        });
        let car_id = traffic_on_player(&mut state);
        state.traffic[0].speed = 0.0;
        state.traffic[0].pos = Vec2::new(700.0, TRACK_HEIGHT + 95.0);

        let out = tick(&state, &ControlInput::default());
        assert!(!out.state.power_ups.iter().any(|p| p.id == id));
        assert!(!out.state.traffic.iter().any(|c| c.id == car_id));
    }

    #[test]
    fn test_combo_scoring() {
        let mut state = new_race(3);
        state.player.speed = 100.0;
        state.combo = 199;
        let brake_free = ControlInput::default();
        let out = tick(&state, &brake_free);
        // Coasting: 98 -> base 9, combo 200 -> x3
        assert_eq!(out.state.combo, 200);
        assert_eq!(out.state.score, 27);

        state.combo = 10_000;
        let out = tick(&state, &brake_free);
        assert_eq!(out.state.score, 9 * 6);
    }

    #[test]
    fn test_determinism() {
        let inputs = [
            accelerate(),
            ControlInput {
                steer_right: true,
                ..Default::default()
            },
            ControlInput {
                nitro: true,
                accelerate: true,
                ..Default::default()
            },
            ControlInput::default(),
        ];
        let mut a = new_race(99999);
        let mut b = new_race(99999);
        for i in 0..2000 {
            let input = inputs[i % inputs.len()];
            let ea = step(&mut a, &input);
            let eb = step(&mut b, &input);
            assert_eq!(ea, eb);
        }
        assert_eq!(a, b);
    }
}
