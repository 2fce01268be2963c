//! Race state and core simulation types
//!
//! Everything a paused race needs to resume exactly lives here, including the RNG.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::config::RaceConfig;
use crate::consts::*;
use crate::{difficulty_for_level, lane_center_x};

/// Static description of a car, supplied by the selection screens
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleProfile {
    pub id: String,
    pub name: String,
    /// CSS-style colour string, passed through to the renderer
    pub color: String,
    /// Top speed (units/tick before multipliers)
    pub max_speed: f32,
    /// Acceleration rate (units/tick², halved by the speed model)
    pub acceleration: f32,
    /// Handling rating (shown on selection screens, not simulated)
    pub handling: u8,
    /// Glyph the renderer draws for this car
    pub glyph: String,
}

/// A car on the track - the player or a piece of traffic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficUnit {
    pub id: u32,
    pub profile: VehicleProfile,
    pub pos: Vec2,
    pub speed: f32,
    pub lane: u8,
    pub is_player: bool,
    /// Aggressive traffic drives faster (50-90 instead of 40-70)
    #[serde(default)]
    pub aggressive: bool,
}

impl TrafficUnit {
    /// The player's car, centred in the start lane near the bottom of the track
    pub fn player(id: u32, profile: VehicleProfile) -> Self {
        Self {
            id,
            profile,
            pos: Vec2::new(lane_center_x(PLAYER_START_LANE), PLAYER_START_Y),
            speed: 0.0,
            lane: PLAYER_START_LANE,
            is_player: true,
            aggressive: false,
        }
    }

    /// Move to a lane, snapping x to the lane centre
    pub fn set_lane(&mut self, lane: u8) {
        self.lane = lane.min(LANES - 1);
        self.pos.x = lane_center_x(self.lane);
    }

    /// Shift one lane left. Returns true if the lane changed.
    pub fn steer_left(&mut self) -> bool {
        if self.lane > 0 {
            self.set_lane(self.lane - 1);
            true
        } else {
            false
        }
    }

    /// Shift one lane right. Returns true if the lane changed.
    pub fn steer_right(&mut self) -> bool {
        if self.lane < LANES - 1 {
            self.set_lane(self.lane + 1);
            true
        } else {
            false
        }
    }
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpKind {
    /// 1.5x speed for a few seconds
    Boost,
    /// Collision immunity for a few seconds
    Shield,
    /// Flat score bonus
    Points,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 3] = [PowerUpKind::Boost, PowerUpKind::Shield, PowerUpKind::Points];

    pub fn as_str(&self) -> &'static str {
        match self {
            PowerUpKind::Boost => "boost",
            PowerUpKind::Shield => "shield",
            PowerUpKind::Points => "points",
        }
    }
}

/// A power-up entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerUp {
    pub id: u32,
    pub kind: PowerUpKind,
    pub pos: Vec2,
    pub collected: bool,
}

/// Weather modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Weather {
    #[default]
    Clear,
    Rain,
    Fog,
}

impl Weather {
    pub const ALL: [Weather; 3] = [Weather::Clear, Weather::Rain, Weather::Fog];

    /// Multiplier applied on top of boost/nitro
    pub fn speed_factor(&self) -> f32 {
        match self {
            Weather::Clear => 1.0,
            Weather::Rain => 0.8,
            Weather::Fog => 0.9,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Weather::Clear => "clear",
            Weather::Rain => "rain",
            Weather::Fog => "fog",
        }
    }
}

/// Why a race stopped running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RaceEnd {
    /// Countdown reached zero - the race counts as completed
    TimeExpired,
    /// Lives reached zero
    LivesExhausted,
}

/// Domain events emitted while advancing the race, in emission order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RaceEvent {
    TrafficSpawned { id: u32, lane: u8 },
    PowerUpSpawned { id: u32, kind: PowerUpKind, lane: u8 },
    PowerUpCollected { kind: PowerUpKind },
    BoostExpired,
    NitroDepleted,
    ShieldExpired,
    CollisionOccurred { lives_remaining: u8 },
    LivesExhausted,
    WeatherChanged { weather: Weather },
    TimeExpired,
}

/// Complete race state (deterministic, serializable)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceState {
    /// Seed the RNG was created from
    pub seed: u64,
    /// Spawn/weather RNG
    pub rng: Pcg32,
    /// Level number (1-based)
    pub level: u32,
    /// Spawn-rate multiplier derived from level
    pub difficulty: f32,
    /// Player car
    pub player: TrafficUnit,
    /// Non-player cars (spawn order)
    pub traffic: Vec<TrafficUnit>,
    /// Uncollected power-ups (spawn order)
    pub power_ups: Vec<PowerUp>,
    pub score: u64,
    pub lives: u8,
    /// Countdown in whole seconds
    pub time_remaining: u32,
    pub running: bool,
    /// Set exactly when `running` goes false
    pub end: Option<RaceEnd>,
    /// Road scroll for lane-marking animation (not gameplay-affecting)
    pub scroll_offset: f32,
    /// Ticks of boost left
    pub boost_ticks: u32,
    /// Ticks of shield left
    pub shield_ticks: u32,
    /// Consecutive survived ticks
    pub combo: u32,
    pub weather: Weather,
    /// Remaining nitro charge
    pub nitro: f32,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Next entity ID
    next_id: u32,
}

impl RaceState {
    /// Create the starting state for a race
    pub fn new(config: &RaceConfig) -> Self {
        let mut state = Self {
            seed: config.seed,
            rng: Pcg32::seed_from_u64(config.seed),
            level: config.level,
            difficulty: difficulty_for_level(config.level),
            player: TrafficUnit::player(0, config.vehicle.clone()),
            traffic: Vec::new(),
            power_ups: Vec::new(),
            score: 0,
            lives: STARTING_LIVES,
            time_remaining: config.time_limit_secs,
            running: true,
            end: None,
            scroll_offset: 0.0,
            boost_ticks: 0,
            shield_ticks: 0,
            combo: 0,
            weather: Weather::Clear,
            nitro: STARTING_NITRO,
            time_ticks: 0,
            next_id: 0,
        };
        state.player.id = state.next_entity_id();
        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Top speed for the current tick given a speed multiplier
    pub fn effective_max_speed(&self, multiplier: f32) -> f32 {
        self.player.profile.max_speed * multiplier
    }

    /// Combo multiplier currently applied to base points
    pub fn combo_multiplier(&self) -> u32 {
        (self.combo / COMBO_STEP_TICKS).min(MAX_COMBO_MULTIPLIER)
    }

    /// Stop the race. Only the first call has any effect.
    pub(crate) fn finish(&mut self, reason: RaceEnd) -> bool {
        if !self.running {
            return false;
        }
        self.running = false;
        self.end = Some(reason);
        true
    }
}
