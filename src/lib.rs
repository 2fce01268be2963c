//! Lane Racer - A lane-based arcade racing game
//!
//! Core modules:
//! - `sim`: Deterministic race simulation (per-tick update, spawning, collisions, countdown)
//! - `session`: Host driver that serializes frames, clock seconds and lifecycle commands
//! - `catalog`: Built-in vehicles and tracks offered by the selection screens
//! - `config`: Validated race configuration
//! - `controls`: Keyboard/button state to per-frame control snapshots
//! - `notify`: Event-to-notification translation for the UI layer

pub mod catalog;
pub mod config;
pub mod controls;
pub mod error;
pub mod highscores;
pub mod notify;
pub mod session;
pub mod settings;
pub mod sim;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use config::RaceConfig;
pub use controls::Controls;
pub use error::ConfigError;
pub use highscores::HighScores;
pub use session::{RaceCommand, RaceObserver, RaceSession};
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Nominal simulation rate (one tick per rendered frame)
    pub const TICKS_PER_SECOND: u32 = 60;
    /// Fixed simulation timestep used by the real-time driver
    pub const SIM_DT: f32 = 1.0 / TICKS_PER_SECOND as f32;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame gap the driver will account for (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Track dimensions
    pub const TRACK_WIDTH: f32 = 800.0;
    pub const TRACK_HEIGHT: f32 = 600.0;
    pub const LANES: u8 = 4;
    pub const LANE_WIDTH: f32 = TRACK_WIDTH / LANES as f32;

    /// Player placement at race start
    pub const PLAYER_START_LANE: u8 = 1;
    pub const PLAYER_START_Y: f32 = TRACK_HEIGHT - 100.0;

    /// Spawn rows above the visible track
    pub const TRAFFIC_SPAWN_Y: f32 = -50.0;
    pub const POWERUP_SPAWN_Y: f32 = -30.0;
    /// Despawn margins below the visible track
    pub const TRAFFIC_DESPAWN_MARGIN: f32 = 100.0;
    pub const POWERUP_DESPAWN_MARGIN: f32 = 50.0;

    /// Relative scroll factor applied to speeds each tick
    pub const SCROLL_FACTOR: f32 = 0.1;

    /// Proximity thresholds
    pub const COLLISION_RADIUS: f32 = 40.0;
    pub const PICKUP_RADIUS: f32 = 30.0;

    /// Player resources
    pub const STARTING_LIVES: u8 = 3;
    pub const STARTING_NITRO: f32 = 3.0;
    pub const NITRO_DRAIN_PER_TICK: f32 = 0.1;

    /// Speed model (units per tick)
    pub const ACCEL_FACTOR: f32 = 0.5;
    pub const BRAKE_DECEL: f32 = 15.0;
    pub const COAST_DECEL: f32 = 2.0;
    pub const COAST_FLOOR: f32 = 20.0;

    /// Speed multipliers
    pub const BOOST_MULTIPLIER: f32 = 1.5;
    pub const NITRO_MULTIPLIER: f32 = 2.0;

    /// Power-up effects
    pub const BOOST_DURATION_TICKS: u32 = 180; // 3 seconds at 60 Hz
    pub const SHIELD_DURATION_TICKS: u32 = 300; // 5 seconds
    pub const POINTS_BONUS: u64 = 500;

    /// Combo scoring
    pub const COMBO_STEP_TICKS: u32 = 100;
    pub const MAX_COMBO_MULTIPLIER: u32 = 5;

    /// Per-tick spawn probabilities
    pub const TRAFFIC_SPAWN_CHANCE: f64 = 0.02;
    pub const POWERUP_SPAWN_CHANCE: f64 = 0.008;
    pub const WEATHER_CHANGE_CHANCE: f64 = 0.001;

    /// Difficulty ramp per level above the first
    pub const DIFFICULTY_PER_LEVEL: f32 = 0.3;

    /// Level progression
    pub const TIME_LIMIT_STEP_SECS: u32 = 5;
    pub const MIN_TIME_LIMIT_SECS: u32 = 20;
}

/// X coordinate of the centre of a lane
#[inline]
pub fn lane_center_x(lane: u8) -> f32 {
    use consts::LANE_WIDTH;
    lane as f32 * LANE_WIDTH + LANE_WIDTH / 2.0
}

/// Difficulty multiplier for a level (level 1 = 1.0)
#[inline]
pub fn difficulty_for_level(level: u32) -> f32 {
    1.0 + level.saturating_sub(1) as f32 * consts::DIFFICULTY_PER_LEVEL
}
