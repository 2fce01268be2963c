//! Deterministic race simulation
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One fixed step per call, cadence chosen by the host
//! - Seeded RNG only, owned by the race state
//! - Stable iteration order (spawn order)
//! - No rendering, input-device or platform dependencies

pub mod collision;
pub mod spawn;
pub mod state;
pub mod tick;
pub mod timer;

pub use collision::{cars_collide, first_collision, in_pickup_range};
pub use spawn::{TRAFFIC_PALETTE, TrafficKind, roll_weather, spawn_power_up, spawn_traffic};
pub use state::{
    PowerUp, PowerUpKind, RaceEnd, RaceEvent, RaceState, TrafficUnit, VehicleProfile, Weather,
};
pub use tick::{ControlInput, TickOutput, step, tick};
pub use timer::{RaceResult, countdown, countdown_second};
