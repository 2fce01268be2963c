//! Proximity tests between the player and other entities
//!
//! Cars and power-ups are treated as points; a hit is any centre-to-centre
//! distance strictly below the threshold. There is no collision response
//! beyond the binary result.

use glam::Vec2;

use super::state::{PowerUp, TrafficUnit};
use crate::consts::{COLLISION_RADIUS, PICKUP_RADIUS};

/// True if two points are closer than `threshold`
#[inline]
pub fn within(a: Vec2, b: Vec2, threshold: f32) -> bool {
    a.distance(b) < threshold
}

/// Car-on-car collision check
pub fn cars_collide(a: &TrafficUnit, b: &TrafficUnit) -> bool {
    within(a.pos, b.pos, COLLISION_RADIUS)
}

/// Whether the player is close enough to pick up a power-up
pub fn in_pickup_range(player: &TrafficUnit, power_up: &PowerUp) -> bool {
    within(player.pos, power_up.pos, PICKUP_RADIUS)
}

/// Index of the first traffic unit colliding with the player, in spawn order
pub fn first_collision(player: &TrafficUnit, traffic: &[TrafficUnit]) -> Option<usize> {
    traffic.iter().position(|car| cars_collide(player, car))
}
