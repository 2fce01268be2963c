//! Built-in cars and tracks
//!
//! Static data the selection screens offer; the simulation only ever sees the
//! chosen `VehicleProfile` and the track's time limit.

use serde::{Deserialize, Serialize};

use crate::sim::VehicleProfile;

/// Track difficulty label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackDifficulty {
    Easy,
    Medium,
    Hard,
}

impl TrackDifficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackDifficulty::Easy => "easy",
            TrackDifficulty::Medium => "medium",
            TrackDifficulty::Hard => "hard",
        }
    }
}

/// A selectable track ("path")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    pub description: String,
    pub difficulty: TrackDifficulty,
    pub time_limit_secs: u32,
    pub glyph: String,
}

fn vehicle(id: &str, name: &str, color: &str, max_speed: f32, acceleration: f32, handling: u8, glyph: &str) -> VehicleProfile {
    VehicleProfile {
        id: id.to_string(),
        name: name.to_string(),
        color: color.to_string(),
        max_speed,
        acceleration,
        handling,
        glyph: glyph.to_string(),
    }
}

/// All selectable cars, in menu order
pub fn vehicles() -> Vec<VehicleProfile> {
    vec![
        vehicle("sports", "Sports Car", "#ff4444", 200.0, 8.0, 9, "🏎️"),
        vehicle("muscle", "Muscle Car", "#44ff44", 180.0, 9.0, 7, "🚗"),
        vehicle("truck", "Pickup Truck", "#4444ff", 150.0, 6.0, 8, "🚚"),
        vehicle("supercar", "Supercar", "#ff44ff", 250.0, 10.0, 10, "🏁"),
    ]
}

/// All selectable tracks, in menu order
pub fn tracks() -> Vec<Track> {
    let track = |id: &str, name: &str, description: &str, difficulty, time_limit_secs, glyph: &str| Track {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        difficulty,
        time_limit_secs,
        glyph: glyph.to_string(),
    };
    vec![
        track("city", "City Circuit", "Navigate through busy city streets", TrackDifficulty::Easy, 60, "🏙️"),
        track("highway", "Highway Rush", "High-speed highway racing", TrackDifficulty::Medium, 45, "🛣️"),
        track("mountain", "Mountain Pass", "Dangerous mountain curves", TrackDifficulty::Hard, 30, "⛰️"),
    ]
}

pub fn find_vehicle(id: &str) -> Option<VehicleProfile> {
    vehicles().into_iter().find(|v| v.id == id)
}

pub fn find_track(id: &str) -> Option<Track> {
    tracks().into_iter().find(|t| t.id == id)
}
