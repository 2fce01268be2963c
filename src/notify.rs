//! Toast notifications for race events
//!
//! The simulation never talks to the player directly; the UI layer passes the
//! events it receives through here to get something to show.

use serde::{Deserialize, Serialize};

use crate::settings::Settings;
use crate::sim::{PowerUpKind, RaceEvent, VehicleProfile};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Success,
    Destructive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub severity: Severity,
}

impl Notification {
    fn new(title: impl Into<String>, description: impl Into<String>, severity: Severity) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            severity,
        }
    }
}

/// Notification for a single event, if it deserves one
pub fn notification_for(event: &RaceEvent) -> Option<Notification> {
    let note = match event {
        RaceEvent::PowerUpCollected { kind } => match kind {
            PowerUpKind::Boost => {
                Notification::new("Speed Boost!", "3 seconds of extra speed!", Severity::Success)
            }
            PowerUpKind::Shield => {
                Notification::new("Shield Activated!", "5 seconds of protection!", Severity::Success)
            }
            PowerUpKind::Points => Notification::new("Bonus Points!", "+500 points!", Severity::Success),
        },
        RaceEvent::CollisionOccurred { lives_remaining } => Notification::new(
            "Collision!",
            format!("Lives remaining: {lives_remaining}"),
            Severity::Destructive,
        ),
        RaceEvent::WeatherChanged { weather } => Notification::new(
            "Weather Change",
            format!("Conditions are now {}", weather.as_str()),
            Severity::Info,
        ),
        RaceEvent::NitroDepleted => Notification::new("Nitro Empty", "No nitro left", Severity::Info),
        _ => return None,
    };
    Some(note)
}

/// Notifications for a tick's events, honouring the player's preference
pub fn notifications_for(events: &[RaceEvent], settings: &Settings) -> Vec<Notification> {
    if !settings.notifications {
        return Vec::new();
    }
    events.iter().filter_map(notification_for).collect()
}

pub fn race_started(vehicle: &VehicleProfile) -> Notification {
    Notification::new(
        "Race Started!",
        format!("Good luck with your {}!", vehicle.name),
        Severity::Info,
    )
}

pub fn race_over(score: u64, completed: bool) -> Notification {
    if completed {
        Notification::new(
            "Level Completed!",
            format!("Great job! Score: {}", format_score(score)),
            Severity::Success,
        )
    } else {
        Notification::new(
            "Game Over",
            format!("Final score: {}", format_score(score)),
            Severity::Destructive,
        )
    }
}

pub fn level_started(level: u32, time_limit_secs: u32) -> Notification {
    Notification::new(
        format!("Level {level}"),
        format!("Increased difficulty! Time limit: {time_limit_secs}s"),
        Severity::Info,
    )
}

pub fn new_high_score(score: u64) -> Notification {
    Notification::new(
        "New High Score!",
        format!("Amazing! You scored {} points!", format_score(score)),
        Severity::Success,
    )
}

/// Group digits in threes: 1234567 -> "1,234,567"
pub fn format_score(score: u64) -> String {
    let digits = score.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
