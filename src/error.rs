use core::fmt;

/// Rejected race or preference configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    UnknownVehicle { id: String },
    UnknownTrack { id: String },
    LevelOutOfRange { level: u32 },
    TimeLimitOutOfRange { secs: u32 },
    InvalidVehicle { id: String, reason: &'static str },
    Json { message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownVehicle { id } => write!(f, "unknown vehicle: {id}"),
            Self::UnknownTrack { id } => write!(f, "unknown track: {id}"),
            Self::LevelOutOfRange { level } => write!(f, "level must be at least 1, got {level}"),
            Self::TimeLimitOutOfRange { secs } => {
                write!(f, "time limit must be at least 1 second, got {secs}")
            }
            Self::InvalidVehicle { id, reason } => write!(f, "invalid vehicle {id}: {reason}"),
            Self::Json { message } => write!(f, "malformed config: {message}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json {
            message: err.to_string(),
        }
    }
}
