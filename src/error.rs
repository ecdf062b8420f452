//! Error types
//!
//! Nothing here is fatal to a running session: a missing cue just stays
//! silent, a bad config is reported before the game starts.

use std::fmt;

/// A named audio or texture asset could not be loaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetLoadError {
    pub name: String,
    pub reason: String,
}

impl AssetLoadError {
    pub fn new(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for AssetLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to load asset '{}': {}", self.name, self.reason)
    }
}

impl std::error::Error for AssetLoadError {}

/// Tuning/settings could not be parsed or hold values the game can't run with
#[derive(Debug)]
pub enum ConfigError {
    Parse(serde_json::Error),
    NonPositive { field: &'static str, value: f32 },
    BonusRange { min: u32, max: u32 },
    MissingBaseTier,
    TiersOutOfOrder { index: usize },
    VolumeRange { field: &'static str, value: f32 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(e) => write!(f, "invalid config json: {e}"),
            Self::NonPositive { field, value } => {
                write!(f, "{field} must be positive, got {value}")
            }
            Self::BonusRange { min, max } => {
                write!(f, "bonus interval range [{min}, {max}) is empty")
            }
            Self::MissingBaseTier => write!(f, "tier table must start at score 0"),
            Self::TiersOutOfOrder { index } => write!(
                f,
                "difficulty tier {index} must start above the previous tier and not be slower"
            ),
            Self::VolumeRange { field, value } => {
                write!(f, "{field} must be within 0.0..=1.0, got {value}")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e)
    }
}
