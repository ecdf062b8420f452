//! Game balance
//!
//! Every number that shapes a run lives here. Defaults reproduce the stock
//! game; a JSON file can override any subset of fields.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::sim::tier::{BONUS_DURATION, DEFAULT_TIERS, DifficultyTier, TierDurations, tier_in};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Spawning ===
    /// Seconds between money bags
    pub money_interval: f32,
    /// Seconds between cop cars
    pub cop_interval: f32,
    /// Bonus interval is drawn from `[bonus_interval_min, bonus_interval_max)` whole seconds
    pub bonus_interval_min: u32,
    pub bonus_interval_max: u32,

    // === Speed ===
    /// Score bands, sorted by `min_score`, first one starting at 0
    pub tiers: Vec<DifficultyTier>,
    /// Traversal duration for bonus bags
    pub bonus_duration: f32,

    // === Scoring ===
    pub money_points: u64,
    pub bonus_points: u64,

    // === Player ===
    /// Upward impulse per tap
    pub jump_impulse: f32,
    /// Seconds per frame of the run cycle
    pub run_frame_time: f32,

    // === Scenery ===
    /// Ground scroll speed (units per second)
    pub ground_speed: f32,
    /// How far the grass sits below the bottom edge
    pub ground_drop: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            money_interval: 1.0,
            cop_interval: 2.0,
            bonus_interval_min: 8,
            bonus_interval_max: 50,

            tiers: DEFAULT_TIERS.to_vec(),
            bonus_duration: BONUS_DURATION,

            money_points: 1,
            bonus_points: 10,

            jump_impulse: 80_000.0,
            run_frame_time: 0.1,

            ground_speed: 100.0,
            ground_drop: 16.0,
        }
    }
}

impl Tuning {
    /// Parse and validate a (possibly partial) JSON tuning document
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject values that would stall spawning or make the game speed up backwards
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("money_interval", self.money_interval)?;
        positive("cop_interval", self.cop_interval)?;
        positive("bonus_duration", self.bonus_duration)?;
        positive("run_frame_time", self.run_frame_time)?;
        positive("ground_speed", self.ground_speed)?;
        positive("jump_impulse", self.jump_impulse)?;

        if self.bonus_interval_min == 0 || self.bonus_interval_min >= self.bonus_interval_max {
            return Err(ConfigError::BonusRange {
                min: self.bonus_interval_min,
                max: self.bonus_interval_max,
            });
        }

        match self.tiers.first() {
            Some(base) if base.min_score == 0 => {}
            _ => return Err(ConfigError::MissingBaseTier),
        }
        for (i, t) in self.tiers.iter().enumerate() {
            positive("tiers.money_duration", t.money_duration)?;
            positive("tiers.cop_duration", t.cop_duration)?;
            if i > 0 {
                let prev = &self.tiers[i - 1];
                if t.min_score <= prev.min_score
                    || t.money_duration > prev.money_duration
                    || t.cop_duration > prev.cop_duration
                {
                    return Err(ConfigError::TiersOutOfOrder { index: i });
                }
            }
        }
        Ok(())
    }

    /// Traversal durations for the current score
    pub fn durations(&self, score: u64) -> TierDurations {
        tier_in(&self.tiers, score)
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}
