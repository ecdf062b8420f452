//! Difficulty tiers
//!
//! Traversal durations shrink as the score grows, so hazards and money cross
//! the screen faster. Tiers are looked up at spawn time, never cached: an
//! entity already in flight keeps the speed it was spawned with.

use serde::{Deserialize, Serialize};

/// One score band and the traversal durations it imposes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyTier {
    /// First score (inclusive) this tier applies to
    pub min_score: u64,
    /// Seconds a money bag takes to cross the playfield
    pub money_duration: f32,
    /// Seconds a cop car takes to cross the playfield
    pub cop_duration: f32,
}

/// Durations in effect for a given score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierDurations {
    pub money: f32,
    pub cop: f32,
}

pub const DEFAULT_TIERS: [DifficultyTier; 3] = [
    DifficultyTier {
        min_score: 0,
        money_duration: 4.0,
        cop_duration: 4.0,
    },
    DifficultyTier {
        min_score: 100,
        money_duration: 3.0,
        cop_duration: 3.0,
    },
    DifficultyTier {
        min_score: 200,
        money_duration: 2.5,
        cop_duration: 2.5,
    },
];

/// Bonus bags ignore the tier table
pub const BONUS_DURATION: f32 = 2.5;

/// Durations for `score` using the stock tier table
pub fn tier(score: u64) -> TierDurations {
    tier_in(&DEFAULT_TIERS, score)
}

/// Durations for `score` using a custom tier table (sorted by `min_score`)
///
/// Falls back to the stock base tier when no entry covers the score.
pub fn tier_in(tiers: &[DifficultyTier], score: u64) -> TierDurations {
    let t = tiers
        .iter()
        .rev()
        .find(|t| t.min_score <= score)
        .unwrap_or(&DEFAULT_TIERS[0]);
    TierDurations {
        money: t.money_duration,
        cop: t.cop_duration,
    }
}
