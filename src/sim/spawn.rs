//! Spawn schedules
//!
//! Three independent periodic triggers: money, cops and bonus bags. They run
//! on simulation time, so stopping them is synchronous with the tick that
//! ended the session and nothing can spawn after a game over.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::host::{EntityKind, Sprite};
use crate::tuning::Tuning;

/// Most firings one schedule reports for a single tick
pub const MAX_CATCH_UP: u32 = 8;

/// Things a schedule can spawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpawnKind {
    Money,
    Cop,
    Bonus,
}

impl SpawnKind {
    pub const ALL: [SpawnKind; 3] = [SpawnKind::Money, SpawnKind::Cop, SpawnKind::Bonus];

    pub fn entity_kind(&self) -> EntityKind {
        match self {
            SpawnKind::Money => EntityKind::Money,
            SpawnKind::Cop => EntityKind::Cop,
            SpawnKind::Bonus => EntityKind::Bonus,
        }
    }

    pub fn sprite(&self) -> Sprite {
        match self {
            SpawnKind::Money => Sprite::MoneyBag,
            SpawnKind::Cop => Sprite::PoliceCar,
            SpawnKind::Bonus => Sprite::BonusBag,
        }
    }
}

/// A single repeating trigger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnSchedule {
    /// Seconds between firings
    pub interval: f32,
    /// Seconds since the last firing (or since start)
    pub elapsed: f32,
    pub active: bool,
}

impl SpawnSchedule {
    pub fn new(interval: f32) -> Self {
        Self {
            interval,
            elapsed: 0.0,
            active: false,
        }
    }

    /// (Re)start from zero phase
    pub fn start(&mut self, interval: f32) {
        self.interval = interval;
        self.elapsed = 0.0;
        self.active = true;
    }

    /// Stop firing. Stopping a stopped schedule is a no-op.
    pub fn stop(&mut self) {
        self.active = false;
    }

    /// Advance by `dt`, returning the offset into `dt` of each firing.
    ///
    /// At most [`MAX_CATCH_UP`] firings are reported per call; older ones
    /// from an oversized `dt` are dropped.
    pub fn advance(&mut self, dt: f32) -> Vec<f32> {
        if !self.active || !(self.interval > 0.0) || !(dt > 0.0) {
            return Vec::new();
        }
        self.elapsed += dt;
        if self.elapsed < self.interval {
            return Vec::new();
        }

        let due = (self.elapsed / self.interval).floor();
        let fires = due.min(MAX_CATCH_UP as f32) as u32;
        // fmod is exact, so this lands in [0, interval) even for huge values
        self.elapsed = self.elapsed.rem_euclid(self.interval);

        (0..fires)
            .rev()
            .map(|later| dt - (self.elapsed + later as f32 * self.interval))
            .collect()
    }
}

/// The three schedules of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnScheduler {
    pub money: SpawnSchedule,
    pub cop: SpawnSchedule,
    pub bonus: SpawnSchedule,
}

impl SpawnScheduler {
    /// All three schedules, stopped
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            money: SpawnSchedule::new(tuning.money_interval),
            cop: SpawnSchedule::new(tuning.cop_interval),
            bonus: SpawnSchedule::new(tuning.bonus_interval_max as f32),
        }
    }

    /// Start every schedule from zero phase.
    ///
    /// The bonus interval is drawn here, once, and then repeats unchanged
    /// until the next start.
    pub fn start(&mut self, rng: &mut impl Rng, tuning: &Tuning) {
        let bonus_interval =
            rng.random_range(tuning.bonus_interval_min..tuning.bonus_interval_max) as f32;
        self.money.start(tuning.money_interval);
        self.cop.start(tuning.cop_interval);
        self.bonus.start(bonus_interval);
        log::debug!(
            "Spawn schedules started (money {}s, cop {}s, bonus {}s)",
            tuning.money_interval,
            tuning.cop_interval,
            bonus_interval
        );
    }

    pub fn stop(&mut self) {
        self.money.stop();
        self.cop.stop();
        self.bonus.stop();
    }

    pub fn schedule(&self, kind: SpawnKind) -> &SpawnSchedule {
        match kind {
            SpawnKind::Money => &self.money,
            SpawnKind::Cop => &self.cop,
            SpawnKind::Bonus => &self.bonus,
        }
    }

    pub fn is_active(&self, kind: SpawnKind) -> bool {
        self.schedule(kind).active
    }

    pub fn all_active(&self) -> bool {
        SpawnKind::ALL.iter().all(|k| self.is_active(*k))
    }

    /// Advance all schedules, returning what fired in firing order
    pub fn advance(&mut self, dt: f32) -> Vec<SpawnKind> {
        let mut fired: Vec<(f32, SpawnKind)> = Vec::new();
        for (schedule, kind) in [
            (&mut self.money, SpawnKind::Money),
            (&mut self.cop, SpawnKind::Cop),
            (&mut self.bonus, SpawnKind::Bonus),
        ] {
            fired.extend(schedule.advance(dt).into_iter().map(|t| (t, kind)));
        }
        // Stable: simultaneous firings keep money, cop, bonus order
        fired.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        fired.into_iter().map(|(_, kind)| kind).collect()
    }
}

/// Vertical band an entity may spawn in
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnBand {
    pub min_y: f32,
    pub max_y: f32,
}

impl SpawnBand {
    /// Band for an entity of `entity` size: fully on screen and above the ground strip
    pub fn new(playfield: Vec2, entity: Vec2, ground_height: f32) -> Self {
        Self {
            max_y: playfield.y / 2.0 - entity.y / 2.0,
            min_y: -playfield.y / 2.0 + entity.y / 2.0 + ground_height,
        }
    }

    pub fn range(&self) -> f32 {
        self.max_y - self.min_y
    }

    /// Random Y within the band; a degenerate band pins to `min_y`
    pub fn sample(&self, rng: &mut impl Rng) -> f32 {
        let range = self.range();
        if !(range > 0.0) {
            return self.min_y;
        }
        (self.max_y - rng.random_range(0.0..range)).max(self.min_y)
    }
}

/// Spawn point just past the right edge
pub fn spawn_position(playfield: Vec2, entity: Vec2, y: f32) -> Vec2 {
    Vec2::new(playfield.x / 2.0 + entity.x / 2.0, y)
}

/// Leftward travel that carries an entity across the playfield
pub fn traversal(playfield: Vec2, entity: Vec2) -> Vec2 {
    Vec2::new(-(playfield.x + entity.x / 2.0), 0.0)
}
