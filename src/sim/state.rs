//! Game state and core simulation types
//!
//! Everything the controller mutates lives in [`GameState`], owned by the
//! caller and passed by `&mut` into every handler.

use std::collections::BTreeMap;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::ground::GroundStrip;
use super::spawn::{SpawnKind, SpawnScheduler};
use crate::audio::CueBank;
use crate::host::{ContactPair, EntityHandle, EntityId};
use crate::settings::Settings;
use crate::tuning::Tuning;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Active gameplay
    Running,
    /// Caught by a cop; scene frozen until restart
    GameOver,
}

/// Mutable run state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub score: u64,
    /// Best score since launch (never persisted)
    pub highest_score: u64,
    pub phase: SessionPhase,
    pub music_enabled: bool,
}

impl Session {
    pub fn new(music_enabled: bool) -> Self {
        Self {
            score: 0,
            highest_score: 0,
            phase: SessionPhase::Running,
            music_enabled,
        }
    }

    pub fn is_paused(&self) -> bool {
        self.phase == SessionPhase::GameOver
    }

    pub fn add_points(&mut self, points: u64) {
        self.score = self.score.saturating_add(points);
    }

    /// End the run. Returns true when it set a new highest score.
    pub fn finish(&mut self) -> bool {
        self.phase = SessionPhase::GameOver;
        if self.score > self.highest_score {
            self.highest_score = self.score;
            true
        } else {
            false
        }
    }

    /// Back to a fresh run; the highest score survives
    pub fn reset(&mut self) {
        self.score = 0;
        self.phase = SessionPhase::Running;
    }
}

/// Events delivered by the host, one at a time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Simulation time advanced by `dt` seconds
    Tick { dt: f32 },
    /// An externally timed spawn trigger fired
    SpawnTick(SpawnKind),
    /// Two bodies started touching
    Contact(ContactPair),
    /// Tap/click at a playfield point
    InputActivated(Vec2),
    /// A scheduled motion completed
    MotionFinished(EntityHandle),
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub session: Session,
    pub tuning: Tuning,
    pub scheduler: SpawnScheduler,
    /// Spawned entities still on screen (sorted by id for determinism)
    pub live: BTreeMap<EntityId, EntityHandle>,
    pub player: Option<EntityHandle>,
    pub ground: Option<GroundStrip>,
    pub sound_toggle: Option<EntityHandle>,
    /// Only present during game over
    pub play_button: Option<EntityHandle>,
    pub cues: CueBank,
    /// Running time in seconds (frozen during game over)
    pub time: f32,
    /// Scene set up and schedules started
    pub started: bool,
}

impl GameState {
    /// Create a new game state with the given seed
    pub fn new(seed: u64, tuning: Tuning, settings: &Settings) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            session: Session::new(settings.music_enabled),
            scheduler: SpawnScheduler::new(&tuning),
            tuning,
            live: BTreeMap::new(),
            player: None,
            ground: None,
            sound_toggle: None,
            play_button: None,
            cues: CueBank::default(),
            time: 0.0,
            started: false,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.session.phase
    }

    pub fn score(&self) -> u64 {
        self.session.score
    }

    pub fn highest_score(&self) -> u64 {
        self.session.highest_score
    }
}
