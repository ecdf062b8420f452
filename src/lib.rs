//! Money Hunter - endless side-scrolling money grab
//!
//! Core modules:
//! - `sim`: Deterministic game logic (spawning, tiers, contacts, session lifecycle)
//! - `host`: Scene host interface the game drives (entities, motion, labels)
//! - `audio`: Sound cues and the audio host interface
//! - `platform`: Headless (native) and browser host adapters
//! - `tuning`: Data-driven game balance
//! - `settings`: Player preferences

pub mod audio;
pub mod error;
pub mod host;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod tuning;
pub mod ui;

pub use error::{AssetLoadError, ConfigError};
pub use settings::Settings;
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Default playfield (landscape phone scene)
    pub const PLAYFIELD_WIDTH: f32 = 1334.0;
    pub const PLAYFIELD_HEIGHT: f32 = 750.0;

    /// Default sprite sizes, used by the headless host
    pub const PLAYER_SIZE: (f32, f32) = (100.0, 130.0);
    pub const MONEY_SIZE: (f32, f32) = (64.0, 64.0);
    pub const BONUS_SIZE: (f32, f32) = (72.0, 72.0);
    pub const COP_SIZE: (f32, f32) = (150.0, 72.0);
    pub const GRASS_SIZE: (f32, f32) = (128.0, 64.0);
    pub const CEILING_HEIGHT: f32 = 10.0;
    pub const PLAY_BUTTON_SIZE: (f32, f32) = (160.0, 160.0);
    pub const SOUND_TOGGLE_SIZE: (f32, f32) = (64.0, 64.0);

    /// Player start position, left third of the screen
    pub const PLAYER_START_X: f32 = -400.0;
    pub const PLAYER_START_Y: f32 = 0.0;

    /// Overlay layout
    pub const PLAY_BUTTON_Y: f32 = -200.0;
    pub const SOUND_TOGGLE_MARGIN: f32 = 48.0;
}

/// Size tuple to vector
#[inline]
pub fn size_vec((w, h): (f32, f32)) -> Vec2 {
    Vec2::new(w, h)
}

/// Fresh run seed for sessions that don't ask for a fixed one
#[cfg(not(target_arch = "wasm32"))]
pub fn random_seed() -> u64 {
    rand::random()
}

#[cfg(target_arch = "wasm32")]
pub fn random_seed() -> u64 {
    js_sys::Date::now() as u64
}
