//! Sound cues
//!
//! The game plays four cues through whatever [`AudioHost`] it is given.
//! Loading is best-effort: a cue that fails to load is logged once and then
//! silently skipped, the rest keep working.

#[cfg(target_arch = "wasm32")]
pub mod web;

use crate::error::AssetLoadError;

/// Sound cue types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cue {
    /// Money bag collected
    Coin,
    /// Bonus bag collected
    Bonus,
    /// Caught by a cop
    GameOver,
    /// Background music loop
    Music,
}

impl Cue {
    pub const ALL: [Cue; 4] = [Cue::Coin, Cue::Bonus, Cue::GameOver, Cue::Music];

    /// Asset name the host loads
    pub fn asset_name(&self) -> &'static str {
        match self {
            Cue::Coin => "coin",
            Cue::Bonus => "bonus",
            Cue::GameOver => "game-over",
            Cue::Music => "music",
        }
    }

    fn index(&self) -> usize {
        match self {
            Cue::Coin => 0,
            Cue::Bonus => 1,
            Cue::GameOver => 2,
            Cue::Music => 3,
        }
    }
}

/// Host-assigned handle to a loaded cue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CueHandle(pub u32);

/// Everything the game asks of its audio engine
pub trait AudioHost {
    fn load_cue(&mut self, name: &str) -> Result<CueHandle, AssetLoadError>;

    fn play(&mut self, cue: CueHandle);

    fn pause(&mut self, cue: CueHandle);
}

/// Loaded cue handles, `None` where loading failed
#[derive(Debug, Clone, Default)]
pub struct CueBank {
    handles: [Option<CueHandle>; 4],
}

impl CueBank {
    /// Load every cue, logging (not propagating) failures
    pub fn load(audio: &mut impl AudioHost) -> Self {
        let mut bank = Self::default();
        for cue in Cue::ALL {
            match audio.load_cue(cue.asset_name()) {
                Ok(handle) => bank.handles[cue.index()] = Some(handle),
                Err(e) => log::warn!("{e}; {:?} cue disabled", cue),
            }
        }
        let loaded = Cue::ALL.iter().filter(|c| bank.is_loaded(**c)).count();
        log::debug!("{} of {} cues loaded", loaded, Cue::ALL.len());
        bank
    }

    pub fn is_loaded(&self, cue: Cue) -> bool {
        self.handles[cue.index()].is_some()
    }

    pub fn play(&self, audio: &mut impl AudioHost, cue: Cue) {
        if let Some(handle) = self.handles[cue.index()] {
            audio.play(handle);
        }
    }

    pub fn pause(&self, audio: &mut impl AudioHost, cue: Cue) {
        if let Some(handle) = self.handles[cue.index()] {
            audio.pause(handle);
        }
    }
}
