//! Platform abstraction layer
//!
//! Hosts that drive the game:
//! - `headless`: in-memory scene and audio for native runs and tests
//! - `web`: bridge to a JavaScript scene engine (wasm only)

pub mod headless;
#[cfg(target_arch = "wasm32")]
pub mod web;

use crate::consts::{MAX_SUBSTEPS, SIM_DT};

/// Longest frame the clock will try to catch up on
const MAX_FRAME_DT: f32 = 0.1;

/// Fixed-step accumulator turning variable frame times into sim ticks
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    accumulator: f32,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `SIM_DT` steps to run for a frame that took `frame_dt` seconds
    pub fn steps(&mut self, frame_dt: f32) -> u32 {
        if !(frame_dt > 0.0) {
            return 0;
        }
        self.accumulator += frame_dt.min(MAX_FRAME_DT);

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        substeps
    }
}
