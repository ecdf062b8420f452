//! Deterministic game logic
//!
//! All gameplay rules live here. Given the same seed and the same event
//! stream, a session plays out identically:
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering, physics or audio of its own; hosts do that

pub mod contact;
pub mod ground;
pub mod spawn;
pub mod state;
pub mod tick;
pub mod tier;

pub use contact::{ContactOutcome, classify};
pub use ground::GroundStrip;
pub use spawn::{SpawnBand, SpawnKind, SpawnSchedule, SpawnScheduler};
pub use state::{GameEvent, GameState, Session, SessionPhase};
pub use tick::{game_over, handle_event, restart, start};
pub use tier::{DifficultyTier, TierDurations, tier};
