//! Scene host interface
//!
//! The game never renders, simulates physics or hit-tests on its own. It asks
//! a host to do so through [`SceneHost`] and receives what happened back as
//! [`GameEvent`](crate::sim::GameEvent)s. Entity handles carry their kind, so
//! contact routing is a pattern match instead of a category bitmask.

use std::borrow::Cow;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Host-assigned entity identifier
pub type EntityId = u32;

/// What an entity is, as far as game rules are concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    Player,
    Money,
    Bonus,
    Cop,
    Ground,
    Ceiling,
    PlayButton,
    SoundToggle,
}

impl EntityKind {
    /// Created by a spawn schedule and scrolled across the screen
    pub fn is_spawned(&self) -> bool {
        matches!(self, EntityKind::Money | EntityKind::Bonus | EntityKind::Cop)
    }
}

/// Handle to a hosted entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityHandle {
    pub id: EntityId,
    pub kind: EntityKind,
}

impl EntityHandle {
    pub fn new(id: EntityId, kind: EntityKind) -> Self {
        Self { id, kind }
    }
}

/// Texture the host draws an entity with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sprite {
    /// Player run cycle, frames 1..=6
    RunFrame(u8),
    MoneyBag,
    BonusBag,
    PoliceCar,
    Grass,
    Ceiling,
    Play,
    SoundOn,
    SoundOff,
}

/// Frames in the player run cycle
pub const RUN_FRAMES: u8 = 6;

impl Sprite {
    /// Image asset name
    pub fn asset_name(&self) -> Cow<'static, str> {
        match self {
            Sprite::RunFrame(n) => Cow::Owned(format!("frame-{n}")),
            Sprite::MoneyBag => Cow::Borrowed("money-bag"),
            Sprite::BonusBag => Cow::Borrowed("bonus"),
            Sprite::PoliceCar => Cow::Borrowed("police-car"),
            Sprite::Grass => Cow::Borrowed("grass"),
            Sprite::Ceiling => Cow::Borrowed("ceil"),
            Sprite::Play => Cow::Borrowed("play"),
            Sprite::SoundOn => Cow::Borrowed("soundOn"),
            Sprite::SoundOff => Cow::Borrowed("soundOff"),
        }
    }

    /// The full run cycle in playback order
    pub fn run_cycle() -> Vec<Sprite> {
        (1..=RUN_FRAMES).map(Sprite::RunFrame).collect()
    }
}

/// Physics body attached to an entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BodyShape {
    /// Visual only (buttons, icons)
    None,
    /// Axis-aligned rectangle of the given size; `dynamic` bodies react to
    /// impulses and gravity, static ones only report contacts and block
    Rect { size: Vec2, dynamic: bool },
}

/// Text slots the host displays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Label {
    Score,
    HighestScore,
    /// End-of-run overlay
    YourScore,
    GameOver,
}

/// Two entities the host reported as touching, in no particular order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactPair {
    pub a: EntityHandle,
    pub b: EntityHandle,
}

impl ContactPair {
    pub fn new(a: EntityHandle, b: EntityHandle) -> Self {
        Self { a, b }
    }

    pub fn sides(&self) -> [EntityHandle; 2] {
        [self.a, self.b]
    }
}

/// Everything the game asks of its scene engine
pub trait SceneHost {
    /// Playfield size; the origin sits at its center
    fn playfield_size(&self) -> Vec2;

    /// Size the host draws `sprite` at
    fn sprite_size(&self, sprite: Sprite) -> Vec2;

    fn create_entity(
        &mut self,
        sprite: Sprite,
        shape: BodyShape,
        kind: EntityKind,
        position: Vec2,
    ) -> EntityHandle;

    /// Remove an entity; unknown handles are ignored
    fn destroy_entity(&mut self, handle: EntityHandle);

    /// Move by `delta` over `duration` seconds, then report
    /// [`GameEvent::MotionFinished`](crate::sim::GameEvent::MotionFinished)
    fn schedule_motion(&mut self, handle: EntityHandle, delta: Vec2, duration: f32);

    fn set_position(&mut self, handle: EntityHandle, position: Vec2);

    fn apply_impulse(&mut self, handle: EntityHandle, impulse: Vec2);

    fn set_texture(&mut self, handle: EntityHandle, sprite: Sprite);

    /// Loop through `frames` forever
    fn run_animation(&mut self, handle: EntityHandle, frames: &[Sprite], frame_time: f32);

    /// Freeze all motion, physics and animation
    fn pause_scene(&mut self);

    fn resume_scene(&mut self);

    /// Entities under `point`, topmost first
    fn hit_test(&self, point: Vec2) -> Vec<EntityHandle>;

    /// Show `text` in a slot, or hide the slot with `None`
    fn set_label(&mut self, label: Label, text: Option<&str>);
}
