//! Browser host bridge
//!
//! The page owns the actual scene engine (sprites, physics, hit testing) and
//! hands it over as a JS object. [`WebGame`] wraps it in a [`SceneHost`],
//! pairs it with [`WebAudio`] and exposes the event entry points to JS.

use std::collections::HashMap;

use glam::Vec2;
use wasm_bindgen::prelude::*;

use crate::audio::web::WebAudio;
use crate::consts::SIM_DT;
use crate::host::{
    BodyShape, ContactPair, EntityHandle, EntityId, EntityKind, Label, SceneHost, Sprite,
};
use crate::settings::LaunchConfig;
use crate::sim::{self, GameEvent, GameState, SessionPhase};

use super::FrameClock;

#[wasm_bindgen]
extern "C" {
    /// Scene engine provided by the page
    pub type JsScene;

    #[wasm_bindgen(method, js_name = playfieldWidth)]
    fn playfield_width(this: &JsScene) -> f32;
    #[wasm_bindgen(method, js_name = playfieldHeight)]
    fn playfield_height(this: &JsScene) -> f32;
    #[wasm_bindgen(method, js_name = spriteWidth)]
    fn sprite_width(this: &JsScene, sprite: &str) -> f32;
    #[wasm_bindgen(method, js_name = spriteHeight)]
    fn sprite_height(this: &JsScene, sprite: &str) -> f32;
    /// `body_w`/`body_h` of 0 means no physics body
    #[wasm_bindgen(method, js_name = createEntity)]
    fn create_entity(
        this: &JsScene,
        sprite: &str,
        body_w: f32,
        body_h: f32,
        dynamic: bool,
        kind: &str,
        x: f32,
        y: f32,
    ) -> u32;
    #[wasm_bindgen(method, js_name = destroyEntity)]
    fn destroy_entity(this: &JsScene, id: u32);
    #[wasm_bindgen(method, js_name = scheduleMotion)]
    fn schedule_motion(this: &JsScene, id: u32, dx: f32, dy: f32, duration: f32);
    #[wasm_bindgen(method, js_name = setPosition)]
    fn set_position(this: &JsScene, id: u32, x: f32, y: f32);
    #[wasm_bindgen(method, js_name = applyImpulse)]
    fn apply_impulse(this: &JsScene, id: u32, dx: f32, dy: f32);
    #[wasm_bindgen(method, js_name = setTexture)]
    fn set_texture(this: &JsScene, id: u32, sprite: &str);
    #[wasm_bindgen(method, js_name = runAnimation)]
    fn run_animation(this: &JsScene, id: u32, frames: js_sys::Array, frame_time: f32);
    #[wasm_bindgen(method, js_name = pauseScene)]
    fn pause_scene(this: &JsScene);
    #[wasm_bindgen(method, js_name = resumeScene)]
    fn resume_scene(this: &JsScene);
    #[wasm_bindgen(method, js_name = hitTest)]
    fn hit_test(this: &JsScene, x: f32, y: f32) -> js_sys::Uint32Array;
    #[wasm_bindgen(method, js_name = setLabel)]
    fn set_label(this: &JsScene, label: &str, text: Option<String>);
}

fn kind_name(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Player => "player",
        EntityKind::Money => "money",
        EntityKind::Bonus => "bonus",
        EntityKind::Cop => "cop",
        EntityKind::Ground => "ground",
        EntityKind::Ceiling => "ceiling",
        EntityKind::PlayButton => "play-button",
        EntityKind::SoundToggle => "sound-toggle",
    }
}

fn label_name(label: Label) -> &'static str {
    match label {
        Label::Score => "score",
        Label::HighestScore => "highest-score",
        Label::YourScore => "your-score",
        Label::GameOver => "game-over",
    }
}

/// [`SceneHost`] over the page's scene engine
pub struct JsSceneHost {
    scene: JsScene,
    /// Kinds of live entities, for turning JS ids back into handles
    kinds: HashMap<EntityId, EntityKind>,
}

impl JsSceneHost {
    pub fn new(scene: JsScene) -> Self {
        Self {
            scene,
            kinds: HashMap::new(),
        }
    }

    /// Handle for an id JS reported, if we created it
    pub fn handle(&self, id: EntityId) -> Option<EntityHandle> {
        self.kinds.get(&id).map(|kind| EntityHandle::new(id, *kind))
    }
}

impl SceneHost for JsSceneHost {
    fn playfield_size(&self) -> Vec2 {
        Vec2::new(self.scene.playfield_width(), self.scene.playfield_height())
    }

    fn sprite_size(&self, sprite: Sprite) -> Vec2 {
        let name = sprite.asset_name();
        Vec2::new(self.scene.sprite_width(&name), self.scene.sprite_height(&name))
    }

    fn create_entity(
        &mut self,
        sprite: Sprite,
        shape: BodyShape,
        kind: EntityKind,
        position: Vec2,
    ) -> EntityHandle {
        let (body, dynamic) = match shape {
            BodyShape::Rect { size, dynamic } => (size, dynamic),
            BodyShape::None => (Vec2::ZERO, false),
        };
        let id = self.scene.create_entity(
            &sprite.asset_name(),
            body.x,
            body.y,
            dynamic,
            kind_name(kind),
            position.x,
            position.y,
        );
        self.kinds.insert(id, kind);
        EntityHandle::new(id, kind)
    }

    fn destroy_entity(&mut self, handle: EntityHandle) {
        if self.kinds.remove(&handle.id).is_some() {
            self.scene.destroy_entity(handle.id);
        }
    }

    fn schedule_motion(&mut self, handle: EntityHandle, delta: Vec2, duration: f32) {
        self.scene.schedule_motion(handle.id, delta.x, delta.y, duration);
    }

    fn set_position(&mut self, handle: EntityHandle, position: Vec2) {
        self.scene.set_position(handle.id, position.x, position.y);
    }

    fn apply_impulse(&mut self, handle: EntityHandle, impulse: Vec2) {
        self.scene.apply_impulse(handle.id, impulse.x, impulse.y);
    }

    fn set_texture(&mut self, handle: EntityHandle, sprite: Sprite) {
        self.scene.set_texture(handle.id, &sprite.asset_name());
    }

    fn run_animation(&mut self, handle: EntityHandle, frames: &[Sprite], frame_time: f32) {
        let names = frames
            .iter()
            .map(|s| JsValue::from_str(&s.asset_name()))
            .collect::<js_sys::Array>();
        self.scene.run_animation(handle.id, names, frame_time);
    }

    fn pause_scene(&mut self) {
        self.scene.pause_scene();
    }

    fn resume_scene(&mut self) {
        self.scene.resume_scene();
    }

    fn hit_test(&self, point: Vec2) -> Vec<EntityHandle> {
        self.scene
            .hit_test(point.x, point.y)
            .to_vec()
            .into_iter()
            .filter_map(|id| self.handle(id))
            .collect()
    }

    fn set_label(&mut self, label: Label, text: Option<&str>) {
        self.scene.set_label(label_name(label), text.map(str::to_string));
    }
}

/// Game instance driven by the page
#[wasm_bindgen]
pub struct WebGame {
    state: GameState,
    scene: JsSceneHost,
    audio: WebAudio,
    clock: FrameClock,
}

#[wasm_bindgen]
impl WebGame {
    /// Start a session on `scene`.
    ///
    /// `config_json` is an optional `{ "tuning": ..., "settings": ... }`
    /// document; `asset_base` is where music files are served from.
    #[wasm_bindgen(constructor)]
    pub fn new(
        scene: JsScene,
        config_json: Option<String>,
        asset_base: String,
    ) -> Result<WebGame, JsValue> {
        console_error_panic_hook::set_once();
        // Fails if a previous instance already installed it
        let _ = console_log::init_with_level(log::Level::Info);

        let config = match config_json {
            Some(json) => {
                LaunchConfig::from_json(&json).map_err(|e| JsValue::from_str(&e.to_string()))?
            }
            None => LaunchConfig::default(),
        };

        let seed = crate::random_seed();
        log::info!("Money Hunter starting with seed {}", seed);

        let mut game = WebGame {
            state: GameState::new(seed, config.tuning, &config.settings),
            scene: JsSceneHost::new(scene),
            audio: WebAudio::new(&config.settings, &asset_base),
            clock: FrameClock::new(),
        };
        sim::start(&mut game.state, &mut game.scene, &mut game.audio);
        Ok(game)
    }

    /// Advance by a frame of `frame_dt` seconds
    pub fn update(&mut self, frame_dt: f32) {
        for _ in 0..self.clock.steps(frame_dt) {
            self.send(GameEvent::Tick { dt: SIM_DT });
        }
    }

    /// Two bodies started touching
    pub fn contact(&mut self, a: u32, b: u32) {
        let (Some(a), Some(b)) = (self.scene.handle(a), self.scene.handle(b)) else {
            return;
        };
        self.send(GameEvent::Contact(ContactPair::new(a, b)));
    }

    #[wasm_bindgen(js_name = motionFinished)]
    pub fn motion_finished(&mut self, id: u32) {
        if let Some(handle) = self.scene.handle(id) {
            self.send(GameEvent::MotionFinished(handle));
        }
    }

    /// Tap or click in playfield coordinates
    pub fn tap(&mut self, x: f32, y: f32) {
        // First gesture unlocks audio
        self.audio.resume();
        self.send(GameEvent::InputActivated(Vec2::new(x, y)));
    }

    pub fn score(&self) -> f64 {
        self.state.score() as f64
    }

    #[wasm_bindgen(js_name = highestScore)]
    pub fn highest_score(&self) -> f64 {
        self.state.highest_score() as f64
    }

    #[wasm_bindgen(js_name = isGameOver)]
    pub fn is_game_over(&self) -> bool {
        self.state.phase() == SessionPhase::GameOver
    }
}

impl WebGame {
    fn send(&mut self, event: GameEvent) {
        sim::handle_event(&mut self.state, &event, &mut self.scene, &mut self.audio);
    }
}
