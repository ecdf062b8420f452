//! Event dispatch and session lifecycle
//!
//! The host feeds [`GameEvent`]s into [`handle_event`] one at a time; every
//! rule of the game runs inside that call against an exclusively borrowed
//! [`GameState`].

use glam::Vec2;

use super::contact::{ContactOutcome, classify};
use super::ground::GroundStrip;
use super::spawn::{SpawnBand, SpawnKind, spawn_position, traversal};
use super::state::{GameEvent, GameState, SessionPhase};
use crate::audio::{AudioHost, Cue, CueBank};
use crate::consts::*;
use crate::host::{BodyShape, ContactPair, EntityHandle, EntityKind, Label, SceneHost, Sprite};
use crate::ui;

/// Build the scene and start the first session. Later calls do nothing.
pub fn start(state: &mut GameState, scene: &mut impl SceneHost, audio: &mut impl AudioHost) {
    if state.started {
        return;
    }

    state.cues = CueBank::load(audio);

    let field = scene.playfield_size();

    // Player with its run cycle
    let run_cycle = Sprite::run_cycle();
    let player_size = scene.sprite_size(run_cycle[0]);
    let player = scene.create_entity(
        run_cycle[0],
        BodyShape::Rect {
            size: player_size,
            dynamic: true,
        },
        EntityKind::Player,
        Vec2::new(PLAYER_START_X, PLAYER_START_Y),
    );
    scene.run_animation(player, &run_cycle, state.tuning.run_frame_time);
    state.player = Some(player);

    // Ceiling just above the top edge
    let ceiling_height = scene.sprite_size(Sprite::Ceiling).y;
    scene.create_entity(
        Sprite::Ceiling,
        BodyShape::Rect {
            size: Vec2::new(field.x, ceiling_height),
            dynamic: false,
        },
        EntityKind::Ceiling,
        Vec2::new(0.0, field.y / 2.0 + ceiling_height / 2.0),
    );

    state.ground = Some(GroundStrip::lay(
        scene,
        state.tuning.ground_speed,
        state.tuning.ground_drop,
    ));

    // Audio toggle in the top-right corner
    let music_enabled = state.session.music_enabled;
    let toggle = scene.create_entity(
        ui::sound_icon(music_enabled),
        BodyShape::None,
        EntityKind::SoundToggle,
        Vec2::new(
            field.x / 2.0 - SOUND_TOGGLE_MARGIN,
            field.y / 2.0 - SOUND_TOGGLE_MARGIN,
        ),
    );
    state.sound_toggle = Some(toggle);
    if music_enabled {
        state.cues.play(audio, Cue::Music);
    }

    scene.set_label(Label::Score, Some(&ui::score_text(state.session.score)));
    scene.set_label(
        Label::HighestScore,
        Some(&ui::highest_score_text(state.session.highest_score)),
    );

    state.scheduler.start(&mut state.rng, &state.tuning);
    state.started = true;
    log::info!("Session started (seed {})", state.seed);
}

/// Apply one host event to the game
pub fn handle_event(
    state: &mut GameState,
    event: &GameEvent,
    scene: &mut impl SceneHost,
    audio: &mut impl AudioHost,
) {
    if !state.started {
        log::warn!("Event before start ignored: {:?}", event);
        return;
    }

    match *event {
        GameEvent::Tick { dt } => on_tick(state, dt, scene),
        GameEvent::SpawnTick(kind) => {
            // External timers can race a game over; a stopped schedule wins
            if state.session.phase == SessionPhase::Running && state.scheduler.is_active(kind) {
                spawn(state, kind, scene);
            }
        }
        GameEvent::Contact(pair) => on_contact(state, &pair, scene, audio),
        GameEvent::InputActivated(point) => on_input(state, point, scene, audio),
        GameEvent::MotionFinished(handle) => on_motion_finished(state, handle, scene),
    }
}

fn on_tick(state: &mut GameState, dt: f32, scene: &mut impl SceneHost) {
    if !(dt > 0.0 && dt.is_finite()) {
        log::debug!("Ignoring tick with dt {}", dt);
        return;
    }
    if state.session.is_paused() {
        return;
    }

    state.time += dt;

    if let Some(ground) = state.ground.as_mut() {
        ground.advance(dt, scene);
    }

    for kind in state.scheduler.advance(dt) {
        spawn(state, kind, scene);
    }
}

/// Create one spawnable entity and send it across the screen
fn spawn(state: &mut GameState, kind: SpawnKind, scene: &mut impl SceneHost) {
    let field = scene.playfield_size();
    let sprite = kind.sprite();
    let size = scene.sprite_size(sprite);
    let ground_height = match &state.ground {
        Some(ground) => ground.height(),
        None => scene.sprite_size(Sprite::Grass).y,
    };

    let y = SpawnBand::new(field, size, ground_height).sample(&mut state.rng);

    // Tier is looked up per spawn so speed-ups only affect new entities
    let duration = match kind {
        SpawnKind::Money => state.tuning.durations(state.session.score).money,
        SpawnKind::Cop => state.tuning.durations(state.session.score).cop,
        SpawnKind::Bonus => state.tuning.bonus_duration,
    };

    let handle = scene.create_entity(
        sprite,
        BodyShape::Rect {
            size,
            dynamic: false,
        },
        kind.entity_kind(),
        spawn_position(field, size, y),
    );
    scene.schedule_motion(handle, traversal(field, size), duration);
    state.live.insert(handle.id, handle);

    log::debug!(
        "Spawned {:?} #{} at y={:.1} ({}s crossing)",
        kind,
        handle.id,
        y,
        duration
    );
}

fn on_contact(
    state: &mut GameState,
    pair: &ContactPair,
    scene: &mut impl SceneHost,
    audio: &mut impl AudioHost,
) {
    if state.session.phase == SessionPhase::GameOver {
        return;
    }
    let Some(outcome) = classify(pair) else {
        return;
    };

    // Already collected or already gone
    let entity = outcome.entity();
    if state.live.remove(&entity.id).is_none() {
        log::debug!("Stale contact with #{} ignored", entity.id);
        return;
    }
    scene.destroy_entity(entity);

    match outcome {
        ContactOutcome::Money(_) => {
            state.cues.play(audio, Cue::Coin);
            state.session.add_points(state.tuning.money_points);
            scene.set_label(Label::Score, Some(&ui::score_text(state.session.score)));
        }
        ContactOutcome::Bonus(_) => {
            state.cues.play(audio, Cue::Bonus);
            state.session.add_points(state.tuning.bonus_points);
            scene.set_label(Label::Score, Some(&ui::score_text(state.session.score)));
        }
        ContactOutcome::Caught(_) => game_over(state, scene, audio),
    }
}

fn on_input(
    state: &mut GameState,
    point: Vec2,
    scene: &mut impl SceneHost,
    audio: &mut impl AudioHost,
) {
    if state.session.phase == SessionPhase::Running {
        if let Some(player) = state.player {
            scene.apply_impulse(player, Vec2::new(0.0, state.tuning.jump_impulse));
        }
    }

    // Affordances respond whatever the phase
    for hit in scene.hit_test(point) {
        match hit.kind {
            EntityKind::PlayButton if state.session.phase == SessionPhase::GameOver => {
                restart(state, scene, audio);
            }
            EntityKind::SoundToggle => toggle_music(state, scene, audio),
            _ => {}
        }
    }
}

fn on_motion_finished(state: &mut GameState, handle: EntityHandle, scene: &mut impl SceneHost) {
    if state.live.remove(&handle.id).is_some() {
        scene.destroy_entity(handle);
    }
}

/// Running -> GameOver
pub fn game_over(state: &mut GameState, scene: &mut impl SceneHost, audio: &mut impl AudioHost) {
    if state.session.phase == SessionPhase::GameOver {
        return;
    }

    state.scheduler.stop();
    scene.pause_scene();
    state.cues.pause(audio, Cue::Coin);
    state.cues.pause(audio, Cue::Bonus);
    state.cues.play(audio, Cue::GameOver);

    let score = state.session.score;
    scene.set_label(Label::YourScore, Some(&ui::your_score_text(score)));
    scene.set_label(Label::GameOver, Some(ui::GAME_OVER_TEXT));

    let button = scene.create_entity(
        Sprite::Play,
        BodyShape::None,
        EntityKind::PlayButton,
        Vec2::new(0.0, PLAY_BUTTON_Y),
    );
    state.play_button = Some(button);

    if state.session.finish() {
        scene.set_label(
            Label::HighestScore,
            Some(&ui::highest_score_text(state.session.highest_score)),
        );
        log::info!("Game over - new highest score {}", score);
    } else {
        log::info!(
            "Game over - score {} (highest {})",
            score,
            state.session.highest_score
        );
    }
}

/// GameOver -> Running
pub fn restart(state: &mut GameState, scene: &mut impl SceneHost, audio: &mut impl AudioHost) {
    if state.session.phase != SessionPhase::GameOver {
        return;
    }

    state.cues.pause(audio, Cue::GameOver);
    if !state.session.music_enabled {
        state.cues.pause(audio, Cue::Music);
    }

    state.session.reset();
    scene.set_label(Label::Score, Some(&ui::score_text(state.session.score)));

    if let Some(button) = state.play_button.take() {
        scene.destroy_entity(button);
    }
    scene.set_label(Label::GameOver, None);
    scene.set_label(Label::YourScore, None);

    scene.resume_scene();
    state.scheduler.start(&mut state.rng, &state.tuning);
    log::info!("Session restarted");
}

fn toggle_music(state: &mut GameState, scene: &mut impl SceneHost, audio: &mut impl AudioHost) {
    let enabled = !state.session.music_enabled;
    state.session.music_enabled = enabled;

    if let Some(toggle) = state.sound_toggle {
        scene.set_texture(toggle, ui::sound_icon(enabled));
    }
    if enabled {
        state.cues.play(audio, Cue::Music);
    } else {
        state.cues.pause(audio, Cue::Music);
    }
    log::debug!("Music {}", if enabled { "on" } else { "off" });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::headless::{HeadlessScene, RecordingAudio};
    use crate::settings::Settings;
    use crate::tuning::Tuning;

    struct Harness {
        state: GameState,
        scene: HeadlessScene,
        audio: RecordingAudio,
    }

    impl Harness {
        fn new(seed: u64) -> Self {
            let mut h = Self {
                state: GameState::new(seed, Tuning::default(), &Settings::default()),
                scene: HeadlessScene::default(),
                audio: RecordingAudio::default(),
            };
            start(&mut h.state, &mut h.scene, &mut h.audio);
            h
        }

        fn send(&mut self, event: GameEvent) {
            handle_event(&mut self.state, &event, &mut self.scene, &mut self.audio);
        }

        /// Spawn one entity of `kind` through the external trigger
        fn spawn(&mut self, kind: SpawnKind) -> EntityHandle {
            self.send(GameEvent::SpawnTick(kind));
            let id = *self.state.live.keys().next_back().unwrap();
            self.state.live[&id]
        }

        fn touch(&mut self, other: EntityHandle) {
            let player = self.state.player.unwrap();
            self.send(GameEvent::Contact(ContactPair::new(other, player)));
        }

        fn tap_play_button(&mut self) {
            self.send(GameEvent::InputActivated(Vec2::new(0.0, PLAY_BUTTON_Y)));
        }
    }

    #[test]
    fn test_start_builds_scene() {
        let h = Harness::new(1);
        assert!(h.state.started);
        assert_eq!(h.scene.count(EntityKind::Player), 1);
        assert_eq!(h.scene.count(EntityKind::Ceiling), 1);
        assert_eq!(h.scene.count(EntityKind::Ground), 12);
        assert_eq!(h.scene.count(EntityKind::SoundToggle), 1);
        assert_eq!(h.scene.label(Label::Score), Some("Score: 0"));
        assert_eq!(h.scene.label(Label::HighestScore), Some("Highest Score: 0"));
        assert!(h.state.scheduler.all_active());
        assert_eq!(h.audio.played, vec!["music"]);
    }

    #[test]
    fn test_start_twice_is_noop() {
        let mut h = Harness::new(1);
        start(&mut h.state, &mut h.scene, &mut h.audio);
        assert_eq!(h.scene.count(EntityKind::Player), 1);
    }

    #[test]
    fn test_money_bonus_cop_scenario() {
        let mut h = Harness::new(2);

        let money = h.spawn(SpawnKind::Money);
        h.touch(money);
        assert_eq!(h.state.score(), 1);

        let bonus = h.spawn(SpawnKind::Bonus);
        h.touch(bonus);
        assert_eq!(h.state.score(), 11);
        assert_eq!(h.scene.label(Label::Score), Some("Score: 11"));
        assert_eq!(h.state.phase(), SessionPhase::Running);

        let cop = h.spawn(SpawnKind::Cop);
        h.touch(cop);
        assert_eq!(h.state.phase(), SessionPhase::GameOver);
        assert_eq!(h.state.highest_score(), 11);
        assert_eq!(h.scene.label(Label::HighestScore), Some("Highest Score: 11"));
        assert_eq!(h.scene.label(Label::GameOver), Some("GAME OVER!"));
        assert_eq!(h.scene.label(Label::YourScore), Some("Your Score: 11"));
        assert!(h.scene.is_paused());
        assert_eq!(h.scene.count(EntityKind::PlayButton), 1);
        assert!(h.scene.node(cop.id).is_none());
        assert_eq!(h.audio.played, vec!["music", "coin", "bonus", "game-over"]);
        assert!(h.audio.paused.contains(&"coin".to_string()));
        assert!(h.audio.paused.contains(&"bonus".to_string()));
    }

    #[test]
    fn test_cop_on_either_side_ends_run() {
        let mut h = Harness::new(3);
        let cop = h.spawn(SpawnKind::Cop);
        let player = h.state.player.unwrap();
        h.send(GameEvent::Contact(ContactPair::new(player, cop)));
        assert_eq!(h.state.phase(), SessionPhase::GameOver);
    }

    #[test]
    fn test_entity_scores_once() {
        let mut h = Harness::new(4);
        let money = h.spawn(SpawnKind::Money);
        h.touch(money);
        h.touch(money);
        assert_eq!(h.state.score(), 1);
    }

    #[test]
    fn test_no_spawns_after_game_over() {
        let mut h = Harness::new(5);
        let cop = h.spawn(SpawnKind::Cop);
        h.touch(cop);
        let live = h.state.live.len();

        h.send(GameEvent::SpawnTick(SpawnKind::Money));
        h.send(GameEvent::Tick { dt: 10.0 });
        assert_eq!(h.state.live.len(), live);
        assert!(!h.state.scheduler.all_active());
    }

    #[test]
    fn test_contacts_ignored_during_game_over() {
        let mut h = Harness::new(6);
        let money = h.spawn(SpawnKind::Money);
        let cop = h.spawn(SpawnKind::Cop);
        h.touch(cop);
        h.touch(money);
        assert_eq!(h.state.score(), 0);
    }

    #[test]
    fn test_restart_resets_session() {
        let mut h = Harness::new(7);
        let money = h.spawn(SpawnKind::Money);
        h.touch(money);
        let cop = h.spawn(SpawnKind::Cop);
        h.touch(cop);

        h.tap_play_button();
        assert_eq!(h.state.phase(), SessionPhase::Running);
        assert_eq!(h.state.score(), 0);
        assert_eq!(h.state.highest_score(), 1);
        assert_eq!(h.scene.label(Label::Score), Some("Score: 0"));
        assert_eq!(h.scene.label(Label::GameOver), None);
        assert_eq!(h.scene.label(Label::YourScore), None);
        assert_eq!(h.scene.count(EntityKind::PlayButton), 0);
        assert!(!h.scene.is_paused());
        assert!(h.audio.paused.contains(&"game-over".to_string()));
        for kind in SpawnKind::ALL {
            assert!(h.state.scheduler.is_active(kind));
            assert_eq!(h.state.scheduler.schedule(kind).elapsed, 0.0);
        }
    }

    #[test]
    fn test_lower_score_keeps_highest() {
        let mut h = Harness::new(8);
        for _ in 0..3 {
            let money = h.spawn(SpawnKind::Money);
            h.touch(money);
        }
        let cop = h.spawn(SpawnKind::Cop);
        h.touch(cop);
        assert_eq!(h.state.highest_score(), 3);

        h.tap_play_button();
        let money = h.spawn(SpawnKind::Money);
        h.touch(money);
        let cop = h.spawn(SpawnKind::Cop);
        h.touch(cop);
        assert_eq!(h.state.highest_score(), 3);
        assert_eq!(h.scene.label(Label::HighestScore), Some("Highest Score: 3"));
    }

    #[test]
    fn test_two_restarts_without_scoring() {
        let mut h = Harness::new(9);
        for _ in 0..2 {
            let cop = h.spawn(SpawnKind::Cop);
            h.touch(cop);
            h.tap_play_button();
            assert_eq!(h.state.score(), 0);
            assert!(h.state.scheduler.all_active());
            for kind in SpawnKind::ALL {
                assert_eq!(h.state.scheduler.schedule(kind).elapsed, 0.0);
            }
        }
    }

    #[test]
    fn test_tap_jumps_only_while_running() {
        let mut h = Harness::new(10);
        let player = h.state.player.unwrap();
        h.send(GameEvent::InputActivated(Vec2::new(300.0, 0.0)));
        assert!(h.scene.node(player.id).unwrap().velocity.y > 0.0);

        let cop = h.spawn(SpawnKind::Cop);
        h.touch(cop);
        let before = h.scene.node(player.id).unwrap().velocity;
        h.send(GameEvent::InputActivated(Vec2::new(300.0, 0.0)));
        assert_eq!(h.scene.node(player.id).unwrap().velocity, before);
    }

    #[test]
    fn test_sound_toggle_works_in_any_phase() {
        let mut h = Harness::new(11);
        let toggle = h.state.sound_toggle.unwrap();
        let at = h.scene.node(toggle.id).unwrap().position;

        h.send(GameEvent::InputActivated(at));
        assert!(!h.state.session.music_enabled);
        assert_eq!(h.scene.node(toggle.id).unwrap().sprite, Sprite::SoundOff);
        assert_eq!(h.audio.paused.last().map(String::as_str), Some("music"));

        let cop = h.spawn(SpawnKind::Cop);
        h.touch(cop);
        h.send(GameEvent::InputActivated(at));
        assert!(h.state.session.music_enabled);
        assert_eq!(h.scene.node(toggle.id).unwrap().sprite, Sprite::SoundOn);
    }

    #[test]
    fn test_restart_keeps_music_off() {
        let mut h = Harness::new(12);
        let toggle = h.state.sound_toggle.unwrap();
        let at = h.scene.node(toggle.id).unwrap().position;
        h.send(GameEvent::InputActivated(at));

        let cop = h.spawn(SpawnKind::Cop);
        h.touch(cop);
        h.audio.paused.clear();
        h.tap_play_button();
        assert!(h.audio.paused.contains(&"music".to_string()));
    }

    #[test]
    fn test_motion_finished_removes_entity() {
        let mut h = Harness::new(13);
        let money = h.spawn(SpawnKind::Money);
        h.send(GameEvent::MotionFinished(money));
        assert!(h.state.live.is_empty());
        assert!(h.scene.node(money.id).is_none());

        // Too late to collect
        h.touch(money);
        assert_eq!(h.state.score(), 0);
    }

    #[test]
    fn test_tier_applies_to_next_spawn() {
        let mut h = Harness::new(14);
        let slow = h.spawn(SpawnKind::Money);
        assert_eq!(h.scene.node(slow.id).unwrap().motion.unwrap().duration, 4.0);

        h.state.session.score = 150;
        let fast = h.spawn(SpawnKind::Cop);
        assert_eq!(h.scene.node(fast.id).unwrap().motion.unwrap().duration, 3.0);
        // In-flight money keeps its speed
        assert_eq!(h.scene.node(slow.id).unwrap().motion.unwrap().duration, 4.0);

        let bonus = h.spawn(SpawnKind::Bonus);
        assert_eq!(h.scene.node(bonus.id).unwrap().motion.unwrap().duration, 2.5);
    }

    #[test]
    fn test_tick_drives_schedules_and_ground() {
        let mut h = Harness::new(15);
        let ground = *h.state.ground.as_ref().unwrap().tiles.last().unwrap();
        let x0 = h.scene.node(ground.id).unwrap().position.x;

        for _ in 0..8 {
            h.send(GameEvent::Tick { dt: 0.25 });
        }
        let spawned: Vec<_> = h.state.live.values().map(|e| e.kind).collect();
        assert_eq!(spawned, vec![EntityKind::Money, EntityKind::Money, EntityKind::Cop]);
        let x1 = h.scene.node(ground.id).unwrap().position.x;
        assert!(x1 < x0);
    }

    #[test]
    fn test_huge_tick_returns() {
        let mut h = Harness::new(19);
        h.send(GameEvent::Tick { dt: 1.0e8 });
        assert!(h.state.live.len() <= 3 * crate::sim::spawn::MAX_CATCH_UP as usize);
        assert!(h.state.scheduler.all_active());

        // Normal ticks carry on afterwards
        let before = h.state.live.len();
        for _ in 0..4 {
            h.send(GameEvent::Tick { dt: 0.25 });
        }
        assert!(h.state.live.len() > before);
    }

    #[test]
    fn test_start_with_zero_width_grass() {
        let mut state = GameState::new(20, Tuning::default(), &Settings::default());
        let mut scene = HeadlessScene::default();
        scene.set_sprite_size(Sprite::Grass, Vec2::new(0.0, 64.0));
        let mut audio = RecordingAudio::default();
        start(&mut state, &mut scene, &mut audio);

        assert!(state.started);
        assert_eq!(scene.count(EntityKind::Ground), 12);
        handle_event(&mut state, &GameEvent::Tick { dt: 0.5 }, &mut scene, &mut audio);
    }

    #[test]
    fn test_bad_dt_ignored() {
        let mut h = Harness::new(16);
        h.send(GameEvent::Tick { dt: -1.0 });
        h.send(GameEvent::Tick { dt: f32::NAN });
        assert_eq!(h.state.time, 0.0);
    }

    #[test]
    fn test_events_before_start_ignored() {
        let mut state = GameState::new(17, Tuning::default(), &Settings::default());
        let mut scene = HeadlessScene::default();
        let mut audio = RecordingAudio::default();
        handle_event(
            &mut state,
            &GameEvent::SpawnTick(SpawnKind::Money),
            &mut scene,
            &mut audio,
        );
        assert!(state.live.is_empty());
    }

    #[test]
    fn test_missing_cues_do_not_break_play() {
        let mut state = GameState::new(18, Tuning::default(), &Settings::default());
        let mut scene = HeadlessScene::default();
        let mut audio = RecordingAudio::missing(&["coin", "game-over"]);
        start(&mut state, &mut scene, &mut audio);

        handle_event(
            &mut state,
            &GameEvent::SpawnTick(SpawnKind::Money),
            &mut scene,
            &mut audio,
        );
        let money = *state.live.values().next().unwrap();
        let player = state.player.unwrap();
        handle_event(
            &mut state,
            &GameEvent::Contact(ContactPair::new(player, money)),
            &mut scene,
            &mut audio,
        );
        assert_eq!(state.score(), 1);
        assert_eq!(audio.played, vec!["music"]);
    }

    #[test]
    fn test_determinism() {
        // Two states with same seed should produce identical results
        let mut a = Harness::new(99999);
        let mut b = Harness::new(99999);
        for _ in 0..40 {
            a.send(GameEvent::Tick { dt: 0.5 });
            b.send(GameEvent::Tick { dt: 0.5 });
        }
        assert_eq!(a.state.scheduler, b.state.scheduler);
        let positions = |h: &Harness| {
            h.state
                .live
                .keys()
                .map(|id| h.scene.node(*id).unwrap().position)
                .collect::<Vec<_>>()
        };
        assert_eq!(positions(&a), positions(&b));
    }
}
