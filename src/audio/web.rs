//! Audio host using Web Audio API
//!
//! Effects are synthesized with oscillators; music streams from an
//! `<audio>` element so it can loop and pause.

use web_sys::{AudioContext, GainNode, HtmlAudioElement, OscillatorNode, OscillatorType};

use super::{AudioHost, Cue, CueHandle};
use crate::error::AssetLoadError;
use crate::settings::Settings;

/// An oscillator still scheduled to make noise
struct Voice {
    cue: Cue,
    osc: OscillatorNode,
    ends_at: f64,
}

/// Audio host for the browser
pub struct WebAudio {
    ctx: Option<AudioContext>,
    music: Option<HtmlAudioElement>,
    /// Loaded cues, indexed by handle
    loaded: Vec<Cue>,
    voices: Vec<Voice>,
    sfx_volume: f32,
    music_volume: f32,
    asset_base: String,
}

impl WebAudio {
    pub fn new(settings: &Settings, asset_base: &str) -> Self {
        // Try to create audio context (may fail if not in secure context)
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - effects disabled");
        }
        Self {
            ctx,
            music: None,
            loaded: Vec::new(),
            voices: Vec::new(),
            sfx_volume: settings.effective_sfx_volume(),
            music_volume: settings.effective_music_volume(),
            asset_base: asset_base.trim_end_matches('/').to_string(),
        }
    }

    /// Resume audio context (required after user gesture)
    pub fn resume(&self) {
        if let Some(ctx) = &self.ctx {
            let _ = ctx.resume();
        }
    }

    fn load_music(&mut self, name: &str) -> Result<(), AssetLoadError> {
        let src = format!("{}/{}.mp3", self.asset_base, name);
        let el = HtmlAudioElement::new_with_src(&src)
            .map_err(|e| AssetLoadError::new(name, format!("{e:?}")))?;
        el.set_loop(true);
        el.set_volume(self.music_volume as f64);
        self.music = Some(el);
        Ok(())
    }

    fn play_effect(&mut self, cue: Cue) {
        let vol = self.sfx_volume;
        if vol <= 0.0 {
            return;
        }
        let Some(ctx) = self.ctx.clone() else {
            return;
        };

        // Resume context if suspended (browsers require user gesture)
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        let now = ctx.current_time();
        self.voices.retain(|v| v.ends_at > now);

        match cue {
            Cue::Coin => self.play_coin(&ctx, vol),
            Cue::Bonus => self.play_bonus(&ctx, vol),
            Cue::GameOver => self.play_game_over(&ctx, vol),
            Cue::Music => {}
        }
    }

    // === Sound generators ===

    /// Create an oscillator with gain envelope
    fn create_osc(
        &self,
        ctx: &AudioContext,
        freq: f32,
        osc_type: OscillatorType,
    ) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((osc, gain))
    }

    /// Play a sequence of short notes, `spacing` seconds apart
    fn arpeggio(
        &mut self,
        ctx: &AudioContext,
        cue: Cue,
        notes: &[f32],
        spacing: f64,
        decay: f64,
        level: f32,
        osc_type: OscillatorType,
    ) {
        for (i, freq) in notes.iter().enumerate() {
            let delay = i as f64 * spacing;
            if let Some((osc, gain)) = self.create_osc(ctx, *freq, osc_type) {
                let t = ctx.current_time() + delay;
                gain.gain().set_value_at_time(level, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + decay)
                    .ok();
                osc.start_with_when(t).ok();
                let ends_at = t + decay + 0.05;
                osc.stop_with_when(ends_at).ok();
                self.voices.push(Voice { cue, osc, ends_at });
            }
        }
    }

    /// Coin - bright two-note ding
    fn play_coin(&mut self, ctx: &AudioContext, vol: f32) {
        self.arpeggio(
            ctx,
            Cue::Coin,
            &[988.0, 1319.0],
            0.06,
            0.15,
            vol * 0.25,
            OscillatorType::Square,
        );
    }

    /// Bonus - celebratory run
    fn play_bonus(&mut self, ctx: &AudioContext, vol: f32) {
        self.arpeggio(
            ctx,
            Cue::Bonus,
            &[500.0, 600.0, 700.0, 800.0, 1000.0],
            0.08,
            0.25,
            vol * 0.25,
            OscillatorType::Triangle,
        );
    }

    /// Game over - sad descending
    fn play_game_over(&mut self, ctx: &AudioContext, vol: f32) {
        self.arpeggio(
            ctx,
            Cue::GameOver,
            &[400.0, 350.0, 300.0, 200.0],
            0.2,
            0.3,
            vol * 0.3,
            OscillatorType::Sine,
        );
    }
}

impl AudioHost for WebAudio {
    fn load_cue(&mut self, name: &str) -> Result<CueHandle, AssetLoadError> {
        let cue = Cue::ALL
            .into_iter()
            .find(|c| c.asset_name() == name)
            .ok_or_else(|| AssetLoadError::new(name, "unknown cue"))?;

        match cue {
            Cue::Music => self.load_music(name)?,
            _ if self.ctx.is_none() => {
                return Err(AssetLoadError::new(name, "no audio context"));
            }
            _ => {}
        }

        self.loaded.push(cue);
        Ok(CueHandle(self.loaded.len() as u32 - 1))
    }

    fn play(&mut self, handle: CueHandle) {
        let Some(&cue) = self.loaded.get(handle.0 as usize) else {
            return;
        };
        if cue == Cue::Music {
            if let Some(music) = &self.music {
                let _ = music.play();
            }
        } else {
            self.play_effect(cue);
        }
    }

    fn pause(&mut self, handle: CueHandle) {
        let Some(&cue) = self.loaded.get(handle.0 as usize) else {
            return;
        };
        if cue == Cue::Music {
            if let Some(music) = &self.music {
                let _ = music.pause();
            }
            return;
        }
        self.voices.retain(|v| {
            if v.cue == cue {
                let _ = v.osc.stop();
                false
            } else {
                true
            }
        });
    }
}
