//! HUD text

use crate::host::Sprite;

pub const GAME_OVER_TEXT: &str = "GAME OVER!";

pub fn score_text(score: u64) -> String {
    format!("Score: {score}")
}

pub fn highest_score_text(score: u64) -> String {
    format!("Highest Score: {score}")
}

/// End-of-run overlay line
pub fn your_score_text(score: u64) -> String {
    format!("Your Score: {score}")
}

/// Icon for the audio toggle
pub fn sound_icon(music_enabled: bool) -> Sprite {
    if music_enabled {
        Sprite::SoundOn
    } else {
        Sprite::SoundOff
    }
}
