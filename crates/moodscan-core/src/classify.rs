//! Mood taxonomy over model outputs
//!
//! Thresholds are on the scale the regression model was trained on and are
//! not configurable.

use crate::key::is_minor_label;
use moodscan_proto::Emotion;

/// Valence/arousal split point
pub const AFFECT_THRESHOLD: f32 = 6.0;
/// Minimum tempo for a tense minor-key segment to read as intense
pub const INTENSE_MIN_BPM: f64 = 110.0;

/// Map a prediction plus musical metadata to a mood label.
///
/// Rules are checked in order and the first match wins. A NaN score matches
/// none of them and yields [`Emotion::Neutral`].
pub fn classify_emotion(valence: f32, arousal: f32, tempo: f64, key_label: &str) -> Emotion {
    let high_arousal = arousal >= AFFECT_THRESHOLD;
    let low_arousal = arousal < AFFECT_THRESHOLD;
    let high_valence = valence >= AFFECT_THRESHOLD;
    let low_valence = valence < AFFECT_THRESHOLD;

    if high_arousal && high_valence {
        Emotion::HappyExcited
    } else if high_arousal && low_valence {
        if is_minor_label(key_label) && tempo >= INTENSE_MIN_BPM {
            Emotion::IntensePowerful
        } else {
            Emotion::AngryTense
        }
    } else if low_arousal && high_valence {
        Emotion::CalmPeaceful
    } else if low_arousal && low_valence {
        Emotion::Sad
    } else {
        Emotion::Neutral
    }
}
