//! Simulated Lip-Sync
//!
//! Produces a mouth-cue track in the Rhubarb layout the avatar frontend
//! consumes. No audio is analysed: every character of every word gets one cue
//! with a randomized duration, and each word is followed by a short pause.
//! Two calls on the same text will generally produce different timings.

use rand::Rng;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Mouth shapes understood by the avatar.
pub const VISEME_ALPHABET: [&str; 9] = ["A", "B", "C", "D", "E", "F", "G", "H", "X"];

const MIN_CUE_SECS: f64 = 0.08;
const MAX_CUE_SECS: f64 = 0.12;
const WORD_PAUSE_SECS: f64 = 0.1;

/// A single mouth shape held between `start` and `end` (seconds).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MouthCue {
    pub start: f64,
    pub end: f64,
    #[schema(example = "B")]
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LipSyncMetadata {
    /// End time of the last cue, in seconds.
    pub duration: f64,
}

/// A complete cue track for one reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LipSync {
    pub metadata: LipSyncMetadata,
    pub mouth_cues: Vec<MouthCue>,
}

impl LipSync {
    pub fn is_empty(&self) -> bool {
        self.mouth_cues.is_empty()
    }
}

/// Synthesizes a cue track for `text` using the thread-local RNG.
pub fn synthesize(text: &str) -> LipSync {
    synthesize_with(text, &mut rand::rng())
}

/// Synthesizes a cue track for `text` drawing randomness from `rng`.
pub fn synthesize_with<R: Rng + ?Sized>(text: &str, rng: &mut R) -> LipSync {
    let mut clock = 0.0;
    let mut mouth_cues = Vec::with_capacity(text.len());

    for word in text.split_whitespace() {
        for _ in word.chars() {
            let duration = rng.random_range(MIN_CUE_SECS..MAX_CUE_SECS);
            let value = VISEME_ALPHABET[rng.random_range(0..VISEME_ALPHABET.len())];
            mouth_cues.push(MouthCue {
                start: clock,
                end: clock + duration,
                value: value.to_string(),
            });
            clock += duration;
        }
        clock += WORD_PAUSE_SECS;
    }

    let duration = mouth_cues.last().map(|cue| cue.end).unwrap_or(0.0);
    LipSync {
        metadata: LipSyncMetadata { duration },
        mouth_cues,
    }
}
