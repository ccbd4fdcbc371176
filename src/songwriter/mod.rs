//! Song generation: prompt selection, the upstream call and recovery of a
//! structured song from the model's reply.

mod models;
pub mod normalizer;
pub mod prompts;
mod service;
pub mod style;

pub use models::{
    GenerationRequest, HistoryEntry, HookRequest, SongRecord, LYRICS_PLACEHOLDER,
    NOTES_PLACEHOLDER, SUNO_STYLE_PLACEHOLDER, TITLE_PLACEHOLDER,
};
pub use normalizer::{normalize_response, ParseStrategy, Recovery, ResponseNormalizer};
pub use prompts::{hook_prompt, song_prompt, HookIngredients};
pub use service::{GenerationError, Songwriter, HOOK_MAX_TOKENS, SONG_MAX_TOKENS};
pub use style::{StyleBand, StyleLevel};
