use super::style::StyleLevel;
use serde::{Deserialize, Deserializer, Serialize};

pub const TITLE_PLACEHOLDER: &str = "Generated Song";
pub const LYRICS_PLACEHOLDER: &str = "Lyrics not available";
pub const SUNO_STYLE_PLACEHOLDER: &str = "Style information not available";
pub const NOTES_PLACEHOLDER: &str = "Notes not available";

/// Parameters of a full-song generation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    #[serde(default, deserialize_with = "null_as_default")]
    pub theme: String,
    #[serde(default)]
    pub subgenre: Option<String>,
    #[serde(default)]
    pub vocal_style: Option<String>,
    #[serde(default)]
    pub mood: Option<String>,
    #[serde(default)]
    pub additional_notes: Option<String>,
    #[serde(default, rename = "styleValue", alias = "styleLevel")]
    pub style_level: StyleLevel,
}

impl GenerationRequest {
    pub fn new(theme: impl Into<String>, style_level: StyleLevel) -> Self {
        Self {
            theme: theme.into(),
            style_level,
            ..Default::default()
        }
    }

    pub fn has_theme(&self) -> bool {
        !self.theme.trim().is_empty()
    }
}

/// Parameters of a hook generation.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct HookRequest {
    #[serde(default, rename = "styleValue", alias = "styleLevel")]
    pub style_level: StyleLevel,
}

/// A generated song. Every field is always populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "PartialSongRecord")]
pub struct SongRecord {
    pub title: String,
    pub lyrics: String,
    pub suno_style: String,
    pub notes: String,
}

impl Default for SongRecord {
    fn default() -> Self {
        Self {
            title: TITLE_PLACEHOLDER.to_string(),
            lyrics: LYRICS_PLACEHOLDER.to_string(),
            suno_style: SUNO_STYLE_PLACEHOLDER.to_string(),
            notes: NOTES_PLACEHOLDER.to_string(),
        }
    }
}

/// Wire shape of a [`SongRecord`] as clients and older history files send it.
/// Missing, null or blank fields become placeholders.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PartialSongRecord {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    lyrics: Option<String>,
    #[serde(default)]
    suno_style: Option<String>,
    #[serde(default)]
    notes: Option<String>,
}

impl From<PartialSongRecord> for SongRecord {
    fn from(partial: PartialSongRecord) -> Self {
        fn or_placeholder(value: Option<String>, placeholder: &str) -> String {
            value
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| placeholder.to_string())
        }

        Self {
            title: or_placeholder(partial.title, TITLE_PLACEHOLDER),
            lyrics: or_placeholder(partial.lyrics, LYRICS_PLACEHOLDER),
            suno_style: or_placeholder(partial.suno_style, SUNO_STYLE_PLACEHOLDER),
            notes: or_placeholder(partial.notes, NOTES_PLACEHOLDER),
        }
    }
}

/// Treats an explicit `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A saved generation, as stored in the history file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Creation timestamp in milliseconds. Zero means "not stamped yet".
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: i64,
    /// RFC 3339 creation date.
    #[serde(default, deserialize_with = "null_as_default")]
    pub date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub theme: String,
    #[serde(default, rename = "styleValue", alias = "styleLevel")]
    pub style_level: StyleLevel,
    #[serde(default, deserialize_with = "null_as_default")]
    pub song_data: SongRecord,
}
