//! Recovery of a [`SongRecord`] from free-form model output.
//!
//! The model is asked for a bare JSON object but does not always comply, so
//! the text goes through an ordered list of [`ParseStrategy`] implementations.
//! The first one that does not decline wins; whatever it could not recover
//! is filled with placeholders. Normalization never fails.

use super::models::{
    SongRecord, LYRICS_PLACEHOLDER, NOTES_PLACEHOLDER, SUNO_STYLE_PLACEHOLDER, TITLE_PLACEHOLDER,
};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value};
use tracing::{debug, warn};

lazy_static! {
    static ref CODE_FENCE: Regex = Regex::new(r"(?i)```(?:json)?\n?").expect("invalid regex");
    static ref TITLE_FIELD: Regex = Regex::new(r#""title"\s*:\s*"([^"]+)""#).expect("invalid regex");
    static ref LYRICS_FIELD: Regex =
        Regex::new(r#"(?s)"lyrics"\s*:\s*"(.*?)"\s*,\s*"sunoStyle""#).expect("invalid regex");
    static ref SUNO_STYLE_FIELD: Regex =
        Regex::new(r#"(?s)"sunoStyle"\s*:\s*"(.*?)"\s*,\s*"notes""#).expect("invalid regex");
    static ref NOTES_FIELD: Regex = Regex::new(r#"(?s)"notes"\s*:\s*"(.*?)"\s*\}"#).expect("invalid regex");
}

/// Name reported when every strategy declined.
pub const FALLBACK_STRATEGY: &str = "fallback";

/// Song fields as recovered by a strategy, before placeholders are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SongFields {
    pub title: Option<String>,
    pub lyrics: Option<String>,
    pub suno_style: Option<String>,
    pub notes: Option<String>,
}

impl SongFields {
    fn from_object(object: &Map<String, Value>) -> Self {
        let field = |key: &str| {
            object
                .get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.trim().is_empty())
                .map(str::to_string)
        };
        Self {
            title: field("title"),
            lyrics: field("lyrics"),
            suno_style: field("sunoStyle"),
            notes: field("notes"),
        }
    }

    fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.lyrics.is_none()
            && self.suno_style.is_none()
            && self.notes.is_none()
    }

    fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.title.is_none() {
            missing.push("title");
        }
        if self.lyrics.is_none() {
            missing.push("lyrics");
        }
        if self.suno_style.is_none() {
            missing.push("sunoStyle");
        }
        if self.notes.is_none() {
            missing.push("notes");
        }
        missing
    }
}

/// What a strategy managed to recover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recovery {
    /// A whole JSON object was parsed; absent keys take their placeholders.
    Document(SongFields),
    /// Individual fields were scraped from otherwise unparseable text.
    Fields(SongFields),
}

/// One step of the parsing cascade. Returns `None` to decline.
pub trait ParseStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn attempt(&self, raw: &str) -> Option<Recovery>;
}

/// The whole trimmed response is a JSON object.
pub struct DirectJson;

impl ParseStrategy for DirectJson {
    fn name(&self) -> &'static str {
        "direct"
    }

    fn attempt(&self, raw: &str) -> Option<Recovery> {
        parse_object(raw.trim()).map(Recovery::Document)
    }
}

/// A JSON object somewhere inside the response, possibly in a code fence.
pub struct FencedJson;

impl ParseStrategy for FencedJson {
    fn name(&self) -> &'static str {
        "fenced"
    }

    fn attempt(&self, raw: &str) -> Option<Recovery> {
        let cleaned = CODE_FENCE.replace_all(raw, "");
        let cleaned = cleaned.trim();
        let start = cleaned.find('{')?;
        let end = cleaned.rfind('}')?;
        if end <= start {
            return None;
        }
        parse_object(&cleaned[start..=end]).map(Recovery::Document)
    }
}

/// Per-field regex scraping. Each field is bounded by the key that is
/// expected to follow it, so a reordered or missing key loses that field.
pub struct FieldScraper;

impl ParseStrategy for FieldScraper {
    fn name(&self) -> &'static str {
        "fields"
    }

    fn attempt(&self, raw: &str) -> Option<Recovery> {
        let capture = |re: &Regex| {
            re.captures(raw)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().to_string())
        };
        let fields = SongFields {
            title: capture(&TITLE_FIELD),
            lyrics: capture(&LYRICS_FIELD).map(|s| unescape(&s)),
            suno_style: capture(&SUNO_STYLE_FIELD).map(|s| unescape(&s)),
            notes: capture(&NOTES_FIELD).map(|s| unescape(&s)),
        };
        if fields.is_empty() {
            None
        } else {
            Some(Recovery::Fields(fields))
        }
    }
}

fn parse_object(text: &str) -> Option<SongFields> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(object)) => Some(SongFields::from_object(&object)),
        _ => None,
    }
}

fn unescape(s: &str) -> String {
    s.replace("\\n", "\n").replace("\\\"", "\"")
}

fn expand_newlines(s: String) -> String {
    if s.contains("\\n") {
        s.replace("\\n", "\n")
    } else {
        s
    }
}

/// Ordered cascade of parse strategies.
pub struct ResponseNormalizer {
    strategies: Vec<Box<dyn ParseStrategy>>,
}

impl Default for ResponseNormalizer {
    fn default() -> Self {
        Self::new(vec![
            Box::new(DirectJson),
            Box::new(FencedJson),
            Box::new(FieldScraper),
        ])
    }
}

impl ResponseNormalizer {
    pub fn new(strategies: Vec<Box<dyn ParseStrategy>>) -> Self {
        Self { strategies }
    }

    pub fn normalize(&self, raw: &str) -> SongRecord {
        self.normalize_with_strategy(raw).0
    }

    /// Like [`normalize`](Self::normalize), also naming the strategy that
    /// succeeded ([`FALLBACK_STRATEGY`] if none did).
    pub fn normalize_with_strategy(&self, raw: &str) -> (SongRecord, &'static str) {
        let mut outcome = None;
        for strategy in &self.strategies {
            if let Some(recovery) = strategy.attempt(raw) {
                debug!(strategy = strategy.name(), "Model output recovered");
                outcome = Some((recovery, strategy.name()));
                break;
            }
            debug!(strategy = strategy.name(), "Parse strategy declined");
        }

        let (fields, lyrics_fallback, strategy) = match outcome {
            Some((Recovery::Document(fields), name)) => {
                (fields, LYRICS_PLACEHOLDER.to_string(), name)
            }
            Some((Recovery::Fields(fields), name)) => (fields, raw_or_placeholder(raw), name),
            None => (SongFields::default(), raw_or_placeholder(raw), FALLBACK_STRATEGY),
        };

        let missing = fields.missing();
        if !missing.is_empty() {
            warn!(
                strategy,
                missing = ?missing,
                "Model output is missing song fields, using placeholders"
            );
        }

        let record = SongRecord {
            title: expand_newlines(fields.title.unwrap_or_else(|| TITLE_PLACEHOLDER.to_string())),
            lyrics: expand_newlines(fields.lyrics.unwrap_or(lyrics_fallback)),
            suno_style: expand_newlines(
                fields
                    .suno_style
                    .unwrap_or_else(|| SUNO_STYLE_PLACEHOLDER.to_string()),
            ),
            notes: expand_newlines(fields.notes.unwrap_or_else(|| NOTES_PLACEHOLDER.to_string())),
        };
        (record, strategy)
    }
}

fn raw_or_placeholder(raw: &str) -> String {
    if raw.trim().is_empty() {
        LYRICS_PLACEHOLDER.to_string()
    } else {
        raw.to_string()
    }
}

/// Normalizes with the default cascade.
pub fn normalize_response(raw: &str) -> SongRecord {
    ResponseNormalizer::default().normalize(raw)
}
