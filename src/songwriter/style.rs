//! The "style level" slider and the three editorial bands it selects.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Upper bound (inclusive) of the Radio Hit band.
pub const RADIO_HIT_MAX: i64 = 30;
/// Upper bound (inclusive) of the Balanced band.
pub const BALANCED_MAX: i64 = 70;

/// Slider value 0–100. Values outside that range are carried as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StyleLevel(i64);

impl StyleLevel {
    pub const DEFAULT: StyleLevel = StyleLevel(50);

    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn band(&self) -> StyleBand {
        StyleBand::for_level(*self)
    }

    /// Lenient conversion from whatever the client sent.
    ///
    /// Numbers are truncated toward zero, strings are read up to the first
    /// non-digit (`"42abc"` is 42). Anything unreadable falls back to 50.
    pub fn from_json(value: &serde_json::Value) -> Self {
        let parsed = match value {
            serde_json::Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
            serde_json::Value::String(s) => parse_leading_int(s),
            _ => None,
        };
        parsed.map(StyleLevel).unwrap_or(Self::DEFAULT)
    }
}

impl Default for StyleLevel {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for StyleLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for StyleLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.0)
    }
}

impl<'de> Deserialize<'de> for StyleLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(StyleLevel::from_json(&value))
    }
}

fn parse_leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, s.strip_prefix('+').unwrap_or(s)),
    };
    let end = digits
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

/// Editorial policy selected by the slider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StyleBand {
    /// Commercial hook first (0–30).
    RadioHit,
    /// Hook and story in equal measure (31–70).
    Balanced,
    /// Narrative and imagery first (71–100).
    Artistic,
}

impl StyleBand {
    pub fn for_level(level: StyleLevel) -> Self {
        match level.value() {
            v if v <= RADIO_HIT_MAX => StyleBand::RadioHit,
            v if v <= BALANCED_MAX => StyleBand::Balanced,
            _ => StyleBand::Artistic,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StyleBand::RadioHit => "Radio Hit",
            StyleBand::Balanced => "Balanced",
            StyleBand::Artistic => "Artistic",
        }
    }
}

impl fmt::Display for StyleBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
