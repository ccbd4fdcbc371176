//! Shared constants for end-to-end tests
//!
//! When canned model replies or timeouts change, update only this file.

#![allow(dead_code)]

// ============================================================================
// Timing
// ============================================================================

/// How long to wait for a spawned server to answer `/`
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Delay between readiness polls
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 20;

/// Per-request timeout of the test client
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

// ============================================================================
// Credentials
// ============================================================================

/// Key configured on servers spawned "with key"
pub const TEST_API_KEY: &str = "sk-ant-test-key";

/// Key set at runtime through `/api/set-key`
pub const RUNTIME_API_KEY: &str = "sk-ant-runtime-key";

// ============================================================================
// Canned model replies
// ============================================================================

pub const HOOK_REPLY: &str = "  Tailgate Hallelujah\n";

pub const HOOK_TEXT: &str = "Tailgate Hallelujah";

/// Well formed song document wrapped in a markdown fence
pub const FENCED_SONG_REPLY: &str = "Here you go!\n```json\n{\n  \"title\": \"Creek Bed Sunday\",\n  \"lyrics\": \"[Verse 1]\\nMud on the tires\\n[Chorus]\\nCreek bed Sunday\",\n  \"sunoStyle\": \"Acoustic country, fiddle, 92 BPM\",\n  \"notes\": \"Hook lands on the downbeat\"\n}\n```";

pub const SONG_TITLE: &str = "Creek Bed Sunday";

pub const SONG_LYRICS: &str = "[Verse 1]\nMud on the tires\n[Chorus]\nCreek bed Sunday";

/// Reply with no structure at all
pub const PLAIN_TEXT_REPLY: &str = "Verse one goes here\nChorus goes there";
