//! Ingestion configuration.

use serde::Deserialize;

/// The tag assigned to events whose leading tag is missing or unresolvable.
pub const DEFAULT_GENERIC_TAG: &str = "#GENERICO";

/// How far back a full sync reaches, in days.
pub const DEFAULT_LOOKBACK_DAYS: i64 = 90;

/// The calendar synchronized for every user.
pub const DEFAULT_CALENDAR_ID: &str = "primary";

fn default_generic_tag() -> String {
    DEFAULT_GENERIC_TAG.to_string()
}

fn default_lookback_days() -> i64 {
    DEFAULT_LOOKBACK_DAYS
}

fn default_calendar_id() -> String {
    DEFAULT_CALENDAR_ID.to_string()
}

/// Settings consumed by the ingestion engine.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    /// Fallback tag; a task carrying it must exist before ingestion starts.
    #[serde(default = "default_generic_tag")]
    pub generic_tag: String,

    /// Full-sync window: events starting earlier than now minus this many
    /// days are not pulled.
    #[serde(default = "default_lookback_days")]
    pub lookback_days: i64,

    /// Which of the user's calendars to sync.
    #[serde(default = "default_calendar_id")]
    pub calendar_id: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            generic_tag: default_generic_tag(),
            lookback_days: default_lookback_days(),
            calendar_id: default_calendar_id(),
        }
    }
}
