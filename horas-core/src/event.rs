//! Calendar event types.
//!
//! `ProviderEvent` is what a calendar provider hands back on a sync page;
//! `CalendarEvent` is the record we persist, keyed by
//! (user email, calendar id, provider event id) and linked to a task.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// A start or end boundary as reported by the provider: either a timed
/// instant or an all-day date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventTime {
    DateTime(DateTime<Utc>),
    Date(NaiveDate),
}

impl EventTime {
    /// Collapse to a single instant. All-day dates become the date's
    /// midnight in UTC, straight from the date value the provider encoded —
    /// no time-zone shifting on top.
    pub fn to_instant(&self) -> DateTime<Utc> {
        match self {
            EventTime::DateTime(dt) => *dt,
            EventTime::Date(d) => d.and_time(NaiveTime::MIN).and_utc(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventStatus {
    Confirmed,
    Tentative,
    Cancelled,
}

impl EventStatus {
    /// Providers report status as free text; `cancelled` must be recognized
    /// regardless of case, anything unknown counts as confirmed.
    pub fn parse(status: Option<&str>) -> EventStatus {
        match status {
            Some(s) if s.eq_ignore_ascii_case("cancelled") => EventStatus::Cancelled,
            Some(s) if s.eq_ignore_ascii_case("tentative") => EventStatus::Tentative,
            _ => EventStatus::Confirmed,
        }
    }
}

/// One event as returned by the provider's list endpoint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderEvent {
    pub id: String,
    pub summary: Option<String>,
    pub status: Option<String>,
    pub html_link: Option<String>,
    pub location: Option<String>,
    pub organizer_email: Option<String>,
    /// Missing on malformed payloads; such events are still stored, with
    /// null instants.
    pub start: Option<EventTime>,
    pub end: Option<EventTime>,
    /// Provider-reported last update.
    pub updated: Option<DateTime<Utc>>,
}

impl ProviderEvent {
    pub fn parsed_status(&self) -> EventStatus {
        EventStatus::parse(self.status.as_deref())
    }

    pub fn is_cancelled(&self) -> bool {
        self.parsed_status() == EventStatus::Cancelled
    }

    pub fn start_instant(&self) -> Option<DateTime<Utc>> {
        self.start.as_ref().map(EventTime::to_instant)
    }

    pub fn end_instant(&self) -> Option<DateTime<Utc>> {
        self.end.as_ref().map(EventTime::to_instant)
    }
}

/// A persisted calendar event, attributed to a task.
///
/// Unique on (`user_email`, `calendar_id`, `event_id`). Cancelled events are
/// never stored; cancellation deletes any prior copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub user_email: String,
    pub calendar_id: String,
    /// Provider-assigned event id.
    pub event_id: String,

    pub summary: Option<String>,
    pub organizer_email: Option<String>,
    pub html_link: Option<String>,
    pub location: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub status: EventStatus,
    /// When the provider last touched the event.
    pub provider_updated: Option<DateTime<Utc>>,

    /// Local bookkeeping. `created_at` survives updates.
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// The task this event's hours are attributed to (foreign key).
    pub task_id: i64,
}
