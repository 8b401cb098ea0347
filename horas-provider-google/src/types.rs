//! Wire types for the Google Calendar v3 REST API.

use chrono::{DateTime, NaiveDate, Utc};
use horas_core::{EventPage, EventTime, ProviderEvent};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarListEntry {
    pub time_zone: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsPage {
    #[serde(default)]
    pub items: Vec<GoogleEvent>,
    pub next_page_token: Option<String>,
    pub next_sync_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleEvent {
    pub id: String,
    pub summary: Option<String>,
    pub status: Option<String>,
    pub html_link: Option<String>,
    pub location: Option<String>,
    pub organizer: Option<Organizer>,
    pub start: Option<GoogleEventTime>,
    pub end: Option<GoogleEventTime>,
    pub updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organizer {
    pub email: Option<String>,
}

/// Either a timed instant (`dateTime`) or an all-day date (`date`).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleEventTime {
    pub date: Option<NaiveDate>,
    pub date_time: Option<DateTime<Utc>>,
}

impl GoogleEventTime {
    fn to_event_time(&self) -> Option<EventTime> {
        if let Some(dt) = self.date_time {
            Some(EventTime::DateTime(dt))
        } else {
            self.date.map(EventTime::Date)
        }
    }
}

impl From<GoogleEvent> for ProviderEvent {
    fn from(event: GoogleEvent) -> Self {
        ProviderEvent {
            id: event.id,
            summary: event.summary,
            status: event.status,
            html_link: event.html_link,
            location: event.location,
            organizer_email: event.organizer.and_then(|o| o.email),
            start: event.start.and_then(|t| t.to_event_time()),
            end: event.end.and_then(|t| t.to_event_time()),
            updated: event.updated,
        }
    }
}

impl From<EventsPage> for EventPage {
    fn from(page: EventsPage) -> Self {
        EventPage {
            items: page.items.into_iter().map(ProviderEvent::from).collect(),
            next_page_token: page.next_page_token,
            next_sync_token: page.next_sync_token,
        }
    }
}
