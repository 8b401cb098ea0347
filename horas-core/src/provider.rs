//! Calendar provider contracts.
//!
//! The ingestion engine talks to a calendar provider through these traits.
//! A single provider's event/list/sync-token semantics are assumed (Google
//! Calendar style): paged listing with a continuation token per page and an
//! opaque resumption token issued on the final page. A provider must signal
//! an expired resumption token as `HorasError::SyncTokenExpired` so the
//! engine can recover; every other failure propagates as-is.

use chrono::{DateTime, Utc};

use crate::error::HorasResult;
use crate::event::ProviderEvent;

/// Parameters for one page request against the provider's event list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListEventsQuery {
    /// Inclusive lower bound on event start (full sync only).
    pub time_min: Option<DateTime<Utc>>,
    /// Exclusive upper bound on event start (full sync only).
    pub time_max: Option<DateTime<Utc>>,
    /// Expand recurring events into single instances.
    pub single_events: bool,
    /// Order results by start time.
    pub order_by_start: bool,
    /// Include deleted/cancelled entries so prior local copies can be
    /// retracted.
    pub show_deleted: bool,
    /// Continuation token from the previous page.
    pub page_token: Option<String>,
    /// Resumption token for incremental sync. Mutually exclusive with the
    /// time bounds at the provider level.
    pub sync_token: Option<String>,
}

/// One page of provider events.
#[derive(Debug, Clone, Default)]
pub struct EventPage {
    pub items: Vec<ProviderEvent>,
    /// Present on all but the last page.
    pub next_page_token: Option<String>,
    /// Present on the last page; resumption token for the next incremental
    /// sync.
    pub next_sync_token: Option<String>,
}

/// An authorized handle on one user's calendar.
#[allow(async_fn_in_trait)]
pub trait CalendarClient {
    /// IANA time zone of the calendar, used for local day-boundary math.
    async fn calendar_time_zone(&self, calendar_id: &str) -> HorasResult<String>;

    /// Fetch one page of events.
    async fn list_events(
        &self,
        calendar_id: &str,
        query: &ListEventsQuery,
    ) -> HorasResult<EventPage>;
}

/// Hands out an authorized [`CalendarClient`] per user. How credentials are
/// obtained (impersonation, token files, ...) is this collaborator's
/// business.
#[allow(async_fn_in_trait)]
pub trait ClientProvider {
    type Client: CalendarClient;

    async fn client_for(&self, user_email: &str) -> HorasResult<Self::Client>;
}
