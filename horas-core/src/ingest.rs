//! Calendar ingestion engine.
//!
//! One `sync_user` call pulls a user's primary calendar — incrementally when
//! a resumption token is on file, otherwise as a time-windowed full sync —
//! resolves each event's leading tag to a task, and converges the local
//! event store. Safe to run repeatedly; the caller is responsible for not
//! overlapping runs for the same user. Runs for different users may proceed
//! concurrently.

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveTime, Utc};
use chrono_tz::Tz;

use crate::config::SyncConfig;
use crate::error::{HorasError, HorasResult};
use crate::event::{CalendarEvent, ProviderEvent};
use crate::provider::{CalendarClient, ClientProvider, ListEventsQuery};
use crate::store::{EventStore, SyncState, SyncStateStore};
use crate::tag::TagResolver;

/// Exclusive upper window bound: the start of the *next* local day in the
/// user's zone. Events starting at or after this instant are never ingested.
fn end_of_today_exclusive(now: DateTime<Utc>, zone: Tz) -> DateTime<Utc> {
    let next_day = now.with_timezone(&zone).date_naive() + Duration::days(1);
    let mut candidate = next_day.and_time(NaiveTime::MIN);

    // A DST gap can swallow local midnight; step forward until the local
    // time exists.
    for _ in 0..3 {
        if let Some(dt) = candidate.and_local_timezone(zone).earliest() {
            return dt.with_timezone(&Utc);
        }
        candidate += Duration::hours(1);
    }
    candidate.and_utc()
}

fn same_local_day(a: DateTime<Utc>, b: DateTime<Utc>, zone: Tz) -> bool {
    a.with_timezone(&zone).date_naive() == b.with_timezone(&zone).date_naive()
}

/// Orchestrates sync passes: provider paging, tag resolution, idempotent
/// upsert/delete, and resumption-token bookkeeping.
pub struct IngestionEngine<P: ClientProvider> {
    clients: P,
    tags: TagResolver,
    events: Arc<dyn EventStore>,
    sync_states: Arc<dyn SyncStateStore>,
    config: SyncConfig,
}

impl<P: ClientProvider> IngestionEngine<P> {
    pub fn new(
        clients: P,
        tags: TagResolver,
        events: Arc<dyn EventStore>,
        sync_states: Arc<dyn SyncStateStore>,
        config: SyncConfig,
    ) -> Self {
        IngestionEngine {
            clients,
            tags,
            events,
            sync_states,
            config,
        }
    }

    /// Synchronize one user's calendar.
    ///
    /// An expired resumption token is recovered exactly once: the stored
    /// state is cleared and the whole pass reruns on the full-sync path. Any
    /// other provider error propagates untouched — the caller decides what a
    /// failed user means for the batch.
    pub async fn sync_user(&self, user_email: &str) -> HorasResult<()> {
        match self.sync_user_once(user_email).await {
            Err(HorasError::SyncTokenExpired) => {
                let mut state = self
                    .sync_states
                    .get(user_email, &self.config.calendar_id)?
                    .unwrap_or_else(|| SyncState::new(user_email, &self.config.calendar_id));
                state.clear();
                self.sync_states.save(&state)?;
                self.sync_user_once(user_email).await
            }
            other => other,
        }
    }

    async fn sync_user_once(&self, user_email: &str) -> HorasResult<()> {
        let calendar_id = self.config.calendar_id.as_str();
        let client = self.clients.client_for(user_email).await?;

        let mut state = self
            .sync_states
            .get(user_email, calendar_id)?
            .unwrap_or_else(|| SyncState::new(user_email, calendar_id));

        let tz_name = client.calendar_time_zone(calendar_id).await?;
        let zone: Tz = tz_name
            .parse()
            .map_err(|_| HorasError::InvalidTimeZone(tz_name.clone()))?;

        let now = Utc::now();
        let window_until = end_of_today_exclusive(now, zone);

        // The exclusive end-of-today window only covers passes started
        // today. A token carried across a local day boundary could skip a
        // day's worth of events, so it is discarded even when the provider
        // would still honor it — one forced full resync per user per day.
        let mut sync_token = state.sync_token.clone();
        if !state
            .last_synced_at
            .is_some_and(|t| same_local_day(t, now, zone))
        {
            sync_token = None;
        }

        let full_sync = sync_token.as_deref().map_or(true, |t| t.trim().is_empty());

        let next_sync_token = if full_sync {
            self.full_sync(&client, user_email, calendar_id, now, window_until)
                .await?
        } else {
            let token = sync_token.unwrap_or_default();
            self.incremental_sync(&client, user_email, calendar_id, &token, window_until)
                .await?
        };

        // No new token (zero pages) leaves the stored state untouched.
        if let Some(token) = next_sync_token {
            state.sync_token = Some(token);
            state.last_synced_at = Some(now);
            self.sync_states.save(&state)?;
        }

        Ok(())
    }

    /// Page through everything between now − lookback and the window bound.
    /// Deleted entries are requested too, so prior local copies get
    /// retracted.
    async fn full_sync(
        &self,
        client: &P::Client,
        user_email: &str,
        calendar_id: &str,
        now: DateTime<Utc>,
        window_until: DateTime<Utc>,
    ) -> HorasResult<Option<String>> {
        let time_min = now - Duration::days(self.config.lookback_days);

        let mut page_token: Option<String> = None;
        let mut next_sync_token: Option<String> = None;

        loop {
            let query = ListEventsQuery {
                time_min: Some(time_min),
                time_max: Some(window_until),
                single_events: true,
                order_by_start: true,
                show_deleted: true,
                page_token: page_token.clone(),
                sync_token: None,
            };
            let page = client.list_events(calendar_id, &query).await?;

            self.upsert_batch(user_email, calendar_id, &page.items)?;

            // Only the final page carries a resumption token.
            next_sync_token = page.next_sync_token;
            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(next_sync_token)
    }

    /// Page through provider changes since `sync_token`. Incremental listing
    /// accepts no time bounds, so events starting at or past the window are
    /// re-filtered locally before storage; the page still advances and its
    /// token is still captured.
    async fn incremental_sync(
        &self,
        client: &P::Client,
        user_email: &str,
        calendar_id: &str,
        sync_token: &str,
        window_until: DateTime<Utc>,
    ) -> HorasResult<Option<String>> {
        let mut page_token: Option<String> = None;
        let mut next_sync_token: Option<String> = None;

        loop {
            let query = ListEventsQuery {
                show_deleted: true,
                page_token: page_token.clone(),
                sync_token: Some(sync_token.to_string()),
                ..ListEventsQuery::default()
            };
            let page = client.list_events(calendar_id, &query).await?;

            let past_or_today: Vec<ProviderEvent> = page
                .items
                .into_iter()
                .filter(|e| e.start_instant().map_or(true, |start| start < window_until))
                .collect();

            self.upsert_batch(user_email, calendar_id, &past_or_today)?;

            next_sync_token = page.next_sync_token;
            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(next_sync_token)
    }

    /// Store one page of events: cancelled entries delete any local copy,
    /// everything else is inserted or updated in place, linked to the task
    /// resolved from its leading tag (generic task when unresolvable).
    ///
    /// Tags for the whole page resolve through one bulk lookup rather than
    /// one query per event.
    fn upsert_batch(
        &self,
        user_email: &str,
        calendar_id: &str,
        items: &[ProviderEvent],
    ) -> HorasResult<()> {
        if items.is_empty() {
            return Ok(());
        }

        // Distinct normalized tags in first-seen order (order only matters
        // for test determinism).
        let mut page_tags: Vec<String> = Vec::new();
        for item in items {
            if let Some(tag) = self.tags.normalized_leading_tag(item.summary.as_deref()) {
                if !page_tags.contains(&tag) {
                    page_tags.push(tag);
                }
            }
        }

        let resolved = self.tags.resolve_bulk(&page_tags)?;
        let generic = self.tags.generic_task()?;

        for item in items {
            if item.is_cancelled() {
                self.events
                    .delete_one(user_email, calendar_id, &item.id)?;
                continue;
            }

            let task = self
                .tags
                .normalized_leading_tag(item.summary.as_deref())
                .and_then(|tag| resolved.get(&tag).cloned())
                .unwrap_or_else(|| generic.clone());

            let now = Utc::now();
            let record = match self.events.find_one(user_email, calendar_id, &item.id)? {
                None => CalendarEvent {
                    user_email: user_email.to_string(),
                    calendar_id: calendar_id.to_string(),
                    event_id: item.id.clone(),
                    summary: item.summary.clone(),
                    organizer_email: item.organizer_email.clone(),
                    html_link: item.html_link.clone(),
                    location: item.location.clone(),
                    start: item.start_instant(),
                    end: item.end_instant(),
                    status: item.parsed_status(),
                    provider_updated: item.updated,
                    created_at: now,
                    updated_at: now,
                    task_id: task.id,
                },
                Some(existing) => CalendarEvent {
                    summary: item.summary.clone(),
                    organizer_email: item.organizer_email.clone(),
                    html_link: item.html_link.clone(),
                    location: item.location.clone(),
                    start: item.start_instant(),
                    end: item.end_instant(),
                    status: item.parsed_status(),
                    provider_updated: item.updated,
                    updated_at: now,
                    task_id: task.id,
                    // Identity and creation time survive updates.
                    ..existing
                },
            };
            self.events.upsert(&record)?;
        }

        Ok(())
    }
}
