//! Google Calendar v3 REST client.

use horas_core::{
    CalendarClient, ClientProvider, EventPage, HorasError, HorasResult, ListEventsQuery,
};
use reqwest::StatusCode;

use crate::config;
use crate::types::{CalendarListEntry, EventsPage};

const API_BASE: &str = "https://www.googleapis.com/calendar/v3";

/// An authorized handle on one account's calendar.
pub struct GoogleCalendarClient {
    http: reqwest::Client,
    base_url: String,
    access_token: String,
}

impl GoogleCalendarClient {
    pub fn new(access_token: String) -> Self {
        GoogleCalendarClient {
            http: reqwest::Client::new(),
            base_url: API_BASE.to_string(),
            access_token,
        }
    }

    /// Point the client at a different API root (tests, proxies).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> HorasResult<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.access_token)
            .query(query)
            .send()
            .await
            .map_err(|e| HorasError::Provider(format!("request to {url} failed: {e}")))?;

        let status = response.status();
        if status.is_success() {
            return response
                .json()
                .await
                .map_err(|e| HorasError::Provider(format!("invalid response from {url}: {e}")));
        }

        let body = response.text().await.unwrap_or_default();
        match status {
            // The provider's "resumption token no longer valid" signal.
            StatusCode::GONE => Err(HorasError::SyncTokenExpired),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(HorasError::Auth(format!("{status}: {body}")))
            }
            _ => Err(HorasError::Provider(format!("{status}: {body}"))),
        }
    }
}

impl CalendarClient for GoogleCalendarClient {
    async fn calendar_time_zone(&self, calendar_id: &str) -> HorasResult<String> {
        let entry: CalendarListEntry = self
            .get_json(&format!("/users/me/calendarList/{calendar_id}"), &[])
            .await?;
        Ok(entry.time_zone.unwrap_or_else(|| "UTC".to_string()))
    }

    async fn list_events(
        &self,
        calendar_id: &str,
        query: &ListEventsQuery,
    ) -> HorasResult<EventPage> {
        let mut params: Vec<(&str, String)> = Vec::new();

        if let Some(time_min) = query.time_min {
            params.push(("timeMin", time_min.to_rfc3339()));
        }
        if let Some(time_max) = query.time_max {
            params.push(("timeMax", time_max.to_rfc3339()));
        }
        if query.single_events {
            params.push(("singleEvents", "true".to_string()));
        }
        if query.order_by_start {
            params.push(("orderBy", "startTime".to_string()));
        }
        if query.show_deleted {
            params.push(("showDeleted", "true".to_string()));
        }
        if let Some(ref token) = query.page_token {
            params.push(("pageToken", token.clone()));
        }
        if let Some(ref token) = query.sync_token {
            params.push(("syncToken", token.clone()));
        }

        let page: EventsPage = self
            .get_json(&format!("/calendars/{calendar_id}/events"), &params)
            .await?;
        Ok(page.into())
    }
}

/// Hands out a [`GoogleCalendarClient`] per user from stored tokens.
pub struct GoogleClientProvider;

impl ClientProvider for GoogleClientProvider {
    type Client = GoogleCalendarClient;

    async fn client_for(&self, user_email: &str) -> HorasResult<Self::Client> {
        let token = config::load_token(user_email)?;
        Ok(GoogleCalendarClient::new(token.access_token))
    }
}
