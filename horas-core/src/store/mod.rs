//! Persistence contracts for events and sync state.
//!
//! The relational layer behind these traits is someone else's problem; the
//! engine only ever goes through them. `memory` holds in-process
//! implementations (tests, embedding), `file` the JSON-file implementations
//! used by the CLI.

pub mod file;
pub mod memory;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::HorasResult;
use crate::event::CalendarEvent;

/// Per (user, calendar) sync bookkeeping: the resumption token from the last
/// successful pass and when that pass ran. A missing/blank token forces the
/// next run onto the full-sync path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncState {
    pub user_email: String,
    pub calendar_id: String,
    pub sync_token: Option<String>,
    pub last_synced_at: Option<DateTime<Utc>>,
}

impl SyncState {
    pub fn new(user_email: &str, calendar_id: &str) -> Self {
        SyncState {
            user_email: user_email.to_string(),
            calendar_id: calendar_id.to_string(),
            sync_token: None,
            last_synced_at: None,
        }
    }

    /// Forget the resumption token; the next sync will be a full one.
    pub fn clear(&mut self) {
        self.sync_token = None;
        self.last_synced_at = None;
    }
}

pub trait SyncStateStore: Send + Sync {
    fn get(&self, user_email: &str, calendar_id: &str) -> HorasResult<Option<SyncState>>;

    /// Upsert by (user, calendar).
    fn save(&self, state: &SyncState) -> HorasResult<()>;
}

pub trait EventStore: Send + Sync {
    fn find_one(
        &self,
        user_email: &str,
        calendar_id: &str,
        event_id: &str,
    ) -> HorasResult<Option<CalendarEvent>>;

    /// Insert or replace by identity triple.
    fn upsert(&self, event: &CalendarEvent) -> HorasResult<()>;

    /// Idempotent: deleting an absent event is not an error.
    fn delete_one(
        &self,
        user_email: &str,
        calendar_id: &str,
        event_id: &str,
    ) -> HorasResult<()>;
}
