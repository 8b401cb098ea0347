//! In-memory store implementations.
//!
//! Used as test doubles and by embedders that do not need durability. Keys
//! mirror the persistent identities: events by (user, calendar, event id),
//! sync state by (user, calendar).

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::HorasResult;
use crate::event::CalendarEvent;
use crate::store::{EventStore, SyncState, SyncStateStore};
use crate::task::{Task, TaskStore};

type EventKey = (String, String, String);

#[derive(Default)]
pub struct MemoryEventStore {
    events: RwLock<HashMap<EventKey, CalendarEvent>>,
}

impl MemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.events.read().unwrap_or_else(|p| p.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All stored events, ordered by identity for deterministic assertions.
    pub fn all(&self) -> Vec<CalendarEvent> {
        let events = self.events.read().unwrap_or_else(|p| p.into_inner());
        let mut all: Vec<CalendarEvent> = events.values().cloned().collect();
        all.sort_by(|a, b| {
            (&a.user_email, &a.calendar_id, &a.event_id)
                .cmp(&(&b.user_email, &b.calendar_id, &b.event_id))
        });
        all
    }
}

fn key(user_email: &str, calendar_id: &str, event_id: &str) -> EventKey {
    (
        user_email.to_string(),
        calendar_id.to_string(),
        event_id.to_string(),
    )
}

impl EventStore for MemoryEventStore {
    fn find_one(
        &self,
        user_email: &str,
        calendar_id: &str,
        event_id: &str,
    ) -> HorasResult<Option<CalendarEvent>> {
        let events = self.events.read().unwrap_or_else(|p| p.into_inner());
        Ok(events.get(&key(user_email, calendar_id, event_id)).cloned())
    }

    fn upsert(&self, event: &CalendarEvent) -> HorasResult<()> {
        let mut events = self.events.write().unwrap_or_else(|p| p.into_inner());
        events.insert(
            key(&event.user_email, &event.calendar_id, &event.event_id),
            event.clone(),
        );
        Ok(())
    }

    fn delete_one(
        &self,
        user_email: &str,
        calendar_id: &str,
        event_id: &str,
    ) -> HorasResult<()> {
        let mut events = self.events.write().unwrap_or_else(|p| p.into_inner());
        events.remove(&key(user_email, calendar_id, event_id));
        Ok(())
    }
}

#[derive(Default)]
pub struct MemorySyncStateStore {
    states: RwLock<HashMap<(String, String), SyncState>>,
}

impl MemorySyncStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SyncStateStore for MemorySyncStateStore {
    fn get(&self, user_email: &str, calendar_id: &str) -> HorasResult<Option<SyncState>> {
        let states = self.states.read().unwrap_or_else(|p| p.into_inner());
        Ok(states
            .get(&(user_email.to_string(), calendar_id.to_string()))
            .cloned())
    }

    fn save(&self, state: &SyncState) -> HorasResult<()> {
        let mut states = self.states.write().unwrap_or_else(|p| p.into_inner());
        states.insert(
            (state.user_email.clone(), state.calendar_id.clone()),
            state.clone(),
        );
        Ok(())
    }
}

/// In-memory task store. Counts batched lookups so tests can assert the
/// one-query-per-page property of bulk resolution.
#[derive(Default)]
pub struct MemoryTaskStore {
    tasks: RwLock<Vec<Task>>,
    batch_queries: AtomicUsize,
}

impl MemoryTaskStore {
    pub fn new(tasks: Vec<Task>) -> Self {
        MemoryTaskStore {
            tasks: RwLock::new(tasks),
            batch_queries: AtomicUsize::new(0),
        }
    }

    pub fn insert(&self, task: Task) {
        let mut tasks = self.tasks.write().unwrap_or_else(|p| p.into_inner());
        tasks.push(task);
    }

    pub fn update(&self, task: Task) {
        let mut tasks = self.tasks.write().unwrap_or_else(|p| p.into_inner());
        if let Some(existing) = tasks.iter_mut().find(|t| t.id == task.id) {
            *existing = task;
        }
    }

    pub fn remove(&self, task_id: i64) {
        let mut tasks = self.tasks.write().unwrap_or_else(|p| p.into_inner());
        tasks.retain(|t| t.id != task_id);
    }

    /// How many times `find_by_tags` has been called.
    pub fn batch_queries(&self) -> usize {
        self.batch_queries.load(Ordering::SeqCst)
    }
}

impl TaskStore for MemoryTaskStore {
    fn all(&self) -> HorasResult<Vec<Task>> {
        let tasks = self.tasks.read().unwrap_or_else(|p| p.into_inner());
        Ok(tasks.clone())
    }

    fn find_by_tag(&self, tag: &str) -> HorasResult<Option<Task>> {
        let tasks = self.tasks.read().unwrap_or_else(|p| p.into_inner());
        Ok(tasks.iter().find(|t| t.tag == tag).cloned())
    }

    fn find_by_tags(&self, tags: &[String]) -> HorasResult<Vec<Task>> {
        self.batch_queries.fetch_add(1, Ordering::SeqCst);
        let tasks = self.tasks.read().unwrap_or_else(|p| p.into_inner());
        Ok(tasks
            .iter()
            .filter(|t| tags.iter().any(|tag| *tag == t.tag))
            .cloned()
            .collect())
    }
}
