//! JSON-file store implementations.
//!
//! Each store keeps its full record set in one JSON file under the data
//! directory. Writes go to a temp file first and are renamed into place, so
//! a crashed run never leaves a half-written file behind.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{HorasError, HorasResult};
use crate::event::CalendarEvent;
use crate::store::{EventStore, SyncState, SyncStateStore};
use crate::task::{Task, TaskStore};

const EVENTS_FILE: &str = "events.json";
const SYNC_STATE_FILE: &str = "sync_state.json";
const TASKS_FILE: &str = "tasks.json";

fn read_records<T: DeserializeOwned>(path: &Path) -> HorasResult<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = std::fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(&content)
        .map_err(|e| HorasError::Serialization(format!("{}: {}", path.display(), e)))
}

fn write_records<T: Serialize>(path: &Path, records: &[T]) -> HorasResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(records)
        .map_err(|e| HorasError::Serialization(e.to_string()))?;

    let temp = path.with_extension("tmp");
    std::fs::write(&temp, content)?;
    std::fs::rename(&temp, path)?;
    Ok(())
}

pub struct FileEventStore {
    path: PathBuf,
}

impl FileEventStore {
    pub fn new(data_dir: &Path) -> Self {
        FileEventStore {
            path: data_dir.join(EVENTS_FILE),
        }
    }

    pub fn all(&self) -> HorasResult<Vec<CalendarEvent>> {
        read_records(&self.path)
    }
}

fn same_identity(e: &CalendarEvent, user: &str, calendar: &str, event_id: &str) -> bool {
    e.user_email == user && e.calendar_id == calendar && e.event_id == event_id
}

impl EventStore for FileEventStore {
    fn find_one(
        &self,
        user_email: &str,
        calendar_id: &str,
        event_id: &str,
    ) -> HorasResult<Option<CalendarEvent>> {
        let events: Vec<CalendarEvent> = read_records(&self.path)?;
        Ok(events
            .into_iter()
            .find(|e| same_identity(e, user_email, calendar_id, event_id)))
    }

    fn upsert(&self, event: &CalendarEvent) -> HorasResult<()> {
        let mut events: Vec<CalendarEvent> = read_records(&self.path)?;
        match events.iter_mut().find(|e| {
            same_identity(e, &event.user_email, &event.calendar_id, &event.event_id)
        }) {
            Some(existing) => *existing = event.clone(),
            None => events.push(event.clone()),
        }
        write_records(&self.path, &events)
    }

    fn delete_one(
        &self,
        user_email: &str,
        calendar_id: &str,
        event_id: &str,
    ) -> HorasResult<()> {
        let mut events: Vec<CalendarEvent> = read_records(&self.path)?;
        let before = events.len();
        events.retain(|e| !same_identity(e, user_email, calendar_id, event_id));
        if events.len() != before {
            write_records(&self.path, &events)?;
        }
        Ok(())
    }
}

pub struct FileSyncStateStore {
    path: PathBuf,
}

impl FileSyncStateStore {
    pub fn new(data_dir: &Path) -> Self {
        FileSyncStateStore {
            path: data_dir.join(SYNC_STATE_FILE),
        }
    }

    pub fn all(&self) -> HorasResult<Vec<SyncState>> {
        read_records(&self.path)
    }
}

impl SyncStateStore for FileSyncStateStore {
    fn get(&self, user_email: &str, calendar_id: &str) -> HorasResult<Option<SyncState>> {
        let states: Vec<SyncState> = read_records(&self.path)?;
        Ok(states
            .into_iter()
            .find(|s| s.user_email == user_email && s.calendar_id == calendar_id))
    }

    fn save(&self, state: &SyncState) -> HorasResult<()> {
        let mut states: Vec<SyncState> = read_records(&self.path)?;
        match states
            .iter_mut()
            .find(|s| s.user_email == state.user_email && s.calendar_id == state.calendar_id)
        {
            Some(existing) => *existing = state.clone(),
            None => states.push(state.clone()),
        }
        write_records(&self.path, &states)
    }
}

/// File-backed task storage. The ingestion side only uses the read-only
/// [`TaskStore`] trait; `insert`/`update` exist for the local task CRUD
/// commands and enforce tag uniqueness.
pub struct FileTaskStore {
    path: PathBuf,
}

impl FileTaskStore {
    pub fn new(data_dir: &Path) -> Self {
        FileTaskStore {
            path: data_dir.join(TASKS_FILE),
        }
    }

    /// Insert a task; an id of 0 means "assign the next one".
    pub fn insert(&self, mut task: Task) -> HorasResult<Task> {
        let mut tasks: Vec<Task> = read_records(&self.path)?;

        if tasks.iter().any(|t| t.tag == task.tag) {
            return Err(HorasError::Store(format!(
                "a task with tag {} already exists",
                task.tag
            )));
        }

        if task.id == 0 {
            task.id = tasks.iter().map(|t| t.id).max().unwrap_or(0) + 1;
        } else if tasks.iter().any(|t| t.id == task.id) {
            return Err(HorasError::Store(format!(
                "a task with id {} already exists",
                task.id
            )));
        }

        tasks.push(task.clone());
        write_records(&self.path, &tasks)?;
        Ok(task)
    }

    pub fn update(&self, task: Task) -> HorasResult<Task> {
        let mut tasks: Vec<Task> = read_records(&self.path)?;

        if tasks.iter().any(|t| t.tag == task.tag && t.id != task.id) {
            return Err(HorasError::Store(format!(
                "a task with tag {} already exists",
                task.tag
            )));
        }

        match tasks.iter_mut().find(|t| t.id == task.id) {
            Some(existing) => *existing = task.clone(),
            None => {
                return Err(HorasError::Store(format!("no task with id {}", task.id)));
            }
        }
        write_records(&self.path, &tasks)?;
        Ok(task)
    }
}

impl TaskStore for FileTaskStore {
    fn all(&self) -> HorasResult<Vec<Task>> {
        read_records(&self.path)
    }

    fn find_by_tag(&self, tag: &str) -> HorasResult<Option<Task>> {
        let tasks: Vec<Task> = read_records(&self.path)?;
        Ok(tasks.into_iter().find(|t| t.tag == tag))
    }

    fn find_by_tags(&self, tags: &[String]) -> HorasResult<Vec<Task>> {
        let tasks: Vec<Task> = read_records(&self.path)?;
        Ok(tasks
            .into_iter()
            .filter(|t| tags.iter().any(|tag| *tag == t.tag))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventStatus;
    use chrono::{TimeZone, Utc};

    fn event(user: &str, event_id: &str) -> CalendarEvent {
        let now = Utc.with_ymd_and_hms(2025, 3, 20, 12, 0, 0).unwrap();
        CalendarEvent {
            user_email: user.to_string(),
            calendar_id: "primary".to_string(),
            event_id: event_id.to_string(),
            summary: Some("#ACCIO planning".to_string()),
            organizer_email: None,
            html_link: None,
            location: None,
            start: Some(now),
            end: Some(now),
            status: EventStatus::Confirmed,
            provider_updated: None,
            created_at: now,
            updated_at: now,
            task_id: 1,
        }
    }

    #[test]
    fn event_upsert_and_idempotent_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileEventStore::new(dir.path());

        store.upsert(&event("a@example.com", "ev1")).unwrap();
        store.upsert(&event("a@example.com", "ev1")).unwrap();
        store.upsert(&event("b@example.com", "ev1")).unwrap();
        assert_eq!(store.all().unwrap().len(), 2);

        let found = store
            .find_one("a@example.com", "primary", "ev1")
            .unwrap()
            .unwrap();
        assert_eq!(found.user_email, "a@example.com");

        store.delete_one("a@example.com", "primary", "ev1").unwrap();
        store.delete_one("a@example.com", "primary", "ev1").unwrap();
        assert_eq!(store.all().unwrap().len(), 1);
        assert!(store
            .find_one("a@example.com", "primary", "ev1")
            .unwrap()
            .is_none());
    }

    #[test]
    fn sync_state_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSyncStateStore::new(dir.path());

        assert!(store.get("a@example.com", "primary").unwrap().is_none());

        let mut state = SyncState::new("a@example.com", "primary");
        state.sync_token = Some("abc".to_string());
        store.save(&state).unwrap();

        let loaded = store.get("a@example.com", "primary").unwrap().unwrap();
        assert_eq!(loaded.sync_token.as_deref(), Some("abc"));

        state.clear();
        store.save(&state).unwrap();
        let loaded = store.get("a@example.com", "primary").unwrap().unwrap();
        assert!(loaded.sync_token.is_none());
        assert!(loaded.last_synced_at.is_none());
    }

    #[test]
    fn task_ids_are_assigned_and_tags_stay_unique() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTaskStore::new(dir.path());

        let generic = store
            .insert(Task {
                id: 0,
                name: "Generic".to_string(),
                description: None,
                project_id: 1,
                tag: "#GENERICO".to_string(),
                starts_on: None,
                ends_on: None,
                active: true,
            })
            .unwrap();
        assert_eq!(generic.id, 1);

        let accio = store
            .insert(Task {
                id: 0,
                name: "Accio".to_string(),
                description: None,
                project_id: 1,
                tag: "#ACCIO".to_string(),
                starts_on: None,
                ends_on: None,
                active: true,
            })
            .unwrap();
        assert_eq!(accio.id, 2);

        let duplicate = store.insert(Task {
            id: 0,
            name: "Dup".to_string(),
            description: None,
            project_id: 1,
            tag: "#ACCIO".to_string(),
            starts_on: None,
            ends_on: None,
            active: true,
        });
        assert!(duplicate.is_err());

        let found = store.find_by_tag("#ACCIO").unwrap().unwrap();
        assert_eq!(found.id, 2);
        assert_eq!(
            store
                .find_by_tags(&["#ACCIO".to_string(), "#NOPE".to_string()])
                .unwrap()
                .len(),
            1
        );
    }
}
