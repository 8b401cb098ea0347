//! Shared wiring for the CLI commands: config, file stores, and engine
//! construction.

use std::sync::Arc;

use anyhow::{Context, Result};
use horas_core::store::file::{FileEventStore, FileSyncStateStore, FileTaskStore};
use horas_core::{
    EventStore, IngestionEngine, SyncState, SyncStateStore, TagCache, TagResolver, TaskStore,
};
use horas_provider_google::GoogleClientProvider;

use crate::config::HorasConfig;

pub struct App {
    pub config: HorasConfig,
    pub tasks: Arc<FileTaskStore>,
    pub events: Arc<FileEventStore>,
    pub states: Arc<FileSyncStateStore>,
}

impl App {
    pub fn new() -> Result<Self> {
        let config = HorasConfig::load()?;
        let data_dir = config.data_dir()?;

        Ok(App {
            tasks: Arc::new(FileTaskStore::new(&data_dir)),
            events: Arc::new(FileEventStore::new(&data_dir)),
            states: Arc::new(FileSyncStateStore::new(&data_dir)),
            config,
        })
    }

    /// Build the ingestion engine. Fails fast when no task carries the
    /// generic tag — syncing without it would mis-file events.
    pub fn engine(&self) -> Result<IngestionEngine<GoogleClientProvider>> {
        let resolver = TagResolver::new(
            Arc::new(TagCache::new()),
            self.tasks.clone() as Arc<dyn TaskStore>,
            &self.config.sync.generic_tag,
        )
        .with_context(|| {
            format!(
                "Cannot start ingestion. Seed it with: horas task add \"General\" --tag {}",
                self.config.sync.generic_tag
            )
        })?;

        Ok(IngestionEngine::new(
            GoogleClientProvider,
            resolver,
            self.events.clone() as Arc<dyn EventStore>,
            self.states.clone() as Arc<dyn SyncStateStore>,
            self.config.sync.clone(),
        ))
    }

    /// Clear a user's resumption token so the next sync is a full one.
    pub fn reset_sync_state(&self, user_email: &str) -> Result<()> {
        let calendar_id = &self.config.sync.calendar_id;
        let mut state = self
            .states
            .get(user_email, calendar_id)?
            .unwrap_or_else(|| SyncState::new(user_email, calendar_id));
        state.clear();
        self.states.save(&state)?;
        Ok(())
    }
}
