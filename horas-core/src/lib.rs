//! Core engine for horas: calendar-driven work-hours tracking.
//!
//! This crate holds the synchronization and tag-resolution machinery:
//! - `tag` — leading-tag extraction and the cached tag → task resolver
//! - `store` — event and sync-state persistence contracts (plus in-memory
//!   and JSON-file implementations)
//! - `provider` — the contracts a calendar provider implements
//! - `ingest` — the ingestion engine that ties them together
//!
//! The REST surface, report generation, and credential handling live
//! elsewhere; they only meet this crate through the traits defined here.

pub mod config;
pub mod error;
pub mod event;
pub mod ingest;
pub mod provider;
pub mod store;
pub mod tag;
pub mod task;

pub use config::SyncConfig;
pub use error::{HorasError, HorasResult};
pub use event::{CalendarEvent, EventStatus, EventTime, ProviderEvent};
pub use ingest::IngestionEngine;
pub use provider::{CalendarClient, ClientProvider, EventPage, ListEventsQuery};
pub use store::{EventStore, SyncState, SyncStateStore};
pub use tag::{TagCache, TagResolver};
pub use task::{Task, TaskStore};
