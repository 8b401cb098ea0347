//! Task entity and lookup contract.
//!
//! Tasks are managed by an external CRUD surface; the ingestion side only
//! reads them. Relationships are plain ids (`project_id`) resolved through
//! stores on demand, never an in-memory object graph.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::HorasResult;

/// A unit of work that calendar events are attributed to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    /// Owning project (foreign key, resolved elsewhere).
    pub project_id: i64,
    /// Unique human-assigned tag, e.g. `#ACCIO_PROJETO`. Case-sensitive.
    pub tag: String,
    /// Validity window.
    pub starts_on: Option<NaiveDate>,
    pub ends_on: Option<NaiveDate>,
    pub active: bool,
}

/// Read-only task lookups used by tag resolution.
pub trait TaskStore: Send + Sync {
    /// Every persisted task; used once at startup to preload the tag cache.
    fn all(&self) -> HorasResult<Vec<Task>>;

    /// Point lookup by exact tag.
    fn find_by_tag(&self, tag: &str) -> HorasResult<Option<Task>>;

    /// Batched lookup: all tasks whose tag is in `tags`. One call resolves a
    /// whole sync page's worth of cache misses.
    fn find_by_tags(&self, tags: &[String]) -> HorasResult<Vec<Task>>;
}
