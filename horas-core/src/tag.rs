//! Leading-tag extraction and task resolution.
//!
//! Event titles start with a `#tag` that links them to a task
//! (e.g. `#ACCIO_PROJETO weekly planning`). Resolution goes through a
//! process-wide in-memory cache so a sync pass over hundreds of events costs
//! at most one batched store lookup per page.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::{HorasError, HorasResult};
use crate::task::{Task, TaskStore};

/// Extract the leading tag from free text: `#` followed by one or more
/// Unicode letters/digits/`_`/`-`, anchored at the start after optional
/// whitespace. Returns `None` when the text does not begin with a tag.
pub fn extract_leading_tag(text: &str) -> Option<&str> {
    let trimmed = text.trim_start();
    let body = trimmed.strip_prefix('#')?;

    let end = body
        .char_indices()
        .find(|(_, c)| !(c.is_alphanumeric() || *c == '_' || *c == '-'))
        .map(|(i, _)| i)
        .unwrap_or(body.len());

    if end == 0 {
        None
    } else {
        // '#' is a single byte, so the tag spans end + 1 bytes of `trimmed`.
        Some(&trimmed[..end + 1])
    }
}

/// Normalize a tag for use as a cache key: trim, reject empty, prefix `#`
/// if missing. Case is preserved on purpose; `#Accio` and `#accio` are
/// different tags.
pub fn normalize_tag(tag: &str) -> Option<String> {
    let t = tag.trim();
    if t.is_empty() {
        None
    } else if t.starts_with('#') {
        Some(t.to_string())
    } else {
        Some(format!("#{t}"))
    }
}

/// Extract and normalize in one step.
pub fn normalized_leading_tag(text: &str) -> Option<String> {
    extract_leading_tag(text).and_then(normalize_tag)
}

/// Shared normalized-tag → task cache.
///
/// Concurrency contract: concurrent reads and write-through inserts are fine;
/// entries derive from durable task storage, so last-writer-wins on racing
/// inserts is acceptable. Entries never expire by time, only by the explicit
/// invalidation tied to task mutation.
#[derive(Default)]
pub struct TagCache {
    entries: RwLock<HashMap<String, Task>>,
}

impl TagCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, tag: &str) -> Option<Task> {
        let entries = self.entries.read().unwrap_or_else(|p| p.into_inner());
        entries.get(tag).cloned()
    }

    pub fn insert(&self, tag: String, task: Task) {
        let mut entries = self.entries.write().unwrap_or_else(|p| p.into_inner());
        entries.insert(tag, task);
    }

    /// Drop every entry pointing at `task_id`. Guards against stale reverse
    /// mappings when a task's tag is renamed or the task is deleted.
    pub fn remove_task(&self, task_id: i64) {
        let mut entries = self.entries.write().unwrap_or_else(|p| p.into_inner());
        entries.retain(|_, task| task.id != task_id);
    }

    pub fn len(&self) -> usize {
        let entries = self.entries.read().unwrap_or_else(|p| p.into_inner());
        entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Resolves tags to tasks through the cache, falling back to the configured
/// generic task.
///
/// Construction preloads the cache from every persisted task and fails if no
/// task carries the generic tag: starting without it would silently
/// mis-categorize events.
#[derive(Clone)]
pub struct TagResolver {
    cache: Arc<TagCache>,
    tasks: Arc<dyn TaskStore>,
    generic_tag: String,
}

impl TagResolver {
    pub fn new(
        cache: Arc<TagCache>,
        tasks: Arc<dyn TaskStore>,
        generic_tag: &str,
    ) -> HorasResult<Self> {
        let generic_tag = normalize_tag(generic_tag)
            .ok_or_else(|| HorasError::Config("generic tag must not be empty".into()))?;

        let resolver = TagResolver {
            cache,
            tasks,
            generic_tag,
        };
        resolver.preload()?;
        Ok(resolver)
    }

    /// Enumerate all tasks once and seed the cache.
    fn preload(&self) -> HorasResult<()> {
        for task in self.tasks.all()? {
            if let Some(norm) = normalize_tag(&task.tag) {
                self.cache.insert(norm, task);
            }
        }

        if self.cache.get(&self.generic_tag).is_none() {
            return Err(HorasError::MissingGenericTask(self.generic_tag.clone()));
        }
        Ok(())
    }

    pub fn generic_tag(&self) -> &str {
        &self.generic_tag
    }

    /// Normalized leading tag of an event summary, if any.
    pub fn normalized_leading_tag(&self, summary: Option<&str>) -> Option<String> {
        summary.and_then(normalized_leading_tag)
    }

    /// The fallback task. Cached after the first lookup.
    pub fn generic_task(&self) -> HorasResult<Task> {
        if let Some(task) = self.cache.get(&self.generic_tag) {
            return Ok(task);
        }
        match self.tasks.find_by_tag(&self.generic_tag)? {
            Some(task) => {
                self.cache.insert(self.generic_tag.clone(), task.clone());
                Ok(task)
            }
            None => Err(HorasError::MissingGenericTask(self.generic_tag.clone())),
        }
    }

    /// Resolve a single tag (or tag-bearing text), falling back to the
    /// generic task when nothing matches.
    pub fn resolve(&self, raw: &str) -> HorasResult<Task> {
        if let Some(normalized) = normalize_tag(raw) {
            if let Some(task) = self.cache.get(&normalized) {
                return Ok(task);
            }
            if let Some(task) = self.tasks.find_by_tag(&normalized)? {
                self.cache.insert(normalized, task.clone());
                return Ok(task);
            }
        }
        self.generic_task()
    }

    /// Resolve a set of tags with at most one store query.
    ///
    /// Input tags are normalized and de-duplicated (first-seen order, for
    /// deterministic tests). Cache hits are returned directly; the misses go
    /// through a single batched lookup whose results are written through to
    /// the cache. Tags that resolve to nothing are absent from the returned
    /// map — callers apply the generic fallback themselves.
    pub fn resolve_bulk(&self, raw_tags: &[String]) -> HorasResult<HashMap<String, Task>> {
        let mut result = HashMap::new();
        if raw_tags.is_empty() {
            return Ok(result);
        }

        let mut normalized: Vec<String> = Vec::new();
        for raw in raw_tags {
            if let Some(tag) = normalize_tag(raw) {
                if !normalized.contains(&tag) {
                    normalized.push(tag);
                }
            }
        }

        let mut missing: Vec<String> = Vec::new();
        for tag in normalized {
            match self.cache.get(&tag) {
                Some(task) => {
                    result.insert(tag, task);
                }
                None => missing.push(tag),
            }
        }

        if !missing.is_empty() {
            for task in self.tasks.find_by_tags(&missing)? {
                if let Some(tag) = normalize_tag(&task.tag) {
                    self.cache.insert(tag.clone(), task.clone());
                    result.insert(tag, task);
                }
            }
        }

        Ok(result)
    }

    // Cache maintenance for the task CRUD path. The ingestion engine never
    // mutates tasks; these keep the cache consistent when the external CRUD
    // surface does.

    /// A task was created: cache its normalized tag.
    pub fn task_saved(&self, task: &Task) {
        if let Some(tag) = normalize_tag(&task.tag) {
            self.cache.insert(tag, task.clone());
        }
    }

    /// A task was updated (possibly renamed): drop every stale entry for it,
    /// then reinsert under the current tag.
    pub fn task_updated(&self, task: &Task) {
        self.cache.remove_task(task.id);
        self.task_saved(task);
    }

    /// A task was deleted: drop its entries.
    pub fn task_deleted(&self, task_id: i64) {
        self.cache.remove_task(task_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryTaskStore;

    fn task(id: i64, tag: &str) -> Task {
        Task {
            id,
            name: format!("task {id}"),
            description: None,
            project_id: 1,
            tag: tag.to_string(),
            starts_on: None,
            ends_on: None,
            active: true,
        }
    }

    fn resolver_with(tasks: Vec<Task>) -> (TagResolver, Arc<MemoryTaskStore>) {
        let store = Arc::new(MemoryTaskStore::new(tasks));
        let resolver = TagResolver::new(
            Arc::new(TagCache::new()),
            store.clone(),
            crate::config::DEFAULT_GENERIC_TAG,
        )
        .expect("resolver should construct");
        (resolver, store)
    }

    #[test]
    fn extracts_leading_tag() {
        assert_eq!(extract_leading_tag("#ACCIO planning"), Some("#ACCIO"));
        assert_eq!(extract_leading_tag("  #ACCIO planning"), Some("#ACCIO"));
        assert_eq!(extract_leading_tag("#ACCIO_P-2 planning"), Some("#ACCIO_P-2"));
        assert_eq!(extract_leading_tag("#São_Paulo café"), Some("#São_Paulo"));
        assert_eq!(extract_leading_tag("planning #ACCIO"), None);
        assert_eq!(extract_leading_tag("# nothing"), None);
        assert_eq!(extract_leading_tag(""), None);
        assert_eq!(extract_leading_tag("no tag here"), None);
    }

    #[test]
    fn normalizes_tags() {
        assert_eq!(normalize_tag("  #ACCIO  "), Some("#ACCIO".to_string()));
        assert_eq!(normalize_tag("ACCIO"), Some("#ACCIO".to_string()));
        assert_eq!(normalize_tag("   "), None);
        // Case is preserved, not folded.
        assert_eq!(normalize_tag("#Accio_Projeto"), Some("#Accio_Projeto".to_string()));
    }

    #[test]
    fn missing_generic_task_is_fatal() {
        let store = Arc::new(MemoryTaskStore::new(vec![task(1, "#ACCIO")]));
        let err = TagResolver::new(Arc::new(TagCache::new()), store, "#GENERICO")
            .err()
            .expect("construction must fail without the generic task");
        assert!(matches!(err, HorasError::MissingGenericTask(_)));
    }

    #[test]
    fn resolves_known_tag_and_falls_back_to_generic() {
        let (resolver, _) = resolver_with(vec![task(1, "#GENERICO"), task(2, "#ACCIO")]);

        assert_eq!(resolver.resolve("#ACCIO").unwrap().id, 2);
        assert_eq!(resolver.resolve("ACCIO").unwrap().id, 2);
        assert_eq!(resolver.resolve("#UNKNOWN").unwrap().id, 1);
        assert_eq!(resolver.resolve("  ").unwrap().id, 1);
    }

    #[test]
    fn bulk_resolution_is_deterministic_and_omits_unknown() {
        let (resolver, store) = resolver_with(vec![task(1, "#GENERICO"), task(2, "#ACCIO")]);

        let tags = vec![
            "#ACCIO".to_string(),
            "ACCIO".to_string(), // duplicate after normalization
            "#MISSING".to_string(),
        ];
        let map = resolver.resolve_bulk(&tags).unwrap();

        assert_eq!(map.len(), 1);
        assert_eq!(map.get("#ACCIO").unwrap().id, 2);
        assert!(!map.contains_key("#MISSING"));
        // Cache was preloaded, so no batch query should have been needed
        // for #ACCIO; only #MISSING goes to the store.
        assert_eq!(store.batch_queries(), 1);
    }

    #[test]
    fn bulk_resolution_populates_cache() {
        let store = Arc::new(MemoryTaskStore::new(vec![task(1, "#GENERICO")]));
        let resolver = TagResolver::new(Arc::new(TagCache::new()), store.clone(), "#GENERICO")
            .unwrap();

        store.insert(task(2, "#LATE"));
        let map = resolver.resolve_bulk(&["#LATE".to_string()]).unwrap();
        assert_eq!(map.get("#LATE").unwrap().id, 2);

        // Second resolution is a pure cache hit.
        let before = store.batch_queries();
        let map = resolver.resolve_bulk(&["#LATE".to_string()]).unwrap();
        assert_eq!(map.get("#LATE").unwrap().id, 2);
        assert_eq!(store.batch_queries(), before);
    }

    #[test]
    fn tag_case_must_match_exactly() {
        let (resolver, _) = resolver_with(vec![task(1, "#GENERICO"), task(2, "#Accio_Projeto")]);

        let map = resolver
            .resolve_bulk(&["#Accio_Projeto".to_string()])
            .unwrap();
        assert_eq!(map.get("#Accio_Projeto").unwrap().id, 2);

        let map = resolver
            .resolve_bulk(&["#accio_projeto".to_string()])
            .unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn rename_invalidates_stale_cache_entries() {
        let (resolver, store) = resolver_with(vec![task(1, "#GENERICO"), task(2, "#OLD")]);
        assert_eq!(resolver.resolve("#OLD").unwrap().id, 2);

        let renamed = task(2, "#NEW");
        store.update(renamed.clone());
        resolver.task_updated(&renamed);

        assert_eq!(resolver.resolve("#NEW").unwrap().id, 2);
        // The stale reverse mapping is gone: #OLD now lands on generic.
        assert_eq!(resolver.resolve("#OLD").unwrap().id, 1);
    }

    #[test]
    fn delete_invalidates_cache_entries() {
        let (resolver, store) = resolver_with(vec![task(1, "#GENERICO"), task(2, "#GONE")]);
        assert_eq!(resolver.resolve("#GONE").unwrap().id, 2);

        store.remove(2);
        resolver.task_deleted(2);

        assert_eq!(resolver.resolve("#GONE").unwrap().id, 1);
    }
}
