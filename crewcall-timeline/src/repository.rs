//! In-memory timeline registry with single-document persistence.
//!
//! The whole registry serializes to one JSON document holding an ordered
//! list of `(entity_id, Timeline)` pairs. Persistence is last-write-wins
//! across processes; within a process the registry is the single source
//! of truth.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, warn};

use crewcall_protocol::prelude::*;

use crate::error::{Result, TimelineError};

/// Persistent backing for the serialized registry. A single logical key
/// holds the whole document.
pub trait RegistryStore: Send + Sync {
    /// Returns the stored payload, or `None` when nothing was persisted
    /// yet.
    fn load(&self) -> Result<Option<String>>;
    fn save(&self, payload: &str) -> Result<()>;
}

/// File-backed store writing the registry under the Crewcall data
/// directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Resolves `~/.crewcall/data/registry.json`, honoring an explicit
    /// data directory when configured.
    pub fn default_path(data_dir: Option<&std::path::Path>) -> Result<Self> {
        let base = match data_dir {
            Some(dir) => dir.to_path_buf(),
            None => dirs::home_dir()
                .ok_or_else(|| {
                    TimelineError::from_io(std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        "home directory not found",
                    ))
                })?
                .join(".crewcall")
                .join("data"),
        };
        Ok(Self::new(base.join("registry.json")))
    }
}

impl RegistryStore for JsonFileStore {
    fn load(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(payload) => Ok(Some(payload)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(TimelineError::from_io(err)),
        }
    }

    fn save(&self, payload: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(TimelineError::from_io)?;
        }
        // Write-then-rename so a crash mid-save never truncates the
        // previous registry.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, payload).map_err(TimelineError::from_io)?;
        fs::rename(&tmp, &self.path).map_err(TimelineError::from_io)?;
        Ok(())
    }
}

/// Volatile store used by tests and by embedders that persist elsewhere.
#[derive(Default)]
pub struct MemoryStore {
    slot: RwLock<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RegistryStore for MemoryStore {
    fn load(&self) -> Result<Option<String>> {
        Ok(self.slot.read().clone())
    }

    fn save(&self, payload: &str) -> Result<()> {
        *self.slot.write() = Some(payload.to_string());
        Ok(())
    }
}

type Registry = HashMap<String, Timeline>;

/// Process-wide timeline registry. Constructed once at startup and
/// injected into the service and the monitor; clones share state.
#[derive(Clone)]
pub struct TimelineRepository {
    inner: Arc<RwLock<Registry>>,
    store: Arc<dyn RegistryStore>,
}

impl TimelineRepository {
    /// Loads the registry from the store. Absence yields an empty
    /// registry; a corrupt document is logged and discarded rather than
    /// failing startup.
    pub fn open(store: Arc<dyn RegistryStore>) -> Self {
        let registry = match store.load() {
            Ok(Some(payload)) => match parse_registry(&payload) {
                Ok(registry) => registry,
                Err(err) => {
                    warn!(?err, "corrupt registry document, starting empty");
                    Registry::new()
                }
            },
            Ok(None) => Registry::new(),
            Err(err) => {
                warn!(?err, "failed to read registry store, starting empty");
                Registry::new()
            }
        };

        debug!(timelines = registry.len(), "timeline registry loaded");
        Self {
            inner: Arc::new(RwLock::new(registry)),
            store,
        }
    }

    pub fn in_memory() -> Self {
        Self::open(Arc::new(MemoryStore::new()))
    }

    pub fn get(&self, entity_id: &str) -> Option<Timeline> {
        self.inner.read().get(entity_id).cloned()
    }

    pub fn contains(&self, entity_id: &str) -> bool {
        self.inner.read().contains_key(entity_id)
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Upserts a timeline and persists the registry.
    pub fn put(&self, timeline: Timeline) -> Result<()> {
        {
            let mut inner = self.inner.write();
            inner.insert(timeline.entity_id.clone(), timeline);
        }
        self.persist()
    }

    /// Removes a timeline; returns whether one existed. Persists only on
    /// an effective removal.
    pub fn remove(&self, entity_id: &str) -> Result<bool> {
        let removed = self.inner.write().remove(entity_id).is_some();
        if removed {
            self.persist()?;
        }
        Ok(removed)
    }

    /// Read access to the whole registry.
    pub fn with_registry<T>(&self, f: impl FnOnce(&Registry) -> T) -> T {
        f(&self.inner.read())
    }

    /// Write access to the whole registry without persisting; callers
    /// decide when to batch a `persist`.
    pub fn mutate<T>(&self, f: impl FnOnce(&mut Registry) -> T) -> T {
        f(&mut self.inner.write())
    }

    /// Mutates one timeline and persists, failing when the entity has no
    /// timeline. The closure must not mutate before deciding to fail.
    pub fn update<T>(
        &self,
        entity_id: &str,
        f: impl FnOnce(&mut Timeline) -> Result<T>,
    ) -> Result<T> {
        let value = {
            let mut inner = self.inner.write();
            let timeline = inner
                .get_mut(entity_id)
                .ok_or_else(|| TimelineError::TimelineNotFound(entity_id.to_string()))?;
            let value = f(timeline)?;
            timeline.touch();
            value
        };
        self.persist()?;
        Ok(value)
    }

    /// Ordered snapshot of the registry, the persisted wire shape.
    pub fn snapshot(&self) -> Vec<(String, Timeline)> {
        let inner = self.inner.read();
        let mut pairs: Vec<(String, Timeline)> = inner
            .iter()
            .map(|(id, timeline)| (id.clone(), timeline.clone()))
            .collect();
        pairs.sort_by(|a, b| a.0.cmp(&b.0));
        pairs
    }

    /// Replaces the registry wholesale (import) and persists.
    pub fn replace_all(&self, registry: Registry) -> Result<()> {
        *self.inner.write() = registry;
        self.persist()
    }

    /// Writes the current registry to the backing store as one document.
    pub fn persist(&self) -> Result<()> {
        let payload = serde_json::to_string(&self.snapshot())?;
        self.store.save(&payload)
    }
}

fn parse_registry(payload: &str) -> Result<Registry> {
    let pairs: Vec<(String, Timeline)> = serde_json::from_str(payload)?;
    Ok(pairs.into_iter().collect())
}
