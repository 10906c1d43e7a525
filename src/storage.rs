use crate::models::{Day, Task, TaskId, TaskPatch};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Fixed name of the local store. The file lives at `<dir>/FrogHopDB.json`.
pub const STORE_NAME: &str = "FrogHopDB";
/// Schema version written by this build. Older documents are read as-is;
/// fields added later must be defaulted so existing records survive.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("task description is empty")]
    Validation,
    #[error("task {0} not found")]
    NotFound(TaskId),
    #[error("store unavailable at {path}: {source}")]
    Unavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("store file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("store file {path} contains task id {id} more than once")]
    DuplicateId { path: PathBuf, id: TaskId },
    #[error("store schema version {found} is newer than supported version {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },
}

impl StoreError {
    fn unavailable(path: &Path, source: io::Error) -> Self {
        StoreError::Unavailable {
            path: path.to_path_buf(),
            source,
        }
    }
}

pub fn store_path(dir: &Path) -> PathBuf {
    dir.join(format!("{STORE_NAME}.json"))
}

/// Fields this build does not know about. Kept verbatim across rewrites.
type Extra = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
struct StoreDocument {
    version: u32,
    next_id: TaskId,
    tasks: Vec<StoredTask>,
    #[serde(flatten)]
    extra: Extra,
}

impl Default for StoreDocument {
    fn default() -> Self {
        Self {
            version: SCHEMA_VERSION,
            next_id: 1,
            tasks: Vec::new(),
            extra: Extra::new(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredTask {
    #[serde(flatten)]
    task: Task,
    #[serde(flatten)]
    extra: Extra,
}

/// In-memory image of the store: records keyed by id plus the day index.
#[derive(Debug, Clone)]
struct Tables {
    next_id: TaskId,
    tasks: BTreeMap<TaskId, Task>,
    by_day: HashMap<Day, BTreeSet<TaskId>>,
    task_extra: HashMap<TaskId, Extra>,
    extra: Extra,
}

impl Default for Tables {
    fn default() -> Self {
        Self {
            next_id: 1,
            tasks: BTreeMap::new(),
            by_day: HashMap::new(),
            task_extra: HashMap::new(),
            extra: Extra::new(),
        }
    }
}

impl Tables {
    fn insert(&mut self, task: Task) {
        self.by_day.entry(task.day).or_default().insert(task.id);
        self.tasks.insert(task.id, task);
    }

    /// Unindexes the record; its unknown fields stay until `forget`.
    fn remove(&mut self, id: TaskId) -> Option<Task> {
        let task = self.tasks.remove(&id)?;
        if let Some(ids) = self.by_day.get_mut(&task.day) {
            ids.remove(&id);
        }
        Some(task)
    }

    fn forget(&mut self, id: TaskId) -> Option<Task> {
        self.task_extra.remove(&id);
        self.remove(id)
    }

    fn list_by_day(&self, day: Day) -> Vec<Task> {
        self.by_day
            .get(&day)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| self.tasks.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn to_document(&self) -> StoreDocument {
        StoreDocument {
            version: SCHEMA_VERSION,
            next_id: self.next_id,
            tasks: self
                .tasks
                .values()
                .map(|task| StoredTask {
                    task: task.clone(),
                    extra: self.task_extra.get(&task.id).cloned().unwrap_or_default(),
                })
                .collect(),
            extra: self.extra.clone(),
        }
    }

    fn from_document(path: &Path, doc: StoreDocument) -> Result<Self, StoreError> {
        if doc.version > SCHEMA_VERSION {
            return Err(StoreError::UnsupportedVersion {
                found: doc.version,
                supported: SCHEMA_VERSION,
            });
        }

        let mut tables = Tables {
            extra: doc.extra,
            ..Tables::default()
        };
        for StoredTask { task, extra } in doc.tasks {
            if tables.tasks.contains_key(&task.id) {
                return Err(StoreError::DuplicateId {
                    path: path.to_path_buf(),
                    id: task.id,
                });
            }
            if !extra.is_empty() {
                tables.task_extra.insert(task.id, extra);
            }
            tables.insert(task);
        }

        // Hand-edited files may lag behind the highest id in use.
        let floor = tables.tasks.keys().next_back().map_or(1, |id| id + 1);
        tables.next_id = doc.next_id.max(floor);
        Ok(tables)
    }
}

struct Listener {
    day: Day,
    sender: Sender<Vec<Task>>,
}

/// Receiving end of a day subscription. Each committed mutation touching
/// the day delivers the full, current task list for it.
pub struct LiveQuery {
    day: Day,
    receiver: Receiver<Vec<Task>>,
}

impl LiveQuery {
    pub fn day(&self) -> Day {
        self.day
    }

    /// Drains pending deliveries and returns the newest one, if any.
    pub fn latest(&self) -> Option<Vec<Task>> {
        let mut latest = None;
        loop {
            match self.receiver.try_recv() {
                Ok(tasks) => latest = Some(tasks),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        latest
    }
}

pub struct TaskStore {
    path: PathBuf,
    tables: Tables,
    listeners: Vec<Listener>,
    revision: u64,
}

impl TaskStore {
    /// Opens (or creates) the store inside `dir`.
    pub fn open(dir: &Path) -> Result<Self, StoreError> {
        fs::create_dir_all(dir).map_err(|e| StoreError::unavailable(dir, e))?;
        Self::open_at(&store_path(dir))
    }

    #[tracing::instrument(skip(path), fields(path = %path.display()))]
    pub fn open_at(path: &Path) -> Result<Self, StoreError> {
        let tables = if path.exists() {
            let content = fs::read_to_string(path).map_err(|e| StoreError::unavailable(path, e))?;
            if content.trim().is_empty() {
                Tables::default()
            } else {
                let doc: StoreDocument =
                    serde_json::from_str(&content).map_err(|source| StoreError::Corrupt {
                        path: path.to_path_buf(),
                        source,
                    })?;
                Tables::from_document(path, doc)?
            }
        } else {
            let tables = Tables::default();
            write_document(path, &tables.to_document())?;
            tables
        };

        info!(
            tasks = tables.tasks.len(),
            next_id = tables.next_id,
            "opened task store"
        );

        Ok(Self {
            path: path.to_path_buf(),
            tables,
            listeners: Vec::new(),
            revision: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of committed mutations since the store was opened.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn get(&self, id: TaskId) -> Option<Task> {
        self.tables.tasks.get(&id).cloned()
    }

    pub fn list_by_day(&self, day: Day) -> Vec<Task> {
        self.tables.list_by_day(day)
    }

    /// Registers a listener for `day` and delivers the current result to it.
    pub fn subscribe(&mut self, day: Day) -> LiveQuery {
        let (sender, receiver) = mpsc::channel();
        let _ = sender.send(self.tables.list_by_day(day));
        self.listeners.push(Listener { day, sender });
        debug!(%day, listeners = self.listeners.len(), "subscribed");
        LiveQuery { day, receiver }
    }

    #[tracing::instrument(skip(self, description))]
    pub fn add(&mut self, description: &str, day: Day) -> Result<Task, StoreError> {
        let description = description.trim();
        if description.is_empty() {
            return Err(StoreError::Validation);
        }

        let mut next = self.tables.clone();
        let task = Task {
            id: next.next_id,
            description: description.to_string(),
            day,
            is_completed: false,
        };
        next.next_id += 1;
        next.insert(task.clone());

        self.commit(next, &[day])?;
        debug!(id = task.id, "added task");
        Ok(task)
    }

    #[tracing::instrument(skip(self))]
    pub fn update(&mut self, id: TaskId, patch: TaskPatch) -> Result<Task, StoreError> {
        let mut next = self.tables.clone();
        let mut task = next.remove(id).ok_or(StoreError::NotFound(id))?;
        let old_day = task.day;

        if let Some(description) = patch.description {
            let description = description.trim();
            if description.is_empty() {
                return Err(StoreError::Validation);
            }
            task.description = description.to_string();
        }
        if let Some(day) = patch.day {
            task.day = day;
        }
        if let Some(is_completed) = patch.is_completed {
            task.is_completed = is_completed;
        }

        let new_day = task.day;
        next.insert(task.clone());

        if old_day == new_day {
            self.commit(next, &[old_day])?;
        } else {
            self.commit(next, &[old_day, new_day])?;
        }
        Ok(task)
    }

    #[tracing::instrument(skip(self))]
    pub fn delete(&mut self, id: TaskId) -> Result<Task, StoreError> {
        let mut next = self.tables.clone();
        let task = next.forget(id).ok_or(StoreError::NotFound(id))?;
        self.commit(next, &[task.day])?;
        debug!("deleted task");
        Ok(task)
    }

    /// Persists `next`, swaps it in, then notifies listeners of `days`.
    /// On a failed write nothing changes in memory and nobody is notified.
    fn commit(&mut self, next: Tables, days: &[Day]) -> Result<(), StoreError> {
        if let Err(err) = write_document(&self.path, &next.to_document()) {
            warn!(error = %err, "write failed");
            return Err(err);
        }
        self.tables = next;
        self.revision += 1;
        self.notify(days);
        Ok(())
    }

    fn notify(&mut self, days: &[Day]) {
        let tables = &self.tables;
        let mut snapshots: HashMap<Day, Vec<Task>> = HashMap::new();
        self.listeners.retain(|listener| {
            if !days.contains(&listener.day) {
                return true;
            }
            let snapshot = snapshots
                .entry(listener.day)
                .or_insert_with(|| tables.list_by_day(listener.day));
            listener.sender.send(snapshot.clone()).is_ok()
        });
    }
}

/// Copies `task` onto the following day. The copy starts uncompleted and
/// the source record is not touched.
pub fn duplicate_to_next_day(store: &mut TaskStore, task: &Task) -> Result<Task, StoreError> {
    store.add(&task.description, task.day.next())
}

fn write_document(path: &Path, doc: &StoreDocument) -> Result<(), StoreError> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut temp = NamedTempFile::new_in(dir).map_err(|e| StoreError::unavailable(path, e))?;
    serde_json::to_writer_pretty(&mut temp, doc)
        .map_err(|e| StoreError::unavailable(path, io::Error::from(e)))?;
    temp.write_all(b"\n")
        .and_then(|_| temp.flush())
        .map_err(|e| StoreError::unavailable(path, e))?;
    temp.persist(path)
        .map_err(|e| StoreError::unavailable(path, e.error))?;
    Ok(())
}
