//! Ordered queue of items with persistence and aggregate run status.
//!
//! Two locks guard the store: `run` (aggregate status, cursor) and
//! `items` (the ordered list). When both are needed, `run` is taken
//! first. A third lock, `save_lock`, serializes writes of the queue file
//! and is never held while taking `run`.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::actions::Action;
use crate::persistence::{self, PersistenceError, PersistenceResult};

use super::errors::{QueueError, QueueResult};
use super::events::{Observers, QueueEvent, QueueObserver, SubscriptionId};
use super::item::{ItemObserver, QueueItem};
use super::types::{AttributeValue, ItemStatus, QueueStatus};

#[derive(Debug, Default)]
struct RunState {
    status: QueueStatus,
    /// Index of the next item to consider. Items before it were visited
    /// during the current run.
    cursor: usize,
    had_failures: bool,
    /// Incremented by every `begin_run`; a worker only advances its own run.
    generation: u64,
}

impl RunState {
    fn adjust_for_insert(&mut self, index: usize) {
        if index < self.cursor {
            self.cursor += 1;
        }
    }

    fn adjust_for_remove(&mut self, index: usize) {
        if index < self.cursor {
            self.cursor -= 1;
        }
    }

    /// Settle the aggregate status at the end of a run.
    fn finish(&mut self) -> bool {
        self.status = if self.had_failures {
            QueueStatus::Failed
        } else {
            QueueStatus::Completed
        };
        self.had_failures
    }
}

/// What the worker should do next.
#[derive(Debug)]
pub(crate) enum NextItem {
    /// Process this item.
    Item(Arc<QueueItem>),
    /// No Ready item remains; the run is over.
    Finished { had_failures: bool },
    /// The run was stopped or never started.
    Idle,
}

/// The durable work queue.
pub struct QueueStore {
    items: RwLock<Vec<Arc<QueueItem>>>,
    run: Mutex<RunState>,
    /// Queue file, `None` for in-memory stores.
    path: Option<PathBuf>,
    /// Held from snapshot to rename so saves land in order.
    save_lock: Mutex<()>,
    observers: Observers,
}

impl QueueStore {
    /// Open the queue persisted at `path`.
    ///
    /// A missing file gives an empty queue. A corrupt or unreadable file
    /// is logged and also gives an empty queue.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let items = match persistence::load_queue(&path) {
            Ok(snapshots) => {
                tracing::info!("Loaded {} items from {}", snapshots.len(), path.display());
                snapshots
                    .into_iter()
                    .map(|s| Arc::new(QueueItem::restore(s)))
                    .collect()
            }
            Err(PersistenceError::Io(e)) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                tracing::warn!("Failed to load queue {}: {}", path.display(), e);
                Vec::new()
            }
        };

        Self {
            items: RwLock::new(items),
            run: Mutex::new(RunState::default()),
            path: Some(path),
            save_lock: Mutex::new(()),
            observers: Observers::default(),
        }
    }

    /// Create a queue without persistence (for testing).
    pub fn in_memory() -> Self {
        Self {
            items: RwLock::new(Vec::new()),
            run: Mutex::new(RunState::default()),
            path: None,
            save_lock: Mutex::new(()),
            observers: Observers::default(),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Persist queue to disk.
    pub fn save(&self) -> PersistenceResult<()> {
        let Some(ref path) = self.path else {
            return Ok(());
        };
        let _guard = self.save_lock.lock();
        let snapshots: Vec<_> = self.items.read().iter().map(|i| i.snapshot()).collect();
        persistence::save_queue(path, &snapshots)?;
        tracing::debug!("Saved {} items to {}", snapshots.len(), path.display());
        Ok(())
    }

    /// Save, logging failures instead of returning them.
    fn persist(&self) {
        if let Err(e) = self.save() {
            tracing::warn!("Failed to save queue: {}", e);
        }
    }

    fn emit(&self, event: QueueEvent) {
        self.observers.emit(&event);
    }

    pub fn subscribe(&self, observer: QueueObserver) -> SubscriptionId {
        self.observers.subscribe(observer)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    // ---- Accessors ----

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    /// Number of items waiting to run.
    pub fn ready_count(&self) -> usize {
        self.items
            .read()
            .iter()
            .filter(|i| i.status() == ItemStatus::Ready)
            .count()
    }

    /// Aggregate status of the last or current run.
    pub fn status(&self) -> QueueStatus {
        self.run.lock().status
    }

    pub fn items(&self) -> Vec<Arc<QueueItem>> {
        self.items.read().clone()
    }

    pub fn item_at(&self, index: usize) -> Option<Arc<QueueItem>> {
        self.items.read().get(index).cloned()
    }

    pub fn get(&self, id: &str) -> Option<Arc<QueueItem>> {
        self.items.read().iter().find(|i| i.id() == id).cloned()
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.items.read().iter().position(|i| i.id() == id)
    }

    pub fn indexes_with_status(&self, status: ItemStatus) -> Vec<usize> {
        self.items
            .read()
            .iter()
            .enumerate()
            .filter(|(_, i)| i.status() == status)
            .map(|(index, _)| index)
            .collect()
    }

    // ---- Structural edits ----

    /// Add an item at the end of the queue.
    ///
    /// Allowed while a run is in progress; the worker picks it up before
    /// ending the run.
    pub fn append(&self, item: QueueItem) -> Arc<QueueItem> {
        let item = Arc::new(item);
        let index = {
            let _run = self.run.lock();
            let mut items = self.items.write();
            items.push(item.clone());
            items.len() - 1
        };
        self.persist();
        self.emit(QueueEvent::ItemAdded {
            id: item.id().to_string(),
            index,
        });
        item
    }

    /// Insert an item at `index` (`index == len` appends).
    pub fn insert(&self, index: usize, item: QueueItem) -> QueueResult<Arc<QueueItem>> {
        let item = Arc::new(item);
        {
            let mut run = self.run.lock();
            let mut items = self.items.write();
            if index > items.len() {
                return Err(QueueError::IndexOutOfBounds {
                    index,
                    len: items.len(),
                });
            }
            items.insert(index, item.clone());
            run.adjust_for_insert(index);
        }
        self.persist();
        self.emit(QueueEvent::ItemAdded {
            id: item.id().to_string(),
            index,
        });
        Ok(item)
    }

    /// Remove the item at `index`. A working item can't be removed.
    pub fn remove_at(&self, index: usize) -> QueueResult<Arc<QueueItem>> {
        let removed = {
            let mut run = self.run.lock();
            let mut items = self.items.write();
            let len = items.len();
            let item = items
                .get(index)
                .ok_or(QueueError::IndexOutOfBounds { index, len })?;
            if item.status() == ItemStatus::Working {
                return Err(QueueError::NotEditable {
                    status: ItemStatus::Working,
                });
            }
            run.adjust_for_remove(index);
            items.remove(index)
        };
        self.persist();
        self.emit(QueueEvent::ItemRemoved {
            id: removed.id().to_string(),
        });
        Ok(removed)
    }

    pub fn remove_id(&self, id: &str) -> QueueResult<Arc<QueueItem>> {
        let index = self
            .index_of(id)
            .ok_or_else(|| QueueError::NotFound(id.to_string()))?;
        self.remove_at(index)
    }

    /// Remove every Completed item. Returns how many were removed.
    pub fn remove_completed(&self) -> usize {
        let removed: Vec<Arc<QueueItem>> = {
            let mut run = self.run.lock();
            let mut items = self.items.write();
            let mut removed = Vec::new();
            let mut index = 0;
            while index < items.len() {
                if items[index].status() == ItemStatus::Completed {
                    run.adjust_for_remove(index);
                    removed.push(items.remove(index));
                } else {
                    index += 1;
                }
            }
            removed
        };
        if removed.is_empty() {
            return 0;
        }
        self.persist();
        for item in &removed {
            self.emit(QueueEvent::ItemRemoved {
                id: item.id().to_string(),
            });
        }
        removed.len()
    }

    /// Move the item at `from` so it ends up at `to`.
    pub fn move_item(&self, from: usize, to: usize) -> QueueResult<()> {
        {
            let mut run = self.run.lock();
            let mut items = self.items.write();
            let len = items.len();
            for index in [from, to] {
                if index >= len {
                    return Err(QueueError::IndexOutOfBounds { index, len });
                }
            }
            if from == to {
                return Ok(());
            }
            let item = items.remove(from);
            run.adjust_for_remove(from);
            let ready = item.status() == ItemStatus::Ready;
            items.insert(to, item);
            run.adjust_for_insert(to);
            // A Ready item moved behind the cursor must still run.
            if ready && to < run.cursor {
                run.cursor = to;
            }
        }
        self.persist();
        Ok(())
    }

    pub fn swap(&self, a: usize, b: usize) -> QueueResult<()> {
        {
            let mut run = self.run.lock();
            let mut items = self.items.write();
            let len = items.len();
            for index in [a, b] {
                if index >= len {
                    return Err(QueueError::IndexOutOfBounds { index, len });
                }
            }
            if a == b {
                return Ok(());
            }
            items.swap(a, b);
            let low = a.min(b);
            if low < run.cursor && items[low].status() == ItemStatus::Ready {
                run.cursor = low;
            }
        }
        self.persist();
        Ok(())
    }

    // ---- Item edits ----

    fn item_or_not_found(&self, id: &str) -> QueueResult<Arc<QueueItem>> {
        self.get(id)
            .ok_or_else(|| QueueError::NotFound(id.to_string()))
    }

    pub fn add_action(&self, id: &str, action: Action) -> QueueResult<()> {
        self.item_or_not_found(id)?.add_action(action)?;
        self.persist();
        Ok(())
    }

    pub fn remove_action(&self, id: &str, index: usize) -> QueueResult<Action> {
        let action = self.item_or_not_found(id)?.remove_action(index)?;
        self.persist();
        Ok(action)
    }

    pub fn set_destination(&self, id: &str, destination: impl Into<PathBuf>) -> QueueResult<()> {
        self.item_or_not_found(id)?.set_destination(destination)?;
        self.persist();
        Ok(())
    }

    pub fn set_attribute(
        &self,
        id: &str,
        key: impl Into<String>,
        value: AttributeValue,
    ) -> QueueResult<()> {
        self.item_or_not_found(id)?.set_attribute(key, value)?;
        self.persist();
        Ok(())
    }

    /// Move an item between Ready and Editing.
    pub fn set_editing(&self, id: &str, editing: bool) -> QueueResult<()> {
        let item = self.item_or_not_found(id)?;
        let before = item.status();
        item.set_editing(editing)?;
        let after = item.status();
        if before != after {
            self.persist();
            self.emit(QueueEvent::ItemStatusChanged {
                id: id.to_string(),
                status: after,
            });
        }
        Ok(())
    }

    /// Return a terminal item to Ready.
    pub fn reset_item(&self, id: &str) -> QueueResult<bool> {
        let changed = self.item_or_not_found(id)?.reset()?;
        if changed {
            self.persist();
            self.emit(QueueEvent::ItemStatusChanged {
                id: id.to_string(),
                status: ItemStatus::Ready,
            });
        }
        Ok(changed)
    }

    // ---- Run state (driven by the runner) ----

    /// Mark a run as started and return its generation, or `None` if one
    /// is already running.
    pub(crate) fn begin_run(&self) -> Option<u64> {
        let generation = {
            let mut run = self.run.lock();
            if run.status == QueueStatus::Working {
                return None;
            }
            let items = self.items.read();
            run.status = QueueStatus::Working;
            run.had_failures = false;
            run.generation += 1;
            run.cursor = items
                .iter()
                .position(|i| i.status() == ItemStatus::Ready)
                .unwrap_or(items.len());
            run.generation
        };
        self.emit(QueueEvent::RunStarted);
        Some(generation)
    }

    /// Claim the next Ready item, or end the run if none remain.
    ///
    /// The check and the end of the run happen under both locks, so an
    /// item appended concurrently is either seen here or arrives after
    /// the run is over.
    ///
    /// The claimed item moves to Working before the locks are released,
    /// so it can no longer be removed or edited. A caller from an earlier
    /// run gets `Idle`.
    pub(crate) fn next_item(&self, generation: u64) -> NextItem {
        let claimed = {
            let mut run = self.run.lock();
            if run.status != QueueStatus::Working || run.generation != generation {
                return NextItem::Idle;
            }
            let items = self.items.read();
            let mut claimed = None;
            while run.cursor < items.len() {
                let item = &items[run.cursor];
                run.cursor += 1;
                if item.status() == ItemStatus::Ready
                    && item.transition(ItemStatus::Working).is_ok()
                {
                    claimed = Some(Arc::clone(item));
                    break;
                }
            }
            match claimed {
                Some(item) => Ok(item),
                None => Err(run.finish()),
            }
        };

        match claimed {
            Ok(item) => {
                self.persist();
                self.emit(QueueEvent::ItemStatusChanged {
                    id: item.id().to_string(),
                    status: ItemStatus::Working,
                });
                NextItem::Item(item)
            }
            Err(had_failures) => {
                self.emit(QueueEvent::RunCompleted { had_failures });
                NextItem::Finished { had_failures }
            }
        }
    }

    /// End the current run before the queue is exhausted.
    ///
    /// Remaining Ready items stay Ready. Returns `None` if not running.
    pub(crate) fn finish_run(&self) -> Option<bool> {
        let had_failures = {
            let mut run = self.run.lock();
            if run.status != QueueStatus::Working {
                return None;
            }
            run.finish()
        };
        self.emit(QueueEvent::RunCompleted { had_failures });
        Some(had_failures)
    }

    /// Mark the current run as cancelled. Returns `false` if not running.
    pub(crate) fn cancel_run(&self) -> bool {
        {
            let mut run = self.run.lock();
            if run.status != QueueStatus::Working {
                return false;
            }
            run.status = QueueStatus::Cancelled;
        }
        self.emit(QueueEvent::RunCancelled);
        true
    }
}

impl ItemObserver for QueueStore {
    fn status_changed(&self, item: &QueueItem, status: ItemStatus) {
        if status == ItemStatus::Failed {
            self.run.lock().had_failures = true;
        }
        self.persist();
        self.emit(QueueEvent::ItemStatusChanged {
            id: item.id().to_string(),
            status,
        });
    }

    fn step_changed(&self, item: &QueueItem, description: &str) {
        self.emit(QueueEvent::ItemProgress {
            id: item.id().to_string(),
            description: description.to_string(),
        });
    }
}

impl std::fmt::Debug for QueueStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueueStore")
            .field("path", &self.path)
            .field("len", &self.len())
            .field("status", &self.status())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::{ClearTrackNames, SetLanguage};
    use tempfile::tempdir;

    fn item(name: &str) -> QueueItem {
        QueueItem::new(format!("/media/{}.mkv", name)).with_destination(format!("/out/{}.mp4", name))
    }

    fn ids(store: &QueueStore) -> Vec<String> {
        store.items().iter().map(|i| i.display_name()).collect()
    }

    #[test]
    fn add_remove_and_move() {
        let store = QueueStore::in_memory();
        store.append(item("a"));
        store.append(item("b"));
        store.append(item("c"));
        assert_eq!(store.len(), 3);

        store.move_item(0, 2).unwrap();
        assert_eq!(ids(&store), vec!["b.mkv", "c.mkv", "a.mkv"]);

        store.swap(0, 1).unwrap();
        assert_eq!(ids(&store), vec!["c.mkv", "b.mkv", "a.mkv"]);

        let removed = store.remove_at(1).unwrap();
        assert_eq!(removed.display_name(), "b.mkv");
        assert_eq!(store.index_of(removed.id()), None);

        assert!(matches!(
            store.remove_at(5),
            Err(QueueError::IndexOutOfBounds { index: 5, len: 2 })
        ));
        assert!(matches!(store.remove_id("nope"), Err(QueueError::NotFound(_))));
    }

    #[test]
    fn insert_and_status_queries() {
        let store = QueueStore::in_memory();
        store.append(item("a"));
        let b = store.insert(0, item("b")).unwrap();
        assert_eq!(store.index_of(b.id()), Some(0));
        assert!(store.insert(9, item("c")).is_err());

        store.set_editing(b.id(), true).unwrap();
        assert_eq!(store.ready_count(), 1);
        assert_eq!(store.indexes_with_status(ItemStatus::Editing), vec![0]);
        assert_eq!(store.status(), QueueStatus::Unknown);
    }

    #[test]
    fn events_are_emitted() {
        let store = QueueStore::in_memory();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        store.subscribe(Arc::new(move |e: &QueueEvent| sink.lock().push(e.clone())));

        let added = store.append(item("a"));
        store.remove_id(added.id()).unwrap();

        let events = seen.lock().clone();
        assert_eq!(
            events,
            vec![
                QueueEvent::ItemAdded {
                    id: added.id().to_string(),
                    index: 0
                },
                QueueEvent::ItemRemoved {
                    id: added.id().to_string()
                },
            ]
        );
    }

    #[test]
    fn actions_edited_by_id() {
        let store = QueueStore::in_memory();
        let a = store.append(item("a"));
        store
            .add_action(a.id(), Action::SetLanguage(SetLanguage::new("eng")))
            .unwrap();
        store
            .add_action(a.id(), Action::ClearTrackNames(ClearTrackNames))
            .unwrap();
        let removed = store.remove_action(a.id(), 0).unwrap();
        assert_eq!(removed.name(), "SetLanguage");
        assert_eq!(a.actions().len(), 1);
    }

    #[test]
    fn run_visits_ready_items_in_order_and_sees_appends() {
        let store = QueueStore::in_memory();
        let a = store.append(item("a"));
        let b = store.append(item("b"));
        b.set_editing(true).unwrap();

        let run = store.begin_run().unwrap();
        assert!(store.begin_run().is_none());
        assert_eq!(store.status(), QueueStatus::Working);

        let NextItem::Item(first) = store.next_item(run) else {
            panic!("expected an item");
        };
        assert_eq!(first.id(), a.id());

        // Appended while working: still picked up.
        let c = store.append(item("c"));
        let NextItem::Item(second) = store.next_item(run) else {
            panic!("expected appended item");
        };
        assert_eq!(second.id(), c.id());

        assert!(matches!(
            store.next_item(run),
            NextItem::Finished {
                had_failures: false
            }
        ));
        assert_eq!(store.status(), QueueStatus::Completed);
        assert!(matches!(store.next_item(run), NextItem::Idle));
    }

    #[test]
    fn remove_before_cursor_keeps_position() {
        let store = QueueStore::in_memory();
        let a = store.append(item("a"));
        let b = store.append(item("b"));
        let run = store.begin_run().unwrap();
        let NextItem::Item(first) = store.next_item(run) else {
            panic!("expected an item");
        };
        first.transition(ItemStatus::Completed).unwrap();
        store.remove_id(a.id()).unwrap();
        let NextItem::Item(next) = store.next_item(run) else {
            panic!("expected b");
        };
        assert_eq!(next.id(), b.id());
    }

    #[test]
    fn claimed_item_cannot_be_removed_or_edited() {
        let store = QueueStore::in_memory();
        let a = store.append(item("a"));
        store.append(item("b"));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        store.subscribe(Arc::new(move |e: &QueueEvent| sink.lock().push(e.clone())));

        let run = store.begin_run().unwrap();
        let NextItem::Item(claimed) = store.next_item(run) else {
            panic!("expected an item");
        };
        assert_eq!(claimed.id(), a.id());
        assert_eq!(claimed.status(), ItemStatus::Working);
        assert!(seen.lock().contains(&QueueEvent::ItemStatusChanged {
            id: a.id().to_string(),
            status: ItemStatus::Working,
        }));

        assert!(matches!(
            store.remove_at(0),
            Err(QueueError::NotEditable {
                status: ItemStatus::Working
            })
        ));
        assert!(store.remove_id(a.id()).is_err());
        assert!(store.set_editing(a.id(), true).is_err());
        assert!(store
            .add_action(a.id(), Action::ClearTrackNames(ClearTrackNames))
            .is_err());
        assert!(store.set_destination(a.id(), "/out/other.mp4").is_err());
        assert_eq!(store.len(), 2);
        assert_eq!(claimed.destination(), Some(PathBuf::from("/out/a.mp4")));
    }

    #[test]
    fn cancel_run_sets_status() {
        let store = QueueStore::in_memory();
        assert!(!store.cancel_run());
        store.begin_run();
        assert!(store.cancel_run());
        assert_eq!(store.status(), QueueStatus::Cancelled);
    }

    #[test]
    fn stale_run_gets_no_items() {
        let store = QueueStore::in_memory();
        let a = store.append(item("a"));
        let old = store.begin_run().unwrap();
        store.cancel_run();
        let current = store.begin_run().unwrap();
        assert_ne!(old, current);

        assert!(matches!(store.next_item(old), NextItem::Idle));
        assert_eq!(a.status(), ItemStatus::Ready);
        let NextItem::Item(claimed) = store.next_item(current) else {
            panic!("expected an item");
        };
        assert_eq!(claimed.id(), a.id());
    }

    #[test]
    fn persists_every_mutation() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("queue.mtq");

        let store = QueueStore::open(&path);
        assert!(store.is_empty());
        let a = store.append(item("a"));
        store
            .add_action(a.id(), Action::SetLanguage(SetLanguage::new("eng")))
            .unwrap();
        assert!(path.exists());

        let reopened = QueueStore::open(&path);
        assert_eq!(reopened.len(), 1);
        let restored = reopened.item_at(0).unwrap();
        assert_eq!(restored.id(), a.id());
        assert_eq!(restored.actions(), a.actions());
    }

    #[test]
    fn destination_and_attribute_edits_are_persisted() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("queue.mtq");

        let store = QueueStore::open(&path);
        let a = store.append(item("a"));
        store.set_destination(a.id(), "/elsewhere/a.m4v").unwrap();
        store
            .set_attribute(a.id(), "optimize", AttributeValue::Bool(true))
            .unwrap();
        assert!(matches!(
            store.set_destination("nope", "/x.mp4"),
            Err(QueueError::NotFound(_))
        ));

        let reopened = QueueStore::open(&path);
        let restored = reopened.item_at(0).unwrap();
        assert_eq!(restored.destination(), Some(PathBuf::from("/elsewhere/a.m4v")));
        assert_eq!(
            restored.attribute("optimize"),
            Some(AttributeValue::Bool(true))
        );
    }

    #[test]
    fn in_memory_items_reload_as_path_backed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("queue.mtq");

        let store = QueueStore::open(&path);
        let a = store.append(
            QueueItem::with_file("/unsaved/new.mp4", crate::models::MediaFile::new())
                .with_destination("/out/new.mp4")
                .with_action(Action::ClearTrackNames(ClearTrackNames)),
        );
        assert!(a.is_prepared());

        let reopened = QueueStore::open(&path);
        let restored = reopened.item_at(0).unwrap();
        assert_eq!(restored.source(), PathBuf::from("/unsaved/new.mp4"));
        assert_eq!(restored.actions(), a.actions());
        assert_eq!(restored.status(), ItemStatus::Ready);
        assert!(!restored.is_prepared());
    }

    #[test]
    fn concurrent_saves_all_succeed_and_keep_the_latest_queue() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("queue.mtq");
        let store = Arc::new(QueueStore::open(&path));

        let workers: Vec<_> = (0..4)
            .map(|t| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    let mut failures = 0;
                    for n in 0..25 {
                        store.append(item(&format!("t{}-{}", t, n)));
                        if store.save().is_err() {
                            failures += 1;
                        }
                    }
                    failures
                })
            })
            .collect();
        let failures: usize = workers.into_iter().map(|w| w.join().unwrap()).sum();
        assert_eq!(failures, 0);

        store.save().unwrap();
        let reopened = QueueStore::open(&path);
        assert_eq!(reopened.len(), 100);
        assert_eq!(ids(&reopened), ids(&store));
        assert!(!path.with_extension("mtq.tmp").exists());
    }

    #[test]
    fn corrupt_queue_file_opens_empty() {
        crate::logging::init_test_tracing();
        let dir = tempdir().unwrap();
        let path = dir.path().join("queue.mtq");
        std::fs::write(&path, b"not a queue").unwrap();

        let store = QueueStore::open(&path);
        assert!(store.is_empty());
    }
}
