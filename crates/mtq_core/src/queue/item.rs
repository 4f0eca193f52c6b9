//! A single file's unit of work: ordered actions plus a status machine.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;

use crate::actions::{Action, ActionContext, ActionOutcome, ItemWorkspace};
use crate::collaborators::{ContainerLibrary, DiskSpace, WriteOptions};
use crate::models::MediaFile;

use super::cancel::CancelHandle;
use super::errors::{ItemError, ItemResult, PrepareError, QueueError, QueueResult, WriteError};
use super::types::{attributes, AttributeValue, ItemStatus, LARGE_FILE_THRESHOLD};

/// Receives status and progress changes while an item is processed.
pub trait ItemObserver {
    fn status_changed(&self, _item: &QueueItem, _status: ItemStatus) {}
    fn step_changed(&self, _item: &QueueItem, _description: &str) {}
}

/// Observer that ignores everything.
pub struct NoopObserver;

impl ItemObserver for NoopObserver {}

/// Owned copy of an item's persistent fields.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemSnapshot {
    pub id: String,
    pub source: PathBuf,
    pub destination: Option<PathBuf>,
    pub status: ItemStatus,
    pub actions: Vec<Action>,
    pub attributes: BTreeMap<String, AttributeValue>,
    pub error_message: Option<String>,
}

#[derive(Debug)]
struct ItemState {
    source: PathBuf,
    destination: Option<PathBuf>,
    status: ItemStatus,
    actions: Vec<Action>,
    attributes: BTreeMap<String, AttributeValue>,
    current_step: Option<String>,
    error_message: Option<String>,
    failure_log: Vec<String>,
    /// Prepared file, kept pristine; actions work on a copy.
    file: Option<MediaFile>,
    /// Created from an open in-memory file rather than a path.
    in_memory: bool,
}

/// One queued file.
///
/// Shared as `Arc<QueueItem>` between the UI side and the worker; all
/// mutable state sits behind an internal lock.
#[derive(Debug)]
pub struct QueueItem {
    id: String,
    state: RwLock<ItemState>,
    cancel: CancelHandle,
}

impl QueueItem {
    /// Create an item for a file on disk. The destination is unset.
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self::build(uuid::Uuid::new_v4().to_string(), source.into(), None, false)
    }

    /// Create an item from a file that is already open.
    ///
    /// The open file is not persisted. After a reload the item reads
    /// `source` from disk like any other item.
    pub fn with_file(source: impl Into<PathBuf>, file: MediaFile) -> Self {
        Self::build(
            uuid::Uuid::new_v4().to_string(),
            source.into(),
            Some(file),
            true,
        )
    }

    /// Set the destination (builder form).
    pub fn with_destination(self, destination: impl Into<PathBuf>) -> Self {
        self.state.write().destination = Some(destination.into());
        self
    }

    /// Add an action (builder form, before the item is shared).
    pub fn with_action(self, action: Action) -> Self {
        self.state.write().actions.push(action);
        self
    }

    /// Set an attribute (builder form).
    pub fn with_attribute(self, key: impl Into<String>, value: AttributeValue) -> Self {
        self.state.write().attributes.insert(key.into(), value);
        self
    }

    fn build(id: String, source: PathBuf, file: Option<MediaFile>, in_memory: bool) -> Self {
        Self {
            id,
            state: RwLock::new(ItemState {
                source,
                destination: None,
                status: ItemStatus::Ready,
                actions: Vec::new(),
                attributes: BTreeMap::new(),
                current_step: None,
                error_message: None,
                failure_log: Vec::new(),
                file,
                in_memory,
            }),
            cancel: CancelHandle::new(),
        }
    }

    /// Rebuild an item from its persisted fields.
    pub(crate) fn restore(snapshot: ItemSnapshot) -> Self {
        let item = Self::build(snapshot.id, snapshot.source, None, false);
        {
            let mut state = item.state.write();
            state.destination = snapshot.destination;
            state.status = snapshot.status;
            state.actions = snapshot.actions;
            state.attributes = snapshot.attributes;
            state.error_message = snapshot.error_message;
        }
        item
    }

    pub fn snapshot(&self) -> ItemSnapshot {
        let state = self.state.read();
        ItemSnapshot {
            id: self.id.clone(),
            source: state.source.clone(),
            destination: state.destination.clone(),
            status: state.status,
            actions: state.actions.clone(),
            attributes: state.attributes.clone(),
            error_message: state.error_message.clone(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn source(&self) -> PathBuf {
        self.state.read().source.clone()
    }

    pub fn destination(&self) -> Option<PathBuf> {
        self.state.read().destination.clone()
    }

    /// Name shown in lists and used for the item log file.
    pub fn display_name(&self) -> String {
        let state = self.state.read();
        state
            .source
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| state.source.display().to_string())
    }

    pub fn status(&self) -> ItemStatus {
        self.state.read().status
    }

    pub fn actions(&self) -> Vec<Action> {
        self.state.read().actions.clone()
    }

    pub fn attributes(&self) -> BTreeMap<String, AttributeValue> {
        self.state.read().attributes.clone()
    }

    pub fn attribute(&self, key: &str) -> Option<AttributeValue> {
        self.state.read().attributes.get(key).cloned()
    }

    /// Description of the step currently running, if working.
    pub fn current_step(&self) -> Option<String> {
        self.state.read().current_step.clone()
    }

    /// Why the last run failed.
    pub fn error_message(&self) -> Option<String> {
        self.state.read().error_message.clone()
    }

    /// Last log lines of the failed run.
    pub fn failure_log(&self) -> Vec<String> {
        self.state.read().failure_log.clone()
    }

    pub fn is_prepared(&self) -> bool {
        self.state.read().file.is_some()
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Append an action. Only while Ready or Editing.
    pub fn add_action(&self, action: Action) -> QueueResult<()> {
        let mut state = self.state.write();
        if !state.status.is_editable() {
            return Err(QueueError::NotEditable {
                status: state.status,
            });
        }
        state.actions.push(action);
        Ok(())
    }

    /// Remove the action at `index`. Only while Ready or Editing.
    pub fn remove_action(&self, index: usize) -> QueueResult<Action> {
        let mut state = self.state.write();
        if !state.status.is_editable() {
            return Err(QueueError::NotEditable {
                status: state.status,
            });
        }
        let len = state.actions.len();
        if index >= len {
            return Err(QueueError::IndexOutOfBounds { index, len });
        }
        Ok(state.actions.remove(index))
    }

    /// Change the destination. Queued items should go through
    /// [`QueueStore::set_destination`](super::QueueStore::set_destination)
    /// so the change is saved.
    pub fn set_destination(&self, destination: impl Into<PathBuf>) -> QueueResult<()> {
        let mut state = self.state.write();
        if !state.status.is_editable() {
            return Err(QueueError::NotEditable {
                status: state.status,
            });
        }
        state.destination = Some(destination.into());
        Ok(())
    }

    /// Set an attribute. See [`QueueItem::set_destination`] for queued items.
    pub fn set_attribute(&self, key: impl Into<String>, value: AttributeValue) -> QueueResult<()> {
        let mut state = self.state.write();
        if !state.status.is_editable() {
            return Err(QueueError::NotEditable {
                status: state.status,
            });
        }
        state.attributes.insert(key.into(), value);
        Ok(())
    }

    /// Move between Ready and Editing.
    pub fn set_editing(&self, editing: bool) -> QueueResult<()> {
        let to = if editing {
            ItemStatus::Editing
        } else {
            ItemStatus::Ready
        };
        self.transition(to)
    }

    /// Apply a validated status change.
    pub(crate) fn transition(&self, to: ItemStatus) -> QueueResult<()> {
        let mut state = self.state.write();
        if state.status == to {
            return Ok(());
        }
        if !state.status.can_transition_to(to) {
            return Err(QueueError::InvalidTransition {
                from: state.status,
                to,
            });
        }
        state.status = to;
        Ok(())
    }

    /// Return a terminal item to Ready so it can run again.
    ///
    /// Returns `Ok(false)` if the item was already Ready or Editing.
    pub fn reset(&self) -> QueueResult<bool> {
        let mut state = self.state.write();
        match state.status {
            ItemStatus::Ready | ItemStatus::Editing => Ok(false),
            ItemStatus::Working => Err(QueueError::InvalidTransition {
                from: ItemStatus::Working,
                to: ItemStatus::Ready,
            }),
            _ => {
                state.status = ItemStatus::Ready;
                state.error_message = None;
                state.failure_log.clear();
                state.current_step = None;
                if !state.in_memory {
                    state.file = None;
                }
                self.cancel.reset();
                Ok(true)
            }
        }
    }

    /// Request a stop at the next action boundary. No effect once terminal.
    pub fn cancel(&self) {
        if !self.status().is_terminal() {
            self.cancel.cancel();
        }
    }

    /// Load the source into memory if not already done.
    pub fn prepare(&self, container: &dyn ContainerLibrary) -> Result<(), PrepareError> {
        let source = {
            let state = self.state.read();
            if state.file.is_some() {
                return Ok(());
            }
            if state.destination.is_none() {
                return Err(PrepareError::destination_unresolvable(
                    state.source.display().to_string(),
                ));
            }
            state.source.clone()
        };

        let file = container
            .open(&source)
            .map_err(|e| PrepareError::from_container(source.display().to_string(), e))?;

        let on_disk = fs::metadata(&source).map(|m| m.len()).unwrap_or(0);
        let large = on_disk.max(file.data_size) > LARGE_FILE_THRESHOLD;

        let mut state = self.state.write();
        if large {
            state
                .attributes
                .insert(attributes::DATA_64BIT.to_string(), AttributeValue::Bool(true));
        }
        state.file = Some(file);
        Ok(())
    }

    /// Run every action in order and write the result.
    ///
    /// The item must be Ready, or Working after being claimed by the
    /// queue. It ends Completed, Failed or Cancelled. The first action
    /// error aborts the rest of the chain and discards the in-memory
    /// changes. The source file is never written, and a file loaded from
    /// disk is released once the item is done.
    pub fn process(
        &self,
        ctx: &ActionContext<'_>,
        optimize: bool,
        observer: &dyn ItemObserver,
    ) -> ItemResult<()> {
        let (actions, claimed) = {
            let mut state = self.state.write();
            let claimed = match state.status {
                ItemStatus::Ready => false,
                ItemStatus::Working => true,
                status => return Err(ItemError::InvalidState { status }),
            };
            state.status = ItemStatus::Working;
            state.error_message = None;
            state.failure_log.clear();
            state.current_step = None;
            (state.actions.clone(), claimed)
        };
        if !claimed {
            observer.status_changed(self, ItemStatus::Working);
        }
        ctx.logger.info(&format!(
            "Processing {} ({} actions)",
            self.display_name(),
            actions.len()
        ));

        let result = self.run_chain(&actions, ctx, optimize, observer);

        let status = {
            let mut state = self.state.write();
            state.current_step = None;
            let status = match &result {
                Ok((destination, attrs)) => {
                    state.destination = Some(destination.clone());
                    state.attributes = attrs.clone();
                    ItemStatus::Completed
                }
                Err(ItemError::Cancelled) => ItemStatus::Cancelled,
                Err(e) => {
                    state.error_message = Some(e.to_string());
                    state.failure_log = ctx.logger.get_tail();
                    ItemStatus::Failed
                }
            };
            state.status = status;
            if !state.in_memory {
                state.file = None;
            }
            status
        };

        match &result {
            Ok(_) => ctx.logger.success("Item completed"),
            Err(ItemError::Cancelled) => ctx.logger.warn("Item cancelled"),
            Err(e) => ctx.logger.error(&e.to_string()),
        }
        observer.status_changed(self, status);
        result.map(|_| ())
    }

    fn run_chain(
        &self,
        actions: &[Action],
        ctx: &ActionContext<'_>,
        optimize: bool,
        observer: &dyn ItemObserver,
    ) -> ItemResult<(PathBuf, BTreeMap<String, AttributeValue>)> {
        if self.cancel.is_cancelled() {
            return Err(ItemError::Cancelled);
        }

        self.set_step("Loading file", observer);
        ctx.logger.phase("Load");
        self.prepare(ctx.collaborators.container.as_ref())?;

        let (source, mut destination, mut attrs, mut file) = {
            let state = self.state.read();
            let path = state.source.display().to_string();
            let destination = state
                .destination
                .clone()
                .ok_or_else(|| PrepareError::destination_unresolvable(path.as_str()))?;
            let file = state
                .file
                .clone()
                .ok_or_else(|| PrepareError::unreadable(path.as_str(), "file not loaded"))?;
            (state.source.clone(), destination, state.attributes.clone(), file)
        };

        for action in actions {
            if self.cancel.is_cancelled() {
                ctx.logger
                    .warn(&format!("Cancelled before '{}'", action.name()));
                return Err(ItemError::Cancelled);
            }

            self.set_step(&action.working_description(), observer);
            ctx.logger.phase(&action.description());

            let mut workspace = ItemWorkspace {
                source: &source,
                destination: &mut destination,
                attributes: &mut attrs,
                file: &mut file,
            };
            match action.run(&mut workspace, ctx) {
                Ok(ActionOutcome::Applied) => {
                    ctx.logger.success(&format!("{} completed", action.name()));
                }
                Ok(ActionOutcome::Skipped(reason)) => {
                    ctx.logger
                        .info(&format!("{} skipped: {}", action.name(), reason));
                }
                Err(e) => {
                    ctx.logger.error(&format!("{} failed: {}", action.name(), e));
                    return Err(ItemError::action(action.name(), e));
                }
            }
        }

        if self.cancel.is_cancelled() {
            return Err(ItemError::Cancelled);
        }

        self.set_step("Writing", observer);
        ctx.logger.phase("Write");
        let wants_optimize = optimize
            || attrs
                .get(attributes::OPTIMIZE)
                .is_some_and(AttributeValue::as_bool);
        let options = WriteOptions {
            optimize: wants_optimize,
            attributes: attrs.clone(),
        };
        check_free_space(
            ctx.collaborators.disk_space.as_ref(),
            &source,
            &destination,
            file.data_size,
        )?;
        write_result(ctx.collaborators.container.as_ref(), &file, &destination, &options)?;
        ctx.logger
            .info(&format!("Wrote {}", destination.display()));

        Ok((destination, attrs))
    }

    fn set_step(&self, description: &str, observer: &dyn ItemObserver) {
        self.state.write().current_step = Some(description.to_string());
        observer.step_changed(self, description);
    }
}

/// Refuse to write a new file larger than the destination volume's free
/// space. In-place updates and unknown free space are not checked.
fn check_free_space(
    disk_space: &dyn DiskSpace,
    source: &Path,
    destination: &Path,
    needed: u64,
) -> Result<(), WriteError> {
    if source == destination {
        return Ok(());
    }
    let dir = destination
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    match disk_space.available_space(dir) {
        Some(available) if needed > available => Err(WriteError::OutOfDiskSpace {
            path: destination.display().to_string(),
            needed,
            available,
        }),
        Some(_) => Ok(()),
        None => {
            tracing::debug!("Free space unknown for {}, writing anyway", dir.display());
            Ok(())
        }
    }
}

fn write_result(
    container: &dyn ContainerLibrary,
    file: &MediaFile,
    destination: &Path,
    options: &WriteOptions,
) -> Result<(), WriteError> {
    container
        .write(file, destination, options)
        .map_err(|e| WriteError::from_container(destination.display().to_string(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::{ActionError, ClearTrackNames, SetLanguage};
    use crate::models::{MediaKind, Track};
    use crate::test_support::{sample_file, ItemHarness, MemoryContainer};
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Default)]
    struct Recorder {
        statuses: Mutex<Vec<ItemStatus>>,
        steps: Mutex<Vec<String>>,
    }

    impl ItemObserver for Recorder {
        fn status_changed(&self, _item: &QueueItem, status: ItemStatus) {
            self.statuses.lock().push(status);
        }
        fn step_changed(&self, _item: &QueueItem, description: &str) {
            self.steps.lock().push(description.to_string());
        }
    }

    #[test]
    fn actions_frozen_outside_ready_and_editing() {
        let item = QueueItem::new("/media/a.mkv");
        item.add_action(Action::ClearTrackNames(ClearTrackNames)).unwrap();
        item.set_editing(true).unwrap();
        item.add_action(Action::SetLanguage(SetLanguage::new("eng"))).unwrap();
        assert_eq!(item.actions().len(), 2);

        item.set_editing(false).unwrap();
        item.transition(ItemStatus::Working).unwrap();
        assert_eq!(
            item.add_action(Action::ClearTrackNames(ClearTrackNames)),
            Err(QueueError::NotEditable {
                status: ItemStatus::Working
            })
        );
        assert!(item.remove_action(0).is_err());
    }

    #[test]
    fn process_runs_actions_and_writes_destination() {
        let harness = ItemHarness::new();
        harness.container.insert("/media/a.mkv", sample_file());

        let item = QueueItem::new("/media/a.mkv")
            .with_destination("/out/a.mp4")
            .with_action(Action::SetLanguage(SetLanguage::new("fra")));

        let recorder = Recorder::default();
        item.process(&harness.context(), false, &recorder).unwrap();

        assert_eq!(item.status(), ItemStatus::Completed);
        assert_eq!(
            *recorder.statuses.lock(),
            vec![ItemStatus::Working, ItemStatus::Completed]
        );
        assert!(recorder
            .steps
            .lock()
            .contains(&"Setting tracks language to fra".to_string()));

        let written = harness.container.written("/out/a.mp4").unwrap();
        assert!(written.tracks.iter().all(|t| t.language != "und"));
        assert!(harness.container.written("/media/a.mkv").is_none());
        assert!(item.current_step().is_none());
    }

    #[test]
    fn prepare_error_fails_item() {
        let harness = ItemHarness::new();
        let item = QueueItem::new("/media/missing.mkv").with_destination("/out/missing.mp4");

        let err = item.process(&harness.context(), false, &NoopObserver).unwrap_err();
        assert!(matches!(err, ItemError::Prepare(PrepareError::SourceMissing { .. })));
        assert_eq!(item.status(), ItemStatus::Failed);
        assert!(item.error_message().unwrap().contains("missing.mkv"));
    }

    #[test]
    fn missing_destination_is_a_prepare_error() {
        let container = MemoryContainer::default();
        container.insert("/media/a.mkv", sample_file());
        let item = QueueItem::new("/media/a.mkv");
        assert!(matches!(
            item.prepare(&container),
            Err(PrepareError::DestinationUnresolvable { .. })
        ));
    }

    #[test]
    fn action_error_discards_changes_and_skips_write() {
        let harness = ItemHarness::new();
        harness.container.insert("/media/a.mkv", sample_file());
        let item = QueueItem::new("/media/a.mkv")
            .with_destination("/out/a.mp4")
            .with_action(Action::ClearTrackNames(ClearTrackNames))
            .with_action(Action::SetLanguage(SetLanguage::new("nonsense")))
            .with_action(Action::SetLanguage(SetLanguage::new("eng")));

        let err = item.process(&harness.context(), false, &NoopObserver).unwrap_err();
        assert!(matches!(
            err,
            ItemError::Action {
                source: ActionError::PreconditionFailed(_),
                ..
            }
        ));
        assert_eq!(item.status(), ItemStatus::Failed);
        assert!(harness.container.written("/out/a.mp4").is_none());
        assert!(!item.failure_log().is_empty());
    }

    #[test]
    fn write_error_fails_item() {
        let harness = ItemHarness::new();
        harness.container.insert("/media/a.mkv", sample_file());
        harness.container.fail_writes_to("/out/a.mp4");
        let item = QueueItem::new("/media/a.mkv").with_destination("/out/a.mp4");

        let err = item.process(&harness.context(), false, &NoopObserver).unwrap_err();
        assert!(matches!(err, ItemError::Write(_)));
        assert_eq!(item.status(), ItemStatus::Failed);
    }

    #[test]
    fn cancel_is_observed_at_action_boundary() {
        let harness = ItemHarness::new();
        harness.container.insert("/media/a.mkv", sample_file());
        let item = Arc::new(
            QueueItem::new("/media/a.mkv")
                .with_destination("/out/a.mp4")
                .with_action(Action::ClearTrackNames(ClearTrackNames))
                .with_action(Action::SetLanguage(SetLanguage::new("eng"))),
        );

        // Cancel as soon as the first action starts; it still runs to completion.
        struct CancelOnFirstStep(Arc<QueueItem>);
        impl ItemObserver for CancelOnFirstStep {
            fn step_changed(&self, _item: &QueueItem, description: &str) {
                if description == "Clearing tracks names" {
                    self.0.cancel();
                }
            }
        }

        let err = item
            .process(&harness.context(), false, &CancelOnFirstStep(item.clone()))
            .unwrap_err();
        assert!(matches!(err, ItemError::Cancelled));
        assert_eq!(item.status(), ItemStatus::Cancelled);
        assert!(harness.container.written("/out/a.mp4").is_none());

        let log = harness.logger.get_tail().join("\n");
        assert!(log.contains("ClearTrackNames completed"));
        assert!(log.contains("Cancelled before 'SetLanguage'"));
    }

    #[test]
    fn reset_returns_terminal_item_to_ready() {
        let harness = ItemHarness::new();
        let item = QueueItem::new("/media/missing.mkv").with_destination("/out/x.mp4");
        let _ = item.process(&harness.context(), false, &NoopObserver);
        assert_eq!(item.status(), ItemStatus::Failed);

        // Terminal items can't be processed again without a reset.
        assert!(matches!(
            item.process(&harness.context(), false, &NoopObserver),
            Err(ItemError::InvalidState { .. })
        ));

        assert_eq!(item.reset(), Ok(true));
        assert_eq!(item.status(), ItemStatus::Ready);
        assert!(item.error_message().is_none());
        assert_eq!(item.reset(), Ok(false));
    }

    #[test]
    fn large_sources_get_64bit_flag_and_optimize_attribute_is_forwarded() {
        let harness = ItemHarness::new();
        let mut file = sample_file();
        file.data_size = 4_000_000_000;
        harness.container.insert("/media/big.mkv", file);

        let item = QueueItem::new("/media/big.mkv").with_destination("/out/big.mp4");
        item.set_attribute(attributes::OPTIMIZE, AttributeValue::Bool(true))
            .unwrap();
        item.process(&harness.context(), false, &NoopObserver).unwrap();

        let options = harness.container.write_options("/out/big.mp4").unwrap();
        assert!(options.optimize);
        assert_eq!(
            options.attributes.get(attributes::DATA_64BIT),
            Some(&AttributeValue::Bool(true))
        );
    }

    #[test]
    fn in_memory_items_need_no_container_open() {
        let harness = ItemHarness::new();
        let mut file = MediaFile::new();
        file.tracks.push(Track::new(1, MediaKind::Audio, "mp4a").with_name("x"));
        let item = QueueItem::with_file("/unsaved/new.mp4", file)
            .with_destination("/out/new.mp4")
            .with_action(Action::ClearTrackNames(ClearTrackNames));

        item.process(&harness.context(), false, &NoopObserver).unwrap();
        let written = harness.container.written("/out/new.mp4").unwrap();
        assert!(written.tracks[0].name.is_none());
        assert!(item.is_prepared());
    }

    #[test]
    fn write_is_refused_without_enough_free_space() {
        let harness = ItemHarness::new().with_free_space(1_000);
        harness.container.insert("/media/a.mkv", sample_file());
        let item = QueueItem::new("/media/a.mkv").with_destination("/out/a.mp4");

        let err = item.process(&harness.context(), false, &NoopObserver).unwrap_err();
        assert!(matches!(
            err,
            ItemError::Write(WriteError::OutOfDiskSpace {
                needed: 1_000_000,
                available: 1_000,
                ..
            })
        ));
        assert_eq!(item.status(), ItemStatus::Failed);
        assert!(harness.container.written("/out/a.mp4").is_none());
    }

    #[test]
    fn in_place_update_skips_free_space_check() {
        let harness = ItemHarness::new().with_free_space(0);
        harness.container.insert("/media/a.mp4", sample_file());
        let item = QueueItem::new("/media/a.mp4").with_destination("/media/a.mp4");

        item.process(&harness.context(), false, &NoopObserver).unwrap();
        assert!(harness.container.written("/media/a.mp4").is_some());
    }

    #[test]
    fn loaded_file_is_released_when_done() {
        let harness = ItemHarness::new();
        harness.container.insert("/media/a.mkv", sample_file());
        harness.container.insert("/media/b.mkv", sample_file());
        harness.container.fail_writes_to("/out/b.mp4");

        let done = QueueItem::new("/media/a.mkv").with_destination("/out/a.mp4");
        done.process(&harness.context(), false, &NoopObserver).unwrap();
        assert_eq!(done.status(), ItemStatus::Completed);
        assert!(!done.is_prepared());

        let failed = QueueItem::new("/media/b.mkv").with_destination("/out/b.mp4");
        assert!(failed.process(&harness.context(), false, &NoopObserver).is_err());
        assert!(!failed.is_prepared());
    }

    #[test]
    fn claimed_item_is_processed_without_a_second_working_notice() {
        let harness = ItemHarness::new();
        harness.container.insert("/media/a.mkv", sample_file());
        let item = QueueItem::new("/media/a.mkv").with_destination("/out/a.mp4");
        item.transition(ItemStatus::Working).unwrap();

        let recorder = Recorder::default();
        item.process(&harness.context(), false, &recorder).unwrap();
        assert_eq!(*recorder.statuses.lock(), vec![ItemStatus::Completed]);
        assert!(harness.container.written("/out/a.mp4").is_some());
    }
}
