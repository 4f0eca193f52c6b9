//! Queue runner: owns the worker thread and the run lifecycle.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::Mutex;

use crate::actions::ActionContext;
use crate::collaborators::Collaborators;
use crate::config::Settings;
use crate::logging::ItemLogger;
use crate::queue::{ItemError, NextItem, QueueItem, QueueStore};

use super::power::{PowerAssertion, SleepInhibitor, SystemInhibitor};

const WORKER_NAME: &str = "mtq-runner";
const INHIBIT_REASON: &str = "Processing media queue";

/// Drives a [`QueueStore`] on a background thread.
///
/// Owned by the application; dropping it stops the run and joins the
/// worker.
///
/// # Example
///
/// ```ignore
/// let runner = QueueRunner::new(store.clone(), collaborators, settings);
/// runner.start();
/// // ...
/// runner.stop();
/// runner.wait();
/// ```
pub struct QueueRunner {
    shared: Arc<Shared>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

struct Shared {
    store: Arc<QueueStore>,
    collaborators: Collaborators,
    settings: Settings,
    power: PowerAssertion,
    control: Mutex<Control>,
}

#[derive(Default)]
struct Control {
    stop_requested: bool,
    /// Item being processed, cancelled by `stop()`.
    current: Option<Arc<QueueItem>>,
    /// Run the flags above belong to.
    generation: u64,
}

impl Control {
    fn stopped(&self, generation: u64) -> bool {
        self.stop_requested || self.generation != generation
    }
}

impl QueueRunner {
    /// Create a runner using the platform sleep inhibitor.
    pub fn new(store: Arc<QueueStore>, collaborators: Collaborators, settings: Settings) -> Self {
        Self::with_inhibitor(
            store,
            collaborators,
            settings,
            Box::new(SystemInhibitor::new(INHIBIT_REASON)),
        )
    }

    /// Create a runner with a specific sleep inhibitor.
    pub fn with_inhibitor(
        store: Arc<QueueStore>,
        collaborators: Collaborators,
        settings: Settings,
        inhibitor: Box<dyn SleepInhibitor>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                store,
                collaborators,
                settings,
                power: PowerAssertion::new(inhibitor),
                control: Mutex::new(Control::default()),
            }),
            worker: Mutex::new(None),
        }
    }

    pub fn store(&self) -> &Arc<QueueStore> {
        &self.shared.store
    }

    /// Start processing Ready items.
    ///
    /// Returns `false` if the store is already Working. A previous worker
    /// that is still winding down after its run ended is joined by the
    /// new worker before it takes the power assertion.
    pub fn start(&self) -> bool {
        let mut worker = self.worker.lock();
        let Some(generation) = self.shared.store.begin_run() else {
            return false;
        };
        {
            let mut control = self.shared.control.lock();
            control.stop_requested = false;
            control.generation = generation;
        }

        let previous = worker.take();
        let shared = Arc::clone(&self.shared);
        match thread::Builder::new()
            .name(WORKER_NAME.to_string())
            .spawn(move || {
                if let Some(previous) = previous {
                    join_worker(previous);
                }
                shared.power.acquire();
                shared.run(generation);
            }) {
            Ok(handle) => {
                *worker = Some(handle);
                true
            }
            Err(e) => {
                tracing::error!("Failed to spawn queue worker: {}", e);
                self.shared.store.cancel_run();
                false
            }
        }
    }

    /// Cancel the current item at its next action boundary and stop
    /// advancing. Items already finished keep their status.
    pub fn stop(&self) {
        {
            let mut control = self.shared.control.lock();
            control.stop_requested = true;
            if let Some(item) = &control.current {
                item.cancel();
            }
        }
        if self.shared.store.cancel_run() {
            tracing::info!("Queue run cancelled");
        }
        self.shared.power.release();
    }

    /// Block until the worker exits.
    pub fn wait(&self) {
        let handle = self.worker.lock().take();
        if let Some(handle) = handle {
            join_worker(handle);
        }
    }

    pub fn is_running(&self) -> bool {
        self.worker
            .lock()
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }

    /// Add an item to the store, starting a run when auto-start is on.
    pub fn enqueue(&self, item: QueueItem) -> Arc<QueueItem> {
        let item = self.shared.store.append(item);
        if self.shared.settings.queue.auto_start {
            self.start();
        }
        item
    }
}

fn join_worker(handle: JoinHandle<()>) {
    if handle.join().is_err() {
        tracing::error!("Queue worker panicked");
    }
}

impl Drop for QueueRunner {
    fn drop(&mut self) {
        self.stop();
        self.wait();
    }
}

impl std::fmt::Debug for QueueRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueueRunner")
            .field("store", &self.shared.store)
            .field("running", &self.is_running())
            .finish()
    }
}

impl Shared {
    fn run(&self, generation: u64) {
        tracing::info!(
            "Queue run started ({} ready)",
            self.store.ready_count()
        );

        loop {
            let item = match self.store.next_item(generation) {
                NextItem::Item(item) => item,
                NextItem::Finished { had_failures } => {
                    tracing::info!(
                        "Queue run finished{}",
                        if had_failures { " with failures" } else { "" }
                    );
                    break;
                }
                NextItem::Idle => {
                    tracing::info!("Queue run stopped");
                    break;
                }
            };

            {
                let mut control = self.control.lock();
                // Already claimed: let it settle as Cancelled rather than
                // leaving it Working.
                if control.stopped(generation) {
                    item.cancel();
                }
                control.current = Some(Arc::clone(&item));
            }

            let failed = self.process(&item);
            {
                let mut control = self.control.lock();
                control.current = None;
                if control.stopped(generation) {
                    break;
                }
            }

            if failed && self.settings.queue.stop_on_failure {
                tracing::warn!(
                    "Stopping queue after failure of {}",
                    item.display_name()
                );
                self.store.finish_run();
                break;
            }
        }

        self.power.release();
    }

    /// Process one item. Returns `true` if it failed.
    fn process(&self, item: &QueueItem) -> bool {
        let logger = self.item_logger(item);
        let ctx = ActionContext {
            collaborators: &self.collaborators,
            logger: &logger,
        };

        let failed = match item.process(&ctx, self.settings.queue.optimize, self.store.as_ref()) {
            Ok(()) => false,
            Err(ItemError::Cancelled) => {
                tracing::info!("{} cancelled", item.display_name());
                false
            }
            Err(ItemError::InvalidState { status }) => {
                tracing::debug!("Skipping {} ({})", item.display_name(), status);
                false
            }
            Err(e) => {
                tracing::warn!("{} failed: {}", item.display_name(), e);
                true
            }
        };
        logger.close();
        failed
    }

    fn item_logger(&self, item: &QueueItem) -> ItemLogger {
        let name = item.display_name();
        let config = self.settings.log_config();
        if self.settings.logging.item_logs {
            match ItemLogger::for_item(
                name.clone(),
                item.id(),
                &self.settings.paths.logs_folder,
                config.clone(),
                None,
            ) {
                Ok(logger) => return logger,
                Err(e) => tracing::warn!("Failed to create log file for {}: {}", name, e),
            }
        }
        ItemLogger::detached(name, config)
    }
}
