//! Presentation state for the sneaker list
//!
//! Adapts the storage live query into one shared, replayable value. The
//! upstream query is pumped only while at least one observer is attached;
//! when the last observer detaches, the pump keeps running for a short
//! grace period and is then released. The last published list stays
//! cached, so a late observer sees it immediately instead of an empty
//! flash, and the first pump iteration after a restart is a fresh fetch
//! that corrects any staleness.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};

use kickstash_storage::Sneaker;

use crate::repository::SneakerRepository;

const IDLE_GRACE: Duration = Duration::from_secs(5);

pub struct SneakerListModel {
    inner: Arc<ModelInner>,
}

struct ModelInner {
    repository: SneakerRepository,
    /// Published state. The watch channel caches the last value for
    /// late subscribers.
    list: watch::Sender<Vec<Sneaker>>,
    pump: Mutex<PumpState>,
    /// In-flight writes, aborted when the model is dropped.
    writes: Mutex<JoinSet<()>>,
    grace: Duration,
}

#[derive(Default)]
struct PumpState {
    observers: usize,
    task: Option<JoinHandle<()>>,
    /// Bumped on every subscribe and every idle transition, so a stale
    /// grace timer cannot stop a pump that was re-subscribed meanwhile.
    epoch: u64,
}

impl SneakerListModel {
    pub fn new(repository: SneakerRepository) -> Self {
        Self::with_idle_grace(repository, IDLE_GRACE)
    }

    pub fn with_idle_grace(repository: SneakerRepository, grace: Duration) -> Self {
        let (list, _) = watch::channel(Vec::new());

        Self {
            inner: Arc::new(ModelInner {
                repository,
                list,
                pump: Mutex::new(PumpState::default()),
                writes: Mutex::new(JoinSet::new()),
                grace,
            }),
        }
    }

    /// Attach an observer. The first observer starts the upstream pump.
    pub fn subscribe(&self) -> ListObserver {
        let rx = {
            let mut pump = self.inner.pump.lock();
            pump.observers += 1;
            pump.epoch += 1;

            if pump.task.is_none() {
                pump.task = Some(spawn_pump(&self.inner));
                tracing::debug!("Started live query pump");
            }

            self.inner.list.subscribe()
        };

        ListObserver {
            rx,
            _guard: ObserverGuard {
                inner: Arc::clone(&self.inner),
            },
        }
    }

    /// Write the fixed demo record through the repository, on a task
    /// scoped to this model's lifetime.
    pub fn add_demo_sneaker(&self) {
        let repository = self.inner.repository.clone();
        let mut writes = self.inner.writes.lock();

        // Reap writes that already finished
        while writes.try_join_next().is_some() {}

        writes.spawn(async move {
            match repository.add_sneaker(Sneaker::demo()).await {
                Ok(stored) => {
                    tracing::debug!(sneaker_id = stored.id, "Added demo sneaker");
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to add demo sneaker");
                }
            }
        });
    }
}

impl Clone for SneakerListModel {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Drop for ModelInner {
    fn drop(&mut self) {
        if let Some(task) = self.pump.get_mut().task.take() {
            task.abort();
        }
        // Dropping `writes` aborts any in-flight demo write dispatch.
        // A write that already reached the storage commit stays.
    }
}

/// Handle held by the display layer while it observes the list.
pub struct ListObserver {
    rx: watch::Receiver<Vec<Sneaker>>,
    _guard: ObserverGuard,
}

impl ListObserver {
    /// The last published list, available immediately.
    pub fn current(&self) -> Vec<Sneaker> {
        self.rx.borrow().clone()
    }

    /// Wait for the next published list. Returns `None` once the model
    /// is gone.
    pub async fn next(&mut self) -> Option<Vec<Sneaker>> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }
}

struct ObserverGuard {
    inner: Arc<ModelInner>,
}

impl Drop for ObserverGuard {
    fn drop(&mut self) {
        let epoch = {
            let mut pump = self.inner.pump.lock();
            pump.observers -= 1;
            if pump.observers > 0 {
                return;
            }
            pump.epoch += 1;
            pump.epoch
        };

        let inner = Arc::downgrade(&self.inner);
        let grace = self.inner.grace;

        tokio::spawn(async move {
            tokio::time::sleep(grace).await;

            let Some(model) = inner.upgrade() else {
                return;
            };

            let mut pump = model.pump.lock();
            if pump.observers == 0 && pump.epoch == epoch {
                if let Some(task) = pump.task.take() {
                    task.abort();
                    tracing::debug!("Idle grace elapsed, released live query pump");
                }
            }
        });
    }
}

fn spawn_pump(inner: &Arc<ModelInner>) -> JoinHandle<()> {
    // Weak reference so a running pump does not keep a dropped model alive
    let inner = Arc::downgrade(inner);

    tokio::spawn(async move {
        let mut live = match inner.upgrade() {
            Some(model) => model.repository.sneakers(),
            None => return,
        };

        loop {
            let rows = match live.next().await {
                Ok(rows) => rows,
                Err(e) => {
                    // One failed snapshot read skips the emission; the
                    // query itself stays subscribed.
                    tracing::error!(error = %e, "Live query snapshot failed");
                    continue;
                }
            };

            match inner.upgrade() {
                Some(model) => {
                    model.list.send_replace(rows);
                }
                None => return,
            }
        }
    })
}
