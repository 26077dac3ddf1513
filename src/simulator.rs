//! Background score generator.
//!
//! Drives continuous rating churn: every tick it nudges a batch of
//! random users by a bounded delta, exactly the write pattern the
//! engine is built to absorb while serving reads.
//!
//! The simulator keeps its own cache of user ids, refreshed every few
//! seconds, instead of asking the board for a fresh id list per tick.
//! The cache is allowed to go stale; an update against an id that has
//! since disappeared comes back as `NotFound` and is silently dropped.
//! That is a deliberate contract, not a shortcut: the generator is a
//! best-effort client, and correctness lives entirely in the engine.

use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use rand::Rng;
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::debug;
use tracing::info;

use crate::engine::Leaderboard;

/// Users nudged per tick.
const BATCH_SIZE: usize = 10;

/// How often the id cache is rebuilt from the board.
const CACHE_REFRESH: Duration = Duration::from_secs(10);

/// Largest single-tick rating swing, in either direction.
const MAX_DELTA: i32 = 100;

struct IdCache {
    ids: Vec<String>,
    version: u64,
}

/// Everything the background task shares with its handle.
struct SimInner {
    board: Arc<Leaderboard>,
    interval: Duration,
    running: AtomicBool,
    update_count: AtomicU64,
    cache: Mutex<IdCache>,
    stop_tx: Mutex<Option<broadcast::Sender<()>>>,
}

/// Interval-driven rating churn over a shared board.
///
/// Cloning the simulator clones a handle to the same underlying task
/// state, so any clone can start, stop, or inspect it.
#[derive(Clone)]
pub struct Simulator {
    inner: Arc<SimInner>,
}

/// Status snapshot for the control endpoints.
#[derive(Clone, Debug, Serialize)]
pub struct SimulatorStats {
    pub running: bool,
    pub update_count: u64,
    pub batch_size: usize,
    pub interval_ms: u64,
    pub cache_size: usize,
    pub cache_version: u64,
}

impl Simulator {
    pub fn new(board: Arc<Leaderboard>, interval: Duration) -> Simulator {
        return Simulator {
            inner: Arc::new(SimInner {
                board,
                interval,
                running: AtomicBool::new(false),
                update_count: AtomicU64::new(0),
                cache: Mutex::new(IdCache {
                    ids: Vec::new(),
                    version: 0,
                }),
                stop_tx: Mutex::new(None),
            }),
        };
    }

    /// Start the background task. Starting an already-running simulator
    /// is a no-op.
    pub fn start(&self) {
        let mut stop_slot = self.inner.stop_tx.lock().unwrap();
        if self.inner.running.swap(true, Ordering::SeqCst) {
            return;
        }

        let (tx, rx) = broadcast::channel(1);
        *stop_slot = Some(tx);

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            inner.run(rx).await;
        });
        info!(interval_ms = self.inner.interval.as_millis() as u64, "simulator started");
    }

    /// Stop the background task. Stopping an idle simulator is a no-op.
    pub fn stop(&self) {
        let mut stop_slot = self.inner.stop_tx.lock().unwrap();
        if !self.inner.running.swap(false, Ordering::SeqCst) {
            return;
        }
        if let Some(tx) = stop_slot.take() {
            let _ = tx.send(());
        }
        info!("simulator stopped");
    }

    pub fn is_running(&self) -> bool {
        return self.inner.running.load(Ordering::SeqCst);
    }

    /// Total successful updates since construction.
    pub fn update_count(&self) -> u64 {
        return self.inner.update_count.load(Ordering::SeqCst);
    }

    /// Status snapshot.
    pub fn stats(&self) -> SimulatorStats {
        let cache = self.inner.cache.lock().unwrap();
        return SimulatorStats {
            running: self.is_running(),
            update_count: self.update_count(),
            batch_size: BATCH_SIZE,
            interval_ms: self.inner.interval.as_millis() as u64,
            cache_size: cache.ids.len(),
            cache_version: cache.version,
        };
    }
}

impl SimInner {
    async fn run(&self, mut stop_rx: broadcast::Receiver<()>) {
        let mut tick = tokio::time::interval(self.interval);
        let mut cache_tick = tokio::time::interval(CACHE_REFRESH);

        self.refresh_cache();

        loop {
            tokio::select! {
                _ = stop_rx.recv() => {
                    debug!("simulator task exiting");
                    return;
                }
                _ = cache_tick.tick() => {
                    self.refresh_cache();
                }
                _ = tick.tick() => {
                    self.update_batch();
                }
            }
        }
    }

    fn refresh_cache(&self) {
        let ids = self.board.all_ids();
        let mut cache = self.cache.lock().unwrap();
        cache.ids = ids;
        cache.version += 1;
        debug!(cache_size = cache.ids.len(), version = cache.version, "id cache refreshed");
    }

    /// Nudge a batch of random users. Ids are picked from the cache
    /// without holding it across the engine calls.
    fn update_batch(&self) {
        let mut rng = rand::thread_rng();
        let picked: Vec<String> = {
            let cache = self.cache.lock().unwrap();
            if cache.ids.is_empty() {
                return;
            }
            let batch = BATCH_SIZE.min(cache.ids.len());
            (0..batch)
                .map(|_| cache.ids[rng.gen_range(0..cache.ids.len())].clone())
                .collect()
        };

        let bounds = self.board.bounds();
        for id in picked {
            // Stale cache entry: the user may be gone. Skip quietly.
            let Ok(user) = self.board.get_user(&id) else {
                continue;
            };

            let delta = rng.gen_range(-MAX_DELTA..=MAX_DELTA);
            let new_rating = bounds.clamp(user.rating + delta);

            if self.board.update_rating(&id, new_rating).is_ok() {
                self.update_count.fetch_add(1, Ordering::SeqCst);
            }
        }
    }
}
