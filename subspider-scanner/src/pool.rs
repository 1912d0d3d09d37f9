use crate::error::Result;
use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{Mutex, Semaphore, watch};
use tracing::{debug, warn};

/// Bounded task group draining a queue of work items.
///
/// The dispatcher takes a permit from a counting semaphore before it spawns
/// each unit, and the unit holds that permit until it settles, so no more
/// than `concurrency` units are ever in flight. [`WorkerPool::run`] returns
/// only after every spawned unit has settled.
pub struct WorkerPool {
    concurrency: usize,
    gate: Arc<Semaphore>,
    shutdown: Option<watch::Receiver<bool>>,
}

impl WorkerPool {
    pub fn new(concurrency: usize) -> Self {
        let concurrency = concurrency.max(1);
        Self {
            concurrency,
            gate: Arc::new(Semaphore::new(concurrency)),
            shutdown: None,
        }
    }

    /// Stop handing out queued work once the receiver reads `true`.
    /// Units already admitted run to completion.
    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    fn stopping(&self) -> bool {
        self.shutdown.as_ref().is_some_and(|rx| *rx.borrow())
    }

    pub async fn run<T, O, F, Fut>(&self, items: Vec<T>, work: F) -> Result<Vec<O>>
    where
        T: Send + 'static,
        O: Send + 'static,
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = O> + Send + 'static,
    {
        let total = items.len();
        if total == 0 {
            return Ok(Vec::new());
        }

        debug!(
            "Dispatching {} work items, at most {} in flight",
            total, self.concurrency
        );

        let mut queue: VecDeque<T> = items.into();
        let results: Arc<Mutex<Vec<O>>> = Arc::new(Mutex::new(Vec::with_capacity(total)));
        let work = Arc::new(work);

        let mut handles = Vec::with_capacity(total);

        while !queue.is_empty() {
            if self.stopping() {
                debug!("Shutdown requested, {} items left undispatched", queue.len());
                break;
            }

            let Ok(permit) = self.gate.clone().acquire_owned().await else {
                break;
            };

            // The signal may have arrived while waiting for a slot
            if self.stopping() {
                debug!("Shutdown requested, {} items left undispatched", queue.len());
                break;
            }

            let Some(item) = queue.pop_front() else {
                break;
            };

            let results = results.clone();
            let work = work.clone();
            handles.push(tokio::spawn(async move {
                let _permit = permit;
                let outcome = work(item).await;
                results.lock().await.push(outcome);
            }));
        }

        // Stage barrier: every unit settles before the first failure is reported
        let mut first_error = None;
        for handle in handles {
            if let Err(e) = handle.await {
                warn!("Work unit failed: {}", e);
                first_error.get_or_insert(e);
            }
        }
        if let Some(e) = first_error {
            return Err(e.into());
        }

        let mut results = results.lock().await;
        Ok(std::mem::take(&mut *results))
    }
}
