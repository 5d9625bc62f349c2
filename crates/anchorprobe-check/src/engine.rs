//! Bounded-concurrency probe engine.
//!
//! A semaphore with `max_parallel` permits gates admission: one permit is
//! taken before each probe task is spawned and released when the task has
//! recorded its result. Draining takes every permit back, so once `run`
//! reads the result map no probe is still in flight.

use std::collections::{HashMap, HashSet};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::{Mutex, Semaphore};

use anchorprobe_core::{ProbeResults, Target};

use crate::prober::Prober;

pub struct ProbeEngine<P> {
    prober: Arc<P>,
    gate: Arc<Semaphore>,
    max_parallel: u32,
}

impl<P: Prober> ProbeEngine<P> {
    /// Create an engine running at most `max_parallel` probes at once (minimum 1).
    pub fn new(prober: P, max_parallel: usize) -> Self {
        let max_parallel = max_parallel.clamp(1, u32::MAX as usize) as u32;
        Self {
            prober: Arc::new(prober),
            gate: Arc::new(Semaphore::new(max_parallel as usize)),
            max_parallel,
        }
    }

    pub fn max_parallel(&self) -> usize {
        self.max_parallel as usize
    }

    /// Probe every target once and return the outcome per target.
    ///
    /// Duplicate targets are probed once.
    pub async fn run(&self, targets: Vec<Target>) -> ProbeResults {
        let results = Arc::new(Mutex::new(HashMap::with_capacity(targets.len())));
        let mut admitted = HashSet::with_capacity(targets.len());

        for target in targets {
            if !admitted.insert(target.clone()) {
                tracing::debug!(target = %target, "Skipping duplicate target");
                continue;
            }

            let permit = self
                .gate
                .clone()
                .acquire_owned()
                .await
                .expect("Semaphore closed");
            let prober = self.prober.clone();
            let results = results.clone();

            tokio::spawn(async move {
                // A panic inside the check counts as unreachable.
                let reachable = AssertUnwindSafe(prober.probe(&target))
                    .catch_unwind()
                    .await
                    .unwrap_or_else(|_| {
                        tracing::warn!(target = %target, "Reachability check panicked");
                        false
                    });
                tracing::trace!(target = %target, reachable, "Probe finished");
                results.lock().await.insert(target, reachable);
                drop(permit);
            });
        }

        self.drain().await;

        let snapshot = results.lock().await.clone();
        tracing::info!(
            probed = snapshot.len(),
            reachable = snapshot.values().filter(|ok| **ok).count(),
            "Probe run complete"
        );
        ProbeResults::from(snapshot)
    }

    /// Wait for all in-flight probes by taking every permit, then hand them back.
    async fn drain(&self) {
        let all = self
            .gate
            .acquire_many(self.max_parallel)
            .await
            .expect("Semaphore closed");
        drop(all);
    }
}
