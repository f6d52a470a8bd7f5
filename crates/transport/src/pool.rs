//! Bounded worker pool for same-shaped outbound calls
//!
//! Detection sweeps, chunked translation and chunked synthesis all fan out
//! many independent requests. One [`WorkerPool`] is shared by every stage of a
//! workflow so the total number of requests in flight never exceeds its
//! capacity, whatever mix of stages is running.
//!
//! Results land in a pre-sized slot vector addressed by input index, so the
//! output order is the input order regardless of completion order.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::{self, StreamExt};
use tokio::sync::Semaphore;

/// Shared cap on concurrent outbound requests
#[derive(Debug, Clone)]
pub struct WorkerPool {
    permits: Arc<Semaphore>,
    capacity: usize,
}

impl WorkerPool {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            permits: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Permits not currently held
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    /// Run a single request while holding one pool permit
    ///
    /// Must not be nested inside [`WorkerPool::run_indexed`] tasks, which
    /// already hold a permit.
    pub async fn run<T, Fut>(&self, request: Fut) -> T
    where
        Fut: Future<Output = T>,
    {
        let _permit = self.permits.acquire().await.ok();
        request.await
    }

    /// Run `task` over every item with bounded concurrency
    ///
    /// At most `min(items.len(), batch_cap)` tasks of this batch run at once,
    /// and each also holds one pool permit while running. Returns one slot per
    /// item in input order; a slot is `None` when its task had not finished
    /// before `batch_timeout` elapsed. Unfinished tasks are dropped.
    pub async fn run_indexed<I, T, F, Fut>(
        &self,
        items: Vec<I>,
        batch_cap: usize,
        batch_timeout: Duration,
        task: F,
    ) -> Vec<Option<T>>
    where
        F: Fn(usize, I) -> Fut,
        Fut: Future<Output = T>,
    {
        let total = items.len();
        let mut slots: Vec<Option<T>> = (0..total).map(|_| None).collect();
        if total == 0 {
            return slots;
        }

        let width = batch_cap.max(1).min(total);
        let started = Instant::now();
        let deadline = tokio::time::Instant::now() + batch_timeout;
        let task = &task;

        let mut in_flight = stream::iter(items.into_iter().enumerate())
            .map(|(index, item)| {
                let permits = Arc::clone(&self.permits);
                async move {
                    // The semaphore is never closed, so acquisition only waits
                    let _permit = permits.acquire_owned().await.ok();
                    (index, task(index, item).await)
                }
            })
            .buffer_unordered(width);

        let mut finished = 0usize;
        loop {
            match tokio::time::timeout_at(deadline, in_flight.next()).await {
                Ok(Some((index, output))) => {
                    slots[index] = Some(output);
                    finished += 1;
                }
                Ok(None) => break,
                Err(_) => {
                    tracing::warn!(
                        finished,
                        total,
                        timeout_ms = batch_timeout.as_millis() as u64,
                        "Batch timed out, continuing with partial results"
                    );
                    break;
                }
            }
        }

        tracing::debug!(
            finished,
            total,
            width,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Batch complete"
        );

        slots
    }
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::new(8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_results_follow_input_order() {
        let pool = WorkerPool::new(8);
        let delays = vec![40u64, 5, 25, 0, 15];

        let slots = pool
            .run_indexed(delays, 5, Duration::from_secs(5), |index, delay| async move {
                tokio::time::sleep(Duration::from_millis(delay)).await;
                index * 10
            })
            .await;

        assert_eq!(slots, vec![Some(0), Some(10), Some(20), Some(30), Some(40)]);
    }

    #[tokio::test]
    async fn test_batch_cap_limits_concurrency() {
        let pool = WorkerPool::new(8);
        let active = AtomicUsize::new(0);
        let peak = AtomicUsize::new(0);
        let (active, peak_ref) = (&active, &peak);

        pool.run_indexed((0..12).collect(), 3, Duration::from_secs(5), move |_, _: i32| async move {
            let now = active.fetch_add(1, Ordering::SeqCst) + 1;
            peak_ref.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            active.fetch_sub(1, Ordering::SeqCst);
        })
        .await;

        assert!(peak.load(Ordering::SeqCst) <= 3);
    }

    #[tokio::test]
    async fn test_pool_capacity_shared_across_batches() {
        let pool = WorkerPool::new(2);
        let active = AtomicUsize::new(0);
        let peak = AtomicUsize::new(0);
        let (active, peak_ref) = (&active, &peak);

        let work = move |_: usize, _: i32| async move {
            let now = active.fetch_add(1, Ordering::SeqCst) + 1;
            peak_ref.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            active.fetch_sub(1, Ordering::SeqCst);
        };

        let a = pool.run_indexed((0..6).collect(), 5, Duration::from_secs(5), work);
        let b = pool.run_indexed((0..6).collect(), 5, Duration::from_secs(5), work);
        tokio::join!(a, b);

        assert!(peak.load(Ordering::SeqCst) <= 2);
        assert_eq!(pool.available(), 2);
    }

    #[tokio::test]
    async fn test_timeout_leaves_stragglers_empty() {
        let pool = WorkerPool::new(4);
        let delays = vec![0u64, 5_000, 0];

        let slots = pool
            .run_indexed(delays, 3, Duration::from_millis(200), |index, delay| async move {
                tokio::time::sleep(Duration::from_millis(delay)).await;
                index
            })
            .await;

        assert_eq!(slots, vec![Some(0), None, Some(2)]);
        assert_eq!(pool.available(), 4);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let pool = WorkerPool::new(4);
        let slots: Vec<Option<()>> = pool
            .run_indexed(Vec::<u8>::new(), 4, Duration::from_secs(1), |_, _| async {})
            .await;
        assert!(slots.is_empty());
    }
}
