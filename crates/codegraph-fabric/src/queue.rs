//! The single logical analysis-job queue (spec §4.5 "Queue"): producers
//! are the webhook handler, the manual re-analysis API, and new-commit
//! events; consumers are a worker pool of configurable size. Delivery is
//! at-least-once — a job that a worker fails to complete (crash, timeout)
//! is simply requeued by whatever re-drives it, never silently dropped.

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisJob {
    pub pull_request_id: String,
    pub commit_sha: String,
}

/// A bounded-or-unbounded multi-producer multi-consumer queue. Workers
/// dequeue with a timeout so a suspension point (spec §5) never blocks a
/// shared scheduler indefinitely.
#[derive(Clone)]
pub struct AnalysisQueue {
    tx: Sender<AnalysisJob>,
    rx: Receiver<AnalysisJob>,
}

impl AnalysisQueue {
    pub fn unbounded() -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        Self { tx, rx }
    }

    pub fn enqueue(&self, job: AnalysisJob) {
        // An unbounded channel's send only fails if every receiver has
        // been dropped, which would mean the worker pool itself is gone.
        let _ = self.tx.send(job);
    }

    /// Requeues with a delay (spec: "if not [acquired], requeue with
    /// delay"), used when a worker loses the per-PR lock race.
    pub fn requeue_after(&self, job: AnalysisJob, delay: Duration) {
        let tx = self.tx.clone();
        std::thread::spawn(move || {
            std::thread::sleep(delay);
            let _ = tx.send(job);
        });
    }

    pub fn dequeue_timeout(&self, timeout: Duration) -> Option<AnalysisJob> {
        match self.rx.recv_timeout(timeout) {
            Ok(job) => Some(job),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    pub fn try_dequeue(&self) -> Option<AnalysisJob> {
        match self.rx.try_recv() {
            Ok(job) => Some(job),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(pr: &str) -> AnalysisJob {
        AnalysisJob {
            pull_request_id: pr.to_string(),
            commit_sha: "abc123".to_string(),
        }
    }

    #[test]
    fn enqueue_then_dequeue_round_trips() {
        let queue = AnalysisQueue::unbounded();
        queue.enqueue(job("42"));
        let got = queue.dequeue_timeout(Duration::from_millis(100));
        assert_eq!(got, Some(job("42")));
    }

    #[test]
    fn dequeue_times_out_on_empty_queue() {
        let queue = AnalysisQueue::unbounded();
        assert_eq!(queue.dequeue_timeout(Duration::from_millis(10)), None);
    }

    #[test]
    fn requeue_after_delay_is_eventually_visible() {
        let queue = AnalysisQueue::unbounded();
        queue.requeue_after(job("42"), Duration::from_millis(5));
        assert_eq!(queue.try_dequeue(), None);
        let got = queue.dequeue_timeout(Duration::from_millis(200));
        assert_eq!(got, Some(job("42")));
    }
}
