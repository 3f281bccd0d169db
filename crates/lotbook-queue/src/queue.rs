//! Queue implementations
//!
//! `enqueue` returning false is not an error: it is the signal that the
//! caller must execute the job's logic inline, synchronously, inside the
//! same unit of work that triggered it.

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::job::Job;

/// Broker channel configuration
#[derive(Clone, Debug)]
pub struct QueueConfig {
    /// Bounded channel capacity before enqueue starts refusing
    pub capacity: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self { capacity: 256 }
    }
}

/// Hand-off point for out-of-band job execution
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Offer a job to the broker; true means a worker will run it
    /// (at least once), false means the caller must run it inline
    async fn enqueue(&self, job: Job) -> bool;
}

/// Queue backed by the in-process broker channel
///
/// Refuses jobs when the broker is gone (channel closed) or saturated
/// (channel full); both cases fall back to inline execution at the caller.
pub struct BrokerJobQueue {
    tx: mpsc::Sender<Job>,
}

impl BrokerJobQueue {
    /// Create the queue and the receiving end the worker runtime consumes
    pub fn new(config: &QueueConfig) -> (Self, mpsc::Receiver<Job>) {
        let (tx, rx) = mpsc::channel(config.capacity);
        (Self { tx }, rx)
    }
}

#[async_trait]
impl JobQueue for BrokerJobQueue {
    async fn enqueue(&self, job: Job) -> bool {
        match self.tx.try_send(job) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(job)) => {
                warn!(job = job.name(), "job broker saturated, falling back to inline execution");
                false
            }
            Err(mpsc::error::TrySendError::Closed(job)) => {
                warn!(job = job.name(), "job broker not running, falling back to inline execution");
                false
            }
        }
    }
}

/// The not-configured case: every job runs inline at its trigger site
#[derive(Clone, Copy, Debug, Default)]
pub struct DisabledJobQueue;

#[async_trait]
impl JobQueue for DisabledJobQueue {
    async fn enqueue(&self, job: Job) -> bool {
        debug!(job = job.name(), "job queue disabled, executing inline");
        false
    }
}
