//! Lotbook Queue - job payloads and the pluggable queue abstraction
//!
//! Schema-propagation work is described by a `Job` value and handed to a
//! `JobQueue`. When a broker is running the job executes out of band; when
//! `enqueue` returns false the trigger site runs the same idempotent
//! function inline, so propagation is never silently dropped.

pub mod job;
pub mod queue;

pub use job::Job;
pub use queue::{BrokerJobQueue, DisabledJobQueue, JobQueue, QueueConfig};
