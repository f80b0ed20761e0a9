//! Submission Service
//!
//! The top-level orchestration crate: builds guides, assembles batches,
//! validates against the versioned schema, delivers over the configured
//! transport, schedules retries on the backoff table, ingests operator
//! responses, and writes the audit trail.

pub mod config;
pub mod error;
pub mod scheduler;
pub mod service;
pub mod telemetry;

pub use crate::config::SubmissionConfig;
pub use crate::error::SubmissionError;
pub use crate::scheduler::RetryScheduler;
pub use crate::service::SubmissionService;
