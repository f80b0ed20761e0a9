//! Batch Domain
//!
//! Assembles same-kind guides into numbered submission lots, carries the
//! submission lifecycle (Pending → Submitted / Error), and owns the retry
//! backoff policy. Delivery itself lives in the transport adapters.

pub mod assembler;
pub mod batch;
pub mod error;
pub mod retry;

pub use assembler::{BatchAssembler, MAX_GUIDES_PER_BATCH};
pub use batch::{Batch, SubmissionStatus};
pub use error::BatchError;
pub use retry::{next_retry_time, DEFAULT_MAX_RETRIES, RETRY_SCHEDULE_SECS};
