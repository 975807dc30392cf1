//! State module for tracking job progress
//!
//! # Components
//!
//! - `JobState`: lifecycle of a provider-side job (queued, running, terminal)
//! - `JobStatus`: the poller's snapshot of one job
//! - `JobHandle`: identifier of a submitted job
//! - `Progress`: intermediate progress readings

mod job_state;

// Re-export main types
pub use job_state::{JobHandle, JobState, JobStatus, Progress, StatusUpdate};
