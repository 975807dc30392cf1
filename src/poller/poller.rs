//! Job status poll loop
//!
//! The loop drives one job from `Queued`/`Running` to exactly one terminal
//! state:
//!
//! | Observation | Action |
//! |-------------|--------|
//! | `completed` | Return the terminal payload |
//! | `failed` | Return `JobFailed` immediately, no retry |
//! | Any other or absent status | Report progress, sleep, poll again |
//! | Transport failure | Count it, sleep, poll again |
//! | Budget exhausted | `TimedOut`, or `Transport` if the last check failed |
//! | Cancellation | `Cancelled`, no request is sent to the provider |

use crate::poller::PollBudget;
use crate::state::{JobHandle, JobState, JobStatus, StatusUpdate};
use crate::transport::Transport;
use crate::{PollError, TransportError};
use serde_json::Value;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;

/// Progress snapshot handed to the caller after each non-terminal check
#[derive(Debug)]
pub struct PollProgress<'a> {
    pub handle: &'a JobHandle,
    /// 1-based number of the status check that produced this snapshot
    pub attempt: u32,
    pub status: &'a JobStatus,
}

/// Polls job status endpoints until a terminal state is reached
///
/// A poller keeps no per-job state between calls; every [`Poller::poll`] call
/// owns its own status snapshot and failure counter, so independent jobs can
/// be polled concurrently through one instance. Cancelling the token stops
/// every loop running on this poller.
pub struct Poller<T> {
    transport: T,
    cancel: CancellationToken,
}

impl<T: Transport> Poller<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            cancel: CancellationToken::new(),
        }
    }

    /// Uses `token` to abandon poll loops from outside
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Polls `handle` until it completes, fails, or the budget runs out
    ///
    /// # Arguments
    ///
    /// * `handle` - The job to poll
    /// * `budget` - Interval and limits for this loop
    /// * `on_progress` - Called after every non-terminal status check
    ///
    /// # Returns
    ///
    /// * `Ok(Value)` - The completed job's `data`, or the whole body if it has none
    /// * `Err(PollError)` - Failed, timed out, transport-exhausted or cancelled
    pub async fn poll<F>(
        &self,
        handle: &JobHandle,
        budget: &PollBudget,
        mut on_progress: F,
    ) -> Result<Value, PollError>
    where
        F: FnMut(&PollProgress<'_>),
    {
        let path = handle.status_path();
        let started = Instant::now();
        let mut status = JobStatus::new();
        let mut attempts = 0u32;
        let mut consecutive_failures = 0u32;
        let mut last_failure: Option<TransportError> = None;

        tracing::debug!("Polling {} job {} at {}", handle.operation, handle.id, path);

        loop {
            attempts += 1;

            let response = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    tracing::info!("Stopped polling job {} (cancelled)", handle.id);
                    return Err(PollError::Cancelled);
                }
                response = self.transport.get(&path) => response,
            };

            match response {
                Ok(body) => {
                    consecutive_failures = 0;
                    last_failure = None;

                    let update = StatusUpdate::from_body(&body);
                    match update.state {
                        JobState::Completed => {
                            let payload = terminal_payload(body);
                            status.complete(payload.clone())?;
                            tracing::info!(
                                "Job {} completed after {} status checks ({:?})",
                                handle.id,
                                attempts,
                                started.elapsed()
                            );
                            return Ok(payload);
                        }
                        JobState::Failed => {
                            status.transition(JobState::Failed)?;
                            let message = update.failure_message();
                            tracing::warn!("Job {} failed: {}", handle.id, message);
                            return Err(PollError::JobFailed { message });
                        }
                        _ => {
                            status.observe(&update)?;
                            tracing::debug!(
                                "Job {} is {} (check {}/{}){}",
                                handle.id,
                                status.state(),
                                attempts,
                                budget.max_attempts,
                                status
                                    .progress
                                    .as_ref()
                                    .map(|p| format!(", {}", p))
                                    .unwrap_or_default()
                            );
                            on_progress(&PollProgress {
                                handle,
                                attempt: attempts,
                                status: &status,
                            });
                        }
                    }
                }
                Err(e) => {
                    consecutive_failures += 1;
                    tracing::warn!(
                        "Status check {} for job {} failed ({} in a row): {}",
                        attempts,
                        handle.id,
                        consecutive_failures,
                        e
                    );

                    if budget.failures_exceeded(consecutive_failures) {
                        status.transition(JobState::TransportError)?;
                        return Err(PollError::Transport {
                            attempts,
                            source: e,
                        });
                    }
                    last_failure = Some(e);
                }
            }

            let elapsed = started.elapsed();
            if budget.is_exhausted(attempts, elapsed) {
                return Err(out_of_budget(handle, &mut status, attempts, elapsed, last_failure));
            }

            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    tracing::info!("Stopped polling job {} (cancelled)", handle.id);
                    return Err(PollError::Cancelled);
                }
                _ = sleep(budget.next_wait(elapsed)) => {}
            }

            // The wait may have used up the rest of the time budget.
            let elapsed = started.elapsed();
            if budget.is_exhausted(attempts, elapsed) {
                return Err(out_of_budget(handle, &mut status, attempts, elapsed, last_failure));
            }
        }
    }
}

/// Settles the status snapshot once the budget runs out and builds the error
fn out_of_budget(
    handle: &JobHandle,
    status: &mut JobStatus,
    attempts: u32,
    elapsed: Duration,
    last_failure: Option<TransportError>,
) -> PollError {
    let (state, err) = match last_failure {
        Some(source) => (
            JobState::TransportError,
            PollError::Transport { attempts, source },
        ),
        None => (JobState::TimedOut, PollError::TimedOut { attempts, elapsed }),
    };
    if state == JobState::TimedOut {
        tracing::warn!(
            "Job {} still {} after {} status checks ({:?})",
            handle.id,
            status.state(),
            attempts,
            elapsed
        );
    }
    match status.transition(state) {
        Ok(()) => err,
        Err(invalid) => invalid,
    }
}

/// Extracts what a completed job hands back to the caller
fn terminal_payload(body: Value) -> Value {
    match body {
        Value::Object(mut map) => match map.remove("data") {
            Some(data) if !data.is_null() => data,
            _ => Value::Object(map),
        },
        other => other,
    }
}
