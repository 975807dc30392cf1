use crate::jobs::{JobRequest, SubmitOutcome, Submitter};
use crate::poller::{PollBudget, PollProgress, Poller};
use crate::transport::Transport;
use crate::FiredashError;
use serde_json::Value;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Submits a request and, for asynchronous jobs, polls it to completion
pub struct JobRunner<T> {
    submitter: Submitter<Arc<T>>,
    poller: Poller<Arc<T>>,
    budget: PollBudget,
}

impl<T: Transport> JobRunner<T> {
    pub fn new(transport: Arc<T>, budget: PollBudget) -> Self {
        Self {
            submitter: Submitter::new(transport.clone()),
            poller: Poller::new(transport),
            budget,
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.poller = self.poller.with_cancellation(token);
        self
    }

    /// Runs `request` end to end
    ///
    /// Immediate results are returned as the provider sent them; queued jobs
    /// return the completed job's payload.
    pub async fn run<F>(&self, request: &JobRequest, on_progress: F) -> Result<Value, FiredashError>
    where
        F: FnMut(&PollProgress<'_>),
    {
        match self.submitter.submit(request).await? {
            SubmitOutcome::Immediate(body) => Ok(body),
            SubmitOutcome::Async(handle) => {
                let payload = self.poller.poll(&handle, &self.budget, on_progress).await?;
                Ok(payload)
            }
        }
    }
}
