/// Job state definitions for tracking provider-side jobs
///
/// This module defines the lifecycle of a submitted job, the status snapshot
/// the poller keeps for it, and the decoding of the provider's loosely-typed
/// status responses.
use crate::jobs::OperationKind;
use crate::PollError;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::fmt;

/// Represents the current state of a provider-side job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobState {
    // ===== Active States =====
    /// Job is accepted but the provider has not started it
    Queued,

    /// Job is in progress (also the reading for unknown or absent statuses)
    Running,

    // ===== Terminal Success States =====
    /// Job finished and its payload is available
    Completed,

    // ===== Terminal Error States =====
    /// Provider reported the job as failed
    Failed,

    /// Client-side budget ran out while the job was still active
    TimedOut,

    /// Status checks kept failing at the transport level
    TransportError,
}

impl JobState {
    /// Returns true if this is a terminal state (no further polling)
    pub fn is_terminal(&self) -> bool {
        !self.is_active()
    }

    /// Returns true if this is an active state (job may still change)
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Queued | Self::Running)
    }

    /// Returns true if this represents a successful completion
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Returns true if this represents an error state
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Failed | Self::TimedOut | Self::TransportError)
    }

    /// Short lowercase name used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::TimedOut => "timed_out",
            Self::TransportError => "transport_error",
        }
    }

    /// Maps the provider's `status` field onto a job state
    ///
    /// Anything that is not a recognized terminal or queued value, including a
    /// missing field, reads as [`JobState::Running`].
    pub fn from_provider(status: Option<&str>) -> Self {
        match status.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("completed") => Self::Completed,
            Some("failed") | Some("cancelled") => Self::Failed,
            Some("queued") | Some("pending") => Self::Queued,
            _ => Self::Running,
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Intermediate progress reported by the provider
#[derive(Debug, Clone, PartialEq)]
pub enum Progress {
    /// Percentage in 0..=100
    Percent(f64),

    /// Pages done out of pages requested
    Counts { completed: u64, total: u64 },

    /// Research depth reached out of the maximum
    Depth { current: u64, max: u64 },
}

impl Progress {
    /// Reads progress from a status body, preferring an explicit percentage
    pub fn from_status_body(body: &Value) -> Option<Self> {
        if let Some(percent) = body.get("progress").and_then(Value::as_f64) {
            return Some(Self::Percent(percent.clamp(0.0, 100.0)));
        }

        let completed = body.get("completed").and_then(Value::as_u64);
        let total = body.get("total").and_then(Value::as_u64);
        if let (Some(completed), Some(total)) = (completed, total) {
            return Some(Self::Counts { completed, total });
        }

        let current = body.get("currentDepth").and_then(Value::as_u64);
        let max = body.get("maxDepth").and_then(Value::as_u64);
        if let (Some(current), Some(max)) = (current, max) {
            return Some(Self::Depth { current, max });
        }

        None
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Percent(p) => write!(f, "{:.0}%", p),
            Self::Counts { completed, total } => write!(f, "{}/{} pages", completed, total),
            Self::Depth { current, max } => write!(f, "depth {}/{}", current, max),
        }
    }
}

/// Handle to a job accepted by the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobHandle {
    /// Opaque job identifier assigned by the provider
    pub id: String,

    /// Operation the job was submitted for
    pub operation: OperationKind,

    /// When the submit call returned
    pub submitted_at: DateTime<Utc>,
}

impl JobHandle {
    pub fn new(id: impl Into<String>, operation: OperationKind) -> Self {
        Self {
            id: id.into(),
            operation,
            submitted_at: Utc::now(),
        }
    }

    /// Status endpoint for this job
    pub fn status_path(&self) -> String {
        self.operation.status_path(&self.id)
    }
}

/// One decoded status response
#[derive(Debug, Clone)]
pub struct StatusUpdate {
    pub state: JobState,
    pub progress: Option<Progress>,
    pub activity: Option<String>,
    pub message: Option<String>,
    pub data: Option<Value>,
}

impl StatusUpdate {
    /// Decodes a provider status body
    ///
    /// Bodies that are not JSON objects carry no status and read as running.
    pub fn from_body(body: &Value) -> Self {
        let state = JobState::from_provider(body.get("status").and_then(Value::as_str));
        let message = body
            .get("error")
            .or_else(|| body.get("message"))
            .and_then(Value::as_str)
            .map(str::to_string);

        Self {
            state,
            progress: Progress::from_status_body(body),
            activity: latest_activity(body),
            message,
            data: body.get("data").filter(|d| !d.is_null()).cloned(),
        }
    }

    /// The message to surface when the job failed
    pub fn failure_message(&self) -> String {
        self.message
            .clone()
            .unwrap_or_else(|| "unknown error".to_string())
    }
}

/// Renders the newest deep-research activity as `type - message`
fn latest_activity(body: &Value) -> Option<String> {
    let activity = body
        .get("data")?
        .get("activities")?
        .as_array()?
        .last()?;
    let kind = activity
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or("unknown");
    let message = activity
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or_default();
    Some(format!("{} - {}", kind, message))
}

/// Status snapshot of one job, mutated only by its poll loop
#[derive(Debug, Clone)]
pub struct JobStatus {
    state: JobState,
    /// Latest progress reading
    pub progress: Option<Progress>,
    /// Latest deep-research activity, if any
    pub activity: Option<String>,
    /// Provider data seen while the job was still active
    pub partial: Option<Value>,
    /// Terminal payload, present only once completed
    pub payload: Option<Value>,
}

impl JobStatus {
    pub fn new() -> Self {
        Self {
            state: JobState::Queued,
            progress: None,
            activity: None,
            partial: None,
            payload: None,
        }
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    /// Moves to `next`, refusing to leave a terminal state
    pub fn transition(&mut self, next: JobState) -> Result<(), PollError> {
        if self.state.is_terminal() {
            return Err(PollError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        self.state = next;
        Ok(())
    }

    /// Folds an active status response into the snapshot
    pub fn observe(&mut self, update: &StatusUpdate) -> Result<(), PollError> {
        self.transition(update.state)?;
        if update.progress.is_some() {
            self.progress = update.progress.clone();
        }
        if update.activity.is_some() {
            self.activity = update.activity.clone();
        }
        if update.state.is_active() && update.data.is_some() {
            self.partial = update.data.clone();
        }
        Ok(())
    }

    /// Records the terminal payload of a completed job
    pub fn complete(&mut self, payload: Value) -> Result<(), PollError> {
        self.transition(JobState::Completed)?;
        self.payload = Some(payload);
        Ok(())
    }
}

impl Default for JobStatus {
    fn default() -> Self {
        Self::new()
    }
}
