use crate::jobs::{JobRequest, OperationKind};
use crate::state::JobHandle;
use crate::transport::Transport;
use crate::SubmitError;
use serde_json::Value;

/// What the provider handed back for a submitted request
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The result came back inline; nothing to poll
    Immediate(Value),

    /// The provider queued a job
    Async(JobHandle),
}

/// Validates, serializes and posts job requests
pub struct Submitter<T> {
    transport: T,
}

impl<T: Transport> Submitter<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Submits `request` to its operation's endpoint
    ///
    /// The payload is validated before anything is sent, so an invalid
    /// request never reaches the network.
    pub async fn submit(&self, request: &JobRequest) -> Result<SubmitOutcome, SubmitError> {
        let kind = request.kind();
        let payload = request.build_payload()?;

        tracing::info!(
            "Submitting {} request for {}",
            kind,
            target_summary(request)
        );
        let body = self.transport.post(kind.submit_path(), &payload).await?;

        if let Some(message) = rejection(&body) {
            tracing::warn!("Provider rejected {} request: {}", kind, message);
            return Err(SubmitError::Rejected { message });
        }

        if kind == OperationKind::BatchScrape {
            warn_invalid_urls(&body);
        }

        interpret(kind, body)
    }
}

/// Returns the provider's message if the response signals a rejection
///
/// An explicit `success: false` always rejects. An `error` field rejects
/// unless the body also says `success: true`.
pub(crate) fn rejection(body: &Value) -> Option<String> {
    let success = body.get("success").and_then(Value::as_bool);
    let error = body.get("error").filter(|e| !e.is_null());

    match (success, error) {
        (Some(true), _) => None,
        (Some(false), _) | (None, Some(_)) => Some(rejection_message(body)),
        (None, None) => None,
    }
}

fn rejection_message(body: &Value) -> String {
    let text = |key: &str| match body.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Null | Value::String(_) => None,
        other => Some(other.to_string()),
    };
    text("error")
        .or_else(|| text("message"))
        .unwrap_or_else(|| "unknown error".to_string())
}

fn interpret(kind: OperationKind, body: Value) -> Result<SubmitOutcome, SubmitError> {
    if !kind.is_async() {
        return Ok(SubmitOutcome::Immediate(body));
    }

    let job_id = ["id", "jobId"]
        .iter()
        .filter_map(|key| body.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|id| !id.is_empty());

    match job_id {
        Some(id) => {
            tracing::info!("Provider accepted {} job {}", kind, id);
            Ok(SubmitOutcome::Async(JobHandle::new(id, kind)))
        }
        None if kind == OperationKind::TextExport && has_data(&body) => {
            tracing::debug!("Text export answered inline");
            Ok(SubmitOutcome::Immediate(body))
        }
        None => Err(SubmitError::MissingJobId { operation: kind }),
    }
}

fn has_data(body: &Value) -> bool {
    body.get("data").is_some_and(|d| !d.is_null())
}

fn warn_invalid_urls(body: &Value) {
    let Some(invalid) = body.get("invalidURLs").and_then(Value::as_array) else {
        return;
    };
    if invalid.is_empty() {
        return;
    }
    let urls: Vec<&str> = invalid.iter().filter_map(Value::as_str).collect();
    tracing::warn!(
        "Provider skipped {} invalid URLs: {}",
        invalid.len(),
        urls.join(", ")
    );
}

fn target_summary(request: &JobRequest) -> String {
    let lines = request.target_lines();
    match lines.as_slice() {
        [] => "<empty target>".to_string(),
        [single] => single.to_string(),
        [first, rest @ ..] => format!("{} (+{} more)", first, rest.len()),
    }
}
