//! Jobs module for building and submitting provider requests
//!
//! This module contains:
//! - `JobRequest` and the per-operation option types
//! - Payload validation and serialization (`JobRequest::build_payload`)
//! - `Submitter`: posts a request and classifies the response
//! - `JobRunner`: submit, then poll asynchronous jobs to completion

mod payload;
mod request;
mod runner;
mod submitter;

pub use payload::TEXT_EXPORT_MAX_URLS;
pub(crate) use payload::scrape_payload;
pub use request::{
    CrawlOptions, DeepResearchOptions, Format, JobOptions, JobRequest, Location, MapOptions,
    OperationKind, PageOptions, SearchOptions, TextExportOptions,
};
pub use runner::JobRunner;
pub(crate) use submitter::rejection;
pub use submitter::{SubmitOutcome, Submitter};
