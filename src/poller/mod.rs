//! Poller module for driving submitted jobs to a terminal state
//!
//! This module contains:
//! - `PollBudget`: interval and limits for one poll loop
//! - `Poller`: the cancellable status-check loop

mod budget;
#[allow(clippy::module_inception)]
mod poller;

pub use budget::PollBudget;
pub use poller::{PollProgress, Poller};
