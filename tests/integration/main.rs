//! Integration tests for Firedash
//!
//! These tests run the transport, submit/poll cycle and parallel scraper
//! against wiremock servers standing in for the provider API.

mod common;
mod jobs_tests;
mod scrape_tests;
mod transport_tests;
