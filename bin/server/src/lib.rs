//! HTTP service for the triage support-ticket workflow.
//!
//! Tickets posted to the API run through the compiled support workflow;
//! per-ticket outcomes feed a process-wide metrics aggregator.

pub mod app;
pub mod config;
pub mod error;
pub mod routes;
