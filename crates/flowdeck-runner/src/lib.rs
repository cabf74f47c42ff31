//! Remote workflow execution.
//!
//! `HttpBackend` implements the `RunBackend` seam against the real HTTP
//! backend; `Runner` walks a precomputed plan strictly sequentially, one
//! awaited call per node, publishing `RunEvent`s for the frontend. A failed
//! node is marked and skipped over, never retried and never aborting the pass.

pub mod client;
pub mod executor;

pub use client::HttpBackend;
pub use executor::{plan, RunStep, Runner};
