//! Client for the remote case analysis service.
//!
//! The service exposes one endpoint per pipeline stage plus evidence upload
//! and a health probe. [`AnalysisService`] is the seam the pipeline depends
//! on; [`AnalysisClient`] is its HTTP implementation.

mod client;
mod types;

#[cfg(test)]
#[path = "types_tests.rs"]
mod types_tests;

pub use client::*;
pub use types::*;
