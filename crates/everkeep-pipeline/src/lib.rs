//! The remote submission pipeline.
//!
//! Orchestrates per-photo blob upload, the durable submission-document
//! write, and the human notification, with per-stage fallback. No stage
//! failure is allowed to abort a later, independent stage: the durable
//! store may be down and the templated transport unconfigured, and the
//! pipeline still gets a human-readable payload out the door.

pub mod blob;
pub mod document;
pub mod error;
pub mod notify;
pub mod pipeline;

pub use error::{Error, Result, TransportError};
pub use pipeline::{
  DeliveredVia, SubmissionOutcome, SubmissionPipeline, Submitter,
};

#[cfg(test)]
mod tests;
