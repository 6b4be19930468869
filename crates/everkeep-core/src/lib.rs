//! Core types and trait definitions for the everkeep memorial store.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

pub mod error;
pub mod memorial;
pub mod photo;
pub mod store;
pub mod submission;
pub mod validate;

pub use error::{Error, Result};
