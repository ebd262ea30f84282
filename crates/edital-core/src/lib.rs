//! # edital-core
//!
//! Core types, traits, and abstractions for the edital analysis pipeline.
//!
//! This crate provides the request-scoped data structures (file references,
//! authorized files, conversation turns, analysis payloads) and the trait
//! definitions for the collaborators the pipeline consumes: persisted record
//! lookups, file storage, and the generative model backend.

pub mod defaults;
pub mod error;
pub mod models;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use models::*;
pub use traits::*;
