//! # RecordFetch Domain
//!
//! Domain types and models for the multi-endpoint retrieval engine.
//!
//! This crate contains:
//! - Endpoint descriptions and request resolution
//! - Per-endpoint outcomes and the consolidated run result
//! - Domain error types, the failure taxonomy and Result definitions
//! - Configuration structures and defaults
//!
//! ## Architecture
//! - No dependencies on other RecordFetch crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
