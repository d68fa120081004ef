//! # RecordFetch Core
//!
//! Retrieval engine - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port interfaces for HTTP execution, credentials and audit
//! - The per-attempt outcome model and its retry classification
//! - The orchestrator that fans out across endpoints under circuit breaking
//!   and retry, and consolidates the results
//!
//! ## Architecture Principles
//! - Only depends on `recordfetch-common` and `recordfetch-domain`
//! - No HTTP or platform code
//! - All external dependencies via traits

pub mod retrieval;

// Re-export specific items to avoid ambiguity
pub use retrieval::ports::{AuditSink, HeaderSource, NoopAuditSink, RequestExecutor};
pub use retrieval::{AttemptOutcome, RetrievalOrchestrator, TimeoutBoundary};
