//! # RecordFetch Infrastructure
//!
//! Infrastructure implementations of the ports defined in `recordfetch-core`.
//!
//! This crate contains:
//! - The reqwest-backed [`HttpRequestExecutor`]
//! - Configuration loading from environment variables and TOML/JSON files
//! - The built-in endpoint catalog
//! - Static credential headers and the tracing audit sink
//! - Logging initialisation
//!
//! ## Architecture
//! - Implements traits defined in `recordfetch-core`
//! - Contains all "impure" code (network, filesystem, global subscriber)

pub mod audit;
pub mod bootstrap;
pub mod config;
pub mod credentials;
pub mod endpoints;
pub mod errors;
pub mod http;
pub mod observability;

// Re-export commonly used items
pub use audit::TracingAuditSink;
pub use bootstrap::build_orchestrator;
pub use credentials::StaticHeaderSource;
pub use endpoints::{default_catalog, endpoints_for};
pub use errors::InfraError;
pub use http::{HttpRequestExecutor, HttpRequestExecutorBuilder};
pub use observability::init_tracing;
