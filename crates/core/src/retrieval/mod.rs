//! Multi-endpoint retrieval

pub mod outcome;
pub mod ports;
pub mod service;

pub use outcome::{AttemptOutcome, TimeoutBoundary};
pub use service::RetrievalOrchestrator;
