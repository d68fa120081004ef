//! Logging initialisation

pub mod logging;

pub use logging::{init_tracing, TracingInitError};
