//! HTTP transport

pub mod executor;

pub use executor::{HttpRequestExecutor, HttpRequestExecutorBuilder};
