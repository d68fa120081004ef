//! Conversions from external infrastructure errors into domain errors.
//!
//! Only setup paths (client construction, config files) go through here.
//! Transport failures during an attempt become
//! [`AttemptOutcome`](recordfetch_core::AttemptOutcome) values instead.

use std::io::Error as IoError;

use recordfetch_domain::RecordFetchError;
use reqwest::Error as HttpError;
use serde_json::Error as JsonError;
use toml::de::Error as TomlError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub RecordFetchError);

impl From<InfraError> for RecordFetchError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<RecordFetchError> for InfraError {
    fn from(value: RecordFetchError) -> Self {
        InfraError(value)
    }
}

trait IntoRecordFetchError {
    fn into_recordfetch(self) -> RecordFetchError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → RecordFetchError */
/* -------------------------------------------------------------------------- */

impl IntoRecordFetchError for HttpError {
    fn into_recordfetch(self) -> RecordFetchError {
        // Only client construction reaches here; URLs carry subject identifiers
        RecordFetchError::Config(format!("HTTP client could not be built: {}", self.without_url()))
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_recordfetch())
    }
}

/* -------------------------------------------------------------------------- */
/* Config file errors → RecordFetchError */
/* -------------------------------------------------------------------------- */

impl IntoRecordFetchError for IoError {
    fn into_recordfetch(self) -> RecordFetchError {
        RecordFetchError::Config(format!("Failed to read config file: {self}"))
    }
}

impl From<IoError> for InfraError {
    fn from(value: IoError) -> Self {
        InfraError(value.into_recordfetch())
    }
}

impl IntoRecordFetchError for TomlError {
    fn into_recordfetch(self) -> RecordFetchError {
        RecordFetchError::Config(format!("Invalid TOML format: {}", self.message()))
    }
}

impl From<TomlError> for InfraError {
    fn from(value: TomlError) -> Self {
        InfraError(value.into_recordfetch())
    }
}

impl IntoRecordFetchError for JsonError {
    fn into_recordfetch(self) -> RecordFetchError {
        RecordFetchError::Config(format!(
            "Invalid JSON format at line {}, column {}: {}",
            self.line(),
            self.column(),
            self
        ))
    }
}

impl From<JsonError> for InfraError {
    fn from(value: JsonError) -> Self {
        InfraError(value.into_recordfetch())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
