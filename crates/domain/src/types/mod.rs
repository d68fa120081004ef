//! Domain types for the retrieval engine

pub mod audit;
pub mod consolidated;
pub mod endpoint;
pub mod outcome;
pub mod subject;

pub use audit::AuditEvent;
pub use consolidated::{ConsolidatedResult, ExitStatus, FailureRecord};
pub use endpoint::{
    EndpointSpec, HttpMethod, IdPlacement, PayloadShape, RequestHeaders, ResolvedRequest,
};
pub use outcome::EndpointOutcome;
pub use subject::SubjectIds;
