//! Static endpoint descriptions and their resolution into concrete requests
//!
//! Where an endpoint's identifier goes (path segment, query parameter or JSON
//! body) is configuration, not convention: each [`EndpointSpec`] states it
//! explicitly through [`IdPlacement`].

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use super::subject::SubjectIds;
use crate::errors::{RecordFetchError, Result};

/// HTTP method used by an endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
}

impl HttpMethod {
    /// Upper-case method name as sent on the wire
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the subject identifier is bound in the outgoing request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IdPlacement {
    /// Appended as the final path segment: `/patientnotes/{id}`
    PathSegment,
    /// Added as a query parameter: `/allergies?PatNum={id}`
    Query { param: String },
    /// Substituted into a single-field JSON body; `{id}` in `template` is
    /// replaced with the identifier.
    JsonBody { field: String, template: String },
}

/// Structure the remote contract promises for a successful payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadShape {
    /// A single record
    Object,
    /// A collection of records
    Array,
    /// Any JSON value
    #[default]
    Any,
}

impl PayloadShape {
    /// Whether `payload` has this top-level structure
    pub fn matches(self, payload: &serde_json::Value) -> bool {
        match self {
            Self::Object => payload.is_object(),
            Self::Array => payload.is_array(),
            Self::Any => true,
        }
    }
}

impl fmt::Display for PayloadShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Object => "object",
            Self::Array => "array",
            Self::Any => "any",
        };
        f.write_str(label)
    }
}

/// Immutable description of one remote call. `name` is the unique key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointSpec {
    pub name: String,
    #[serde(default)]
    pub method: HttpMethod,
    /// Path relative to the backend base URL, e.g. `/allergies`
    pub path: String,
    /// Which subject identifier this endpoint consumes
    pub id_key: String,
    pub placement: IdPlacement,
    #[serde(default)]
    pub shape: PayloadShape,
}

impl EndpointSpec {
    pub fn new(
        name: impl Into<String>,
        method: HttpMethod,
        path: impl Into<String>,
        id_key: impl Into<String>,
        placement: IdPlacement,
    ) -> Self {
        Self {
            name: name.into(),
            method,
            path: path.into(),
            id_key: id_key.into(),
            placement,
            shape: PayloadShape::Any,
        }
    }

    /// Require a success payload of `shape`
    pub fn with_shape(mut self, shape: PayloadShape) -> Self {
        self.shape = shape;
        self
    }

    /// Bind the subject identifier and build the concrete request.
    ///
    /// # Errors
    /// - `RecordFetchError::InvalidInput` if the subject lacks `id_key`
    /// - `RecordFetchError::Config` if `base_url` + `path` is not a valid URL
    pub fn resolve(
        &self,
        base_url: &str,
        subject: &SubjectIds,
        headers: RequestHeaders,
    ) -> Result<ResolvedRequest> {
        let id = subject.get(&self.id_key).ok_or_else(|| {
            RecordFetchError::InvalidInput(format!(
                "endpoint '{}' requires identifier {}",
                self.name, self.id_key
            ))
        })?;
        let id = id.to_string();

        let raw = format!("{}{}", base_url.trim_end_matches('/'), self.path);
        let mut url = Url::parse(&raw).map_err(|e| {
            RecordFetchError::Config(format!("invalid URL for endpoint '{}': {e}", self.name))
        })?;

        let mut body = None;
        match &self.placement {
            IdPlacement::PathSegment => {
                url.path_segments_mut()
                    .map_err(|()| {
                        RecordFetchError::Config(format!(
                            "endpoint '{}' URL cannot take path segments",
                            self.name
                        ))
                    })?
                    .pop_if_empty()
                    .push(&id);
            }
            IdPlacement::Query { param } => {
                url.query_pairs_mut().append_pair(param, &id);
            }
            IdPlacement::JsonBody { field, template } => {
                let mut object = serde_json::Map::new();
                object.insert(field.clone(), template.replace("{id}", &id).into());
                body = Some(serde_json::Value::Object(object).to_string());
            }
        }

        Ok(ResolvedRequest { method: self.method, url, body, headers })
    }
}

/// Headers supplied by the credential collaborator. Attached verbatim;
/// values never appear in `Debug` output.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RequestHeaders(Vec<(String, String)>);

impl RequestHeaders {
    /// Empty header set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a header; duplicates are kept in insertion order
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, String)> for RequestHeaders {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Debug for RequestHeaders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.0.iter().map(|(k, _)| (k, "***"))).finish()
    }
}

/// A fully bound request, ready for the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRequest {
    pub method: HttpMethod,
    pub url: Url,
    /// Serialized JSON body, if the endpoint sends one
    pub body: Option<String>,
    pub headers: RequestHeaders,
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://backend.example.com/api/v1";

    fn subject() -> SubjectIds {
        SubjectIds::new().with("PatNum", 12345).unwrap().with("AptNum", 67890).unwrap()
    }

    #[test]
    fn query_placement_appends_parameter() {
        let spec = EndpointSpec::new(
            "allergies",
            HttpMethod::Get,
            "/allergies",
            "PatNum",
            IdPlacement::Query { param: "PatNum".into() },
        );

        let request = spec.resolve(BASE, &subject(), RequestHeaders::new()).unwrap();
        assert_eq!(
            request.url.as_str(),
            "https://backend.example.com/api/v1/allergies?PatNum=12345"
        );
        assert_eq!(request.method, HttpMethod::Get);
        assert!(request.body.is_none());
    }

    #[test]
    fn path_placement_appends_segment() {
        let spec = EndpointSpec::new(
            "patientnotes",
            HttpMethod::Get,
            "/patientnotes",
            "PatNum",
            IdPlacement::PathSegment,
        );

        let request = spec.resolve(&format!("{BASE}/"), &subject(), RequestHeaders::new()).unwrap();
        assert_eq!(request.url.as_str(), "https://backend.example.com/api/v1/patientnotes/12345");
    }

    #[test]
    fn body_placement_substitutes_identifier() {
        let spec = EndpointSpec::new(
            "vital_signs",
            HttpMethod::Put,
            "/queries/ShortQuery",
            "PatNum",
            IdPlacement::JsonBody {
                field: "SqlCommand".into(),
                template: "SELECT * FROM vitalsign WHERE PatNum={id}".into(),
            },
        );

        let request = spec.resolve(BASE, &subject(), RequestHeaders::new()).unwrap();
        assert_eq!(request.url.as_str(), "https://backend.example.com/api/v1/queries/ShortQuery");
        let body: serde_json::Value =
            serde_json::from_str(request.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["SqlCommand"], "SELECT * FROM vitalsign WHERE PatNum=12345");
    }

    #[test]
    fn missing_identifier_is_invalid_input() {
        let spec = EndpointSpec::new(
            "procedurelogs",
            HttpMethod::Get,
            "/procedurelogs",
            "AptNum",
            IdPlacement::Query { param: "AptNum".into() },
        );
        let only_patient = SubjectIds::new().with("PatNum", 1).unwrap();

        let err = spec.resolve(BASE, &only_patient, RequestHeaders::new()).unwrap_err();
        assert!(matches!(err, RecordFetchError::InvalidInput(_)));
    }

    #[test]
    fn invalid_base_url_is_config_error() {
        let spec =
            EndpointSpec::new("x", HttpMethod::Get, "/x", "PatNum", IdPlacement::PathSegment);
        let err = spec.resolve("not a url", &subject(), RequestHeaders::new()).unwrap_err();
        assert!(matches!(err, RecordFetchError::Config(_)));
    }

    #[test]
    fn headers_debug_hides_values() {
        let mut headers = RequestHeaders::new();
        headers.insert("Authorization", "ODFHIR secret/key");

        let rendered = format!("{headers:?}");
        assert!(rendered.contains("Authorization"));
        assert!(!rendered.contains("secret"));
    }

    #[test]
    fn payload_shape_checks_structure() {
        let object = serde_json::json!({"PatNum": 1});
        let array = serde_json::json!([{"PatNum": 1}]);

        assert!(PayloadShape::Object.matches(&object));
        assert!(!PayloadShape::Object.matches(&array));
        assert!(PayloadShape::Array.matches(&array));
        assert!(!PayloadShape::Array.matches(&object));
        assert!(PayloadShape::Any.matches(&serde_json::Value::Null));
    }

    #[test]
    fn spec_deserializes_with_defaults() {
        let spec: EndpointSpec = serde_json::from_value(serde_json::json!({
            "name": "diseases",
            "path": "/diseases",
            "id_key": "PatNum",
            "placement": { "kind": "query", "param": "PatNum" }
        }))
        .unwrap();

        assert_eq!(spec.method, HttpMethod::Get);
        assert_eq!(spec.shape, PayloadShape::Any);
        assert_eq!(spec.placement, IdPlacement::Query { param: "PatNum".into() });
    }
}
