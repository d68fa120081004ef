//! Built-in endpoint catalog for the clinical records backend

use recordfetch_domain::{Config, EndpointSpec, HttpMethod, IdPlacement, PayloadShape};

/// Patient identifier key
pub const PATIENT_ID: &str = "PatNum";
/// Appointment identifier key
pub const APPOINTMENT_ID: &str = "AptNum";

const VITAL_SIGN_COLUMNS: &str = "VitalsignNum, PatNum, DateTaken, Pulse, BpSystolic, \
    BpDiastolic, Height, Weight, BMIPercentile";

/// The six endpoints retrieved for one patient visit, in reporting order.
pub fn default_catalog() -> Vec<EndpointSpec> {
    vec![
        query_collection("procedurelogs", APPOINTMENT_ID),
        query_collection("allergies", PATIENT_ID),
        query_collection("medicationpats", PATIENT_ID),
        query_collection("diseases", PATIENT_ID),
        EndpointSpec::new(
            "patientnotes",
            HttpMethod::Get,
            "/patientnotes",
            PATIENT_ID,
            IdPlacement::PathSegment,
        )
        .with_shape(PayloadShape::Object),
        EndpointSpec::new(
            "vital_signs",
            HttpMethod::Put,
            "/queries/ShortQuery",
            PATIENT_ID,
            IdPlacement::JsonBody {
                field: "SqlCommand".to_string(),
                template: format!(
                    "SELECT {VITAL_SIGN_COLUMNS} FROM vitalsign WHERE PatNum={{id}}"
                ),
            },
        ),
    ]
}

/// Endpoints configured in `config`, or the built-in catalog when none are.
pub fn endpoints_for(config: &Config) -> Vec<EndpointSpec> {
    if config.endpoints.is_empty() {
        default_catalog()
    } else {
        config.endpoints.clone()
    }
}

fn query_collection(name: &str, id_key: &str) -> EndpointSpec {
    EndpointSpec::new(
        name,
        HttpMethod::Get,
        format!("/{name}"),
        id_key,
        IdPlacement::Query { param: id_key.to_string() },
    )
    .with_shape(PayloadShape::Array)
}
