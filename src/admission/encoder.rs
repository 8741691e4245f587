//! Response encoding.

use k8s_openapi::apimachinery::pkg::apis::meta::v1::Status;

use super::error::AdmissionError;
use super::review::{ReviewEnvelope, ReviewResponse};
use super::schema::{SchemaIdentity, api_version_of};
use crate::webhooks::policies::Verdict;

/// Status value Kubernetes expects on a denied review
const FAILURE_STATUS: &str = "Failure";

/// Build the review response for a verdict
pub fn build_response(uid: &str, verdict: &Verdict) -> ReviewResponse {
    match verdict {
        Verdict::Allowed => ReviewResponse {
            uid: uid.to_string(),
            allowed: true,
            status: None,
        },
        Verdict::Denied(reason) => ReviewResponse {
            uid: uid.to_string(),
            allowed: false,
            status: Some(Status {
                status: Some(FAILURE_STATUS.to_string()),
                message: Some(reason.clone()),
                ..Default::default()
            }),
        },
    }
}

/// Serialize the outbound envelope, tagged with the inbound envelope's identity
pub fn encode(
    uid: &str,
    schema: &SchemaIdentity,
    verdict: &Verdict,
) -> Result<Vec<u8>, AdmissionError> {
    let envelope = ReviewEnvelope {
        api_version: api_version_of(schema),
        kind: schema.kind.clone(),
        request: None,
        response: Some(build_response(uid, verdict)),
    };
    Ok(serde_json::to_vec(&envelope)?)
}
