//! Admission review handler.
//!
//! Runs the pure stages of a review over an already-read request body:
//! decode envelope, check the request is present, check the resource kind,
//! decode the workload, validate, encode. The first failing stage ends the
//! review; there is no retry.

use k8s_openapi::api::apps::v1::Deployment;
use tracing::{debug, info, warn};

use crate::admission::error::{AdmissionError, Failure, Stage};
use crate::admission::schema::{
    ResourceKind, admission_review_schema, deployment_schema, deployments_resource,
};
use crate::admission::{Decoder, ReviewEnvelope, encoder};
use crate::webhooks::policies::{Verdict, validate_all};
use crate::workload::Workload;

/// Result of a review that completed all stages
#[derive(Debug)]
pub struct Reviewed {
    pub uid: String,
    pub verdict: Verdict,
    /// Serialized response envelope
    pub body: Vec<u8>,
}

/// Stateless admission handler; the decoder is its only dependency
#[derive(Clone, Debug)]
pub struct AdmissionHandler {
    decoder: Decoder,
}

impl AdmissionHandler {
    pub fn new(decoder: Decoder) -> Self {
        Self { decoder }
    }

    /// Review a raw request body.
    pub fn review(&self, body: &[u8]) -> Result<Reviewed, Failure> {
        let (envelope, schema) = self
            .decoder
            .decode::<ReviewEnvelope>(body, &admission_review_schema())
            .map_err(Failure::at(Stage::DecodeEnvelope))?;
        debug!("Successfully decoded AdmissionReview");

        let request = envelope
            .request
            .ok_or(AdmissionError::MissingRequest)
            .map_err(Failure::at(Stage::CheckRequestPresent))?;

        let uid = request.uid.as_str();
        debug!(
            uid = %uid,
            operation = ?request.operation,
            namespace = ?request.namespace,
            name = ?request.name,
            "Processing admission request"
        );

        check_resource_kind(&request.resource, &deployments_resource())
            .map_err(Failure::at(Stage::CheckResourceKind))?;

        let object = request
            .object_bytes()
            .ok_or_else(|| AdmissionError::decode("Deployment", "request carries no object"))
            .map_err(Failure::at(Stage::DecodeWorkload))?;
        let (deployment, _) = self
            .decoder
            .decode::<Deployment>(object, &deployment_schema())
            .map_err(Failure::at(Stage::DecodeWorkload))?;

        let workload = Workload::from(&deployment);
        debug!(uid = %uid, containers = workload.containers.len(), "Deployment decoded");

        let verdict = validate_all(&workload);
        match &verdict {
            Verdict::Allowed => info!(uid = %uid, "Admission request allowed"),
            Verdict::Denied(reason) => warn!(uid = %uid, reason = %reason, "Admission request denied"),
        }

        let body = encoder::encode(uid, &schema, &verdict)
            .map_err(Failure::at(Stage::EncodeResponse))?;

        Ok(Reviewed {
            uid: request.uid,
            verdict,
            body,
        })
    }
}

/// Require the request's resource to equal the expected triple exactly
pub fn check_resource_kind(
    actual: &ResourceKind,
    expected: &ResourceKind,
) -> Result<(), AdmissionError> {
    if actual == expected {
        Ok(())
    } else {
        Err(AdmissionError::UnsupportedResource {
            expected: expected.clone(),
            actual: actual.clone(),
        })
    }
}
