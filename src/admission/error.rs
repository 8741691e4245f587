//! Error types for the admission path.
//!
//! Every error is terminal for the request it occurred in. [`Failure`] pairs
//! an error with the handler stage that produced it and renders the HTTP
//! response the caller receives.

use std::fmt;

use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use super::schema::{ResourceKind, SchemaIdentity, describe};

/// Error type for admission review processing
#[derive(Error, Debug)]
pub enum AdmissionError {
    /// The request body could not be read from the transport
    #[error("error {0} reading request body")]
    BodyRead(String),

    /// The payload is malformed or carries no usable type metadata
    #[error("failed to decode {target}: {message}")]
    Decode { target: String, message: String },

    /// The payload declares a different group/version/kind than expected
    #[error(
        "expected {} but got {}",
        describe(.expected),
        describe(.actual)
    )]
    SchemaMismatch {
        expected: SchemaIdentity,
        actual: SchemaIdentity,
    },

    /// The envelope decoded but carries no request
    #[error("expected admission review request but did not get one")]
    MissingRequest,

    /// The request is for a resource this gate does not handle
    #[error("expected {expected} resource but got {actual}")]
    UnsupportedResource {
        expected: ResourceKind,
        actual: ResourceKind,
    },

    /// The response envelope could not be serialized
    #[error("error marshaling admission review response: {0}")]
    Encode(#[from] serde_json::Error),
}

impl AdmissionError {
    /// Convenience constructor for decode failures
    pub fn decode(target: impl Into<String>, message: impl fmt::Display) -> Self {
        AdmissionError::Decode {
            target: target.into(),
            message: message.to_string(),
        }
    }

    /// HTTP status returned to the caller for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AdmissionError::UnsupportedResource { .. } => StatusCode::BAD_REQUEST,
            AdmissionError::BodyRead(_)
            | AdmissionError::Decode { .. }
            | AdmissionError::SchemaMismatch { .. }
            | AdmissionError::MissingRequest
            | AdmissionError::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Sequential stages of a single admission review
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    ReadBody,
    DecodeEnvelope,
    CheckRequestPresent,
    CheckResourceKind,
    DecodeWorkload,
    Validate,
    EncodeResponse,
    WriteResponse,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::ReadBody => "ReadBody",
            Stage::DecodeEnvelope => "DecodeEnvelope",
            Stage::CheckRequestPresent => "CheckRequestPresent",
            Stage::CheckResourceKind => "CheckResourceKind",
            Stage::DecodeWorkload => "DecodeWorkload",
            Stage::Validate => "Validate",
            Stage::EncodeResponse => "EncodeResponse",
            Stage::WriteResponse => "WriteResponse",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal failure of a review at a given stage
#[derive(Debug)]
pub struct Failure {
    pub stage: Stage,
    pub error: AdmissionError,
}

impl Failure {
    pub fn new(stage: Stage, error: AdmissionError) -> Self {
        Self { stage, error }
    }

    /// Adapter for `map_err` that tags an error with its stage
    pub fn at(stage: Stage) -> impl FnOnce(AdmissionError) -> Failure {
        move |error| Failure::new(stage, error)
    }

    pub fn status_code(&self) -> StatusCode {
        self.error.status_code()
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed: {}", self.stage, self.error)
    }
}

impl std::error::Error for Failure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        (
            self.status_code(),
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.error.to_string(),
        )
            .into_response()
    }
}
