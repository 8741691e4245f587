//! Schema registry and the generic decode-with-schema-check primitive.
//!
//! The [`Scheme`] is built once at startup and handed to a [`Decoder`], which
//! is then injected into the admission handler. Decoding is a pure function
//! of the payload; the decoder holds no per-request state.

use std::collections::HashSet;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::error::AdmissionError;
use super::schema::{
    SchemaIdentity, admission_review_schema, deployment_schema, describe,
    identity_from_type_meta,
};

/// Set of message types the decoder is allowed to produce
#[derive(Clone, Debug, Default)]
pub struct Scheme {
    known: HashSet<SchemaIdentity>,
}

impl Scheme {
    /// Create an empty scheme
    pub fn new() -> Self {
        Self::default()
    }

    /// Scheme with the admission review envelope and apps/v1 Deployment registered
    pub fn admission() -> Self {
        Self::new()
            .with_kind(admission_review_schema())
            .with_kind(deployment_schema())
    }

    /// Register a type, builder style
    pub fn with_kind(mut self, identity: SchemaIdentity) -> Self {
        self.register(identity);
        self
    }

    pub fn register(&mut self, identity: SchemaIdentity) {
        self.known.insert(identity);
    }

    pub fn recognizes(&self, identity: &SchemaIdentity) -> bool {
        self.known.contains(identity)
    }
}

/// Type metadata every self-describing payload starts with
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TypeHeader {
    #[serde(default)]
    api_version: Option<String>,
    #[serde(default)]
    kind: Option<String>,
}

/// Decodes self-describing JSON payloads against an expected schema identity
#[derive(Clone, Debug)]
pub struct Decoder {
    scheme: Scheme,
}

impl Decoder {
    pub fn new(scheme: Scheme) -> Self {
        Self { scheme }
    }

    /// Decode `payload` into `T`, requiring its embedded identity to equal `expected`.
    ///
    /// Returns the decoded value together with the identity the payload declared.
    pub fn decode<T>(
        &self,
        payload: &[u8],
        expected: &SchemaIdentity,
    ) -> Result<(T, SchemaIdentity), AdmissionError>
    where
        T: DeserializeOwned,
    {
        let actual = read_identity(payload, &expected.kind)?;

        if actual != *expected {
            return Err(AdmissionError::SchemaMismatch {
                expected: expected.clone(),
                actual,
            });
        }

        if !self.scheme.recognizes(expected) {
            return Err(AdmissionError::decode(
                &expected.kind,
                format!("no kind is registered for {}", describe(expected)),
            ));
        }

        let value = serde_json::from_slice(payload)
            .map_err(|e| AdmissionError::decode(&expected.kind, e))?;

        debug!(kind = %actual.kind, group = %actual.group, version = %actual.version, "Decoded payload");
        Ok((value, actual))
    }
}

fn read_identity(payload: &[u8], target: &str) -> Result<SchemaIdentity, AdmissionError> {
    let header: TypeHeader =
        serde_json::from_slice(payload).map_err(|e| AdmissionError::decode(target, e))?;

    match (header.api_version, header.kind) {
        (Some(api_version), Some(kind)) if !api_version.is_empty() && !kind.is_empty() => {
            Ok(identity_from_type_meta(&api_version, &kind))
        }
        _ => Err(AdmissionError::decode(
            target,
            "unable to find schema group, version and kind from request",
        )),
    }
}
