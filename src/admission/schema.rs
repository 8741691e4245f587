//! Schema identities used for protocol-level type matching.
//!
//! A [`SchemaIdentity`] is the group/version/kind triple carried in a
//! payload's `apiVersion`/`kind` fields. A [`ResourceKind`] is the
//! group/version/resource triple an admission request declares for the
//! object under review.

use std::fmt;

use kube::core::GroupVersionKind;
use serde::{Deserialize, Serialize};

/// Group/version/kind identifying a message type.
pub type SchemaIdentity = GroupVersionKind;

/// Identity every inbound and outbound review envelope must carry
pub fn admission_review_schema() -> SchemaIdentity {
    GroupVersionKind::gvk("admission.k8s.io", "v1", "AdmissionReview")
}

/// Identity of the embedded workload object
pub fn deployment_schema() -> SchemaIdentity {
    GroupVersionKind::gvk("apps", "v1", "Deployment")
}

/// The only resource this gate admits
pub fn deployments_resource() -> ResourceKind {
    ResourceKind::new("apps", "v1", "deployments")
}

/// Build a schema identity from a payload's `apiVersion` and `kind`.
///
/// `apiVersion` is either `group/version` or a bare `version` for the core
/// group, whose name is the empty string.
pub fn identity_from_type_meta(api_version: &str, kind: &str) -> SchemaIdentity {
    let (group, version) = split_api_version(api_version);
    GroupVersionKind::gvk(group, version, kind)
}

/// Render the `apiVersion` field for an identity.
pub fn api_version_of(identity: &SchemaIdentity) -> String {
    if identity.group.is_empty() {
        identity.version.clone()
    } else {
        format!("{}/{}", identity.group, identity.version)
    }
}

/// Human-readable triple used in diagnostics
pub fn describe(identity: &SchemaIdentity) -> String {
    format!(
        "group: {} version: {} kind: {}",
        identity.group, identity.version, identity.kind
    )
}

fn split_api_version(api_version: &str) -> (&str, &str) {
    match api_version.split_once('/') {
        Some((group, version)) => (group, version),
        None => ("", api_version),
    }
}

/// Group/version/resource declared by an admission request
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceKind {
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub resource: String,
}

impl ResourceKind {
    pub fn new(group: &str, version: &str, resource: &str) -> Self {
        Self {
            group: group.to_string(),
            version: version.to_string(),
            resource: resource.to_string(),
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.group.is_empty() {
            write!(f, "{}/{}", self.version, self.resource)
        } else {
            write!(f, "{}/{}/{}", self.group, self.version, self.resource)
        }
    }
}
