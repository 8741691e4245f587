//! Test fixtures and builder patterns for admission review payloads.

#![allow(dead_code)]

use serde_json::{Value, json};

/// A container entry for a Deployment pod template.
#[derive(Clone, Debug)]
pub struct ContainerFixture {
    name: String,
    requests: serde_json::Map<String, Value>,
    limits: serde_json::Map<String, Value>,
}

impl ContainerFixture {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            requests: serde_json::Map::new(),
            limits: serde_json::Map::new(),
        }
    }

    /// Container with both memory request and memory limit set.
    pub fn complete(name: impl Into<String>) -> Self {
        Self::new(name)
            .request("memory", "256Mi")
            .limit("memory", "512Mi")
    }

    pub fn request(mut self, resource: &str, quantity: &str) -> Self {
        self.requests.insert(resource.to_string(), json!(quantity));
        self
    }

    pub fn limit(mut self, resource: &str, quantity: &str) -> Self {
        self.limits.insert(resource.to_string(), json!(quantity));
        self
    }

    pub fn to_json(&self) -> Value {
        json!({
            "name": self.name,
            "image": "registry.example.com/app:1.0",
            "resources": {
                "requests": self.requests,
                "limits": self.limits,
            }
        })
    }
}

/// Build an `apps/v1` Deployment object with the given containers.
pub fn deployment(name: &str, containers: &[ContainerFixture]) -> Value {
    let containers: Vec<Value> = containers.iter().map(ContainerFixture::to_json).collect();
    json!({
        "apiVersion": "apps/v1",
        "kind": "Deployment",
        "metadata": {"name": name, "namespace": "default"},
        "spec": {
            "replicas": 1,
            "selector": {"matchLabels": {"app": name}},
            "template": {
                "metadata": {"labels": {"app": name}},
                "spec": {"containers": containers}
            }
        }
    })
}

/// Builder for AdmissionReview request payloads.
///
/// # Example
/// ```
/// let body = ReviewBuilder::new("uid-1")
///     .containers(&[ContainerFixture::complete("app")])
///     .to_bytes();
/// ```
#[derive(Clone, Debug)]
pub struct ReviewBuilder {
    api_version: String,
    kind: String,
    uid: String,
    resource: (String, String, String),
    object: Option<Value>,
    include_request: bool,
}

impl ReviewBuilder {
    /// Create a builder for a Deployment CREATE review with an empty container list.
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            api_version: "admission.k8s.io/v1".to_string(),
            kind: "AdmissionReview".to_string(),
            uid: uid.into(),
            resource: (
                "apps".to_string(),
                "v1".to_string(),
                "deployments".to_string(),
            ),
            object: Some(deployment("web", &[])),
            include_request: true,
        }
    }

    /// Override the envelope's apiVersion.
    pub fn api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    /// Override the envelope's kind.
    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    /// Override the request's resource triple.
    pub fn resource(mut self, group: &str, version: &str, resource: &str) -> Self {
        self.resource = (group.to_string(), version.to_string(), resource.to_string());
        self
    }

    /// Use a Deployment with these containers as the object.
    pub fn containers(mut self, containers: &[ContainerFixture]) -> Self {
        self.object = Some(deployment("web", containers));
        self
    }

    /// Use an arbitrary object.
    pub fn object(mut self, object: Value) -> Self {
        self.object = Some(object);
        self
    }

    /// Drop the object from the request.
    pub fn without_object(mut self) -> Self {
        self.object = None;
        self
    }

    /// Drop the request from the envelope.
    pub fn without_request(mut self) -> Self {
        self.include_request = false;
        self
    }

    pub fn to_json(&self) -> Value {
        let mut envelope = json!({
            "apiVersion": self.api_version,
            "kind": self.kind,
        });
        if self.include_request {
            let mut request = json!({
                "uid": self.uid,
                "kind": {"group": "apps", "version": "v1", "kind": "Deployment"},
                "resource": {
                    "group": self.resource.0,
                    "version": self.resource.1,
                    "resource": self.resource.2,
                },
                "name": "web",
                "namespace": "default",
                "operation": "CREATE",
                "userInfo": {"username": "system:admin"},
                "dryRun": false,
            });
            if let (Some(object), Some(map)) = (&self.object, request.as_object_mut()) {
                map.insert("object".to_string(), object.clone());
            }
            if let Some(map) = envelope.as_object_mut() {
                map.insert("request".to_string(), request);
            }
        }
        envelope
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        serde_json::to_vec(&self.to_json()).unwrap_or_default()
    }
}
