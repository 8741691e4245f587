//! Workload view inspected by the validation policies.
//!
//! Policies only need container names and their declared resources, so the
//! decoded Deployment is flattened into a [`Workload`] before validation.

use std::collections::BTreeMap;

use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::Container;
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;

/// Resource name for memory in requests and limits
pub const MEMORY: &str = "memory";

/// Declared resources of a single container
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ContainerSpec {
    pub name: String,
    pub requests: BTreeMap<String, Quantity>,
    pub limits: BTreeMap<String, Quantity>,
}

impl ContainerSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn request(mut self, resource: &str, quantity: &str) -> Self {
        self.requests
            .insert(resource.to_string(), Quantity(quantity.to_string()));
        self
    }

    pub fn limit(mut self, resource: &str, quantity: &str) -> Self {
        self.limits
            .insert(resource.to_string(), Quantity(quantity.to_string()));
        self
    }

    pub fn has_memory_request(&self) -> bool {
        self.requests.contains_key(MEMORY)
    }

    pub fn has_memory_limit(&self) -> bool {
        self.limits.contains_key(MEMORY)
    }
}

impl From<&Container> for ContainerSpec {
    fn from(container: &Container) -> Self {
        let resources = container.resources.as_ref();
        Self {
            name: container.name.clone(),
            requests: resources
                .and_then(|r| r.requests.clone())
                .unwrap_or_default(),
            limits: resources
                .and_then(|r| r.limits.clone())
                .unwrap_or_default(),
        }
    }
}

/// Containers of a workload, in declaration order
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Workload {
    pub containers: Vec<ContainerSpec>,
}

impl Workload {
    pub fn new(containers: Vec<ContainerSpec>) -> Self {
        Self { containers }
    }
}

impl From<&Deployment> for Workload {
    fn from(deployment: &Deployment) -> Self {
        let containers = deployment
            .spec
            .as_ref()
            .and_then(|spec| spec.template.spec.as_ref())
            .map(|pod| pod.containers.iter().map(ContainerSpec::from).collect())
            .unwrap_or_default();
        Self { containers }
    }
}
