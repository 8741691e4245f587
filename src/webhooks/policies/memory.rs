//! Memory request and limit policy.
//!
//! Validates, in this order:
//! - Every container declares a memory request
//! - Every container declares a memory limit
//!
//! Requests are checked across all containers before any limit is checked.
//! Only the first offending container is reported.

use super::Verdict;
use crate::workload::{ContainerSpec, Workload};

/// Validate memory requests and limits
pub fn validate(workload: &Workload) -> Verdict {
    if let Some(container) = first_missing(workload, ContainerSpec::has_memory_request) {
        return Verdict::denied(format!(
            "Memory request not specified for container {}",
            container.name
        ));
    }

    if let Some(container) = first_missing(workload, ContainerSpec::has_memory_limit) {
        return Verdict::denied(format!(
            "Memory limit not specified for container {}",
            container.name
        ));
    }

    Verdict::Allowed
}

fn first_missing(
    workload: &Workload,
    declared: fn(&ContainerSpec) -> bool,
) -> Option<&ContainerSpec> {
    workload.containers.iter().find(|c| !declared(c))
}
