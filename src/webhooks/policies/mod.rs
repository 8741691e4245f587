//! Validation policies for Deployment admission.
//!
//! Policies are pure functions over a [`Workload`]. Each returns the first
//! violation it finds; the first denying policy wins and later ones are not
//! run, so a caller always receives exactly one actionable message.

pub mod memory;

use crate::workload::Workload;

/// Outcome of validating a workload
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    Allowed,
    Denied(String),
}

impl Verdict {
    pub fn denied(reason: impl Into<String>) -> Self {
        Verdict::Denied(reason.into())
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, Verdict::Allowed)
    }

    /// Denial reason, if any
    pub fn reason(&self) -> Option<&str> {
        match self {
            Verdict::Allowed => None,
            Verdict::Denied(reason) => Some(reason),
        }
    }
}

/// Run all validation policies
pub fn validate_all(workload: &Workload) -> Verdict {
    memory::validate(workload)
}
