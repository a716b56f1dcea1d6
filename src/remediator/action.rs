use serde_json::{Value, json};

use crate::remediator::base_next_step;
use crate::proto::response::{Remediation, RemediationResponse};
use crate::transaction::NextStep;

/// Handler for steps that proceed with an empty payload: allow-listed
/// recovery actions and the registration entry selector.
#[derive(Clone, Debug)]
pub struct Action {
    remediation: Remediation,
}

impl Action {
    pub(crate) fn new(remediation: Remediation) -> Self {
        Self { remediation }
    }

    pub(crate) fn name(&self) -> &str {
        &self.remediation.name
    }

    pub(crate) fn payload(&self) -> Value {
        json!({})
    }

    pub(crate) fn next_step(&self, response: &RemediationResponse) -> NextStep {
        base_next_step(&self.remediation, response)
    }
}
