use serde_json::{Value, json};

use crate::remediator::base_next_step;
use crate::proto::response::{Remediation, RemediationResponse};
use crate::transaction::NextStep;

/// The unlock-account entry step. It takes no input; submitting it moves the
/// server to factor selection for the unlock journey.
#[derive(Clone, Debug)]
pub struct UnlockAccount {
    remediation: Remediation,
}

impl UnlockAccount {
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
