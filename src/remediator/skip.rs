use serde_json::{Value, json};

use crate::remediator::base_next_step;
use crate::proto::response::{Remediation, RemediationResponse};
use crate::transaction::NextStep;
use crate::values::{Values, keys};

/// Skips an optional step when the caller asked to.
#[derive(Clone, Debug)]
pub struct Skip {
    remediation: Remediation,
}

impl Skip {
    pub(crate) fn new(remediation: Remediation) -> Self {
        Self { remediation }
    }

    pub(crate) fn name(&self) -> &str {
        &self.remediation.name
    }

    pub(crate) fn can_remediate(&self, values: &Values) -> bool {
        values.flag(keys::SKIP)
    }

    pub(crate) fn payload(&self) -> Value {
        json!({})
    }

    pub(crate) fn next_step(&self, response: &RemediationResponse) -> NextStep {
        base_next_step(&self.remediation, response)
    }

    pub(crate) fn values_after_proceed(&self, values: &Values) -> Values {
        values.without(&[keys::SKIP])
    }
}
